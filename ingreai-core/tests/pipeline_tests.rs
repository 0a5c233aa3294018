//! Pipeline controller behaviour against a scripted generation client.
//!
//! The scripted client answers from fixed tables and can hold any call open
//! on a gate, which lets these tests resolve requests out of order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ingreai_core::ai::FakeBackend;
use ingreai_core::pipeline::{EMPTY_RESULT_MESSAGE, SEARCH_FAILED_MESSAGE};
use ingreai_core::{
    AiGenerationClient, Detail, GenerationClient, GenerationError, ImageRef, PipelineConfig,
    PipelineController, PipelineError, SearchPhase, SearchQuery, SelectionPhase, Suggestion,
};
use tokio::sync::oneshot;

const PHOTO_KEY: &str = "<photo>";

#[derive(Default)]
struct ScriptedClient {
    suggestions: HashMap<String, Result<Vec<Suggestion>, GenerationError>>,
    details: HashMap<String, Result<Detail, GenerationError>>,
    /// Image prompts containing any of these fail.
    failing_images: Vec<String>,
    /// Calls keyed by ingredients / recipe name wait here until released.
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    image_calls: AtomicUsize,
}

impl ScriptedClient {
    fn with_suggestions(mut self, key: &str, names: &[&str]) -> Self {
        let suggestions = names
            .iter()
            .map(|name| Suggestion::new(*name, format!("A tasty {}", name)))
            .collect();
        self.suggestions.insert(key.to_string(), Ok(suggestions));
        self
    }

    fn with_suggest_error(mut self, key: &str) -> Self {
        self.suggestions.insert(
            key.to_string(),
            Err(GenerationError::Upstream("quota exceeded".to_string())),
        );
        self
    }

    fn with_detail(mut self, name: &str, steps: &[&str]) -> Self {
        let detail = Detail {
            instructions: steps.iter().map(|s| s.to_string()).collect(),
            ingredients: vec!["salt".to_string()],
            ..Default::default()
        };
        self.details.insert(name.to_string(), Ok(detail));
        self
    }

    fn with_detail_error(mut self, name: &str) -> Self {
        self.details.insert(
            name.to_string(),
            Err(GenerationError::NotFound(name.to_string())),
        );
        self
    }

    fn failing_image(mut self, prompt_contains: &str) -> Self {
        self.failing_images.push(prompt_contains.to_string());
        self
    }

    /// Hold calls for `key` until the returned sender fires.
    fn gate(&self, key: &str) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.gates.lock().unwrap().insert(key.to_string(), gate);
        release
    }

    async fn pass_gate(&self, key: &str) {
        let gate = self.gates.lock().unwrap().remove(key);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }

    fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn suggest_from_text(
        &self,
        ingredients: &str,
    ) -> Result<Vec<Suggestion>, GenerationError> {
        self.pass_gate(ingredients).await;
        self.suggestions
            .get(ingredients)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn suggest_from_image(&self, _image: &[u8]) -> Result<Vec<Suggestion>, GenerationError> {
        self.suggest_from_text(PHOTO_KEY).await
    }

    async fn detail_for(&self, name: &str) -> Result<Detail, GenerationError> {
        self.pass_gate(name).await;
        self.details
            .get(name)
            .cloned()
            .unwrap_or_else(|| Err(GenerationError::NotFound(name.to_string())))
    }

    async fn image_for(&self, prompt: &str) -> Result<ImageRef, GenerationError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_images.iter().any(|p| prompt.contains(p.as_str())) {
            return Err(GenerationError::Upstream("image quota exceeded".to_string()));
        }
        Ok(ImageRef::from_bytes("image/png", prompt.as_bytes()))
    }
}

fn controller_for(client: &Arc<ScriptedClient>) -> PipelineController {
    PipelineController::new(client.clone(), PipelineConfig::default())
}

fn names(controller: &PipelineController) -> Vec<String> {
    controller
        .snapshot()
        .search
        .suggestions
        .into_iter()
        .map(|s| s.name)
        .collect()
}

fn omelette_client() -> ScriptedClient {
    ScriptedClient::default()
        .with_suggestions(
            "eggs, onion, cheese",
            &["Omelette", "Frittata", "Cheese Scramble"],
        )
        .with_detail("Omelette", &["Whisk", "Fry", "Fold"])
        .with_detail("Frittata", &["Whisk", "Bake"])
}

#[tokio::test]
async fn test_eggs_onion_cheese_yields_three_covered_suggestions() {
    let client = Arc::new(omelette_client());
    let controller = controller_for(&client);

    controller
        .search(SearchQuery::text("eggs, onion, cheese"))
        .await
        .unwrap();

    let search = controller.snapshot().search;
    assert_eq!(search.phase, SearchPhase::Ready);
    assert_eq!(search.suggestions.len(), 3);
    assert!(search.suggestions.iter().all(|s| s.cover_image.is_some()));
    assert_eq!(search.error, None);
    assert_eq!(client.image_calls(), 3);
}

#[tokio::test]
async fn test_search_moves_through_searching_to_ready() {
    let client = Arc::new(omelette_client());
    let controller = controller_for(&client);
    let mut updates = controller.subscribe();

    let handle = controller
        .start_search(SearchQuery::text("eggs, onion, cheese"))
        .unwrap();
    assert_eq!(
        updates.borrow_and_update().search.phase,
        SearchPhase::Searching
    );

    handle.await.unwrap();
    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().search.phase, SearchPhase::Ready);
}

#[tokio::test]
async fn test_one_cover_failure_fails_the_search() {
    let client = Arc::new(omelette_client().failing_image("Frittata"));
    let controller = controller_for(&client);

    controller
        .search(SearchQuery::text("eggs, onion, cheese"))
        .await
        .unwrap();

    let search = controller.snapshot().search;
    assert_eq!(search.phase, SearchPhase::Failed);
    assert!(search.suggestions.is_empty());
    assert_eq!(search.error.as_deref(), Some(SEARCH_FAILED_MESSAGE));
    // Every cover request was still dispatched and allowed to settle.
    assert_eq!(client.image_calls(), 3);
}

#[tokio::test]
async fn test_empty_result_message() {
    let client = Arc::new(ScriptedClient::default().with_suggestions("dust", &[]));
    let controller = controller_for(&client);

    controller.search(SearchQuery::text("dust")).await.unwrap();

    let search = controller.snapshot().search;
    assert_eq!(search.phase, SearchPhase::Failed);
    assert_eq!(
        search.error.as_deref(),
        Some("Could not find any recipes. Try different ingredients.")
    );
    assert_eq!(search.error.as_deref(), Some(EMPTY_RESULT_MESSAGE));
    assert_eq!(client.image_calls(), 0);
}

#[tokio::test]
async fn test_suggest_failure_message() {
    let client = Arc::new(ScriptedClient::default().with_suggest_error("rice"));
    let controller = controller_for(&client);

    controller.search(SearchQuery::text("rice")).await.unwrap();

    let search = controller.snapshot().search;
    assert_eq!(search.phase, SearchPhase::Failed);
    assert_eq!(search.error.as_deref(), Some(SEARCH_FAILED_MESSAGE));
}

#[tokio::test]
async fn test_empty_text_is_invalid_input() {
    let client = Arc::new(omelette_client());
    let controller = controller_for(&client);

    let err = controller.start_search(SearchQuery::text("")).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));
    assert_eq!(controller.snapshot().search.phase, SearchPhase::Idle);
    assert_eq!(client.image_calls(), 0);
}

#[tokio::test]
async fn test_photo_search() {
    let client =
        Arc::new(ScriptedClient::default().with_suggestions(PHOTO_KEY, &["Tomato Salad"]));
    let controller = controller_for(&client);
    let jpeg_header = vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10];

    controller
        .search(SearchQuery::image(jpeg_header))
        .await
        .unwrap();

    assert_eq!(names(&controller), vec!["Tomato Salad"]);
    assert_eq!(controller.snapshot().search.phase, SearchPhase::Ready);
}

#[tokio::test]
async fn test_unreadable_photo_goes_through_searching_to_failed() {
    let config = PipelineConfig::default();
    let client = AiGenerationClient::new(Box::new(FakeBackend::with_recipe_responses()), &config);
    let controller = PipelineController::new(Arc::new(client), config);
    let mut updates = controller.subscribe();

    let handle = controller
        .start_search(SearchQuery::image(b"\x00\x01garbage-bytes".to_vec()))
        .unwrap();
    assert_eq!(
        updates.borrow_and_update().search.phase,
        SearchPhase::Searching
    );

    handle.await.unwrap();
    let search = controller.snapshot().search;
    assert_eq!(search.phase, SearchPhase::Failed);
    assert!(search.suggestions.is_empty());
    assert_eq!(search.error.as_deref(), Some(SEARCH_FAILED_MESSAGE));
}

#[tokio::test]
async fn test_search_can_restart_after_failure() {
    let client = Arc::new(
        omelette_client()
            .with_suggest_error("rice")
            .with_suggestions("pasta", &["Carbonara"]),
    );
    let controller = controller_for(&client);

    controller.search(SearchQuery::text("rice")).await.unwrap();
    assert_eq!(controller.snapshot().search.phase, SearchPhase::Failed);

    controller.search(SearchQuery::text("pasta")).await.unwrap();
    let search = controller.snapshot().search;
    assert_eq!(search.phase, SearchPhase::Ready);
    assert_eq!(search.error, None);
}

#[tokio::test]
async fn test_late_result_of_superseded_search_is_dropped() {
    let client = Arc::new(
        ScriptedClient::default()
            .with_suggestions("apples", &["Apple Pie"])
            .with_suggestions("bread", &["Bread Pudding", "French Toast"]),
    );
    let controller = controller_for(&client);

    let release_a = client.gate("apples");
    let search_a = controller.start_search(SearchQuery::text("apples")).unwrap();
    let search_b = controller.start_search(SearchQuery::text("bread")).unwrap();

    search_b.await.unwrap();
    assert_eq!(names(&controller), vec!["Bread Pudding", "French Toast"]);

    release_a.send(()).unwrap();
    search_a.await.unwrap();

    let search = controller.snapshot().search;
    assert_eq!(search.phase, SearchPhase::Ready);
    assert_eq!(names(&controller), vec!["Bread Pudding", "French Toast"]);
}

#[tokio::test]
async fn test_superseded_search_cannot_override_newer_failure() {
    let client = Arc::new(
        ScriptedClient::default()
            .with_suggestions("apples", &["Apple Pie"])
            .with_suggest_error("bread"),
    );
    let controller = controller_for(&client);

    let release_a = client.gate("apples");
    let search_a = controller.start_search(SearchQuery::text("apples")).unwrap();
    controller.search(SearchQuery::text("bread")).await.unwrap();

    release_a.send(()).unwrap();
    search_a.await.unwrap();

    let search = controller.snapshot().search;
    assert_eq!(search.phase, SearchPhase::Failed);
    assert_eq!(search.error.as_deref(), Some(SEARCH_FAILED_MESSAGE));
}

#[tokio::test]
async fn test_select_loads_detail_and_step_images() {
    let client = Arc::new(omelette_client());
    let controller = controller_for(&client);
    controller
        .search(SearchQuery::text("eggs, onion, cheese"))
        .await
        .unwrap();

    let handle = controller.start_select(0).unwrap();
    let selection = controller.snapshot().selection;
    assert_eq!(selection.phase, SelectionPhase::LoadingDetail);
    assert!(selection.detail.is_none());
    assert!(selection.step_images.is_empty());

    handle.await.unwrap();
    let selection = controller.snapshot().selection;
    assert_eq!(selection.phase, SelectionPhase::DetailReady);
    assert_eq!(selection.selected.unwrap().name, "Omelette");
    assert_eq!(selection.detail.unwrap().instructions, vec!["Whisk", "Fry", "Fold"]);
    assert_eq!(selection.step_images.len(), 3);
    assert!(selection.step_images.iter().all(Option::is_some));
}

#[tokio::test]
async fn test_one_failed_step_image_degrades_gracefully() {
    let client = Arc::new(
        ScriptedClient::default()
            .with_suggestions("flour", &["Bread"])
            .with_detail("Bread", &["Mix dough", "Knead dough", "Proof dough", "Bake loaf"])
            .failing_image("Proof dough"),
    );
    let controller = controller_for(&client);
    controller.search(SearchQuery::text("flour")).await.unwrap();

    controller.select(0).await.unwrap();

    let selection = controller.snapshot().selection;
    assert_eq!(selection.phase, SelectionPhase::DetailReady);
    assert_eq!(selection.step_images.len(), 4);
    let missing: Vec<usize> = selection
        .step_images
        .iter()
        .enumerate()
        .filter(|(_, image)| image.is_none())
        .map(|(index, _)| index)
        .collect();
    assert_eq!(missing, vec![2]);
    assert_eq!(selection.error, None);
}

#[tokio::test]
async fn test_detail_failure_leaves_search_untouched() {
    let client = Arc::new(omelette_client().with_detail_error("Cheese Scramble"));
    let controller = controller_for(&client);
    controller
        .search(SearchQuery::text("eggs, onion, cheese"))
        .await
        .unwrap();
    let search_before = controller.snapshot().search;

    controller.select(2).await.unwrap();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.selection.phase, SelectionPhase::DetailFailed);
    assert_eq!(
        snapshot.selection.error.as_deref(),
        Some("Failed to fetch details for Cheese Scramble.")
    );
    assert!(snapshot.selection.detail.is_none());
    assert_eq!(snapshot.search, search_before);
}

#[tokio::test]
async fn test_select_rejected_outside_ready_search() {
    let client = Arc::new(omelette_client());
    let controller = controller_for(&client);

    assert_eq!(
        controller.start_select(0).unwrap_err(),
        PipelineError::NotSelectable { index: 0 }
    );

    controller
        .search(SearchQuery::text("eggs, onion, cheese"))
        .await
        .unwrap();
    assert_eq!(
        controller.select(3).await,
        Err(PipelineError::NotSelectable { index: 3 })
    );
    assert_eq!(controller.snapshot().selection.phase, SelectionPhase::None);
}

#[tokio::test]
async fn test_late_detail_of_superseded_selection_is_dropped() {
    let client = Arc::new(omelette_client());
    let controller = controller_for(&client);
    controller
        .search(SearchQuery::text("eggs, onion, cheese"))
        .await
        .unwrap();

    let release_first = client.gate("Omelette");
    let first = controller.start_select(0).unwrap();
    controller.select(1).await.unwrap();

    release_first.send(()).unwrap();
    first.await.unwrap();

    let selection = controller.snapshot().selection;
    assert_eq!(selection.phase, SelectionPhase::DetailReady);
    assert_eq!(selection.selected.unwrap().name, "Frittata");
    assert_eq!(selection.detail.unwrap().instructions, vec!["Whisk", "Bake"]);
}

#[tokio::test]
async fn test_clear_during_loading_discards_late_detail() {
    let client = Arc::new(omelette_client());
    let controller = controller_for(&client);
    controller
        .search(SearchQuery::text("eggs, onion, cheese"))
        .await
        .unwrap();

    let release = client.gate("Omelette");
    let pending = controller.start_select(0).unwrap();
    controller.clear_selection();

    release.send(()).unwrap();
    pending.await.unwrap();

    let selection = controller.snapshot().selection;
    assert_eq!(selection.phase, SelectionPhase::None);
    assert!(selection.selected.is_none());
    assert!(selection.detail.is_none());
}

#[tokio::test]
async fn test_new_search_cancels_pending_detail() {
    let client = Arc::new(omelette_client().with_suggestions("pasta", &["Carbonara"]));
    let controller = controller_for(&client);
    controller
        .search(SearchQuery::text("eggs, onion, cheese"))
        .await
        .unwrap();

    let release = client.gate("Omelette");
    let pending = controller.start_select(0).unwrap();
    controller.search(SearchQuery::text("pasta")).await.unwrap();

    release.send(()).unwrap();
    pending.await.unwrap();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.selection.phase, SelectionPhase::None);
    assert!(snapshot.selection.selected.is_none());
    assert_eq!(names(&controller), vec!["Carbonara"]);
}

#[tokio::test]
async fn test_clear_selection_when_nothing_selected_is_a_no_op() {
    let client = Arc::new(omelette_client());
    let controller = controller_for(&client);
    controller
        .search(SearchQuery::text("eggs, onion, cheese"))
        .await
        .unwrap();

    let before = controller.snapshot();
    let updates = controller.subscribe();

    controller.clear_selection();

    assert_eq!(controller.snapshot(), before);
    assert!(!updates.has_changed().unwrap());
}

#[tokio::test]
async fn test_clear_selection_keeps_search() {
    let client = Arc::new(omelette_client());
    let controller = controller_for(&client);
    controller
        .search(SearchQuery::text("eggs, onion, cheese"))
        .await
        .unwrap();
    controller.select(0).await.unwrap();

    controller.clear_selection();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.selection.phase, SelectionPhase::None);
    assert!(snapshot.selection.step_images.is_empty());
    assert_eq!(snapshot.search.phase, SearchPhase::Ready);
    assert_eq!(snapshot.search.suggestions.len(), 3);
}
