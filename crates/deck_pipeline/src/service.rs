//! The generation service: pipeline stages over the workflow context.

use std::sync::Arc;

use tokio::sync::RwLock;

use deck_core::{GenerationSettings, PlanEntry, Slide, WorkflowEvent, WorkflowState};
use deck_storage::{LocalStore, NewPresentation, StorageBackend};
use gemini_client::{
    GeminiClient, GenerationError, RetryExecutor, RetryState, DEFAULT_CONTENT_ATTEMPTS,
    DEFAULT_NOTES_ATTEMPTS,
};

use crate::context::{MoveDirection, WorkflowContext};
use crate::prompts::{self, ContentResponse, PlanResponse, NOTES_FALLBACK};

const FALLBACK_TITLE: &str = "Presentation";

/// Orchestrates the three pipeline stages over a shared workflow context.
///
/// Stage results are applied only while the generation token captured at
/// launch still matches the context, so responses that outlive a reset (or a
/// history load) are dropped instead of overwriting newer state.
pub struct GenerationService<B: StorageBackend> {
    client: GeminiClient,
    store: Arc<LocalStore<B>>,
    retry: RetryExecutor,
    /// Note generation keeps its own retry state so a failed note run never
    /// bleeds into the user-visible pipeline error surface.
    notes_retry: RetryExecutor,
    context: Arc<RwLock<WorkflowContext>>,
    /// The single active user-visible error message.
    user_error: Arc<RwLock<Option<String>>>,
}

impl<B: StorageBackend> Clone for GenerationService<B> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            store: self.store.clone(),
            retry: self.retry.clone(),
            notes_retry: self.notes_retry.clone(),
            context: self.context.clone(),
            user_error: self.user_error.clone(),
        }
    }
}

impl<B: StorageBackend> GenerationService<B> {
    pub fn new(client: GeminiClient, store: Arc<LocalStore<B>>) -> Self {
        Self {
            client,
            store,
            retry: RetryExecutor::new(),
            notes_retry: RetryExecutor::new(),
            context: Arc::new(RwLock::new(WorkflowContext::new())),
            user_error: Arc::new(RwLock::new(None)),
        }
    }

    // ========== Observation ==========

    /// Clone of the full workflow context.
    pub async fn snapshot(&self) -> WorkflowContext {
        self.context.read().await.clone()
    }

    pub async fn state(&self) -> WorkflowState {
        self.context.read().await.machine.state().clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.user_error.read().await.clone()
    }

    pub async fn clear_error(&self) {
        *self.user_error.write().await = None;
    }

    /// Retry state of the plan/content executor, for progress feedback.
    pub async fn retry_state(&self) -> RetryState {
        self.retry.state().await
    }

    // ========== Configuration ==========

    pub async fn set_prompt(&self, prompt: &str) {
        self.context.write().await.prompt = prompt.to_string();
    }

    pub async fn set_settings(&self, settings: GenerationSettings) {
        self.context.write().await.settings = settings;
    }

    /// Set an exact slide count; rejects values outside the valid range and
    /// keeps the prior value.
    pub async fn set_slide_count(&self, count: u8) -> bool {
        self.context.write().await.settings.set_slide_count(count)
    }

    // ========== Stage A: plan generation ==========

    pub async fn generate_plan(&self) -> Result<(), GenerationError> {
        let (topic, settings, token) = {
            let ctx = self.context.read().await;
            if !matches!(
                ctx.machine.state(),
                WorkflowState::Config | WorkflowState::Plan
            ) {
                drop(ctx);
                return Err(self
                    .fail("Plan generation is only available from the configuration step")
                    .await);
            }
            if ctx.prompt.trim().is_empty() {
                drop(ctx);
                return Err(self
                    .fail("Check your configuration before generating the plan")
                    .await);
            }
            (ctx.prompt.clone(), ctx.settings.clone(), ctx.generation())
        };
        self.clear_error().await;

        let prompt = prompts::plan_prompt(&topic, &settings);
        let client = self.client.clone();
        let result = self
            .retry
            .run(DEFAULT_CONTENT_ATTEMPTS, || {
                let client = client.clone();
                let prompt = prompt.clone();
                async move {
                    client
                        .generate_structured::<PlanResponse>(&prompt, prompts::plan_schema())
                        .await
                }
            })
            .await;

        match result {
            Ok(response) => {
                let mut ctx = self.context.write().await;
                if ctx.generation() != token {
                    log::debug!("dropping stale plan response");
                    return Ok(());
                }
                ctx.title = response.title.unwrap_or_else(|| FALLBACK_TITLE.to_string());
                ctx.plan = response.slides;
                let entry_count = ctx.plan.len();
                ctx.machine
                    .handle_event(WorkflowEvent::PlanGenerated { entry_count });
                log::info!("plan generated with {entry_count} entries");
                Ok(())
            }
            Err(err) => {
                self.set_error(err.user_message()).await;
                Err(err)
            }
        }
    }

    // ========== Stage B: content generation ==========

    pub async fn generate_content(&self) -> Result<(), GenerationError> {
        let (plan, generate_notes, token) = {
            let ctx = self.context.read().await;
            if ctx.machine.state() != &WorkflowState::Plan || ctx.plan.is_empty() {
                drop(ctx);
                return Err(self.fail("No plan available - generate a plan first").await);
            }
            (
                ctx.plan.clone(),
                ctx.settings.generate_speaker_notes,
                ctx.generation(),
            )
        };
        self.clear_error().await;

        let prompt = prompts::content_prompt(&plan, generate_notes);
        let client = self.client.clone();
        let result = self
            .retry
            .run(DEFAULT_CONTENT_ATTEMPTS, || {
                let client = client.clone();
                let prompt = prompt.clone();
                async move {
                    client
                        .generate_structured::<ContentResponse>(&prompt, prompts::content_schema())
                        .await
                }
            })
            .await;

        match result {
            Ok(response) => {
                let saved = {
                    let mut ctx = self.context.write().await;
                    if ctx.generation() != token {
                        log::debug!("dropping stale content response");
                        return Ok(());
                    }
                    ctx.slides = response.slides;
                    let slide_count = ctx.slides.len();
                    ctx.machine
                        .handle_event(WorkflowEvent::ContentGenerated { slide_count });
                    log::info!("content generated for {slide_count} slides");
                    NewPresentation {
                        title: ctx.title.clone(),
                        prompt: ctx.prompt.clone(),
                        slides: ctx.slides.clone(),
                    }
                };

                if self.store.settings().await.auto_save {
                    if let Err(err) = self.store.save_presentation(saved).await {
                        log::error!("auto-save failed: {err}");
                    }
                }
                Ok(())
            }
            Err(err) => {
                self.set_error(err.user_message()).await;
                Err(err)
            }
        }
    }

    // ========== Stage C: per-slide speaker notes ==========

    /// Generate speaker notes for one slide. Never fails: any error resolves
    /// to the fixed fallback string so editing is never blocked. Overlapping
    /// calls for the same slide race last-write-wins.
    pub async fn generate_speaker_notes(&self, index: usize) -> String {
        let (title, content, token) = {
            let ctx = self.context.read().await;
            match ctx.slides.get(index) {
                Some(slide) => (slide.title.clone(), slide.content.clone(), ctx.generation()),
                None => return NOTES_FALLBACK.to_string(),
            }
        };

        let prompt = prompts::notes_prompt(&title, &content);
        let client = self.client.clone();
        let result = self
            .notes_retry
            .run(DEFAULT_NOTES_ATTEMPTS, || {
                let client = client.clone();
                let prompt = prompt.clone();
                async move { client.generate_text(&prompt).await }
            })
            .await;

        let notes = match result {
            Ok(notes) => notes,
            Err(err) => {
                log::error!("speaker note generation failed: {err}");
                NOTES_FALLBACK.to_string()
            }
        };

        let mut ctx = self.context.write().await;
        if ctx.generation() == token {
            ctx.set_slide_notes(index, notes.clone());
        } else {
            log::debug!("dropping stale speaker notes for slide {index}");
        }
        notes
    }

    // ========== Workflow navigation ==========

    /// Return to the configuration step, discarding the in-memory deck but
    /// not persisted history. In-flight stage responses become stale.
    pub async fn reset_to_config(&self) {
        {
            let mut ctx = self.context.write().await;
            ctx.machine.handle_event(WorkflowEvent::Reset);
            ctx.discard_deck();
        }
        self.clear_error().await;
    }

    /// Load a stored presentation straight into the editing step.
    pub async fn load_presentation(&self, id: &str) -> bool {
        let Some(stored) = self.store.load_presentation(id).await else {
            return false;
        };

        {
            let mut ctx = self.context.write().await;
            ctx.slides = stored.slides;
            ctx.title = stored.title;
            ctx.prompt = stored.prompt;
            ctx.plan.clear();
            ctx.bump_generation();
            ctx.machine.handle_event(WorkflowEvent::PresentationLoaded);
        }
        self.clear_error().await;
        true
    }

    pub async fn open_preview(&self) -> bool {
        self.handle_view_event(WorkflowEvent::PreviewOpened).await
    }

    pub async fn close_preview(&self) -> bool {
        self.handle_view_event(WorkflowEvent::PreviewClosed).await
    }

    pub async fn start_presentation(&self) -> bool {
        self.handle_view_event(WorkflowEvent::PresentationStarted)
            .await
    }

    pub async fn end_presentation(&self) -> bool {
        self.handle_view_event(WorkflowEvent::PresentationEnded)
            .await
    }

    async fn handle_view_event(&self, event: WorkflowEvent) -> bool {
        self.context.write().await.machine.handle_event(event).changed
    }

    // ========== Plan and slide editing ==========

    pub async fn plan_append(&self, entry: PlanEntry) {
        self.context.write().await.plan_append(entry);
    }

    pub async fn plan_remove(&self, index: usize) -> bool {
        self.context.write().await.plan_remove(index)
    }

    pub async fn plan_move(&self, index: usize, direction: MoveDirection) -> bool {
        self.context.write().await.plan_move(index, direction)
    }

    pub async fn plan_edit(&self, index: usize, entry: PlanEntry) -> bool {
        self.context.write().await.plan_edit(index, entry)
    }

    pub async fn slide_append(&self, slide: Slide) {
        self.context.write().await.slide_append(slide);
    }

    pub async fn slide_remove(&self, index: usize) -> bool {
        self.context.write().await.slide_remove(index)
    }

    pub async fn slide_move(&self, index: usize, direction: MoveDirection) -> bool {
        self.context.write().await.slide_move(index, direction)
    }

    pub async fn slide_edit(&self, index: usize, slide: Slide) -> bool {
        self.context.write().await.slide_edit(index, slide)
    }

    // ========== Persistence and export ==========

    /// Explicitly save the current deck. Returns the new id, or None when
    /// there is nothing to save or the write failed (logged).
    pub async fn save_current(&self) -> Option<String> {
        let new = {
            let ctx = self.context.read().await;
            if ctx.slides.is_empty() {
                return None;
            }
            NewPresentation {
                title: ctx.title.clone(),
                prompt: ctx.prompt.clone(),
                slides: ctx.slides.clone(),
            }
        };

        match self.store.save_presentation(new).await {
            Ok(id) => Some(id),
            Err(err) => {
                log::error!("save failed: {err}");
                None
            }
        }
    }

    /// Render the current deck as a Slidev document.
    pub async fn export_deck(&self) -> Option<(String, String)> {
        let ctx = self.context.read().await;
        if ctx.slides.is_empty() {
            return None;
        }
        Some((
            slidev_export::export_filename(&ctx.title),
            slidev_export::render_deck(&ctx.slides, &ctx.title),
        ))
    }

    /// Render a stored presentation as a Slidev document.
    pub async fn export_stored(&self, id: &str) -> Option<(String, String)> {
        let stored = self.store.load_presentation(id).await?;
        Some((
            slidev_export::export_filename(&stored.title),
            slidev_export::render_deck(&stored.slides, &stored.title),
        ))
    }

    /// The backing store, for history listing and settings management.
    pub fn store(&self) -> &LocalStore<B> {
        &self.store
    }

    // ========== Error channel ==========

    async fn set_error(&self, message: String) {
        *self.user_error.write().await = Some(message);
    }

    async fn fail(&self, message: &str) -> GenerationError {
        self.set_error(message.to_string()).await;
        GenerationError::Unknown(message.to_string())
    }
}
