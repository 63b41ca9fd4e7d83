//! Splitting a story into ten scene prompts with a text backend.

use crate::{DecompositionCache, deadline::with_deadline, parse_scenes};
use storyboard_core::{
    GenerateRequest, Message, PipelineConfig, Role, SCENE_COUNT, ScenePrompt, StoryInput,
};
use storyboard_error::{BuilderError, BuilderErrorKind, StoryboardResult, ValidationError};
use storyboard_interface::TextBackend;
use tracing::{debug, info, instrument};

const SYSTEM_INSTRUCTION: &str = "You split stories into illustrated scenes. \
Each scene becomes one picture, and the pictures must read as a connected sequence \
in a consistent cartoon style. Answer with JSON only, no commentary.";

/// Decomposes stories into exactly [`SCENE_COUNT`] scene prompts.
///
/// Each call issues one request to the text backend. Transport retries are
/// the backend's concern; this type only bounds each call with the
/// configured timeout.
pub struct SceneDecomposer<T: TextBackend> {
    backend: T,
    config: PipelineConfig,
    cache: Option<DecompositionCache>,
}

impl<T: TextBackend> SceneDecomposer<T> {
    /// Create a decomposer. A cache is attached when the config enables one.
    pub fn new(backend: T, config: PipelineConfig) -> Self {
        let cache = (*config.cache_decompositions()).then(|| DecompositionCache::from_config(&config));
        Self {
            backend,
            config,
            cache,
        }
    }

    /// Use a shared cache instead of a private one.
    pub fn with_cache(mut self, cache: DecompositionCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Disable caching.
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    /// The underlying text backend.
    pub fn backend(&self) -> &T {
        &self.backend
    }

    /// Active settings.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The decomposition cache, if enabled.
    pub fn cache(&self) -> Option<&DecompositionCache> {
        self.cache.as_ref()
    }

    /// Decompose a story into ten scene prompts, indexed 0 through 9.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the story exceeds the configured length; no
    ///   request is sent
    /// - `BackendError` from the backend, or `Timeout` when the call outlives
    ///   the configured deadline
    /// - `DecompositionError` carrying the raw response when it does not
    ///   hold exactly ten well-formed scenes
    #[instrument(
        skip(self, story),
        fields(
            provider = self.backend.provider_name(),
            model = self.backend.model_name(),
            story_chars = story.char_count()
        )
    )]
    pub async fn decompose(&self, story: &StoryInput) -> StoryboardResult<Vec<ScenePrompt>> {
        self.validate(story)?;

        if let Some(cache) = &self.cache {
            if let Some(scenes) = cache.get(story).await {
                debug!("Using cached decomposition");
                return Ok(scenes);
            }
        }

        let request = self.build_request(story)?;
        let response = with_deadline(self.config.backend_timeout(), self.backend.generate(&request)).await?;
        let raw = response.text();
        debug!(response_len = raw.len(), "Received decomposition response");

        let scenes = parse_scenes(&raw)?;
        info!(scenes = scenes.len(), "Story decomposed");

        if let Some(cache) = &self.cache {
            cache.insert(story, scenes.clone()).await;
        }

        Ok(scenes)
    }

    #[track_caller]
    fn validate(&self, story: &StoryInput) -> Result<(), ValidationError> {
        if story.text().trim().is_empty() {
            return Err(ValidationError::new("story text must not be empty"));
        }
        let limit = *self.config.max_story_chars();
        if story.char_count() > limit {
            return Err(ValidationError::new(format!(
                "story is {} characters, the limit is {}",
                story.char_count(),
                limit
            )));
        }
        Ok(())
    }

    fn build_request(&self, story: &StoryInput) -> StoryboardResult<GenerateRequest> {
        let request = GenerateRequest::builder()
            .messages(vec![
                Message::new(Role::System, SYSTEM_INSTRUCTION),
                Message::new(Role::User, instruction(story.text())),
            ])
            .max_tokens(Some(*self.config.max_tokens()))
            .temperature(Some(*self.config.temperature()))
            .model(Some(self.config.text_model().clone()))
            .build()
            .map_err(|e| BuilderError::new(BuilderErrorKind::Decomposition, e))?;
        Ok(request)
    }
}

/// The user instruction sent with the story.
pub fn instruction(story: &str) -> String {
    format!(
        "Split the story below into exactly {count} scenes, in story order.\n\
         For every scene give:\n\
         - \"description\": what happens, with how the characters look, the place, the background and the weather\n\
         - \"visual_elements\": the key characters and objects to draw, as a list of short strings\n\
         - \"style\": the character and art style\n\
         - \"mood\": the emotional tone\n\n\
         Return only this JSON shape:\n\
         {{\"scenes\": [{{\"description\": \"...\", \"visual_elements\": [\"...\"], \"style\": \"...\", \"mood\": \"...\"}}]}}\n\n\
         Story:\n{story}",
        count = SCENE_COUNT,
        story = story,
    )
}
