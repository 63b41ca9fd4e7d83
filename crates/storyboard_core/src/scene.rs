//! Scene prompts produced by decomposition.

use serde::{Deserialize, Serialize};

/// Number of scenes every successful decomposition yields.
pub const SCENE_COUNT: usize = 10;

/// One narrative beat of a story, ready to be rendered.
///
/// Created once by the decomposer and never mutated; a re-run produces new
/// prompts. `raw_prompt` is always [`compose_raw_prompt`] of the other fields.
///
/// # Examples
///
/// ```
/// use storyboard_core::ScenePrompt;
///
/// let scene = ScenePrompt::new(
///     0,
///     "A fox spots a crow holding cheese",
///     vec!["red fox".to_string(), "black crow".to_string()],
///     "Disney-style cartoon",
///     Some("curious".to_string()),
/// );
/// assert_eq!(
///     scene.raw_prompt(),
///     "A fox spots a crow holding cheese. Key elements: red fox, black crow. \
///      Style: Disney-style cartoon. Mood: curious."
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters)]
pub struct ScenePrompt {
    /// Position in rendering and display order (0-based)
    index: usize,
    /// Human-readable scene summary
    description: String,
    /// Salient objects and characters to depict, in order
    visual_elements: Vec<String>,
    /// Art-direction tag
    style: String,
    /// Emotional tone of the scene
    mood: Option<String>,
    /// Final string handed to the image backend
    raw_prompt: String,
}

impl ScenePrompt {
    /// Build a scene prompt, trimming fields and composing the rendering prompt.
    pub fn new(
        index: usize,
        description: impl Into<String>,
        visual_elements: Vec<String>,
        style: impl Into<String>,
        mood: Option<String>,
    ) -> Self {
        let description = description.into().trim().to_string();
        let style = style.into().trim().to_string();
        let visual_elements: Vec<String> = visual_elements
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        let mood = mood
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        let raw_prompt = compose_raw_prompt(&description, &visual_elements, &style, mood.as_deref());

        Self {
            index,
            description,
            visual_elements,
            style,
            mood,
            raw_prompt,
        }
    }
}

/// Compose the rendering prompt from structured scene fields.
///
/// Pure and deterministic: identical fields always produce an identical string.
/// Clauses for empty elements, empty style or absent mood are omitted.
///
/// # Examples
///
/// ```
/// use storyboard_core::compose_raw_prompt;
///
/// let prompt = compose_raw_prompt("A quiet pond.", &[], "watercolor", None);
/// assert_eq!(prompt, "A quiet pond. Style: watercolor.");
/// ```
pub fn compose_raw_prompt(
    description: &str,
    visual_elements: &[String],
    style: &str,
    mood: Option<&str>,
) -> String {
    let mut clauses = Vec::with_capacity(4);

    let description = description.trim().trim_end_matches('.').trim_end();
    if !description.is_empty() {
        clauses.push(description.to_string());
    }

    let elements: Vec<&str> = visual_elements
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .collect();
    if !elements.is_empty() {
        clauses.push(format!("Key elements: {}", elements.join(", ")));
    }

    let style = style.trim().trim_end_matches('.');
    if !style.is_empty() {
        clauses.push(format!("Style: {}", style));
    }

    if let Some(mood) = mood.map(|m| m.trim().trim_end_matches('.')).filter(|m| !m.is_empty()) {
        clauses.push(format!("Mood: {}", mood));
    }

    if clauses.is_empty() {
        return String::new();
    }

    let mut prompt = clauses.join(". ");
    prompt.push('.');
    prompt
}
