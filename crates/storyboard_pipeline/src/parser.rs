//! Turning a text backend response into scene prompts.
//!
//! Three shapes are accepted:
//!
//! - `{"scenes": [{"description", "visual_elements", "style", "mood"}, ...]}`
//! - a bare array of the same scene objects
//! - legacy rows `[["description", "style", "key elements", "mood"], ...]`,
//!   optionally written as `list = [...]`
//!
//! The scene count is never padded or truncated.

use crate::json_candidates;
use serde::Deserialize;
use serde_json::Value;
use storyboard_core::{SCENE_COUNT, ScenePrompt};
use storyboard_error::{DecompositionError, DecompositionErrorKind};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SceneDocument {
    Bare(Vec<SceneRecord>),
    Wrapped { scenes: Vec<SceneRecord> },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SceneRecord {
    // Rows first: a struct would also accept a sequence positionally.
    Row(Vec<Value>),
    Object(SceneObject),
}

#[derive(Debug, Deserialize)]
struct SceneObject {
    #[serde(default, alias = "scene", alias = "scene_description")]
    description: String,
    #[serde(default, alias = "key_elements", alias = "elements")]
    visual_elements: ElementList,
    #[serde(default, alias = "character_style")]
    style: String,
    #[serde(default)]
    mood: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ElementList {
    List(Vec<String>),
    Text(String),
}

impl Default for ElementList {
    fn default() -> Self {
        ElementList::List(Vec::new())
    }
}

impl ElementList {
    fn into_vec(self) -> Vec<String> {
        match self {
            ElementList::List(items) => items,
            ElementList::Text(text) => split_elements(&text),
        }
    }
}

/// Parse a model response into exactly [`SCENE_COUNT`] scene prompts.
///
/// # Errors
///
/// Every failure carries the unmodified response:
/// - [`DecompositionErrorKind::EmptyResponse`] for blank text
/// - [`DecompositionErrorKind::SceneCount`] when the scene count is not ten
/// - [`DecompositionErrorKind::Malformed`] for unparseable JSON or a scene
///   without description or style
///
/// # Examples
///
/// ```
/// use storyboard_pipeline::parse_scenes;
///
/// let rows: Vec<String> = (1..=10)
///     .map(|i| format!(r#"["Scene {i}", "cartoon", "fox, crow", "calm"]"#))
///     .collect();
/// let response = format!("list = [{}]", rows.join(","));
///
/// let scenes = parse_scenes(&response).unwrap();
/// assert_eq!(scenes.len(), 10);
/// assert_eq!(scenes[3].visual_elements(), &vec!["fox".to_string(), "crow".to_string()]);
/// ```
pub fn parse_scenes(response: &str) -> Result<Vec<ScenePrompt>, DecompositionError> {
    let candidates = json_candidates(response)?;

    // The first candidate that reads as a scene document wins; prose in
    // brackets before the payload is skipped.
    let mut first_error = None;
    let mut document = None;
    for json in &candidates {
        match read_document(json) {
            Ok(parsed) => {
                document = Some(parsed);
                break;
            }
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    preview = %preview(json),
                    "Skipping JSON candidate that is not a scene document"
                );
                first_error.get_or_insert(e);
            }
        }
    }

    let Some(document) = document else {
        let detail = first_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no JSON candidates".to_string());
        tracing::warn!(
            candidates = candidates.len(),
            error = %detail,
            "Scene response is not valid JSON"
        );
        return Err(DecompositionError::new(
            DecompositionErrorKind::Malformed(format!("invalid scene JSON: {}", detail)),
            response,
        ));
    };

    let records = match document {
        SceneDocument::Wrapped { scenes } => scenes,
        SceneDocument::Bare(scenes) => scenes,
    };

    if records.len() != SCENE_COUNT {
        tracing::warn!(
            expected = SCENE_COUNT,
            found = records.len(),
            "Scene response has the wrong number of scenes"
        );
        return Err(DecompositionError::new(
            DecompositionErrorKind::SceneCount {
                expected: SCENE_COUNT,
                found: records.len(),
            },
            response,
        ));
    }

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| scene_from_record(index, record, response))
        .collect()
}

fn read_document(json: &str) -> Result<SceneDocument, serde_json::Error> {
    serde_json::from_str(json).or_else(|_| serde_json::from_str(&strip_trailing_commas(json)))
}

fn scene_from_record(
    index: usize,
    record: SceneRecord,
    response: &str,
) -> Result<ScenePrompt, DecompositionError> {
    let (description, visual_elements, style, mood) = match record {
        SceneRecord::Object(object) => (
            object.description,
            object.visual_elements.into_vec(),
            object.style,
            object.mood,
        ),
        SceneRecord::Row(row) => {
            // description, style, key elements, mood
            let mut fields = row.into_iter();
            let description = fields.next().map(value_text).unwrap_or_default();
            let style = fields.next().map(value_text).unwrap_or_default();
            let elements = fields.next().map(value_elements).unwrap_or_default();
            let mood = fields
                .next()
                .map(value_text)
                .filter(|m| !m.trim().is_empty());
            (description, elements, style, mood)
        }
    };

    let missing = match (description.trim().is_empty(), style.trim().is_empty()) {
        (true, true) => Some("description and style"),
        (true, false) => Some("description"),
        (false, true) => Some("style"),
        (false, false) => None,
    };
    if let Some(field) = missing {
        return Err(DecompositionError::new(
            DecompositionErrorKind::Malformed(format!("scene {} is missing its {}", index + 1, field)),
            response,
        ));
    }

    Ok(ScenePrompt::new(index, description, visual_elements, style, mood))
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        Value::Array(items) => items
            .into_iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn value_elements(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(value_text)
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect(),
        other => split_elements(&value_text(other)),
    }
}

fn split_elements(text: &str) -> Vec<String> {
    text.split(',')
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Drop commas directly before a closing bracket or brace, outside strings.
fn strip_trailing_commas(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escape_next = false;
    let mut pending_comma = false;
    let mut pending_ws = String::new();

    for ch in json.chars() {
        if in_string {
            out.push(ch);
            match ch {
                _ if escape_next => escape_next = false,
                '\\' => escape_next = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        if pending_comma {
            if ch.is_whitespace() {
                pending_ws.push(ch);
                continue;
            }
            if ch != ']' && ch != '}' {
                out.push(',');
            }
            out.push_str(&pending_ws);
            pending_ws.clear();
            pending_comma = false;
        }

        match ch {
            ',' => pending_comma = true,
            '"' => {
                in_string = true;
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }

    if pending_comma {
        out.push(',');
    }
    out.push_str(&pending_ws);
    out
}

fn preview(text: &str) -> String {
    text.chars().take(100).collect()
}
