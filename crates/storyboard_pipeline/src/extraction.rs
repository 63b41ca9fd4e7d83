//! Locating the JSON payload inside a text backend response.
//!
//! Models rarely answer with bare JSON. The payload may sit in a markdown
//! fence, follow a sentence of preamble, or come as an assignment such as
//! `list = [...]`. These helpers cut the payload out without interpreting it.

use storyboard_error::{DecompositionError, DecompositionErrorKind};

/// Cut the JSON document out of a model response.
///
/// Strategies, in order:
/// 1. Fenced block: ```` ```json ... ``` ```` or an unlabelled fence
/// 2. Whichever of `{ ... }` or `[ ... ]` opens first, balanced
///
/// This is the first of [`json_candidates`].
///
/// # Errors
///
/// Returns [`DecompositionErrorKind::EmptyResponse`] for blank text and
/// [`DecompositionErrorKind::Malformed`] when no JSON structure is found.
/// Both carry the response unchanged.
///
/// # Examples
///
/// ```
/// use storyboard_pipeline::extract_json;
///
/// let response = "Here are your scenes:\n```json\n{\"scenes\": []}\n```\n";
/// assert_eq!(extract_json(response).unwrap(), "{\"scenes\": []}");
///
/// let legacy = "list = [[\"a\", \"b\"]]";
/// assert_eq!(extract_json(legacy).unwrap(), "[[\"a\", \"b\"]]");
/// ```
pub fn extract_json(response: &str) -> Result<String, DecompositionError> {
    json_candidates(response)?
        .into_iter()
        .next()
        .ok_or_else(|| no_json_found(response))
}

/// Every balanced `{ ... }` or `[ ... ]` in the response, in order.
///
/// Scanning resumes after each balanced structure, so a bracketed aside in
/// the preamble does not hide the payload that follows it. Structures nested
/// inside an earlier candidate are not listed separately. When a fenced block
/// is present only its content is scanned.
///
/// # Errors
///
/// Same as [`extract_json`].
///
/// # Examples
///
/// ```
/// use storyboard_pipeline::json_candidates;
///
/// let response = "Here are the scenes [as requested]:\n{\"scenes\": []}";
/// let candidates = json_candidates(response).unwrap();
/// assert_eq!(candidates, vec!["[as requested]", "{\"scenes\": []}"]);
/// ```
pub fn json_candidates(response: &str) -> Result<Vec<String>, DecompositionError> {
    if response.trim().is_empty() {
        return Err(DecompositionError::new(
            DecompositionErrorKind::EmptyResponse,
            response,
        ));
    }

    let body = extract_from_code_block(response, "json").unwrap_or_else(|| response.to_string());

    let mut candidates = Vec::new();
    let mut from = 0;
    while let Some(offset) = body[from..].find(['[', '{']) {
        let start = from + offset;
        match balanced_end(&body, start) {
            Some(end) => {
                candidates.push(body[start..end].to_string());
                from = end;
            }
            // Unbalanced opener; the next one may still close
            None => from = start + 1,
        }
    }

    if candidates.is_empty() {
        return Err(no_json_found(response));
    }
    Ok(candidates)
}

fn no_json_found(response: &str) -> DecompositionError {
    tracing::error!(
        response_length = response.len(),
        "No JSON structure found in text backend response"
    );

    DecompositionError::new(
        DecompositionErrorKind::Malformed(format!(
            "no JSON structure found in response ({} bytes)",
            response.len()
        )),
        response,
    )
}

/// Content of the first fenced block, preferring one tagged `language`.
///
/// An unterminated fence yields everything after the opening line, since
/// truncated responses are common.
fn extract_from_code_block(response: &str, language: &str) -> Option<String> {
    let tagged = format!("```{}", language);

    if let Some(start) = response.find(&tagged) {
        let content_start = start + tagged.len();
        let content = match response[content_start..].find("```") {
            Some(end) => &response[content_start..content_start + end],
            None => &response[content_start..],
        };
        return Some(content.trim().to_string());
    }

    let start = response.find("```")?;
    let after_fence = start + 3;
    let content_start = response[after_fence..]
        .find('\n')
        .map(|n| after_fence + n + 1)
        .unwrap_or(after_fence);

    let content = match response[content_start..].find("```") {
        Some(end) => &response[content_start..content_start + end],
        None => &response[content_start..],
    };
    Some(content.trim().to_string())
}

/// Byte offset just past the delimiter that closes the one at `start`.
///
/// Delimiters inside string literals are ignored, as are escaped quotes.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let open = text[start..].chars().next()?;
    let close = match open {
        '[' => ']',
        '{' => '}',
        _ => return None,
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + i + ch.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_tagged_fence() {
        let response = "Sure!\n```json\n{\"scenes\": [1, 2]}\n```\nEnjoy.";
        assert_eq!(extract_json(response).unwrap(), "{\"scenes\": [1, 2]}");
    }

    #[test]
    fn test_extract_json_from_untagged_fence() {
        let response = "```\n[{\"description\": \"x\"}]\n```";
        assert_eq!(extract_json(response).unwrap(), "[{\"description\": \"x\"}]");
    }

    #[test]
    fn test_extract_json_truncated_fence() {
        let response = "```json\n{\"scenes\": []}";
        assert_eq!(extract_json(response).unwrap(), "{\"scenes\": []}");
    }

    #[test]
    fn test_extract_json_prefers_first_structure() {
        let response = "Scenes: [{\"a\": 1}] and {\"b\": 2}";
        assert_eq!(extract_json(response).unwrap(), "[{\"a\": 1}]");
    }

    #[test]
    fn test_balanced_end_ignores_delimiters_in_strings() {
        let text = r#"{"description": "a } brace \" and ] bracket"} trailing"#;
        let end = balanced_end(text, 0).unwrap();
        assert_eq!(&text[..end], r#"{"description": "a } brace \" and ] bracket"}"#);
    }

    #[test]
    fn test_candidates_skip_past_bracketed_preamble() {
        let response = "Here are the scenes [as requested]:\n{\"scenes\": [{\"a\": [1]}]}";
        let candidates = json_candidates(response).unwrap();
        assert_eq!(
            candidates,
            vec!["[as requested]".to_string(), "{\"scenes\": [{\"a\": [1]}]}".to_string()]
        );
    }

    #[test]
    fn test_candidates_resume_after_unbalanced_opener() {
        let response = "Note (see [1: {\"scenes\": []}";
        assert_eq!(json_candidates(response).unwrap(), vec!["{\"scenes\": []}".to_string()]);
    }

    #[test]
    fn test_extract_json_blank_is_empty_response() {
        let err = extract_json("  \n").unwrap_err();
        assert_eq!(err.kind, DecompositionErrorKind::EmptyResponse);
        assert_eq!(err.raw_response, "  \n");
    }

    #[test]
    fn test_extract_json_prose_only_is_malformed() {
        let err = extract_json("I cannot help with that story.").unwrap_err();
        assert!(matches!(err.kind, DecompositionErrorKind::Malformed(_)));
        assert_eq!(err.raw_response, "I cannot help with that story.");
    }

    #[test]
    fn test_extract_json_unbalanced_is_malformed() {
        let err = extract_json("{\"scenes\": [").unwrap_err();
        assert!(matches!(err.kind, DecompositionErrorKind::Malformed(_)));
    }
}
