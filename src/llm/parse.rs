//! Helpers for pulling structured data out of free-form model output.

/// Extract a JSON object from a model response.
///
/// Handles ```json fences, bare fences and objects wrapped in chatter.
/// Returns the trimmed input unchanged when no object is found.
pub fn extract_json(response: &str) -> String {
    let response = response.trim();

    if let Some(rest) = response.strip_prefix("```json") {
        if let Some(end) = rest.rfind("```") {
            return rest[..end].trim().to_string();
        }
    }

    if response.starts_with("```") {
        if let Some(end) = response.rfind("```") {
            let start = response.find('\n').map(|n| n + 1).unwrap_or(3);
            if end > start {
                return response[start..end].trim().to_string();
            }
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end > start {
                return response[start..=end].to_string();
            }
        }
    }

    response.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_fenced_json() {
        let text = "```json\n{\"query\": \"q\"}\n```";
        assert_eq!(extract_json(text), "{\"query\": \"q\"}");
    }

    #[test]
    fn test_extract_bare_fence() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json(text), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_embedded_object() {
        let text = "Sure! Here it is: {\"a\": 1} hope that helps";
        assert_eq!(extract_json(text), "{\"a\": 1}");
    }

    #[test]
    fn test_no_object_returns_input() {
        assert_eq!(extract_json("  plain text "), "plain text");
    }
}
