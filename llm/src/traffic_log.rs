//! Traffic logging for LLM API calls
//!
//! Emits request/response summaries as tracing events on the `llm::traffic`
//! target. Content is truncated to avoid leaking private data in logs.

/// Maximum characters to log for content (to protect privacy)
const MAX_CONTENT_LOG_CHARS: usize = 200;

/// Truncate a string for logging, adding ellipsis if truncated
pub fn truncate_for_log(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}... ({} chars total)", truncated, char_count)
    }
}

fn summarize(payload: &impl serde::Serialize) -> String {
    let json =
        serde_json::to_string(payload).unwrap_or_else(|_| "<serialization error>".to_string());
    truncate_for_log(&json, MAX_CONTENT_LOG_CHARS)
}

/// Log an LLM request (truncated summary only)
pub fn log_request(model: &str, request: &impl serde::Serialize) {
    tracing::debug!(target: "llm::traffic", model, event = "REQUEST", "{}", summarize(request));
}

/// Log an LLM response (truncated summary only)
pub fn log_response(model: &str, response: &impl serde::Serialize) {
    tracing::debug!(target: "llm::traffic", model, event = "RESPONSE", "{}", summarize(response));
}

/// Log an LLM error
pub fn log_error(model: &str, error: &str) {
    tracing::warn!(target: "llm::traffic", model, event = "ERROR", "{}", error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_strings_are_untouched() {
        assert_eq!(truncate_for_log("hello", 10), "hello");
    }

    #[test]
    fn long_strings_report_total_length() {
        let s = "ä".repeat(12);
        assert_eq!(truncate_for_log(&s, 4), "ääää... (12 chars total)");
    }
}
