use serde_json::Value;

use crate::error::{
    ClientError,
    ClientResult,
};

const MAX_NAME_LENGTH: usize = 128;

/// Placeholders the quiz prompt template must carry; the server fills
/// them in per topic.
pub const QUIZ_PROMPT_PLACEHOLDERS: [&str; 3] = ["{topic}", "{chunks}", "{num_questions_topic}"];

/// Checks a remote resource name (knowledge base, pipeline, vector
/// index, file). Whitespace-only names are rejected.
pub fn validate_resource_name(kind: &str, name: &str) -> ClientResult<()> {
    if name.trim().is_empty() {
        return Err(ClientError::InvalidArgument(format!(
            "{kind} name cannot be empty"
        )));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(ClientError::InvalidArgument(format!(
            "{kind} name exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }

    Ok(())
}

pub fn validate_positive(field: &str, value: f64) -> ClientResult<()> {
    if value <= 0.0 {
        return Err(ClientError::InvalidArgument(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

/// A percentage-like value in (0, 100].
pub fn validate_ratio(field: &str, value: f64) -> ClientResult<()> {
    if value <= 0.0 || value > 100.0 {
        return Err(ClientError::InvalidArgument(format!(
            "{field} must be between 0 and 100"
        )));
    }
    Ok(())
}

/// Metadata filters must be a mapping with non-empty keys.
pub fn validate_metadata_filters(filters: &Value) -> ClientResult<()> {
    let Some(map) = filters.as_object() else {
        return Err(ClientError::InvalidArgument(
            "metadata_filters must be a JSON object".to_string(),
        ));
    };

    for key in map.keys() {
        if key.trim().is_empty() {
            return Err(ClientError::InvalidArgument(
                "metadata_filters keys cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// The per-topic quiz prompt must contain every required placeholder;
/// the error names all of the missing ones.
pub fn validate_quiz_prompt(prompt: &str) -> ClientResult<()> {
    if prompt.trim().is_empty() {
        return Err(ClientError::InvalidArgument(
            "prompt_per_topic cannot be empty".to_string(),
        ));
    }

    let missing: Vec<&str> = QUIZ_PROMPT_PLACEHOLDERS
        .iter()
        .copied()
        .filter(|placeholder| !prompt.contains(placeholder))
        .collect();

    if !missing.is_empty() {
        return Err(ClientError::InvalidArgument(format!(
            "prompt_per_topic is missing required placeholders: {}",
            missing.join(", ")
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_validate_resource_name_valid() {
        assert!(validate_resource_name("Knowledge base", "demoKnowledgeBase").is_ok());
        assert!(validate_resource_name("Pipeline", "index-pipeline_v2").is_ok());
    }

    #[test]
    fn test_validate_resource_name_whitespace_only() {
        assert!(validate_resource_name("Pipeline", "").is_err());
        assert!(validate_resource_name("Pipeline", "   ").is_err());
        assert!(validate_resource_name("Pipeline", "\t\n").is_err());
    }

    #[test]
    fn test_validate_resource_name_too_long() {
        assert!(validate_resource_name("Knowledge base", &"a".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("max_tokens", 200.0).is_ok());
        assert!(validate_positive("max_tokens", 0.0).is_err());
        assert!(validate_positive("temperature", -0.5).is_err());
    }

    #[test]
    fn test_validate_ratio() {
        assert!(validate_ratio("extract_percentage", 12.5).is_ok());
        assert!(validate_ratio("extract_percentage", 100.0).is_ok());
        assert!(validate_ratio("extract_percentage", 0.0).is_err());
        assert!(validate_ratio("extract_percentage", 120.0).is_err());
    }

    #[test]
    fn test_validate_metadata_filters() {
        assert!(validate_metadata_filters(&json!({"tag": "charlie_munger"})).is_ok());
        assert!(validate_metadata_filters(&json!({})).is_ok());
        assert!(validate_metadata_filters(&json!({" ": "x"})).is_err());
        assert!(validate_metadata_filters(&json!(["not", "a", "map"])).is_err());
    }

    #[test]
    fn test_validate_quiz_prompt_lists_missing_placeholders() {
        let err = validate_quiz_prompt("Write questions about {topic}").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("{chunks}"));
        assert!(message.contains("{num_questions_topic}"));
        assert!(!message.contains("{topic},"));
    }

    #[test]
    fn test_validate_quiz_prompt_complete() {
        let prompt = "From {chunks}, write {num_questions_topic} questions on {topic}";
        assert!(validate_quiz_prompt(prompt).is_ok());
    }
}
