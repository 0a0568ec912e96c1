use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;

use super::validate::{
    validate_document,
    ConfigIssue,
    PipelineConfigError,
};

/// Stage names accepted inside each section of the document.
pub(crate) const INDEX_STAGES: &[&str] =
    &["Preprocessor", "Chunker", "Embedder", "Scorer", "Clusterer"];
pub(crate) const QUERY_STAGES: &[&str] = &["Retriever", "Reranker"];
pub(crate) const HOOKS_STAGES: &[&str] = &["Scorer", "Clusterer"];

/// Step implementations the service ships for a given stage.
pub(crate) fn steps_for_stage(stage: &str) -> Option<&'static [&'static str]> {
    Some(match stage {
        "Preprocessor" => &["OCPreprocessor"],
        "Chunker" => &["OCChunker", "BCChunker"],
        "Embedder" => &["SentenceTransformerEmbedder"],
        "Scorer" => &["LexRank"],
        "Clusterer" => &["LouvainCommunityDetection", "KmeansClassifier"],
        "Retriever" => &["OCRetriever"],
        "Reranker" => &["OCReranker"],
        _ => return None,
    })
}

/// A validated pipeline configuration.
///
/// `index` is mandatory; `query` and `hooks` are optional sections with
/// their own allowed stage sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub index: StagePipeline,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<StagePipeline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<StagePipeline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagePipeline {
    pub name: String,
    pub stages: Vec<Stage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub stage: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub step: String,
    pub name: String,
    #[serde(default)]
    pub step_args: BTreeMap<String, Value>,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

/// Caller-supplied tweaks applied before validation.
///
/// Wildcard overrides are plain substring replacements on the raw YAML
/// text; nested overrides replace whole top-level sections of the
/// parsed document.
#[derive(Debug, Clone, Default)]
pub struct PipelineOverrides {
    pub wildcard: BTreeMap<String, String>,
    pub nested: BTreeMap<String, Value>,
}

impl PipelineConfig {
    /// Parses and validates a YAML pipeline configuration, collecting
    /// every issue rather than stopping at the first.
    pub fn from_yaml(yaml: &str) -> Result<Self, PipelineConfigError> {
        Self::from_yaml_with_overrides(yaml, &PipelineOverrides::default())
    }

    pub fn from_yaml_with_overrides(
        yaml: &str, overrides: &PipelineOverrides,
    ) -> Result<Self, PipelineConfigError> {
        let mut text = yaml.to_string();
        for (needle, replacement) in &overrides.wildcard {
            text = text.replace(needle.as_str(), replacement);
        }

        let parsed: serde_yaml::Value = serde_yaml::from_str(&text)
            .map_err(|e| PipelineConfigError::single(format!("invalid YAML: {e}")))?;
        let mut doc: Value = serde_json::to_value(parsed).map_err(|e| {
            PipelineConfigError::single(format!("mapping keys must be strings: {e}"))
        })?;

        if !overrides.nested.is_empty() {
            let Some(root) = doc.as_object_mut() else {
                return Err(PipelineConfigError::single(
                    "pipeline config must be a YAML mapping".to_string(),
                ));
            };
            for (section, replacement) in &overrides.nested {
                root.insert(section.clone(), replacement.clone());
            }
        }

        let issues = validate_document(&doc);
        if !issues.is_empty() {
            return Err(PipelineConfigError { issues });
        }

        serde_json::from_value(doc).map_err(|e| {
            PipelineConfigError::single(format!("invalid pipeline config: {e}"))
        })
    }

    pub fn to_yaml(&self) -> Result<String, PipelineConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| PipelineConfigError::single(format!("failed to render YAML: {e}")))
    }
}

impl PipelineConfigError {
    pub(crate) fn single(message: String) -> Self {
        Self {
            issues: vec![ConfigIssue {
                path: String::new(),
                message,
            }],
        }
    }
}
