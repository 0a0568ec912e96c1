use std::fmt;

use serde_json::Value;

use super::schema::{
    steps_for_stage,
    HOOKS_STAGES,
    INDEX_STAGES,
    QUERY_STAGES,
};
use crate::error::ClientError;

/// A single problem found in a pipeline configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Where the problem is, e.g. `index -> stages[0] -> steps[1]`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// All issues found in one validation pass, rendered one per line.
#[derive(Debug, Clone)]
pub struct PipelineConfigError {
    pub issues: Vec<ConfigIssue>,
}

impl fmt::Display for PipelineConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.issues.iter().map(|issue| issue.to_string()).collect();
        write!(f, "{}", rendered.join("\n"))
    }
}

impl std::error::Error for PipelineConfigError {}

impl From<PipelineConfigError> for ClientError {
    fn from(err: PipelineConfigError) -> Self {
        ClientError::InvalidPipelineConfig(err.to_string())
    }
}

fn braced(options: &[&str]) -> String {
    format!("{{{}}}", options.join(", "))
}

pub(crate) fn validate_document(doc: &Value) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    let Some(root) = doc.as_object() else {
        issues.push(ConfigIssue {
            path: String::new(),
            message: "pipeline config must be a YAML mapping".to_string(),
        });
        return issues;
    };

    match root.get("index") {
        Some(section) => validate_section("index", section, INDEX_STAGES, &mut issues),
        None => issues.push(ConfigIssue {
            path: "index".to_string(),
            message: "missing required 'index' section".to_string(),
        }),
    }

    if let Some(section) = root.get("query") {
        validate_section("query", section, QUERY_STAGES, &mut issues);
    }
    if let Some(section) = root.get("hooks") {
        validate_section("hooks", section, HOOKS_STAGES, &mut issues);
    }

    issues
}

fn validate_section(name: &str, value: &Value, allowed_stages: &[&str], issues: &mut Vec<ConfigIssue>) {
    let Some(section) = value.as_object() else {
        issues.push(ConfigIssue {
            path: name.to_string(),
            message: "expected a mapping with 'name' and 'stages'".to_string(),
        });
        return;
    };

    match section.get("name").and_then(Value::as_str) {
        Some(pipeline_name) if !pipeline_name.trim().is_empty() => {}
        _ => issues.push(ConfigIssue {
            path: format!("{name} -> name"),
            message: "expected a non-empty string for 'name'".to_string(),
        }),
    }

    let Some(stages) = section.get("stages").and_then(Value::as_array) else {
        issues.push(ConfigIssue {
            path: format!("{name} -> stages"),
            message: "expected a sequence for 'stages'".to_string(),
        });
        return;
    };

    for (i, stage) in stages.iter().enumerate() {
        validate_stage(&format!("{name} -> stages[{i}]"), stage, allowed_stages, issues);
    }
}

fn validate_stage(path: &str, value: &Value, allowed_stages: &[&str], issues: &mut Vec<ConfigIssue>) {
    let Some(stage) = value.as_object() else {
        issues.push(ConfigIssue {
            path: path.to_string(),
            message: "expected a mapping with 'stage' and 'steps'".to_string(),
        });
        return;
    };

    let stage_name = match stage.get("stage").and_then(Value::as_str) {
        Some(stage_name) => {
            if !allowed_stages.contains(&stage_name) {
                issues.push(ConfigIssue {
                    path: path.to_string(),
                    message: format!(
                        "you passed an invalid stage name '{stage_name}'. The valid stage names \
                         you can pass are: {}",
                        braced(allowed_stages)
                    ),
                });
            }
            Some(stage_name)
        }
        None => {
            issues.push(ConfigIssue {
                path: path.to_string(),
                message: "expected a string for 'stage'".to_string(),
            });
            None
        }
    };

    let Some(steps) = stage.get("steps").and_then(Value::as_array) else {
        issues.push(ConfigIssue {
            path: format!("{path} -> steps"),
            message: "expected a sequence for 'steps'".to_string(),
        });
        return;
    };

    let allowed_steps = stage_name.and_then(steps_for_stage);
    for (i, step) in steps.iter().enumerate() {
        validate_step(&format!("{path} -> steps[{i}]"), step, allowed_steps, issues);
    }
}

fn validate_step(
    path: &str, value: &Value, allowed_steps: Option<&'static [&'static str]>,
    issues: &mut Vec<ConfigIssue>,
) {
    let Some(step) = value.as_object() else {
        issues.push(ConfigIssue {
            path: path.to_string(),
            message: "expected a mapping with 'step' and 'name'".to_string(),
        });
        return;
    };

    match step.get("step").and_then(Value::as_str) {
        Some(step_name) => {
            if let Some(allowed) = allowed_steps {
                if !allowed.contains(&step_name) {
                    issues.push(ConfigIssue {
                        path: path.to_string(),
                        message: format!(
                            "you passed an invalid step name '{step_name}'. The valid step names \
                             for this stage are {}",
                            braced(allowed)
                        ),
                    });
                }
            }
        }
        None => issues.push(ConfigIssue {
            path: path.to_string(),
            message: "expected a string for 'step'".to_string(),
        }),
    }

    match step.get("name").and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => {}
        _ => issues.push(ConfigIssue {
            path: format!("{path} -> name"),
            message: "expected a non-empty string for 'name'".to_string(),
        }),
    }

    if let Some(step_args) = step.get("step_args") {
        if !step_args.is_object() {
            issues.push(ConfigIssue {
                path: format!("{path} -> step_args"),
                message: "you must pass a mapping for 'step_args' (an empty one is fine)"
                    .to_string(),
            });
        }
    }

    if let Some(depends_on) = step.get("depends_on") {
        let all_strings = depends_on
            .as_array()
            .is_some_and(|deps| deps.iter().all(Value::is_string));
        if !all_strings {
            issues.push(ConfigIssue {
                path: format!("{path} -> depends_on"),
                message: "you must pass a sequence of step names for 'depends_on' (an empty one \
                          is fine)"
                    .to_string(),
            });
        }
    }
}
