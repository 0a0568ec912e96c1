//! Pipeline configuration: the YAML document describing the ingestion
//! (`index`), retrieval (`query`) and post-processing (`hooks`) stages a
//! pipeline executes server-side.

mod schema;
mod validate;

pub use schema::{
    PipelineConfig,
    PipelineOverrides,
    Stage,
    StagePipeline,
    Step,
};
pub use validate::{
    ConfigIssue,
    PipelineConfigError,
};
