//! Pipeline orchestration and the HTTP surface for formfill.

pub mod pipeline;
pub mod rest;

pub use pipeline::{FormFillPipeline, PipelineSettings};
pub use rest::{ApiError, RestApi};
