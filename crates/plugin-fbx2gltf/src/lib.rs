//! # Plugin FBX2glTF
//!
//! A meshpipe task plugin that batch-converts FBX models to glTF using the
//! external `FBX2glTF` converter.
//!
//! One run discovers every FBX file under the task's input directory,
//! converts them concurrently through a bounded worker pool, moves each
//! converter output directory from `dist/<name>_out` to `dist/<name>`, and
//! writes `manifest.json` listing the produced files and their sizes.
//! A run with any failed file still writes the manifest for the files that
//! did convert, then fails with an error naming every failed input.

pub mod config;
pub mod converter;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod flags;
pub mod manifest;
pub mod metrics;
pub mod models;
pub mod plugin;
pub mod processor;

pub use config::ConversionConfig;
pub use error::ConversionError;
pub use executor::ProcessCommandRunner;
pub use models::{ConversionOptions, ConversionResult, TaskContext, TaskOutput};
pub use plugin::Fbx2GltfExecutor;
pub use processor::ConversionProcessor;
