#![forbid(unsafe_code)]

//! Core domain model and pipeline for the rplan workout planner.
//!
//! This crate provides:
//! - Domain types (exercises, templates, preferences)
//! - The exercise catalog and fuzzy name resolution
//! - The completion pipeline: extract, build, validate
//! - Duration estimation and local analysis
//! - The routine planner service and its in-memory store

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod duration;
pub mod extract;
pub mod builder;
pub mod validate;
pub mod completion;
pub mod prompt;
pub mod store;
pub mod planner;
pub mod analysis;

// Re-export commonly used types
pub use error::{BuildError, Error, ExtractionError, Result, ValidationError};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, ExerciseCatalog};
pub use config::Config;
pub use builder::TemplateBuilder;
pub use validate::ConstraintValidator;
pub use completion::{DemoCompletion, TextCompletion};
pub use store::TemplateStore;
pub use planner::{template_from_completion, RoutinePlanner};
