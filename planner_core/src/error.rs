//! Error types for the planner_core library.
//!
//! The completion pipeline fails with exactly one of [`ExtractionError`],
//! [`BuildError`] or [`ValidationError`]; everything else is ambient.

use crate::MuscleGroup;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// No usable workout object could be recovered from completion text
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractionError {
    #[error("no JSON object found in completion ({scanned} chars scanned)")]
    NoJsonObject { scanned: usize },

    #[error("malformed shape: {0}")]
    MalformedShape(String),
}

impl ExtractionError {
    pub fn reason(&self) -> &'static str {
        match self {
            ExtractionError::NoJsonObject { .. } => "no_json_object",
            ExtractionError::MalformedShape(_) => "malformed_shape",
        }
    }
}

/// The recovered workout could not be mapped onto the catalog
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("no valid exercises: none of {attempted} entries matched the catalog ({names:?})")]
    NoValidExercises { attempted: usize, names: Vec<String> },
}

impl BuildError {
    pub fn reason(&self) -> &'static str {
        match self {
            BuildError::NoValidExercises { .. } => "no_valid_exercises",
        }
    }
}

/// A built template broke one of the domain rules
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("workout name '{name}' must be at least {min_len} characters")]
    NameTooShort { name: String, min_len: usize },

    #[error("workout contains no exercises")]
    NoExercises,

    #[error("exercise '{exercise_id}' appears more than once")]
    DuplicateExercise { exercise_id: String },

    #[error("beginner workout has {total_sets} sets, limit is {limit}")]
    BeginnerVolumeExceeded { total_sets: u32, limit: u32 },

    #[error("'{exercise}' needs '{required}', available: [{available}]")]
    EquipmentUnavailable {
        exercise: String,
        required: String,
        available: String,
    },

    #[error("stated duration {stated} min differs from computed {computed} min by more than {tolerance} min")]
    DurationMismatch {
        stated: u32,
        computed: u32,
        tolerance: f64,
    },

    #[error("duration {stated} min exceeds session budget of {budget} min (max {max} min)")]
    OverSessionBudget { stated: u32, budget: u32, max: f64 },

    #[error("duration {stated} min is below the minimum of {min} min for a {budget} min session")]
    UnderSessionMinimum { stated: u32, budget: u32, min: f64 },

    #[error("none of the preferred muscle groups {preferred:?} are trained (template trains {trained:?})")]
    NoPreferredMuscleGroup {
        preferred: Vec<MuscleGroup>,
        trained: Vec<MuscleGroup>,
    },
}

impl ValidationError {
    /// Stable rule code for diagnostics and assertions
    pub fn rule(&self) -> &'static str {
        match self {
            ValidationError::NameTooShort { .. } => "name_sanity",
            ValidationError::NoExercises => "non_empty",
            ValidationError::DuplicateExercise { .. } => "no_duplicates",
            ValidationError::BeginnerVolumeExceeded { .. } => "beginner_volume",
            ValidationError::EquipmentUnavailable { .. } => "equipment_feasibility",
            ValidationError::DurationMismatch { .. } => "duration_consistency",
            ValidationError::OverSessionBudget { .. } => "session_upper_bound",
            ValidationError::UnderSessionMinimum { .. } => "session_lower_bound",
            ValidationError::NoPreferredMuscleGroup { .. } => "preference_overlap",
        }
    }
}

/// Core error type for planner_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The text completion backend failed
    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Template {0} not found")]
    TemplateNotFound(String),

    #[error("No preferences stored for user {0}")]
    PreferencesNotFound(String),

    #[error("Invalid exercise set: {0}")]
    InvalidExerciseSet(String),
}

impl Error {
    /// Short code for the pipeline failures, None for ambient errors
    pub fn pipeline_code(&self) -> Option<&'static str> {
        match self {
            Error::Extraction(e) => Some(e.reason()),
            Error::Build(e) => Some(e.reason()),
            Error::Validation(e) => Some(e.rule()),
            _ => None,
        }
    }
}
