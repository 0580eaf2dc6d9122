//! Core domain types for the routine planner.
//!
//! This module defines the fundamental types used throughout the system:
//! - Muscle groups and experience levels
//! - Catalog exercise records
//! - Raw model output rows and built exercise sets
//! - Workout templates and user preferences
//! - Weekly volume bookkeeping

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

// ============================================================================
// Tags
// ============================================================================

/// Muscle group an exercise trains
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Abs,
    Legs,
    Glutes,
    Cardio,
}

impl MuscleGroup {
    pub const ALL: [MuscleGroup; 9] = [
        MuscleGroup::Chest,
        MuscleGroup::Back,
        MuscleGroup::Shoulders,
        MuscleGroup::Biceps,
        MuscleGroup::Triceps,
        MuscleGroup::Abs,
        MuscleGroup::Legs,
        MuscleGroup::Glutes,
        MuscleGroup::Cardio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Abs => "abs",
            MuscleGroup::Legs => "legs",
            MuscleGroup::Glutes => "glutes",
            MuscleGroup::Cardio => "cardio",
        }
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MuscleGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        MuscleGroup::ALL
            .iter()
            .copied()
            .find(|g| g.as_str() == wanted)
            .ok_or_else(|| format!("unknown muscle group '{}'", s))
    }
}

/// User skill level, ordered beginner < intermediate < advanced
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(ExperienceLevel::Beginner),
            "intermediate" => Ok(ExperienceLevel::Intermediate),
            "advanced" => Ok(ExperienceLevel::Advanced),
            other => Err(format!("unknown experience level '{}'", other)),
        }
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Equipment sentinel meaning the exercise needs nothing
pub const NO_EQUIPMENT: &str = "none";

/// A catalog exercise (e.g., "Bench Press")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseRecord {
    pub id: String,
    pub name: String,
    pub muscle_groups: BTreeSet<MuscleGroup>,
    pub movement_pattern: String,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl ExerciseRecord {
    /// True when the exercise has no equipment requirement at all
    pub fn needs_no_equipment(&self) -> bool {
        match self.equipment.as_deref() {
            None => true,
            Some(eq) => eq.trim().is_empty() || eq.trim().eq_ignore_ascii_case(NO_EQUIPMENT),
        }
    }
}

// ============================================================================
// Raw Model Output
// ============================================================================

/// One exercise row as the model wrote it, before catalog resolution
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeneratedExerciseEntry {
    pub exercise_name: Option<String>,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    pub rest_time: Option<i64>,
    pub notes: Option<String>,
}

/// Workout object recovered from a completion
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedWorkout {
    pub workout_name: String,
    pub estimated_duration: Option<f64>,
    pub exercises: Vec<GeneratedExerciseEntry>,
}

// ============================================================================
// Template Types
// ============================================================================

/// One exercise within a template
#[derive(Clone, Debug, PartialEq)]
pub struct ExerciseSet {
    pub exercise: Arc<ExerciseRecord>,
    pub sets: u32,
    pub reps: u32,
    pub weight: Option<f64>,
    pub rest_time: Option<u32>,
}

impl ExerciseSet {
    /// Create an exercise set, rejecting zero sets or reps
    pub fn new(exercise: Arc<ExerciseRecord>, sets: u32, reps: u32) -> crate::Result<Self> {
        if sets == 0 || reps == 0 {
            return Err(crate::Error::InvalidExerciseSet(format!(
                "'{}' needs at least 1 set and 1 rep (got {}x{})",
                exercise.name, sets, reps
            )));
        }
        Ok(Self {
            exercise,
            sets,
            reps,
            weight: None,
            rest_time: None,
        })
    }

    pub fn with_rest(mut self, seconds: u32) -> Self {
        self.rest_time = Some(seconds);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// A complete workout template
#[derive(Clone, Debug)]
pub struct WorkoutTemplate {
    pub id: Uuid,
    pub name: String,
    pub exercises: Vec<ExerciseSet>,
    pub muscle_groups: BTreeSet<MuscleGroup>,
    pub estimated_duration: u32,
    pub is_ai_generated: bool,
    pub generation_prompt: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WorkoutTemplate {
    pub fn total_exercises(&self) -> usize {
        self.exercises.len()
    }

    pub fn total_sets(&self) -> u32 {
        self.exercises
            .iter()
            .fold(0u32, |total, e| total.saturating_add(e.sets))
    }

    /// JSON view used when the template is handed back to the model
    pub fn to_json(&self) -> serde_json::Value {
        let exercises: Vec<serde_json::Value> = self
            .exercises
            .iter()
            .map(|e| {
                serde_json::json!({
                    "exercise_name": e.exercise.name,
                    "sets": e.sets,
                    "reps": e.reps,
                    "rest_time": e.rest_time,
                    "weight": e.weight,
                })
            })
            .collect();

        serde_json::json!({
            "workout_name": self.name,
            "estimated_duration": self.estimated_duration,
            "muscle_groups": self.muscle_groups,
            "is_ai_generated": self.is_ai_generated,
            "exercises": exercises,
        })
    }
}

/// Union of the muscle groups trained by a list of exercise sets
pub fn muscle_groups_of(exercises: &[ExerciseSet]) -> BTreeSet<MuscleGroup> {
    exercises
        .iter()
        .flat_map(|e| e.exercise.muscle_groups.iter().copied())
        .collect()
}

// ============================================================================
// User Types
// ============================================================================

/// What the user asked for; fixed for the duration of one request
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserPreferences {
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub goals: String,
    #[serde(default)]
    pub available_equipment: Vec<String>,
    pub time_per_session: u32,
    #[serde(default)]
    pub preferred_muscle_groups: BTreeSet<MuscleGroup>,
    #[serde(default)]
    pub avoid_exercises: Vec<String>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            experience_level: ExperienceLevel::Intermediate,
            goals: String::new(),
            available_equipment: vec!["bodyweight".into()],
            time_per_session: 45,
            preferred_muscle_groups: BTreeSet::new(),
            avoid_exercises: Vec::new(),
        }
    }
}

/// Volume accumulated by one muscle group in one week
#[derive(Clone, Debug, PartialEq)]
pub struct WeeklyVolume {
    pub muscle_group: MuscleGroup,
    pub week_start: NaiveDate,
    pub volume: f64,
}
