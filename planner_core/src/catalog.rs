//! Exercise catalog: the fixed reference table the model output is matched against.
//!
//! Records are shared as `Arc<ExerciseRecord>` so templates can point into the
//! catalog without copying. Iteration order is insertion order and never changes.

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<ExerciseCatalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static ExerciseCatalog {
    &DEFAULT_CATALOG
}

/// Read-only exercise table with fuzzy name lookup
#[derive(Clone, Debug, Default)]
pub struct ExerciseCatalog {
    exercises: Vec<Arc<ExerciseRecord>>,
    by_id: HashMap<String, usize>,
}

impl ExerciseCatalog {
    /// Build a catalog from records, keeping their order
    ///
    /// A record whose id is already present replaces nothing; the first one wins
    /// and the duplicate is reported by [`ExerciseCatalog::validate`].
    pub fn from_records(records: impl IntoIterator<Item = ExerciseRecord>) -> Self {
        let mut catalog = Self::default();
        for record in records {
            catalog.push(record);
        }
        catalog
    }

    fn push(&mut self, record: ExerciseRecord) {
        if !self.by_id.contains_key(&record.id) {
            self.by_id.insert(record.id.clone(), self.exercises.len());
        }
        self.exercises.push(Arc::new(record));
    }

    /// Return a copy of this catalog with extra records appended
    pub fn extended(&self, extra: impl IntoIterator<Item = ExerciseRecord>) -> Self {
        let mut catalog = self.clone();
        for record in extra {
            tracing::debug!("Adding custom exercise '{}' to catalog", record.id);
            catalog.push(record);
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<Arc<ExerciseRecord>> {
        self.by_id.get(id).map(|&idx| Arc::clone(&self.exercises[idx]))
    }

    /// All records in catalog order
    pub fn all(&self) -> &[Arc<ExerciseRecord>] {
        &self.exercises
    }

    pub fn by_muscle_group(&self, group: MuscleGroup) -> Vec<Arc<ExerciseRecord>> {
        self.exercises
            .iter()
            .filter(|e| e.muscle_groups.contains(&group))
            .cloned()
            .collect()
    }

    /// Exercises that can be done with the given equipment
    ///
    /// Exercises without a requirement (or with `"none"`) are always available.
    /// Otherwise any descriptor that is a case-insensitive substring of the
    /// exercise's equipment string makes it available. Blank descriptors are ignored.
    pub fn available_given<S: AsRef<str>>(&self, equipment: &[S]) -> Vec<Arc<ExerciseRecord>> {
        let wanted: Vec<String> = equipment
            .iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        self.exercises
            .iter()
            .filter(|exercise| is_available(exercise, &wanted))
            .cloned()
            .collect()
    }

    /// Resolve a free-text exercise name to a catalog record
    ///
    /// Tiers, first hit wins:
    /// 1. case-insensitive exact name match
    /// 2. exact match after [`normalize_exercise_name`]
    /// 3. substring match in either direction against the normalized query;
    ///    candidates ranked by length difference, ties by catalog order
    pub fn resolve_by_name(&self, name: &str) -> Option<Arc<ExerciseRecord>> {
        let query = name.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        if let Some(hit) = self.find(|n| n == query) {
            return Some(hit);
        }

        let normalized = normalize_exercise_name(&query);
        if normalized.is_empty() {
            return None;
        }

        if let Some(hit) = self.find(|n| n == normalized) {
            tracing::debug!("Resolved '{}' via normalized name '{}'", name, normalized);
            return Some(hit);
        }

        let best = self
            .exercises
            .iter()
            .enumerate()
            .filter_map(|(idx, exercise)| {
                let candidate = exercise.name.to_lowercase();
                if candidate.contains(&normalized) || normalized.contains(&candidate) {
                    Some((candidate.len().abs_diff(normalized.len()), idx))
                } else {
                    None
                }
            })
            .min();

        match best {
            Some((_, idx)) => {
                let hit = Arc::clone(&self.exercises[idx]);
                tracing::debug!("Resolved '{}' to '{}' by substring", name, hit.name);
                Some(hit)
            }
            None => None,
        }
    }

    fn find(&self, matches: impl Fn(&str) -> bool) -> Option<Arc<ExerciseRecord>> {
        self.exercises
            .iter()
            .find(|e| matches(&e.name.to_lowercase()))
            .cloned()
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for exercise in &self.exercises {
            if exercise.id.is_empty() {
                errors.push(format!("Exercise '{}' has empty ID", exercise.name));
            }
            if !seen.insert(exercise.id.as_str()) {
                errors.push(format!("Duplicate exercise ID '{}'", exercise.id));
            }
            if exercise.name.trim().is_empty() {
                errors.push(format!("Exercise '{}' has empty name", exercise.id));
            }
            if exercise.muscle_groups.is_empty() {
                errors.push(format!("Exercise '{}' has no muscle groups", exercise.id));
            }
        }

        errors
    }
}

/// Default catalog with user-defined exercises appended
///
/// Fails when the combined table is inconsistent (duplicate ids, missing
/// names or muscle groups).
pub fn catalog_with_custom(custom: &[ExerciseRecord]) -> Result<ExerciseCatalog> {
    if custom.is_empty() {
        return Ok(get_default_catalog().clone());
    }

    let catalog = get_default_catalog().extended(custom.iter().cloned());
    let errors = catalog.validate();
    if !errors.is_empty() {
        return Err(Error::CatalogValidation(errors.join("; ")));
    }
    tracing::info!("Catalog has {} exercises ({} custom)", catalog.len(), custom.len());
    Ok(catalog)
}

fn is_available(exercise: &ExerciseRecord, wanted: &[String]) -> bool {
    if exercise.needs_no_equipment() {
        return true;
    }
    let required = exercise
        .equipment
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    wanted.iter().any(|eq| required.contains(eq.as_str()))
}

/// Normalize a lowercase exercise name for the second resolution tier
///
/// Strips a trailing parenthesized qualifier, a trailing "on ..." clause and a
/// leading "dumbbell "/"barbell " token.
pub fn normalize_exercise_name(name: &str) -> String {
    let mut s = name.trim().to_lowercase();

    if s.ends_with(')') {
        if let Some(open) = s.rfind('(') {
            s.truncate(open);
        }
    }

    if let Some(pos) = s.find(" on ") {
        s.truncate(pos);
    }

    let mut trimmed = s.trim();
    for prefix in ["dumbbell ", "barbell "] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            trimmed = rest.trim_start();
            break;
        }
    }

    trimmed.trim().to_string()
}

fn record(
    id: &str,
    name: &str,
    groups: &[MuscleGroup],
    pattern: &str,
    equipment: &str,
    instructions: &str,
) -> ExerciseRecord {
    ExerciseRecord {
        id: id.into(),
        name: name.into(),
        muscle_groups: groups.iter().copied().collect(),
        movement_pattern: pattern.into(),
        equipment: Some(equipment.into()),
        instructions: Some(instructions.into()),
    }
}

/// Builds the default catalog with the built-in exercises
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom catalogs.
pub fn build_default_catalog() -> ExerciseCatalog {
    use MuscleGroup::*;

    ExerciseCatalog::from_records([
        // ====================================================================
        // Chest
        // ====================================================================
        record(
            "bench_press",
            "Bench Press",
            &[Chest, Triceps, Shoulders],
            "push",
            "barbell, bench",
            "Lie on bench, grip barbell slightly wider than shoulders, lower to chest, press up",
        ),
        record(
            "push_ups",
            "Push-ups",
            &[Chest, Triceps, Shoulders],
            "push",
            "none",
            "Start in plank position, lower chest to ground, push back up",
        ),
        record(
            "dumbbell_flyes",
            "Dumbbell Flyes",
            &[Chest],
            "push",
            "dumbbells, bench",
            "Lie on bench, arms extended, lower dumbbells in arc motion, bring together",
        ),
        record(
            "incline_bench",
            "Incline Bench Press",
            &[Chest, Shoulders, Triceps],
            "push",
            "barbell, incline bench",
            "Similar to bench press but on incline bench at 30-45 degrees",
        ),
        // ====================================================================
        // Back
        // ====================================================================
        record(
            "pull_ups",
            "Pull-ups",
            &[Back, Biceps],
            "pull",
            "pull-up bar",
            "Hang from bar, pull body up until chin clears bar, lower slowly",
        ),
        record(
            "deadlift",
            "Deadlift",
            &[Back, Glutes, Legs],
            "hip hinge",
            "barbell",
            "Stand with feet hip-width apart, grip bar, lift by extending hips and knees",
        ),
        record(
            "bent_over_rows",
            "Bent-over Rows",
            &[Back, Biceps],
            "pull",
            "barbell or dumbbells",
            "Bend at hips, pull weight to lower chest, squeeze shoulder blades",
        ),
        record(
            "lat_pulldowns",
            "Lat Pulldowns",
            &[Back, Biceps],
            "pull",
            "cable machine",
            "Sit at lat pulldown machine, pull bar to upper chest, control return",
        ),
        // ====================================================================
        // Shoulders
        // ====================================================================
        record(
            "overhead_press",
            "Overhead Press",
            &[Shoulders, Triceps],
            "push",
            "barbell or dumbbells",
            "Press weight overhead from shoulder level, extend fully",
        ),
        record(
            "lateral_raises",
            "Lateral Raises",
            &[Shoulders],
            "isolation",
            "dumbbells",
            "Raise arms to sides until parallel to ground, lower slowly",
        ),
        record(
            "rear_delt_flyes",
            "Rear Delt Flyes",
            &[Shoulders],
            "isolation",
            "dumbbells",
            "Bend forward, raise dumbbells to sides, focus on rear delts",
        ),
        // ====================================================================
        // Arms
        // ====================================================================
        record(
            "bicep_curls",
            "Bicep Curls",
            &[Biceps],
            "isolation",
            "dumbbells or barbell",
            "Curl weight up, squeeze biceps at top, lower slowly",
        ),
        record(
            "tricep_dips",
            "Tricep Dips",
            &[Triceps],
            "push",
            "parallel bars or bench",
            "Lower body by bending arms, push back up using triceps",
        ),
        record(
            "close_grip_bench",
            "Close Grip Bench Press",
            &[Triceps, Chest],
            "push",
            "barbell, bench",
            "Bench press with hands closer together, focus on triceps",
        ),
        // ====================================================================
        // Legs
        // ====================================================================
        record(
            "squats",
            "Squats",
            &[Legs, Glutes],
            "squat",
            "barbell or bodyweight",
            "Lower body by bending knees and hips, keep chest up, drive through heels",
        ),
        record(
            "lunges",
            "Lunges",
            &[Legs, Glutes],
            "lunge",
            "bodyweight or dumbbells",
            "Step forward, lower back knee toward ground, push back to start",
        ),
        record(
            "leg_press",
            "Leg Press",
            &[Legs, Glutes],
            "push",
            "leg press machine",
            "Push weight with legs, control descent, extend fully",
        ),
        record(
            "calf_raises",
            "Calf Raises",
            &[Legs],
            "isolation",
            "bodyweight or machine",
            "Raise up on toes, hold briefly, lower slowly",
        ),
        // ====================================================================
        // Core
        // ====================================================================
        record(
            "plank",
            "Plank",
            &[Abs],
            "isometric",
            "none",
            "Hold straight line from head to heels, engage core",
        ),
        record(
            "crunches",
            "Crunches",
            &[Abs],
            "isolation",
            "none",
            "Lift shoulders off ground, crunch abs, lower slowly",
        ),
        record(
            "russian_twists",
            "Russian Twists",
            &[Abs],
            "rotation",
            "bodyweight or medicine ball",
            "Sit, lean back, rotate torso side to side",
        ),
        // ====================================================================
        // Cardio
        // ====================================================================
        record(
            "running",
            "Running",
            &[Cardio, Legs],
            "cardio",
            "none",
            "Maintain steady pace, focus on breathing",
        ),
        record(
            "cycling",
            "Cycling",
            &[Cardio, Legs],
            "cardio",
            "bike",
            "Maintain steady cadence, focus on smooth pedaling",
        ),
    ])
}
