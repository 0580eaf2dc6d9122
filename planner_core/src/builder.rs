//! Turn an extracted workout into a template backed by catalog records.
//!
//! Resolution is tolerant: rows that cannot be matched are skipped with a
//! warning. Only a workout where nothing resolves is an error. Counts above
//! [`MAX_SETS`], [`MAX_REPS`] and [`MAX_REST_SECONDS`] are clamped.

use crate::catalog::ExerciseCatalog;
use crate::config::BuilderConfig;
use crate::error::BuildError;
use crate::types::*;
use crate::duration;
use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

/// Ceiling for sets on a single exercise
pub const MAX_SETS: u32 = 50;

/// Ceiling for reps (or seconds, for holds) per set
pub const MAX_REPS: u32 = 500;

/// Ceiling for rest between sets
pub const MAX_REST_SECONDS: u32 = 3600;

/// Maps generated rows onto catalog exercises
pub struct TemplateBuilder<'a> {
    catalog: &'a ExerciseCatalog,
    defaults: BuilderConfig,
}

impl<'a> TemplateBuilder<'a> {
    pub fn new(catalog: &'a ExerciseCatalog) -> Self {
        Self {
            catalog,
            defaults: BuilderConfig::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: BuilderConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Build an AI-generated template
    ///
    /// `provenance` is stored as the template's generation prompt: the user's
    /// original request, or a description of the customization that produced it.
    pub fn build(
        &self,
        workout: &GeneratedWorkout,
        provenance: &str,
    ) -> Result<WorkoutTemplate, BuildError> {
        let mut exercises = Vec::with_capacity(workout.exercises.len());
        let mut seen = HashSet::new();

        for entry in &workout.exercises {
            let Some(set) = self.resolve_entry(entry) else {
                continue;
            };
            if !seen.insert(set.exercise.id.clone()) {
                tracing::warn!(
                    "Skipping repeated exercise '{}' in '{}'",
                    set.exercise.name,
                    workout.workout_name
                );
                continue;
            }
            exercises.push(set);
        }

        if exercises.is_empty() {
            return Err(BuildError::NoValidExercises {
                attempted: workout.exercises.len(),
                names: workout
                    .exercises
                    .iter()
                    .filter_map(|e| e.exercise_name.clone())
                    .collect(),
            });
        }

        let estimated_duration = match workout.estimated_duration {
            Some(minutes) if minutes > 0.0 => minutes.round() as u32,
            _ => duration::estimate(&exercises),
        };

        let template = WorkoutTemplate {
            id: Uuid::new_v4(),
            name: workout.workout_name.clone(),
            muscle_groups: muscle_groups_of(&exercises),
            exercises,
            estimated_duration,
            is_ai_generated: true,
            generation_prompt: Some(provenance.to_string()),
            created_at: Utc::now(),
        };

        tracing::info!(
            "Built template '{}' with {} of {} exercises, ~{} min",
            template.name,
            template.exercises.len(),
            workout.exercises.len(),
            template.estimated_duration
        );

        Ok(template)
    }

    fn resolve_entry(&self, entry: &GeneratedExerciseEntry) -> Option<ExerciseSet> {
        let Some(name) = entry.exercise_name.as_deref() else {
            tracing::warn!("Skipping exercise entry without a name");
            return None;
        };

        let Some(exercise) = self.catalog.resolve_by_name(name) else {
            tracing::warn!("Exercise not found in catalog: {}", name);
            return None;
        };

        let count = |field: &str, value: Option<i64>, default: u32, ceiling: u32| {
            let count = positive_or(value, default);
            if count > ceiling {
                tracing::warn!(
                    "Clamping {} for '{}' from {} to {}",
                    field,
                    exercise.name,
                    count,
                    ceiling
                );
            }
            count.min(ceiling)
        };

        Some(ExerciseSet {
            sets: count("sets", entry.sets, self.defaults.default_sets, MAX_SETS),
            reps: count("reps", entry.reps, self.defaults.default_reps, MAX_REPS),
            rest_time: Some(count(
                "rest_time",
                entry.rest_time,
                self.defaults.default_rest_seconds,
                MAX_REST_SECONDS,
            )),
            weight: None,
            exercise,
        })
    }
}

fn positive_or(value: Option<i64>, default: u32) -> u32 {
    match value {
        Some(v) if v > 0 => u32::try_from(v).unwrap_or(u32::MAX),
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;

    fn entry(name: &str, sets: Option<i64>, reps: Option<i64>, rest: Option<i64>) -> GeneratedExerciseEntry {
        GeneratedExerciseEntry {
            exercise_name: Some(name.into()),
            sets,
            reps,
            rest_time: rest,
            notes: None,
        }
    }

    fn workout(duration: Option<f64>, exercises: Vec<GeneratedExerciseEntry>) -> GeneratedWorkout {
        GeneratedWorkout {
            workout_name: "Test Workout".into(),
            estimated_duration: duration,
            exercises,
        }
    }

    #[test]
    fn test_builds_leg_day() {
        let builder = TemplateBuilder::new(get_default_catalog());
        let template = builder
            .build(
                &workout(Some(40.0), vec![entry("Squats", Some(3), Some(10), Some(90))]),
                "leg day please",
            )
            .unwrap();

        assert!(template.is_ai_generated);
        assert_eq!(template.generation_prompt.as_deref(), Some("leg day please"));
        assert_eq!(template.estimated_duration, 40);
        assert_eq!(template.exercises[0].exercise.id, "squats");
        assert_eq!(
            template.muscle_groups,
            [MuscleGroup::Legs, MuscleGroup::Glutes].into_iter().collect()
        );
    }

    #[test]
    fn test_defaults_for_missing_or_non_positive() {
        let builder = TemplateBuilder::new(get_default_catalog());
        let template = builder
            .build(
                &workout(None, vec![entry("Plank", None, Some(0), Some(-5))]),
                "p",
            )
            .unwrap();

        let plank = &template.exercises[0];
        assert_eq!(plank.sets, 3);
        assert_eq!(plank.reps, 8);
        assert_eq!(plank.rest_time, Some(90));
    }

    #[test]
    fn test_custom_defaults() {
        let builder = TemplateBuilder::new(get_default_catalog()).with_defaults(BuilderConfig {
            default_sets: 4,
            default_reps: 5,
            default_rest_seconds: 120,
        });
        let template = builder
            .build(&workout(None, vec![entry("Deadlift", None, None, None)]), "p")
            .unwrap();
        let deadlift = &template.exercises[0];
        assert_eq!((deadlift.sets, deadlift.reps, deadlift.rest_time), (4, 5, Some(120)));
    }

    #[test]
    fn test_duration_falls_back_to_estimate() {
        let builder = TemplateBuilder::new(get_default_catalog());
        let rows = vec![entry("Squats", Some(3), Some(10), Some(90))];

        let missing = builder.build(&workout(None, rows.clone()), "p").unwrap();
        assert_eq!(missing.estimated_duration, 6);

        let zero = builder.build(&workout(Some(0.0), rows), "p").unwrap();
        assert_eq!(zero.estimated_duration, 6);
    }

    #[test]
    fn test_huge_counts_are_clamped() {
        crate::logging::init_test();
        let builder = TemplateBuilder::new(get_default_catalog());
        let template = builder
            .build(
                &workout(
                    None,
                    vec![entry(
                        "Squats",
                        Some(i64::from(u32::MAX)),
                        Some(i64::MAX),
                        Some(1_000_000),
                    )],
                ),
                "p",
            )
            .unwrap();

        let squats = &template.exercises[0];
        assert_eq!(squats.sets, MAX_SETS);
        assert_eq!(squats.reps, MAX_REPS);
        assert_eq!(squats.rest_time, Some(MAX_REST_SECONDS));
        // 50*500*3 + 50*3600 = 255000s
        assert_eq!(template.estimated_duration, 4250);
    }

    #[test]
    fn test_unresolved_entries_are_dropped() {
        let builder = TemplateBuilder::new(get_default_catalog());
        let template = builder
            .build(
                &workout(
                    Some(30.0),
                    vec![
                        entry("Muscle-ups", Some(3), Some(5), None),
                        entry("Push-ups", Some(3), Some(12), Some(60)),
                        GeneratedExerciseEntry::default(),
                    ],
                ),
                "p",
            )
            .unwrap();

        assert_eq!(template.exercises.len(), 1);
        assert_eq!(template.exercises[0].exercise.id, "push_ups");
    }

    #[test]
    fn test_repeated_exercise_is_dropped() {
        let builder = TemplateBuilder::new(get_default_catalog());
        let template = builder
            .build(
                &workout(
                    Some(30.0),
                    vec![
                        entry("Bench Press", Some(4), Some(6), Some(120)),
                        entry("Barbell Bench Press", Some(3), Some(8), Some(90)),
                    ],
                ),
                "p",
            )
            .unwrap();

        assert_eq!(template.exercises.len(), 1);
        assert_eq!(template.exercises[0].sets, 4);
    }

    #[test]
    fn test_nothing_resolves() {
        let builder = TemplateBuilder::new(get_default_catalog());
        let err = builder
            .build(
                &workout(Some(30.0), vec![entry("Muscle-ups", None, None, None)]),
                "p",
            )
            .unwrap_err();

        assert_eq!(err.reason(), "no_valid_exercises");
        assert!(err.to_string().contains("Muscle-ups"));
    }

    #[test]
    fn test_empty_exercise_list() {
        let builder = TemplateBuilder::new(get_default_catalog());
        let err = builder.build(&workout(Some(30.0), vec![]), "p").unwrap_err();
        assert_eq!(
            err,
            BuildError::NoValidExercises {
                attempted: 0,
                names: vec![]
            }
        );
    }

    #[test]
    fn test_each_build_gets_fresh_id() {
        let builder = TemplateBuilder::new(get_default_catalog());
        let w = workout(Some(20.0), vec![entry("Crunches", Some(2), Some(15), Some(45))]);
        let a = builder.build(&w, "p").unwrap();
        let b = builder.build(&w, "p").unwrap();
        assert_ne!(a.id, b.id);
    }
}
