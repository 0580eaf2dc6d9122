//! Domain checks that gate every generated template.
//!
//! Rules run in a fixed order and the first violation is returned:
//! 1. name sanity            6. duration consistency
//! 2. non-empty              7. session budget, upper bound
//! 3. no duplicates          8. session budget, lower bound
//! 4. beginner volume        9. preferred muscle group overlap
//! 5. equipment feasibility

use crate::catalog::ExerciseCatalog;
use crate::config::ValidationConfig;
use crate::duration;
use crate::error::ValidationError;
use crate::types::*;
use std::collections::HashSet;

/// Runs the rule battery against a template and the requester's preferences
pub struct ConstraintValidator<'a> {
    catalog: &'a ExerciseCatalog,
    limits: ValidationConfig,
}

impl<'a> ConstraintValidator<'a> {
    pub fn new(catalog: &'a ExerciseCatalog) -> Self {
        Self {
            catalog,
            limits: ValidationConfig::default(),
        }
    }

    pub fn with_limits(mut self, limits: ValidationConfig) -> Self {
        self.limits = limits;
        self
    }

    /// Accept (Ok) or reject with the first violated rule
    pub fn validate(
        &self,
        template: &WorkoutTemplate,
        prefs: &UserPreferences,
    ) -> Result<(), ValidationError> {
        let result = self.check_all(template, prefs);
        match &result {
            Ok(()) => tracing::debug!("Template '{}' passed validation", template.name),
            Err(e) => tracing::info!(
                "Template '{}' rejected by {}: {}",
                template.name,
                e.rule(),
                e
            ),
        }
        result
    }

    fn check_all(
        &self,
        template: &WorkoutTemplate,
        prefs: &UserPreferences,
    ) -> Result<(), ValidationError> {
        self.check_name(template)?;
        check_non_empty(template)?;
        check_duplicates(template)?;
        self.check_beginner_volume(template, prefs)?;
        self.check_equipment(template, prefs)?;
        self.check_duration_consistency(template, prefs)?;
        self.check_session_budget(template, prefs)?;
        check_preference_overlap(template, prefs)
    }

    fn check_name(&self, template: &WorkoutTemplate) -> Result<(), ValidationError> {
        let name = template.name.trim();
        if name.chars().count() < self.limits.min_name_len {
            return Err(ValidationError::NameTooShort {
                name: name.to_string(),
                min_len: self.limits.min_name_len,
            });
        }
        Ok(())
    }

    fn check_beginner_volume(
        &self,
        template: &WorkoutTemplate,
        prefs: &UserPreferences,
    ) -> Result<(), ValidationError> {
        if prefs.experience_level != ExperienceLevel::Beginner {
            return Ok(());
        }
        let total_sets = template.total_sets();
        if total_sets > self.limits.beginner_max_sets {
            return Err(ValidationError::BeginnerVolumeExceeded {
                total_sets,
                limit: self.limits.beginner_max_sets,
            });
        }
        Ok(())
    }

    fn check_equipment(
        &self,
        template: &WorkoutTemplate,
        prefs: &UserPreferences,
    ) -> Result<(), ValidationError> {
        let available: HashSet<String> = self
            .catalog
            .available_given(&prefs.available_equipment)
            .iter()
            .map(|e| e.id.clone())
            .collect();

        for set in &template.exercises {
            if !available.contains(&set.exercise.id) {
                return Err(ValidationError::EquipmentUnavailable {
                    exercise: set.exercise.name.clone(),
                    required: set.exercise.equipment.clone().unwrap_or_default(),
                    available: prefs.available_equipment.join(", "),
                });
            }
        }
        Ok(())
    }

    fn check_duration_consistency(
        &self,
        template: &WorkoutTemplate,
        prefs: &UserPreferences,
    ) -> Result<(), ValidationError> {
        let computed = duration::estimate(&template.exercises);
        let tolerance = self.limits.duration_tolerance(prefs.time_per_session);
        let gap = f64::from(computed.abs_diff(template.estimated_duration));
        if gap > tolerance {
            return Err(ValidationError::DurationMismatch {
                stated: template.estimated_duration,
                computed,
                tolerance,
            });
        }
        Ok(())
    }

    fn check_session_budget(
        &self,
        template: &WorkoutTemplate,
        prefs: &UserPreferences,
    ) -> Result<(), ValidationError> {
        let stated = f64::from(template.estimated_duration);

        let max = self.limits.max_duration(prefs.time_per_session);
        if stated > max {
            return Err(ValidationError::OverSessionBudget {
                stated: template.estimated_duration,
                budget: prefs.time_per_session,
                max,
            });
        }

        let min = self.limits.min_duration(prefs.time_per_session);
        if stated < min {
            return Err(ValidationError::UnderSessionMinimum {
                stated: template.estimated_duration,
                budget: prefs.time_per_session,
                min,
            });
        }
        Ok(())
    }
}

fn check_non_empty(template: &WorkoutTemplate) -> Result<(), ValidationError> {
    if template.exercises.is_empty() {
        return Err(ValidationError::NoExercises);
    }
    Ok(())
}

fn check_duplicates(template: &WorkoutTemplate) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for set in &template.exercises {
        if !seen.insert(set.exercise.id.as_str()) {
            return Err(ValidationError::DuplicateExercise {
                exercise_id: set.exercise.id.clone(),
            });
        }
    }
    Ok(())
}

fn check_preference_overlap(
    template: &WorkoutTemplate,
    prefs: &UserPreferences,
) -> Result<(), ValidationError> {
    if prefs.preferred_muscle_groups.is_empty() {
        return Ok(());
    }
    if prefs
        .preferred_muscle_groups
        .iter()
        .any(|g| template.muscle_groups.contains(g))
    {
        return Ok(());
    }
    Err(ValidationError::NoPreferredMuscleGroup {
        preferred: prefs.preferred_muscle_groups.iter().copied().collect(),
        trained: template.muscle_groups.iter().copied().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use chrono::Utc;
    use uuid::Uuid;

    fn set(id: &str, sets: u32, reps: u32, rest: u32) -> ExerciseSet {
        let exercise = get_default_catalog().get(id).unwrap();
        ExerciseSet::new(exercise, sets, reps).unwrap().with_rest(rest)
    }

    /// Template whose stated duration equals the estimate
    fn template(name: &str, exercises: Vec<ExerciseSet>) -> WorkoutTemplate {
        WorkoutTemplate {
            id: Uuid::new_v4(),
            name: name.into(),
            muscle_groups: muscle_groups_of(&exercises),
            estimated_duration: duration::estimate(&exercises),
            exercises,
            is_ai_generated: true,
            generation_prompt: None,
            created_at: Utc::now(),
        }
    }

    fn prefs(level: ExperienceLevel, equipment: &[&str], minutes: u32) -> UserPreferences {
        UserPreferences {
            experience_level: level,
            goals: "get strong".into(),
            available_equipment: equipment.iter().map(|s| s.to_string()).collect(),
            time_per_session: minutes,
            preferred_muscle_groups: Default::default(),
            avoid_exercises: vec![],
        }
    }

    fn validator() -> ConstraintValidator<'static> {
        ConstraintValidator::new(get_default_catalog())
    }

    /// 30 min of barbell work: bench 4x8/120 + deadlift 4x5/150 + squats 4x8/120
    fn strength_block() -> Vec<ExerciseSet> {
        vec![
            set("bench_press", 4, 8, 120),
            set("deadlift", 4, 5, 150),
            set("squats", 4, 8, 120),
        ]
    }

    #[test]
    fn test_accepts_consistent_template() {
        crate::logging::init_test();
        let t = template("Strength Block", strength_block());
        assert_eq!(t.estimated_duration, 30);
        let p = prefs(ExperienceLevel::Intermediate, &["barbell", "bench"], 45);
        assert_eq!(validator().validate(&t, &p), Ok(()));
    }

    #[test]
    fn test_name_sanity() {
        let t = template("  Ab  ", strength_block());
        let p = prefs(ExperienceLevel::Intermediate, &["barbell"], 45);
        let err = validator().validate(&t, &p).unwrap_err();
        assert_eq!(err.rule(), "name_sanity");
    }

    #[test]
    fn test_non_empty() {
        let t = template("Nothing", vec![]);
        let p = prefs(ExperienceLevel::Intermediate, &["barbell"], 45);
        assert_eq!(
            validator().validate(&t, &p),
            Err(ValidationError::NoExercises)
        );
    }

    #[test]
    fn test_duplicates_rejected_even_if_built_by_hand() {
        let t = template(
            "Double Squat",
            vec![set("squats", 3, 10, 90), set("squats", 3, 10, 90)],
        );
        let p = prefs(ExperienceLevel::Intermediate, &["barbell"], 45);
        assert_eq!(
            validator().validate(&t, &p),
            Err(ValidationError::DuplicateExercise {
                exercise_id: "squats".into()
            })
        );
    }

    #[test]
    fn test_beginner_volume_ceiling() {
        let ids = [
            "push_ups",
            "squats",
            "lunges",
            "plank",
            "crunches",
            "russian_twists",
            "calf_raises",
            "running",
            "pull_ups",
            "tricep_dips",
        ];
        let exercises: Vec<_> = ids.iter().map(|id| set(id, 3, 10, 60)).collect();
        let t = template("Everything Day", exercises);
        assert_eq!(t.total_sets(), 30);

        let p = prefs(ExperienceLevel::Beginner, &["bodyweight"], 45);
        assert_eq!(
            validator().validate(&t, &p),
            Err(ValidationError::BeginnerVolumeExceeded {
                total_sets: 30,
                limit: 24
            })
        );

        // same volume is not capped for intermediate users
        let p = prefs(ExperienceLevel::Intermediate, &["bodyweight"], 45);
        let err = validator().validate(&t, &p).unwrap_err();
        assert_ne!(err.rule(), "beginner_volume");
    }

    #[test]
    fn test_equipment_feasibility() {
        let t = template("Strength Block", strength_block());
        let p = prefs(ExperienceLevel::Intermediate, &["bodyweight"], 45);
        match validator().validate(&t, &p).unwrap_err() {
            ValidationError::EquipmentUnavailable {
                exercise, required, ..
            } => {
                assert_eq!(exercise, "Bench Press");
                assert_eq!(required, "barbell, bench");
            }
            other => panic!("expected equipment rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_duration_consistency() {
        let mut t = template("Quick One", vec![set("plank", 1, 1, 0)]);
        t.estimated_duration = 180;
        let p = prefs(ExperienceLevel::Intermediate, &[], 45);
        let err = validator().validate(&t, &p).unwrap_err();
        assert_eq!(err.rule(), "duration_consistency");
        assert!(err.to_string().contains("180"));
    }

    #[test]
    fn test_session_upper_bound() {
        // 4 big lifts with long rest: ~75 min against a 45 min budget (max 67.5)
        let exercises = vec![
            set("bench_press", 5, 5, 240),
            set("deadlift", 5, 5, 240),
            set("squats", 5, 5, 240),
            set("overhead_press", 5, 5, 240),
        ];
        let t = template("Heavy Day", exercises);
        assert!(t.estimated_duration > 68);
        let p = prefs(ExperienceLevel::Advanced, &["barbell", "bench"], 45);
        let err = validator().validate(&t, &p).unwrap_err();
        assert_eq!(err.rule(), "session_upper_bound");
    }

    #[test]
    fn test_session_lower_bound() {
        let t = template("Tiny Core", vec![set("plank", 2, 10, 60)]);
        assert!(t.estimated_duration < 10);
        let p = prefs(ExperienceLevel::Intermediate, &[], 45);
        let err = validator().validate(&t, &p).unwrap_err();
        assert_eq!(err.rule(), "session_lower_bound");
    }

    #[test]
    fn test_preference_overlap() {
        let t = template("Strength Block", strength_block());
        let mut p = prefs(ExperienceLevel::Intermediate, &["barbell", "bench"], 45);
        p.preferred_muscle_groups = [MuscleGroup::Cardio, MuscleGroup::Abs].into_iter().collect();
        let err = validator().validate(&t, &p).unwrap_err();
        assert_eq!(err.rule(), "preference_overlap");

        p.preferred_muscle_groups.insert(MuscleGroup::Glutes);
        assert_eq!(validator().validate(&t, &p), Ok(()));
    }

    #[test]
    fn test_rule_order_is_fixed() {
        // short name, beginner overload and missing equipment at once:
        // the name rule must be reported
        let exercises: Vec<_> = [
            "bench_press",
            "deadlift",
            "squats",
            "overhead_press",
            "bent_over_rows",
            "bicep_curls",
            "close_grip_bench",
            "incline_bench",
            "lat_pulldowns",
        ]
        .iter()
        .map(|id| set(id, 3, 8, 60))
        .collect();
        let t = template("X", exercises.clone());
        let p = prefs(ExperienceLevel::Beginner, &["bodyweight"], 45);
        assert_eq!(validator().validate(&t, &p).unwrap_err().rule(), "name_sanity");

        let t = template("Gym Tour", exercises);
        assert_eq!(
            validator().validate(&t, &p).unwrap_err().rule(),
            "beginner_volume"
        );
    }

    #[test]
    fn test_huge_hand_built_counts_do_not_overflow() {
        let exercises = vec![
            set("push_ups", u32::MAX, u32::MAX, 60),
            set("lunges", u32::MAX, 10, 60),
        ];
        let mut t = template("Absurd Volume", exercises);
        assert_eq!(t.total_sets(), u32::MAX);

        let p = prefs(ExperienceLevel::Beginner, &["bodyweight"], 45);
        assert_eq!(
            validator().validate(&t, &p),
            Err(ValidationError::BeginnerVolumeExceeded {
                total_sets: u32::MAX,
                limit: 24
            })
        );

        t.estimated_duration = 40;
        let p = prefs(ExperienceLevel::Intermediate, &["bodyweight"], 45);
        let err = validator().validate(&t, &p).unwrap_err();
        assert_eq!(err.rule(), "duration_consistency");
    }

    #[test]
    fn test_configurable_limits() {
        let ids = ["push_ups", "squats", "lunges", "plank", "crunches"];
        let exercises: Vec<_> = ids.iter().map(|id| set(id, 4, 10, 60)).collect();
        let t = template("Circuit", exercises);
        let p = prefs(ExperienceLevel::Beginner, &["bodyweight"], 45);
        assert_eq!(validator().validate(&t, &p), Ok(()));

        let strict = ValidationConfig {
            beginner_max_sets: 16,
            ..ValidationConfig::default()
        };
        let err = validator().with_limits(strict).validate(&t, &p).unwrap_err();
        assert_eq!(err.rule(), "beginner_volume");
    }
}
