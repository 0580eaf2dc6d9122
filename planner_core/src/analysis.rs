//! Deterministic template summary, no model involved.

use crate::{MuscleGroup, WorkoutTemplate};
use std::fmt;

const MIN_EXERCISES: usize = 4;
const MAX_EXERCISES: usize = 8;
const MIN_AVERAGE_REST: f64 = 60.0;

#[derive(Clone, Debug, PartialEq)]
pub struct TemplateAnalysis {
    pub name: String,
    pub estimated_duration: u32,
    pub total_exercises: usize,
    pub total_sets: u32,
    pub muscle_groups: Vec<MuscleGroup>,
    /// Average recorded rest in seconds, None when no exercise has one
    pub average_rest: Option<f64>,
    pub recommendations: Vec<String>,
}

pub fn analyze_locally(template: &WorkoutTemplate) -> TemplateAnalysis {
    let rests: Vec<f64> = template
        .exercises
        .iter()
        .filter_map(|e| e.rest_time.map(f64::from))
        .collect();
    let average_rest = if rests.is_empty() {
        None
    } else {
        Some(rests.iter().sum::<f64>() / rests.len() as f64)
    };

    let mut recommendations = Vec::new();
    let count = template.total_exercises();
    if count < MIN_EXERCISES {
        recommendations.push("Consider adding more exercises for a complete workout".to_string());
    }
    if count > MAX_EXERCISES {
        recommendations.push("High exercise volume - ensure adequate recovery".to_string());
    }
    if average_rest.is_some_and(|rest| rest < MIN_AVERAGE_REST) {
        recommendations.push("Consider longer rest periods for strength training".to_string());
    }

    TemplateAnalysis {
        name: template.name.clone(),
        estimated_duration: template.estimated_duration,
        total_exercises: count,
        total_sets: template.total_sets(),
        muscle_groups: template.muscle_groups.iter().copied().collect(),
        average_rest,
        recommendations,
    }
}

impl fmt::Display for TemplateAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis of '{}':", self.name)?;
        writeln!(f, "- Duration: {} minutes", self.estimated_duration)?;
        writeln!(
            f,
            "- Exercises: {} ({} sets)",
            self.total_exercises, self.total_sets
        )?;
        let groups: Vec<&str> = self.muscle_groups.iter().map(|g| g.as_str()).collect();
        writeln!(f, "- Muscle Groups: {}", groups.join(", "))?;
        if let Some(rest) = self.average_rest {
            writeln!(f, "- Average Rest: {:.0}s", rest)?;
        }
        if self.recommendations.is_empty() {
            write!(f, "- Recommendations: none")
        } else {
            write!(f, "- Recommendations: {}", self.recommendations.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::{muscle_groups_of, ExerciseSet};
    use chrono::Utc;
    use uuid::Uuid;

    fn template(rows: &[(&str, u32)]) -> WorkoutTemplate {
        let catalog = get_default_catalog();
        let exercises: Vec<_> = rows
            .iter()
            .map(|&(id, rest)| {
                ExerciseSet::new(catalog.get(id).unwrap(), 3, 10)
                    .unwrap()
                    .with_rest(rest)
            })
            .collect();
        WorkoutTemplate {
            id: Uuid::new_v4(),
            name: "Sample".into(),
            muscle_groups: muscle_groups_of(&exercises),
            estimated_duration: 30,
            exercises,
            is_ai_generated: false,
            generation_prompt: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_short_workout_with_short_rest() {
        let analysis = analyze_locally(&template(&[("squats", 45), ("plank", 30)]));
        assert_eq!(analysis.total_exercises, 2);
        assert_eq!(analysis.total_sets, 6);
        assert_eq!(analysis.average_rest, Some(37.5));
        assert_eq!(analysis.recommendations.len(), 2);
        assert!(analysis.recommendations[0].contains("more exercises"));
        assert!(analysis.recommendations[1].contains("longer rest"));
        assert_eq!(
            analysis.muscle_groups,
            vec![MuscleGroup::Abs, MuscleGroup::Legs, MuscleGroup::Glutes]
        );
    }

    #[test]
    fn test_balanced_workout_has_no_recommendations() {
        let analysis = analyze_locally(&template(&[
            ("squats", 90),
            ("bench_press", 90),
            ("bent_over_rows", 90),
            ("plank", 60),
        ]));
        assert!(analysis.recommendations.is_empty());
        assert!(analysis.to_string().ends_with("Recommendations: none"));
    }

    #[test]
    fn test_high_volume() {
        let ids = [
            "squats", "lunges", "plank", "crunches", "push_ups", "pull_ups", "deadlift",
            "running", "cycling",
        ];
        let rows: Vec<_> = ids.iter().map(|&id| (id, 90)).collect();
        let analysis = analyze_locally(&template(&rows));
        assert_eq!(analysis.recommendations.len(), 1);
        assert!(analysis.recommendations[0].contains("High exercise volume"));
    }
}
