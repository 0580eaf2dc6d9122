//! Prompt text sent to the completion backend.

use crate::catalog::ExerciseCatalog;
use crate::{UserPreferences, WorkoutTemplate};
use std::fmt::Write;

/// Prefix of the line carrying the user's own words
pub const REQUEST_MARKER: &str = "USER REQUEST:";

const RESPONSE_SHAPE: &str = r#"{
    "workout_name": "Descriptive workout name",
    "estimated_duration": 45,
    "exercises": [
        {
            "exercise_name": "Exercise Name",
            "sets": 3,
            "reps": 8,
            "rest_time": 90,
            "notes": "Optional form tips"
        }
    ]
}"#;

fn join_or_none(items: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    let joined = items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "None".to_string()
    } else {
        joined
    }
}

/// Prompt asking for a new workout
///
/// Lists only the exercises the user's equipment allows, so the model has
/// nothing else to name.
pub fn build_generation_prompt(
    user_prompt: &str,
    prefs: &UserPreferences,
    catalog: &ExerciseCatalog,
) -> String {
    let mut out = String::new();

    out.push_str("You are a professional fitness trainer creating a personalized workout plan.\n\n");
    let _ = writeln!(out, "{} \"{}\"\n", REQUEST_MARKER, user_prompt.trim());

    out.push_str("USER PROFILE:\n");
    let _ = writeln!(out, "- Experience Level: {}", prefs.experience_level);
    let _ = writeln!(out, "- Goals: {}", prefs.goals);
    let _ = writeln!(
        out,
        "- Available Equipment: {}",
        join_or_none(&prefs.available_equipment)
    );
    let _ = writeln!(out, "- Time Available: {} minutes", prefs.time_per_session);
    let _ = writeln!(
        out,
        "- Preferred Muscle Groups: {}",
        join_or_none(prefs.preferred_muscle_groups.iter().map(|g| g.as_str()))
    );
    let _ = writeln!(
        out,
        "- Avoid Exercises: {}\n",
        join_or_none(&prefs.avoid_exercises)
    );

    out.push_str("AVAILABLE EXERCISES:\n");
    for exercise in catalog.available_given(&prefs.available_equipment) {
        let groups = join_or_none(exercise.muscle_groups.iter().map(|g| g.as_str()));
        let _ = writeln!(out, "- {} ({})", exercise.name, groups);
    }

    out.push_str(
        "\nINSTRUCTIONS:\n\
         Create a workout plan that matches the user's request and profile. \
         Keep the difficulty right for their experience, use only the equipment \
         listed and fit the time available.\n\n\
         Respond with a JSON object in this exact format:\n",
    );
    out.push_str(RESPONSE_SHAPE);
    out.push_str("\n\nMake sure all exercise names exactly match the available exercises listed above.\n");
    out
}

/// Prompt asking for a modified copy of an existing template
pub fn build_customization_prompt(template: &WorkoutTemplate, modifications: &str) -> String {
    format!(
        "Modify this workout: {}. Changes requested: {}.\n\
         Original workout: {}\n\n\
         Respond with a JSON object in this exact format:\n{}\n",
        template.name,
        modifications.trim(),
        template.to_json(),
        RESPONSE_SHAPE
    )
}

pub fn build_analysis_prompt(template: &WorkoutTemplate) -> String {
    format!(
        "Analyze this workout template and provide recommendations: {}",
        template.to_json()
    )
}
