//! Text completion backends.
//!
//! The planner only needs `prompt -> text`. Failures are returned once and
//! never retried here.

use crate::{Error, Result};
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};

/// A fallible text-in, text-out model
pub trait TextCompletion {
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Backend name for logs
    fn name(&self) -> &str;

    /// Successful calls so far
    fn usage_count(&self) -> u32;
}

/// Offline backend returning canned workouts picked by prompt keywords
pub struct DemoCompletion {
    usage: AtomicU32,
    max_usage: u32,
}

impl DemoCompletion {
    pub fn new(max_usage: u32) -> Self {
        Self {
            usage: AtomicU32::new(0),
            max_usage,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.max_usage.saturating_sub(self.usage_count())
    }
}

impl Default for DemoCompletion {
    fn default() -> Self {
        Self::new(crate::config::CompletionConfig::default().max_usage)
    }
}

impl TextCompletion for DemoCompletion {
    fn complete(&self, prompt: &str) -> Result<String> {
        let used = self.usage.load(Ordering::SeqCst);
        if used >= self.max_usage {
            return Err(Error::Completion(format!(
                "usage limit of {} calls reached",
                self.max_usage
            )));
        }

        let reply = canned_reply(prompt);
        self.usage.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("demo completion #{} ({} chars)", used + 1, reply.len());
        Ok(reply)
    }

    fn name(&self) -> &str {
        "demo"
    }

    fn usage_count(&self) -> u32 {
        self.usage.load(Ordering::SeqCst)
    }
}

const ANALYSIS_REPLY: &str = "Workout Analysis:
- Duration: Appropriate for the target muscle groups
- Exercise Selection: Well-balanced compound and isolation movements
- Volume: Moderate to high volume suitable for intermediate trainees
- Progression: Good variety for progressive overload
- Recommendations: Consider adding more core work and ensuring proper form";

/// Generation prompts carry the whole exercise list, so only the request
/// line is searched when one is present
fn keyword_scope(prompt: &str) -> String {
    prompt
        .lines()
        .find_map(|line| line.trim().strip_prefix(crate::prompt::REQUEST_MARKER))
        .unwrap_or(prompt)
        .to_lowercase()
}

fn canned_reply(prompt: &str) -> String {
    let text = keyword_scope(prompt);
    let has = |word: &str| text.contains(word);

    if has("analyze") || has("analysis") {
        return ANALYSIS_REPLY.to_string();
    }

    let reply = if has("customize") || has("modify") {
        workout(
            "Customized Upper Body Workout",
            50,
            &[
                ("Bench Press", 3, 8, 90),
                ("Assisted Pull-ups", 3, 6, 90),
                ("Overhead Press", 3, 8, 90),
                ("Bent-over Rows", 3, 10, 90),
                ("Bicep Curls", 3, 12, 60),
                ("Plank", 3, 30, 60),
            ],
        )
    } else if has("upper body") && has("strength") {
        workout(
            "Upper Body Strength Builder",
            45,
            &[
                ("Bench Press", 4, 6, 120),
                ("Pull-ups", 3, 8, 90),
                ("Overhead Press", 3, 8, 90),
                ("Bent-over Rows", 3, 10, 90),
                ("Bicep Curls", 3, 12, 60),
                ("Tricep Dips", 3, 10, 60),
            ],
        )
    } else if has("full body") && has("beginner") {
        workout(
            "Full Body Beginner Routine",
            30,
            &[
                ("Push-ups", 3, 8, 60),
                ("Squats", 3, 12, 60),
                ("Plank", 3, 30, 60),
                ("Lunges", 2, 10, 45),
                ("Crunches", 2, 15, 45),
            ],
        )
    } else if has("chest") && has("triceps") {
        workout(
            "Chest & Triceps Power",
            40,
            &[
                ("Bench Press", 4, 8, 90),
                ("Dumbbell Flyes", 3, 12, 60),
                ("Incline Bench Press", 3, 8, 90),
                ("Tricep Dips", 3, 12, 60),
                ("Close Grip Bench Press", 3, 10, 75),
            ],
        )
    } else if has("back") && has("biceps") {
        workout(
            "Back & Biceps Builder",
            45,
            &[
                ("Deadlift", 4, 5, 120),
                ("Pull-ups", 4, 8, 90),
                ("Bent-over Rows", 3, 10, 90),
                ("Lat Pulldowns", 3, 12, 60),
                ("Bicep Curls", 4, 12, 60),
            ],
        )
    } else {
        workout(
            "Balanced Full Body Workout",
            50,
            &[
                ("Squats", 4, 8, 90),
                ("Bench Press", 3, 8, 90),
                ("Bent-over Rows", 3, 10, 90),
                ("Overhead Press", 3, 8, 75),
                ("Plank", 3, 45, 60),
            ],
        )
    };

    reply.to_string()
}

fn workout(name: &str, minutes: u32, rows: &[(&str, u32, u32, u32)]) -> serde_json::Value {
    let exercises: Vec<_> = rows
        .iter()
        .map(|(exercise, sets, reps, rest)| {
            json!({
                "exercise_name": exercise,
                "sets": sets,
                "reps": reps,
                "rest_time": rest,
            })
        })
        .collect();

    json!({
        "workout_name": name,
        "estimated_duration": minutes,
        "exercises": exercises,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_workout;

    #[test]
    fn test_keyword_routing() {
        let demo = DemoCompletion::default();
        let cases = [
            ("I want upper body strength work", "Upper Body Strength Builder"),
            ("full body for a beginner", "Full Body Beginner Routine"),
            ("chest and triceps day", "Chest & Triceps Power"),
            ("back and biceps", "Back & Biceps Builder"),
            ("please modify my workout", "Customized Upper Body Workout"),
            ("leg day", "Balanced Full Body Workout"),
        ];
        for (prompt, expected) in cases {
            let reply = demo.complete(prompt).unwrap();
            let workout = extract_workout(&reply).unwrap();
            assert_eq!(workout.workout_name, expected, "prompt: {}", prompt);
        }
    }

    #[test]
    fn test_analysis_is_plain_text() {
        let demo = DemoCompletion::default();
        let reply = demo.complete("Analyze this workout template").unwrap();
        assert!(reply.starts_with("Workout Analysis:"));
        assert!(extract_workout(&reply).is_err());
    }

    #[test]
    fn test_only_request_line_is_searched() {
        let demo = DemoCompletion::default();
        let prompt = format!(
            "{} \"leg day\"\n- Push-ups (chest, triceps, shoulders)\n- Pull-ups (back, biceps)",
            crate::prompt::REQUEST_MARKER
        );
        let workout = extract_workout(&demo.complete(&prompt).unwrap()).unwrap();
        assert_eq!(workout.workout_name, "Balanced Full Body Workout");
    }

    #[test]
    fn test_usage_limit() {
        let demo = DemoCompletion::new(2);
        demo.complete("a").unwrap();
        demo.complete("b").unwrap();
        assert_eq!(demo.usage_count(), 2);
        assert_eq!(demo.remaining(), 0);

        let err = demo.complete("c").unwrap_err();
        assert!(matches!(err, Error::Completion(_)));
        assert_eq!(demo.usage_count(), 2);
    }
}
