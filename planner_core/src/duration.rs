//! Session duration estimate from set, rep and rest counts.
//!
//! Model: every rep costs a fixed tempo of [`SECONDS_PER_REP`], every set
//! additionally costs its rest period ([`DEFAULT_REST_SECONDS`] when unset).
//! Arithmetic saturates, so hand-built sets with absurd counts cannot overflow.

use crate::ExerciseSet;

/// Work time charged per repetition
pub const SECONDS_PER_REP: u64 = 3;

/// Rest charged per set when the exercise has none recorded
pub const DEFAULT_REST_SECONDS: u32 = 90;

/// Total seconds for a list of exercise sets
pub fn estimate_seconds(exercises: &[ExerciseSet]) -> u64 {
    exercises.iter().fold(0u64, |total, e| {
        let sets = u64::from(e.sets);
        let reps = u64::from(e.reps);
        let rest = u64::from(e.rest_time.unwrap_or(DEFAULT_REST_SECONDS));
        let work = sets.saturating_mul(reps).saturating_mul(SECONDS_PER_REP);
        total
            .saturating_add(work)
            .saturating_add(sets.saturating_mul(rest))
    })
}

/// Estimated duration in whole minutes (rounded to nearest)
pub fn estimate(exercises: &[ExerciseSet]) -> u32 {
    let seconds = estimate_seconds(exercises);
    (seconds as f64 / 60.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;

    fn set(id: &str, sets: u32, reps: u32, rest: Option<u32>) -> ExerciseSet {
        let exercise = get_default_catalog().get(id).unwrap();
        let mut set = ExerciseSet::new(exercise, sets, reps).unwrap();
        set.rest_time = rest;
        set
    }

    #[test]
    fn test_single_exercise() {
        // 3*10*3 + 3*90 = 360s
        let exercises = vec![set("squats", 3, 10, Some(90))];
        assert_eq!(estimate_seconds(&exercises), 360);
        assert_eq!(estimate(&exercises), 6);
    }

    #[test]
    fn test_default_rest_applies() {
        let with_default = vec![set("plank", 2, 5, None)];
        let explicit = vec![set("plank", 2, 5, Some(90))];
        assert_eq!(estimate_seconds(&with_default), estimate_seconds(&explicit));
    }

    #[test]
    fn test_rounding() {
        // 1*1*3 + 1*27 = 30s -> 0.5 min rounds up
        assert_eq!(estimate(&[set("crunches", 1, 1, Some(27))]), 1);
        // 1*1*3 + 1*26 = 29s -> rounds down
        assert_eq!(estimate(&[set("crunches", 1, 1, Some(26))]), 0);
    }

    #[test]
    fn test_multiple_exercises_sum() {
        let exercises = vec![
            set("bench_press", 4, 6, Some(120)),
            set("pull_ups", 3, 8, Some(90)),
        ];
        // (72 + 480) + (72 + 270) = 894s -> 14.9 min
        assert_eq!(estimate(&exercises), 15);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(estimate(&[]), 0);
    }

    #[test]
    fn test_huge_counts_saturate() {
        let exercises = vec![
            set("squats", u32::MAX, u32::MAX, Some(u32::MAX)),
            set("lunges", u32::MAX, u32::MAX, None),
        ];
        assert_eq!(estimate_seconds(&exercises), u64::MAX);
        assert_eq!(estimate(&exercises), u32::MAX);
    }

    #[test]
    fn test_deterministic() {
        let exercises = vec![set("deadlift", 5, 5, Some(180)), set("lunges", 3, 12, None)];
        assert_eq!(estimate(&exercises), estimate(&exercises));
    }
}
