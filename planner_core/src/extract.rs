//! Recover a workout object from free-form completion text.
//!
//! The model is asked for bare JSON but routinely wraps it in prose or a
//! markdown fence. Three strategies are tried in order and the first one that
//! yields a JSON object wins:
//! 1. the span from the first `{` to the last `}`
//! 2. the interior of a ```` ``` ```` fence (any info string is skipped)
//! 3. the smallest `{ ... }` span around a `"workout_name"` key
//!
//! Only the top-level shape is checked here; exercise rows are left for the builder.

use crate::error::ExtractionError;
use crate::types::{GeneratedExerciseEntry, GeneratedWorkout};
use serde_json::{Deserializer, Map, Value};
use std::collections::HashMap;

const FENCE: &str = "```";
const NAME_KEY: &str = "\"workout_name\"";

/// Which strategy recovered the object
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractionTier {
    WholeSpan,
    FencedBlock,
    KeyedSpan,
}

/// A recovered workout plus how it was found
#[derive(Clone, Debug, PartialEq)]
pub struct Extraction {
    pub workout: GeneratedWorkout,
    pub tier: ExtractionTier,
}

/// Extract a workout, discarding which tier found it
pub fn extract_workout(text: &str) -> Result<GeneratedWorkout, ExtractionError> {
    extract(text).map(|e| e.workout)
}

/// Extract a workout object from completion text
pub fn extract(text: &str) -> Result<Extraction, ExtractionError> {
    let (object, tier) = locate_object(text).ok_or(ExtractionError::NoJsonObject {
        scanned: text.chars().count(),
    })?;

    tracing::debug!("Found JSON object via {:?}", tier);

    let workout = into_workout(object)?;
    Ok(Extraction { workout, tier })
}

fn locate_object(text: &str) -> Option<(Map<String, Value>, ExtractionTier)> {
    if let Some(obj) = whole_span(text) {
        return Some((obj, ExtractionTier::WholeSpan));
    }
    if let Some(obj) = fenced_block(text) {
        return Some((obj, ExtractionTier::FencedBlock));
    }
    keyed_span(text).map(|obj| (obj, ExtractionTier::KeyedSpan))
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn whole_span(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    parse_object(&text[start..=end])
}

fn fenced_block(text: &str) -> Option<Map<String, Value>> {
    let mut rest = text;

    while let Some(open) = rest.find(FENCE) {
        let mut body = &rest[open + FENCE.len()..];
        if let Some(newline) = body.find('\n') {
            let info = &body[..newline];
            if !info.contains('{') && !info.contains(FENCE) {
                body = &body[newline + 1..];
            }
        }

        let close = body.find(FENCE)?;
        if let Some(obj) = parse_object(&body[..close]) {
            return Some(obj);
        }
        rest = &body[close + FENCE.len()..];
    }

    None
}

/// End offset of the JSON object starting at `open`, if one does
fn object_end(text: &str, open: usize) -> Option<usize> {
    let mut stream = Deserializer::from_str(&text[open..]).into_iter::<Value>();
    match stream.next() {
        Some(Ok(Value::Object(_))) => Some(open + stream.byte_offset()),
        _ => None,
    }
}

fn keyed_span(text: &str) -> Option<Map<String, Value>> {
    let opens: Vec<usize> = text.match_indices('{').map(|(i, _)| i).collect();
    let mut ends: HashMap<usize, Option<usize>> = HashMap::new();

    for (key_at, _) in text.match_indices(NAME_KEY) {
        // nearest enclosing brace first gives the smallest span
        for &open in opens.iter().rev().filter(|&&o| o < key_at) {
            let end = *ends
                .entry(open)
                .or_insert_with(|| object_end(text, open));
            if let Some(end) = end.filter(|&end| end > key_at) {
                return parse_object(&text[open..end]);
            }
        }
    }

    None
}

fn into_workout(mut object: Map<String, Value>) -> Result<GeneratedWorkout, ExtractionError> {
    let workout_name = match object.get("workout_name") {
        Some(Value::String(name)) if !name.trim().is_empty() => name.trim().to_string(),
        Some(Value::String(_)) => {
            return Err(ExtractionError::MalformedShape(
                "workout_name is empty".into(),
            ))
        }
        Some(_) => {
            return Err(ExtractionError::MalformedShape(
                "workout_name is not a string".into(),
            ))
        }
        None => {
            return Err(ExtractionError::MalformedShape(
                "missing workout_name".into(),
            ))
        }
    };

    let rows = match object.remove("exercises") {
        Some(Value::Array(rows)) => rows,
        Some(_) => {
            return Err(ExtractionError::MalformedShape(
                "exercises is not an array".into(),
            ))
        }
        None => return Err(ExtractionError::MalformedShape("missing exercises".into())),
    };

    let estimated_duration = object.get("estimated_duration").and_then(Value::as_f64);

    Ok(GeneratedWorkout {
        workout_name,
        estimated_duration,
        exercises: rows.iter().map(entry_from_value).collect(),
    })
}

fn entry_from_value(value: &Value) -> GeneratedExerciseEntry {
    let Some(row) = value.as_object() else {
        return GeneratedExerciseEntry::default();
    };

    GeneratedExerciseEntry {
        exercise_name: row
            .get("exercise_name")
            .and_then(Value::as_str)
            .map(str::to_string),
        sets: row.get("sets").and_then(as_count),
        reps: row.get("reps").and_then(as_count),
        rest_time: row.get("rest_time").and_then(as_count),
        notes: row.get("notes").and_then(Value::as_str).map(str::to_string),
    }
}

fn as_count(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?.round();
    if f.abs() > i64::MAX as f64 {
        tracing::warn!("Count {} is out of range, clamping", value);
    }
    Some(f as i64)
}
