//! In-memory template and training-volume repository.
//!
//! Owned by a single planner; nothing here outlives the process.

use crate::{ExerciseRecord, MuscleGroup, UserPreferences, WeeklyVolume, WorkoutTemplate};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Groups below this share of the weekly average are reported as lagging
const BALANCE_THRESHOLD: f64 = 0.5;

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Template counts across all users
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub total_templates: usize,
    pub ai_generated: usize,
    pub manual: usize,
    pub users: usize,
}

#[derive(Debug, Default)]
pub struct TemplateStore {
    templates: HashMap<Uuid, WorkoutTemplate>,
    user_templates: HashMap<String, Vec<Uuid>>,
    preferences: HashMap<String, UserPreferences>,
    volumes: HashMap<String, Vec<WeeklyVolume>>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a template and append it to the user's list
    pub fn insert(&mut self, user: &str, template: WorkoutTemplate) -> Uuid {
        let id = template.id;
        self.templates.insert(id, template);
        self.user_templates
            .entry(user.to_string())
            .or_default()
            .push(id);
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<&WorkoutTemplate> {
        self.templates.get(id)
    }

    /// The user's templates in insertion order
    pub fn user_templates(&self, user: &str) -> Vec<&WorkoutTemplate> {
        self.user_templates
            .get(user)
            .map(|ids| ids.iter().filter_map(|id| self.templates.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn set_preferences(&mut self, user: &str, prefs: UserPreferences) {
        self.preferences.insert(user.to_string(), prefs);
    }

    pub fn preferences(&self, user: &str) -> Option<&UserPreferences> {
        self.preferences.get(user)
    }

    /// Record a performed exercise against every muscle group it trains
    ///
    /// Volume is sets x reps x weight, booked to the week containing `date`.
    /// Returns the volume added per group.
    pub fn update_volume(
        &mut self,
        user: &str,
        exercise: &ExerciseRecord,
        sets: u32,
        reps: u32,
        weight: f64,
        date: NaiveDate,
    ) -> f64 {
        let week = week_start(date);
        let volume = f64::from(sets) * f64::from(reps) * weight;
        let records = self.volumes.entry(user.to_string()).or_default();

        for &group in &exercise.muscle_groups {
            match records
                .iter_mut()
                .find(|v| v.muscle_group == group && v.week_start == week)
            {
                Some(existing) => existing.volume += volume,
                None => records.push(WeeklyVolume {
                    muscle_group: group,
                    week_start: week,
                    volume,
                }),
            }
        }

        tracing::debug!(
            "Volume for {}: {} +{} (week of {})",
            user,
            exercise.name,
            volume,
            week
        );
        volume
    }

    pub fn has_volume(&self, user: &str) -> bool {
        self.volumes.get(user).is_some_and(|v| !v.is_empty())
    }

    /// Per-group volume over weeks starting in `from..=to`
    pub fn volume_between(
        &self,
        user: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> BTreeMap<MuscleGroup, f64> {
        let mut totals = BTreeMap::new();
        for record in self.volumes.get(user).into_iter().flatten() {
            if record.week_start >= from && record.week_start <= to {
                *totals.entry(record.muscle_group).or_insert(0.0) += record.volume;
            }
        }
        totals
    }

    /// Muscle groups trained in the week that fall below half the average
    ///
    /// Only groups with at least one record that week take part.
    pub fn check_balance(&self, user: &str, week: NaiveDate) -> Vec<MuscleGroup> {
        let totals = self.volume_between(user, week, week);
        if totals.is_empty() {
            return Vec::new();
        }

        let average = totals.values().sum::<f64>() / totals.len() as f64;
        let threshold = average * BALANCE_THRESHOLD;

        totals
            .into_iter()
            .filter(|&(_, volume)| volume < threshold)
            .map(|(group, _)| group)
            .collect()
    }

    pub fn stats(&self) -> StoreStats {
        let ai_generated = self
            .templates
            .values()
            .filter(|t| t.is_ai_generated)
            .count();
        StoreStats {
            total_templates: self.templates.len(),
            ai_generated,
            manual: self.templates.len() - ai_generated,
            users: self.user_templates.len(),
        }
    }
}
