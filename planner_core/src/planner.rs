//! Routine planner: ties the catalog, store and completion backend together.
//!
//! Every model reply goes through extract -> build -> validate before it is
//! stored. A failure at any stage returns that stage's error and leaves the
//! store untouched.

use crate::builder::TemplateBuilder;
use crate::catalog::{catalog_with_custom, get_default_catalog, ExerciseCatalog};
use crate::completion::TextCompletion;
use crate::config::{BuilderConfig, Config, ValidationConfig};
use crate::duration;
use crate::extract::extract_workout;
use crate::prompt;
use crate::store::{week_start, StoreStats, TemplateStore};
use crate::validate::ConstraintValidator;
use crate::{muscle_groups_of, Error, ExerciseSet, Result, UserPreferences, WorkoutTemplate};
use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

/// Weekly volume below this in the trailing two weeks triggers a balanced suggestion
const MIN_RECENT_VOLUME: f64 = 10.0;

/// Run one completion through extraction, building and validation
pub fn template_from_completion(
    text: &str,
    provenance: &str,
    prefs: &UserPreferences,
    catalog: &ExerciseCatalog,
    defaults: &BuilderConfig,
    limits: &ValidationConfig,
) -> Result<WorkoutTemplate> {
    let workout = extract_workout(text)?;
    let template = TemplateBuilder::new(catalog)
        .with_defaults(defaults.clone())
        .build(&workout, provenance)?;
    ConstraintValidator::new(catalog)
        .with_limits(limits.clone())
        .validate(&template, prefs)?;
    Ok(template)
}

/// Totals reported by [`RoutinePlanner::usage_stats`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsageStats {
    pub templates: StoreStats,
    pub completion_calls: u32,
}

pub struct RoutinePlanner<C: TextCompletion> {
    catalog: ExerciseCatalog,
    store: TemplateStore,
    completion: C,
    limits: ValidationConfig,
    defaults: BuilderConfig,
}

impl<C: TextCompletion> RoutinePlanner<C> {
    /// Planner over the built-in catalog with default limits
    pub fn new(completion: C) -> Self {
        Self {
            catalog: get_default_catalog().clone(),
            store: TemplateStore::new(),
            completion,
            limits: ValidationConfig::default(),
            defaults: BuilderConfig::default(),
        }
    }

    pub fn from_config(config: &Config, completion: C) -> Result<Self> {
        Ok(Self {
            catalog: catalog_with_custom(&config.catalog.custom)?,
            store: TemplateStore::new(),
            completion,
            limits: config.validation.clone(),
            defaults: config.builder.clone(),
        })
    }

    pub fn catalog(&self) -> &ExerciseCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TemplateStore {
        &mut self.store
    }

    /// Store a hand-built template
    pub fn create_template(
        &mut self,
        user: &str,
        name: &str,
        exercises: Vec<ExerciseSet>,
    ) -> WorkoutTemplate {
        let template = WorkoutTemplate {
            id: Uuid::new_v4(),
            name: name.to_string(),
            muscle_groups: muscle_groups_of(&exercises),
            estimated_duration: duration::estimate(&exercises),
            exercises,
            is_ai_generated: false,
            generation_prompt: None,
            created_at: Utc::now(),
        };
        tracing::info!(
            "Created template '{}' with {} exercises",
            template.name,
            template.exercises.len()
        );
        self.store.insert(user, template.clone());
        template
    }

    /// Generate, validate and store a template from a free-text request
    pub fn generate_workout(
        &mut self,
        user: &str,
        request: &str,
        prefs: UserPreferences,
    ) -> Result<WorkoutTemplate> {
        self.store.set_preferences(user, prefs.clone());
        let ai_prompt = prompt::build_generation_prompt(request, &prefs, &self.catalog);

        tracing::info!("Requesting workout from {} backend", self.completion.name());
        let reply = self.completion.complete(&ai_prompt)?;
        let template = self.accept(&reply, request, &prefs)?;

        self.store.insert(user, template.clone());
        tracing::info!("Generated workout '{}' for {}", template.name, user);
        Ok(template)
    }

    /// Ask the model for a modified copy of a stored template
    pub fn customize_workout(
        &mut self,
        user: &str,
        template_id: &Uuid,
        modifications: &str,
    ) -> Result<WorkoutTemplate> {
        let original = self
            .store
            .get(template_id)
            .ok_or_else(|| Error::TemplateNotFound(template_id.to_string()))?;
        let prefs = self
            .store
            .preferences(user)
            .ok_or_else(|| Error::PreferencesNotFound(user.to_string()))?;

        let ai_prompt = prompt::build_customization_prompt(original, modifications);
        let provenance = format!("Customized from: {}. {}", original.name, modifications.trim());

        let reply = self.completion.complete(&ai_prompt)?;
        let template = self.accept(&reply, &provenance, prefs)?;

        self.store.insert(user, template.clone());
        tracing::info!("Customized '{}' into '{}'", provenance, template.name);
        Ok(template)
    }

    /// Free-text analysis of a stored template from the model
    pub fn analyze_workout(&self, template_id: &Uuid) -> Result<String> {
        let template = self
            .store
            .get(template_id)
            .ok_or_else(|| Error::TemplateNotFound(template_id.to_string()))?;
        self.completion
            .complete(&prompt::build_analysis_prompt(template))
    }

    /// Pick a workout for `date`
    ///
    /// When logged volume over the trailing two weeks shows a lagging muscle
    /// group, a balanced full-body template is created and returned. Otherwise
    /// the user's first template, if any.
    pub fn suggested_workout(&mut self, user: &str, date: NaiveDate) -> Result<Option<WorkoutTemplate>> {
        if self.store.has_volume(user) {
            let week = week_start(date);
            let recent = self
                .store
                .volume_between(user, week - Duration::weeks(1), week);
            let lagging = recent.is_empty() || recent.values().any(|&v| v < MIN_RECENT_VOLUME);
            if lagging {
                tracing::info!("Recent volume for {} is unbalanced, suggesting full body", user);
                let exercises = self.balanced_exercises()?;
                return Ok(Some(self.create_template(user, "Balanced Full Body", exercises)));
            }
        }

        Ok(self.store.user_templates(user).first().map(|t| (*t).clone()))
    }

    pub fn usage_stats(&self) -> UsageStats {
        UsageStats {
            templates: self.store.stats(),
            completion_calls: self.completion.usage_count(),
        }
    }

    fn accept(&self, reply: &str, provenance: &str, prefs: &UserPreferences) -> Result<WorkoutTemplate> {
        template_from_completion(
            reply,
            provenance,
            prefs,
            &self.catalog,
            &self.defaults,
            &self.limits,
        )
        .inspect_err(|e| {
            tracing::warn!(
                "Rejected completion ({}): {}",
                e.pipeline_code().unwrap_or("error"),
                e
            )
        })
    }

    fn balanced_exercises(&self) -> Result<Vec<ExerciseSet>> {
        [
            ("squats", 3, 10, 90),
            ("bench_press", 3, 8, 90),
            ("bent_over_rows", 3, 10, 90),
            ("plank", 3, 30, 60),
        ]
        .into_iter()
        .map(|(id, sets, reps, rest)| -> Result<ExerciseSet> {
            let exercise = self
                .catalog
                .get(id)
                .ok_or_else(|| Error::CatalogValidation(format!("missing built-in exercise '{}'", id)))?;
            Ok(ExerciseSet::new(exercise, sets, reps)?.with_rest(rest))
        })
        .collect()
    }
}
