use clap::{Args, Parser, Subcommand};
use planner_core::analysis::analyze_locally;
use planner_core::catalog::catalog_with_custom;
use planner_core::*;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "rplan")]
#[command(about = "Validate and generate AI workout templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a completion through extraction, building and validation
    Check {
        /// File with the completion text (stdin if omitted)
        file: Option<PathBuf>,

        #[command(flatten)]
        prefs: PrefArgs,

        /// Print the accepted template as JSON
        #[arg(long)]
        json: bool,

        /// Append a local analysis of the accepted template
        #[arg(long)]
        analyze: bool,
    },

    /// Generate a template with the offline demo backend
    Generate {
        /// What the workout should be
        prompt: String,

        #[command(flatten)]
        prefs: PrefArgs,

        /// Append a local analysis of the generated template
        #[arg(long)]
        analyze: bool,
    },

    /// List catalog exercises
    Catalog {
        /// Only exercises training this muscle group
        #[arg(long)]
        muscle: Option<MuscleGroup>,

        /// Only exercises possible with this equipment (repeatable, comma-separated)
        #[arg(long, value_delimiter = ',')]
        equipment: Vec<String>,
    },

    /// Show which catalog exercise a free-text name resolves to
    Resolve { name: String },
}

/// Overrides for the `[profile]` section of the config
#[derive(Args)]
struct PrefArgs {
    /// beginner, intermediate or advanced
    #[arg(long)]
    level: Option<ExperienceLevel>,

    #[arg(long)]
    goal: Option<String>,

    /// Available equipment (repeatable, comma-separated)
    #[arg(long, value_delimiter = ',')]
    equipment: Vec<String>,

    /// Session length in minutes
    #[arg(long)]
    minutes: Option<u32>,

    /// Preferred muscle groups (repeatable, comma-separated)
    #[arg(long, value_delimiter = ',')]
    prefer: Vec<MuscleGroup>,

    /// Exercises to avoid (repeatable, comma-separated)
    #[arg(long, value_delimiter = ',')]
    avoid: Vec<String>,
}

impl PrefArgs {
    fn apply(self, mut prefs: UserPreferences) -> UserPreferences {
        if let Some(level) = self.level {
            prefs.experience_level = level;
        }
        if let Some(goal) = self.goal {
            prefs.goals = goal;
        }
        if !self.equipment.is_empty() {
            prefs.available_equipment = self.equipment;
        }
        if let Some(minutes) = self.minutes {
            prefs.time_per_session = minutes;
        }
        if !self.prefer.is_empty() {
            prefs.preferred_muscle_groups = self.prefer.into_iter().collect();
        }
        if !self.avoid.is_empty() {
            prefs.avoid_exercises = self.avoid;
        }
        prefs
    }
}

/// Exit status for a rejected completion
const REJECTED: u8 = 2;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    planner_core::logging::init(cli.verbose);

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Check {
            file,
            prefs,
            json,
            analyze,
        } => cmd_check(file.as_deref(), prefs, json, analyze, &config),
        Commands::Generate {
            prompt,
            prefs,
            analyze,
        } => cmd_generate(&prompt, prefs, analyze, &config),
        Commands::Catalog { muscle, equipment } => cmd_catalog(muscle, &equipment, &config),
        Commands::Resolve { name } => cmd_resolve(&name, &config),
    }
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Print a pipeline rejection, or propagate anything else
fn report_rejection(err: Error) -> Result<ExitCode> {
    match err.pipeline_code() {
        Some(code) => {
            eprintln!("{}: {}", code, err);
            Ok(ExitCode::from(REJECTED))
        }
        None => Err(err),
    }
}

fn cmd_check(
    file: Option<&Path>,
    prefs: PrefArgs,
    json: bool,
    analyze: bool,
    config: &Config,
) -> Result<ExitCode> {
    let text = read_input(file)?;
    let prefs = prefs.apply(config.profile.clone());
    tracing::debug!("Checking against preferences {:?}", prefs);
    let catalog = catalog_with_custom(&config.catalog.custom)?;

    let provenance = file
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdin".to_string());

    let template = match template_from_completion(
        &text,
        &provenance,
        &prefs,
        &catalog,
        &config.builder,
        &config.validation,
    ) {
        Ok(template) => template,
        Err(err) => return report_rejection(err),
    };

    if json {
        println!("{}", template_json(&template)?);
    } else {
        display_template(&template);
    }
    if analyze {
        println!("{}", analyze_locally(&template));
    }
    Ok(ExitCode::SUCCESS)
}

fn template_json(template: &WorkoutTemplate) -> Result<String> {
    let mut value = template.to_json();
    value["id"] = template.id.to_string().into();
    Ok(serde_json::to_string_pretty(&value)?)
}

fn cmd_generate(prompt: &str, prefs: PrefArgs, analyze: bool, config: &Config) -> Result<ExitCode> {
    let prefs = prefs.apply(config.profile.clone());
    tracing::debug!("Generating with preferences {:?}", prefs);
    let backend = DemoCompletion::new(config.completion.max_usage);
    let mut planner = RoutinePlanner::from_config(config, backend)?;

    let template = match planner.generate_workout("local", prompt, prefs) {
        Ok(template) => template,
        Err(err) => return report_rejection(err),
    };

    display_template(&template);
    if analyze {
        println!("{}", analyze_locally(&template));
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_catalog(muscle: Option<MuscleGroup>, equipment: &[String], config: &Config) -> Result<ExitCode> {
    let catalog = catalog_with_custom(&config.catalog.custom)?;

    let mut exercises = if equipment.is_empty() {
        catalog.all().to_vec()
    } else {
        catalog.available_given(equipment)
    };
    if let Some(group) = muscle {
        exercises.retain(|e| e.muscle_groups.contains(&group));
    }

    for exercise in &exercises {
        println!(
            "{:<18} {:<24} {:<28} [{}]",
            exercise.id,
            exercise.name,
            join_groups(exercise.muscle_groups.iter()),
            exercise.equipment.as_deref().unwrap_or(NO_EQUIPMENT)
        );
    }
    println!("\n{} exercises", exercises.len());
    Ok(ExitCode::SUCCESS)
}

fn cmd_resolve(name: &str, config: &Config) -> Result<ExitCode> {
    let catalog = catalog_with_custom(&config.catalog.custom)?;
    match catalog.resolve_by_name(name) {
        Some(exercise) => {
            println!("{} -> {} ({})", name, exercise.name, exercise.id);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("No catalog exercise matches '{}'", name);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn join_groups<'a>(groups: impl Iterator<Item = &'a MuscleGroup>) -> String {
    groups.map(|g| g.as_str()).collect::<Vec<_>>().join(", ")
}

fn display_template(template: &WorkoutTemplate) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", template.name);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Duration: ~{} min", template.estimated_duration);
    println!(
        "  Source: {}",
        if template.is_ai_generated { "AI generated" } else { "manual" }
    );
    println!("  Muscle groups: {}", join_groups(template.muscle_groups.iter()));
    println!(
        "  {} exercises, {} sets",
        template.total_exercises(),
        template.total_sets()
    );
    println!();

    for (i, set) in template.exercises.iter().enumerate() {
        println!("  {}. {}", i + 1, set.exercise.name);
        print!("     {} x {}", set.sets, set.reps);
        if let Some(rest) = set.rest_time {
            print!(", rest {}s", rest);
        }
        println!();
    }

    if let Some(ref prompt) = template.generation_prompt {
        println!();
        println!("  ℹ Prompt: {}", prompt);
    }
    println!();
}
