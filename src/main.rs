use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn, Level};

use nutrirs::advice::{get_nutrition_advice, GeminiAdvisor};
use nutrirs::batch::BatchCalculator;
use nutrirs::config::{AppConfig, CalculationDefaults};
use nutrirs::error::NutriError;
use nutrirs::export::{self, display, ExportFormat};
use nutrirs::import::json::JsonImporter;
use nutrirs::import::ImportManager;
use nutrirs::logging::init_logging;
use nutrirs::models::{
    CkdDetails, CkdStage, ConditionTag, DiabetesDetails, DyslipidemiaDetails, GoutDetails,
    HypertensionDetails, NutritionResults, PatientData, Sex,
};
use nutrirs::reference::{
    ACTIVITY_LEVELS, CKD_STAGES, MEDICAL_CONDITIONS, PROTEIN_NEEDS, STRESS_FACTORS,
};
use nutrirs::NutritionCalculator;

/// NutriRS - Clinical Nutrition Calculator
///
/// Estimates BMR (Mifflin-St Jeor), total daily energy expenditure and a
/// protein/carbohydrate/fat split for a patient, and can ask a language
/// model for dietary counselling based on the results.
#[derive(Parser)]
#[command(name = "nutrirs")]
#[command(author = "NutriRS Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Clinical Nutrition Calculator CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate energy and macronutrient requirements for one patient
    Calculate {
        #[command(flatten)]
        patient: PatientArgs,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Calculate requirements, then request dietary advice
    Advise {
        #[command(flatten)]
        patient: PatientArgs,

        /// Override the configured model name
        #[arg(long)]
        model: Option<String>,
    },

    /// Calculate requirements for every patient in a CSV or JSON file
    Batch {
        /// Input file path (CSV, JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format (csv, json, text); inferred from the output extension if omitted
        #[arg(short = 'f', long)]
        format: Option<String>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Print the reference tables
    Tables,

    /// Manage the configuration file
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long, requires = "init")]
        force: bool,

        /// Print the effective configuration
        #[arg(long)]
        show: bool,

        /// Print the configuration file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// Patient data, either from a JSON file or from individual flags
#[derive(Args)]
struct PatientArgs {
    /// Read the patient from a JSON file
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Age in years
    #[arg(long, conflicts_with = "input")]
    age: Option<f64>,

    /// male or female
    #[arg(long, conflicts_with = "input")]
    sex: Option<Sex>,

    /// Body weight in kg
    #[arg(long = "weight", conflicts_with = "input")]
    weight_kg: Option<f64>,

    /// Height in cm
    #[arg(long = "height", conflicts_with = "input")]
    height_cm: Option<f64>,

    /// Activity level key (see `nutrirs tables`)
    #[arg(long, conflicts_with = "input")]
    activity: Option<String>,

    /// Stress factor key
    #[arg(long, conflicts_with = "input")]
    stress: Option<String>,

    /// Protein need key
    #[arg(long, conflicts_with = "input")]
    protein: Option<String>,

    /// Chronic conditions, comma separated
    #[arg(long = "condition", value_delimiter = ',', conflicts_with = "input")]
    conditions: Vec<ConditionTag>,

    /// Systolic blood pressure (mmHg)
    #[arg(long, conflicts_with = "input")]
    systolic: Option<f64>,

    /// Diastolic blood pressure (mmHg)
    #[arg(long, conflicts_with = "input")]
    diastolic: Option<f64>,

    /// HbA1c (%)
    #[arg(long, conflicts_with = "input")]
    hba1c: Option<f64>,

    /// CKD stage (1, 2, 3a, 3b, 4, 5)
    #[arg(long, conflicts_with = "input")]
    ckd_stage: Option<CkdStage>,

    /// Uric acid (mg/dL)
    #[arg(long, conflicts_with = "input")]
    uric_acid: Option<f64>,

    /// LDL cholesterol (mg/dL)
    #[arg(long, conflicts_with = "input")]
    ldl: Option<f64>,

    /// HDL cholesterol (mg/dL)
    #[arg(long, conflicts_with = "input")]
    hdl: Option<f64>,

    /// Triglycerides (mg/dL)
    #[arg(long, conflicts_with = "input")]
    triglycerides: Option<f64>,
}

impl PatientArgs {
    fn into_patient(self, defaults: &CalculationDefaults) -> Result<PatientData> {
        if let Some(input) = &self.input {
            return JsonImporter::load_patient(input)
                .with_context(|| format!("Failed to load patient from {}", input.display()));
        }

        let mut patient = PatientData {
            age: self.age,
            sex: self.sex.unwrap_or_default(),
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            activity_level: self
                .activity
                .unwrap_or_else(|| defaults.activity_level.clone()),
            stress_factor: self
                .stress
                .unwrap_or_else(|| defaults.stress_factor.clone()),
            protein_need: self
                .protein
                .unwrap_or_else(|| defaults.protein_need.clone()),
            ..PatientData::default()
        };
        for tag in self.conditions {
            patient = patient.with_condition(tag);
        }

        let details = &mut patient.condition_details;
        if self.systolic.is_some() || self.diastolic.is_some() {
            details.hypertension = Some(HypertensionDetails {
                systolic: self.systolic,
                diastolic: self.diastolic,
            });
        }
        if self.hba1c.is_some() {
            details.diabetes_t2 = Some(DiabetesDetails { hba1c: self.hba1c });
        }
        if self.ckd_stage.is_some() {
            details.ckd = Some(CkdDetails { stage: self.ckd_stage });
        }
        if self.uric_acid.is_some() {
            details.gout = Some(GoutDetails { uric_acid: self.uric_acid });
        }
        if self.ldl.is_some() || self.hdl.is_some() || self.triglycerides.is_some() {
            details.dyslipidemia = Some(DyslipidemiaDetails {
                ldl: self.ldl,
                hdl: self.hdl,
                triglycerides: self.triglycerides,
            });
        }

        Ok(patient)
    }
}

fn main() {
    let cli = Cli::parse();
    let config = match AppConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        // Rewriting the file must work even when the current one is broken
        Err(_) if matches!(cli.command, Commands::Config { init: true, .. }) => {
            AppConfig::default()
        }
        Err(e) => {
            eprintln!("{} {:#}", "✗".red(), e);
            std::process::exit(1);
        }
    };

    let log_config = config.logging.clone().with_verbosity(cli.verbose);
    if let Err(e) = init_logging(&log_config) {
        eprintln!("{}", format!("Logging disabled: {:#}", e).dimmed());
    }

    if let Err(e) = run(cli, config) {
        report_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: AppConfig) -> Result<()> {
    match cli.command {
        Commands::Calculate { patient, format } => {
            let patient = patient.into_patient(&config.defaults)?;
            let results = calculate(&patient)?;

            match format {
                OutputFormat::Table => print_results(&patient, &results),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
            }
        }

        Commands::Advise { patient, model } => {
            let patient = patient.into_patient(&config.defaults)?;
            let results = calculate(&patient)?;
            print_results(&patient, &results);

            let mut settings = config.advice.clone();
            if let Some(model) = model {
                settings.model = model;
            }
            let advisor = GeminiAdvisor::from_settings(&settings).map_err(NutriError::from)?;
            info!(model = advisor.model(), "Requesting nutrition advice");

            let spinner = ProgressBar::new_spinner();
            spinner.set_message("Requesting nutrition advice...");
            spinner.enable_steady_tick(Duration::from_millis(120));

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;
            let advice = runtime.block_on(get_nutrition_advice(&advisor, &patient, &results));
            spinner.finish_and_clear();

            let advice = advice.map_err(NutriError::from)?;
            println!();
            println!("{}", "Nutrition Advice".green().bold());
            println!("{}", advice);
        }

        Commands::Batch {
            input,
            output,
            format,
            no_progress,
        } => {
            println!("{}", "Calculating batch...".blue().bold());
            let records = ImportManager::new().import_file(&input)?;

            let mut settings = config.batch.clone();
            if no_progress {
                settings.show_progress = false;
            }
            let summary = BatchCalculator::with_settings(settings).run(&records)?;

            println!("{}", display::batch_table(&summary));
            println!("{}", summary.to_string_pretty());
            if !summary.is_fully_successful() {
                warn!(rejected = summary.failed, "Some patients could not be calculated");
            }

            if let Some(output) = output {
                let format = resolve_export_format(format.as_deref(), &output)?;
                export::export_batch(&summary, format, &output)?;
                println!(
                    "{} {}",
                    "✓ Results written to".green(),
                    output.display()
                );
            }
        }

        Commands::Tables => {
            for table in [&ACTIVITY_LEVELS, &STRESS_FACTORS, &PROTEIN_NEEDS] {
                println!(
                    "{} {}",
                    table.name.to_uppercase().cyan().bold(),
                    format!("(unknown keys use x{})", table.default_multiplier).dimmed()
                );
                println!("{}", display::reference_table(table.entries));
            }
            println!("{}", "CONDITIONS".cyan().bold());
            println!("{}", display::reference_table(MEDICAL_CONDITIONS));
            println!("{}", "CKD STAGES".cyan().bold());
            println!("{}", display::reference_table(CKD_STAGES));
        }

        Commands::Config {
            init,
            force,
            show,
            path,
        } => {
            let config_path = cli
                .config
                .clone()
                .unwrap_or_else(AppConfig::default_config_path);

            if path {
                println!("{}", config_path.display());
            }
            if init {
                init_config(&config_path, force)?;
            }
            if show || !(init || path) {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

fn calculate(patient: &PatientData) -> Result<NutritionResults> {
    NutritionCalculator::compute(patient).map_err(|e| NutriError::from(e).into())
}

fn resolve_export_format(explicit: Option<&str>, output: &Path) -> Result<ExportFormat> {
    match explicit {
        Some(name) => Ok(name.parse::<ExportFormat>().map_err(NutriError::from)?),
        None => Ok(ExportFormat::from_path(output).unwrap_or(ExportFormat::Csv)),
    }
}

fn init_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Config file already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    let mut config = AppConfig::default();
    config.save_to_file(config_path)?;
    println!(
        "{} {}",
        "✓ Configuration written to".green(),
        config_path.display()
    );
    Ok(())
}

fn print_results(patient: &PatientData, results: &NutritionResults) {
    let describe = |value: Option<f64>, unit: &str| {
        value.map_or_else(|| "?".to_string(), |v| format!("{}{}", v, unit))
    };

    println!("{}", "Nutrition Requirements".green().bold());
    println!(
        "  {}, {}, {}, {}",
        patient.sex,
        describe(patient.age, " y"),
        describe(patient.weight_kg, " kg"),
        describe(patient.height_cm, " cm")
    );
    println!("{}", display::results_table(results));
}

fn report_error(e: &anyhow::Error) {
    match e.downcast_ref::<NutriError>() {
        Some(err) => {
            match err.severity().to_tracing_level() {
                Level::ERROR => error!(error = %err, "Command failed"),
                _ => warn!(error = %err, "Command rejected"),
            }
            eprintln!("{} {}", "✗".red(), err.user_message());
        }
        None => eprintln!("{} {:#}", "✗".red(), e),
    }
}
