use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use burnwatch_api::{build_router, ApiState};
use burnwatch_core::{Attribution, InputRecord, PredictionResult};
use burnwatch_ml::ModelArtifacts;
use burnwatch_observability::{init_tracing, AppMetrics};
use burnwatch_pipeline::{PipelineSettings, RiskPipeline};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "burnwatch")]
#[command(about = "Employee burnout and attrition risk assessment")]
struct Cli {
    /// Directory holding burnout_model.json, attrition_model.json and label_encoders.json.
    #[arg(long, env = "BURNWATCH_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score one employee record.
    Predict {
        #[command(flatten)]
        record: RecordArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print every feature's contribution to the attrition probability.
    Explain {
        #[command(flatten)]
        record: RecordArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Load and validate the model artifacts, then exit.
    CheckArtifacts,
    /// Serve the HTTP API.
    Serve {
        #[arg(long, env = "BURNWATCH_BIND", default_value = "0.0.0.0:8080")]
        bind: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Record fields, defaulting to the values the HR form starts with.
#[derive(Debug, Args)]
struct RecordArgs {
    /// Read the record from a JSON file instead of flags.
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long, default_value_t = 30)]
    age: i64,
    #[arg(long, default_value = "Male")]
    gender: String,
    #[arg(long, default_value = "Developer")]
    job_role: String,
    #[arg(long, default_value_t = 50_000)]
    monthly_income: i64,
    #[arg(long, default_value_t = 45)]
    work_hours_per_week: i64,
    #[arg(long, default_value = "No")]
    overtime: String,
    #[arg(long, default_value_t = 3)]
    job_satisfaction: i64,
    #[arg(long, default_value_t = 3)]
    work_life_balance: i64,
    #[arg(long, default_value_t = 3)]
    years_at_company: i64,
    #[arg(long, default_value_t = 2)]
    promotion_gap: i64,
    #[arg(long, default_value_t = 3)]
    manager_support: i64,
}

impl RecordArgs {
    fn into_record(self) -> Result<InputRecord> {
        if let Some(path) = self.input {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed reading record: {}", path.display()))?;
            return serde_json::from_str(&raw)
                .with_context(|| format!("invalid record JSON: {}", path.display()));
        }

        Ok(InputRecord {
            age: self.age,
            gender: self.gender,
            job_role: self.job_role,
            monthly_income: self.monthly_income,
            work_hours_per_week: self.work_hours_per_week,
            overtime: self.overtime,
            job_satisfaction: self.job_satisfaction,
            work_life_balance: self.work_life_balance,
            years_at_company: self.years_at_company,
            promotion_gap: self.promotion_gap,
            manager_support: self.manager_support,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("burnwatch_cli");
    let cli = Cli::parse();

    let mut settings = PipelineSettings::from_env()?;
    if let Some(model_dir) = cli.model_dir {
        settings.model_dir = model_dir;
    }

    match cli.command {
        Command::Predict { record, format } => {
            let pipeline = RiskPipeline::load(settings, AppMetrics::shared())?;
            let result = pipeline.predict_risk(&record.into_record()?)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                OutputFormat::Text => print_prediction(&result),
            }
        }
        Command::Explain { record, format } => {
            let pipeline = RiskPipeline::load(settings, AppMetrics::shared())?;
            let attribution = pipeline.explain(&record.into_record()?)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&attribution)?),
                OutputFormat::Text => print_attribution(&attribution),
            }
        }
        Command::CheckArtifacts => check_artifacts(settings)?,
        Command::Serve { bind } => {
            let metrics = AppMetrics::shared();
            let pipeline = RiskPipeline::load(settings, metrics.clone())?;
            let app = build_router(ApiState {
                pipeline: Arc::new(pipeline),
                metrics,
            });

            let listener = tokio::net::TcpListener::bind(&bind)
                .await
                .with_context(|| format!("failed binding {bind}"))?;
            tracing::info!(bind = %bind, "burnwatch api started");
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn check_artifacts(settings: PipelineSettings) -> Result<()> {
    let artifacts = ModelArtifacts::load_dir(&settings.model_dir)?;
    let burnout = artifacts.burnout.model_name().to_string();
    let attrition = artifacts.attrition.model_name().to_string();
    let explainable = artifacts.attrition.explainer().is_some();

    RiskPipeline::from_artifacts(artifacts, settings.clone(), AppMetrics::shared())
        .context("artifacts do not match the feature schema")?;

    println!("model dir        {}", settings.model_dir.display());
    println!("burnout model    {burnout}");
    println!("attrition model  {attrition}");
    println!(
        "attribution      {}",
        if explainable { "available" } else { "unavailable" }
    );
    println!(
        "fusion           {:.2} model / {:.2} rules, MEDIUM >= {}, HIGH >= {}",
        settings.fusion.model_weight,
        settings.fusion.rule_weight,
        settings.fusion.medium_threshold,
        settings.fusion.high_threshold
    );
    Ok(())
}

fn print_prediction(result: &PredictionResult) {
    println!("Burnout risk      {}", result.burnout_tier.label());
    println!("Attrition         {:.1}%", result.attrition_probability);
    println!("Rule score        {}", result.rule_score);
    println!("Final risk        {:.1}% ({})", result.final_risk, result.tier);

    if !result.rule_hits.is_empty() {
        println!("\nRisk factors:");
        for hit in &result.rule_hits {
            println!("  +{:<3} {}", hit.points, hit.notes);
        }
    }

    if let Some(attribution) = &result.attribution {
        println!("\nTop drivers:");
        print_contributions(attribution);
    }

    println!("\nRecommendations:");
    for action in &result.recommendations {
        println!("  - {action}");
    }
}

fn print_attribution(attribution: &Attribution) {
    println!("Baseline          {:.4}", attribution.baseline);
    print_contributions(attribution);
    println!("Model output      {:.4}", attribution.reconstructed());
}

fn print_contributions(attribution: &Attribution) {
    for contribution in &attribution.contributions {
        println!("  {:<18} {:+.4}", contribution.feature, contribution.value);
    }
}
