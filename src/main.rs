use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use numerology_engine::{
    build_grid, parse_birth_date, ClientProfile, ConfigOverrides, EngineConfig,
    HttpNumerologyService, NumericProfile, ProfileRequest, ReportFormat, ValidationCoordinator,
    ValidationState,
};

#[derive(Parser)]
#[command(name = "numerology", version, about = "Name and birth-date numerology engine")]
struct Cli {
    /// TOML config file (defaults to ./numerology.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the analysis service
    #[arg(long, global = true)]
    service_url: Option<String>,

    /// Quiet window before validating an edited name
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    /// Log filter, e.g. "debug" or "numerology_engine=trace"
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute all local numbers for a name and birth date
    Profile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        date: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Digit grid for a birth date
    Grid {
        #[arg(long)]
        date: String,
        /// Name-derived number to fold in (e.g. the expression number)
        #[arg(long)]
        fold: Option<u32>,
    },

    /// Ask the service for a profile and name suggestions
    Suggest {
        #[arg(long)]
        name: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        place: Option<String>,
        #[arg(long, default_value = "balance")]
        outcome: String,
    },

    /// Validate a candidate name against a client profile
    Validate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        date: String,
        /// Candidate name to check
        #[arg(long)]
        candidate: String,
    },

    /// Confirm names and download a report
    Report {
        #[arg(long)]
        name: String,
        #[arg(long)]
        date: String,
        /// Name to confirm (repeatable)
        #[arg(long = "confirm", required = true)]
        confirmed: Vec<String>,
        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Pdf,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Pdf => ReportFormat::Pdf,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        service_url: cli.service_url.clone(),
        debounce_ms: cli.debounce_ms,
        log_filter: cli.log.clone(),
    };
    let config = EngineConfig::load(cli.config.as_deref(), &overrides)
        .context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Profile { name, date, json } => run_profile(&name, &date, json)?,
        Command::Grid { date, fold } => run_grid(&date, fold),
        Command::Suggest { name, date, time, place, outcome } => {
            let request = ProfileRequest {
                full_name: name,
                birth_date: date,
                birth_time: time,
                birth_place: place,
                desired_outcome: outcome,
            };
            run_suggest(&config, &request).await?
        }
        Command::Validate { name, date, candidate } => {
            run_validate(&config, &name, &date, &candidate).await?
        }
        Command::Report { name, date, confirmed, format, out } => {
            run_report(&config, &name, &date, &confirmed, format.into(), &out).await?
        }
    }

    Ok(())
}

fn coordinator(config: &EngineConfig) -> Result<ValidationCoordinator<HttpNumerologyService>> {
    let service = HttpNumerologyService::new(&config.service_url, config.request_timeout())
        .context("Failed to build HTTP client")?;
    Ok(ValidationCoordinator::from_config(Arc::new(service), config))
}

fn warn_if_impossible(date: &str) {
    if parse_birth_date(date).is_none() {
        eprintln!("⚠️  {:?} is not a valid calendar date; numbers use its digits as-is", date);
    }
}

fn print_profile(profile: &NumericProfile) {
    println!("👤 {}  ({})", profile.name, profile.birth_date);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Expression:   {}", profile.expression_number);
    println!("  Soul Urge:    {}", profile.soul_urge_number);
    println!("  Personality:  {}", profile.personality_number);
    println!("  Life Path:    {}", profile.life_path_number);
    println!("  Birth Day:    {}", profile.birth_day_number);
    print_grid_rows(&profile.grid);
}

fn print_grid_rows(grid: &numerology_engine::Grid) {
    println!("\n  Grid:");
    for row in [[1u8, 2, 3], [4, 5, 6], [7, 8, 9]] {
        let cells: Vec<String> = row
            .iter()
            .map(|d| match grid.count(*d) {
                0 => "·".to_string(),
                n => d.to_string().repeat(n as usize),
            })
            .collect();
        println!("    {:>6} {:>6} {:>6}", cells[0], cells[1], cells[2]);
    }
    println!("  Missing: {:?}", grid.missing);
}

fn run_profile(name: &str, date: &str, json: bool) -> Result<()> {
    warn_if_impossible(date);
    let profile = NumericProfile::compute(name, date);

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print_profile(&profile);
    }
    Ok(())
}

fn run_grid(date: &str, fold: Option<u32>) {
    warn_if_impossible(date);
    print_grid_rows(&build_grid(date, fold));
}

async fn run_suggest(config: &EngineConfig, request: &ProfileRequest) -> Result<()> {
    let coordinator = coordinator(config)?;

    println!("🌐 Requesting analysis from {}...", config.service_url);
    let numbers = coordinator
        .analyze(request)
        .await
        .context("Analysis request failed")?;
    print_profile(&numbers);

    let session = coordinator.snapshot();
    println!("\n✨ {} suggestions", session.candidates.len());
    for (i, entry) in session.candidates.iter().enumerate() {
        let mismatch = if entry.expression_number != entry.local_metrics.expression_number {
            format!(" (local {})", entry.local_metrics.expression_number)
        } else {
            String::new()
        };
        println!(
            "  {}. {:<24} expression {}{}",
            i + 1,
            entry.name,
            entry.expression_number,
            mismatch
        );
        if !entry.rationale.is_empty() {
            println!("     {}", entry.rationale);
        }
    }
    Ok(())
}

async fn run_validate(config: &EngineConfig, name: &str, date: &str, candidate: &str) -> Result<()> {
    warn_if_impossible(date);
    let coordinator = coordinator(config)?;
    coordinator.load(ClientProfile::new(name, date), &[]);

    let local = coordinator.edit_custom_name(candidate)?;
    println!("🔢 {} → expression {} (local)", candidate, local.expression_number);

    coordinator.settle().await;

    match coordinator.snapshot().custom.validation {
        ValidationState::Validated { outcome } => {
            let mark = if outcome.is_valid { "✅" } else { "❌" };
            println!("{} {}", mark, outcome.rationale);
        }
        ValidationState::Failed { outcome } => {
            println!("⚠️  Validation unavailable: {}", outcome.rationale);
        }
        ValidationState::NotRequested | ValidationState::Pending { .. } => {
            println!("⚠️  Nothing to validate");
        }
    }
    Ok(())
}

async fn run_report(
    config: &EngineConfig,
    name: &str,
    date: &str,
    confirmed: &[String],
    format: ReportFormat,
    out: &Path,
) -> Result<()> {
    let coordinator = coordinator(config)?;
    coordinator.load(ClientProfile::new(name, date), &[]);

    for candidate in confirmed {
        coordinator.edit_custom_name(candidate)?;
        coordinator.settle().await;
        match coordinator.confirm_custom() {
            Ok(snapshot) => println!("✓ Confirmed {} (expression {})", snapshot.name, snapshot.expression_number),
            Err(conflict) => println!("⚠️  {}", conflict),
        }
    }

    let payload = coordinator
        .generate_report(format)
        .await
        .context("Report generation failed")?;
    std::fs::write(out, &payload.bytes)
        .with_context(|| format!("Failed to write report: {:?}", out))?;

    println!("📄 Wrote {} bytes ({}) to {:?}", payload.bytes.len(), payload.content_type, out);
    Ok(())
}
