use crate::infra::{file_backed_service, read_json_file};
use crate::server;
use clap::{Args, Parser, Subcommand};
use smb_underwriter::config::AppConfig;
use smb_underwriter::error::AppError;
use smb_underwriter::underwriting::{
    ApplicationId, BatchScorer, CreditBureau, DecisionRecord, IntakeSubmission, JsonFileStore,
    MockCreditBureau, SoftPullRecord, UnderwritingEngine,
};
use std::path::PathBuf;

const CLI_CHANNEL: &str = "cli-intake";

#[derive(Parser, Debug)]
#[command(
    name = "smb-underwriter",
    about = "Score small-business loan applications and serve the underwriting API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a single application JSON document
    Score(ScoreArgs),
    /// Score every row of an application CSV
    Batch(BatchArgs),
    /// Manage stored applications
    Applications {
        #[command(subcommand)]
        command: ApplicationsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ApplicationsCommand {
    /// List stored application ids
    List(StoreArgs),
    /// Print a stored application and its current decision
    Show {
        /// Application id, e.g. app-20250401120000
        id: String,
        #[command(flatten)]
        store: StoreArgs,
        /// Emit JSON instead of the human-readable block
        #[arg(long)]
        json: bool,
    },
    /// Validate, store, and score an intake submission
    Submit {
        /// Intake submission JSON file
        #[arg(long)]
        file: PathBuf,
        #[command(flatten)]
        store: StoreArgs,
        /// Emit JSON instead of the human-readable block
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the directory holding stored applications
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// Override the directory holding stored applications
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Application JSON file
    #[arg(long)]
    application: PathBuf,
    /// Credit band reported by the soft pull (e.g. "good" or "700-719")
    #[arg(long)]
    credit_band: Option<String>,
    /// Revolving utilization percentage reported by the soft pull
    #[arg(long)]
    utilization: Option<f64>,
    /// Community impact level override (0-4)
    #[arg(long)]
    impact: Option<i64>,
    /// Emit JSON instead of the human-readable block
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// CSV file with one application per row
    #[arg(long)]
    csv: PathBuf,
    /// Emit JSON instead of one summary line per row
    #[arg(long)]
    json: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Batch(args) => run_batch(args),
        Command::Applications { command } => run_applications(command),
    }
}

fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let mut application = JsonFileStore::load_path(&args.application)?;
    if let Some(level) = args.impact {
        application.impact_level = Some(level);
    }

    let utilization = args.utilization.or(application.utilization_pct);
    let soft_pull = operator_soft_pull(args.credit_band, utilization)
        .or_else(|| MockCreditBureau.soft_pull(&application));
    let result = UnderwritingEngine::default().score(&application, soft_pull.as_ref());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let label = application
            .business_name
            .as_deref()
            .unwrap_or("application");
        render_decision(label, &result);
    }
    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let outcomes = BatchScorer::from_path(&args.csv, &UnderwritingEngine::default())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
        return Ok(());
    }

    println!("Scored {} application(s) from {}", outcomes.len(), args.csv.display());
    for outcome in &outcomes {
        println!("  {:<24} {}", outcome.application_id, outcome.result.summary());
    }
    Ok(())
}

fn run_applications(command: ApplicationsCommand) -> Result<(), AppError> {
    match command {
        ApplicationsCommand::List(store) => {
            let service = file_backed_service(&data_dir(store)?);
            let ids = service.list()?;
            if ids.is_empty() {
                println!("No stored applications.");
            }
            for id in ids {
                println!("{id}");
            }
        }
        ApplicationsCommand::Show { id, store, json } => {
            let service = file_backed_service(&data_dir(store)?);
            let scored = service.score(&ApplicationId(id), Default::default())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&scored)?);
            } else {
                let label = scored
                    .application
                    .business_name
                    .clone()
                    .unwrap_or_else(|| scored.application_id.to_string());
                println!("Application {}", scored.application_id);
                if let Some(meta) = &scored.application.metadata {
                    println!(
                        "  Submitted {} via {} ({})",
                        meta.submitted_at, meta.channel, meta.status
                    );
                }
                let outstanding = scored.application.compliance.outstanding();
                if !outstanding.is_empty() {
                    println!("  Compliance outstanding: {}", outstanding.join(", "));
                }
                render_decision(&label, &scored.result);
            }
        }
        ApplicationsCommand::Submit { file, store, json } => {
            let service = file_backed_service(&data_dir(store)?);
            let submission: IntakeSubmission = read_json_file(&file)?;
            let scored = service.submit(submission, CLI_CHANNEL)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&scored)?);
            } else {
                println!("Stored application {}", scored.application_id);
                let label = scored
                    .application
                    .business_name
                    .clone()
                    .unwrap_or_else(|| scored.application_id.to_string());
                render_decision(&label, &scored.result);
            }
        }
    }
    Ok(())
}

fn data_dir(args: StoreArgs) -> Result<PathBuf, AppError> {
    match args.data_dir {
        Some(dir) => Ok(dir),
        None => Ok(AppConfig::load()?.storage.data_dir),
    }
}

fn operator_soft_pull(band: Option<String>, utilization: Option<f64>) -> Option<SoftPullRecord> {
    if band.is_none() && utilization.is_none() {
        return None;
    }
    Some(SoftPullRecord::approved(band, utilization))
}

fn render_decision(label: &str, result: &DecisionRecord) {
    println!("\nUnderwriting decision for {label}");
    println!("  Decision: {}", result.decision.label());
    println!("  Risk tier: {}", result.risk_tier);
    println!("  APR estimate: {:.1}%", result.apr_estimate);
    println!("  DSCR estimate: {:.2}", result.dscr_estimate);
    println!("  Score: {:.1}%", result.score_pct);
    println!("  Subscores (0-4):");
    for (name, value) in result.subscores.entries() {
        println!("    {:<18} {:.1}", name, value);
    }
    if let Some(guidance) = &result.tranche_guidance {
        println!("  Tranche guidance: {guidance}");
    }
}
