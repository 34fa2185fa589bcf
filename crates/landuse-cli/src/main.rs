use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "landuse")]
#[command(about = "Landuse CLI - edit land-use scenarios with patterns and fills", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Backend base URL, overrides the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Path to a config file instead of ~/.config/landuse/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Run against an in-memory demo backend
    #[arg(long, global = true)]
    pub offline: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or look up sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Manage scenarios of a session
    Scenario {
        #[command(subcommand)]
        action: ScenarioAction,
    },
    /// Manage wallpapering patterns of a session
    Pattern {
        #[command(subcommand)]
        action: PatternAction,
    },
    /// Stamp a pattern onto a parcel
    Wallpaper {
        #[command(subcommand)]
        action: WallpaperAction,
    },
    /// Paint a parcel with one LULC category
    Fill {
        #[command(subcommand)]
        action: FillAction,
    },
    /// Crop a scenario's land use to its study area
    Crop {
        #[command(subcommand)]
        action: CropAction,
    },
    /// Follow submitted jobs
    Job {
        #[command(subcommand)]
        action: JobAction,
    },
    /// Query LULC codes and tables
    Lulc {
        #[command(subcommand)]
        action: LulcAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Create a new session
    Create,
    /// Show an existing session
    Get { session_id: String },
}

#[derive(Subcommand)]
enum ScenarioAction {
    /// List the scenarios of a session
    List { session_id: String },
    /// Show one scenario
    Get { scenario_id: String },
    /// Create a scenario in a session
    Create {
        session_id: String,
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
enum PatternAction {
    /// List the patterns of a session
    List { session_id: String },
    /// Create a pattern from a polygon
    Create {
        session_id: String,
        name: String,
        /// Polygon as "x,y;x,y;x,y"
        #[arg(long)]
        geometry: String,
    },
}

#[derive(Subcommand)]
enum WallpaperAction {
    /// Submit a wallpaper job
    Submit {
        #[arg(long)]
        session: String,
        #[arg(long)]
        scenario: String,
        #[arg(long)]
        pattern: String,
        /// Target parcel as "x,y;x,y;x,y"
        #[arg(long)]
        target: String,
        /// Wait for the job and print its LULC table
        #[arg(long)]
        wait: bool,
    },
}

#[derive(Subcommand)]
enum FillAction {
    /// Submit a fill job
    Submit {
        #[arg(long)]
        session: String,
        #[arg(long)]
        scenario: String,
        /// LULC category name, e.g. "forest"
        #[arg(long = "class")]
        lulc_class: String,
        /// Target parcel as "x,y;x,y;x,y"
        #[arg(long)]
        target: String,
        /// Wait for the job and print its LULC table
        #[arg(long)]
        wait: bool,
    },
}

#[derive(Subcommand)]
enum CropAction {
    /// Submit a crop job
    Submit {
        #[arg(long)]
        session: String,
        #[arg(long)]
        scenario: String,
        /// Wait for the job and print its LULC table
        #[arg(long)]
        wait: bool,
    },
}

#[derive(Subcommand)]
enum JobAction {
    /// List the backend's jobs, oldest first
    List,
    /// Show the current status
    Status { job_id: String },
    /// Show the LULC table of a succeeded job
    Result { job_id: String },
    /// Poll until the job finishes
    Wait { job_id: String },
}

#[derive(Subcommand)]
enum LulcAction {
    /// List the LULC categories
    Codes,
    /// Baseline LULC table under a parcel
    Parcel {
        /// Parcel as "x,y;x,y;x,y"
        #[arg(long)]
        geometry: String,
    },
}

fn init_tracing(args: &GlobalArgs) {
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.global);

    if let Err(err) = run(cli).await {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::connect(&cli.global).await?;

    match cli.command {
        Commands::Session { action } => match action {
            SessionAction::Create => commands::session::create(&ctx).await?,
            SessionAction::Get { session_id } => commands::session::get(&ctx, &session_id).await?,
        },
        Commands::Scenario { action } => match action {
            ScenarioAction::List { session_id } => {
                commands::scenario::list(&ctx, &session_id).await?
            }
            ScenarioAction::Get { scenario_id } => {
                commands::scenario::get(&ctx, &scenario_id).await?
            }
            ScenarioAction::Create {
                session_id,
                name,
                description,
            } => commands::scenario::create(&ctx, &session_id, &name, description.as_deref()).await?,
        },
        Commands::Pattern { action } => match action {
            PatternAction::List { session_id } => commands::pattern::list(&ctx, &session_id).await?,
            PatternAction::Create {
                session_id,
                name,
                geometry,
            } => commands::pattern::create(&ctx, &session_id, &name, &geometry).await?,
        },
        Commands::Wallpaper { action } => match action {
            WallpaperAction::Submit {
                session,
                scenario,
                pattern,
                target,
                wait,
            } => {
                commands::job::submit_wallpaper(&ctx, &session, &scenario, &pattern, &target, wait)
                    .await?
            }
        },
        Commands::Fill { action } => match action {
            FillAction::Submit {
                session,
                scenario,
                lulc_class,
                target,
                wait,
            } => {
                commands::job::submit_fill(&ctx, &session, &scenario, &lulc_class, &target, wait)
                    .await?
            }
        },
        Commands::Crop { action } => match action {
            CropAction::Submit {
                session,
                scenario,
                wait,
            } => commands::job::submit_crop(&ctx, &session, &scenario, wait).await?,
        },
        Commands::Job { action } => match action {
            JobAction::List => commands::job::list(&ctx).await?,
            JobAction::Status { job_id } => commands::job::status(&ctx, &job_id).await?,
            JobAction::Result { job_id } => commands::job::result(&ctx, &job_id).await?,
            JobAction::Wait { job_id } => commands::job::wait(&ctx, &job_id).await?,
        },
        Commands::Lulc { action } => match action {
            LulcAction::Codes => commands::lulc::codes(&ctx).await?,
            LulcAction::Parcel { geometry } => commands::lulc::parcel(&ctx, &geometry).await?,
        },
    }

    Ok(())
}
