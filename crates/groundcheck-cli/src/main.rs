mod preview;
mod run;

use clap::{Args, CommandFactory, Parser, Subcommand};
use groundcheck_core::SheetRange;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "groundcheck-cli")]
#[command(about = "Ground-check batch runner for the Matcha Pro listing")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Process a slice of the sheet in the attached browser (ctrl-c stops
    /// after the current record)
    Run {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Attach to the browser and wait for the operator to log in
    CheckLogin,
    /// Print each row's pre-filter decision without touching a browser
    Preview {
        #[command(flatten)]
        range: RangeArgs,
        /// Print records as JSON lines instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args, PartialEq, Eq)]
struct RangeArgs {
    /// Sheet tab name
    #[arg(long)]
    sheet: String,
    /// First row to read (1-based)
    #[arg(long, default_value = "1", value_parser = positive)]
    start_row: usize,
    /// Maximum number of rows to read
    #[arg(long, default_value = "100", value_parser = positive)]
    max_rows: usize,
}

impl From<RangeArgs> for SheetRange {
    fn from(args: RangeArgs) -> Self {
        Self {
            sheet_name: args.sheet,
            start_row: args.start_row,
            max_rows: args.max_rows,
        }
    }
}

fn positive(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = groundcheck_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Run { range } => run::run_batch(&config, range.into()).await,
        Commands::CheckLogin => run::run_check_login(&config).await,
        Commands::Preview { range, json } => preview::run_preview(&config, &range.into(), json).await,
    }
}
