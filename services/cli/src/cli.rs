use crate::commands::{run_catalog, run_health, run_preview, run_quiz};
use clap::{Args, Parser, Subcommand};
use civic_sense::config::{ApiConfig, AppConfig};
use civic_sense::error::AppError;
use civic_sense::telemetry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "civic-sense",
    about = "Take the policy quiz and see which manifestos align with your views",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer the policy questions and view your top manifesto matches
    Quiz(QuizArgs),
    /// Render a saved scoring payload without contacting the service
    Preview(PreviewArgs),
    /// List the manifestos known to the scoring service
    Manifestos(ServiceArgs),
    /// Check that the scoring service is reachable
    Health(ServiceArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServiceArgs {
    /// Override the configured scoring service URL
    #[arg(long)]
    pub(crate) api_url: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct QuizArgs {
    /// Email of the account taking the quiz
    #[arg(long)]
    pub(crate) account: String,
    /// Account password; prompted for when omitted
    #[arg(long)]
    pub(crate) password: Option<String>,
    #[command(flatten)]
    pub(crate) service: ServiceArgs,
    /// Print the final session view as JSON after the quiz ends
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PreviewArgs {
    /// JSON file holding an alignment results payload
    #[arg(long)]
    pub(crate) payload: PathBuf,
    /// Manifesto id whose policy breakdown should be expanded
    #[arg(long)]
    pub(crate) expand: Option<String>,
    /// Print the results view as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

/// Loads configuration, applies command-line overrides, and installs logging.
fn prepare(service: &mut ServiceArgs) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;

    if let Some(api_url) = service.api_url.take() {
        config.api = ApiConfig::parse(&api_url)?;
    }

    telemetry::init(&config.telemetry, std::io::stderr)?;
    Ok(config)
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Quiz(mut args) => {
            let config = prepare(&mut args.service)?;
            run_quiz(&config, args).await
        }
        Command::Preview(args) => {
            let config = AppConfig::load()?;
            telemetry::init(&config.telemetry, std::io::stderr)?;
            run_preview(args)
        }
        Command::Manifestos(mut args) => {
            let config = prepare(&mut args)?;
            run_catalog(&config).await
        }
        Command::Health(mut args) => {
            let config = prepare(&mut args)?;
            run_health(&config).await
        }
    }
}
