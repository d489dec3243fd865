use anyhow::Result;
use clap::Parser;
use log::{debug, info};

use survey_export::api::SurveyClient;
use survey_export::config::Config;
use survey_export::pipeline::Exporter;
use survey_export::ui::prompts;

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = &cli.log_file {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        logger.target(env_logger::Target::Pipe(Box::new(log_file)));
    }
    logger.init();

    dotenvy::dotenv().ok();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env();
    config.validate()?;
    debug!("Using API server {}", config.server());

    let options = cli.export_options();
    let client = if options.needs_api() {
        Some(SurveyClient::new(&config)?.with_retry_prompt(Box::new(prompts::prompt_tls_retry)))
    } else {
        None
    };

    let mut exporter = Exporter::new(&config)?;
    if let Some(client) = &client {
        exporter = exporter.with_client(client);
    }

    info!("Starting survey export");
    let summary = exporter.run(&options).await?;

    println!(
        "Exported {} surveys, {} responses, {} answers.",
        summary.surveys, summary.responses, summary.answers
    );

    Ok(())
}
