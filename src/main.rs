//! Partnerflow CLI entry point.

use clap::Parser;

use partnerflow::cli::{commands, handle_error, Cli, Commands};
use partnerflow::infrastructure::config::ConfigLoader;
use partnerflow::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, &config, cli.json).await,
        Commands::Influencer(args) => commands::influencer::execute(args, &config, cli.json).await,
        Commands::Workflow(args) => commands::workflow::execute(args, &config, cli.json).await,
        Commands::Portal(args) => commands::portal::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
