mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command, DeployTemplate, SecretsCommand};
use mintforge_core::MintforgeConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = mintforge_core::init_logging()?;
    let config = MintforgeConfig::load()?;

    match cli.command {
        Command::Serve(args) => commands::serve(config, args).await,
        Command::Deploy(DeployTemplate::Token(args)) => commands::deploy_token(config, args).await,
        Command::Deploy(DeployTemplate::Nft(args)) => commands::deploy_nft(config, args).await,
        Command::Chains(args) => commands::chains(args),
        Command::Stats(args) => commands::stats(args).await,
        Command::Health(args) => commands::health(args).await,
        Command::Contracts(args) => commands::contracts(args),
        Command::Secrets(SecretsCommand::Set(args)) => commands::secrets_set(args),
        Command::Secrets(SecretsCommand::List) => commands::secrets_list(),
    }
}
