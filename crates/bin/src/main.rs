mod cli;
mod commands;
mod output;
mod session;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::output::OutputFormat;
use crate::session::Session;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("kobllux=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::from_flag(cli.json);

    let mut session = Session::open(cli.data_dir.as_deref(), cli.passphrase.as_deref()).await?;

    let credentials_changed = match &cli.command {
        Commands::Get(args) => {
            commands::entry::get(&session, args, format)?;
            false
        }
        Commands::Set(args) => {
            commands::entry::set(&session, args)?;
            false
        }
        Commands::Keys(command) => commands::keys::run(&mut session, command, format)?,
        Commands::Vault(command) => {
            // lock writes the bundle itself
            commands::vault::run(&mut session, command, format).await?;
            false
        }
        Commands::Theme(command) => {
            commands::theme::run(&session, command);
            false
        }
    };

    session.save(credentials_changed).await?;
    Ok(())
}
