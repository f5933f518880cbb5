//! Vault commands.

use kobllux::VaultState;

use crate::cli::VaultCommand;
use crate::output::OutputFormat;
use crate::session::Session;

/// Run a vault subcommand.
pub async fn run(
    session: &mut Session,
    command: &VaultCommand,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        VaultCommand::Lock { new_passphrase } => {
            session.controller.lock(new_passphrase).await?;
            println!("Credential bundle encrypted");
        }
        VaultCommand::Unlock => {
            // Session::open already tried the passphrase.
            if session.controller.vault_state() != VaultState::Unlocked {
                return Err(
                    "the vault is not unlocked; pass --passphrase or set KOBLLUX_PASSPHRASE".into(),
                );
            }
            println!(
                "Unlocked: {} credential(s)",
                session.controller.credentials().len()
            );
        }
        VaultCommand::Status => status(session, format)?,
    }
    Ok(())
}

fn status(session: &Session, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let state = session.controller.vault_state();
    let count = session.controller.credentials().len();
    match format {
        OutputFormat::Human => {
            println!("State:       {state}");
            println!("Credentials: {count}");
            println!("User:        {}", session.controller.display_name());
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "state": state.to_string(),
                "credentials": count,
                "user": session.controller.display_name(),
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
