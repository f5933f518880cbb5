//! Credential management commands.

use crate::cli::KeysCommand;
use crate::output::{OutputFormat, mask_token, print_table};
use crate::session::Session;

/// Run a keys subcommand. Returns whether the credential list changed.
pub fn run(
    session: &mut Session,
    command: &KeysCommand,
    format: OutputFormat,
) -> Result<bool, Box<dyn std::error::Error>> {
    match command {
        KeysCommand::Add { name, token } => {
            let credential = session.controller.add_credential(name, token)?;
            println!("{}", credential.id);
            Ok(true)
        }
        KeysCommand::Activate { id } => {
            session.controller.activate(id)?;
            Ok(true)
        }
        KeysCommand::Remove { id } => {
            if session.controller.remove(id)?.is_none() {
                eprintln!("No credential with id {id}");
                return Ok(false);
            }
            Ok(true)
        }
        KeysCommand::List => {
            list(session, format)?;
            Ok(false)
        }
    }
}

fn list(session: &Session, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let credentials = session.controller.credentials();
    match format {
        OutputFormat::Human => {
            let rows: Vec<Vec<String>> = credentials
                .iter()
                .map(|c| {
                    vec![
                        if c.active { "*".to_string() } else { String::new() },
                        c.id.clone(),
                        c.name.clone(),
                        mask_token(&c.token),
                    ]
                })
                .collect();
            print_table(&["", "ID", "NAME", "TOKEN"], &rows);
        }
        OutputFormat::Json => {
            let value: Vec<serde_json::Value> = credentials
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "id": c.id,
                        "name": c.name,
                        "active": c.active,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
