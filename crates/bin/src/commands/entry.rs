//! Single-entry reads and writes.

use std::sync::Arc;

use kobllux::projector::{MemoryFragment, StateProjector, SurfaceKind};

use crate::cli::{GetArgs, SetArgs};
use crate::output::OutputFormat;
use crate::session::Session;

/// Run the get command
pub fn get(
    session: &Session,
    args: &GetArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Human => println!("{}", session.store.get(&args.key, &args.fallback)),
        OutputFormat::Json => {
            let value = serde_json::json!({
                "key": args.key,
                "value": session.store.get_opt(&args.key),
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}

/// Run the set command.
///
/// The write goes through a headless dashboard surface, so identity and
/// credential entries are refused here just as they are in the UI.
pub fn set(session: &Session, args: &SetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let projector = StateProjector::new(
        SurfaceKind::Dashboard,
        session.store.clone(),
        Arc::new(MemoryFragment::new()),
    );
    projector.commit(&args.key, &args.value)?;
    tracing::info!(key = %args.key, "entry updated");
    Ok(())
}
