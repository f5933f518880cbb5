//! Theme commands.

use kobllux::Theme;

use crate::cli::ThemeCommand;
use crate::session::Session;

/// Run a theme subcommand
pub fn run(session: &Session, command: &ThemeCommand) {
    let theme = Theme::new(session.store.clone());
    let mode = match command {
        ThemeCommand::Cycle => theme.cycle(),
        ThemeCommand::Auto => theme.enable_auto(),
    };
    println!("{mode}");
}
