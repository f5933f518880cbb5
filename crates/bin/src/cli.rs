//! CLI argument definitions for the KOBLLUX binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// KOBLLUX shared state bus
#[derive(Parser, Debug)]
#[command(name = "kobllux")]
#[command(about = "KOBLLUX: inspect and edit the shared state of the chat widget and the Fusion card")]
#[command(version)]
pub struct Cli {
    /// Data directory holding kobllux.json
    #[arg(short = 'D', long, global = true, env = "KOBLLUX_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Passphrase used to unlock an encrypted credential bundle
    #[arg(long, global = true, env = "KOBLLUX_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read one entry
    Get(GetArgs),
    /// Write one shared entry
    Set(SetArgs),
    /// Manage API credentials
    #[command(subcommand)]
    Keys(KeysCommand),
    /// Encrypt, unlock, or inspect the credential vault
    #[command(subcommand)]
    Vault(VaultCommand),
    /// Change the solar theme
    #[command(subcommand)]
    Theme(ThemeCommand),
}

#[derive(clap::Args, Debug)]
pub struct GetArgs {
    /// Entry key, e.g. di_modelName
    pub key: String,

    /// Value printed when the entry is absent
    #[arg(long, default_value = "")]
    pub fallback: String,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Entry key, e.g. di_modelName
    pub key: String,

    /// New value
    pub value: String,
}

#[derive(Subcommand, Debug)]
pub enum KeysCommand {
    /// Add a credential; the first one becomes active
    Add {
        /// Label shown in the key list
        name: String,
        /// API token
        token: String,
    },
    /// Make a credential the active one
    Activate {
        /// Credential id
        id: String,
    },
    /// Delete a credential
    Remove {
        /// Credential id
        id: String,
    },
    /// List credentials
    List,
}

#[derive(Subcommand, Debug)]
pub enum VaultCommand {
    /// Encrypt the credential bundle under a new passphrase
    Lock {
        /// The new passphrase
        new_passphrase: String,
    },
    /// Check that --passphrase opens the bundle
    Unlock,
    /// Show the vault state
    Status,
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommand {
    /// Move to the next mode and turn automatic mode off
    Cycle,
    /// Follow the local hour again
    Auto,
}
