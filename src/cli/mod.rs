//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::store::Database;
use crate::vault::VaultService;

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable holding the current master password.
pub const PASSWORD_ENV: &str = "CREDVAULT_PASSWORD";

/// Environment variable holding the new master password during rotation.
pub const NEW_PASSWORD_ENV: &str = "CREDVAULT_NEW_PASSWORD";

/// CredVault CLI: encrypted credential vault.
#[derive(Parser)]
#[command(
    name = "credvault",
    about = "Encrypted credential vault guarded by a master password",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding credvault.toml and the database (default: current dir)
    #[arg(long, env = "CREDVAULT_DIR", default_value = ".", global = true)]
    pub config_dir: PathBuf,

    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Show whether a master password is configured
    Status,

    /// Configure the master password for a new vault
    Setup,

    /// Store a new credential
    Add {
        /// Owning provider id
        #[arg(long)]
        provider: i64,
        /// Human-readable label
        #[arg(long)]
        label: String,
        /// Credential kind (e.g. token, ssh_key, oauth)
        #[arg(long, default_value = "token")]
        auth_type: String,
        /// Secret payload (omit for stdin or interactive prompt)
        value: Option<String>,
    },

    /// Decrypt and print a credential's payload
    Get {
        /// Credential id
        id: i64,
        /// Print the whole credential as JSON
        #[arg(long)]
        json: bool,
    },

    /// List credentials (payloads are never shown)
    List {
        /// Only credentials of this provider
        #[arg(long)]
        provider: Option<i64>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change a credential's label, type or payload
    Update {
        /// Credential id
        id: i64,
        /// New label
        #[arg(long)]
        label: Option<String>,
        /// New credential kind
        #[arg(long)]
        auth_type: Option<String>,
        /// New secret payload (omit to keep the current one)
        value: Option<String>,
        /// Read the new payload from stdin or a hidden prompt
        #[arg(long, conflicts_with = "value")]
        read_value: bool,
    },

    /// Delete a credential
    Delete {
        /// Credential id
        id: i64,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Change the master password and re-encrypt every credential
    ChangePassword,

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load `credvault.toml` from the configured directory.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    Settings::load(&cli.config_dir)
}

/// Open the database and build a locked `VaultService` over it.
pub fn open_vault(cli: &Cli) -> Result<VaultService> {
    let settings = load_settings(cli)?;
    let path = settings.database_path(&cli.config_dir);
    let db = Database::open(&path, &settings.database_options())?;
    Ok(VaultService::new(Arc::new(db), settings.kdf_params()))
}

/// Open and unlock the vault, run `f`, then lock again whatever `f` returned.
pub fn with_unlocked_vault<T>(cli: &Cli, f: impl FnOnce(&VaultService) -> Result<T>) -> Result<T> {
    let vault = open_vault(cli)?;
    if !vault.is_setup()? {
        return Err(VaultError::NotConfigured);
    }

    let password = prompt_password()?;
    vault.unlock(&password)?;
    drop(password);

    let result = f(&vault);
    vault.lock();
    result
}

/// Get the master password, trying in order:
/// 1. `CREDVAULT_PASSWORD` env var (scripts, CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation.
///
/// `env_var` is checked first for scripted usage.
/// Enforces a minimum password length.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_new_password(env_var: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            validate_new_password(&pw)?;
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose master password")
                .with_confirmation(
                    "Confirm master password",
                    "Passwords do not match, try again",
                )
                .interact()
                .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?,
        );

        if let Err(e) = validate_new_password(&password) {
            output::warning(&format!("{e}. Try again."));
            continue;
        }

        return Ok(password);
    }
}

/// Reject passwords that are too short to be worth deriving a key from.
pub fn validate_new_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(VaultError::CommandFailed(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Read a secret payload from one of three sources:
/// the command line, piped stdin, or a hidden interactive prompt.
pub fn read_secret_value(value: Option<&str>, prompt: &str) -> Result<Zeroizing<String>> {
    if let Some(v) = value {
        output::warning("Value provided on command line — it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed_len = buf.trim_end().len();
        buf.truncate(trimmed_len);
        return Ok(buf);
    }

    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}
