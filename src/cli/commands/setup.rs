//! `credvault setup`: configure the master password for a new vault.

use crate::cli::output;
use crate::cli::{load_settings, open_vault, prompt_new_password, Cli, PASSWORD_ENV};
use crate::errors::{Result, VaultError};

/// Execute the `setup` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = settings.database_path(&cli.config_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let vault = open_vault(cli)?;
    if vault.is_setup()? {
        return Err(VaultError::AlreadyConfigured);
    }

    let password = prompt_new_password(PASSWORD_ENV)?;
    vault.setup_master_password(&password)?;
    vault.lock();

    output::success(&format!("Vault created at {}", path.display()));
    output::tip("Add a credential: credvault add --provider <ID> --label <LABEL>");

    Ok(())
}
