//! `credvault change-password`: rotate the master password.
//!
//! Every credential is decrypted with the current password and
//! re-encrypted under the new one in a single transaction.  If anything
//! fails, the vault is left exactly as it was.

use crate::cli::output;
use crate::cli::{open_vault, prompt_new_password, prompt_password, Cli, NEW_PASSWORD_ENV};
use crate::errors::{Result, VaultError};

/// Execute the `change-password` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let vault = open_vault(cli)?;
    if !vault.is_setup()? {
        return Err(VaultError::NotConfigured);
    }

    // 1. The current password.
    output::info("Enter your current master password.");
    let old_password = prompt_password()?;

    // 2. The new password.
    output::info("Choose your new master password.");
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;

    // 3. Rotate.  The vault stays locked throughout.
    vault.change_master_password(&old_password, &new_password)?;

    output::success("Master password changed; all credentials re-encrypted");
    Ok(())
}
