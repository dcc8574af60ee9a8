//! `credvault status`: report whether the vault has a master password.

use crate::cli::output;
use crate::cli::{load_settings, open_vault, Cli};
use crate::errors::Result;

/// Execute the `status` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = settings.database_path(&cli.config_dir);

    if !path.exists() {
        output::info(&format!("No vault at {}", path.display()));
        output::tip("Run `credvault setup` to create one.");
        return Ok(());
    }

    let vault = open_vault(cli)?;
    output::info(&format!("Vault: {}", path.display()));

    if vault.is_setup()? {
        output::success("Master password configured");
    } else {
        output::warning("Master password not configured");
        output::tip("Run `credvault setup` to configure it.");
    }

    Ok(())
}
