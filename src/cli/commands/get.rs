//! `credvault get`: decrypt and print a single credential.

use crate::cli::{with_unlocked_vault, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `get` command.
pub fn execute(cli: &Cli, id: i64, json: bool) -> Result<()> {
    let cred = with_unlocked_vault(cli, |vault| vault.get_by_id(id))?;

    if json {
        let text = serde_json::to_string_pretty(&cred)
            .map_err(|e| VaultError::Serialization(e.to_string()))?;
        println!("{text}");
    } else {
        // Payload only, so the output can be piped.
        println!("{}", cred.auth_data);
    }

    Ok(())
}
