//! `credvault list`: display credential metadata in a table.

use crate::cli::output::{self, CredentialSummary};
use crate::cli::{with_unlocked_vault, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `list` command.
pub fn execute(cli: &Cli, provider_id: Option<i64>, json: bool) -> Result<()> {
    let creds = with_unlocked_vault(cli, |vault| match provider_id {
        Some(pid) => vault.get_by_provider_id(pid),
        None => vault.list(),
    })?;

    if json {
        let summaries: Vec<CredentialSummary<'_>> = creds.iter().map(Into::into).collect();
        let text = serde_json::to_string_pretty(&summaries)
            .map_err(|e| VaultError::Serialization(e.to_string()))?;
        println!("{text}");
        return Ok(());
    }

    match provider_id {
        Some(pid) => output::info(&format!("Provider {pid} — {} credential(s)", creds.len())),
        None => output::info(&format!("{} credential(s)", creds.len())),
    }
    output::print_credentials_table(&creds);

    Ok(())
}
