//! `credvault add`: encrypt and store a new credential.

use crate::cli::output;
use crate::cli::{read_secret_value, with_unlocked_vault, Cli};
use crate::errors::Result;
use crate::vault::NewCredential;

/// Execute the `add` command.
pub fn execute(
    cli: &Cli,
    provider_id: i64,
    label: &str,
    auth_type: &str,
    value: Option<&str>,
) -> Result<()> {
    let payload = read_secret_value(value, &format!("Enter value for {label}"))?;
    let new = NewCredential::new(provider_id, label, auth_type, payload.as_str());

    let id = with_unlocked_vault(cli, |vault| vault.store(&new))?;

    output::success(&format!("Stored credential {id} ('{label}', provider {provider_id})"));
    Ok(())
}
