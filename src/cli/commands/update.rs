//! `credvault update`: change an existing credential and re-encrypt it.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{read_secret_value, with_unlocked_vault, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `update` command.
///
/// A new payload comes from the positional `value` or, with `read_value`,
/// from piped stdin or a hidden prompt.
pub fn execute(
    cli: &Cli,
    id: i64,
    label: Option<&str>,
    auth_type: Option<&str>,
    value: Option<&str>,
    read_value: bool,
) -> Result<()> {
    let new_payload: Option<Zeroizing<String>> = match (value, read_value) {
        (Some(v), _) => Some(read_secret_value(Some(v), "New value")?),
        (None, true) => Some(read_secret_value(None, "Enter new value")?),
        (None, false) => None,
    };

    if label.is_none() && auth_type.is_none() && new_payload.is_none() {
        return Err(VaultError::CommandFailed(
            "nothing to update: pass --label, --auth-type, a new value or --read-value".into(),
        ));
    }

    with_unlocked_vault(cli, |vault| {
        let mut cred = vault.get_by_id(id)?;
        if let Some(label) = label {
            cred.label = label.to_string();
        }
        if let Some(auth_type) = auth_type {
            cred.auth_type = auth_type.to_string();
        }
        if let Some(payload) = &new_payload {
            // The new copy is zeroed when `cred` drops; the replaced one here.
            let mut old = std::mem::replace(&mut cred.auth_data, payload.as_str().to_owned());
            zeroize::Zeroize::zeroize(&mut old);
        }
        vault.update(&cred)
    })?;

    output::success(&format!("Updated credential {id}"));
    Ok(())
}
