//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;
use serde::Serialize;

use crate::vault::Credential;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Credential metadata safe to print: everything except the payload.
#[derive(Debug, Serialize)]
pub struct CredentialSummary<'a> {
    pub id: i64,
    pub provider_id: i64,
    pub label: &'a str,
    pub auth_type: &'a str,
    pub created_at: String,
    pub updated_at: String,
}

impl<'a> From<&'a Credential> for CredentialSummary<'a> {
    fn from(c: &'a Credential) -> Self {
        Self {
            id: c.id,
            provider_id: c.provider_id,
            label: &c.label,
            auth_type: &c.auth_type,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

/// Print a table of credential metadata (Id, Provider, Label, Type, Created, Updated).
pub fn print_credentials_table(creds: &[Credential]) {
    if creds.is_empty() {
        info("No credentials in this vault yet.");
        tip("Run `credvault add --provider <ID> --label <LABEL>` to add your first one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Provider", "Label", "Type", "Created", "Updated"]);

    for c in creds {
        table.add_row(vec![
            c.id.to_string(),
            c.provider_id.to_string(),
            c.label.clone(),
            c.auth_type.clone(),
            c.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            c.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}
