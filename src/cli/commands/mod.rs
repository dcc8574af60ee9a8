//! One module per subcommand.  Each exposes an `execute` function.

pub mod add;
pub mod change_password;
pub mod completions;
pub mod delete;
pub mod get;
pub mod list;
pub mod setup;
pub mod status;
pub mod update;
