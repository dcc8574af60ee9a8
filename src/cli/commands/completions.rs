//! `credvault completions`: print a shell completion script to stdout.
//!
//!   credvault completions bash > ~/.local/share/bash-completion/completions/credvault
//!   credvault completions zsh > "${fpath[1]}/_credvault"

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::Cli;
use crate::errors::Result;

/// Binary name the generated scripts complete for.
const BIN_NAME: &str = "credvault";

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write_completions(shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}

/// Render the completion script for `shell` into `out`.
pub fn write_completions(shell: Shell, out: &mut impl Write) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, BIN_NAME, out);
}
