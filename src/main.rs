use clap::Parser;
use credvault::cli::{output, Cli, Commands};
use credvault::config::Settings;

fn main() {
    let cli = Cli::parse();

    // A broken config file is reported by the command itself; logging
    // falls back to the default level meanwhile.
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        Settings::load(&cli.config_dir)
            .map(|s| s.log_level)
            .unwrap_or_else(|_| "warn".to_string())
    };
    credvault::logging::init(&log_level);

    let result = match cli.command {
        Commands::Status => credvault::cli::commands::status::execute(&cli),
        Commands::Setup => credvault::cli::commands::setup::execute(&cli),
        Commands::Add {
            provider,
            ref label,
            ref auth_type,
            ref value,
        } => credvault::cli::commands::add::execute(
            &cli,
            provider,
            label,
            auth_type,
            value.as_deref(),
        ),
        Commands::Get { id, json } => credvault::cli::commands::get::execute(&cli, id, json),
        Commands::List { provider, json } => {
            credvault::cli::commands::list::execute(&cli, provider, json)
        }
        Commands::Update {
            id,
            ref label,
            ref auth_type,
            ref value,
            read_value,
        } => credvault::cli::commands::update::execute(
            &cli,
            id,
            label.as_deref(),
            auth_type.as_deref(),
            value.as_deref(),
            read_value,
        ),
        Commands::Delete { id, force } => {
            credvault::cli::commands::delete::execute(&cli, id, force)
        }
        Commands::ChangePassword => credvault::cli::commands::change_password::execute(&cli),
        Commands::Completions { shell } => credvault::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        if e.is_retryable() {
            output::tip("The database is busy; try again in a moment.");
        }
        std::process::exit(1);
    }
}
