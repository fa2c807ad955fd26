use clap::Parser;
use inivault::cli::{commands, output, Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Sections => commands::list::execute(&cli),
        Commands::Keys { ref section } => commands::keys::execute(&cli, section),
        Commands::Get {
            ref section,
            ref key,
            ref default,
        } => commands::get::execute(&cli, section, key, default.as_deref()),
        Commands::Set {
            ref section,
            ref key,
            ref value,
        } => commands::set::execute(&cli, section, key, value),
        Commands::Delete {
            ref section,
            ref key,
        } => commands::delete::execute(&cli, section, key.as_deref()),
        Commands::RenameSection { ref from, ref to } => {
            commands::rename::execute_section(&cli, from, to)
        }
        Commands::RenameKey {
            ref section,
            ref from,
            ref to,
        } => commands::rename::execute_key(&cli, section, from, to),
        Commands::Dump { ref section } => commands::dump::execute(&cli, section),
        Commands::Search {
            ref needle,
            ignore_case,
        } => commands::search::execute(&cli, needle, ignore_case),
        Commands::Export => commands::export::execute(&cli),
        Commands::ExportPassphrase => commands::export::execute_passphrase(&cli),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Log to stderr.  `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "inivault=debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(fallback))
        .format_target(false)
        .init();
}
