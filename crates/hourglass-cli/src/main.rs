use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod surface;

#[derive(Parser)]
#[command(name = "hourglass-cli", version, about = "Hourglass CLI")]
struct Cli {
    /// Log debug output (ticks, suppressed notifications) to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the hourglass screen, reading sensor samples and actions from stdin
    Run(commands::run::RunArgs),
    /// Print bulb levels, armed alarm and permission as JSON
    Status,
    /// Refill the upper bulb
    Reset,
    /// Completion alarm
    Alarm {
        #[command(subcommand)]
        action: commands::alarm::AlarmAction,
    },
    /// Shown notifications
    Notification {
        #[command(subcommand)]
        action: commands::notification::NotificationAction,
    },
    /// Notification permission
    Permission {
        #[command(subcommand)]
        action: commands::permission::PermissionAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "hourglass_core=debug,hourglass_cli=debug"
    } else {
        "hourglass_core=info,hourglass_cli=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Status => commands::status::status(),
        Commands::Reset => commands::status::reset(),
        Commands::Alarm { action } => commands::alarm::run(action),
        Commands::Notification { action } => commands::notification::run(action),
        Commands::Permission { action } => commands::permission::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
