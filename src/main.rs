mod commands;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use classcal_core::Catalog;
use classcal_core::config::ClassCalConfig;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "classcal")]
#[command(about = "Browse the class schedule and export classes to your calendar")]
struct Cli {
    /// Print debug logs (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Class catalog to read (defaults to catalog_path from the config)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List classes, optionally filtered
    List {
        /// Only classes whose modality contains this text
        #[arg(short, long)]
        modality: Option<String>,

        /// Only classes whose instructor contains this text
        #[arg(short, long)]
        instructor: Option<String>,

        /// Search title, description and location
        #[arg(short, long)]
        search: Option<String>,

        /// Classes on or after this date (YYYY-MM-DD or "today")
        #[arg(long)]
        from: Option<String>,

        /// Classes on or before this date (YYYY-MM-DD or "today")
        #[arg(long)]
        to: Option<String>,
    },
    /// Show one class in detail
    Show { id: String },
    /// Export selected classes to an .ics file
    Export {
        /// Class id to select (repeat for more; repeating an id deselects it)
        #[arg(short, long = "select", value_name = "ID")]
        select: Vec<String>,

        /// Reminder before each class, in minutes or as a duration ("30", "1h")
        #[arg(short, long = "reminder", value_name = "LEAD")]
        reminders: Vec<String>,

        /// Export without any reminders
        #[arg(long, conflicts_with = "reminders")]
        no_reminders: bool,

        /// Timezone of the class times (e.g. "America/Sao_Paulo")
        #[arg(short, long)]
        timezone: Option<String>,

        /// Calendar name shown by calendar apps
        #[arg(short, long)]
        name: Option<String>,

        /// First part of the file name
        #[arg(long)]
        purpose: Option<String>,

        /// Directory to write the file to
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Fail instead of skipping classes with a bad date or time
        #[arg(long)]
        strict: bool,

        /// Open the file with the default calendar app afterwards
        #[arg(long)]
        open: bool,
    },
    /// Show configuration paths and values
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ClassCalConfig::load()?;

    match cli.command {
        Commands::List {
            modality,
            instructor,
            search,
            from,
            to,
        } => {
            let catalog = load_catalog(&config, cli.catalog)?;
            let filter = commands::list::build_filter(modality, instructor, search, from, to)?;
            commands::list::run(&catalog, &filter)
        }
        Commands::Show { id } => {
            let catalog = load_catalog(&config, cli.catalog)?;
            commands::show::run(&catalog, &id)
        }
        Commands::Export {
            select,
            reminders,
            no_reminders,
            timezone,
            name,
            purpose,
            out,
            strict,
            open,
        } => {
            let catalog = load_catalog(&config, cli.catalog)?;
            let args = commands::export::ExportArgs {
                select,
                reminders,
                no_reminders,
                timezone,
                name,
                purpose,
                out,
                strict,
                open,
            };
            commands::export::run(&config, &catalog, args)
        }
        Commands::Config => commands::config::run(&config),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn load_catalog(config: &ClassCalConfig, path: Option<PathBuf>) -> Result<Catalog> {
    let path = path.unwrap_or_else(|| config.catalog_path());

    if !path.exists() {
        anyhow::bail!(
            "No class catalog found at {}\n\n\
            Point classcal at one with:\n  \
            classcal --catalog classes.json list\n\n\
            or set catalog_path in {}",
            path.display(),
            ClassCalConfig::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "config.toml".to_string())
        );
    }

    Catalog::load(&path).with_context(|| format!("Failed to load catalog {}", path.display()))
}
