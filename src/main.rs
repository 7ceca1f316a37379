mod cli;

use clap::{Parser, Subcommand};
use group_digest::config::SourceKind;
use group_digest::summary::AnalysisType;

use cli::summarize::SummarizeArgs;
use cli::sync::SyncArgs;

#[derive(Parser)]
#[command(name = "group-digest", version, about = "Group Digest — WhatsApp group sync and AI summaries")]
struct App {
    /// Data directory (defaults to GROUP_DIGEST_DATA_DIR or the platform config dir)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Log to stderr instead of group-digest.log
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to WhatsApp: generate and print the QR code
    Connect,
    /// Show connection and fetch settings
    Status,
    /// Forget the WhatsApp session
    Logout,
    /// List available groups
    Groups,
    /// Download a group's messages with the bridge script
    Download { group_id: String },
    /// Fetch the recent window of a group and store new messages
    Sync {
        group_id: String,
        #[command(flatten)]
        opts: SyncOpts,
    },
    /// Sync every listed group in parallel
    SyncAll {
        #[command(flatten)]
        opts: SyncOpts,
    },
    /// Count stored messages inside the window
    Verify {
        group_id: String,
        #[arg(long)]
        window_secs: Option<f64>,
    },
    /// Summarize a group's recent messages
    Summarize {
        group_id: String,
        /// main_topics or specific_messages
        #[arg(long, default_value = "main_topics", value_parser = parse_analysis)]
        analysis: AnalysisType,
        /// Substring filter for specific_messages
        #[arg(long)]
        criteria: Option<String>,
        /// Named prompt from summary_prompts.json
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long)]
        window_secs: Option<f64>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List named summary prompts
    Prompts,
    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
struct SyncOpts {
    /// Trailing window in seconds
    #[arg(long)]
    window_secs: Option<f64>,
    /// Messages per source call
    #[arg(long)]
    batch_size: Option<usize>,
    /// simulated or export
    #[arg(long, value_parser = parse_source)]
    source: Option<SourceKind>,
}

impl From<SyncOpts> for SyncArgs {
    fn from(o: SyncOpts) -> Self {
        SyncArgs {
            window_secs: o.window_secs,
            batch_size: o.batch_size,
            source: o.source,
        }
    }
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display the full configuration
    Show,
    /// Get a config value (dot notation: fetch.window_secs)
    Get {
        /// Config key (dot notation)
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key (dot notation)
        key: String,
        /// Value (JSON: true, false, 42, "string")
        value: String,
    },
}

fn parse_analysis(s: &str) -> Result<AnalysisType, String> {
    s.parse()
}

fn parse_source(s: &str) -> Result<SourceKind, String> {
    s.parse()
}

fn main() {
    let app = App::parse();

    let data_dir = match cli::resolve_data_dir(app.data_dir.as_deref()) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    if app.verbose {
        group_digest::tracing_init::init_stderr_tracing();
    } else {
        group_digest::tracing_init::init_file_tracing(&data_dir);
    }

    let ctx = match cli::Context::load(data_dir) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!(error = %e, "Configuration failed");
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let result = match app.command {
        Commands::Connect => cli::session::connect(&ctx),
        Commands::Status => cli::session::status(&ctx),
        Commands::Logout => cli::session::logout(&ctx),
        Commands::Groups => cli::session::groups(&ctx),
        Commands::Download { group_id } => cli::session::download(&ctx, &group_id),
        Commands::Sync { group_id, opts } => cli::sync::run(&ctx, &group_id, &opts.into()),
        Commands::SyncAll { opts } => cli::sync::run_all(&ctx, &opts.into()),
        Commands::Verify { group_id, window_secs } => cli::sync::verify(&ctx, &group_id, window_secs),
        Commands::Summarize { group_id, analysis, criteria, prompt, window_secs, json } => {
            cli::summarize::run(
                &ctx,
                &group_id,
                &SummarizeArgs { analysis, criteria, prompt, window_secs, json },
            )
        }
        Commands::Prompts => cli::summarize::list_prompts(&ctx),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::config::run_show(&ctx),
            ConfigAction::Get { key } => cli::config::run_get(&ctx, &key),
            ConfigAction::Set { key, value } => cli::config::run_set(&ctx, &key, &value),
        },
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
