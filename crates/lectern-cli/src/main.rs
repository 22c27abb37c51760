#![forbid(unsafe_code)]

mod cmd;
mod identity;
mod output;
mod project;
mod validate;

use clap::{CommandFactory, Parser, Subcommand};
use cmd::Actor;
use lectern_core::config;
use lectern_core::model::ParseEnumError;
use output::{CliError, OutputMode};
use std::env;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "lectern: plan courses as subjects, trainings, topics, and units",
    long_about = None
)]
struct Cli {
    /// Enable debug logging (ignored when LECTERN_LOG is set).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors (ignored when LECTERN_LOG is set).
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Act as this user (id or email) for comments and user management.
    #[arg(long = "as", value_name = "USER", global = true)]
    as_user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize a lectern project",
        long_about = "Create .lectern/ in the current directory with a seed store and default config.",
        after_help = "EXAMPLES:\n    # Initialize a project in the current directory\n    lec init\n\n    # Start over with an empty store\n    lec init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Create an item",
        long_about = "Create a subject, training, topic, or unit. Every level below subject needs --parent.",
        after_help = "EXAMPLES:\n    # Create a subject\n    lec create subject --name \"Mathematics\"\n\n    # Create a unit with two speech texts\n    lec create unit --name Intro --parent <topic-id> --speech \"Welcome\" --speech \"Today we cover loops\"\n\n    # Emit machine-readable output\n    lec create subject --name Physics --json"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Update an item",
        long_about = "Merge-patch an item: only the flags you pass are changed.",
        after_help = "EXAMPLES:\n    # Rename\n    lec update topic <id> --name \"Loops and iteration\"\n\n    # Move a training under another subject\n    lec update training <id> --parent <subject-id>\n\n    # Drop all URLs\n    lec update unit <id> --clear-urls"
    )]
    Update(cmd::update::UpdateArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Set an item's status",
        after_help = "EXAMPLES:\n    lec status unit <id> ready"
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Delete an item and everything below it",
        long_about = "Delete an item. Deleting a parent removes all of its descendants.",
        after_help = "EXAMPLES:\n    # Asks for confirmation in a terminal\n    lec delete subject <id>\n\n    # Skip the prompt\n    lec delete topic <id> --force"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one item",
        long_about = "Show an item with its breadcrumb trail and direct children.",
        after_help = "EXAMPLES:\n    lec show training <id>\n\n    # Emit machine-readable output\n    lec show unit <id> --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Read",
        about = "List items of one level",
        after_help = "EXAMPLES:\n    # All subjects\n    lec list subjects\n\n    # Ready topics under one training\n    lec list topics --parent <training-id> --status ready\n\n    # Search name and description\n    lec list units --search intro"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Kanban board grouped by status",
        after_help = "EXAMPLES:\n    lec board\n\n    # Only units\n    lec board --level unit"
    )]
    Board(cmd::board::BoardArgs),

    #[command(
        next_help_heading = "Read",
        about = "Dashboard totals and recent activity",
        after_help = "EXAMPLES:\n    lec stats\n\n    # Show the ten most recently updated items\n    lec stats --recent 10"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Read",
        about = "Export items as JSON, Markdown, or text",
        after_help = "EXAMPLES:\n    # All units of a topic as Markdown\n    lec export units --parent <topic-id> --format markdown\n\n    # One subject to a file\n    lec export subject --id <id> --output subject.json"
    )]
    Export(cmd::export::ExportArgs),

    #[command(next_help_heading = "Collaborate", about = "Add or list comments")]
    Comment(cmd::comment::CommentArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Edit a unit's speech texts",
        long_about = "Add, change, remove, or reorder a unit's speech texts. Positions start at 1.",
        after_help = "EXAMPLES:\n    lec speech add <unit-id> \"Welcome back\"\n    lec speech set <unit-id> 2 \"Reworded paragraph\"\n    lec speech move <unit-id> 3 1\n    lec speech remove <unit-id> 2"
    )]
    Speech(cmd::speech::SpeechArgs),

    #[command(next_help_heading = "Collaborate", about = "Manage users")]
    User(cmd::user::UserArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    lec completions bash > ~/.local/share/bash-completion/completions/lec"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

impl Cli {
    fn actor<'a>(&'a self, user_cfg: &'a config::UserConfig) -> Actor<'a> {
        Actor {
            flag: self.as_user.as_deref(),
            config_user: user_cfg.user.as_deref(),
        }
    }
}

fn default_filter(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose || env::var("DEBUG").is_ok() {
        "lectern=debug,lec=debug,info"
    } else {
        "lectern=info,lec=info,warn"
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("LECTERN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, quiet)));

    let format = env::var("LECTERN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Parse arguments, reporting bad level/status/role/format values with their
/// error code.
fn parse_cli() -> Cli {
    Cli::try_parse().unwrap_or_else(|err| {
        let Some(enum_err) = std::error::Error::source(&err)
            .and_then(|source| source.downcast_ref::<ParseEnumError>())
            .cloned()
        else {
            err.exit()
        };
        let json = env::args().any(|arg| arg == "--json");
        let mode = OutputMode::from_name(&config::resolve_output(json, None));
        let error = CliError::coded(enum_err.code(), enum_err.to_string());
        if output::render_error(mode, &error).is_err() {
            err.exit()
        }
        std::process::exit(2)
    })
}

fn run(cli: &Cli, actor: Actor<'_>, output: OutputMode) -> anyhow::Result<()> {
    let project_root = env::current_dir()?;

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, output, &project_root),
        Commands::Create(args) => cmd::create::run_create(args, output, &project_root),
        Commands::Update(args) => cmd::update::run_update(args, output, &project_root),
        Commands::Status(args) => cmd::status::run_status(args, output, &project_root),
        Commands::Delete(args) => cmd::delete::run_delete(args, output, &project_root),
        Commands::Show(args) => cmd::show::run_show(args, output, &project_root),
        Commands::List(args) => cmd::list::run_list(args, output, &project_root),
        Commands::Board(args) => cmd::board::run_board(args, output, &project_root),
        Commands::Stats(args) => cmd::stats::run_stats(args, output, &project_root),
        Commands::Export(args) => cmd::export::run_export(args, output, &project_root),
        Commands::Comment(args) => cmd::comment::run_comment(args, actor, output, &project_root),
        Commands::Speech(args) => cmd::speech::run_speech(args, output, &project_root),
        Commands::User(args) => cmd::user::run_user(args, actor, output, &project_root),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = parse_cli();
    init_tracing(cli.verbose, cli.quiet);

    let user_cfg = config::load_user_config().unwrap_or_else(|err| {
        tracing::warn!(error = %format!("{err:#}"), "ignoring unreadable user config");
        config::UserConfig::default()
    });
    let output = OutputMode::from_name(&config::resolve_output(
        cli.json,
        user_cfg.output.as_deref(),
    ));

    let result = run(&cli, cli.actor(&user_cfg), output);
    if let Err(err) = &result {
        output::report_unexpected(output, err);
    }
    result
}
