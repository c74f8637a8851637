//! Argument parsing and command dispatch for `marquee-admin`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use marquee_api_models::{BookingStatus, Event, Service};
use marquee_client::{Review, StatusFilter};
use marquee_telemetry::{LogFormat, LoggingConfig, init_logging};
use url::Url;

use crate::client::{AppContext, CliResult, ConnectionArgs, parse_assignment, parse_url};
use crate::commands::auth::{handle_has_admin, handle_login, handle_logout, handle_register};
use crate::commands::entities::{handle_entity_get, handle_entity_update};
use crate::commands::marquees::{
    handle_marquee_delete, handle_marquee_get, handle_marquee_list, handle_marquee_review,
    handle_marquee_update,
};

const DEFAULT_CLI_LOG_LEVEL: &str = "warn";

/// Parses CLI arguments, executes the requested command, and reports the
/// outcome. Returns the process exit code.
pub async fn run() -> i32 {
    run_with(Cli::parse()).await
}

pub(crate) async fn run_with(cli: Cli) -> i32 {
    let format = LogFormat::from_setting(cli.log_format.as_deref());
    if let Err(err) = init_logging(&LoggingConfig {
        level: &cli.log_level,
        format,
    }) {
        eprintln!("warning: {err:#}");
    }

    match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let ctx = AppContext::connect(&cli.connection())?;
    let output = cli.output;

    match cli.command {
        Command::Login(args) => handle_login(&ctx, args).await,
        Command::Register(args) => handle_register(&ctx, args).await,
        Command::Logout => handle_logout(&ctx),
        Command::HasAdmin => handle_has_admin(&ctx, output).await,
        Command::Marquees(command) => match command {
            MarqueeCommand::Ls(args) => handle_marquee_list(&ctx, args, output).await,
            MarqueeCommand::Get(args) => handle_marquee_get(&ctx, args, output).await,
            MarqueeCommand::Update(args) => handle_marquee_update(&ctx, args, output).await,
            MarqueeCommand::Delete(args) => handle_marquee_delete(&ctx, args).await,
            MarqueeCommand::Approve(args) => {
                handle_marquee_review(&ctx, args, Review::Approve).await
            }
            MarqueeCommand::Reject(args) => {
                handle_marquee_review(&ctx, args, Review::Reject).await
            }
        },
        Command::Events(command) => match command {
            EntityCommand::Get(args) => handle_entity_get::<Event>(&ctx, args, output).await,
            EntityCommand::Update(args) => {
                handle_entity_update::<Event>(&ctx, args, output).await
            }
        },
        Command::Services(command) => match command {
            EntityCommand::Get(args) => handle_entity_get::<Service>(&ctx, args, output).await,
            EntityCommand::Update(args) => {
                handle_entity_update::<Service>(&ctx, args, output).await
            }
        },
    }
}

#[derive(Parser)]
#[command(
    name = "marquee-admin",
    about = "Administrative CLI for the marquee booking platform"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        value_parser = parse_url,
        help = "Backend root; overrides MARQUEE_API_URL"
    )]
    pub(crate) api_url: Option<Url>,
    #[arg(
        long,
        global = true,
        help = "Request timeout in seconds; overrides MARQUEE_HTTP_TIMEOUT_SECS"
    )]
    pub(crate) timeout: Option<u64>,
    #[arg(
        long,
        global = true,
        help = "Where the login token is kept between invocations; overrides MARQUEE_SESSION_FILE"
    )]
    pub(crate) session_file: Option<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(long, global = true, env = "MARQUEE_LOG_FORMAT")]
    pub(crate) log_format: Option<String>,
    #[arg(long, global = true, env = "MARQUEE_LOG", default_value = DEFAULT_CLI_LOG_LEVEL)]
    pub(crate) log_level: String,
    #[command(subcommand)]
    pub(crate) command: Command,
}

impl Cli {
    pub(crate) fn connection(&self) -> ConnectionArgs {
        ConnectionArgs {
            api_url: self.api_url.clone(),
            timeout_secs: self.timeout,
            session_file: self.session_file.clone(),
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Sign in as an administrator.
    Login(LoginArgs),
    /// Create a user account.
    Register(RegisterArgs),
    /// Forget the stored session.
    Logout,
    /// Report whether an administrator account exists.
    HasAdmin,
    /// List, edit, review and delete marquees.
    #[command(subcommand)]
    Marquees(MarqueeCommand),
    /// Inspect and edit events.
    #[command(subcommand)]
    Events(EntityCommand),
    /// Inspect and edit services.
    #[command(subcommand)]
    Services(EntityCommand),
}

#[derive(Subcommand)]
pub(crate) enum MarqueeCommand {
    Ls(MarqueeListArgs),
    Get(IdArgs),
    /// Change fields of a marquee; omitted flags keep their current value.
    Update(MarqueeUpdateArgs),
    Delete(IdArgs),
    /// Mark a marquee active.
    Approve(IdArgs),
    /// Mark a marquee rejected.
    Reject(IdArgs),
}

#[derive(Subcommand)]
pub(crate) enum EntityCommand {
    Get(IdArgs),
    Update(EntityUpdateArgs),
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, env = "MARQUEE_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct RegisterArgs {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, env = "MARQUEE_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
    #[arg(long, help = "Register the account as an administrator")]
    pub(crate) admin: bool,
}

#[derive(Args)]
pub(crate) struct IdArgs {
    pub(crate) id: String,
}

#[derive(Args)]
pub(crate) struct MarqueeListArgs {
    #[arg(
        long,
        default_value_t = StatusFilter::All,
        help = "all, pending, booked, active, completed, rejected or inactive"
    )]
    pub(crate) status: StatusFilter,
}

#[derive(Args, Default)]
pub(crate) struct MarqueeUpdateArgs {
    pub(crate) id: String,
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long)]
    pub(crate) description: Option<String>,
    #[arg(long)]
    pub(crate) address: Option<String>,
    #[arg(long)]
    pub(crate) city: Option<String>,
    #[arg(long)]
    pub(crate) state: Option<String>,
    #[arg(long)]
    pub(crate) country: Option<String>,
    #[arg(long)]
    pub(crate) capacity: Option<String>,
    #[arg(long)]
    pub(crate) per_hour: Option<String>,
    #[arg(long)]
    pub(crate) per_day: Option<String>,
    #[arg(long)]
    pub(crate) status: Option<BookingStatus>,
}

#[derive(Args)]
pub(crate) struct EntityUpdateArgs {
    pub(crate) id: String,
    #[arg(long = "set", value_parser = parse_assignment, help = "field=value; repeatable")]
    pub(crate) assignments: Vec<(String, String)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}
