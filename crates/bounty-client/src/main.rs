//! Bounty CLI
//!
//! Command-line dashboard for the property-task marketplace server.

use clap::{Parser, Subcommand};
use tracing::debug;

use bounty_client::api::ApiClient;
use bounty_client::bounty_cmd::{self, BountyAction};
use bounty_client::config::ClientConfig;
use bounty_client::config_cmd::{self, ConfigAction};
use bounty_client::property_cmd::{self, PropertyAction, TemplateAction, TrustedAction};
use bounty_core::model::Role;
use bounty_core::tracing_init::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "bounty")]
#[command(version, about = "Property task marketplace CLI", long_about = None)]
struct Cli {
    /// Server URL (overrides the saved config)
    #[arg(long, env = "BOUNTY_SERVER_URL")]
    server: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the full state document
    State,
    /// Print the owner board
    Board,
    /// Live board with running no-show timers
    Watch,
    #[command(flatten)]
    Bounty(BountyAction),
    /// Manage properties
    Property {
        #[command(subcommand)]
        action: PropertyAction,
    },
    /// Manage the global trusted-worker list
    Trusted {
        #[command(subcommand)]
        action: TrustedAction,
    },
    /// Manage task templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
    /// Show or switch the active role
    Role { role: Option<Role> },
    /// Set the role new sessions start in
    DefaultRole { role: Role },
    /// Record a sign-in for the trusted-worker directory
    SignIn {
        #[arg(short, long, default_value = "")]
        name: String,
        #[arg(short, long)]
        email: String,
    },
    /// Manage local configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing("bounty_client=warn", cli.log_json);

    let mut config = ClientConfig::load();
    let command = match cli.command {
        Command::Config { action } => return config_cmd::run(action, &mut config),
        command => command,
    };

    let server = cli.server.as_deref().unwrap_or_else(|| config.server_url());
    let api = ApiClient::new(server)?;
    debug!(server = %api.base_url(), "Using server");

    match command {
        Command::State => bounty_cmd::state(&api, &config).await,
        Command::Board => bounty_cmd::board(&api, &config).await,
        Command::Watch => bounty_cmd::watch(&api, &config).await,
        Command::Bounty(action) => bounty_cmd::run(&api, &config, action).await,
        Command::Property { action } => property_cmd::run_property(&api, &config, action).await,
        Command::Trusted { action } => property_cmd::run_trusted(&api, &config, action).await,
        Command::Template { action } => property_cmd::run_template(&api, &config, action).await,
        Command::Role { role } => config_cmd::role(&api, &mut config, role).await,
        Command::DefaultRole { role } => config_cmd::default_role(&api, role).await,
        Command::SignIn { name, email } => config_cmd::sign_in(&api, &name, &email).await,
        Command::Config { .. } => Ok(()),
    }
}
