//! Config, role and sign-in subcommands.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use bounty_core::model::Role;

use crate::api::ApiClient;
use crate::config::ClientConfig;

/// Config subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the saved configuration.
    Show,
    /// Save the server URL.
    SetServer { url: String },
    /// Act as this worker when accepting bounties.
    SetWorker { id: String },
    /// Forget the worker override.
    ClearWorker,
    /// Forget the saved role so the server default applies again.
    ClearRole,
}

/// Execute a config subcommand.
pub fn run(action: ConfigAction, config: &mut ClientConfig) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match action {
        ConfigAction::Show => {
            writeln!(out, "Server: {}", config.server_url())?;
            match config.role {
                Some(role) => writeln!(out, "Role: {role}")?,
                None => writeln!(out, "Role: (server default)")?,
            }
            match &config.current_worker_id {
                Some(id) => writeln!(out, "Worker: {id}")?,
                None => writeln!(out, "Worker: (server default)")?,
            }
            return Ok(());
        }
        ConfigAction::SetServer { url } => {
            // Validate before saving.
            ApiClient::new(&url)?;
            writeln!(out, "Server set to {url}")?;
            config.server_url = Some(url);
        }
        ConfigAction::SetWorker { id } => {
            writeln!(out, "Acting as worker {id}")?;
            config.current_worker_id = Some(id);
        }
        ConfigAction::ClearWorker => {
            config.current_worker_id = None;
            writeln!(out, "Worker override cleared")?;
        }
        ConfigAction::ClearRole => {
            config.role = None;
            writeln!(out, "Saved role cleared")?;
        }
    }
    config.save()
}

/// Switch the active role on the server and remember it locally.
pub async fn role(api: &ApiClient, config: &mut ClientConfig, role: Option<Role>) -> anyhow::Result<()> {
    let mut out = io::stdout();
    let Some(role) = role else {
        let current = api.state().await?.role;
        writeln!(out, "{current}")?;
        return Ok(());
    };
    let role = api.set_role(role).await?;
    config.role = Some(role);
    config.save()?;
    writeln!(out, "Role: {role}")?;
    Ok(())
}

/// Set the role a fresh client falls back to.
pub async fn default_role(api: &ApiClient, role: Role) -> anyhow::Result<()> {
    let role = api.set_default_role(role).await?;
    let mut out = io::stdout();
    writeln!(out, "Default role: {role}")?;
    Ok(())
}

/// Record a sign-in so the person shows up in the trusted-worker directory.
pub async fn sign_in(api: &ApiClient, name: &str, email: &str) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match api.sign_in(name, email).await? {
        Some(person) => writeln!(out, "Signed in {} <{}>", person.name, person.email)?,
        None => writeln!(out, "Sign-in ignored: no usable email")?,
    }
    Ok(())
}
