//! Property, trusted-worker and task-template subcommands.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use anyhow::{anyhow, bail};
use clap::Subcommand;

use bounty_core::directory::{drafts_from_text, merge_directory, to_person};
use bounty_core::model::{
    CreatePropertyInput, CreateTaskTemplateInput, GeoPoint, PersonBasicInfo, Property, Snapshot,
    UpdatePropertyInput,
};

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::store::{Action, ClientStore};

/// Property subcommand actions.
#[derive(Subcommand, Debug)]
pub enum PropertyAction {
    /// Add a property
    Add {
        #[arg(short, long)]
        address: String,
        /// City (defaults to the configured default city)
        #[arg(short, long)]
        city: Option<String>,
        #[arg(short, long)]
        zip: String,
        /// Gate code; blank means "No gate"
        #[arg(short, long, default_value = "")]
        gate: String,
        #[arg(short, long, default_value = "")]
        instructions: String,
        #[arg(long, requires = "lng")]
        lat: Option<f64>,
        #[arg(long, requires = "lat")]
        lng: Option<f64>,
    },
    /// Change address fields; omitted fields keep their value
    Update {
        id: String,
        #[arg(short, long)]
        address: Option<String>,
        #[arg(short, long)]
        city: Option<String>,
        #[arg(short, long)]
        zip: Option<String>,
        #[arg(short, long)]
        gate: Option<String>,
    },
    /// Replace access instructions
    Instructions { id: String, text: String },
    /// Trust workers at a property; accepts pasted text with emails
    Trust {
        id: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
}

/// Global trusted-worker subcommand actions.
#[derive(Subcommand, Debug)]
pub enum TrustedAction {
    /// List the global trusted workers
    List,
    /// Add global trusted workers from pasted text with emails
    Add {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Remove a global trusted worker by ID
    Remove { id: String },
}

/// Task template subcommand actions.
#[derive(Subcommand, Debug)]
pub enum TemplateAction {
    /// List task templates
    List,
    /// Add a task template
    Add {
        #[arg(short, long)]
        label: String,
        #[arg(short, long)]
        title: String,
        #[arg(long)]
        price: i64,
        #[arg(short, long, default_value = "")]
        description: String,
    },
}

/// Everyone the directory knows: workers, then sign-ins, then global entries.
pub fn directory(snapshot: &Snapshot) -> Vec<PersonBasicInfo> {
    let workers: Vec<PersonBasicInfo> = snapshot
        .workers
        .iter()
        .map(|w| to_person(&w.id, &w.name, &w.email, Some(w.initials.as_str())))
        .collect();
    merge_directory([
        workers.as_slice(),
        snapshot.signed_in_users.as_slice(),
        snapshot.global_trusted_workers.as_slice(),
    ])
}

/// Emails already trusted at one property.
fn trusted_emails(snapshot: &Snapshot, property: &Property) -> Vec<String> {
    property
        .whitelisted_workers
        .iter()
        .filter_map(|r| snapshot.worker(&r.id))
        .map(|w| w.email.clone())
        .collect()
}

fn write_property(out: &mut impl Write, verb: &str, property: &Property) -> io::Result<()> {
    writeln!(
        out,
        "{verb}: {}  {}, {} {}  gate: {}",
        property.id, property.address, property.city, property.zip_code, property.gate_code
    )?;
    if !property.instructions.is_empty() {
        writeln!(out, "  instructions: {}", property.instructions)?;
    }
    for worker in &property.whitelisted_workers {
        writeln!(out, "  trusted: {} ({}) {}", worker.name, worker.initials, worker.id)?;
    }
    Ok(())
}

fn loaded(store: &ClientStore) -> anyhow::Result<&Snapshot> {
    store
        .snapshot()
        .ok_or_else(|| anyhow!("State not loaded"))
}

/// Execute a property subcommand.
pub async fn run_property(
    api: &ApiClient,
    config: &ClientConfig,
    action: PropertyAction,
) -> anyhow::Result<()> {
    let mut store = ClientStore::load(api, config.role).await?;
    let mut out = io::stdout();

    match action {
        PropertyAction::Add {
            address,
            city,
            zip,
            gate,
            instructions,
            lat,
            lng,
        } => {
            let city = city.unwrap_or_else(|| {
                store
                    .snapshot()
                    .map(|s| s.ui.default_city.clone())
                    .unwrap_or_default()
            });
            let location = lat.zip(lng).map(|(lat, lng)| GeoPoint { lat, lng });
            let property = api
                .add_property(&CreatePropertyInput {
                    address,
                    city,
                    zip_code: zip,
                    gate_code: gate,
                    instructions,
                    location,
                })
                .await?;
            write_property(&mut out, "Added", &property)?;
            store.dispatch(Action::AddProperty(property));
        }
        PropertyAction::Update {
            id,
            address,
            city,
            zip,
            gate,
        } => {
            let current = loaded(&store)?
                .property(&id)
                .ok_or_else(|| anyhow!("Unknown property {id}"))?;
            let input = UpdatePropertyInput {
                address: address.unwrap_or_else(|| current.address.clone()),
                city: city.unwrap_or_else(|| current.city.clone()),
                zip_code: zip.unwrap_or_else(|| current.zip_code.clone()),
                gate_code: gate.unwrap_or_else(|| current.gate_code.clone()),
            };
            let property = api.update_property(&id, &input).await?;
            write_property(&mut out, "Updated", &property)?;
            store.dispatch(Action::UpsertProperty(property));
        }
        PropertyAction::Instructions { id, text } => {
            let property = api.update_instructions(&id, &text).await?;
            write_property(&mut out, "Updated", &property)?;
            store.dispatch(Action::UpsertProperty(property));
        }
        PropertyAction::Trust { id, text } => {
            let snapshot = loaded(&store)?;
            let property = snapshot
                .property(&id)
                .ok_or_else(|| anyhow!("Unknown property {id}"))?;
            let drafts = drafts_from_text(
                &text.join(" "),
                &directory(snapshot),
                &trusted_emails(snapshot, property),
            );
            if drafts.is_empty() {
                bail!("No new email addresses found");
            }
            let property = api.add_trusted_workers(&id, &drafts).await?;
            write_property(&mut out, "Trusted", &property)?;
            store.dispatch(Action::UpsertProperty(property));
        }
    }
    Ok(())
}

/// Execute a global trusted-worker subcommand.
pub async fn run_trusted(
    api: &ApiClient,
    config: &ClientConfig,
    action: TrustedAction,
) -> anyhow::Result<()> {
    let mut store = ClientStore::load(api, config.role).await?;
    let mut out = io::stdout();

    let list = match action {
        TrustedAction::List => loaded(&store)?.global_trusted_workers.clone(),
        TrustedAction::Add { text } => {
            let snapshot = loaded(&store)?;
            let existing: Vec<String> = snapshot
                .global_trusted_workers
                .iter()
                .map(|p| p.email.clone())
                .collect();
            let drafts = drafts_from_text(&text.join(" "), &directory(snapshot), &existing);
            if drafts.is_empty() {
                bail!("No new email addresses found");
            }
            api.add_global_trusted_workers(&drafts).await?
        }
        TrustedAction::Remove { id } => api.remove_global_trusted_worker(&id).await?,
    };

    if list.is_empty() {
        writeln!(out, "No global trusted workers")?;
    }
    for person in &list {
        writeln!(out, "{}  {} <{}> ({})", person.id, person.name, person.email, person.initials)?;
    }
    store.dispatch(Action::SetGlobalTrustedWorkers(list));
    Ok(())
}

/// Execute a task template subcommand.
pub async fn run_template(
    api: &ApiClient,
    config: &ClientConfig,
    action: TemplateAction,
) -> anyhow::Result<()> {
    let mut store = ClientStore::load(api, config.role).await?;
    let mut out = io::stdout();

    match action {
        TemplateAction::List => {
            for t in &loaded(&store)?.task_templates {
                writeln!(out, "{}  {}: {} ${}", t.id, t.label, t.title, t.price)?;
            }
        }
        TemplateAction::Add {
            label,
            title,
            price,
            description,
        } => {
            let template = api
                .add_task_template(&CreateTaskTemplateInput {
                    label,
                    title,
                    description,
                    price,
                })
                .await?;
            writeln!(out, "Added template {}: {}", template.id, template.label)?;
            store.dispatch(Action::AddTaskTemplate(template));
        }
    }
    Ok(())
}
