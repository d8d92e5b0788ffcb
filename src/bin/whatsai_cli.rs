//! WhatsAI workflow CLI
//!
//! Inspect and provision n8n workflows from the command line.
//!
//! # Usage
//!
//! ```bash
//! # List remote workflows
//! whatsai_cli list
//!
//! # Attach a company to its category workflow
//! whatsai_cli provision --name "Pizzaria do João" --category RESTAURANT --phone 11987654321
//!
//! # Push variables to a workflow
//! whatsai_cli update wf123 saudacao="Olá!" horario="18h às 23h"
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use whatsai_workflows::n8n::{
    clone_workflow_by_name, create_company_workflow, find_workflow_by_name,
    retire_company_workflow, update_company_workflow, Variables,
};
use whatsai_workflows::{BusinessCategory, CompanyProfile, N8nClient, N8nConfig, WorkflowApi};

#[derive(Parser)]
#[command(name = "whatsai_cli")]
#[command(version = "0.1.0")]
#[command(about = "Inspect and provision WhatsAI n8n workflows")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// n8n base URL
    #[arg(long, global = true, env = "N8N_API_BASE_URL")]
    base_url: Option<String>,

    /// n8n API key (preferred over basic auth)
    #[arg(long, global = true, env = "N8N_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, global = true, env = "N8N_USERNAME")]
    username: Option<String>,

    #[arg(long, global = true, env = "N8N_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "N8N_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// List all workflows
    List,

    /// Find a workflow by fuzzy name
    Find { name: String },

    /// Show the category to template table
    Templates,

    /// Attach a company to the shared workflow of its category
    Provision {
        #[command(flatten)]
        company: CompanyArgs,
    },

    /// Clone a template into a company-owned workflow
    Clone {
        /// Template workflow name
        #[arg(long)]
        template: String,

        #[command(flatten)]
        company: CompanyArgs,
    },

    /// Merge KEY=VALUE pairs into a workflow's variables
    Update {
        id: String,

        #[arg(required = true)]
        vars: Vec<String>,
    },

    Activate { id: String },

    Deactivate { id: String },

    /// Delete a workflow (best-effort)
    Delete { id: String },

    /// List stored credentials
    Credentials,
}

#[derive(clap::Args)]
struct CompanyArgs {
    #[arg(long)]
    name: String,

    /// RESTAURANT, MEDICAL, BEAUTY, LEGAL, RETAIL or OTHER
    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    greeting: Option<String>,

    #[arg(long)]
    hours: Option<String>,
}

impl CompanyArgs {
    fn profile(&self) -> CompanyProfile {
        CompanyProfile {
            name: self.name.clone(),
            business_type: self.category.as_deref().map(BusinessCategory::from_code),
            phone_number: self.phone.clone(),
            greeting: self.greeting.clone(),
            business_hours: self.hours.clone(),
        }
    }
}

impl Cli {
    fn config(&self) -> N8nConfig {
        let mut config = N8nConfig::from_env().with_timeout(Duration::from_secs(self.timeout));
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if self.api_key.is_some() {
            config.api_key = self.api_key.clone();
        }
        if self.username.is_some() {
            config.username = self.username.clone();
        }
        if self.password.is_some() {
            config.password = self.password.clone();
        }
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("whatsai_workflows=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = N8nClient::new(cli.config()).context("Failed to create n8n client")?;

    match cli.command {
        Commands::List => {
            let workflows = client.list_workflows().await.context("Failed to list workflows")?;
            let summary: Vec<Value> = workflows
                .iter()
                .map(|w| json!({"id": w.id, "name": w.name, "active": w.active, "nodes": w.nodes.len()}))
                .collect();
            print_json(&summary)
        }
        Commands::Find { name } => match find_workflow_by_name(&client, &name).await {
            Some(workflow) => print_json(&workflow),
            None => Err(anyhow!("no workflow matches '{}'", name)),
        },
        Commands::Templates => {
            let table: Vec<Value> = BusinessCategory::ALL
                .iter()
                .map(|c| {
                    let profile = c.profile();
                    json!({
                        "category": c.code(),
                        "label": c.label(),
                        "template": c.template_name(),
                        "description": profile.description,
                        "defaults": profile.default_variables,
                    })
                })
                .collect();
            print_json(&table)
        }
        Commands::Provision { company } => {
            let provisioned = create_company_workflow(&client, &company.profile())
                .await
                .context("Failed to provision company workflow")?;
            print_json(&provisioned)
        }
        Commands::Clone { template, company } => {
            let created = clone_workflow_by_name(&client, &template, &company.profile())
                .await
                .context("Failed to clone template")?;
            print_json(&json!({"id": created.id, "name": created.name}))
        }
        Commands::Update { id, vars } => {
            let variables = parse_vars(&vars)?;
            let updated = update_company_workflow(&client, &id, variables)
                .await
                .with_context(|| format!("Failed to update workflow {}", id))?;
            print_json(&Value::Object(updated.variables()))
        }
        Commands::Activate { id } => {
            client
                .activate_workflow(&id)
                .await
                .with_context(|| format!("Failed to activate workflow {}", id))?;
            print_json(&json!({"id": id, "active": true}))
        }
        Commands::Deactivate { id } => {
            client
                .deactivate_workflow(&id)
                .await
                .with_context(|| format!("Failed to deactivate workflow {}", id))?;
            print_json(&json!({"id": id, "active": false}))
        }
        Commands::Delete { id } => print_json(&retire_company_workflow(&client, &id).await),
        Commands::Credentials => {
            let credentials = client
                .list_credentials()
                .await
                .context("Failed to list credentials")?;
            let summary: Vec<Value> = credentials
                .iter()
                .map(|c| json!({"id": c.id, "name": c.name, "type": c.credential_type}))
                .collect();
            print_json(&summary)
        }
    }
}

/// `KEY=VALUE` pairs; values that parse as JSON keep their type
fn parse_vars(pairs: &[String]) -> Result<Variables> {
    pairs
        .iter()
        .map(|pair| {
            let (key, raw) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{}'", pair))?;
            let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
            Ok((key.trim().to_string(), value))
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
