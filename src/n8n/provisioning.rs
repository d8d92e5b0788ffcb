//! Company workflow provisioning
//!
//! Companies of the same category share one n8n workflow, parameterised by
//! `settings.variables`. Provisioning finds that workflow, makes sure it is
//! active and pushes the company's variables. Cloning a private copy of a
//! template is also supported.
//!
//! Secondary steps (activation, variable sync, remote deletion) are
//! best-effort: their failures are logged and reported as
//! [`StepOutcome::Failed`] instead of failing the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::client::WorkflowApi;
use super::error::{N8nError, Result};
use super::templates::{find_workflow_by_name, BusinessCategory};
use super::types::{NewWorkflow, Variables, Workflow};

pub const VAR_COMPANY: &str = "empresa";
pub const VAR_PHONE: &str = "whatsapp";
pub const VAR_BUSINESS_HOURS: &str = "horario";
pub const VAR_GREETING: &str = "saudacao";
pub const VAR_BUSINESS_TYPE: &str = "tipo_negocio";

const WEBHOOK_NODE_TYPE: &str = "n8n-nodes-base.webhook";

/// Company data injected into workflow variables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub name: String,
    #[serde(default)]
    pub business_type: Option<BusinessCategory>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub greeting: Option<String>,
    #[serde(default)]
    pub business_hours: Option<String>,
}

impl CompanyProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: BusinessCategory) -> Self {
        self.business_type = Some(category);
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }

    pub fn with_business_hours(mut self, hours: impl Into<String>) -> Self {
        self.business_hours = Some(hours.into());
        self
    }

    /// Category used for template selection; unset means `Other`
    pub fn category(&self) -> BusinessCategory {
        self.business_type.unwrap_or_default()
    }

    /// Workflow variables for this company. Absent or empty fields are left out.
    pub fn variables(&self) -> Variables {
        let mut vars = Variables::new();
        insert_text(&mut vars, VAR_COMPANY, Some(self.name.as_str()));
        insert_text(&mut vars, VAR_PHONE, self.phone_number.as_deref());
        insert_text(&mut vars, VAR_BUSINESS_HOURS, self.business_hours.as_deref());
        insert_text(&mut vars, VAR_GREETING, self.greeting.as_deref());
        insert_text(&mut vars, VAR_BUSINESS_TYPE, self.business_type.map(|c| c.code()));
        vars
    }
}

/// Edited company fields; only the ones present are pushed to n8n
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub business_type: Option<BusinessCategory>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub greeting: Option<String>,
    #[serde(default)]
    pub business_hours: Option<String>,
}

impl CompanyChanges {
    pub fn variables(&self) -> Variables {
        let mut vars = Variables::new();
        insert_text(&mut vars, VAR_COMPANY, self.name.as_deref());
        insert_text(&mut vars, VAR_PHONE, self.phone_number.as_deref());
        insert_text(&mut vars, VAR_BUSINESS_HOURS, self.business_hours.as_deref());
        insert_text(&mut vars, VAR_GREETING, self.greeting.as_deref());
        insert_text(&mut vars, VAR_BUSINESS_TYPE, self.business_type.map(|c| c.code()));
        vars
    }

    pub fn is_empty(&self) -> bool {
        self.variables().is_empty()
    }
}

fn insert_text(vars: &mut Variables, key: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        vars.insert(key.to_string(), Value::String(value.to_string()));
    }
}

/// Result of a best-effort step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Completed,
    /// Nothing to do
    Skipped,
    /// Failed and ignored
    Failed { reason: String },
}

impl StepOutcome {
    fn observe<T>(step: &str, workflow_id: &str, result: Result<T>) -> Self {
        match result {
            Ok(_) => Self::Completed,
            Err(e) => {
                warn!(step, workflow_id, error = %e, "Best-effort n8n step failed, continuing");
                Self::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Workflow attached to a company after provisioning
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyWorkflow {
    pub workflow_id: String,
    pub workflow_name: String,
    pub is_active: bool,
    pub webhook_url: Option<String>,
    /// Always true for provisioning through a shared category workflow
    pub is_shared: bool,
    pub activation: StepOutcome,
}

/// Create a private copy of `template_id` named `Atendimento - {company}`.
///
/// Template variables are kept; company variables win on collision.
pub async fn clone_workflow_template(
    api: &dyn WorkflowApi,
    template_id: &str,
    company: &CompanyProfile,
) -> Result<Workflow> {
    let template = api.get_workflow(template_id).await?;
    info!(template_id, template = %template.name, company = %company.name, "Cloning workflow template");

    let mut variables = template.variables();
    variables.extend(company.variables());

    let mut payload = NewWorkflow::from_workflow(&template).with_variables(variables);
    payload.name = format!("Atendimento - {}", company.name);

    api.create_workflow(&payload).await
}

/// Clone the template found by fuzzy name lookup
pub async fn clone_workflow_by_name(
    api: &dyn WorkflowApi,
    template_name: &str,
    company: &CompanyProfile,
) -> Result<Workflow> {
    let template = find_workflow_by_name(api, template_name)
        .await
        .ok_or_else(|| N8nError::TemplateNotFound {
            name: template_name.to_string(),
        })?;

    clone_workflow_template(api, &template.id, company).await
}

/// Attach a company to the shared workflow of its category.
///
/// Fails only when no workflow matches the category template name.
/// Activation is best-effort. The shared workflow's variables are left
/// untouched since other companies run on it too.
pub async fn create_company_workflow(
    api: &dyn WorkflowApi,
    company: &CompanyProfile,
) -> Result<CompanyWorkflow> {
    let template_name = company.category().template_name();
    info!(company = %company.name, template_name, "Setting up company workflow");

    let workflow = find_workflow_by_name(api, template_name)
        .await
        .ok_or_else(|| N8nError::TemplateNotFound {
            name: template_name.to_string(),
        })?;
    info!(id = %workflow.id, name = %workflow.name, active = workflow.active, "Found shared workflow");

    let activation = if workflow.active {
        StepOutcome::Skipped
    } else {
        StepOutcome::observe(
            "activate",
            &workflow.id,
            api.activate_workflow(&workflow.id).await,
        )
    };

    Ok(CompanyWorkflow {
        is_active: workflow.active || activation.is_completed(),
        webhook_url: extract_webhook_url(&workflow.nodes),
        workflow_id: workflow.id,
        workflow_name: workflow.name,
        is_shared: true,
        activation,
    })
}

/// Merge `variables` over the workflow's current variables and save.
///
/// New values win on key collision. No concurrency check: last write wins.
pub async fn update_company_workflow(
    api: &dyn WorkflowApi,
    workflow_id: &str,
    variables: Variables,
) -> Result<Workflow> {
    let mut workflow = api.get_workflow(workflow_id).await?;

    let mut merged = workflow.variables();
    merged.extend(variables);
    workflow.set_variables(merged);

    api.update_workflow(workflow_id, &workflow).await
}

/// Push edited company fields to its workflow, best-effort
pub async fn sync_company_variables(
    api: &dyn WorkflowApi,
    workflow_id: &str,
    changes: &CompanyChanges,
) -> StepOutcome {
    sync_variables(api, workflow_id, changes.variables()).await
}

async fn sync_variables(api: &dyn WorkflowApi, workflow_id: &str, variables: Variables) -> StepOutcome {
    if variables.is_empty() {
        return StepOutcome::Skipped;
    }
    StepOutcome::observe(
        "sync_variables",
        workflow_id,
        update_company_workflow(api, workflow_id, variables).await,
    )
}

/// Delete a company's remote workflow, best-effort.
///
/// The caller removes its local record whatever the outcome.
pub async fn retire_company_workflow(api: &dyn WorkflowApi, workflow_id: &str) -> StepOutcome {
    info!(workflow_id, "Deleting company workflow");
    StepOutcome::observe("delete", workflow_id, api.delete_workflow(workflow_id).await)
}

/// URL of the first webhook node, if any.
///
/// Read from `webhookUrl`, then `parameters.path`, then `parameters.webhookUrl`.
pub fn extract_webhook_url(nodes: &[Value]) -> Option<String> {
    let node = nodes.iter().find(|node| {
        node.get("type")
            .and_then(Value::as_str)
            .is_some_and(|t| t == WEBHOOK_NODE_TYPE || t.contains("webhook"))
    })?;

    let parameters = node.get("parameters");
    [
        node.get("webhookUrl"),
        parameters.and_then(|p| p.get("path")),
        parameters.and_then(|p| p.get("webhookUrl")),
    ]
    .into_iter()
    .flatten()
    .filter_map(Value::as_str)
    .find(|url| !url.is_empty())
    .map(str::to_string)
}
