//! n8n integration
//!
//! This module provides:
//! - Wire types for workflows and credentials
//! - Client for the n8n public REST API (`/api/v1`)
//! - Template lookup by business category
//! - Provisioning of company workflows (shared templates, clones, variable sync)
//! - The local mirror record kept per company

pub mod client;
pub mod error;
pub mod provisioning;
pub mod record;
pub mod templates;
pub mod types;

pub use client::{N8nClient, WorkflowApi};
pub use error::{N8nError, Result};
pub use provisioning::{
    clone_workflow_by_name, clone_workflow_template, create_company_workflow,
    extract_webhook_url, retire_company_workflow, sync_company_variables,
    update_company_workflow, CompanyChanges, CompanyProfile, CompanyWorkflow, StepOutcome,
};
pub use record::WorkflowRecord;
pub use templates::{find_workflow_by_name, normalize, BusinessCategory, TemplateProfile};
pub use types::*;
