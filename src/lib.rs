//! WhatsAI workflow provisioning
//!
//! Connects onboarded companies to the n8n automation service that runs
//! their WhatsApp assistant:
//! - `config` resolves the n8n endpoint and credentials
//! - `n8n` wraps the n8n REST API, template lookup and provisioning
//! - `company` holds onboarding helpers (slugs, phone numbers)

pub mod company;
pub mod config;
pub mod n8n;

pub use config::{N8nAuth, N8nConfig};
pub use n8n::{
    BusinessCategory, CompanyChanges, CompanyProfile, CompanyWorkflow, N8nClient, N8nError,
    StepOutcome, Workflow, WorkflowApi, WorkflowRecord,
};
