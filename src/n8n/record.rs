//! Local mirror of a company's n8n workflow
//!
//! n8n owns the workflow; the application database keeps this record per
//! company so pages can show status without calling n8n.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::provisioning::CompanyWorkflow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub n8n_id: String,
    pub name: String,
    pub is_active: bool,
    pub webhook_url: Option<String>,
    /// Serialized provisioning result
    pub config: Value,
    pub last_sync: Option<DateTime<Utc>>,
}

impl WorkflowRecord {
    pub fn from_provisioned(company_id: Uuid, workflow: &CompanyWorkflow, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id,
            n8n_id: workflow.workflow_id.clone(),
            name: workflow.workflow_name.clone(),
            is_active: workflow.is_active,
            webhook_url: workflow.webhook_url.clone(),
            config: serde_json::to_value(workflow).unwrap_or(Value::Null),
            last_sync: Some(now),
        }
    }

    /// Record a successful variable push
    pub fn mark_synced(&mut self, now: DateTime<Utc>) {
        self.last_sync = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::n8n::StepOutcome;
    use chrono::TimeZone;

    #[test]
    fn test_record_from_provisioned_workflow() {
        let provisioned = CompanyWorkflow {
            workflow_id: "wf-1".into(),
            workflow_name: "Pizzaria".into(),
            is_active: true,
            webhook_url: Some("https://n8n.example.com/webhook/pizzaria".into()),
            is_shared: true,
            activation: StepOutcome::Failed {
                reason: "timeout".into(),
            },
        };
        let company_id = Uuid::new_v4();
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let mut record = WorkflowRecord::from_provisioned(company_id, &provisioned, created);
        assert_eq!(record.company_id, company_id);
        assert_eq!(record.n8n_id, "wf-1");
        assert_eq!(record.config["isShared"], serde_json::json!(true));
        assert_eq!(record.config["variableSync"]["status"], serde_json::json!("failed"));

        let later = Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap();
        record.mark_synced(later);
        assert_eq!(record.last_sync, Some(later));
    }
}
