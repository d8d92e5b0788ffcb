//! n8n API types
//!
//! Nodes and connections are opaque to us and stay as raw JSON. Fields we do
//! not model are kept in `extra` so a fetched workflow can be sent back in
//! an update without losing anything.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Variable map stored under `settings.variables`
pub type Variables = Map<String, Value>;

/// A workflow as returned by n8n
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub nodes: Vec<Value>,
    #[serde(default = "empty_object")]
    pub connections: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<WorkflowSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    #[serde(
        default,
        rename = "staticData",
        skip_serializing_if = "Option::is_none"
    )]
    pub static_data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Workflow {
    /// Current `settings.variables`, empty when unset
    pub fn variables(&self) -> Variables {
        self.settings
            .as_ref()
            .and_then(|s| s.variables.clone())
            .unwrap_or_default()
    }

    /// Replace `settings.variables`, keeping other settings untouched
    pub fn set_variables(&mut self, variables: Variables) {
        self.settings
            .get_or_insert_with(WorkflowSettings::default)
            .variables = Some(variables);
    }
}

/// `settings` block of a workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Variables>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Creation payload accepted by `POST /workflows`.
///
/// n8n rejects server-managed fields such as `active` or `id` at creation,
/// so only these fields are ever sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewWorkflow {
    pub name: String,
    pub nodes: Vec<Value>,
    pub connections: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<NewWorkflowSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Value>>,
    #[serde(rename = "staticData", skip_serializing_if = "Option::is_none")]
    pub static_data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewWorkflowSettings {
    pub variables: Variables,
}

impl NewWorkflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            connections: empty_object(),
            settings: None,
            tags: None,
            static_data: None,
        }
    }

    /// Strip a full workflow down to what creation accepts.
    ///
    /// Tags are forwarded only when they are an array, static data only
    /// when present and non-null.
    pub fn from_workflow(workflow: &Workflow) -> Self {
        let connections = if workflow.connections.is_null() {
            empty_object()
        } else {
            workflow.connections.clone()
        };

        Self {
            name: workflow.name.clone(),
            nodes: workflow.nodes.clone(),
            connections,
            settings: workflow
                .settings
                .as_ref()
                .and_then(|s| s.variables.clone())
                .map(|variables| NewWorkflowSettings { variables }),
            tags: workflow
                .tags
                .as_ref()
                .and_then(|t| t.as_array().cloned()),
            static_data: workflow.static_data.clone().filter(|v| !v.is_null()),
        }
    }

    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.settings = Some(NewWorkflowSettings { variables });
        self
    }
}

/// A stored credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub credential_type: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// Body for creating or updating a credential
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCredential {
    pub name: String,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub data: Map<String, Value>,
}

/// Body for `POST /webhooks`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WebhookRegistration<'a> {
    pub workflow_id: &'a str,
    pub webhook_name: &'a str,
    pub method: &'static str,
    pub path: String,
}

/// Coerce any list response into workflows.
///
/// n8n has answered with a bare array, `{ "data": [...] }` and
/// `{ "workflows": [...] }` depending on version. Anything else yields an
/// empty list. Entries that fail to decode are skipped.
pub fn normalize_workflow_list(value: Value) -> Vec<Workflow> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match (map.remove("data"), map.remove("workflows")) {
            (Some(Value::Array(items)), _) => items,
            (_, Some(Value::Array(items))) => items,
            _ => {
                warn!(keys = ?map.keys().collect::<Vec<_>>(), "Unexpected workflows response format");
                return Vec::new();
            }
        },
        other => {
            warn!(kind = json_kind(&other), "Unexpected workflows response format");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<Workflow>(item) {
            Ok(workflow) => Some(workflow),
            Err(e) => {
                warn!(index = i, error = %e, "Skipping undecodable workflow entry");
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Older n8n versions use numeric ids
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Null) | None => Ok(String::new()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            json_kind(&other)
        ))),
    }
}
