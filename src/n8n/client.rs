//! n8n API Client
//!
//! Authenticated HTTP client for the n8n public REST API. Every call is a
//! single round trip; there are no retries.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::error::{N8nError, Result};
use super::types::*;
use crate::config::{N8nAuth, N8nConfig};

const API_KEY_HEADER: &str = "X-N8N-API-KEY";

/// Workflow operations the template lookup and provisioning flows rely on.
///
/// [`N8nClient`] is the production implementation.
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    /// List all workflows in remote order
    async fn list_workflows(&self) -> Result<Vec<Workflow>>;

    async fn get_workflow(&self, id: &str) -> Result<Workflow>;

    async fn create_workflow(&self, workflow: &NewWorkflow) -> Result<Workflow>;

    /// Replace a workflow with `workflow` (last write wins)
    async fn update_workflow(&self, id: &str, workflow: &Workflow) -> Result<Workflow>;

    async fn delete_workflow(&self, id: &str) -> Result<()>;

    async fn activate_workflow(&self, id: &str) -> Result<()>;

    async fn deactivate_workflow(&self, id: &str) -> Result<()>;
}

/// n8n API client
#[derive(Debug, Clone)]
pub struct N8nClient {
    http: Client,
    config: N8nConfig,
    api_root: String,
}

#[derive(Deserialize)]
struct WebhookResponse {
    url: String,
}

impl N8nClient {
    /// Create a client from an explicit configuration
    pub fn new(config: N8nConfig) -> Result<Self> {
        let api_root = config.api_root()?;
        let http = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            http,
            config,
            api_root,
        })
    }

    /// Create a client from `N8N_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(N8nConfig::from_env())
    }

    pub fn config(&self) -> &N8nConfig {
        &self.config
    }

    /// Start an authenticated request against `/api/v1{endpoint}`
    fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let auth = self.config.auth()?;
        let url = format!("{}{}", self.api_root, endpoint);
        debug!(%method, %url, "n8n request");

        let builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");

        Ok(match auth {
            N8nAuth::ApiKey(key) => builder.header(API_KEY_HEADER, key),
            N8nAuth::Basic { username, password } => builder.basic_auth(username, Some(password)),
        })
    }

    /// Send and turn non-2xx statuses into [`N8nError::Api`]
    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(N8nError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// For endpoints whose response body we ignore
    async fn send_discard(&self, builder: RequestBuilder) -> Result<()> {
        self.send(builder).await?;
        Ok(())
    }

    /// Run a workflow with an optional input payload
    pub async fn execute_workflow(&self, id: &str, data: Option<Value>) -> Result<Value> {
        let builder = self
            .request(Method::POST, &format!("/workflows/{}/execute", id))?
            .json(&json!({ "data": data }));
        self.send_json(builder).await
    }

    pub async fn list_credentials(&self) -> Result<Vec<Credential>> {
        self.send_json(self.request(Method::GET, "/credentials")?)
            .await
    }

    pub async fn create_credential(&self, credential: &NewCredential) -> Result<Credential> {
        let builder = self.request(Method::POST, "/credentials")?.json(credential);
        self.send_json(builder).await
    }

    pub async fn update_credential(&self, id: &str, credential: &NewCredential) -> Result<Credential> {
        let builder = self
            .request(Method::PUT, &format!("/credentials/{}", id))?
            .json(credential);
        self.send_json(builder).await
    }

    pub async fn delete_credential(&self, id: &str) -> Result<()> {
        self.send_discard(self.request(Method::DELETE, &format!("/credentials/{}", id))?)
            .await
    }

    /// Register a POST webhook at `/{workflow_id}/{webhook_name}` and return its URL
    pub async fn create_webhook(&self, workflow_id: &str, webhook_name: &str) -> Result<String> {
        let registration = WebhookRegistration {
            workflow_id,
            webhook_name,
            method: "POST",
            path: format!("/{}/{}", workflow_id, webhook_name),
        };
        let builder = self.request(Method::POST, "/webhooks")?.json(&registration);
        let response: WebhookResponse = self.send_json(builder).await?;

        info!(workflow_id, webhook_name, url = %response.url, "Webhook registered");
        Ok(response.url)
    }

    /// POST a test payload to a webhook URL. Webhooks are public, so no auth
    /// headers are sent.
    pub async fn test_webhook(&self, webhook_url: &str, payload: &Value) -> Result<Value> {
        let builder = self.http.post(webhook_url).json(payload);
        self.send_json(builder).await
    }
}

#[async_trait]
impl WorkflowApi for N8nClient {
    async fn list_workflows(&self) -> Result<Vec<Workflow>> {
        let raw: Value = self
            .send_json(self.request(Method::GET, "/workflows")?)
            .await?;
        let workflows = normalize_workflow_list(raw);
        debug!(count = workflows.len(), "Listed n8n workflows");
        Ok(workflows)
    }

    async fn get_workflow(&self, id: &str) -> Result<Workflow> {
        self.send_json(self.request(Method::GET, &format!("/workflows/{}", id))?)
            .await
    }

    async fn create_workflow(&self, workflow: &NewWorkflow) -> Result<Workflow> {
        info!(
            name = %workflow.name,
            nodes = workflow.nodes.len(),
            has_settings = workflow.settings.is_some(),
            "Creating n8n workflow"
        );
        let builder = self.request(Method::POST, "/workflows")?.json(workflow);
        self.send_json(builder).await
    }

    async fn update_workflow(&self, id: &str, workflow: &Workflow) -> Result<Workflow> {
        let builder = self
            .request(Method::PUT, &format!("/workflows/{}", id))?
            .json(workflow);
        self.send_json(builder).await
    }

    async fn delete_workflow(&self, id: &str) -> Result<()> {
        self.send_discard(self.request(Method::DELETE, &format!("/workflows/{}", id))?)
            .await
    }

    async fn activate_workflow(&self, id: &str) -> Result<()> {
        self.send_discard(self.request(Method::POST, &format!("/workflows/{}/activate", id))?)
            .await
    }

    async fn deactivate_workflow(&self, id: &str) -> Result<()> {
        self.send_discard(self.request(Method::POST, &format!("/workflows/{}/deactivate", id))?)
            .await
    }
}
