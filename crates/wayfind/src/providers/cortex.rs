use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

use super::base::AgentConnection;
use super::configs::CortexConfig;
use crate::errors::{OrchestratorError, OrchestratorResult};
use crate::stream::Transcript;

const AGENT_ENDPOINT: &str = "/api/v2/cortex/agent:run";

pub struct CortexAgent {
    client: Client,
    config: CortexConfig,
}

impl CortexAgent {
    pub fn new(config: CortexConfig) -> OrchestratorResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(50))
            .build()?;

        Ok(Self { client, config })
    }

    fn user_messages(prompt: &str) -> Value {
        json!([{ "role": "user", "content": [{ "type": "text", "text": prompt }] }])
    }

    async fn post(&self, payload: Value) -> OrchestratorResult<Transcript> {
        let url = format!(
            "{}{}",
            self.config.host.trim_end_matches('/'),
            AGENT_ENDPOINT
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body: Value = response.json().await?;
                Transcript::parse(body)
            }
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(OrchestratorError::UpstreamHttp {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

#[async_trait]
impl AgentConnection for CortexAgent {
    async fn run_with_tools(&self, prompt: &str) -> OrchestratorResult<Transcript> {
        let payload = json!({
            "model": self.config.model,
            "messages": Self::user_messages(prompt),
            "tool_choice": { "type": "auto" },
            "tools": [
                { "tool_spec": { "type": "cortex_analyst_text_to_sql", "name": "analyst1" } },
                { "tool_spec": { "type": "cortex_search", "name": "search1" } }
            ],
            "tool_resources": {
                "analyst1": { "semantic_model_file": self.config.semantic_model_file },
                "search1": {
                    "name": self.config.search_service,
                    "max_results": self.config.search_limit,
                    "id_column": self.config.search_id_column
                }
            }
        });
        self.post(payload).await
    }

    async fn complete(&self, prompt: &str) -> OrchestratorResult<Transcript> {
        let payload = json!({
            "model": self.config.model,
            "messages": Self::user_messages(prompt)
        });
        self.post(payload).await
    }
}
