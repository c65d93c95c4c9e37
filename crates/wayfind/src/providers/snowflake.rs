use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{QueryResult, Warehouse};
use super::configs::WarehouseConfig;
use crate::errors::{OrchestratorError, OrchestratorResult};

const STATEMENTS_ENDPOINT: &str = "/api/v2/statements";

pub struct SnowflakeSql {
    client: Client,
    config: WarehouseConfig,
}

impl SnowflakeSql {
    pub fn new(config: WarehouseConfig) -> OrchestratorResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Warehouse for SnowflakeSql {
    async fn query(&self, sql: &str) -> OrchestratorResult<QueryResult> {
        let url = format!(
            "{}{}",
            self.config.host.trim_end_matches('/'),
            STATEMENTS_ENDPOINT
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&json!({ "statement": sql }))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body: Value = response.json().await?;
                parse_statement_result(&body)
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

fn parse_statement_result(body: &Value) -> OrchestratorResult<QueryResult> {
    let columns = body
        .pointer("/resultSetMetaData/rowType")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            OrchestratorError::Warehouse("response missing resultSetMetaData.rowType".to_string())
        })?
        .iter()
        .map(|column| {
            column
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        })
        .collect();

    let rows = body
        .get("data")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|row| row.as_array().cloned().unwrap_or_default())
        .collect();

    Ok(QueryResult { columns, rows })
}
