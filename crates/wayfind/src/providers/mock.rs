//! Recording mocks for the collaborator seams, used across the crate's
//! tests. Each mock scripts its reply and records the calls it received so
//! tests can assert on which collaborators a turn actually touched.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;

use super::base::{
    AgentConnection, GeocodeApi, GeocodeItem, GeocodeReply, Position, QueryResult, RouteReply,
    RoutingApi, Warehouse,
};
use crate::errors::{OrchestratorError, OrchestratorResult};
use crate::geo::Coordinate;
use crate::stream::Transcript;

fn mock_failure() -> OrchestratorError {
    OrchestratorError::UpstreamHttp {
        status: 500,
        message: "mock failure".to_string(),
    }
}

/// Build a transcript holding a single text delta.
pub fn text_transcript(text: &str) -> Transcript {
    Transcript::parse(json!([
        { "event": "message.delta", "data": { "delta": { "content": [
            { "type": "text", "text": text }
        ]}}}
    ]))
    .unwrap()
}

#[derive(Default)]
pub struct MockAgent {
    /// Reply for `run_with_tools`; None simulates an upstream failure.
    pub tool_reply: Option<Transcript>,
    /// Reply for `complete`; None simulates an upstream failure.
    pub completion_reply: Option<Transcript>,
    pub tool_calls: Mutex<Vec<String>>,
    pub completion_calls: Mutex<Vec<String>>,
}

impl MockAgent {
    pub fn completing_with_text(text: &str) -> Self {
        Self {
            completion_reply: Some(text_transcript(text)),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AgentConnection for MockAgent {
    async fn run_with_tools(&self, prompt: &str) -> OrchestratorResult<Transcript> {
        self.tool_calls.lock().unwrap().push(prompt.to_string());
        self.tool_reply.clone().ok_or_else(mock_failure)
    }

    async fn complete(&self, prompt: &str) -> OrchestratorResult<Transcript> {
        self.completion_calls.lock().unwrap().push(prompt.to_string());
        self.completion_reply.clone().ok_or_else(mock_failure)
    }
}

#[derive(Clone)]
pub enum MockGeocode {
    Found(Coordinate),
    Empty,
    Fail,
}

#[derive(Default)]
pub struct MockGeocoder {
    pub replies: HashMap<String, MockGeocode>,
    pub calls: Mutex<Vec<String>>,
}

impl MockGeocoder {
    pub fn with_reply(address: &str, reply: MockGeocode) -> Self {
        let mut geocoder = Self::default();
        geocoder.replies.insert(address.to_string(), reply);
        geocoder
    }

    pub fn add(mut self, address: &str, reply: MockGeocode) -> Self {
        self.replies.insert(address.to_string(), reply);
        self
    }
}

#[async_trait]
impl GeocodeApi for MockGeocoder {
    async fn geocode(&self, address: &str) -> OrchestratorResult<GeocodeReply> {
        self.calls.lock().unwrap().push(address.to_string());
        match self.replies.get(address) {
            Some(MockGeocode::Found(coordinate)) => Ok(GeocodeReply {
                items: vec![GeocodeItem {
                    position: Some(Position {
                        lat: coordinate.latitude,
                        lng: coordinate.longitude,
                    }),
                }],
            }),
            Some(MockGeocode::Empty) | None => Ok(GeocodeReply::default()),
            Some(MockGeocode::Fail) => Err(mock_failure()),
        }
    }
}

#[derive(Default)]
pub struct MockRouter {
    /// Encoded polyline to answer with; None simulates an upstream failure.
    pub polyline: Option<String>,
    pub calls: Mutex<Vec<(Coordinate, Coordinate)>>,
}

impl MockRouter {
    pub fn with_polyline(encoded: &str) -> Self {
        Self {
            polyline: Some(encoded.to_string()),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoutingApi for MockRouter {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> OrchestratorResult<RouteReply> {
        self.calls.lock().unwrap().push((origin, destination));
        let encoded = self.polyline.clone().ok_or_else(mock_failure)?;
        Ok(serde_json::from_value(json!({
            "routes": [{ "sections": [{ "polyline": encoded }] }]
        }))
        .expect("mock route reply"))
    }
}

#[derive(Default)]
pub struct MockWarehouse {
    /// Result for any statement; None simulates a rejected query.
    pub result: Option<QueryResult>,
    pub statements: Mutex<Vec<String>>,
}

impl MockWarehouse {
    pub fn with_result(result: QueryResult) -> Self {
        Self {
            result: Some(result),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Warehouse for MockWarehouse {
    async fn query(&self, sql: &str) -> OrchestratorResult<QueryResult> {
        self.statements.lock().unwrap().push(sql.to_string());
        self.result
            .clone()
            .ok_or_else(|| OrchestratorError::Warehouse("mock rejection".to_string()))
    }
}
