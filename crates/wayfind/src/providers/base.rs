use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::OrchestratorResult;
use crate::geo::Coordinate;
use crate::stream::Transcript;

/// The upstream language-model agent.
///
/// Both calls buffer the full event stream before returning; a non-2xx
/// status or an unparseable top-level body is a hard failure.
#[async_trait]
pub trait AgentConnection: Send + Sync {
    /// Run the agent with its bound tools (search + text-to-SQL).
    async fn run_with_tools(&self, prompt: &str) -> OrchestratorResult<Transcript>;

    /// Plain completion with no tools bound.
    async fn complete(&self, prompt: &str) -> OrchestratorResult<Transcript>;
}

/// Forward geocoding collaborator.
#[async_trait]
pub trait GeocodeApi: Send + Sync {
    async fn geocode(&self, address: &str) -> OrchestratorResult<GeocodeReply>;
}

/// Point-to-point routing collaborator.
#[async_trait]
pub trait RoutingApi: Send + Sync {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> OrchestratorResult<RouteReply>;
}

/// SQL warehouse collaborator.
#[async_trait]
pub trait Warehouse: Send + Sync {
    async fn query(&self, sql: &str) -> OrchestratorResult<QueryResult>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocodeReply {
    #[serde(default)]
    pub items: Vec<GeocodeItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocodeItem {
    #[serde(default)]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl From<Position> for Coordinate {
    fn from(position: Position) -> Self {
        Coordinate {
            latitude: position.lat,
            longitude: position.lng,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteReply {
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub sections: Vec<RouteSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteSection {
    #[serde(default)]
    pub polyline: String,
}

/// A tabular warehouse result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}
