use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::base::{GeocodeApi, GeocodeReply, RouteReply, RoutingApi};
use super::configs::HereConfig;
use crate::errors::{OrchestratorError, OrchestratorResult};
use crate::geo::Coordinate;

// Geocoding and routing are expected to fail fast rather than hang.
const MAP_API_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HereGeocode {
    client: Client,
    config: HereConfig,
}

impl HereGeocode {
    pub fn new(config: HereConfig) -> OrchestratorResult<Self> {
        let client = Client::builder().timeout(MAP_API_TIMEOUT).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl GeocodeApi for HereGeocode {
    async fn geocode(&self, address: &str) -> OrchestratorResult<GeocodeReply> {
        let url = format!(
            "{}/v1/geocode",
            self.config.geocode_host.trim_end_matches('/')
        );

        let response = self
            .client
            .get(&url)
            .query(&[("q", address), ("apiKey", self.config.api_key.as_str())])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
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

pub struct HereRouter {
    client: Client,
    config: HereConfig,
}

impl HereRouter {
    pub fn new(config: HereConfig) -> OrchestratorResult<Self> {
        let client = Client::builder().timeout(MAP_API_TIMEOUT).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl RoutingApi for HereRouter {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> OrchestratorResult<RouteReply> {
        let url = format!("{}/v8/routes", self.config.router_host.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[
                ("transportMode", "car".to_string()),
                (
                    "origin",
                    format!("{},{}", origin.latitude, origin.longitude),
                ),
                (
                    "destination",
                    format!("{},{}", destination.latitude, destination.longitude),
                ),
                ("return", "polyline".to_string()),
                ("apiKey", self.config.api_key.clone()),
            ])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
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
