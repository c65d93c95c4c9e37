//! Address and route resolution over the external map provider.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::polyline;
use crate::providers::base::{GeocodeApi, RoutingApi};

/// A resolved position. Absence is expressed as `Option::None`, never as a
/// zeroed coordinate — (0, 0) is a valid place in the Gulf of Guinea.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

pub struct GeoResolver {
    api: Arc<dyn GeocodeApi>,
}

impl GeoResolver {
    pub fn new(api: Arc<dyn GeocodeApi>) -> Self {
        Self { api }
    }

    /// Resolve an address to a coordinate.
    ///
    /// Returns None when the provider fails, returns no items, or omits the
    /// position. One attempt per call, no retries; callers only need a
    /// present/absent decision.
    pub async fn resolve(&self, address: &str) -> Option<Coordinate> {
        let reply = match self.api.geocode(address).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(address, "geocoding failed: {err}");
                return None;
            }
        };
        reply
            .items
            .into_iter()
            .next()
            .and_then(|item| item.position)
            .map(Coordinate::from)
    }
}

pub struct RouteResolver {
    api: Arc<dyn RoutingApi>,
}

impl RouteResolver {
    pub fn new(api: Arc<dyn RoutingApi>) -> Self {
        Self { api }
    }

    /// Request a path between two resolved coordinates.
    ///
    /// The provider answers with one encoded polyline per route section;
    /// the decoded sections are concatenated in order. Any failure along
    /// the way yields an empty path.
    pub async fn route(&self, origin: Coordinate, destination: Coordinate) -> Vec<Coordinate> {
        let reply = match self.api.route(origin, destination).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!("routing failed: {err}");
                return Vec::new();
            }
        };

        let mut path = Vec::new();
        for section in reply.routes.iter().flat_map(|route| &route.sections) {
            match polyline::decode(&section.polyline) {
                Ok(mut coordinates) => path.append(&mut coordinates),
                Err(err) => {
                    warn!("could not decode route polyline: {err}");
                    return Vec::new();
                }
            }
        }
        path
    }
}
