//! Top-level decision procedure for one conversational turn.
//!
//! A turn runs synchronously to completion: address handling first, then a
//! tool-enabled agent call, then a plain completion fallback when the agent
//! produced no SQL. Hard collaborator failures are converted to a
//! user-visible notice at this boundary; one failed turn never blocks the
//! next.

use std::sync::Arc;
use tracing::warn;

use crate::extract::AddressExtractor;
use crate::geo::{Coordinate, GeoResolver, RouteResolver};
use crate::models::message::{ChatMessage, SessionState};
use crate::providers::base::{AgentConnection, GeocodeApi, QueryResult, RoutingApi, Warehouse};
use crate::stream::Citation;

/// Where citation excerpts can be looked up in the warehouse.
#[derive(Debug, Clone)]
pub struct CitationSource {
    pub table: String,
    pub id_column: String,
    pub text_column: String,
}

/// A SQL statement the agent produced, plus its execution result when the
/// warehouse accepted it.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlRun {
    pub statement: String,
    pub table: Option<QueryResult>,
}

/// What a single turn produced for rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// A single geocoded point.
    Map {
        address: String,
        position: Coordinate,
    },
    /// A path between two resolved addresses; empty when routing failed.
    Route {
        origin: Coordinate,
        destination: Coordinate,
        path: Vec<Coordinate>,
    },
    /// An agent answer, optionally backed by a SQL run and citations.
    Answer {
        text: String,
        sql: Option<SqlRun>,
        citations: Vec<Citation>,
    },
    /// The turn ended with only a user-visible message.
    Notice(String),
}

pub struct QueryOrchestrator {
    agent: Arc<dyn AgentConnection>,
    warehouse: Arc<dyn Warehouse>,
    extractor: AddressExtractor,
    geocoder: GeoResolver,
    router: RouteResolver,
    citation_source: CitationSource,
}

impl QueryOrchestrator {
    pub fn new(
        agent: Arc<dyn AgentConnection>,
        geocode: Arc<dyn GeocodeApi>,
        routing: Arc<dyn RoutingApi>,
        warehouse: Arc<dyn Warehouse>,
        citation_source: CitationSource,
    ) -> Self {
        Self {
            extractor: AddressExtractor::new(Arc::clone(&agent)),
            geocoder: GeoResolver::new(geocode),
            router: RouteResolver::new(routing),
            agent,
            warehouse,
            citation_source,
        }
    }

    /// Process one user turn.
    ///
    /// Appends the user message, runs the state machine, and appends the
    /// assistant message when one was produced — in that order, and only
    /// through this entry point.
    pub async fn process_turn(&self, session: &mut SessionState, query: &str) -> TurnOutcome {
        session.push(ChatMessage::user(query));
        let outcome = self.run_turn(query).await;
        if let TurnOutcome::Answer { text, .. } = &outcome {
            if !text.is_empty() {
                session.push(ChatMessage::assistant(text.clone()));
            }
        }
        outcome
    }

    async fn run_turn(&self, query: &str) -> TurnOutcome {
        let addresses = self.extractor.extract(query).await;
        match addresses.as_slice() {
            [address] => self.map_single(address).await,
            [origin, destination] => self.map_route(origin, destination).await,
            // Zero or three-plus addresses: not handled here.
            _ => self.agent_answer(query).await,
        }
    }

    async fn map_single(&self, address: &str) -> TurnOutcome {
        match self.geocoder.resolve(address).await {
            Some(position) => TurnOutcome::Map {
                address: address.to_string(),
                position,
            },
            None => TurnOutcome::Notice(format!("Could not geocode {address}.")),
        }
    }

    async fn map_route(&self, origin: &str, destination: &str) -> TurnOutcome {
        // Two sequential lookups; no routing call unless both resolved.
        let from = self.geocoder.resolve(origin).await;
        let to = self.geocoder.resolve(destination).await;
        let (Some(from), Some(to)) = (from, to) else {
            return TurnOutcome::Notice("Could not geocode one or both addresses.".to_string());
        };

        let path = self.router.route(from, to).await;
        TurnOutcome::Route {
            origin: from,
            destination: to,
            path,
        }
    }

    async fn agent_answer(&self, query: &str) -> TurnOutcome {
        let decoded = match self.agent.run_with_tools(query).await {
            Ok(transcript) => transcript.decode(),
            Err(err) => return TurnOutcome::Notice(format!("Agent request failed: {err}")),
        };

        if decoded.sql.is_empty() {
            // A tool-routed answer with no backing query is unreliable:
            // discard its text, ask for a plain completion instead, and
            // suppress any citations the first call produced.
            return match self.agent.complete(query).await {
                Ok(transcript) => TurnOutcome::Answer {
                    text: transcript.decode().text,
                    sql: None,
                    citations: Vec::new(),
                },
                Err(err) => TurnOutcome::Notice(format!("Completion request failed: {err}")),
            };
        }

        let statement = decoded.sql.replace(';', "");
        let table = match self.warehouse.query(&statement).await {
            Ok(table) => Some(table),
            Err(err) => {
                warn!("warehouse rejected generated SQL: {err}");
                None
            }
        };

        TurnOutcome::Answer {
            text: decoded.text,
            sql: Some(SqlRun { statement, table }),
            citations: decoded.citations,
        }
    }

    /// Fetch the transcript excerpt backing a citation, if the warehouse
    /// has one.
    pub async fn citation_excerpt(&self, citation: &Citation) -> Option<String> {
        let source = &self.citation_source;
        let statement = format!(
            "SELECT {} FROM {} WHERE {} = '{}'",
            source.text_column, source.table, source.id_column, citation.doc_id
        );
        match self.warehouse.query(&statement).await {
            Ok(result) => result
                .rows
                .first()
                .and_then(|row| row.first())
                .and_then(|value| value.as_str())
                .map(str::to_string),
            Err(err) => {
                warn!("citation lookup failed: {err}");
                None
            }
        }
    }
}
