//! Address extraction from free-text queries.

use regex::Regex;
use std::sync::Arc;
use tracing::warn;

use crate::providers::base::AgentConnection;

/// An ordered list of extracted address strings. Lists of any length are
/// valid; downstream handling only triggers for exactly one or two.
pub type AddressList = Vec<String>;

pub struct AddressExtractor {
    agent: Arc<dyn AgentConnection>,
}

impl AddressExtractor {
    pub fn new(agent: Arc<dyn AgentConnection>) -> Self {
        Self { agent }
    }

    /// Extract street addresses from `query`.
    ///
    /// Asks the agent for a bare JSON array of address strings first; when
    /// that produces nothing usable, falls back to a case-insensitive
    /// "between A and B" pattern match on the query itself.
    pub async fn extract(&self, query: &str) -> AddressList {
        let primary = self.ask_agent(query).await;
        if !primary.is_empty() {
            return primary;
        }
        between_fallback(query)
    }

    async fn ask_agent(&self, query: &str) -> AddressList {
        let prompt = format!(
            "Extract every full street address from this text and output only \
             a JSON array of strings (no markdown). Example:\n\
             [\"123 Main St City, ST 12345\", \"456 Rue Example Montréal QC H2X 1Y4\"]\n\n\
             Text:\n```{query}```"
        );
        let transcript = match self.agent.complete(&prompt).await {
            Ok(transcript) => transcript,
            Err(err) => {
                warn!("address extraction call failed: {err}");
                return Vec::new();
            }
        };
        parse_address_array(&transcript.decode().text)
    }
}

/// Locate and parse the bracketed substring of the agent's reply as a JSON
/// array of strings, after stripping fenced code-block markers.
///
/// The scan is greedy from the first `[` to the last `]`, so prose that
/// happens to contain an unrelated bracketed list can be mis-captured. Kept
/// for compatibility with the observed model output; a structured-output
/// contract could replace this helper without touching callers.
fn parse_address_array(text: &str) -> AddressList {
    let fences = Regex::new(r"(?i)```(?:json)?").unwrap();
    let cleaned = fences.replace_all(text, "");
    let cleaned = cleaned.trim();

    let bracketed = Regex::new(r"(?s)\[.*\]").unwrap();
    let Some(found) = bracketed.find(cleaned) else {
        return Vec::new();
    };
    serde_json::from_str(found.as_str()).unwrap_or_default()
}

fn between_fallback(query: &str) -> AddressList {
    let pattern = Regex::new(r"(?i)between\s+(.*?)\s+and\s+(.*)").unwrap();
    match pattern.captures(query) {
        Some(caps) => vec![
            caps[1].trim_matches(&[' ', ',', '.'][..]).to_string(),
            caps[2].trim_matches(&[' ', ',', '.'][..]).to_string(),
        ],
        None => Vec::new(),
    }
}
