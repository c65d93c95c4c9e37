//! Assembly of the agent's event stream into an aggregate response.
//!
//! The upstream agent answers with a JSON array of event records. The whole
//! array is buffered by the transport before it reaches this module, so
//! decoding is a plain fold over the typed events.

use serde_json::Value;
use std::collections::BTreeSet;

use crate::errors::{OrchestratorError, OrchestratorResult};
use crate::models::event::{AgentEvent, ContentPart, ResultItem};

/// A reference to a search document surfaced by the agent's search tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub source_id: String,
    pub doc_id: String,
}

/// Aggregate of one fully received event stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedResponse {
    pub text: String,
    /// Empty when no tool result carried a statement. When several results
    /// carry one, the last non-empty value wins.
    pub sql: String,
    /// First-seen order, duplicates preserved.
    pub citations: Vec<Citation>,
    pub tool_names: BTreeSet<String>,
    /// Records that did not fit the protocol and were dropped.
    pub skipped: usize,
}

/// The typed form of a fully buffered agent response.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub events: Vec<AgentEvent>,
    pub skipped: usize,
}

impl Transcript {
    /// Decode a raw response body into typed events.
    ///
    /// The body must be a JSON array of event records; anything else fails
    /// the whole transcript. Individual records that do not fit the
    /// protocol are counted and dropped rather than failing the call.
    pub fn parse(body: Value) -> OrchestratorResult<Self> {
        let records = body.as_array().ok_or_else(|| {
            OrchestratorError::ProtocolDecode("expected a JSON array of events".to_string())
        })?;

        let mut events = Vec::with_capacity(records.len());
        let mut skipped = 0;
        for record in records {
            match serde_json::from_value::<AgentEvent>(record.clone()) {
                Ok(event) => events.push(event),
                Err(err) => {
                    tracing::debug!("skipping malformed event record: {err}");
                    skipped += 1;
                }
            }
        }
        Ok(Transcript { events, skipped })
    }

    /// Fold the event sequence into its aggregate response.
    pub fn decode(&self) -> DecodedResponse {
        let mut decoded = DecodedResponse {
            skipped: self.skipped,
            ..Default::default()
        };

        for event in &self.events {
            let AgentEvent::MessageDelta { data } = event else {
                continue;
            };
            for part in &data.delta.content {
                match part {
                    ContentPart::Text { text } => decoded.text.push_str(text),
                    ContentPart::ToolResults { tool_results } => {
                        decoded
                            .tool_names
                            .extend(tool_results.names().map(str::to_string));
                        for item in &tool_results.content {
                            let ResultItem::Json { json } = item else {
                                continue;
                            };
                            decoded.text.push_str(&json.text);
                            if !json.sql.is_empty() {
                                decoded.sql = json.sql.clone();
                            }
                            for hit in &json.search_results {
                                decoded.citations.push(Citation {
                                    source_id: hit.source_id.clone(),
                                    doc_id: hit.doc_id.clone(),
                                });
                            }
                        }
                    }
                    ContentPart::Unknown => {}
                }
            }
        }

        decoded.text = decoded.text.trim().to_string();
        decoded.sql = decoded.sql.trim().to_string();
        decoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn delta(content: Value) -> Value {
        json!({ "event": "message.delta", "data": { "delta": { "content": content } } })
    }

    fn tool_json(name: &str, payload: Value) -> Value {
        json!({ "type": "tool_results", "tool_results": {
            "name": name,
            "content": [{ "type": "json", "json": payload }]
        }})
    }

    #[test]
    fn test_text_only_stream_has_no_sql_or_citations() {
        let transcript = Transcript::parse(json!([
            delta(json!([{ "type": "text", "text": "Hello " }])),
            delta(json!([{ "type": "text", "text": "world " }])),
            json!({ "event": "message.stop" }),
        ]))
        .unwrap();

        let decoded = transcript.decode();
        assert_eq!(decoded.text, "Hello world");
        assert_eq!(decoded.sql, "");
        assert!(decoded.citations.is_empty());
        assert!(decoded.tool_names.is_empty());
        assert_eq!(decoded.skipped, 0);
    }

    #[test]
    fn test_last_nonempty_sql_wins() {
        let transcript = Transcript::parse(json!([
            delta(json!([tool_json("analyst1", json!({ "sql": "A" }))])),
            delta(json!([tool_json("analyst1", json!({ "sql": "" }))])),
            delta(json!([tool_json("analyst1", json!({ "sql": "B" }))])),
        ]))
        .unwrap();

        assert_eq!(transcript.decode().sql, "B");
    }

    #[test]
    fn test_citations_keep_order_and_duplicates() {
        let transcript = Transcript::parse(json!([delta(json!([tool_json(
            "search1",
            json!({ "searchResults": [
                { "source_id": "1", "doc_id": "doc-a" },
                { "source_id": "2", "doc_id": "doc-b" },
                { "source_id": "1", "doc_id": "doc-a" },
                { "doc_id": "doc-c" },
            ]})
        )]))]))
        .unwrap();

        let decoded = transcript.decode();
        let docs: Vec<&str> = decoded.citations.iter().map(|c| c.doc_id.as_str()).collect();
        assert_eq!(docs, vec!["doc-a", "doc-b", "doc-a", "doc-c"]);
        assert_eq!(decoded.citations[3].source_id, "");
        assert_eq!(
            decoded.tool_names.iter().collect::<Vec<_>>(),
            vec!["search1"]
        );
    }

    #[test]
    fn test_tool_result_text_is_appended() {
        let transcript = Transcript::parse(json!([
            delta(json!([{ "type": "text", "text": "prefix " }])),
            delta(json!([tool_json("search1", json!({ "text": "from the tool" }))])),
        ]))
        .unwrap();

        assert_eq!(transcript.decode().text, "prefix from the tool");
    }

    #[test]
    fn test_malformed_records_are_counted_not_fatal() {
        let transcript = Transcript::parse(json!([
            delta(json!([{ "type": "text", "text": "kept" }])),
            json!("not an object"),
            json!({ "event": "message.delta", "data": { "delta": { "content": 42 } } }),
        ]))
        .unwrap();

        let decoded = transcript.decode();
        assert_eq!(decoded.text, "kept");
        assert_eq!(decoded.skipped, 2);
    }

    #[test]
    fn test_non_array_body_is_a_protocol_error() {
        let result = Transcript::parse(json!({ "error": "boom" }));
        assert!(matches!(
            result,
            Err(OrchestratorError::ProtocolDecode(_))
        ));
    }
}
