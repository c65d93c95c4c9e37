use serde::Deserialize;

/// One record of the agent's buffered event stream.
///
/// The wire protocol carries several event kinds; only `message.delta`
/// contributes to a decoded response, so everything else collapses into
/// `Ignored` at the deserialization boundary and internal logic matches
/// exhaustively over this closed set.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event")]
pub enum AgentEvent {
    #[serde(rename = "message.delta")]
    MessageDelta { data: DeltaData },
    #[serde(other)]
    Ignored,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeltaData {
    pub delta: Delta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

/// A content increment inside a message delta.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ToolResults { tool_results: ToolResults },
    #[serde(other)]
    Unknown,
}

/// Structured payload produced when the agent invoked one of its bound
/// tools. Providers spell the tool name either as a single `name` or a
/// `names` array; both are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolResults {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub content: Vec<ResultItem>,
}

impl ToolResults {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.name
            .as_deref()
            .into_iter()
            .chain(self.names.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResultItem {
    Json { json: ResultPayload },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultPayload {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub sql: String,
    #[serde(default, rename = "searchResults")]
    pub search_results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub source_id: String,
    #[serde(default)]
    pub doc_id: String,
}
