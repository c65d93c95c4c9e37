use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use wayfind::orchestrator::{CitationSource, QueryOrchestrator};
use wayfind::providers::configs::{CortexConfig, HereConfig, WarehouseConfig};
use wayfind::providers::cortex::CortexAgent;
use wayfind::providers::here::{HereGeocode, HereRouter};
use wayfind::providers::snowflake::SnowflakeSql;

mod session;

#[derive(Parser)]
#[command(author, version, about = "Conversational mapping and analytics assistant", long_about = None)]
struct Cli {
    /// Model to use (can also be set via CORTEX_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Table holding citation transcripts
    #[arg(long, default_value = "sales_conversations")]
    citation_table: String,

    /// Id column of the citation table
    #[arg(long, default_value = "conversation_id")]
    citation_id_column: String,

    /// Text column of the citation table
    #[arg(long, default_value = "transcript_text")]
    citation_text_column: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut cortex_config = CortexConfig::from_env()?;
    if let Some(model) = cli.model {
        cortex_config.model = model;
    }
    let here_config = HereConfig::from_env()?;
    let warehouse_config = WarehouseConfig::from_env()?;

    let orchestrator = QueryOrchestrator::new(
        Arc::new(CortexAgent::new(cortex_config)?),
        Arc::new(HereGeocode::new(here_config.clone())?),
        Arc::new(HereRouter::new(here_config)?),
        Arc::new(SnowflakeSql::new(warehouse_config)?),
        CitationSource {
            table: cli.citation_table,
            id_column: cli.citation_id_column,
            text_column: cli.citation_text_column,
        },
    );

    session::Session::new(orchestrator).start().await
}
