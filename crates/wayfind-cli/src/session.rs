use anyhow::Result;
use bat::PrettyPrinter;
use cliclack::{input, spinner};
use console::style;
use serde_json::Value;

use wayfind::geo::Coordinate;
use wayfind::models::message::SessionState;
use wayfind::orchestrator::{QueryOrchestrator, TurnOutcome};
use wayfind::providers::base::QueryResult;

pub struct Session {
    orchestrator: QueryOrchestrator,
    state: SessionState,
}

impl Session {
    pub fn new(orchestrator: QueryOrchestrator) -> Self {
        Self {
            orchestrator,
            state: SessionState::new(),
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        println!(
            "wayfind {}",
            style("- type \"exit\" to end the session, \"new\" to reset the conversation").dim()
        );

        loop {
            let query: String = input("Your question:").placeholder("").interact()?;
            let query = query.trim().to_string();

            if query.eq_ignore_ascii_case("exit") {
                break;
            }
            if query.eq_ignore_ascii_case("new") {
                self.state.reset();
                println!("{}", style("Started a new conversation").dim());
                continue;
            }
            if query.is_empty() {
                continue;
            }

            let spin = spinner();
            spin.start("thinking");
            let outcome = self.orchestrator.process_turn(&mut self.state, &query).await;
            spin.stop("");

            self.render(&outcome).await;
            println!();
        }
        Ok(())
    }

    async fn render(&self, outcome: &TurnOutcome) {
        match outcome {
            TurnOutcome::Map { address, position } => {
                println!("Map for: {}", style(address).bold());
                println!("  {}", format_point(position));
            }
            TurnOutcome::Route {
                origin,
                destination,
                path,
            } => {
                println!(
                    "Route from {} to {}",
                    format_point(origin),
                    format_point(destination)
                );
                match path.as_slice() {
                    [] => println!("{}", style("No route available.").yellow()),
                    [first, .., last] => println!(
                        "  {} points: {} -> {}",
                        path.len(),
                        format_point(first),
                        format_point(last)
                    ),
                    [only] => println!("  1 point: {}", format_point(only)),
                }
            }
            TurnOutcome::Answer {
                text,
                sql,
                citations,
            } => {
                if !text.is_empty() {
                    println!("{} {}", style("Assistant:").bold(), text);
                }
                if let Some(run) = sql {
                    println!("{}", style("Generated SQL").bold());
                    render_sql(&run.statement);
                    match &run.table {
                        Some(table) => render_table(table),
                        None => println!("{}", style("The query did not run.").yellow()),
                    }
                }
                if !citations.is_empty() {
                    println!("{}", style("Citations").bold());
                    for citation in citations {
                        let excerpt = self
                            .orchestrator
                            .citation_excerpt(citation)
                            .await
                            .unwrap_or_else(|| "No transcript available".to_string());
                        println!("  [{}] {}", citation.source_id, excerpt);
                    }
                }
            }
            TurnOutcome::Notice(message) => println!("{}", style(message).yellow()),
        }
    }
}

fn format_point(coordinate: &Coordinate) -> String {
    format!("({:.5}, {:.5})", coordinate.latitude, coordinate.longitude)
}

fn render_sql(statement: &str) {
    let printed = PrettyPrinter::new()
        .input_from_bytes(statement.as_bytes())
        .language("sql")
        .print()
        .unwrap_or(false);
    if !printed {
        println!("{statement}");
    }
}

fn render_table(table: &QueryResult) {
    println!("  {}", table.columns.join(" | "));
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        println!("  {}", cells.join(" | "));
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
