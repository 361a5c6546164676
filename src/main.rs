//! analyst - validate, run and chart LLM-authored SQL.

mod cli;

use std::process::ExitCode;

use anyhow::Context;
use cli::{read_input, Cli, Command};
use sql_analyst::chart::{append_charts, extract_charts_from_text};
use sql_analyst::config::{display_connection_string, Config};
use sql_analyst::error::AnalystError;
use sql_analyst::logging;
use sql_analyst::query::QueryExecutor;
use sql_analyst::safety::validate_query;
use sql_analyst::tool::{run_query, RunQueryResponse};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<AnalystError>() {
                Some(analyst_error) => error!("{}: {:#}", analyst_error.category(), e),
                None => error!("{:#}", e),
            }
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Command::Validate { sql } => {
            let sql = read_input(sql).context("Failed to read SQL from stdin")?;
            let result = validate_query(&sql);
            match result.error {
                None => {
                    println!("valid");
                    Ok(ExitCode::SUCCESS)
                }
                Some(reason) => {
                    println!("invalid: {reason}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::Run {
            sql,
            pretty,
            narrative,
        } => {
            let sql = read_input(sql).context("Failed to read SQL from stdin")?;

            let config_path = cli.config_path();
            info!("Loading config from: {}", config_path.display());
            let config = Config::load_from_file(&config_path)?;
            let connection = config.resolve_connection_string(cli.database_url.as_deref())?;
            if let Some(conn_str) = &connection {
                info!("Connection: {}", display_connection_string(conn_str));
            }

            let executor = QueryExecutor::postgres(connection);
            let response = run_query(&executor, &sql).await;
            let succeeded = response.is_success();

            if *narrative {
                println!("{}", render_narrative(&response)?);
            } else if *pretty {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", serde_json::to_string(&response)?);
            }

            Ok(if succeeded {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Command::Extract { input } => {
            let text = if input == "-" {
                read_input(input).context("Failed to read text from stdin")?
            } else {
                std::fs::read_to_string(input)
                    .with_context(|| format!("Failed to read {input}"))?
            };

            let (stripped, charts) = extract_charts_from_text(&text)?;
            let output = serde_json::json!({ "text": stripped, "charts": charts });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Renders a response as prose followed by an embedded chart block.
fn render_narrative(response: &RunQueryResponse) -> anyhow::Result<String> {
    let mut text = String::new();

    match response {
        RunQueryResponse::Success(success) => {
            text.push_str(&format!(
                "Returned {} rows in {} ms.",
                success.row_count, success.execution_time_ms
            ));
            for insight in &success.insights {
                text.push_str("\n- ");
                text.push_str(insight);
            }
        }
        RunQueryResponse::Failure(failure) => {
            text.push_str(&failure.error);
            for suggestion in &failure.suggestions {
                text.push_str("\n- ");
                text.push_str(suggestion);
            }
        }
    }

    Ok(append_charts(&text, response.charts())?)
}
