use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Deserialize;
use serde_json::{json, Value};

use vera_consensus::{EngineConfig, EngineError, FallbackOrchestrator};
use vera_core::{OperationRequest, PolicySpec};
use vera_ledger::{Journal, ResultLedger};
use vera_oracle::{ScriptedExecutor, ScriptedJudge, WorkExecutor};

#[derive(Parser)]
#[command(name = "vera")]
#[command(about = "Graduated-agreement execution engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a scripted scenario file end-to-end
    Run {
        /// Path to a scenario JSON file
        scenario: PathBuf,

        /// Mirror ledger entries into a JSONL journal
        #[arg(long)]
        journal: Option<PathBuf>,
    },

    /// Run the built-in graduated fallback demonstration
    Demo,

    /// Print the entries recorded in a ledger journal
    Inspect {
        /// Path to a JSONL journal written by `run --journal`
        journal: PathBuf,
    },
}

/// A self-contained scenario: the request plus scripted collaborator
/// behavior. Replica outputs are consumed in order across attempts;
/// judge verdicts are consumed per entry point.
#[derive(Deserialize)]
struct Scenario {
    request: OperationRequest,

    /// Replica outputs, popped one per execution
    outputs: Vec<Value>,

    /// Verdicts for comparative judge calls
    #[serde(default)]
    comparisons: Vec<bool>,

    /// Verdicts for non-comparative judge calls
    #[serde(default)]
    assessments: Vec<bool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { scenario, journal } => {
            let text = fs::read_to_string(&scenario)
                .with_context(|| format!("reading scenario {}", scenario.display()))?;
            let scenario: Scenario =
                serde_json::from_str(&text).context("parsing scenario JSON")?;
            execute_scenario(scenario, journal).await
        }
        Commands::Demo => execute_scenario(demo_scenario(), None).await,
        Commands::Inspect { journal } => {
            let entries = Journal::read_entries(&journal)
                .with_context(|| format!("reading journal {}", journal.display()))?;
            for entry in &entries {
                println!("{}", serde_json::to_string_pretty(entry)?);
            }
            info!("{} entries in {}", entries.len(), journal.display());
            Ok(())
        }
    }
}

async fn execute_scenario(scenario: Scenario, journal: Option<PathBuf>) -> Result<()> {
    let ledger = match &journal {
        Some(path) => Arc::new(ResultLedger::with_journal(path)?),
        None => Arc::new(ResultLedger::new()),
    };
    let executor: Arc<dyn WorkExecutor> =
        Arc::new(ScriptedExecutor::answering(scenario.outputs));
    let judge = Arc::new(ScriptedJudge::verdicts(
        scenario.comparisons,
        scenario.assessments,
    ));
    let orchestrator = FallbackOrchestrator::new(judge, ledger.clone(), EngineConfig::default());

    let operation_id = scenario.request.operation_id.clone();
    match orchestrator.execute(scenario.request, executor).await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Err(EngineError::AllPoliciesExhausted { attempts, .. }) => {
            eprintln!("operation `{operation_id}` exhausted every policy:");
            eprintln!("{}", serde_json::to_string_pretty(&attempts)?);
        }
        Err(err) => return Err(err.into()),
    }

    // The ledger entry is the durable record either way
    let entry = ledger.lookup(&operation_id)?;
    println!("ledger entry:");
    println!("{}", serde_json::to_string_pretty(&entry)?);
    Ok(())
}

/// The price-direction scenario: strict disagreement resolved at the
/// comparative level under "same directional meaning".
fn demo_scenario() -> Scenario {
    Scenario {
        request: OperationRequest::new(
            "demo-price-direction",
            json!({"query": "did the price go up?"}),
            3,
            vec![
                PolicySpec::Strict,
                PolicySpec::Comparative {
                    principle: "same directional meaning".to_string(),
                },
                PolicySpec::NonComparative {
                    task: "report price direction".to_string(),
                    criteria: "states a clear direction".to_string(),
                },
            ],
        ),
        outputs: vec![
            // strict attempt
            json!("yes, the price is up"),
            json!("price increased"),
            json!("it went up"),
            // comparative attempt
            json!("yes, the price is up"),
            json!("price increased"),
            json!("it went up"),
        ],
        comparisons: vec![true],
        assessments: vec![],
    }
}
