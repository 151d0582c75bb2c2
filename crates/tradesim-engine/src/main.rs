//! Command-line driver for the Tradesim simulation.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `tradesim-config.yaml` (or `TRADESIM_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Load the Q-table when a learning policy is configured
//! 4. Install a Ctrl-C handler that raises the stop flag
//! 5. Run every game on a blocking task
//! 6. Save the Q-table and print the run summary

mod error;
mod human;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tradesim_core::config::{LoggingConfig, PolicyKind};
use tradesim_core::{
    QLearningPolicy, QTable, RuleBasedPolicy, RunSummary, SimulationConfig, run_games,
};
use tradesim_store::QTableStore;
use tradesim_types::CountryId;

use crate::error::EngineError;
use crate::human::HumanPolicy;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "TRADESIM_CONFIG";

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG: &str = "tradesim-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, a game fails, or the
/// Q-table cannot be written.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration. Logging is not up yet, so report the source after.
    let (config, config_source) = load_config().context("loading configuration")?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        source = %config_source,
        seed = config.world.seed,
        countries = config.world.country_count,
        games = config.simulation.games,
        turns_per_game = config.simulation.turns_per_game,
        policy = ?config.simulation.policy,
        "Configuration loaded"
    );

    // 3. Load the Q-table.
    let store = QTableStore::new(config.persistence.q_table_path.clone());
    let table = match config.simulation.policy {
        PolicyKind::RuleBased => QTable::new(),
        PolicyKind::QLearning | PolicyKind::Human => store.load(),
    };

    // 4. Stop cleanly on Ctrl-C.
    let stop = Arc::new(AtomicBool::new(false));
    let signal_stop = Arc::clone(&stop);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing current turn");
            signal_stop.store(true, Ordering::Relaxed);
        }
    });

    // 5. Run the games off the async runtime.
    let run_config = config.clone();
    let (summary, learned) =
        tokio::task::spawn_blocking(move || simulate(&run_config, table, &stop))
            .await
            .map_err(|e| EngineError::Task {
                message: format!("{e}"),
            })?
            .context("running games")?;

    // 6. Persist and report.
    if let Some(table) = learned {
        if config.persistence.save_on_exit {
            store
                .save(&table)
                .map_err(EngineError::from)
                .with_context(|| format!("saving Q-table to {}", store.path().display()))?;
        } else {
            info!(states = table.len(), "Q-table not saved (save_on_exit is off)");
        }
    }
    print_summary(&summary, config.logging.json)?;

    Ok(())
}

/// Play every game with the configured policy. Returns the learned table for
/// learning policies.
fn simulate(
    config: &SimulationConfig,
    table: QTable,
    stop: &AtomicBool,
) -> Result<(RunSummary, Option<QTable>), EngineError> {
    match config.simulation.policy {
        PolicyKind::RuleBased => {
            let mut policy = RuleBasedPolicy::new();
            let summary = run_games(config, &mut policy, stop)?;
            Ok((summary, None))
        }
        PolicyKind::QLearning => {
            let mut policy = QLearningPolicy::new(table, config.learning.clone());
            let summary = run_games(config, &mut policy, stop)?;
            Ok((summary, Some(policy.into_table())))
        }
        PolicyKind::Human => {
            let learner = QLearningPolicy::new(table, config.learning.clone());
            let mut policy = HumanPolicy::new(
                CountryId::new(config.simulation.human_country),
                std::io::stdin().lock(),
                std::io::stdout(),
                learner,
            );
            let summary = run_games(config, &mut policy, stop)?;
            Ok((summary, Some(policy.into_inner().into_table())))
        }
    }
}

/// Load configuration from `TRADESIM_CONFIG` or `tradesim-config.yaml`.
///
/// Falls back to defaults when the default file is absent. A file named
/// explicitly through the environment must exist.
fn load_config() -> Result<(SimulationConfig, String), EngineError> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(path);
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, path.display().to_string()));
    }

    let path = PathBuf::from(DEFAULT_CONFIG);
    if path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, path.display().to_string()))
    } else {
        let mut config = SimulationConfig::default();
        config.persistence.apply_env_overrides();
        Ok((config, "defaults".to_owned()))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Print the summary as text, or as one JSON line when JSON logging is on.
fn print_summary(summary: &RunSummary, json: bool) -> Result<(), EngineError> {
    if json {
        println!("{}", serde_json::to_string(summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}
