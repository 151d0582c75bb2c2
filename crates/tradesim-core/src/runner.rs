//! Multi-game driver.
//!
//! [`run_games`] plays `simulation.games` games of `simulation.turns_per_game`
//! turns each. The world is rebuilt from scratch for every game; the policy
//! (and with it any learned table) persists across games and is told when
//! each game completes so it can decay its rates.
//!
//! A shared stop flag is checked between turns. Setting it ends the run
//! cleanly: the current game is abandoned, and the statistics gathered so far
//! are still returned.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{info, warn};
use tradesim_world::World;
use uuid::Uuid;

use crate::config::SimulationConfig;
use crate::policy::Policy;
use crate::turn::{self, TurnError, TurnSettings};

/// Errors that can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A turn failed.
    #[error("turn error: {source}")]
    Turn {
        /// The underlying turn error.
        #[from]
        source: TurnError,
    },
}

/// Aggregate statistics for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run ended.
    pub finished_at: DateTime<Utc>,
    /// Games played to their last turn.
    pub games_completed: u32,
    /// Whether the stop flag ended the run early.
    pub interrupted: bool,
    /// Largest reserve held by any country at the end of a game.
    pub highest_reserve: i64,
    /// Largest lifetime earnings of any country at the end of a game.
    pub highest_lifetime_earnings: i64,
    /// Largest income collected by one country in one turn.
    pub highest_turn_income: i64,
    /// Mean reserve of every country at the end of every completed game.
    pub average_final_reserve: f64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run {}", self.run_id)?;
        writeln!(
            f,
            "  games completed:       {}{}",
            self.games_completed,
            if self.interrupted { " (interrupted)" } else { "" }
        )?;
        writeln!(f, "  highest reserve:       {}", self.highest_reserve)?;
        writeln!(f, "  highest lifetime:      {}", self.highest_lifetime_earnings)?;
        writeln!(f, "  highest turn income:   {}", self.highest_turn_income)?;
        write!(f, "  average final reserve: {:.2}", self.average_final_reserve)
    }
}

/// Running totals across games.
#[derive(Debug, Default)]
struct Tally {
    games_completed: u32,
    highest_reserve: i64,
    highest_lifetime_earnings: i64,
    highest_turn_income: i64,
    final_reserve_sum: i64,
    final_reserve_count: u32,
}

impl Tally {
    fn record_standings(&mut self, world: &World) {
        for country in world.countries() {
            self.highest_reserve = self.highest_reserve.max(country.reserve);
            self.highest_lifetime_earnings =
                self.highest_lifetime_earnings.max(country.lifetime_earnings);
        }
    }

    fn record_final(&mut self, world: &World) {
        self.record_standings(world);
        for country in world.countries() {
            self.final_reserve_sum = self.final_reserve_sum.saturating_add(country.reserve);
            self.final_reserve_count = self.final_reserve_count.saturating_add(1);
        }
        self.games_completed = self.games_completed.saturating_add(1);
    }

    // Reserve sums stay far below 2^53.
    #[allow(clippy::cast_precision_loss)]
    fn average_final_reserve(&self) -> f64 {
        if self.final_reserve_count == 0 {
            return 0.0;
        }
        self.final_reserve_sum as f64 / f64::from(self.final_reserve_count)
    }
}

/// Play every configured game with `policy`.
///
/// # Errors
///
/// Returns [`RunnerError`] if a turn fails.
pub fn run_games(
    config: &SimulationConfig,
    policy: &mut dyn Policy,
    stop: &AtomicBool,
) -> Result<RunSummary, RunnerError> {
    let run_id = Uuid::now_v7();
    let started_at = Utc::now();
    let mut rng = StdRng::seed_from_u64(config.world.seed);
    let settings = TurnSettings {
        turns_per_game: config.simulation.turns_per_game,
        max_actions_per_turn: config.simulation.max_actions_per_turn,
    };
    let mut tally = Tally::default();
    let mut interrupted = false;

    info!(
        %run_id,
        policy = policy.name(),
        games = config.simulation.games,
        turns = settings.turns_per_game,
        countries = config.world.country_count,
        seed = config.world.seed,
        "Run starting"
    );

    'games: for game in 0..config.simulation.games {
        let mut world = World::new(config.world.country_count, config.economy.clone());

        for turn in 0..settings.turns_per_game {
            if stop.load(Ordering::Relaxed) {
                warn!(game, turn, "Stop requested, abandoning game");
                tally.record_standings(&world);
                interrupted = true;
                break 'games;
            }
            let report = turn::run_turn(
                &mut world,
                policy,
                turn,
                settings,
                &config.perception,
                &mut rng,
            )?;
            if let Some(income) = report.highest_income() {
                tally.highest_turn_income = tally.highest_turn_income.max(income);
            }
        }

        tally.record_final(&world);
        policy.end_game();
        info!(
            game,
            highest_reserve = world.countries().iter().map(|c| c.reserve).max(),
            "Game complete"
        );
    }

    let summary = RunSummary {
        run_id,
        started_at,
        finished_at: Utc::now(),
        games_completed: tally.games_completed,
        interrupted,
        highest_reserve: tally.highest_reserve,
        highest_lifetime_earnings: tally.highest_lifetime_earnings,
        highest_turn_income: tally.highest_turn_income,
        average_final_reserve: tally.average_final_reserve(),
    };

    info!(
        %run_id,
        games_completed = summary.games_completed,
        interrupted,
        highest_reserve = summary.highest_reserve,
        highest_lifetime_earnings = summary.highest_lifetime_earnings,
        highest_turn_income = summary.highest_turn_income,
        average_final_reserve = summary.average_final_reserve,
        "Run finished"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::PolicyKind;
    use crate::policy::RuleBasedPolicy;

    fn small_config(games: u32) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.world.country_count = 4;
        config.simulation.games = games;
        config.simulation.turns_per_game = 20;
        config.simulation.policy = PolicyKind::RuleBased;
        config
    }

    #[test]
    fn completes_every_game() {
        let config = small_config(3);
        let mut policy = RuleBasedPolicy::new();
        let stop = AtomicBool::new(false);
        let summary = run_games(&config, &mut policy, &stop).unwrap();
        assert_eq!(summary.games_completed, 3);
        assert!(!summary.interrupted);
        assert!(summary.highest_lifetime_earnings >= summary.highest_reserve);
        assert!(summary.highest_turn_income > 0);
        assert!(summary.finished_at >= summary.started_at);
    }

    #[test]
    fn stop_flag_interrupts_cleanly() {
        let config = small_config(3);
        let mut policy = RuleBasedPolicy::new();
        let stop = AtomicBool::new(true);
        let summary = run_games(&config, &mut policy, &stop).unwrap();
        assert_eq!(summary.games_completed, 0);
        assert!(summary.interrupted);
        assert!(summary.average_final_reserve.abs() < f64::EPSILON);
    }

    #[test]
    fn summary_display_mentions_interruption() {
        let config = small_config(1);
        let mut policy = RuleBasedPolicy::new();
        let stop = AtomicBool::new(true);
        let summary = run_games(&config, &mut policy, &stop).unwrap();
        assert!(summary.to_string().contains("(interrupted)"));
    }
}
