//! Configuration loading and typed config structures for the Tradesim
//! simulation.
//!
//! The canonical configuration lives in `tradesim-config.yaml` at the project
//! root. Every section and field is optional; missing values fall back to the
//! defaults below, which reproduce the classic ten-country game.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tradesim_world::EconomyRules;

/// Environment variable that overrides `persistence.q_table_path`.
pub const Q_TABLE_ENV: &str = "TRADESIM_Q_TABLE";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The file parsed but describes a game that cannot be run.
    #[error("invalid config: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `tradesim-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World size and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Game count, turn count, and which policy drives the countries.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Costs, thresholds, and trade formulas.
    #[serde(default)]
    pub economy: EconomyRules,

    /// Perception score weights.
    #[serde(default)]
    pub perception: PerceptionConfig,

    /// Q-learning hyperparameters and reward weights.
    #[serde(default)]
    pub learning: LearningConfig,

    /// Where the Q-table lives between runs.
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `TRADESIM_Q_TABLE` overrides `persistence.q_table_path` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.persistence.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the simulation cannot run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_owned(),
            })
        };

        if self.world.country_count < 2 {
            return invalid("world.country_count must be at least 2");
        }
        if self.simulation.turns_per_game == 0 {
            return invalid("simulation.turns_per_game must be positive");
        }
        if self.simulation.max_actions_per_turn == 0 {
            return invalid("simulation.max_actions_per_turn must be positive");
        }
        if self.simulation.policy == PolicyKind::Human
            && self.simulation.human_country >= self.world.country_count
        {
            return invalid("simulation.human_country is not a country in this world");
        }
        if self.economy.power_thresholds.is_empty() || self.economy.max_connections.is_empty() {
            return invalid("economy thresholds and connection caps must be non-empty");
        }
        if self.economy.max_connections.len() < usize::from(self.economy.max_power_level()) {
            return invalid("economy.max_connections needs one cap per power level");
        }
        if self.perception.decay_denominator <= 0 {
            return invalid("perception.decay_denominator must be positive");
        }
        if self.learning.turn_buckets == 0 {
            return invalid("learning.turn_buckets must be positive");
        }
        let unit = 0.0..=1.0;
        if !unit.contains(&self.learning.alpha)
            || !unit.contains(&self.learning.gamma)
            || !unit.contains(&self.learning.epsilon)
            || !unit.contains(&self.learning.decay)
        {
            return invalid("learning rates and decay must lie in [0, 1]");
        }
        Ok(())
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of countries in every game.
    #[serde(default = "default_country_count")]
    pub country_count: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            country_count: default_country_count(),
        }
    }
}

/// Which policy decides for the countries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Fixed priority heuristic.
    RuleBased,
    /// Epsilon-greedy tabular Q-learning.
    #[default]
    QLearning,
    /// A person at the terminal plays one country; Q-learning plays the rest.
    Human,
}

/// Game count, length, and driver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Number of games to play in one run.
    #[serde(default = "default_games")]
    pub games: u32,

    /// Turns in each game.
    #[serde(default = "default_turns_per_game")]
    pub turns_per_game: u32,

    /// Upper bound on actions one country may take in one turn.
    #[serde(default = "default_max_actions_per_turn")]
    pub max_actions_per_turn: u32,

    /// Policy driving the countries.
    #[serde(default)]
    pub policy: PolicyKind,

    /// Country controlled by the human when `policy` is `human`.
    #[serde(default)]
    pub human_country: usize,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            games: default_games(),
            turns_per_game: default_turns_per_game(),
            max_actions_per_turn: default_max_actions_per_turn(),
            policy: PolicyKind::default(),
            human_country: 0,
        }
    }
}

/// Perception score weights. Scores are integers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PerceptionConfig {
    /// Scores are multiplied by `decay_numerator / decay_denominator` each turn.
    #[serde(default = "default_decay_numerator")]
    pub decay_numerator: i64,

    /// See `decay_numerator`.
    #[serde(default = "default_decay_denominator")]
    pub decay_denominator: i64,

    /// Per-level credit for an open inbound connection.
    #[serde(default = "default_inbound_per_level")]
    pub inbound_per_level: i64,

    /// Flat penalty for a blockaded inbound connection.
    #[serde(default = "default_inbound_blockaded_base")]
    pub inbound_blockaded_base: i64,

    /// Per-level penalty for a blockaded inbound connection.
    #[serde(default = "default_inbound_blockaded_per_level")]
    pub inbound_blockaded_per_level: i64,

    /// Flat credit for an open outgoing connection.
    #[serde(default = "default_outbound_base")]
    pub outbound_base: i64,

    /// Per-level credit for an open outgoing connection.
    #[serde(default = "default_outbound_per_level")]
    pub outbound_per_level: i64,

    /// Per-level credit for an outgoing connection the importer blockaded.
    #[serde(default = "default_outbound_blockaded_per_level")]
    pub outbound_blockaded_per_level: i64,

    /// Extra penalty when a score fell since the previous turn.
    #[serde(default = "default_momentum_penalty")]
    pub momentum_penalty: i64,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            decay_numerator: default_decay_numerator(),
            decay_denominator: default_decay_denominator(),
            inbound_per_level: default_inbound_per_level(),
            inbound_blockaded_base: default_inbound_blockaded_base(),
            inbound_blockaded_per_level: default_inbound_blockaded_per_level(),
            outbound_base: default_outbound_base(),
            outbound_per_level: default_outbound_per_level(),
            outbound_blockaded_per_level: default_outbound_blockaded_per_level(),
            momentum_penalty: default_momentum_penalty(),
        }
    }
}

/// How a learned policy resolves the counterpart of a targeted action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingMode {
    /// Perception-biased scoring.
    #[default]
    Heuristic,
    /// Uniformly random counterpart.
    Random,
}

/// Q-learning hyperparameters and reward weights.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LearningConfig {
    /// Initial learning rate.
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Discount factor.
    #[serde(default = "default_gamma")]
    pub gamma: f64,

    /// Initial exploration rate.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// Geometric decay applied to alpha and epsilon after each completed game.
    #[serde(default = "default_decay")]
    pub decay: f64,

    /// Lower bound for alpha.
    #[serde(default = "default_alpha_floor")]
    pub alpha_floor: f64,

    /// Lower bound for epsilon.
    #[serde(default = "default_epsilon_floor")]
    pub epsilon_floor: f64,

    /// Reward per unit change of potential income.
    #[serde(default = "default_income_weight")]
    pub income_weight: f64,

    /// Reward per connection gained.
    #[serde(default = "default_connection_weight")]
    pub connection_weight: f64,

    /// Reward per mine owned after the decision.
    #[serde(default = "default_mine_weight")]
    pub mine_weight: f64,

    /// Cap on the reserve-derived money level in the state key.
    #[serde(default = "default_money_levels")]
    pub money_levels: u8,

    /// Number of turn-progress buckets in the state key.
    #[serde(default = "default_turn_buckets")]
    pub turn_buckets: u32,

    /// How targeted actions pick their counterpart.
    #[serde(default)]
    pub targeting: TargetingMode,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            gamma: default_gamma(),
            epsilon: default_epsilon(),
            decay: default_decay(),
            alpha_floor: default_alpha_floor(),
            epsilon_floor: default_epsilon_floor(),
            income_weight: default_income_weight(),
            connection_weight: default_connection_weight(),
            mine_weight: default_mine_weight(),
            money_levels: default_money_levels(),
            turn_buckets: default_turn_buckets(),
            targeting: TargetingMode::default(),
        }
    }
}

/// Q-table location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// JSON file the table is loaded from and saved to.
    #[serde(default = "default_q_table_path")]
    pub q_table_path: PathBuf,

    /// Whether to write the table back after a run.
    #[serde(default = "default_true")]
    pub save_on_exit: bool,
}

impl PersistenceConfig {
    /// Override the table path with `TRADESIM_Q_TABLE` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(Q_TABLE_ENV) {
            self.q_table_path = PathBuf::from(val);
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            q_table_path: default_q_table_path(),
            save_on_exit: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_country_count() -> usize {
    10
}

const fn default_games() -> u32 {
    100
}

const fn default_turns_per_game() -> u32 {
    100
}

const fn default_max_actions_per_turn() -> u32 {
    64
}

const fn default_decay_numerator() -> i64 {
    9
}

const fn default_decay_denominator() -> i64 {
    10
}

const fn default_inbound_per_level() -> i64 {
    10
}

const fn default_inbound_blockaded_base() -> i64 {
    15
}

const fn default_inbound_blockaded_per_level() -> i64 {
    5
}

const fn default_outbound_base() -> i64 {
    10
}

const fn default_outbound_per_level() -> i64 {
    4
}

const fn default_outbound_blockaded_per_level() -> i64 {
    5
}

const fn default_momentum_penalty() -> i64 {
    10
}

const fn default_alpha() -> f64 {
    0.5
}

const fn default_gamma() -> f64 {
    0.7
}

const fn default_epsilon() -> f64 {
    0.3
}

const fn default_decay() -> f64 {
    0.99
}

const fn default_alpha_floor() -> f64 {
    0.01
}

const fn default_epsilon_floor() -> f64 {
    0.001
}

const fn default_income_weight() -> f64 {
    10.0
}

const fn default_connection_weight() -> f64 {
    7.0
}

const fn default_mine_weight() -> f64 {
    12.0
}

const fn default_money_levels() -> u8 {
    8
}

const fn default_turn_buckets() -> u32 {
    4
}

fn default_q_table_path() -> PathBuf {
    PathBuf::from("q_table.json")
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tradesim_world::BlockadeRule;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.country_count, 10);
        assert_eq!(config.simulation.turns_per_game, 100);
        assert_eq!(config.simulation.policy, PolicyKind::QLearning);
        assert_eq!(config.perception.decay_numerator, 9);
        assert_eq!(config.learning.money_levels, 8);
        assert_eq!(config.learning.targeting, TargetingMode::Heuristic);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
world:
  seed: 7
  country_count: 4

simulation:
  games: 3
  turns_per_game: 20
  max_actions_per_turn: 8
  policy: rule_based

economy:
  blockade_cost: 5
  blockade_rule: edge_flag

perception:
  momentum_penalty: 0

learning:
  alpha: 0.25
  epsilon: 0.0
  turn_buckets: 2
  targeting: random

persistence:
  q_table_path: tables/run.json
  save_on_exit: false

logging:
  level: debug
  json: true
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.country_count, 4);
        assert_eq!(config.simulation.games, 3);
        assert_eq!(config.simulation.policy, PolicyKind::RuleBased);
        assert_eq!(config.economy.blockade_cost, 5);
        assert_eq!(config.economy.blockade_rule, BlockadeRule::EdgeFlag);
        assert_eq!(config.economy.mine_cost, 7);
        assert_eq!(config.perception.momentum_penalty, 0);
        assert_eq!(config.perception.inbound_per_level, 10);
        assert_eq!(config.learning.turn_buckets, 2);
        assert_eq!(config.learning.targeting, TargetingMode::Random);
        assert!(!config.persistence.save_on_exit);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config =
            SimulationConfig::parse(include_str!("../../../tradesim-config.yaml")).unwrap();
        assert_eq!(config.world, WorldConfig::default());
        assert_eq!(config.simulation, SimulationBoundsConfig::default());
        assert_eq!(config.economy, EconomyRules::default());
        assert_eq!(config.perception, PerceptionConfig::default());
        assert_eq!(config.learning, LearningConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn empty_yaml_uses_defaults() {
        let config = SimulationConfig::parse("{}").unwrap();
        assert_eq!(config.world, WorldConfig::default());
        assert_eq!(config.simulation, SimulationBoundsConfig::default());
        assert_eq!(config.economy, EconomyRules::default());
    }

    #[test]
    fn rejects_single_country_world() {
        let result = SimulationConfig::parse("world:\n  country_count: 1\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_out_of_range_learning_rate() {
        let result = SimulationConfig::parse("learning:\n  epsilon: 1.5\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_missing_connection_caps() {
        let yaml = "economy:\n  power_thresholds: [0, 5, 10, 16]\n  max_connections: [0, 1, 3]\n";
        let result = SimulationConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));

        let yaml = "economy:\n  power_thresholds: [0, 5, 10]\n  max_connections: [0, 1, 3]\n";
        assert!(SimulationConfig::parse(yaml).is_ok());
    }

    #[test]
    fn rejects_human_outside_world() {
        let yaml = "world:\n  country_count: 3\nsimulation:\n  policy: human\n  human_country: 3\n";
        let result = SimulationConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let result = SimulationConfig::parse("world: [unterminated");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn from_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tradesim-config.yaml");
        std::fs::write(&path, "world:\n  seed: 99\n").unwrap();
        let config = SimulationConfig::from_file(&path).unwrap();
        assert_eq!(config.world.seed, 99);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/tradesim.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
