//! Tunable economy constants.
//!
//! Every cost, threshold, and cap the economic engine consults lives in
//! [`EconomyRules`]. The defaults are the canonical rule set; the `economy`
//! section of `tradesim-config.yaml` deserializes straight into this struct so
//! any value can be overridden per experiment.

use serde::{Deserialize, Serialize};

/// How income computation decides whether an edge is blockaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockadeRule {
    /// The edge exporter->importer is blockaded when the importer owns a
    /// return edge importer->exporter flagged as blockaded.
    #[default]
    Reciprocal,
    /// The edge is blockaded when its own flag is set.
    EdgeFlag,
}

/// Costs, thresholds, and caps of the economy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyRules {
    /// Minimum `towns + markets` for each power level, ascending.
    /// Level `n` is reached when the `n`-th threshold is met.
    #[serde(default = "default_power_thresholds")]
    pub power_thresholds: Vec<u32>,

    /// Maximum outgoing connections per power level (index 0 is level 1).
    #[serde(default = "default_max_connections")]
    pub max_connections: Vec<usize>,

    /// Cost of a country's first mine.
    #[serde(default = "default_first_mine_cost")]
    pub first_mine_cost: i64,

    /// Cost of every mine after the first.
    #[serde(default = "default_mine_cost")]
    pub mine_cost: i64,

    /// Cost of a country's first connection purchase ever.
    #[serde(default = "default_first_connection_cost")]
    pub first_connection_cost: i64,

    /// Connection price per level of the resulting edge.
    #[serde(default = "default_connection_cost_per_level")]
    pub connection_cost_per_level: i64,

    /// Cost of blockading one inbound edge.
    #[serde(default = "default_blockade_cost")]
    pub blockade_cost: i64,

    /// Reserve credited to the importer on every successful purchase.
    #[serde(default = "default_importer_bonus")]
    pub importer_bonus: i64,

    /// Markets credited to the importer on every successful purchase.
    #[serde(default = "default_importer_market_bonus")]
    pub importer_market_bonus: u32,

    /// Divisor base for the importer-size term of trade income:
    /// `(towns + markets) / max(1, trade_divisor_base - level)`.
    #[serde(default = "default_trade_divisor_base")]
    pub trade_divisor_base: i64,

    /// Per-level bonus that makes higher-level edges less likely to be
    /// dropped by the heuristic removal.
    #[serde(default = "default_retention_bonus_per_level")]
    pub retention_bonus_per_level: i64,

    /// Which edge flag suspends trade income.
    #[serde(default)]
    pub blockade_rule: BlockadeRule,
}

impl Default for EconomyRules {
    fn default() -> Self {
        Self {
            power_thresholds: default_power_thresholds(),
            max_connections: default_max_connections(),
            first_mine_cost: default_first_mine_cost(),
            mine_cost: default_mine_cost(),
            first_connection_cost: default_first_connection_cost(),
            connection_cost_per_level: default_connection_cost_per_level(),
            blockade_cost: default_blockade_cost(),
            importer_bonus: default_importer_bonus(),
            importer_market_bonus: default_importer_market_bonus(),
            trade_divisor_base: default_trade_divisor_base(),
            retention_bonus_per_level: default_retention_bonus_per_level(),
            blockade_rule: BlockadeRule::default(),
        }
    }
}

impl EconomyRules {
    /// Power level reached by a country with `size = towns + markets`.
    ///
    /// Counts the thresholds not exceeding `size`. Never returns less than 1,
    /// so a misconfigured first threshold cannot produce level 0.
    pub fn power_level_for(&self, size: u32) -> u8 {
        let met = self
            .power_thresholds
            .iter()
            .filter(|&&threshold| threshold <= size)
            .count();
        u8::try_from(met).unwrap_or(u8::MAX).max(1)
    }

    /// Highest power level the thresholds define.
    pub fn max_power_level(&self) -> u8 {
        u8::try_from(self.power_thresholds.len())
            .unwrap_or(u8::MAX)
            .max(1)
    }

    /// Connection cap at `power_level`. Levels beyond the table use its last entry.
    pub fn connection_cap(&self, power_level: u8) -> usize {
        let slot = usize::from(power_level.saturating_sub(1));
        self.max_connections
            .get(slot)
            .or_else(|| self.max_connections.last())
            .copied()
            .unwrap_or(0)
    }

    /// Price of the next mine for a country that already owns `mines`.
    pub const fn next_mine_cost(&self, mines: u32) -> i64 {
        if mines == 0 {
            self.first_mine_cost
        } else {
            self.mine_cost
        }
    }

    /// Price of a connection purchase producing an edge at `new_level`.
    ///
    /// `purchased_before` counts the purchaser's earlier successful purchases;
    /// the very first one is flat-priced.
    pub fn connection_cost(&self, purchased_before: u32, new_level: u8) -> i64 {
        if purchased_before == 0 {
            self.first_connection_cost
        } else {
            self.connection_cost_per_level
                .saturating_mul(i64::from(new_level))
        }
    }

    /// Divisor applied to the importer's size for an edge at `level`.
    pub fn trade_divisor(&self, level: u8) -> i64 {
        self.trade_divisor_base
            .saturating_sub(i64::from(level))
            .max(1)
    }

    /// Cheapest purchase available to a country: the turn loop keeps going
    /// only while the reserve covers this amount.
    pub fn cheapest_purchase(&self, power_level: u8, mines: u32) -> i64 {
        i64::from(power_level)
            .min(self.next_mine_cost(mines))
            .min(self.blockade_cost)
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_power_thresholds() -> Vec<u32> {
    vec![0, 5, 10, 16]
}

fn default_max_connections() -> Vec<usize> {
    vec![0, 1, 3, 5]
}

const fn default_first_mine_cost() -> i64 {
    3
}

const fn default_mine_cost() -> i64 {
    7
}

const fn default_first_connection_cost() -> i64 {
    3
}

const fn default_connection_cost_per_level() -> i64 {
    6
}

const fn default_blockade_cost() -> i64 {
    3
}

const fn default_importer_bonus() -> i64 {
    3
}

const fn default_importer_market_bonus() -> u32 {
    1
}

const fn default_trade_divisor_base() -> i64 {
    6
}

const fn default_retention_bonus_per_level() -> i64 {
    3
}
