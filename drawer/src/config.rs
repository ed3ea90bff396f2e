//! Drawer configuration.

use std::collections::BTreeMap;
use std::str::FromStr;

use nibor_common::{Tenor, DISPLAY_DECIMALS};
use nibor_recon::{ReconEngineConfig, DEFAULT_TOLERANCE, WEIGHT_SUM_TOLERANCE};
use rust_decimal::Decimal;

/// Highest number of display decimals accepted.
const MAX_DISPLAY_DECIMALS: u32 = 10;

/// Main drawer configuration.
#[derive(Debug, Clone)]
pub struct DrawerConfig {
    /// Tolerance of the final-rate criterion.
    pub default_tolerance: Decimal,
    /// Allowed deviation of a complete weight set from 1.
    pub weight_sum_tolerance: Decimal,
    /// Decimals shown for rates.
    pub display_decimals: u32,
    /// Funding spread per tenor.
    pub spreads: BTreeMap<Tenor, Decimal>,
    /// Tenors that must match before the fixing can be confirmed.
    pub confirm_tenors: Vec<Tenor>,
    /// Log level.
    pub log_level: String,
}

impl Default for DrawerConfig {
    fn default() -> Self {
        Self {
            default_tolerance: DEFAULT_TOLERANCE,
            weight_sum_tolerance: WEIGHT_SUM_TOLERANCE,
            display_decimals: DISPLAY_DECIMALS,
            spreads: Tenor::ALL.iter().map(|t| (*t, t.default_spread())).collect(),
            confirm_tenors: Tenor::CONFIRM_SET.to_vec(),
            log_level: "info".to_string(),
        }
    }
}

impl DrawerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(tolerance) = std::env::var("NIBOR_DEFAULT_TOLERANCE") {
            if let Ok(tolerance) = Decimal::from_str(tolerance.trim()) {
                config.default_tolerance = tolerance;
            }
        }

        if let Ok(decimals) = std::env::var("NIBOR_DISPLAY_DECIMALS") {
            if let Ok(decimals) = decimals.trim().parse() {
                config.display_decimals = decimals;
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Spread for a tenor, falling back to the tenor default.
    pub fn spread(&self, tenor: Tenor) -> Decimal {
        self.spreads
            .get(&tenor)
            .copied()
            .unwrap_or_else(|| tenor.default_spread())
    }

    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> ReconEngineConfig {
        ReconEngineConfig {
            default_tolerance: self.default_tolerance,
            weight_sum_tolerance: self.weight_sum_tolerance,
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_tolerance < Decimal::ZERO {
            return Err("Default tolerance cannot be negative".to_string());
        }

        if self.weight_sum_tolerance < Decimal::ZERO {
            return Err("Weight sum tolerance cannot be negative".to_string());
        }

        if self.display_decimals > MAX_DISPLAY_DECIMALS {
            return Err(format!(
                "Display decimals cannot exceed {}",
                MAX_DISPLAY_DECIMALS
            ));
        }

        if self.confirm_tenors.is_empty() {
            return Err("Confirm tenors cannot be empty".to_string());
        }

        Ok(())
    }
}
