//! Network-parameter configuration consumed by `accept`.
//!
//! This crate only defines the shape: it is the host's job to deserialize a
//! `Settings` value from its own config file and pass it in.

use serde::Deserialize;

use crate::error::ConfigError;

/// Consensus parameters that vary across networks or deployments, but are
/// otherwise static inputs to validation (as opposed to `ChainState`, which
/// varies per block).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max_money: u64,
    pub subsidy_interval: u64,
    pub initial_block_subsidy_satoshi: u64,
    pub timestamp_limit_seconds: u32,
    pub proof_of_work_limit: u32,
    pub use_scrypt: bool,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            max_money: 21_000_000 * 100_000_000,
            subsidy_interval: 210_000,
            initial_block_subsidy_satoshi: 5_000_000_000,
            timestamp_limit_seconds: 7_200,
            proof_of_work_limit: 0x1d00ffff,
            use_scrypt: false,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subsidy_interval == 0 {
            return Err(ConfigError::ZeroSubsidyInterval);
        }
        if self.initial_block_subsidy_satoshi > self.max_money {
            return Err(ConfigError::SubsidyExceedsMaxMoney);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_validate() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn zero_subsidy_interval_is_invalid() {
        let settings = Settings { subsidy_interval: 0, ..Settings::default() };
        assert_eq!(settings.validate(), Err(ConfigError::ZeroSubsidyInterval));
    }
}
