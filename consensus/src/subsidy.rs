//! Block subsidy: the coinbase reward created at each height, halving every
//! `subsidy_interval` blocks.

use crate::error::SubsidyError;
use crate::settings::Settings;

/// `subsidy(height) = initial_subsidy >> (height / subsidy_interval)`, zero
/// once the shift reaches or exceeds 64 (the subsidy has gone to zero).
pub fn subsidy(height: u64, settings: &Settings) -> Result<u64, SubsidyError> {
    let halvings = height / settings.subsidy_interval;
    if halvings >= 64 {
        return Ok(0);
    }
    Ok(settings.initial_block_subsidy_satoshi >> halvings)
}

/// `reward(height) = subsidy(height) + fees`.
pub fn reward(height: u64, fees: u64, settings: &Settings) -> Result<u64, SubsidyError> {
    subsidy(height, settings)?
        .checked_add(fees)
        .ok_or(SubsidyError::Overflow)
}
