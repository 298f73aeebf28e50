use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{FeeSchedule, PriceScale};

#[derive(Debug, Error)]
pub enum CfgError {
    #[error("symbol must be non-empty")]
    EmptySymbol,
    #[error("tick and lot sizes must be positive")]
    BadScale,
    #[error("fee rates must be non-negative")]
    NegativeFee,
    #[error("L2 depth must be positive")]
    ZeroDepth,
}

/// Static parameters of the matching core for one instrument.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineCfg {
    pub symbol: String,
    pub scale: PriceScale,
    pub fees: FeeSchedule,
    /// Aggregated price levels per side in published L2 snapshots.
    pub depth: usize,
}

impl EngineCfg {
    pub fn validate(&self) -> Result<(), CfgError> {
        if self.symbol.is_empty() {
            return Err(CfgError::EmptySymbol);
        }
        if self.scale.tick_size <= Decimal::ZERO || self.scale.lot_size <= Decimal::ZERO {
            return Err(CfgError::BadScale);
        }
        if self.fees.maker_rate < Decimal::ZERO || self.fees.taker_rate < Decimal::ZERO {
            return Err(CfgError::NegativeFee);
        }
        if self.depth == 0 {
            return Err(CfgError::ZeroDepth);
        }
        Ok(())
    }
}
