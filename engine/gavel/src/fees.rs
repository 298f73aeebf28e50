use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Flat maker/taker schedule applied to executed value (price × quantity).
/// The engine only records fees on trade reports; settlement is external.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Charged to the resting side, which provided liquidity.
    pub maker_rate: Decimal,
    /// Charged to the aggressing side, which removed liquidity.
    pub taker_rate: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            maker_rate: Decimal::new(10, 4), // 0.10%
            taker_rate: Decimal::new(20, 4), // 0.20%
        }
    }
}

impl FeeSchedule {
    #[inline]
    pub fn maker_fee(&self, value: Decimal) -> Decimal {
        value * self.maker_rate
    }

    #[inline]
    pub fn taker_fee(&self, value: Decimal) -> Decimal {
        value * self.taker_rate
    }
}
