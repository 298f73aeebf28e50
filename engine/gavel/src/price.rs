use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Price, Qty};

#[derive(Debug, Error, PartialEq)]
pub enum ScaleError {
    #[error("price {0} is not a positive multiple of the tick size")]
    BadPrice(Decimal),
    #[error("quantity {0} is not a non-negative multiple of the lot size")]
    BadQuantity(Decimal),
}

/// Converts between external decimal prices/quantities and the integer
/// tick/lot multiples the book is keyed by. Decimal keys are never used
/// directly: equality on integers cannot drift.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PriceScale {
    pub tick_size: Decimal,
    pub lot_size: Decimal,
}

impl PriceScale {
    pub fn new(tick_size: Decimal, lot_size: Decimal) -> Self {
        Self { tick_size, lot_size }
    }

    /// Tick multiple for an external price. Fails for non-positive or
    /// misaligned values.
    pub fn price_ticks(&self, price: Decimal) -> Result<Price, ScaleError> {
        if price <= Decimal::ZERO {
            return Err(ScaleError::BadPrice(price));
        }
        Self::units(price, self.tick_size).ok_or(ScaleError::BadPrice(price))
    }

    /// Lot multiple for an external quantity. Zero is allowed: a
    /// zero-quantity order is a no-op in the core, not an ingress error.
    pub fn qty_lots(&self, qty: Decimal) -> Result<Qty, ScaleError> {
        if qty < Decimal::ZERO {
            return Err(ScaleError::BadQuantity(qty));
        }
        Self::units(qty, self.lot_size).ok_or(ScaleError::BadQuantity(qty))
    }

    fn units(value: Decimal, unit: Decimal) -> Option<u64> {
        if unit <= Decimal::ZERO {
            return None;
        }
        let units = value / unit;
        if !units.fract().is_zero() {
            return None;
        }
        units.to_u64()
    }

    #[inline]
    pub fn price(&self, ticks: Price) -> Decimal {
        Decimal::from(ticks) * self.tick_size
    }

    #[inline]
    pub fn qty(&self, lots: Qty) -> Decimal {
        Decimal::from(lots) * self.lot_size
    }

    /// Executed value of a fill: price × quantity in external units.
    #[inline]
    pub fn notional(&self, ticks: Price, lots: Qty) -> Decimal {
        self.price(ticks) * self.qty(lots)
    }
}
