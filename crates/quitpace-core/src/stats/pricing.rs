//! Unit prices used to value avoided uses.

use serde::{Deserialize, Serialize};

use crate::usage::UsageKind;

pub const CIGARETTES_PER_PACK: f64 = 20.0;
pub const DEFAULT_PACK_PRICE: f64 = 8.0;
pub const DEFAULT_VAPE_PRICE: f64 = 15.0;

/// Price of a single use of each kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub cigarette_unit: f64,
    pub vape_unit: f64,
}

impl Pricing {
    /// Derive unit prices from a pack-of-20 price and a pod price.
    ///
    /// Non-finite or negative prices fall back to the defaults.
    pub fn from_prices(pack_price: f64, vape_price: f64) -> Self {
        let pack = sanitize(pack_price, DEFAULT_PACK_PRICE);
        let pod = sanitize(vape_price, DEFAULT_VAPE_PRICE);
        Self {
            cigarette_unit: pack / CIGARETTES_PER_PACK,
            vape_unit: pod,
        }
    }

    pub fn unit_price(&self, kind: UsageKind) -> f64 {
        match kind {
            UsageKind::Cigarette => self.cigarette_unit,
            UsageKind::Vape => self.vape_unit,
        }
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self::from_prices(DEFAULT_PACK_PRICE, DEFAULT_VAPE_PRICE)
    }
}

fn sanitize(price: f64, fallback: f64) -> f64 {
    if price.is_finite() && price >= 0.0 {
        price
    } else {
        fallback
    }
}

/// Round a currency amount to cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
