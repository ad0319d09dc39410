//! Stock gating: the quantity ceiling for a cart line.
//!
//! The ceiling combines absolute variant inventory with the shared
//! flash-sale allotment when a flash price is in effect. This is a soft,
//! client-side bound for UX only; the checkout service re-validates
//! authoritatively and nothing here mutates `remaining_quantity`.

use crate::catalog::Variant;
use crate::error::EngineError;
use crate::ids::VariantId;
use crate::pricing::{PriceOrigin, ResolvedPrice};
use serde::{Deserialize, Serialize};

/// Quantity ceiling for one variant under its resolved price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockGate {
    variant_id: VariantId,
    stock: i64,
    /// Shared campaign allotment; `Some` only when a flash price applies.
    flash_remaining: Option<i64>,
}

impl StockGate {
    /// Build the gate for a variant priced by [`resolve_price`].
    ///
    /// When the resolved origin is flash-sale but the remaining allotment is
    /// unknown (stale registry), the gate fails closed and treats it as 0.
    ///
    /// [`resolve_price`]: crate::pricing::resolve_price
    pub fn for_resolved(variant: &Variant, resolved: &ResolvedPrice) -> Self {
        let flash_remaining = match resolved.origin {
            PriceOrigin::FlashSale => Some(resolved.flash_remaining.unwrap_or(0).max(0)),
            _ => None,
        };
        Self {
            variant_id: variant.id.clone(),
            stock: variant.stock.max(0),
            flash_remaining,
        }
    }

    /// Build a gate bounded by inventory only (no flash price in effect,
    /// or the campaign that priced a line has since ended).
    pub fn stock_only(variant: &Variant) -> Self {
        Self {
            variant_id: variant.id.clone(),
            stock: variant.stock.max(0),
            flash_remaining: None,
        }
    }

    /// A gate that admits nothing, for fail-closed paths.
    pub fn closed(variant_id: VariantId) -> Self {
        Self {
            variant_id,
            stock: 0,
            flash_remaining: Some(0),
        }
    }

    /// The quantity ceiling: `min(stock, remaining)` under a flash price,
    /// plain stock otherwise.
    pub fn max_allowed(&self) -> i64 {
        match self.flash_remaining {
            Some(remaining) => self.stock.min(remaining),
            None => self.stock,
        }
        .max(0)
    }

    /// Check if one more unit fits under the ceiling.
    pub fn can_increment(&self, current_quantity: i64) -> bool {
        current_quantity < self.max_allowed()
    }

    /// Clamp a requested quantity into `[1, max_allowed]`.
    ///
    /// A ceiling of zero is out-of-stock and surfaced as an error, never
    /// silently clamped to a nonzero value.
    pub fn clamp(&self, requested: i64) -> Result<i64, EngineError> {
        let max = self.max_allowed();
        if max == 0 {
            return Err(EngineError::OutOfStock {
                variant_id: self.variant_id.to_string(),
                requested,
                available: 0,
            });
        }
        Ok(requested.clamp(1, max))
    }

    /// Check that a requested quantity fits without clamping, naming the
    /// binding constraint on rejection.
    pub fn admit(&self, requested: i64) -> Result<(), EngineError> {
        if requested <= 0 {
            return Err(EngineError::InvalidQuantity(requested));
        }
        let max = self.max_allowed();
        if requested <= max {
            return Ok(());
        }
        match self.flash_remaining {
            // The shared allotment binds before plain inventory does.
            Some(remaining) if remaining <= self.stock && remaining > 0 => {
                Err(EngineError::FlashSaleLimitReached {
                    variant_id: self.variant_id.to_string(),
                    requested,
                    remaining,
                })
            }
            _ => Err(EngineError::OutOfStock {
                variant_id: self.variant_id.to_string(),
                requested,
                available: max,
            }),
        }
    }
}
