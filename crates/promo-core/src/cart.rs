//! Cart aggregation: lines keyed by `(product, variant)` with add-time
//! captured prices.
//!
//! A line's unit price is captured at the moment of addition and never
//! rewritten by later resolutions; a campaign ending after add-time does not
//! retroactively change an already-added line. Quantity mutations go through
//! a [`StockGate`] supplied by the caller, built from current snapshot state.

use crate::error::EngineError;
use crate::ids::{ProductId, VariantId};
use crate::money::Money;
use crate::pricing::PriceOrigin;
use crate::stock::StockGate;
use serde::{Deserialize, Serialize};

/// Cart line identity: one logical item per `(product, variant)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: ProductId,
    pub variant_id: VariantId,
}

impl LineKey {
    pub fn new(product_id: impl Into<ProductId>, variant_id: impl Into<VariantId>) -> Self {
        Self {
            product_id: product_id.into(),
            variant_id: variant_id.into(),
        }
    }
}

/// Denormalized display data carried on a line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LineMeta {
    /// Product name at add time.
    pub product_name: String,
    /// Variant label (e.g., "L / Black").
    pub variant_label: Option<String>,
    /// Thumbnail URL.
    pub image_url: Option<String>,
}

impl LineMeta {
    pub fn named(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            variant_label: None,
            image_url: None,
        }
    }
}

/// One cart line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Product being purchased.
    pub product_id: ProductId,
    /// Exact variant being purchased.
    pub variant_id: VariantId,
    /// Units, always >= 1.
    pub quantity: i64,
    /// Price captured at add time; never live.
    pub unit_price: Money,
    /// Where the captured price came from, kept so quantity updates can
    /// re-evaluate the right gate context.
    pub origin: PriceOrigin,
    /// Display data.
    pub meta: LineMeta,
}

impl CartLine {
    /// This line's identity key.
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            variant_id: self.variant_id.clone(),
        }
    }

    /// `unit_price * quantity`, checked.
    pub fn line_total(&self) -> Result<Money, EngineError> {
        self.unit_price
            .try_multiply(self.quantity)
            .ok_or(EngineError::Overflow)
    }
}

/// Aggregate totals, always recomputed from the lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartTotals {
    /// Sum of line quantities.
    pub total_quantity: i64,
    /// Sum of captured line totals, before any voucher.
    pub total_amount: Money,
}

impl CartTotals {
    /// Final payable amount after a voucher discount, floored at zero.
    pub fn payable(&self, voucher_discount: Money) -> Money {
        self.total_amount.saturating_sub_floor_zero(voucher_discount)
    }
}

/// An ordered collection of cart lines, one per `(product, variant)`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Find a line by key.
    pub fn line(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|l| l.product_id == key.product_id && l.variant_id == key.variant_id)
    }

    /// Current quantity for a key, 0 when absent.
    pub fn quantity_of(&self, key: &LineKey) -> i64 {
        self.line(key).map(|l| l.quantity).unwrap_or(0)
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Add units of a variant.
    ///
    /// If a line with the same key exists the quantities merge and the
    /// existing line's captured price is preserved; `unit_price` only
    /// applies when a new line is appended. The merged or new quantity is
    /// clamped by `gate`; a zero ceiling fails with `OutOfStock`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_line(
        &mut self,
        product_id: ProductId,
        variant_id: VariantId,
        quantity: i64,
        unit_price: Money,
        origin: PriceOrigin,
        meta: LineMeta,
        gate: &StockGate,
    ) -> Result<(), EngineError> {
        if quantity <= 0 {
            return Err(EngineError::InvalidQuantity(quantity));
        }

        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id && l.variant_id == variant_id)
        {
            let requested = existing
                .quantity
                .checked_add(quantity)
                .ok_or(EngineError::Overflow)?;
            // Merging never rewrites the captured price.
            existing.quantity = gate.clamp(requested)?;
            return Ok(());
        }

        let clamped = gate.clamp(quantity)?;
        self.lines.push(CartLine {
            product_id,
            variant_id,
            quantity: clamped,
            unit_price,
            origin,
            meta,
        });
        Ok(())
    }

    /// Set a line's quantity, clamped by `gate`. A quantity <= 0 removes the
    /// line. Returns `false` when no line matches the key.
    pub fn update_quantity(
        &mut self,
        key: &LineKey,
        quantity: i64,
        gate: &StockGate,
    ) -> Result<bool, EngineError> {
        if quantity <= 0 {
            return Ok(self.remove_line(key));
        }
        match self
            .lines
            .iter_mut()
            .find(|l| l.product_id == key.product_id && l.variant_id == key.variant_id)
        {
            Some(line) => {
                line.quantity = gate.clamp(quantity)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove a line. Returns whether anything was removed.
    pub fn remove_line(&mut self, key: &LineKey) -> bool {
        let len_before = self.lines.len();
        self.lines
            .retain(|l| !(l.product_id == key.product_id && l.variant_id == key.variant_id));
        self.lines.len() < len_before
    }

    /// Drop every line. Called by the order flow on success only.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Recompute aggregate totals from the lines.
    pub fn totals(&self) -> Result<CartTotals, EngineError> {
        let total_quantity = self.lines.iter().map(|l| l.quantity).sum();
        let line_totals = self
            .lines
            .iter()
            .map(|l| l.line_total())
            .collect::<Result<Vec<_>, _>>()?;
        let total_amount = Money::try_sum(line_totals.iter()).ok_or(EngineError::Overflow)?;
        Ok(CartTotals {
            total_quantity,
            total_amount,
        })
    }

    /// Merge another cart snapshot into this one (cross-tab reconciliation).
    ///
    /// Idempotent on `(product, variant)`: the same logical item from two
    /// tabs lands on one line. Quantities add saturating; this cart's
    /// captured price wins for lines present on both sides. Gating against
    /// current stock happens on the next quantity mutation.
    pub fn merge(&mut self, other: Cart) {
        for line in other.lines {
            if let Some(existing) = self
                .lines
                .iter_mut()
                .find(|l| l.product_id == line.product_id && l.variant_id == line.variant_id)
            {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            } else {
                self.lines.push(line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_gate() -> StockGate {
        let variant = crate::catalog::Variant::new("var-1", Money::new(1_000), 99);
        StockGate::stock_only(&variant)
    }

    fn add_one(cart: &mut Cart, unit_price: i64) {
        cart.add_line(
            ProductId::new("prod-1"),
            VariantId::new("var-1"),
            1,
            Money::new(unit_price),
            PriceOrigin::List,
            LineMeta::named("Tee"),
            &open_gate(),
        )
        .unwrap();
    }

    #[test]
    fn test_add_merges_by_key() {
        let mut cart = Cart::new();
        add_one(&mut cart, 1_000);
        add_one(&mut cart, 1_000);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.totals().unwrap().total_quantity, 2);
    }

    #[test]
    fn test_merge_preserves_captured_price() {
        let mut cart = Cart::new();
        add_one(&mut cart, 400_000);
        // Campaign ended; a re-add resolves to a higher price, but the
        // existing line keeps what was captured.
        add_one(&mut cart, 500_000);

        let line = cart.lines().first().unwrap();
        assert_eq!(line.unit_price, Money::new(400_000));
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_distinct_variants_make_distinct_lines() {
        let mut cart = Cart::new();
        add_one(&mut cart, 1_000);
        cart.add_line(
            ProductId::new("prod-1"),
            VariantId::new("var-2"),
            1,
            Money::new(2_000),
            PriceOrigin::List,
            LineMeta::named("Tee"),
            &open_gate(),
        )
        .unwrap();

        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_totals_recomputed() {
        let mut cart = Cart::new();
        cart.add_line(
            ProductId::new("prod-1"),
            VariantId::new("var-1"),
            2,
            Money::new(400_000),
            PriceOrigin::FlashSale,
            LineMeta::named("Tee"),
            &open_gate(),
        )
        .unwrap();
        cart.add_line(
            ProductId::new("prod-2"),
            VariantId::new("var-9"),
            1,
            Money::new(250_000),
            PriceOrigin::EverydaySale,
            LineMeta::named("Cap"),
            &open_gate(),
        )
        .unwrap();

        let totals = cart.totals().unwrap();
        assert_eq!(totals.total_quantity, 3);
        assert_eq!(totals.total_amount, Money::new(1_050_000));
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::new();
        add_one(&mut cart, 1_000);
        let key = LineKey::new("prod-1", "var-1");

        assert!(cart.update_quantity(&key, 0, &open_gate()).unwrap());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_clamps() {
        let mut cart = Cart::new();
        add_one(&mut cart, 1_000);
        let key = LineKey::new("prod-1", "var-1");
        let variant = crate::catalog::Variant::new("var-1", Money::new(1_000), 3);

        cart.update_quantity(&key, 10, &StockGate::stock_only(&variant))
            .unwrap();
        assert_eq!(cart.quantity_of(&key), 3);
    }

    #[test]
    fn test_update_missing_line() {
        let mut cart = Cart::new();
        let key = LineKey::new("prod-x", "var-x");
        assert!(!cart.update_quantity(&key, 2, &open_gate()).unwrap());
    }

    #[test]
    fn test_payable_floors_at_zero() {
        let totals = CartTotals {
            total_quantity: 1,
            total_amount: Money::new(80_000),
        };
        assert_eq!(totals.payable(Money::new(100_000)), Money::zero());
        assert_eq!(totals.payable(Money::new(30_000)), Money::new(50_000));
    }

    #[test]
    fn test_cross_tab_merge_idempotent_on_key() {
        let mut a = Cart::new();
        add_one(&mut a, 400_000);

        let mut b = Cart::new();
        add_one(&mut b, 450_000);

        a.merge(b);
        assert_eq!(a.len(), 1);
        let line = a.lines().first().unwrap();
        assert_eq!(line.quantity, 2);
        // This cart's captured price wins.
        assert_eq!(line.unit_price, Money::new(400_000));
    }

    #[test]
    fn test_captured_price_survives_campaign_end() {
        // A line added at the flash price keeps it after the campaign ends;
        // only gating re-evaluates, not the price.
        let mut cart = Cart::new();
        cart.add_line(
            ProductId::new("prod-1"),
            VariantId::new("var-1"),
            1,
            Money::new(400_000),
            PriceOrigin::FlashSale,
            LineMeta::named("Tee"),
            &open_gate(),
        )
        .unwrap();

        let key = LineKey::new("prod-1", "var-1");
        let variant = crate::catalog::Variant::new("var-1", Money::new(500_000), 5);
        // Campaign gone: stock-only gate for the update.
        cart.update_quantity(&key, 2, &StockGate::stock_only(&variant))
            .unwrap();

        let line = cart.line(&key).unwrap();
        assert_eq!(line.unit_price, Money::new(400_000));
        assert_eq!(line.quantity, 2);
    }
}
