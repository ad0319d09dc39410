//! Cart session: the one store every screen drives.
//!
//! Wires the snapshot registry through price resolution and stock gating
//! into the cart, so listing, detail, cart, and favorites all share one
//! resolver instead of re-implementing discount arithmetic. The cart is
//! client-persisted state with session lifetime; persistence is plain JSON.

use crate::registry::SnapshotRegistry;
use promo_core::cart::{Cart, LineKey, LineMeta};
use promo_core::checkout::{build_order_draft, reconcile, OrderDraft, ServerAck};
use promo_core::pricing::{resolve_price, PriceOrigin, ResolvedPrice};
use promo_core::stock::StockGate;
use promo_core::voucher::VoucherGrant;
use promo_core::{EngineError, ProductId, VariantId};

/// Cart plus snapshot registry for one client session.
#[derive(Debug, Default)]
pub struct CartSession {
    registry: SnapshotRegistry,
    cart: Cart,
}

impl CartSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &SnapshotRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SnapshotRegistry {
        &mut self.registry
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The price to display for a variant right now.
    ///
    /// Display fails open: last-known campaign data still prices the screen
    /// even when the feed is stale. Only quantity gating fails closed.
    pub fn resolve_display_price(
        &self,
        product_id: &ProductId,
        variant_id: &VariantId,
        now: i64,
    ) -> Result<ResolvedPrice, EngineError> {
        let (_, variant) = self.registry.variant(product_id, variant_id)?;
        let entries = self.registry.display_entries_for(product_id, variant_id, now);
        Ok(resolve_price(variant, &entries))
    }

    /// Add units of a variant at its currently resolved price.
    ///
    /// The resolved price is captured onto the line; the requested total
    /// (existing line quantity plus `quantity`) must fit under the stock
    /// gate or the add is rejected with the binding constraint named
    /// (`FlashSaleLimitReached` when the shared allotment binds,
    /// `OutOfStock` when inventory does). Rejection leaves the cart
    /// unchanged.
    pub fn add_to_cart(
        &mut self,
        product_id: &ProductId,
        variant_id: &VariantId,
        quantity: i64,
        now: i64,
    ) -> Result<ResolvedPrice, EngineError> {
        if quantity <= 0 {
            return Err(EngineError::InvalidQuantity(quantity));
        }
        let (product, variant) = self.registry.variant(product_id, variant_id)?;
        let entries = self.registry.display_entries_for(product_id, variant_id, now);
        let resolved = resolve_price(variant, &entries);

        let gate = if !self.registry.catalog_is_fresh() {
            tracing::warn!(
                variant = %variant_id,
                "catalog feed stale, gating add at zero"
            );
            StockGate::closed(variant_id.clone())
        } else if resolved.origin == PriceOrigin::FlashSale && !self.registry.flash_is_fresh() {
            tracing::warn!(
                variant = %variant_id,
                "flash feed stale, gating add at zero"
            );
            StockGate::closed(variant_id.clone())
        } else {
            StockGate::for_resolved(variant, &resolved)
        };

        let key = LineKey::new(product_id.clone(), variant_id.clone());
        let requested_total = self
            .cart
            .quantity_of(&key)
            .checked_add(quantity)
            .ok_or(EngineError::Overflow)?;
        gate.admit(requested_total)?;

        let meta = LineMeta {
            product_name: product.name.clone(),
            variant_label: variant.label.clone(),
            image_url: None,
        };
        self.cart.add_line(
            product_id.clone(),
            variant_id.clone(),
            quantity,
            resolved.unit_price,
            resolved.origin,
            meta,
            &gate,
        )?;
        Ok(resolved)
    }

    /// Set a line's quantity, re-gating against current snapshot state.
    ///
    /// The gate context follows the line's captured origin: a flash-priced
    /// line is still bounded by the campaign's remaining allotment while the
    /// campaign runs, and falls back to the plain stock bound once it ends.
    /// A stale feed gates at zero. The captured unit price is never touched,
    /// and a quantity <= 0 removes the line without consulting any snapshot.
    pub fn set_quantity(
        &mut self,
        key: &LineKey,
        quantity: i64,
        now: i64,
    ) -> Result<bool, EngineError> {
        // Removal needs no snapshot: it can never exceed availability.
        if quantity <= 0 {
            return Ok(self.cart.remove_line(key));
        }
        let origin = match self.cart.line(key) {
            Some(line) => line.origin,
            None => return Ok(false),
        };
        let (_, variant) = self.registry.variant(&key.product_id, &key.variant_id)?;

        let gate = match origin {
            _ if !self.registry.catalog_is_fresh() => {
                tracing::warn!(
                    variant = %key.variant_id,
                    "catalog feed stale, gating update at zero"
                );
                StockGate::closed(key.variant_id.clone())
            }
            PriceOrigin::FlashSale if !self.registry.flash_is_fresh() => {
                tracing::warn!(
                    variant = %key.variant_id,
                    "flash feed stale, gating update at zero"
                );
                StockGate::closed(key.variant_id.clone())
            }
            PriceOrigin::FlashSale => {
                let entries =
                    self.registry
                        .display_entries_for(&key.product_id, &key.variant_id, now);
                let resolved = resolve_price(variant, &entries);
                if resolved.origin == PriceOrigin::FlashSale {
                    StockGate::for_resolved(variant, &resolved)
                } else {
                    // Campaign ended since add time: plain stock bound.
                    StockGate::stock_only(variant)
                }
            }
            _ => StockGate::stock_only(variant),
        };

        self.cart.update_quantity(key, quantity, &gate)
    }

    /// Remove a line. Returns whether anything was removed.
    pub fn remove(&mut self, key: &LineKey) -> bool {
        self.cart.remove_line(key)
    }

    /// Build the order payload for the placement service.
    pub fn checkout(
        &self,
        grant: Option<&VoucherGrant>,
        now: i64,
    ) -> Result<OrderDraft, EngineError> {
        build_order_draft(&self.cart, grant, now)
    }

    /// Finish a checkout attempt against the server's acknowledgement.
    ///
    /// On a match the cart is cleared; on a mismatch the attempt fails with
    /// a `Consistency` error and the cart is preserved unmodified for retry.
    pub fn complete_checkout(
        &mut self,
        draft: &OrderDraft,
        ack: &ServerAck,
    ) -> Result<(), EngineError> {
        reconcile(draft, ack)?;
        self.cart.clear();
        Ok(())
    }

    /// Serialize the cart for client-side persistence.
    pub fn cart_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(&self.cart).map_err(Into::into)
    }

    /// Replace the cart from a persisted snapshot.
    pub fn load_cart(&mut self, json: &str) -> Result<(), EngineError> {
        self.cart = serde_json::from_str(json)?;
        Ok(())
    }

    /// Merge a cart snapshot persisted by another tab. Idempotent on
    /// `(product, variant)`: the same logical item never becomes two lines.
    pub fn merge_cart_json(&mut self, json: &str) -> Result<(), EngineError> {
        let other: Cart = serde_json::from_str(json)?;
        self.cart.merge(other);
        Ok(())
    }
}
