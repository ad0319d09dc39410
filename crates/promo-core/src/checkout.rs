//! Order draft building and checkout-time reconciliation.
//!
//! The order placement service is the write boundary and the authoritative
//! re-validator of stock and price. This module builds the payload it
//! expects from a cart and a voucher grant, and checks its acknowledgement
//! against the client snapshot: any mismatch fails the whole attempt and
//! leaves the cart untouched so the user can retry after seeing the
//! discrepancy.

use crate::cart::Cart;
use crate::error::EngineError;
use crate::ids::{OrderId, VariantId, VoucherId};
use crate::money::Money;
use crate::voucher::VoucherGrant;
use serde::{Deserialize, Serialize};

/// One line of the order payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDraftLine {
    /// Variant being ordered.
    pub variant_id: VariantId,
    /// Units ordered.
    pub quantity: i64,
    /// Captured unit price the client intends to be charged.
    pub unit_price_charged: Money,
}

/// The payload sent to the order placement service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDraft {
    /// Lines, one per cart line.
    pub lines: Vec<OrderDraftLine>,
    /// Voucher applied, if any.
    pub voucher_id: Option<VoucherId>,
    /// Sum of captured line totals.
    pub subtotal: Money,
    /// Voucher discount folded into the total.
    pub voucher_discount: Money,
    /// `max(0, subtotal - voucher_discount)`.
    pub total_payable: Money,
}

/// Build the order payload from the cart, validating the voucher against the
/// live subtotal.
///
/// The cart is read, never mutated; clearing it is the caller's job after a
/// successful placement.
pub fn build_order_draft(
    cart: &Cart,
    grant: Option<&VoucherGrant>,
    now: i64,
) -> Result<OrderDraft, EngineError> {
    if cart.is_empty() {
        return Err(EngineError::EmptyCart);
    }

    let totals = cart.totals()?;
    let subtotal = totals.total_amount;

    let (voucher_id, voucher_discount) = match grant {
        Some(grant) => (
            Some(grant.voucher.id.clone()),
            grant.discount_for(subtotal, now)?,
        ),
        None => (None, Money::zero()),
    };

    let lines = cart
        .lines()
        .iter()
        .map(|l| OrderDraftLine {
            variant_id: l.variant_id.clone(),
            quantity: l.quantity,
            unit_price_charged: l.unit_price,
        })
        .collect();

    Ok(OrderDraft {
        lines,
        voucher_id,
        subtotal,
        voucher_discount,
        total_payable: totals.payable(voucher_discount),
    })
}

/// The placement service's acknowledgement of a submitted draft.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerAck {
    /// Assigned order ID on acceptance.
    pub order_id: Option<OrderId>,
    /// Lines as the server accepted them.
    pub accepted_lines: Vec<OrderDraftLine>,
    /// Total the server will charge.
    pub accepted_total: Money,
}

/// Compare a draft against the server's acknowledgement.
///
/// Returns a `Consistency` error naming the first mismatch; the order is
/// rejected atomically, so a partial match is still a failed attempt.
pub fn reconcile(draft: &OrderDraft, ack: &ServerAck) -> Result<(), EngineError> {
    if ack.accepted_lines.len() != draft.lines.len() {
        return Err(EngineError::Consistency(format!(
            "line count: client {}, server {}",
            draft.lines.len(),
            ack.accepted_lines.len()
        )));
    }
    for line in &draft.lines {
        let accepted = ack
            .accepted_lines
            .iter()
            .find(|a| a.variant_id == line.variant_id)
            .ok_or_else(|| {
                EngineError::Consistency(format!(
                    "variant {} missing from server reply",
                    line.variant_id
                ))
            })?;
        if accepted.quantity != line.quantity {
            return Err(EngineError::Consistency(format!(
                "quantity for {}: client {}, server {}",
                line.variant_id, line.quantity, accepted.quantity
            )));
        }
        if accepted.unit_price_charged != line.unit_price_charged {
            return Err(EngineError::Consistency(format!(
                "unit price for {}: client {}, server {}",
                line.variant_id, line.unit_price_charged, accepted.unit_price_charged
            )));
        }
    }
    if ack.accepted_total != draft.total_payable {
        return Err(EngineError::Consistency(format!(
            "total: client {}, server {}",
            draft.total_payable, ack.accepted_total
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::LineMeta;
    use crate::catalog::Variant;
    use crate::ids::{ProductId, UserId};
    use crate::pricing::PriceOrigin;
    use crate::stock::StockGate;
    use crate::voucher::{GrantStatus, Voucher, VoucherValue};

    fn cart_with(lines: &[(&str, i64, i64)]) -> Cart {
        let mut cart = Cart::new();
        for (vid, qty, price) in lines {
            let variant = Variant::new(*vid, Money::new(*price), 99);
            cart.add_line(
                ProductId::new("prod-1"),
                VariantId::new(*vid),
                *qty,
                Money::new(*price),
                PriceOrigin::List,
                LineMeta::named("Tee"),
                &StockGate::stock_only(&variant),
            )
            .unwrap();
        }
        cart
    }

    fn grant(percent: u8, cap: i64, min_order: i64) -> VoucherGrant {
        VoucherGrant {
            voucher: Voucher {
                id: VoucherId::new("vc-1"),
                code: "SALE15".to_string(),
                value: VoucherValue::Percent {
                    percent,
                    max_discount: Some(Money::new(cap)),
                },
                min_order_value: Money::new(min_order),
                valid_from: 0,
                valid_to: i64::MAX,
            },
            user_id: UserId::new("user-1"),
            status: GrantStatus::Received,
        }
    }

    #[test]
    fn test_draft_folds_in_voucher() {
        // Subtotal 800000, 15% voucher capped at 50000 -> payable 750000.
        let cart = cart_with(&[("var-1", 2, 250_000), ("var-2", 1, 300_000)]);
        let g = grant(15, 50_000, 200_000);

        let draft = build_order_draft(&cart, Some(&g), 1_500).unwrap();
        assert_eq!(draft.subtotal, Money::new(800_000));
        assert_eq!(draft.voucher_discount, Money::new(50_000));
        assert_eq!(draft.total_payable, Money::new(750_000));
        assert_eq!(draft.voucher_id, Some(VoucherId::new("vc-1")));
    }

    #[test]
    fn test_draft_without_voucher() {
        let cart = cart_with(&[("var-1", 1, 100_000)]);
        let draft = build_order_draft(&cart, None, 1_500).unwrap();
        assert_eq!(draft.voucher_discount, Money::zero());
        assert_eq!(draft.total_payable, Money::new(100_000));
    }

    #[test]
    fn test_draft_rejects_invalid_voucher() {
        let cart = cart_with(&[("var-1", 1, 80_000)]);
        let g = grant(15, 50_000, 200_000);
        // Subtotal below the voucher minimum fails the whole draft.
        assert!(matches!(
            build_order_draft(&cart, Some(&g), 1_500),
            Err(EngineError::BelowMinimum { .. })
        ));
    }

    #[test]
    fn test_empty_cart_has_no_draft() {
        assert!(matches!(
            build_order_draft(&Cart::new(), None, 1_500),
            Err(EngineError::EmptyCart)
        ));
    }

    #[test]
    fn test_reconcile_accepts_matching_ack() {
        let cart = cart_with(&[("var-1", 2, 250_000)]);
        let draft = build_order_draft(&cart, None, 1_500).unwrap();
        let ack = ServerAck {
            order_id: Some(OrderId::new("ord-1")),
            accepted_lines: draft.lines.clone(),
            accepted_total: draft.total_payable,
        };
        assert!(reconcile(&draft, &ack).is_ok());
    }

    #[test]
    fn test_reconcile_rejects_price_drift() {
        let cart = cart_with(&[("var-1", 2, 250_000)]);
        let draft = build_order_draft(&cart, None, 1_500).unwrap();

        let mut lines = draft.lines.clone();
        lines[0].unit_price_charged = Money::new(300_000);
        let ack = ServerAck {
            order_id: None,
            accepted_lines: lines,
            accepted_total: Money::new(600_000),
        };
        assert!(matches!(
            reconcile(&draft, &ack),
            Err(EngineError::Consistency(_))
        ));
    }

    #[test]
    fn test_reconcile_rejects_total_drift() {
        let cart = cart_with(&[("var-1", 1, 250_000)]);
        let draft = build_order_draft(&cart, None, 1_500).unwrap();
        let ack = ServerAck {
            order_id: None,
            accepted_lines: draft.lines.clone(),
            accepted_total: Money::new(240_000),
        };
        assert!(matches!(
            reconcile(&draft, &ack),
            Err(EngineError::Consistency(_))
        ));
    }
}
