//! Vouchers and per-user grants.
//!
//! A voucher only applies when the user's grant is in the `received` state,
//! the current time falls inside the validity window, and the order subtotal
//! meets the minimum. The computed discount is always in `[0, subtotal]`:
//! fixed-value vouchers are clamped at the subtotal so a discount can never
//! exceed what it discounts.

use crate::error::EngineError;
use crate::ids::{UserId, VoucherId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// How a voucher discounts the subtotal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VoucherValue {
    /// Percentage of the subtotal, floored, optionally capped.
    Percent {
        /// 0..=100.
        percent: u8,
        /// Cap on the computed amount.
        max_discount: Option<Money>,
    },
    /// Fixed amount, clamped at the subtotal.
    Fixed(Money),
}

/// Voucher terms as issued by the voucher service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Voucher {
    /// Unique voucher identifier.
    pub id: VoucherId,
    /// Redemption code shown to the user.
    pub code: String,
    /// Discount rule.
    pub value: VoucherValue,
    /// Minimum subtotal for the voucher to apply.
    pub min_order_value: Money,
    /// Window start (Unix timestamp).
    pub valid_from: i64,
    /// Window end (Unix timestamp).
    pub valid_to: i64,
}

impl Voucher {
    /// Check grant state, validity window, and minimum subtotal.
    pub fn validate(
        &self,
        grant_status: GrantStatus,
        subtotal: Money,
        now: i64,
    ) -> Result<(), EngineError> {
        if grant_status != GrantStatus::Received {
            return Err(EngineError::VoucherNotOwned(self.code.clone()));
        }
        if now < self.valid_from || now > self.valid_to {
            return Err(EngineError::VoucherExpired(self.code.clone()));
        }
        if subtotal < self.min_order_value {
            return Err(EngineError::BelowMinimum {
                subtotal,
                minimum: self.min_order_value,
            });
        }
        Ok(())
    }

    /// Compute the discount for a subtotal. Always in `[0, subtotal]`.
    pub fn compute_discount(&self, subtotal: Money) -> Money {
        let raw = match &self.value {
            VoucherValue::Percent {
                percent,
                max_discount,
            } => {
                let pct = subtotal.percent_floored(*percent);
                match max_discount {
                    Some(cap) => pct.min(*cap),
                    None => pct,
                }
            }
            VoucherValue::Fixed(amount) => *amount,
        };
        raw.min(subtotal).max(Money::zero())
    }
}

/// Lifecycle of a voucher granted to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GrantStatus {
    /// Issued and usable.
    #[default]
    Received,
    /// Already redeemed.
    Used,
    /// Window lapsed before use.
    Expired,
    /// Revoked by the issuer.
    Cancelled,
}

impl GrantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantStatus::Received => "received",
            GrantStatus::Used => "used",
            GrantStatus::Expired => "expired",
            GrantStatus::Cancelled => "cancelled",
        }
    }
}

/// A voucher bound to a specific user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoucherGrant {
    /// The granted voucher's terms, embedded by the grant service.
    pub voucher: Voucher,
    /// The holder.
    pub user_id: UserId,
    /// Grant lifecycle state.
    pub status: GrantStatus,
}

impl VoucherGrant {
    /// Check if this grant could apply to some order right now.
    pub fn is_usable(&self, now: i64) -> bool {
        self.status == GrantStatus::Received
            && now >= self.voucher.valid_from
            && now <= self.voucher.valid_to
    }

    /// Validate against a subtotal and compute the discount.
    pub fn discount_for(&self, subtotal: Money, now: i64) -> Result<Money, EngineError> {
        self.voucher.validate(self.status, subtotal, now)?;
        Ok(self.voucher.compute_discount(subtotal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percent_voucher(percent: u8, cap: Option<i64>, min_order: i64) -> Voucher {
        Voucher {
            id: VoucherId::new("vc-1"),
            code: "SALE15".to_string(),
            value: VoucherValue::Percent {
                percent,
                max_discount: cap.map(Money::new),
            },
            min_order_value: Money::new(min_order),
            valid_from: 1_000,
            valid_to: 2_000,
        }
    }

    fn fixed_voucher(amount: i64, min_order: i64) -> Voucher {
        Voucher {
            id: VoucherId::new("vc-2"),
            code: "MINUS30K".to_string(),
            value: VoucherValue::Fixed(Money::new(amount)),
            min_order_value: Money::new(min_order),
            valid_from: 1_000,
            valid_to: 2_000,
        }
    }

    #[test]
    fn test_percent_capped() {
        // 15% of 800000 = 120000, capped to 50000.
        let v = percent_voucher(15, Some(50_000), 200_000);
        let subtotal = Money::new(800_000);

        v.validate(GrantStatus::Received, subtotal, 1_500).unwrap();
        assert_eq!(v.compute_discount(subtotal), Money::new(50_000));
    }

    #[test]
    fn test_percent_uncapped() {
        let v = percent_voucher(15, None, 0);
        assert_eq!(v.compute_discount(Money::new(800_000)), Money::new(120_000));
    }

    #[test]
    fn test_below_minimum() {
        // Fixed 30000 with a 100000 minimum never applies to a subtotal of 80000.
        let v = fixed_voucher(30_000, 100_000);
        let err = v
            .validate(GrantStatus::Received, Money::new(80_000), 1_500)
            .unwrap_err();
        assert!(matches!(err, EngineError::BelowMinimum { .. }));
    }

    #[test]
    fn test_fixed_clamped_at_subtotal() {
        let v = fixed_voucher(30_000, 0);
        assert_eq!(v.compute_discount(Money::new(10_000)), Money::new(10_000));
        assert_eq!(v.compute_discount(Money::new(50_000)), Money::new(30_000));
    }

    #[test]
    fn test_out_of_window() {
        let v = fixed_voucher(30_000, 0);
        let subtotal = Money::new(200_000);
        assert!(matches!(
            v.validate(GrantStatus::Received, subtotal, 999),
            Err(EngineError::VoucherExpired(_))
        ));
        assert!(matches!(
            v.validate(GrantStatus::Received, subtotal, 2_001),
            Err(EngineError::VoucherExpired(_))
        ));
    }

    #[test]
    fn test_not_received_grant() {
        let v = fixed_voucher(30_000, 0);
        let subtotal = Money::new(200_000);
        for status in [GrantStatus::Used, GrantStatus::Expired, GrantStatus::Cancelled] {
            assert!(matches!(
                v.validate(status, subtotal, 1_500),
                Err(EngineError::VoucherNotOwned(_))
            ));
        }
    }

    #[test]
    fn test_discount_never_exceeds_subtotal() {
        let vouchers = [
            percent_voucher(100, None, 0),
            percent_voucher(40, Some(1_000_000), 0),
            fixed_voucher(9_999_999, 0),
        ];
        for subtotal in [0i64, 1, 80_000, 800_000] {
            let subtotal = Money::new(subtotal);
            for v in &vouchers {
                let d = v.compute_discount(subtotal);
                assert!(d <= subtotal);
                assert!(d >= Money::zero());
            }
        }
    }

    #[test]
    fn test_grant_discount_for() {
        let grant = VoucherGrant {
            voucher: percent_voucher(15, Some(50_000), 200_000),
            user_id: UserId::new("user-1"),
            status: GrantStatus::Received,
        };
        assert!(grant.is_usable(1_500));
        assert_eq!(
            grant.discount_for(Money::new(800_000), 1_500).unwrap(),
            Money::new(50_000)
        );
    }
}
