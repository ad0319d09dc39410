//! Engine error types.

use crate::money::Money;
use thiserror::Error;

/// Errors that can occur in pricing, gating, voucher, and cart operations.
///
/// Validation variants are recoverable and leave cart state unchanged;
/// `StaleData` means a snapshot was missing or failed to refresh (quantity
/// gating fails closed in that case); `Consistency` is fatal to a single
/// checkout attempt only.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Product not found in the catalog snapshot.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Variant not found under the product.
    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    /// Product exists but is inactive and excluded from every computation.
    #[error("Product is inactive: {0}")]
    InactiveProduct(String),

    /// Requested quantity exceeds variant inventory.
    #[error("Out of stock for {variant_id}: requested {requested}, available {available}")]
    OutOfStock {
        variant_id: String,
        requested: i64,
        available: i64,
    },

    /// Requested quantity exceeds the shared flash-sale allotment.
    #[error(
        "Flash sale limit reached for {variant_id}: requested {requested}, remaining {remaining}"
    )]
    FlashSaleLimitReached {
        variant_id: String,
        requested: i64,
        remaining: i64,
    },

    /// Order subtotal is below the voucher's minimum.
    #[error("Subtotal {subtotal} is below the voucher minimum of {minimum}")]
    BelowMinimum { subtotal: Money, minimum: Money },

    /// Voucher is outside its validity window.
    #[error("Voucher is outside its validity window: {0}")]
    VoucherExpired(String),

    /// Voucher grant is not in the `received` state for this user.
    #[error("Voucher is not held by this user: {0}")]
    VoucherNotOwned(String),

    /// Quantity must be positive.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Cart has no lines to check out.
    #[error("Cart is empty")]
    EmptyCart,

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Catalog or flash-sale snapshot is missing or failed to refresh.
    #[error("Stale or missing snapshot data: {0}")]
    StaleData(String),

    /// Checkout-time mismatch between the client snapshot and server truth.
    #[error("Checkout rejected, client/server mismatch: {0}")]
    Consistency(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Serialization(e.to_string())
    }
}
