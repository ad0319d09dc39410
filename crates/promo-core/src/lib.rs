//! Promotional pricing and stock-gated cart engine.
//!
//! The same discount arithmetic tends to get re-implemented on every screen
//! of a storefront (listing, detail, cart, favorites). This crate collapses
//! that duplication into one pure-function core:
//!
//! - **Catalog**: products and variants with list / everyday-sale prices
//! - **Flash**: time-boxed campaigns with a shared remaining allotment
//! - **Pricing**: deterministic resolution of the price a shopper sees
//! - **Stock**: quantity ceilings combining inventory and flash allotment
//! - **Voucher**: grant validation and discount computation
//! - **Cart**: line aggregation keyed by `(product, variant)` with captured
//!   add-time prices
//! - **Checkout**: order draft for the external placement service
//!
//! # Example
//!
//! ```rust,ignore
//! use promo_core::prelude::*;
//!
//! let resolved = resolve_price(&variant, &registry.active_entries_for(
//!     &product.id, &variant.id, now,
//! ));
//! let gate = StockGate::for_resolved(&variant, &resolved);
//!
//! let mut cart = Cart::new();
//! cart.add_line(
//!     product.id.clone(),
//!     variant.id.clone(),
//!     1,
//!     resolved.unit_price,
//!     resolved.origin,
//!     LineMeta::named(&product.name),
//!     &gate,
//! )?;
//! ```
//!
//! All functions here are synchronous and clock-free; callers pass `now` as a
//! Unix timestamp. Fetching the catalog and campaign snapshots, persistence,
//! and request sequencing live in `promo-store`.

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod flash;
pub mod pricing;
pub mod stock;
pub mod voucher;

pub use error::EngineError;
pub use ids::*;
pub use money::Money;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::EngineError;
    pub use crate::ids::*;
    pub use crate::money::Money;

    // Catalog
    pub use crate::catalog::{CatalogSnapshot, Product, ProductStatus, Variant};

    // Flash sales
    pub use crate::flash::{
        ActiveEntry, CampaignStatus, FlashSaleCampaign, FlashSaleEntry, FlashSaleRegistry,
    };

    // Pricing and gating
    pub use crate::pricing::{resolve_price, PriceOrigin, ResolvedPrice};
    pub use crate::stock::StockGate;

    // Vouchers
    pub use crate::voucher::{GrantStatus, Voucher, VoucherGrant, VoucherValue};

    // Cart
    pub use crate::cart::{Cart, CartLine, CartTotals, LineKey, LineMeta};

    // Checkout
    pub use crate::checkout::{build_order_draft, reconcile, OrderDraft, OrderDraftLine, ServerAck};
}
