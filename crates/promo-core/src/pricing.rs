//! Price resolution: the single place that decides what unit price a
//! shopper sees for a variant.
//!
//! Every screen (listing, detail, cart, favorites) calls [`resolve_price`]
//! instead of re-implementing the discount arithmetic.

use crate::catalog::Variant;
use crate::flash::ActiveEntry;
use crate::ids::CampaignId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Where a resolved unit price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceOrigin {
    /// Plain list price.
    List,
    /// Standing everyday sale price.
    EverydaySale,
    /// An active flash-sale campaign.
    FlashSale,
}

impl PriceOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceOrigin::List => "list",
            PriceOrigin::EverydaySale => "everyday-sale",
            PriceOrigin::FlashSale => "flash-sale",
        }
    }
}

/// The outcome of price resolution for one variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedPrice {
    /// The price to show and charge per unit.
    pub unit_price: Money,
    /// Always the list price, for strikethrough display.
    pub original_price: Money,
    /// Which rule produced `unit_price`.
    pub origin: PriceOrigin,
    /// The winning campaign when `origin` is flash-sale.
    pub campaign_id: Option<CampaignId>,
    /// The winning campaign's remaining allotment, for stock gating.
    pub flash_remaining: Option<i64>,
}

impl ResolvedPrice {
    /// Check if the resolved price is below the list price.
    pub fn is_discounted(&self) -> bool {
        self.unit_price < self.original_price
    }

    /// Savings versus the list price.
    pub fn savings(&self) -> Money {
        self.original_price.saturating_sub_floor_zero(self.unit_price)
    }
}

/// Resolve the unit price for a variant given the campaign entries that are
/// currently active for it.
///
/// The base price is the everyday sale price when set, otherwise the list
/// price. Among qualifying entries (active campaign, allotment not
/// exhausted) the greatest `discount_percent` wins; ties break to the lowest
/// campaign ID so resolution is reproducible regardless of feed order.
///
/// Invariant: `unit_price <= base_price <= list_price`.
pub fn resolve_price(variant: &Variant, entries: &[ActiveEntry<'_>]) -> ResolvedPrice {
    let base_price = variant.base_price();
    let base_origin = if variant.everyday_sale_price.is_some() {
        PriceOrigin::EverydaySale
    } else {
        PriceOrigin::List
    };

    let winner = entries
        .iter()
        .filter(|ae| !ae.entry.is_exhausted())
        .min_by(|a, b| {
            b.campaign
                .discount_percent
                .cmp(&a.campaign.discount_percent)
                .then_with(|| a.campaign.id.cmp(&b.campaign.id))
        });

    match winner {
        Some(ae) => ResolvedPrice {
            unit_price: base_price.percent_off_rounded(ae.campaign.discount_percent),
            original_price: variant.list_price,
            origin: PriceOrigin::FlashSale,
            campaign_id: Some(ae.campaign.id.clone()),
            flash_remaining: Some(ae.entry.remaining_quantity),
        },
        None => ResolvedPrice {
            unit_price: base_price,
            original_price: variant.list_price,
            origin: base_origin,
            campaign_id: None,
            flash_remaining: None,
        },
    }
}
