//! Flash-sale campaigns: time-boxed, stock-limited discounts on specific
//! variants, shared across all shoppers.
//!
//! A campaign is active only when its explicit status flag says so AND the
//! current time falls inside its window. The status is an enum computed at
//! ingestion, never a string comparison at read sites. `remaining_quantity`
//! on an entry is shared state consumed by all shoppers; this module never
//! mutates it (the order service is authoritative at placement time).

use crate::ids::{CampaignId, ProductId, VariantId};
use serde::{Deserialize, Serialize};

/// Explicit campaign lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CampaignStatus {
    /// Not yet started or disabled by the operator.
    #[default]
    Scheduled,
    /// Explicitly flagged as running.
    Running,
    /// Over or cancelled.
    Ended,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Scheduled => "scheduled",
            CampaignStatus::Running => "running",
            CampaignStatus::Ended => "ended",
        }
    }
}

/// One (product, variant) allotment inside a campaign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlashSaleEntry {
    /// Product this entry applies to.
    pub product_id: ProductId,
    /// Exact variant this entry applies to.
    pub variant_id: VariantId,
    /// Units still available at the campaign price, shared by all shoppers.
    /// Decreases monotonically as the campaign is consumed.
    pub remaining_quantity: i64,
    /// Allotment size pinned at first ingestion; never reseeded afterwards.
    pub initial_quantity: i64,
}

impl FlashSaleEntry {
    pub fn new(
        product_id: impl Into<ProductId>,
        variant_id: impl Into<VariantId>,
        remaining_quantity: i64,
        initial_quantity: i64,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            variant_id: variant_id.into(),
            remaining_quantity: remaining_quantity.max(0),
            initial_quantity: initial_quantity.max(0),
        }
    }

    /// Units sold so far, for progress bars. Saturates at zero so a feed
    /// that reports more remaining than initial never yields a negative.
    pub fn sold(&self) -> i64 {
        (self.initial_quantity - self.remaining_quantity).max(0)
    }

    /// Check if the allotment is used up.
    pub fn is_exhausted(&self) -> bool {
        self.remaining_quantity <= 0
    }
}

/// A time-boxed discount campaign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlashSaleCampaign {
    /// Unique campaign identifier.
    pub id: CampaignId,
    /// Display name.
    pub name: String,
    /// Explicit status flag.
    pub status: CampaignStatus,
    /// Window start (Unix timestamp).
    pub starts_at: i64,
    /// Window end (Unix timestamp).
    pub ends_at: i64,
    /// Discount applied to the base price, 0..=100.
    pub discount_percent: u8,
    /// Variant allotments.
    pub entries: Vec<FlashSaleEntry>,
}

impl FlashSaleCampaign {
    /// Active means the status flag AND the time window both hold.
    pub fn is_active(&self, now: i64) -> bool {
        self.status == CampaignStatus::Running && now >= self.starts_at && now <= self.ends_at
    }

    /// Find the entry for an exact variant, if any.
    pub fn entry_for(
        &self,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Option<&FlashSaleEntry> {
        self.entries
            .iter()
            .find(|e| &e.product_id == product_id && &e.variant_id == variant_id)
    }
}

/// A campaign entry paired with its owning campaign, as returned by
/// registry queries.
#[derive(Debug, Clone, Copy)]
pub struct ActiveEntry<'a> {
    pub campaign: &'a FlashSaleCampaign,
    pub entry: &'a FlashSaleEntry,
}

/// An eventually-stale snapshot of all known campaigns.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FlashSaleRegistry {
    campaigns: Vec<FlashSaleCampaign>,
}

impl FlashSaleRegistry {
    pub fn new(campaigns: Vec<FlashSaleCampaign>) -> Self {
        Self { campaigns }
    }

    /// All campaigns, regardless of status.
    pub fn campaigns(&self) -> &[FlashSaleCampaign] {
        &self.campaigns
    }

    /// Entries that can price a variant right now: campaign active and the
    /// shared allotment not exhausted.
    pub fn active_entries_for(
        &self,
        product_id: &ProductId,
        variant_id: &VariantId,
        now: i64,
    ) -> Vec<ActiveEntry<'_>> {
        self.campaigns
            .iter()
            .filter(|c| c.is_active(now))
            .filter_map(|campaign| {
                campaign
                    .entry_for(product_id, variant_id)
                    .filter(|entry| !entry.is_exhausted())
                    .map(|entry| ActiveEntry { campaign, entry })
            })
            .collect()
    }
}
