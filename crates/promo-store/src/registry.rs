//! Snapshot registry with request-sequenced ingestion.
//!
//! Catalog and flash-sale data arrive from asynchronous fetches that can
//! complete out of order. Each refresh is issued a monotonic [`FetchSeq`];
//! a completion is applied only if it is newer than the last applied one,
//! so issue order wins over completion order.
//!
//! Staleness policy: a failed refresh keeps the last-known snapshot for
//! display but marks the feed stale, and stale flash data gates quantities
//! at zero (fail closed). Feed values are normalized here, once: a
//! `sale_price` of 0 becomes "not set", campaign status is an enum rather
//! than a string compared at read sites, and `initial_quantity` is pinned
//! at first ingestion.

use promo_core::catalog::{CatalogSnapshot, Product, ProductStatus, Variant};
use promo_core::flash::{
    ActiveEntry, CampaignStatus, FlashSaleCampaign, FlashSaleEntry, FlashSaleRegistry,
};
use promo_core::{CampaignId, EngineError, Money, ProductId, VariantId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A variant as the catalog service returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantFeed {
    pub id: VariantId,
    /// List price.
    pub cost_price: i64,
    /// Everyday sale price; 0 means not set.
    pub sale_price: i64,
    pub stock: i64,
    pub label: Option<String>,
}

/// A product as the catalog service returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductFeed {
    pub id: ProductId,
    pub name: String,
    pub active: bool,
    pub variants: Vec<VariantFeed>,
}

/// A campaign entry as the flash-sale service returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryFeed {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub remaining_quantity: i64,
    /// Sometimes absent from the feed; see the pinning rule below.
    pub initial_quantity: Option<i64>,
}

/// A campaign as the flash-sale service returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignFeed {
    pub id: CampaignId,
    pub name: String,
    pub status: CampaignStatus,
    pub starts_at: i64,
    pub ends_at: i64,
    pub discount_percent: u8,
    pub entries: Vec<EntryFeed>,
}

/// Monotonic sequence handed out per refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchSeq(u64);

/// Holds the latest applied catalog and flash-sale snapshots.
#[derive(Debug, Default)]
pub struct SnapshotRegistry {
    catalog: Option<CatalogSnapshot>,
    flash: Option<FlashSaleRegistry>,
    issued: u64,
    catalog_applied: u64,
    flash_applied: u64,
    catalog_fresh: bool,
    flash_fresh: bool,
    /// `initial_quantity` pinned at first ingestion per campaign entry;
    /// later polls never reseed it, so sold counts stay monotonic.
    pinned_initials: HashMap<(CampaignId, ProductId, VariantId), i64>,
}

impl SnapshotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a sequence for a refresh about to start. Completions carry it
    /// back to [`apply_catalog`] / [`apply_flash`] / the failure markers.
    ///
    /// [`apply_catalog`]: Self::apply_catalog
    /// [`apply_flash`]: Self::apply_flash
    pub fn begin_refresh(&mut self) -> FetchSeq {
        self.issued += 1;
        FetchSeq(self.issued)
    }

    /// Apply a completed catalog fetch. Returns `false` when a newer fetch
    /// already landed and this one is ignored.
    pub fn apply_catalog(&mut self, seq: FetchSeq, products: Vec<ProductFeed>) -> bool {
        if seq.0 <= self.catalog_applied {
            tracing::debug!(
                superseded = seq.0,
                applied = self.catalog_applied,
                "ignoring superseded catalog fetch"
            );
            return false;
        }
        self.catalog = Some(CatalogSnapshot::new(
            products.into_iter().map(normalize_product),
        ));
        self.catalog_applied = seq.0;
        self.catalog_fresh = true;
        true
    }

    /// Record a failed catalog fetch: last-known data stays for display,
    /// but the feed is marked stale.
    pub fn catalog_fetch_failed(&mut self, seq: FetchSeq) {
        if seq.0 <= self.catalog_applied {
            return;
        }
        tracing::warn!(seq = seq.0, "catalog fetch failed, keeping last-known snapshot");
        self.catalog_applied = seq.0;
        self.catalog_fresh = false;
    }

    /// Apply a completed flash-sale fetch. Returns `false` when superseded.
    pub fn apply_flash(&mut self, seq: FetchSeq, campaigns: Vec<CampaignFeed>) -> bool {
        if seq.0 <= self.flash_applied {
            tracing::debug!(
                superseded = seq.0,
                applied = self.flash_applied,
                "ignoring superseded flash-sale fetch"
            );
            return false;
        }
        // Drop pins for campaigns no longer in the feed so the map does not
        // grow for the life of the session.
        let incoming: HashSet<CampaignId> = campaigns.iter().map(|c| c.id.clone()).collect();
        self.pinned_initials
            .retain(|(campaign_id, _, _), _| incoming.contains(campaign_id));
        let campaigns = campaigns
            .into_iter()
            .map(|c| self.normalize_campaign(c))
            .collect();
        self.flash = Some(FlashSaleRegistry::new(campaigns));
        self.flash_applied = seq.0;
        self.flash_fresh = true;
        true
    }

    /// Record a failed flash-sale fetch. Gating through a stale flash feed
    /// treats remaining quantities as zero.
    pub fn flash_fetch_failed(&mut self, seq: FetchSeq) {
        if seq.0 <= self.flash_applied {
            return;
        }
        tracing::warn!(seq = seq.0, "flash-sale fetch failed, gating will fail closed");
        self.flash_applied = seq.0;
        self.flash_fresh = false;
    }

    /// Last applied catalog snapshot, fresh or not.
    pub fn catalog(&self) -> Option<&CatalogSnapshot> {
        self.catalog.as_ref()
    }

    /// Last applied flash-sale snapshot, fresh or not.
    pub fn flash(&self) -> Option<&FlashSaleRegistry> {
        self.flash.as_ref()
    }

    /// Whether the most recent flash-sale refresh succeeded.
    pub fn flash_is_fresh(&self) -> bool {
        self.flash_fresh
    }

    /// Whether the most recent catalog refresh succeeded.
    pub fn catalog_is_fresh(&self) -> bool {
        self.catalog_fresh
    }

    /// Look up a variant for pricing/gating through the last-known catalog.
    pub fn variant(
        &self,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Result<(&Product, &Variant), EngineError> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| EngineError::StaleData("catalog has never loaded".to_string()))?;
        catalog.variant(product_id, variant_id)
    }

    /// Campaign entries usable for *display* pricing: last-known data even
    /// when the feed is stale, so the shopper still sees a price.
    pub fn display_entries_for(
        &self,
        product_id: &ProductId,
        variant_id: &VariantId,
        now: i64,
    ) -> Vec<ActiveEntry<'_>> {
        match &self.flash {
            Some(flash) => flash.active_entries_for(product_id, variant_id, now),
            None => Vec::new(),
        }
    }

    fn normalize_campaign(&mut self, feed: CampaignFeed) -> FlashSaleCampaign {
        let campaign_id = feed.id.clone();
        let entries = feed
            .entries
            .into_iter()
            .map(|e| {
                let key = (campaign_id.clone(), e.product_id.clone(), e.variant_id.clone());
                let initial = *self
                    .pinned_initials
                    .entry(key)
                    .or_insert_with(|| e.initial_quantity.unwrap_or(e.remaining_quantity));
                FlashSaleEntry::new(e.product_id, e.variant_id, e.remaining_quantity, initial)
            })
            .collect();
        FlashSaleCampaign {
            id: feed.id,
            name: feed.name,
            status: feed.status,
            starts_at: feed.starts_at,
            ends_at: feed.ends_at,
            discount_percent: feed.discount_percent.min(100),
            entries,
        }
    }
}

fn normalize_product(feed: ProductFeed) -> Product {
    let variants = feed
        .variants
        .into_iter()
        .map(|v| {
            let mut variant = Variant::new(v.id, Money::new(v.cost_price), v.stock)
                .with_everyday_sale_price(Money::new(v.sale_price));
            variant.label = v.label;
            variant
        })
        .collect();
    let mut product = Product::new(feed.id, feed.name, variants);
    product.status = if feed.active {
        ProductStatus::Active
    } else {
        ProductStatus::Inactive
    };
    product
}
