//! Catalog snapshot types: products and their purchasable variants.
//!
//! The catalog is owned by an external service; this module only defines the
//! shapes the engine reads. Inactive products are excluded from every
//! computation, so lookups that feed pricing and gating go through
//! [`CatalogSnapshot::variant`], which rejects them.

use crate::error::EngineError;
use crate::ids::{ProductId, VariantId};
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Product visibility status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductStatus {
    /// Product is active and purchasable.
    #[default]
    Active,
    /// Product is hidden from listings and excluded from every computation.
    Inactive,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
        }
    }
}

/// A purchasable variant of a product (e.g., one size/color combination).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    /// Unique variant identifier.
    pub id: VariantId,
    /// List price, always positive. Shown struck through when discounted.
    pub list_price: Money,
    /// Standing discounted price independent of any campaign.
    ///
    /// `None` means not set; feed values of 0 are normalized to `None` at
    /// ingestion.
    pub everyday_sale_price: Option<Money>,
    /// Units in stock, never negative.
    pub stock: i64,
    /// Display label (e.g., "L / Black").
    pub label: Option<String>,
}

impl Variant {
    /// Create a new variant with no everyday sale price.
    pub fn new(id: impl Into<VariantId>, list_price: Money, stock: i64) -> Self {
        Self {
            id: id.into(),
            list_price,
            everyday_sale_price: None,
            stock: stock.max(0),
            label: None,
        }
    }

    /// Set the everyday sale price. A non-positive amount means "not set".
    pub fn with_everyday_sale_price(mut self, price: Money) -> Self {
        self.everyday_sale_price = price.is_positive().then_some(price);
        self
    }

    /// The price discounts apply to: the everyday sale price when set,
    /// otherwise the list price.
    pub fn base_price(&self) -> Money {
        match self.everyday_sale_price {
            Some(p) if p.is_positive() => p,
            _ => self.list_price,
        }
    }

    /// Check if any units are in stock.
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Visibility status.
    pub status: ProductStatus,
    /// Variants; non-empty for a purchasable product.
    pub variants: Vec<Variant>,
}

impl Product {
    /// Create a new active product.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, variants: Vec<Variant>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: ProductStatus::Active,
            variants,
        }
    }

    /// Check if the product is available for purchase.
    pub fn is_available(&self) -> bool {
        self.status == ProductStatus::Active && !self.variants.is_empty()
    }

    /// Find a variant by ID.
    pub fn variant(&self, variant_id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| &v.id == variant_id)
    }
}

/// An eventually-stale snapshot of the catalog, keyed for lookup.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CatalogSnapshot {
    products: HashMap<ProductId, Product>,
}

impl CatalogSnapshot {
    /// Build a snapshot from a product list.
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    /// Look up a product regardless of status.
    pub fn product(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.get(product_id)
    }

    /// Look up a variant for pricing/gating. Inactive products are rejected.
    pub fn variant(
        &self,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Result<(&Product, &Variant), EngineError> {
        let product = self
            .products
            .get(product_id)
            .ok_or_else(|| EngineError::ProductNotFound(product_id.to_string()))?;
        if product.status == ProductStatus::Inactive {
            return Err(EngineError::InactiveProduct(product_id.to_string()));
        }
        let variant = product
            .variant(variant_id)
            .ok_or_else(|| EngineError::VariantNotFound(variant_id.to_string()))?;
        Ok((product, variant))
    }

    /// Number of products in the snapshot.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the snapshot holds no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(stock: i64) -> Variant {
        Variant::new("var-1", Money::new(300_000), stock)
    }

    #[test]
    fn test_base_price_prefers_everyday_sale() {
        let v = variant(5).with_everyday_sale_price(Money::new(250_000));
        assert_eq!(v.base_price(), Money::new(250_000));
    }

    #[test]
    fn test_base_price_falls_back_to_list() {
        let v = variant(5);
        assert_eq!(v.base_price(), Money::new(300_000));
    }

    #[test]
    fn test_zero_everyday_sale_means_not_set() {
        let v = variant(5).with_everyday_sale_price(Money::zero());
        assert_eq!(v.everyday_sale_price, None);
        assert_eq!(v.base_price(), Money::new(300_000));
    }

    #[test]
    fn test_snapshot_rejects_inactive_product() {
        let mut product = Product::new("prod-1", "Tee", vec![variant(5)]);
        product.status = ProductStatus::Inactive;
        let snapshot = CatalogSnapshot::new([product]);

        let err = snapshot
            .variant(&ProductId::new("prod-1"), &VariantId::new("var-1"))
            .unwrap_err();
        assert!(matches!(err, EngineError::InactiveProduct(_)));
    }

    #[test]
    fn test_snapshot_lookup() {
        let product = Product::new("prod-1", "Tee", vec![variant(5)]);
        let snapshot = CatalogSnapshot::new([product]);

        let (product, variant) = snapshot
            .variant(&ProductId::new("prod-1"), &VariantId::new("var-1"))
            .unwrap();
        assert_eq!(product.name, "Tee");
        assert_eq!(variant.stock, 5);

        assert!(matches!(
            snapshot.variant(&ProductId::new("prod-1"), &VariantId::new("missing")),
            Err(EngineError::VariantNotFound(_))
        ));
        assert!(matches!(
            snapshot.variant(&ProductId::new("missing"), &VariantId::new("var-1")),
            Err(EngineError::ProductNotFound(_))
        ));
    }
}
