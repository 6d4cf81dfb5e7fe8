//! Per-visitor cart state.
//!
//! [`CartState`] is a plain value: handlers load it from the session, mutate
//! it through the methods below and save it back. Totals are always derived,
//! never stored, except for the backend-computed coupon total.
//!
//! # Totals
//!
//! - `line_total = unit_price × units`, where units is the line quantity, or
//!   `right.quantity + left.quantity` for contact lens lines
//! - `subtotal = Σ line_total`
//! - discounted subtotal is the coupon's `final_total` while one is applied
//! - `total = discounted subtotal + shipping price`

pub mod store;

pub use store::{load_cart, save_cart};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use lensway_core::{CartItemId, LineCustomization, Price, ProductId};

use crate::services::catalog::Product;
use crate::services::coupons::{CouponDiscount, CouponItem, CouponRequest};
use crate::services::shipping::ShippingMethod;

/// Errors from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Cart line not found: {0}")]
    LineNotFound(CartItemId),

    #[error("Quantity must be at least 1 (got {0})")]
    InvalidQuantity(u32),

    /// Contact lens boxes are counted per eye; the line is replaced instead.
    #[error("Contact lens quantities are set per eye; replace the line to change them")]
    QuantityPerEye(CartItemId),
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub customization: LineCustomization,
}

impl CartLine {
    /// Units this line is priced for.
    #[must_use]
    pub const fn units(&self) -> u32 {
        self.customization.priced_units(self.quantity)
    }

    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.units())
    }

    fn merges_with(&self, other: &NewCartLine) -> bool {
        !self.customization.is_contact_lens()
            && self.product_id == other.product_id
            && self.customization == other.customization
    }
}

/// Input for [`CartState::add`].
///
/// Prices come from the backend catalog, never from the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartLine {
    pub product_id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub customization: LineCustomization,
}

impl NewCartLine {
    /// A line for `product` at its catalog price.
    #[must_use]
    pub fn for_product(
        product: &Product,
        quantity: u32,
        customization: LineCustomization,
    ) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            image: product.primary_image().map(str::to_string),
            unit_price: product.price,
            quantity,
            customization,
        }
    }
}

/// Coupon accepted by the backend for the current cart contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub discount_amount: Decimal,
    pub final_total: Decimal,
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    #[serde(default)]
    lines: Vec<CartLine>,
    #[serde(default)]
    coupon: Option<AppliedCoupon>,
    #[serde(default)]
    shipping: Option<ShippingMethod>,
}

impl CartState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, id: &CartItemId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub const fn coupon(&self) -> Option<&AppliedCoupon> {
        self.coupon.as_ref()
    }

    #[must_use]
    pub const fn shipping(&self) -> Option<&ShippingMethod> {
        self.shipping.as_ref()
    }

    /// Add a line, merging into an equal existing line.
    ///
    /// Lines merge when product and customization are equal. Contact lens
    /// lines never merge.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] when the line prices zero units.
    pub fn add(&mut self, line: NewCartLine) -> Result<CartItemId, CartError> {
        if line.customization.priced_units(line.quantity) == 0 {
            return Err(CartError::InvalidQuantity(0));
        }

        self.coupon = None;

        if let Some(existing) = self.lines.iter_mut().find(|l| l.merges_with(&line)) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
            return Ok(existing.id.clone());
        }

        let id = CartItemId::new(Uuid::new_v4().to_string());
        self.lines.push(CartLine {
            id: id.clone(),
            product_id: line.product_id,
            name: line.name,
            image: line.image,
            unit_price: line.unit_price,
            quantity: line.quantity,
            customization: line.customization,
        });
        Ok(id)
    }

    /// Set a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] below 1,
    /// [`CartError::LineNotFound`], or [`CartError::QuantityPerEye`] for a
    /// contact lens line.
    pub fn update_quantity(&mut self, id: &CartItemId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| CartError::LineNotFound(id.clone()))?;
        if line.customization.is_contact_lens() {
            return Err(CartError::QuantityPerEye(id.clone()));
        }
        line.quantity = quantity;
        self.coupon = None;
        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`].
    pub fn remove(&mut self, id: &CartItemId) -> Result<CartLine, CartError> {
        let index = self
            .lines
            .iter()
            .position(|l| &l.id == id)
            .ok_or_else(|| CartError::LineNotFound(id.clone()))?;
        self.coupon = None;
        Ok(self.lines.remove(index))
    }

    /// Empty the cart, dropping coupon and shipping selection.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |count, line| count.saturating_add(line.units()))
    }

    /// Body for asking the backend to price `code` against this cart.
    #[must_use]
    pub fn coupon_request(&self, code: &str) -> CouponRequest {
        CouponRequest {
            code: code.trim().to_string(),
            subtotal: self.subtotal(),
            items: self
                .lines
                .iter()
                .map(|l| CouponItem {
                    product_id: l.product_id.clone(),
                    quantity: l.units(),
                    price: l.unit_price,
                })
                .collect(),
        }
    }

    /// Store the backend's discount verbatim.
    pub fn apply_coupon(&mut self, code: &str, discount: CouponDiscount) {
        self.coupon = Some(AppliedCoupon {
            code: discount.code.unwrap_or_else(|| code.trim().to_string()),
            discount_amount: discount.discount_amount,
            final_total: discount.final_total,
        });
    }

    /// Drop the coupon, reverting to the local subtotal.
    pub fn remove_coupon(&mut self) -> Option<AppliedCoupon> {
        self.coupon.take()
    }

    /// Subtotal after the coupon.
    #[must_use]
    pub fn discounted_subtotal(&self) -> Decimal {
        self.coupon
            .as_ref()
            .map_or_else(|| self.subtotal(), |c| c.final_total)
    }

    /// Discount shown to the customer.
    #[must_use]
    pub fn discount(&self) -> Decimal {
        self.coupon
            .as_ref()
            .map_or(Decimal::ZERO, |c| c.discount_amount)
    }

    pub fn select_shipping(&mut self, method: ShippingMethod) {
        self.shipping = Some(method);
    }

    /// Price of the selected method, zero when none.
    #[must_use]
    pub fn shipping_cost(&self) -> Decimal {
        self.shipping.as_ref().map_or(Decimal::ZERO, |m| m.price)
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.discounted_subtotal() + self.shipping_cost()
    }

    /// Snapshot with every derived figure, as returned to clients.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            lines: self
                .lines
                .iter()
                .map(|line| CartLineSummary {
                    line_total: Price::usd(line.line_total()).display(),
                    units: line.units(),
                    line: line.clone(),
                })
                .collect(),
            item_count: self.item_count(),
            subtotal: self.subtotal(),
            discount: self.discount(),
            coupon: self.coupon.clone(),
            shipping: self.shipping.clone(),
            shipping_cost: self.shipping_cost(),
            total: self.total(),
            total_display: Price::usd(self.total()).display(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CartLineSummary {
    #[serde(flatten)]
    pub line: CartLine,
    pub units: u32,
    pub line_total: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
    pub lines: Vec<CartLineSummary>,
    pub item_count: u32,
    pub subtotal: Decimal,
    pub discount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<AppliedCoupon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<ShippingMethod>,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub total_display: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use lensway_core::{ContactLensEye, LensTypeId, ShippingMethodId};

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn frame(product: &str, price: &str, quantity: u32) -> NewCartLine {
        NewCartLine {
            product_id: ProductId::new(product),
            name: format!("Frame {product}"),
            image: None,
            unit_price: dec(price),
            quantity,
            customization: LineCustomization::None,
        }
    }

    fn eye(quantity: u32) -> ContactLensEye {
        ContactLensEye {
            quantity,
            power: "-1.50".into(),
            base_curve: None,
            diameter: None,
            cylinder: None,
            axis: None,
            add: None,
        }
    }

    fn contacts(right: u32, left: u32, price: &str) -> NewCartLine {
        NewCartLine {
            product_id: ProductId::new("acuvue"),
            name: "Acuvue Oasys".into(),
            image: None,
            unit_price: dec(price),
            quantity: 1,
            customization: LineCustomization::ContactLens {
                right: eye(right),
                left: eye(left),
            },
        }
    }

    #[test]
    fn test_subtotal_sums_price_times_quantity() {
        let mut cart = CartState::new();
        cart.add(frame("a", "19.99", 2)).unwrap();
        cart.add(frame("b", "5.50", 3)).unwrap();
        assert_eq!(cart.subtotal(), dec("56.48"));
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.total(), dec("56.48"));
    }

    #[test]
    fn test_contact_lens_line_prices_both_eyes() {
        let mut cart = CartState::new();
        let mut line = contacts(2, 3, "10");
        line.quantity = 7;
        cart.add(line).unwrap();
        assert_eq!(cart.subtotal(), dec("50"));
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_equal_lines_merge() {
        let mut cart = CartState::new();
        let first = cart.add(frame("a", "10", 1)).unwrap();
        let second = cart.add(frame("a", "10", 2)).unwrap();
        assert_eq!(first, second);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_different_customization_does_not_merge() {
        let mut cart = CartState::new();
        cart.add(frame("a", "10", 1)).unwrap();
        let mut with_lenses = frame("a", "10", 1);
        with_lenses.customization = LineCustomization::Eyeglasses {
            lens_type: LensTypeId::new("single-vision"),
            lens_index: None,
            coating: None,
            treatments: Vec::new(),
            prescription_id: None,
        };
        cart.add(with_lenses).unwrap();
        assert_eq!(cart.lines().len(), 2);
    }

    #[test]
    fn test_contact_lens_lines_never_merge() {
        let mut cart = CartState::new();
        cart.add(contacts(1, 1, "30")).unwrap();
        cart.add(contacts(1, 1, "30")).unwrap();
        assert_eq!(cart.lines().len(), 2);
    }

    #[test]
    fn test_quantity_below_one_is_rejected() {
        let mut cart = CartState::new();
        let id = cart.add(frame("a", "10", 1)).unwrap();
        assert_eq!(
            cart.update_quantity(&id, 0),
            Err(CartError::InvalidQuantity(0))
        );
        assert!(cart.add(frame("b", "10", 0)).is_err());
        cart.update_quantity(&id, 4).unwrap();
        assert_eq!(cart.subtotal(), dec("40"));
    }

    #[test]
    fn test_contact_lens_line_needs_a_box() {
        let mut cart = CartState::new();
        assert_eq!(
            cart.add(contacts(0, 0, "25")),
            Err(CartError::InvalidQuantity(0))
        );
        assert!(cart.is_empty());

        // One eye is enough
        cart.add(contacts(0, 2, "25")).unwrap();
        assert_eq!(cart.subtotal(), dec("50"));
    }

    #[test]
    fn test_contact_lens_quantity_is_not_patched() {
        let mut cart = CartState::new();
        let id = cart.add(contacts(2, 3, "10")).unwrap();
        assert_eq!(
            cart.update_quantity(&id, 10),
            Err(CartError::QuantityPerEye(id.clone()))
        );
        assert_eq!(cart.subtotal(), dec("50"));
    }

    #[test]
    fn test_line_for_product_uses_catalog_price() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 12,
            "name": "Round Titanium",
            "price": "189.00",
            "images": ["round.jpg", "side.jpg"]
        }))
        .unwrap();

        let line = NewCartLine::for_product(&product, 2, LineCustomization::None);
        assert_eq!(line.product_id.as_str(), "12");
        assert_eq!(line.name, "Round Titanium");
        assert_eq!(line.image.as_deref(), Some("round.jpg"));
        assert_eq!(line.unit_price, dec("189.00"));
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_unknown_line() {
        let mut cart = CartState::new();
        let missing = CartItemId::new("nope");
        assert!(matches!(
            cart.remove(&missing),
            Err(CartError::LineNotFound(_))
        ));
    }

    #[test]
    fn test_coupon_replaces_subtotal_until_removed() {
        let mut cart = CartState::new();
        cart.add(frame("a", "100", 1)).unwrap();
        cart.apply_coupon(
            "SPRING",
            CouponDiscount {
                code: None,
                discount_amount: dec("15"),
                final_total: dec("85"),
            },
        );
        assert_eq!(cart.discounted_subtotal(), dec("85"));
        assert_eq!(cart.discount(), dec("15"));
        assert_eq!(cart.coupon().unwrap().code, "SPRING");

        cart.remove_coupon();
        assert_eq!(cart.discounted_subtotal(), dec("100"));
    }

    #[test]
    fn test_mutation_discards_coupon() {
        let mut cart = CartState::new();
        let id = cart.add(frame("a", "100", 1)).unwrap();
        cart.apply_coupon(
            "SPRING",
            CouponDiscount {
                code: Some("SPRING".into()),
                discount_amount: dec("15"),
                final_total: dec("85"),
            },
        );
        cart.update_quantity(&id, 2).unwrap();
        assert!(cart.coupon().is_none());
        assert_eq!(cart.discounted_subtotal(), dec("200"));
    }

    #[test]
    fn test_total_adds_shipping() {
        let mut cart = CartState::new();
        cart.add(frame("a", "100", 1)).unwrap();
        cart.apply_coupon(
            "TEN",
            CouponDiscount {
                code: None,
                discount_amount: dec("10"),
                final_total: dec("90"),
            },
        );
        cart.select_shipping(ShippingMethod {
            id: ShippingMethodId::new("express"),
            name: "Express".into(),
            price: dec("12.50"),
            estimated_days: Some(2),
            estimated_delivery: None,
            description: None,
        });
        assert_eq!(cart.shipping_cost(), dec("12.50"));
        assert_eq!(cart.total(), dec("102.50"));
        assert_eq!(cart.summary().total_display, "$102.50");
    }

    #[test]
    fn test_coupon_request_uses_priced_units() {
        let mut cart = CartState::new();
        cart.add(contacts(2, 2, "25")).unwrap();
        let request = cart.coupon_request(" SAVE10 ");
        assert_eq!(request.code, "SAVE10");
        assert_eq!(request.subtotal, dec("100"));
        assert_eq!(request.items[0].quantity, 4);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut cart = CartState::new();
        cart.add(frame("a", "10", 1)).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }
}
