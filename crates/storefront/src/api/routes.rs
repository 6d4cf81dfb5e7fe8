//! Backend route table.
//!
//! Paths are relative to the API base URL, which already includes `/api`.

use lensway_core::{CartItemId, FormKind, OrderId, PrescriptionId, ProductId};

/// A logical backend operation.
#[derive(Debug, Clone, Copy)]
pub enum Endpoint<'a> {
    Login,
    Register,
    Logout,
    RefreshToken,
    CurrentUser,

    Products,
    Product(&'a ProductId),

    Cart,
    CartItems,
    CartItem(&'a CartItemId),

    Orders,
    Order(&'a OrderId),
    CancelOrder(&'a OrderId),

    Prescriptions,
    Prescription(&'a PrescriptionId),

    LensTreatments,
    LensOptions,
    PrescriptionLensTypes,

    FormConfig(FormKind),
    FormSubmit(FormKind),

    PaymentMethods,
    ShippingMethods,
    ApplyCoupon,
}

impl Endpoint<'_> {
    /// Path for this operation, with ids percent-encoded.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/auth/login".to_string(),
            Self::Register => "/auth/register".to_string(),
            Self::Logout => "/auth/logout".to_string(),
            Self::RefreshToken => "/auth/refresh".to_string(),
            Self::CurrentUser => "/auth/me".to_string(),

            Self::Products => "/products".to_string(),
            Self::Product(id) => format!("/products/{}", encode(id.as_str())),

            Self::Cart => "/cart".to_string(),
            Self::CartItems => "/cart/items".to_string(),
            Self::CartItem(id) => format!("/cart/items/{}", encode(id.as_str())),

            Self::Orders => "/orders".to_string(),
            Self::Order(id) => format!("/orders/{}", encode(id.as_str())),
            Self::CancelOrder(id) => format!("/orders/{}/cancel", encode(id.as_str())),

            Self::Prescriptions => "/prescriptions".to_string(),
            Self::Prescription(id) => format!("/prescriptions/{}", encode(id.as_str())),

            Self::LensTreatments => "/lens/treatments".to_string(),
            Self::LensOptions => "/lens/options".to_string(),
            Self::PrescriptionLensTypes => "/prescription-lens-types".to_string(),

            Self::FormConfig(kind) => format!("/forms/{}/config", kind.slug()),
            Self::FormSubmit(kind) => format!("/forms/{}/submit", kind.slug()),

            Self::PaymentMethods => "/payments/methods".to_string(),
            Self::ShippingMethods => "/shipping-methods".to_string(),
            Self::ApplyCoupon => "/coupons/apply".to_string(),
        }
    }
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_paths() {
        assert_eq!(Endpoint::RefreshToken.path(), "/auth/refresh");
        assert_eq!(Endpoint::ApplyCoupon.path(), "/coupons/apply");
        assert_eq!(Endpoint::ShippingMethods.path(), "/shipping-methods");
    }

    #[test]
    fn test_id_paths() {
        let order = OrderId::new("42");
        assert_eq!(Endpoint::Order(&order).path(), "/orders/42");
        assert_eq!(Endpoint::CancelOrder(&order).path(), "/orders/42/cancel");
    }

    #[test]
    fn test_ids_are_percent_encoded() {
        let product = ProductId::new("aviator/gold 52");
        assert_eq!(
            Endpoint::Product(&product).path(),
            "/products/aviator%2Fgold%2052"
        );
    }

    #[test]
    fn test_form_paths_use_slug() {
        assert_eq!(
            Endpoint::FormSubmit(FormKind::JobApplication).path(),
            "/forms/job-application/submit"
        );
        assert_eq!(
            Endpoint::FormConfig(FormKind::Pricing).path(),
            "/forms/pricing/config"
        );
    }
}
