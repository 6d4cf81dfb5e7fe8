//! Checkout submission.
//!
//! A checkout is checked in this order, each step making zero backend calls
//! when it fails: the visitor must be logged in, the cart must not be empty,
//! and every field must pass the rules table. Only then is a single
//! `POST /orders` sent.

use std::sync::LazyLock;

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use lensway_core::validation::patterns;
use lensway_core::{
    Address, PaymentMethodKind, ShippingMethodId, ValidationErrors, ValidationRule,
};

use crate::api::{ApiClient, ApiError};
use crate::cart::CartState;
use crate::models::CurrentCustomer;
use crate::services::orders::{self, Order, OrderItem, OrderRequest, OrderTotals, PaymentDetails};
use crate::services::shipping::{self, ShippingMethod};

/// Checkout form as posted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub shipping_address: Address,
    #[serde(default = "same_as_shipping")]
    pub billing_same_as_shipping: bool,
    #[serde(default)]
    pub billing_address: Option<Address>,
    #[serde(default)]
    pub shipping_method_id: Option<ShippingMethodId>,
    #[serde(default)]
    pub payment_method: PaymentMethodKind,
    #[serde(default)]
    pub payment: PaymentDetails,
    #[serde(default)]
    pub notes: Option<String>,
}

const fn same_as_shipping() -> bool {
    true
}

/// Errors from [`submit`].
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Please log in to check out")]
    LoginRequired,

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Checkout form is invalid: {0}")]
    Invalid(ValidationErrors),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// One row of the rules table. `field` is a dotted path into the form.
struct FieldRule {
    field: String,
    label: &'static str,
    rule: ValidationRule,
}

impl FieldRule {
    fn new(field: impl Into<String>, label: &'static str, rule: ValidationRule) -> Self {
        Self {
            field: field.into(),
            label,
            rule,
        }
    }
}

fn address_rules(section: &str) -> [FieldRule; 7] {
    let name_rule = ValidationRule::required().with_length(None, Some(50));

    [
        FieldRule::new(format!("{section}.first_name"), "First name", name_rule.clone()),
        FieldRule::new(format!("{section}.last_name"), "Last name", name_rule),
        FieldRule::new(format!("{section}.line1"), "Address", ValidationRule::required()),
        FieldRule::new(format!("{section}.city"), "City", ValidationRule::required()),
        FieldRule::new(format!("{section}.state"), "State", ValidationRule::required()),
        FieldRule::new(
            format!("{section}.zip_code"),
            "ZIP code",
            ValidationRule::required()
                .with_pattern(patterns::ZIP_CODE, "Please enter a valid ZIP code"),
        ),
        FieldRule::new(format!("{section}.country"), "Country", ValidationRule::required()),
    ]
}

static RULES: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    let mut rules = vec![
        FieldRule::new(
            "email",
            "Email",
            ValidationRule::required().with_pattern(patterns::EMAIL, "Please enter a valid email address"),
        ),
        FieldRule::new(
            "phone",
            "Phone",
            ValidationRule::default().with_pattern(patterns::PHONE, "Please enter a valid phone number"),
        ),
    ];
    rules.extend(address_rules("shipping"));
    rules.extend(address_rules("billing"));
    rules.extend([
        FieldRule::new(
            "payment.cardholder_name",
            "Cardholder name",
            ValidationRule::required(),
        ),
        FieldRule::new(
            "payment.card_number",
            "Card number",
            ValidationRule::required().with_pattern(patterns::CARD_NUMBER, "Please enter a valid card number"),
        ),
        FieldRule::new(
            "payment.expiry",
            "Expiry date",
            ValidationRule::required().with_pattern(patterns::CARD_EXPIRY, "Expiry must be MM/YY"),
        ),
        FieldRule::new(
            "payment.cvv",
            "CVV",
            ValidationRule::required().with_pattern(patterns::CARD_CVV, "Please enter a valid CVV"),
        ),
    ]);
    rules
});

impl CheckoutForm {
    /// Look up a field by dotted path.
    fn value(&self, field: &str) -> Option<&str> {
        match field.split_once('.') {
            Some(("shipping", name)) => self.shipping_address.field(name),
            Some(("billing", name)) => self.billing_address.as_ref()?.field(name),
            Some(("payment", name)) => match name {
                "cardholder_name" => Some(&self.payment.cardholder_name),
                "card_number" => Some(&self.payment.card_number),
                "expiry" => Some(&self.payment.expiry),
                "cvv" => Some(&self.payment.cvv),
                _ => None,
            },
            None if field == "email" => Some(&self.email),
            None if field == "phone" => self.phone.as_deref(),
            _ => None,
        }
    }

    fn applies(&self, field: &str) -> bool {
        if field.starts_with("billing.") {
            return !self.billing_same_as_shipping;
        }
        if field.starts_with("payment.") {
            return self.payment_method.requires_card();
        }
        true
    }

    /// Validate every field against the rules table.
    ///
    /// A shipping method must be chosen, either on the form or on the cart.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self, cart: &CartState) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for rule in RULES.iter().filter(|r| self.applies(&r.field)) {
            errors.check(&rule.field, rule.label, &rule.rule, self.value(&rule.field));
        }

        if self.shipping_method_id.is_none() && cart.shipping().is_none() {
            errors.add("shipping_method_id", "Please select a shipping method");
        }

        errors.into_result()
    }

    fn billing(&self) -> Address {
        if self.billing_same_as_shipping {
            self.shipping_address.clone()
        } else {
            self.billing_address
                .clone()
                .unwrap_or_else(|| self.shipping_address.clone())
        }
    }
}

/// Validate and place an order for the cart.
///
/// The caller clears the cart once this returns `Ok`.
///
/// # Errors
///
/// See [`CheckoutError`]. Backend messages surface verbatim through
/// [`CheckoutError::Api`].
#[instrument(skip_all, fields(lines = cart.lines().len()))]
pub async fn submit(
    api: &ApiClient,
    customer: Option<&CurrentCustomer>,
    cart: &CartState,
    form: &CheckoutForm,
) -> Result<Order, CheckoutError> {
    if customer.is_none() {
        return Err(CheckoutError::LoginRequired);
    }
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    form.validate(cart).map_err(CheckoutError::Invalid)?;

    let method = resolve_shipping(api, cart, form.shipping_method_id.as_ref()).await?;
    let request = build_request(cart, form, &method);

    let order = orders::create(api, &request).await?;
    tracing::info!(order_id = %order.id, "Order placed");
    Ok(order)
}

async fn resolve_shipping(
    api: &ApiClient,
    cart: &CartState,
    requested: Option<&ShippingMethodId>,
) -> Result<ShippingMethod, ApiError> {
    match (requested, cart.shipping()) {
        (None, Some(selected)) => Ok(selected.clone()),
        (Some(id), Some(selected)) if &selected.id == id => Ok(selected.clone()),
        (Some(id), _) => shipping::find(api, id).await,
        (None, None) => Err(ApiError::MissingData),
    }
}

fn build_request(cart: &CartState, form: &CheckoutForm, method: &ShippingMethod) -> OrderRequest {
    let discounted = cart.discounted_subtotal();

    OrderRequest {
        items: cart
            .lines()
            .iter()
            .map(|line| OrderItem {
                product_id: line.product_id.clone(),
                name: Some(line.name.clone()),
                quantity: line.quantity,
                unit_price: line.unit_price,
                customization: line.customization.clone(),
            })
            .collect(),
        email: form.email.trim().to_string(),
        phone: form
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from),
        shipping_address: form.shipping_address.clone(),
        billing_address: form.billing(),
        shipping_method_id: method.id.clone(),
        payment_method: form.payment_method,
        payment_details: form
            .payment_method
            .requires_card()
            .then(|| form.payment.clone()),
        coupon_code: cart.coupon().map(|c| c.code.clone()),
        totals: OrderTotals {
            subtotal: cart.subtotal(),
            discount: cart.discount(),
            shipping: method.price,
            total: discounted + method.price,
        },
        notes: form.notes.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use lensway_core::{LineCustomization, ProductId, UserId};

    use super::*;
    use crate::cart::NewCartLine;

    fn address() -> Address {
        Address {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            line1: "1 Analytical Way".into(),
            city: "Austin".into(),
            state: "TX".into(),
            zip_code: "73301".into(),
            country: "US".into(),
            ..Address::default()
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            email: "ada@example.com".into(),
            shipping_address: address(),
            billing_same_as_shipping: true,
            shipping_method_id: Some(ShippingMethodId::new("standard")),
            payment: PaymentDetails {
                cardholder_name: "Ada Lovelace".into(),
                card_number: "4242 4242 4242 4242".into(),
                expiry: "09/27".into(),
                cvv: "123".into(),
            },
            ..CheckoutForm::default()
        }
    }

    fn cart() -> CartState {
        let mut cart = CartState::new();
        cart.add(NewCartLine {
            product_id: ProductId::new("p1"),
            name: "Round frame".into(),
            image: None,
            unit_price: Decimal::new(8900, 2),
            quantity: 1,
            customization: LineCustomization::None,
        })
        .unwrap();
        cart
    }

    fn customer() -> CurrentCustomer {
        CurrentCustomer {
            id: UserId::new("u1"),
            email: "ada@example.com".into(),
            name: None,
        }
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(form().validate(&cart()).is_ok());
    }

    #[test]
    fn test_bad_zip_is_reported() {
        let mut form = form();
        form.shipping_address.zip_code = "ABCDE".into();
        let errors = form.validate(&cart()).unwrap_err();
        assert_eq!(
            errors.get("shipping.zip_code"),
            Some("Please enter a valid ZIP code")
        );
    }

    #[test]
    fn test_all_failures_reported_together() {
        let mut form = form();
        form.email = "nope".into();
        form.payment.expiry = "2027-09".into();
        form.shipping_address.city = String::new();
        let errors = form.validate(&cart()).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.get("email").is_some());
        assert!(errors.get("payment.expiry").is_some());
        assert_eq!(errors.get("shipping.city"), Some("City is required"));
    }

    #[test]
    fn test_billing_checked_only_when_different() {
        let mut form = form();
        form.billing_same_as_shipping = false;
        let errors = form.validate(&cart()).unwrap_err();
        assert!(errors.get("billing.line1").is_some());

        form.billing_address = Some(address());
        assert!(form.validate(&cart()).is_ok());
    }

    #[test]
    fn test_card_fields_skipped_for_paypal() {
        let mut form = form();
        form.payment = PaymentDetails::default();
        assert!(form.validate(&cart()).is_err());
        form.payment_method = PaymentMethodKind::Paypal;
        assert!(form.validate(&cart()).is_ok());
    }

    #[test]
    fn test_shipping_method_required() {
        let mut form = form();
        form.shipping_method_id = None;
        let errors = form.validate(&cart()).unwrap_err();
        assert!(errors.get("shipping_method_id").is_some());
    }

    #[tokio::test]
    async fn test_guest_is_blocked_before_validation() {
        let api = ApiClient::new("http://10.255.255.1:9");
        let result = submit(&api, None, &cart(), &CheckoutForm::default()).await;
        assert!(matches!(result, Err(CheckoutError::LoginRequired)));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let api = ApiClient::new("http://10.255.255.1:9");
        let result = submit(&api, Some(&customer()), &CartState::new(), &form()).await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn test_request_carries_coupon_and_totals() {
        let mut cart = cart();
        cart.apply_coupon(
            "TEN",
            crate::services::coupons::CouponDiscount {
                code: None,
                discount_amount: Decimal::new(1000, 2),
                final_total: Decimal::new(7900, 2),
            },
        );
        let method = ShippingMethod {
            id: ShippingMethodId::new("standard"),
            name: "Standard".into(),
            price: Decimal::new(500, 2),
            estimated_days: None,
            estimated_delivery: None,
            description: None,
        };
        let request = build_request(&cart, &form(), &method);
        assert_eq!(request.coupon_code.as_deref(), Some("TEN"));
        assert_eq!(request.totals.total, Decimal::new(8400, 2));
        assert_eq!(request.billing_address, request.shipping_address);
        assert!(request.payment_details.is_some());
    }
}
