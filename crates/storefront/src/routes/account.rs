//! Account route handlers. All require a logged-in customer.

use axum::{
    Json,
    extract::Path,
    http::StatusCode,
};
use tracing::instrument;

use lensway_core::{OrderId, Prescription, PrescriptionId};

use super::{ApiJson, ok};
use crate::api::ApiResponse;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{RequireAuth, SessionApi};
use crate::services::cart::{self as backend_cart, BackendCart};
use crate::services::orders::{self, Order};
use crate::services::payments::{self, PaymentMethod};
use crate::services::prescriptions;

/// Order history.
#[instrument(skip_all, fields(customer_id = %customer.id))]
pub async fn orders(
    RequireAuth(customer): RequireAuth,
    SessionApi(api): SessionApi,
) -> Result<ApiJson<Vec<Order>>> {
    Ok(ok(orders::list(&api).await?))
}

/// Order detail.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn order(
    RequireAuth(_customer): RequireAuth,
    SessionApi(api): SessionApi,
    Path(id): Path<String>,
) -> Result<ApiJson<Order>> {
    Ok(ok(orders::get(&api, &OrderId::new(id)).await?))
}

/// Ask the backend to cancel an order.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn cancel_order(
    RequireAuth(_customer): RequireAuth,
    SessionApi(api): SessionApi,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Order>>> {
    let id = OrderId::new(id);
    let order = orders::cancel(&api, &id).await?;
    add_breadcrumb("account", "Cancelled order", Some(&[("order_id", id.as_str())]));

    let message = Some("Your order has been cancelled".to_string());
    Ok(Json(match order {
        Some(order) => ApiResponse::ok(order).with_message(message),
        None => ApiResponse::ok_empty().with_message(message),
    }))
}

/// The backend's cart for this customer.
pub async fn cart(
    RequireAuth(_customer): RequireAuth,
    SessionApi(api): SessionApi,
) -> Result<ApiJson<BackendCart>> {
    Ok(ok(backend_cart::fetch(&api).await?))
}

pub async fn prescriptions(
    RequireAuth(_customer): RequireAuth,
    SessionApi(api): SessionApi,
) -> Result<ApiJson<Vec<Prescription>>> {
    Ok(ok(prescriptions::list(&api).await?))
}

pub async fn prescription(
    RequireAuth(_customer): RequireAuth,
    SessionApi(api): SessionApi,
    Path(id): Path<String>,
) -> Result<ApiJson<Prescription>> {
    Ok(ok(prescriptions::get(&api, &PrescriptionId::new(id)).await?))
}

/// Create a prescription. Presence checks run before the backend is called.
#[instrument(skip_all)]
pub async fn create_prescription(
    RequireAuth(_customer): RequireAuth,
    SessionApi(api): SessionApi,
    Json(prescription): Json<Prescription>,
) -> Result<(StatusCode, ApiJson<Prescription>)> {
    let created = prescriptions::create(&api, &prescription).await?;
    Ok((StatusCode::CREATED, ok(created)))
}

#[instrument(skip_all, fields(prescription_id = %id))]
pub async fn update_prescription(
    RequireAuth(_customer): RequireAuth,
    SessionApi(api): SessionApi,
    Path(id): Path<String>,
    Json(prescription): Json<Prescription>,
) -> Result<ApiJson<Prescription>> {
    let id = PrescriptionId::new(id);
    Ok(ok(prescriptions::update(&api, &id, &prescription).await?))
}

#[instrument(skip_all, fields(prescription_id = %id))]
pub async fn delete_prescription(
    RequireAuth(_customer): RequireAuth,
    SessionApi(api): SessionApi,
    Path(id): Path<String>,
) -> Result<ApiJson<()>> {
    prescriptions::delete(&api, &PrescriptionId::new(id)).await?;
    Ok(Json(
        ApiResponse::ok_empty().with_message(Some("Prescription deleted".to_string())),
    ))
}

/// Payment methods currently enabled.
pub async fn payment_methods(
    RequireAuth(_customer): RequireAuth,
    SessionApi(api): SessionApi,
) -> Result<ApiJson<Vec<PaymentMethod>>> {
    Ok(ok(payments::list(&api).await?))
}
