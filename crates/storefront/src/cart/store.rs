//! Session persistence for [`CartState`].

use tower_sessions::Session;

use super::CartState;
use crate::models::session_keys;

/// Load the visitor's cart. A missing or unreadable cart is an empty cart.
pub async fn load_cart(session: &Session) -> CartState {
    match session.get::<CartState>(session_keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Failed to read cart from session: {e}");
            CartState::default()
        }
    }
}

/// Save the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(
    session: &Session,
    cart: &CartState,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}
