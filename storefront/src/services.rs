//! Checkout service layer.
//!
//! Sits between the stores and the marketplace API. The storefront never
//! creates holds itself - it asks the server for one, hands the returned
//! expiry to the countdown store, and releases the hold when the buyer
//! abandons checkout or the countdown reports expiry.

use crate::cart::CartState;
use crate::countdown::CountdownAction;
use crate::types::{BatchId, EventId, HoldId, TicketTypeId};
use boxoffice_api::{ApiClient, ApiError, ApiPrefix};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the checkout flow
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A hold needs at least one cart line
    #[error("Cannot create a hold for an empty cart")]
    EmptyCart,

    /// The API call failed (the user notification already fired)
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// One reserved selection inside a hold request
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldRequestItem {
    /// Pricing batch, when the line has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<BatchId>,
    /// Ticket type, absent for flat lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_type_id: Option<TicketTypeId>,
    /// Number of tickets to lock
    pub quantity: u32,
    /// Selected days for multi-day passes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<String>,
}

/// Request body for hold creation
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldRequest {
    /// Event the hold is against
    pub event_id: EventId,
    /// Selections to lock
    pub items: Vec<HoldRequestItem>,
}

impl HoldRequest {
    /// Build a hold request covering every selection in the cart
    ///
    /// Returns `None` for an empty cart.
    #[must_use]
    pub fn from_cart(cart: &CartState) -> Option<Self> {
        let first = cart.items.first()?;
        let event_id = first.event_id.clone();

        let mut items = Vec::new();
        for line in &cart.items {
            if line.has_ticket_types() {
                for child in &line.ticket_types {
                    items.push(HoldRequestItem {
                        batch_id: line.batch_id.clone(),
                        ticket_type_id: Some(child.ticket_type_id.clone()),
                        quantity: child.quantity,
                        days: child.days.clone(),
                    });
                }
            } else {
                items.push(HoldRequestItem {
                    batch_id: line.batch_id.clone(),
                    ticket_type_id: None,
                    quantity: line.quantity,
                    days: Vec::new(),
                });
            }
        }

        Some(Self { event_id, items })
    }
}

/// A server-issued reservation window
///
/// `expires_at` is the hold's absolute expiry; `None` means the server
/// issued an open-ended hold (no countdown is rendered). Ephemeral - never
/// persisted; destroyed when checkout completes, is abandoned, or expires.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationWindow {
    /// Identifier used to release the hold
    pub hold_id: HoldId,
    /// Absolute expiry (ISO-8601 on the wire)
    pub expires_at: Option<DateTime<Utc>>,
}

impl ReservationWindow {
    /// The countdown action that starts tracking this window
    #[must_use]
    pub const fn countdown_action(&self) -> CountdownAction {
        CountdownAction::SetExpiry {
            expires_at: self.expires_at,
        }
    }
}

/// Service for the checkout flow: hold creation and release
#[derive(Clone, Debug)]
pub struct CheckoutService {
    api: ApiClient,
}

impl CheckoutService {
    /// Creates a new `CheckoutService`
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Ask the server to lock inventory for the cart's selections
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] when there is nothing to hold
    /// - [`CheckoutError::Api`] when the request fails (availability is only
    ///   checked server-side, so sold-out surfaces here)
    pub async fn create_hold(&self, cart: &CartState) -> Result<ReservationWindow, CheckoutError> {
        let request = HoldRequest::from_cart(cart).ok_or(CheckoutError::EmptyCart)?;

        tracing::debug!(event = %request.event_id, lines = request.items.len(), "Creating hold");
        let window: ReservationWindow = self
            .api
            .post(ApiPrefix::Payments, "holds", &request)
            .await?;

        Ok(window)
    }

    /// Release a hold, returning its inventory to the pool
    ///
    /// Called when checkout is abandoned or the countdown expires.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::Api`] when the request fails; an already-expired
    /// hold releases server-side on its own, so callers may ignore that.
    pub async fn release_hold(&self, hold_id: &HoldId) -> Result<(), CheckoutError> {
        tracing::debug!(hold = %hold_id, "Releasing hold");
        self.api
            .delete(ApiPrefix::Payments, &format!("holds/{hold_id}"))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::{CartItem, CartTicketType};
    use crate::money::Money;

    fn flat_line(event: &str, batch: Option<&str>, quantity: u32) -> CartItem {
        CartItem {
            event_id: EventId::new(event),
            event_name: event.to_string(),
            event_image: String::new(),
            batch_id: batch.map(BatchId::new),
            batch_name: None,
            price: Money::from_cents(5000),
            quantity,
            ticket_types: Vec::new(),
            is_client_taxed: true,
            is_free: false,
        }
    }

    #[test]
    fn hold_request_covers_flat_lines() {
        let cart = CartState {
            items: vec![flat_line("E1", Some("B1"), 2)],
            last_error: None,
        };

        let request = HoldRequest::from_cart(&cart).unwrap();
        assert_eq!(request.event_id, EventId::new("E1"));
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].quantity, 2);
        assert!(request.items[0].ticket_type_id.is_none());
    }

    #[test]
    fn hold_request_expands_ticket_types() {
        let mut line = flat_line("E1", Some("B1"), 3);
        line.ticket_types = vec![
            CartTicketType {
                ticket_type_id: TicketTypeId::new("full"),
                ticket_type_name: "Full".to_string(),
                price: Some(Money::from_cents(4000)),
                quantity: 2,
                days: Vec::new(),
            },
            CartTicketType {
                ticket_type_id: TicketTypeId::new("pass"),
                ticket_type_name: "Pass".to_string(),
                price: None,
                quantity: 1,
                days: vec!["2025-01-01".to_string()],
            },
        ];
        let cart = CartState {
            items: vec![line],
            last_error: None,
        };

        let request = HoldRequest::from_cart(&cart).unwrap();
        assert_eq!(request.items.len(), 2);
        assert_eq!(
            request.items[1].ticket_type_id,
            Some(TicketTypeId::new("pass"))
        );
        assert_eq!(request.items[1].days, vec!["2025-01-01".to_string()]);
    }

    #[test]
    fn empty_cart_yields_no_request() {
        assert!(HoldRequest::from_cart(&CartState::new()).is_none());
    }

    #[test]
    fn hold_request_serializes_camel_case() {
        let cart = CartState {
            items: vec![flat_line("E1", Some("B1"), 2)],
            last_error: None,
        };
        let request = HoldRequest::from_cart(&cart).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["eventId"], "E1");
        assert_eq!(json["items"][0]["batchId"], "B1");
        assert_eq!(json["items"][0]["quantity"], 2);
    }

    #[test]
    fn reservation_window_parses_iso_expiry() {
        let window: ReservationWindow = serde_json::from_str(
            r#"{"holdId": "h-1", "expiresAt": "2025-06-01T12:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(window.hold_id, HoldId::new("h-1"));
        assert!(window.expires_at.is_some());
    }

    #[test]
    fn reservation_window_tolerates_null_expiry() {
        let window: ReservationWindow =
            serde_json::from_str(r#"{"holdId": "h-2", "expiresAt": null}"#).unwrap();

        assert_eq!(window.expires_at, None);
        assert_eq!(
            window.countdown_action(),
            CountdownAction::SetExpiry { expires_at: None }
        );
    }
}
