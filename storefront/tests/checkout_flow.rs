//! End-to-end checkout flow: create a hold against a mock API, feed its
//! expiry to the countdown store, observe exactly one expiry event, then
//! release the hold and clear the cart.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use boxoffice_api::{ApiClient, TracingNotifier};
use boxoffice_core::environment::{KeyValueStore, SystemClock};
use boxoffice_runtime::Store;
use boxoffice_storage::MemoryStore;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use storefront::cart::{
    CART_CACHE_KEY, CartAction, CartEnvironment, CartItemDraft, CartReducer, CartState,
};
use storefront::countdown::{
    CountdownAction, CountdownEnvironment, CountdownReducer, CountdownState,
};
use storefront::money::Money;
use storefront::services::CheckoutService;
use storefront::types::{BatchId, EventId, HoldId};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn draft() -> CartItemDraft {
    CartItemDraft {
        event_id: EventId::new("rock-night"),
        event_name: "Rock Night".to_string(),
        event_image: String::new(),
        batch_id: Some(BatchId::new("b-1")),
        batch_name: Some("1st batch".to_string()),
        price: Money::from_cents(5000),
        ticket_types: Vec::new(),
        is_client_taxed: true,
        is_free: false,
    }
}

#[tokio::test]
async fn hold_expiry_releases_the_cart() {
    let server = MockServer::start().await;
    let expires_at = Utc::now() + ChronoDuration::seconds(2);

    Mock::given(method("POST"))
        .and(path("/payments/holds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "holdId": "h-1",
            "expiresAt": expires_at.to_rfc3339(),
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/payments/holds/h-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    // Cart with a selection, persisted in the shared cache.
    let cache = Arc::new(MemoryStore::new());
    let cart = Store::new(
        CartState::new(),
        CartReducer::new(),
        CartEnvironment::new(cache.clone()),
    );
    cart.send(CartAction::AddItem {
        item: draft(),
        quantity: 2,
    })
    .await
    .unwrap();
    assert!(cache.get(CART_CACHE_KEY).is_some());

    // Create the hold server-side.
    let api = ApiClient::new(server.uri(), Arc::new(TracingNotifier)).unwrap();
    let service = CheckoutService::new(api);
    let window = service
        .create_hold(&cart.state(Clone::clone).await)
        .await
        .unwrap();
    assert_eq!(window.hold_id, HoldId::new("h-1"));

    // Hand the expiry to the countdown and wait for the terminal event.
    let countdown = Store::new(
        CountdownState::new(),
        CountdownReducer::new(),
        CountdownEnvironment::new(Arc::new(SystemClock)),
    );
    let mut actions = countdown.subscribe_actions();

    let expired = countdown
        .send_and_wait_for(
            window.countdown_action(),
            |action| matches!(action, CountdownAction::Expired { .. }),
            Duration::from_secs(10),
        )
        .await
        .unwrap();
    assert!(matches!(expired, CountdownAction::Expired { .. }));
    assert!(countdown.state(CountdownState::is_expired).await);

    // The expiry fires exactly once. The subscription predates SetExpiry,
    // so its backlog holds the full action history: count the terminal
    // events seen over a generous window.
    let mut expired_count = 0;
    let _ = tokio::time::timeout(Duration::from_millis(1500), async {
        loop {
            match actions.recv().await {
                Ok(CountdownAction::Expired { .. }) => expired_count += 1,
                Ok(_) => {},
                Err(_) => break,
            }
        }
    })
    .await;
    assert_eq!(expired_count, 1, "Expired must fire exactly once");

    // Expiry handler: release the hold and drop the cart.
    service.release_hold(&window.hold_id).await.unwrap();
    cart.send(CartAction::ClearCart).await.unwrap();

    assert!(cart.state(CartState::is_empty).await);
    assert!(cache.get(CART_CACHE_KEY).is_none());
}

#[tokio::test]
async fn create_hold_rejects_an_empty_cart() {
    let server = MockServer::start().await;
    let api = ApiClient::new(server.uri(), Arc::new(TracingNotifier)).unwrap();
    let service = CheckoutService::new(api);

    let result = service.create_hold(&CartState::new()).await;
    assert!(matches!(
        result,
        Err(storefront::services::CheckoutError::EmptyCart)
    ));
}

#[tokio::test]
async fn open_ended_holds_leave_the_countdown_idle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payments/holds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "holdId": "h-2",
            "expiresAt": null,
        })))
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryStore::new());
    let cart = Store::new(
        CartState::new(),
        CartReducer::new(),
        CartEnvironment::new(cache),
    );
    cart.send(CartAction::AddItem {
        item: draft(),
        quantity: 1,
    })
    .await
    .unwrap();

    let api = ApiClient::new(server.uri(), Arc::new(TracingNotifier)).unwrap();
    let service = CheckoutService::new(api);
    let window = service
        .create_hold(&cart.state(Clone::clone).await)
        .await
        .unwrap();
    assert_eq!(window.expires_at, None);

    let countdown = Store::new(
        CountdownState::new(),
        CountdownReducer::new(),
        CountdownEnvironment::new(Arc::new(SystemClock)),
    );
    countdown.send(window.countdown_action()).await.unwrap();

    assert!(countdown.state(CountdownState::is_idle).await);
    assert_eq!(countdown.state(CountdownState::display).await, None);
}
