//! Storefront demo binary.
//!
//! Walks the cart and countdown through a scripted purchase flow without a
//! live API: add selections, merge a day-priced pass, show totals and an
//! installment quote, then run a short reservation countdown to expiry.

use boxoffice_core::environment::SystemClock;
use boxoffice_runtime::Store;
use boxoffice_storage::FileStore;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use storefront::cart::{CartAction, CartEnvironment, CartItemDraft, CartReducer, CartState, CartTicketType};
use storefront::countdown::{
    CountdownAction, CountdownEnvironment, CountdownReducer, CountdownState,
};
use storefront::fees::FeeConfig;
use storefront::money::Money;
use storefront::pricing;
use storefront::types::{BatchId, EventId, TicketTypeId};
use storefront::StorefrontConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=debug,boxoffice_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Storefront Demo ===\n");

    let config = StorefrontConfig::from_env();
    let cache = Arc::new(FileStore::open(&config.cache_path));
    let fees = FeeConfig::default();

    // The cart survives restarts: rehydrate whatever a previous run left.
    let restored = CartState::restore(cache.as_ref());
    if !restored.is_empty() {
        println!(
            "Restored {} ticket(s) from a previous session",
            restored.item_count()
        );
    }

    let cart = Store::new(
        restored,
        CartReducer::new(),
        CartEnvironment::new(cache.clone()),
    );

    // Add a flat batch selection.
    println!("Adding 2 × early bird @ R$ 50,00...");
    cart.send(CartAction::AddItem {
        item: flat_draft("rock-night", "1st batch", 5000),
        quantity: 2,
    })
    .await?;

    // A second line for the same event: a day-priced weekend pass.
    println!("Adding a 5-ticket weekend pass (day-priced)...");
    cart.send(CartAction::AddItem {
        item: pass_draft("rock-night"),
        quantity: 5,
    })
    .await?;

    let (count, total) = cart
        .state(|s| (s.item_count(), pricing::cart_total(s, &fees)))
        .await;
    println!("\nCart: {count} ticket(s), total {total}");

    if let Some(quote) = fees.quote(total, 3) {
        println!(
            "Or 3 × {} (total {})",
            quote.per_installment, quote.total_with_fee
        );
    }

    // Run a short reservation countdown to expiry.
    println!("\nStarting a 3-second reservation hold...");
    let countdown = Store::new(
        CountdownState::new(),
        CountdownReducer::new(),
        CountdownEnvironment::new(Arc::new(SystemClock)),
    );

    let expired = countdown
        .send_and_wait_for(
            CountdownAction::SetExpiry {
                expires_at: Some(Utc::now() + ChronoDuration::seconds(3)),
            },
            |action| matches!(action, CountdownAction::Expired { .. }),
            Duration::from_secs(10),
        )
        .await?;
    println!("Hold expired ({expired:?}), releasing tickets...");

    // Expiry invalidates the cart.
    cart.send(CartAction::ClearCart).await?;
    let empty = cart.state(CartState::is_empty).await;
    println!("Cart cleared: {empty}");

    println!("\n=== Demo Complete ===");
    Ok(())
}

fn flat_draft(event: &str, batch: &str, price_cents: u64) -> CartItemDraft {
    CartItemDraft {
        event_id: EventId::new(event),
        event_name: "Rock Night".to_string(),
        event_image: "https://img.example.com/rock-night.jpg".to_string(),
        batch_id: Some(BatchId::new(batch)),
        batch_name: Some(batch.to_string()),
        price: Money::from_cents(price_cents),
        ticket_types: Vec::new(),
        is_client_taxed: true,
        is_free: false,
    }
}

fn pass_draft(event: &str) -> CartItemDraft {
    CartItemDraft {
        ticket_types: vec![CartTicketType {
            ticket_type_id: TicketTypeId::new("weekend-pass"),
            ticket_type_name: "Weekend pass".to_string(),
            price: None,
            quantity: 5,
            days: vec!["2025-01-01".to_string(), "2025-01-02".to_string()],
        }],
        // Server-computed multi-day total.
        price: Money::from_cents(10_000),
        batch_id: None,
        batch_name: None,
        ..flat_draft(event, "", 0)
    }
}
