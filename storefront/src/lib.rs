//! Storefront core for the ticketing marketplace.
//!
//! This crate is the client-side state layer of the storefront: everything
//! with actual invariants lives here, while rendering stays in the view
//! layer and every authoritative decision (availability, charging, ticket
//! issuance) stays on the server.
//!
//! - [`cart`]: the cart aggregate - one event per cart, per-batch lines,
//!   day-aware ticket-type merging, synchronous persistence to the cache
//! - [`pricing`]: checkout totals derived from cart state (display only;
//!   the server recomputes at purchase time)
//! - [`fees`]: service-fee and installment schedules as injected config
//! - [`countdown`]: the reservation countdown state machine, reconciling a
//!   server-issued expiry against the wall clock
//! - [`services`]: the checkout service talking to the marketplace API
//!   (hold creation and release)
//! - [`money`]: cents-based money with BRL display formatting
//!
//! # Quick Start
//!
//! ```no_run
//! use boxoffice_runtime::Store;
//! use boxoffice_storage::FileStore;
//! use std::sync::Arc;
//! use storefront::cart::{CartAction, CartEnvironment, CartReducer, CartState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = Arc::new(FileStore::open(".storefront/cache.json"));
//! let env = CartEnvironment::new(cache.clone());
//!
//! // The cart survives restarts: rehydrate, then keep flushing on writes.
//! let store = Store::new(CartState::restore(cache.as_ref()), CartReducer::new(), env);
//!
//! store.send(CartAction::ClearCart).await?;
//! # Ok(())
//! # }
//! ```

pub mod cart;
pub mod config;
pub mod countdown;
pub mod fees;
pub mod money;
pub mod pricing;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use cart::{CartAction, CartEnvironment, CartItem, CartItemDraft, CartReducer, CartState};
pub use config::StorefrontConfig;
pub use countdown::{
    CountdownAction, CountdownEnvironment, CountdownPhase, CountdownReducer, CountdownState,
};
pub use fees::{FeeConfig, InstallmentQuote, ServiceFeePolicy};
pub use money::Money;
pub use services::{CheckoutService, ReservationWindow};
pub use types::{BatchId, EventId, HoldId, TicketTypeId};
