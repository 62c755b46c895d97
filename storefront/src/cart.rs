//! Cart aggregate for the storefront.
//!
//! The cart holds the tickets a buyer has selected for ONE event: one line
//! per `(event, batch)` pair, optionally broken down per ticket type and
//! day combination. All mutations go through [`CartReducer`], which keeps
//! two invariants:
//!
//! - the cart is empty or holds lines for exactly one event (adding a line
//!   from another event replaces the whole cart - one event's tickets per
//!   cart is a product decision, not a bug);
//! - whenever a line carries ticket types, its quantity equals the sum of
//!   the children's quantities.
//!
//! Every state transition is flushed synchronously to the injected
//! [`KeyValueStore`]: a non-empty cart upserts the `cart` key, an empty cart
//! removes it, so a reload never finds a stale empty-array entry and
//! [`CartState::restore`] can rehydrate the cart at bootstrap.
//!
//! The reducer never navigates. Observers that want the original "jump to
//! checkout after adding" behavior watch for [`CartAction::ItemAdded`] and
//! its `opened_cart` flag on the store's action broadcast.

use crate::money::Money;
use crate::types::{BatchId, EventId, TicketTypeId};
use boxoffice_core::environment::{KeyValueStore, get_json, put_json};
use boxoffice_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cache key the cart persists under
pub const CART_CACHE_KEY: &str = "cart";

// ============================================================================
// Domain types
// ============================================================================

/// Per-ticket-type breakdown of a cart line
///
/// `price` is the unit price in cents; `None` means the type is priced by
/// day (each selected day carries its own price, tracked server-side - the
/// cart only carries the quantity). A non-empty `days` list marks the entry
/// as a multi-day pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTicketType {
    /// Ticket type being purchased
    pub ticket_type_id: TicketTypeId,
    /// Display name ("Full", "Half-price", "VIP")
    pub ticket_type_name: String,
    /// Unit price in cents; `None` when priced by day
    pub price: Option<Money>,
    /// Number of tickets of this type
    pub quantity: u32,
    /// Selected days for multi-day passes; empty for single-day types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<String>,
}

impl CartTicketType {
    /// Whether this entry is a multi-day pass
    #[must_use]
    pub fn is_day_priced(&self) -> bool {
        !self.days.is_empty()
    }

    /// Two entries are the same line iff the ticket type matches and the
    /// day sets are equal as sorted lists
    ///
    /// Both-empty day sets compare equal; an entry with days never merges
    /// with an entry without.
    #[must_use]
    pub fn same_line(&self, other: &Self) -> bool {
        self.ticket_type_id == other.ticket_type_id && self.sorted_days() == other.sorted_days()
    }

    fn sorted_days(&self) -> Vec<&str> {
        let mut days: Vec<&str> = self.days.iter().map(String::as_str).collect();
        days.sort_unstable();
        days
    }
}

/// One cart line: a `(event, batch)` pair with its selection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Owning event
    pub event_id: EventId,
    /// Event name, display only
    pub event_name: String,
    /// Event image URL, display only
    pub event_image: String,
    /// Pricing batch, when the event sells in batches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<BatchId>,
    /// Batch display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_name: Option<String>,
    /// Price in cents; the unit price for flat lines, the precomputed
    /// multi-day total for day-priced lines
    pub price: Money,
    /// Total ticket count for this line
    pub quantity: u32,
    /// Optional per-ticket-type breakdown; empty means a flat line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ticket_types: Vec<CartTicketType>,
    /// Whether the service fee is charged on top of the price
    pub is_client_taxed: bool,
    /// Free-ticket flag
    pub is_free: bool,
}

impl CartItem {
    /// Whether this line carries a ticket-type breakdown
    #[must_use]
    pub fn has_ticket_types(&self) -> bool {
        !self.ticket_types.is_empty()
    }

    /// Whether any child is a multi-day pass (the day-priced variant)
    #[must_use]
    pub fn is_day_priced(&self) -> bool {
        self.ticket_types.iter().any(CartTicketType::is_day_priced)
    }

    /// Sum of the children's quantities
    #[must_use]
    pub fn ticket_type_quantity(&self) -> u32 {
        self.ticket_types.iter().map(|t| t.quantity).sum()
    }

    /// Sum of `unit price × quantity` over children with a known price
    ///
    /// Only meaningful for the non-day variant; day-priced children carry
    /// no unit price and contribute nothing.
    #[must_use]
    pub fn priced_ticket_type_total(&self) -> Money {
        self.ticket_types
            .iter()
            .fold(Money::ZERO, |total, child| match child.price {
                Some(price) => total.saturating_add(price.saturating_mul(child.quantity)),
                None => total,
            })
    }

    fn matches_line(&self, event_id: &EventId, batch_id: Option<&BatchId>) -> bool {
        self.event_id == *event_id && self.batch_id.as_ref() == batch_id
    }
}

/// The `addItem` payload: a [`CartItem`] without its quantity
///
/// The quantity travels separately in [`CartAction::AddItem`]; for lines
/// with ticket types the effective quantity is always re-derived from the
/// children so the sum invariant holds from the first insert.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemDraft {
    /// Owning event
    pub event_id: EventId,
    /// Event name, display only
    pub event_name: String,
    /// Event image URL, display only
    pub event_image: String,
    /// Pricing batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<BatchId>,
    /// Batch display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_name: Option<String>,
    /// Price in cents (unit price, or the day-priced total)
    pub price: Money,
    /// Optional per-ticket-type breakdown
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ticket_types: Vec<CartTicketType>,
    /// Whether the service fee is charged on top of the price
    pub is_client_taxed: bool,
    /// Free-ticket flag
    pub is_free: bool,
}

impl CartItemDraft {
    /// Attach a quantity, producing a full cart line
    ///
    /// Lines with ticket types take their quantity from the children.
    #[must_use]
    pub fn into_item(self, quantity: u32) -> CartItem {
        let mut item = CartItem {
            event_id: self.event_id,
            event_name: self.event_name,
            event_image: self.event_image,
            batch_id: self.batch_id,
            batch_name: self.batch_name,
            price: self.price,
            quantity,
            ticket_types: self.ticket_types,
            is_client_taxed: self.is_client_taxed,
            is_free: self.is_free,
        };

        if item.has_ticket_types() {
            item.quantity = item.ticket_type_quantity();
        }

        item
    }
}

/// State of the cart aggregate
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CartState {
    /// Cart lines; all share the same `event_id`
    pub items: Vec<CartItem>,
    /// Last validation error (if any)
    pub last_error: Option<String>,
}

impl CartState {
    /// Creates a new empty cart
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate the cart from the persistent cache
    ///
    /// A missing or corrupt `cart` entry restores as an empty cart.
    #[must_use]
    pub fn restore(cache: &dyn KeyValueStore) -> Self {
        let items: Vec<CartItem> = get_json(cache, CART_CACHE_KEY).unwrap_or_default();
        Self {
            items,
            last_error: None,
        }
    }

    /// Whether the cart holds no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total ticket count across all lines
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Find a line by its `(event, batch)` identity
    #[must_use]
    pub fn find(&self, event_id: &EventId, batch_id: Option<&BatchId>) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|item| item.matches_line(event_id, batch_id))
    }
}

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions for the cart aggregate
///
/// Commands carry buyer intent; events are the facts observers react to.
/// Events do not mutate state (the command already did) - they exist on the
/// action broadcast so the view layer can navigate, badge-count, etc.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CartAction {
    // ========== Commands ==========
    /// Command: Add a selection to the cart
    AddItem {
        /// The line to add, without its quantity
        item: CartItemDraft,
        /// Requested quantity (ignored for lines with ticket types, which
        /// derive it from the children)
        quantity: u32,
    },

    /// Command: Set a line's total quantity
    ///
    /// Zero delegates to removal. Lines with ticket types redistribute the
    /// new total proportionally across children.
    UpdateQuantity {
        /// Owning event
        event_id: EventId,
        /// Line batch
        batch_id: Option<BatchId>,
        /// New total quantity
        quantity: u32,
    },

    /// Command: Set one ticket type's quantity (absolute, not a delta)
    UpdateTicketTypeQuantity {
        /// Owning event
        event_id: EventId,
        /// Line batch
        batch_id: Option<BatchId>,
        /// Child ticket type to update
        ticket_type_id: TicketTypeId,
        /// New quantity for that child
        quantity: u32,
    },

    /// Command: Remove a line; no-op if absent
    RemoveItem {
        /// Owning event
        event_id: EventId,
        /// Line batch
        batch_id: Option<BatchId>,
    },

    /// Command: Empty the cart (post-purchase or explicit reset)
    ClearCart,

    // ========== Events ==========
    /// Event: A line was added or merged
    ItemAdded {
        /// Owning event
        event_id: EventId,
        /// Line batch
        batch_id: Option<BatchId>,
        /// True when this add transitioned the cart from empty to non-empty
        /// - the signal callers use to navigate to checkout
        opened_cart: bool,
    },

    /// Event: A line's quantity changed
    QuantityUpdated {
        /// Owning event
        event_id: EventId,
        /// Line batch
        batch_id: Option<BatchId>,
        /// The line's quantity after the change
        quantity: u32,
    },

    /// Event: A line was removed
    ItemRemoved {
        /// Owning event
        event_id: EventId,
        /// Line batch
        batch_id: Option<BatchId>,
    },

    /// Event: The cart was emptied
    CartCleared,

    /// Event: Command validation failed
    ValidationFailed {
        /// Error message
        error: String,
    },
}

impl CartAction {
    /// Whether this action is a command (buyer intent)
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(
            self,
            Self::AddItem { .. }
                | Self::UpdateQuantity { .. }
                | Self::UpdateTicketTypeQuantity { .. }
                | Self::RemoveItem { .. }
                | Self::ClearCart
        )
    }

    /// Whether this action is an event (observable fact)
    #[must_use]
    pub const fn is_event(&self) -> bool {
        !self.is_command()
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the cart reducer
#[derive(Clone)]
pub struct CartEnvironment {
    /// Persistent cache the cart flushes to on every mutation
    pub cache: Arc<dyn KeyValueStore>,
}

impl CartEnvironment {
    /// Creates a new `CartEnvironment`
    #[must_use]
    pub fn new(cache: Arc<dyn KeyValueStore>) -> Self {
        Self { cache }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the cart aggregate
#[derive(Clone, Debug, Default)]
pub struct CartReducer;

impl CartReducer {
    /// Creates a new `CartReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Flush the cart to the persistent cache
    ///
    /// Empty cart ⇔ cache key absent; the cache never holds a stale empty
    /// array.
    fn persist(state: &CartState, env: &CartEnvironment) {
        if state.items.is_empty() {
            env.cache.remove(CART_CACHE_KEY);
        } else {
            put_json(env.cache.as_ref(), CART_CACHE_KEY, &state.items);
        }
    }

    /// Insert or merge an incoming line into the cart
    fn upsert(state: &mut CartState, incoming: CartItem) {
        let position = state
            .items
            .iter()
            .position(|line| line.matches_line(&incoming.event_id, incoming.batch_id.as_ref()));

        let Some(index) = position else {
            state.items.push(incoming);
            return;
        };
        let Some(existing) = state.items.get_mut(index) else {
            return;
        };

        if incoming.has_ticket_types() {
            if existing.has_ticket_types() {
                Self::merge_ticket_types(existing, &incoming);
                existing.quantity = existing.ticket_type_quantity();
                // The incoming aggregate price wins: for day-priced lines it
                // is the server-computed multi-day total.
                existing.price = incoming.price;
            } else {
                existing.quantity = incoming.quantity;
                existing.ticket_types = incoming.ticket_types;
                existing.price = incoming.price;
            }
        } else {
            // Last write wins, no merge.
            existing.quantity = incoming.quantity;
            existing.price = incoming.price;
        }
    }

    /// Merge incoming children into an existing breakdown
    ///
    /// A matching child (same ticket type, same day set) takes the incoming
    /// quantity wholesale; unmatched children are appended.
    fn merge_ticket_types(existing: &mut CartItem, incoming: &CartItem) {
        for child in &incoming.ticket_types {
            match existing
                .ticket_types
                .iter_mut()
                .find(|candidate| candidate.same_line(child))
            {
                Some(target) => target.quantity = child.quantity,
                None => existing.ticket_types.push(child.clone()),
            }
        }
    }

    /// Distribute a new total across children by their current ratio
    ///
    /// `round(child × new/old)` per child, with the rounding remainder
    /// absorbed by the FIRST child (clamped at zero). A prior total of zero
    /// means there is no ratio to scale by; quantities are left untouched.
    fn redistribute(item: &mut CartItem, new_total: u32) {
        let old_total = item.ticket_type_quantity();
        if old_total == 0 {
            return;
        }

        let old = u64::from(old_total);
        let mut rounded: Vec<u32> = item
            .ticket_types
            .iter()
            .map(|child| {
                let scaled = u64::from(child.quantity) * u64::from(new_total);
                u32::try_from((scaled + old / 2) / old).unwrap_or(u32::MAX)
            })
            .collect();

        let sum: i64 = rounded.iter().map(|q| i64::from(*q)).sum();
        let remainder = i64::from(new_total) - sum;
        if let Some(first) = rounded.first_mut() {
            let adjusted = i64::from(*first) + remainder;
            *first = u32::try_from(adjusted.max(0)).unwrap_or(u32::MAX);
        }

        for (child, quantity) in item.ticket_types.iter_mut().zip(rounded) {
            child.quantity = quantity;
        }
    }

    fn remove_line(
        state: &mut CartState,
        env: &CartEnvironment,
        event_id: &EventId,
        batch_id: Option<&BatchId>,
    ) -> SmallVec<[Effect<CartAction>; 4]> {
        let before = state.items.len();
        state
            .items
            .retain(|line| !line.matches_line(event_id, batch_id));

        if state.items.len() == before {
            // No such line; nothing changed, nothing to flush.
            return SmallVec::new();
        }

        state.last_error = None;
        Self::persist(state, env);
        smallvec![Effect::emit(CartAction::ItemRemoved {
            event_id: event_id.clone(),
            batch_id: batch_id.cloned(),
        })]
    }
}

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;
    type Environment = CartEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per cart operation
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            CartAction::AddItem { item, quantity } => {
                let incoming = item.into_item(quantity);
                if incoming.quantity == 0 {
                    state.last_error = Some("Quantity must be greater than zero".to_string());
                    return SmallVec::new();
                }

                let opened_cart = state.items.is_empty();

                // One event's tickets per cart: a line from another event
                // replaces everything currently held.
                let same_event = state
                    .items
                    .first()
                    .is_none_or(|line| line.event_id == incoming.event_id);
                if !same_event {
                    tracing::debug!(
                        event = %incoming.event_id,
                        "Cart held another event, replacing contents"
                    );
                    state.items.clear();
                }

                let event_id = incoming.event_id.clone();
                let batch_id = incoming.batch_id.clone();
                Self::upsert(state, incoming);

                state.last_error = None;
                Self::persist(state, env);

                smallvec![Effect::emit(CartAction::ItemAdded {
                    event_id,
                    batch_id,
                    opened_cart,
                })]
            },

            CartAction::UpdateQuantity {
                event_id,
                batch_id,
                quantity,
            } => {
                if quantity == 0 {
                    return Self::remove_line(state, env, &event_id, batch_id.as_ref());
                }

                let Some(item) = state
                    .items
                    .iter_mut()
                    .find(|line| line.matches_line(&event_id, batch_id.as_ref()))
                else {
                    state.last_error = Some(format!("No cart line for event {event_id}"));
                    return SmallVec::new();
                };

                if item.has_ticket_types() {
                    Self::redistribute(item, quantity);
                    // Re-derive from the children: the first-child clamp can
                    // shift the total, and the sum invariant is what holds.
                    item.quantity = item.ticket_type_quantity();
                    if !item.is_day_priced() {
                        item.price = item.priced_ticket_type_total();
                    }
                } else {
                    item.quantity = quantity;
                }

                let quantity = item.quantity;
                state.last_error = None;
                Self::persist(state, env);

                smallvec![Effect::emit(CartAction::QuantityUpdated {
                    event_id,
                    batch_id,
                    quantity,
                })]
            },

            CartAction::UpdateTicketTypeQuantity {
                event_id,
                batch_id,
                ticket_type_id,
                quantity,
            } => {
                let Some(item) = state
                    .items
                    .iter_mut()
                    .find(|line| line.matches_line(&event_id, batch_id.as_ref()))
                else {
                    state.last_error = Some(format!("No cart line for event {event_id}"));
                    return SmallVec::new();
                };

                let Some(child) = item
                    .ticket_types
                    .iter_mut()
                    .find(|child| child.ticket_type_id == ticket_type_id)
                else {
                    state.last_error =
                        Some(format!("No ticket type {ticket_type_id} on this line"));
                    return SmallVec::new();
                };

                child.quantity = quantity;
                item.quantity = item.ticket_type_quantity();
                if !item.is_day_priced() {
                    item.price = item.priced_ticket_type_total();
                }

                let quantity = item.quantity;
                state.last_error = None;
                Self::persist(state, env);

                smallvec![Effect::emit(CartAction::QuantityUpdated {
                    event_id,
                    batch_id,
                    quantity,
                })]
            },

            CartAction::RemoveItem { event_id, batch_id } => {
                Self::remove_line(state, env, &event_id, batch_id.as_ref())
            },

            CartAction::ClearCart => {
                state.items.clear();
                state.last_error = None;
                Self::persist(state, env);
                smallvec![Effect::emit(CartAction::CartCleared)]
            },

            // ========== Events ==========
            // State already changed when the command ran; events only exist
            // for observers on the action broadcast.
            CartAction::ItemAdded { .. }
            | CartAction::QuantityUpdated { .. }
            | CartAction::ItemRemoved { .. }
            | CartAction::CartCleared => SmallVec::new(),

            CartAction::ValidationFailed { error } => {
                state.last_error = Some(error);
                SmallVec::new()
            },
        }
    }
}
