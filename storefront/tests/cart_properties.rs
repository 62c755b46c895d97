//! Property-based tests for the cart's structural invariants: whatever
//! sequence of commands arrives, the cart holds lines for at most one event
//! and every line with ticket types keeps `quantity == Σ child quantities`.

#![allow(clippy::unwrap_used)] // Test code

use boxoffice_core::reducer::Reducer;
use boxoffice_storage::MemoryStore;
use proptest::prelude::*;
use std::sync::Arc;
use storefront::cart::{
    CartAction, CartEnvironment, CartItemDraft, CartReducer, CartState, CartTicketType,
};
use storefront::money::Money;
use storefront::types::{BatchId, EventId, TicketTypeId};

fn ticket_type_strategy() -> impl Strategy<Value = CartTicketType> {
    (
        prop_oneof![Just("full"), Just("half"), Just("vip")],
        prop::option::of(0_u64..50_000),
        0_u32..6,
        prop::collection::vec(prop_oneof![Just("2025-01-01"), Just("2025-01-02")], 0..2),
    )
        .prop_map(|(id, price, quantity, days)| CartTicketType {
            ticket_type_id: TicketTypeId::new(id),
            ticket_type_name: id.to_string(),
            price: price.map(Money::from_cents),
            quantity,
            days: days.into_iter().map(ToString::to_string).collect(),
        })
}

fn draft_strategy() -> impl Strategy<Value = CartItemDraft> {
    (
        prop_oneof![Just("E1"), Just("E2")],
        prop::option::of(prop_oneof![Just("B1"), Just("B2")]),
        0_u64..100_000,
        prop::collection::vec(ticket_type_strategy(), 0..3),
        any::<bool>(),
    )
        .prop_map(|(event, batch, price, ticket_types, is_client_taxed)| CartItemDraft {
            event_id: EventId::new(event),
            event_name: event.to_string(),
            event_image: String::new(),
            batch_id: batch.map(BatchId::new),
            batch_name: None,
            price: Money::from_cents(price),
            ticket_types,
            is_client_taxed,
            is_free: false,
        })
}

fn action_strategy() -> impl Strategy<Value = CartAction> {
    prop_oneof![
        (draft_strategy(), 0_u32..6).prop_map(|(item, quantity)| CartAction::AddItem {
            item,
            quantity
        }),
        (
            prop_oneof![Just("E1"), Just("E2")],
            prop::option::of(prop_oneof![Just("B1"), Just("B2")]),
            0_u32..10,
        )
            .prop_map(|(event, batch, quantity)| CartAction::UpdateQuantity {
                event_id: EventId::new(event),
                batch_id: batch.map(BatchId::new),
                quantity,
            }),
        (
            prop_oneof![Just("E1"), Just("E2")],
            prop::option::of(prop_oneof![Just("B1"), Just("B2")]),
            prop_oneof![Just("full"), Just("half"), Just("vip")],
            0_u32..10,
        )
            .prop_map(|(event, batch, tt, quantity)| {
                CartAction::UpdateTicketTypeQuantity {
                    event_id: EventId::new(event),
                    batch_id: batch.map(BatchId::new),
                    ticket_type_id: TicketTypeId::new(tt),
                    quantity,
                }
            }),
        (
            prop_oneof![Just("E1"), Just("E2")],
            prop::option::of(prop_oneof![Just("B1"), Just("B2")]),
        )
            .prop_map(|(event, batch)| CartAction::RemoveItem {
                event_id: EventId::new(event),
                batch_id: batch.map(BatchId::new),
            }),
        Just(CartAction::ClearCart),
    ]
}

fn assert_invariants(state: &CartState) {
    // Single-event exclusivity.
    if let Some(first) = state.items.first() {
        assert!(
            state
                .items
                .iter()
                .all(|item| item.event_id == first.event_id),
            "cart holds lines for more than one event"
        );
    }

    // Quantity-sum invariant for every line with a breakdown.
    for item in &state.items {
        if item.has_ticket_types() {
            assert_eq!(
                item.quantity,
                item.ticket_type_quantity(),
                "line quantity diverged from its children"
            );
        }
    }
}

proptest! {
    #[test]
    fn invariants_hold_across_arbitrary_command_sequences(
        actions in prop::collection::vec(action_strategy(), 1..40)
    ) {
        let env = CartEnvironment::new(Arc::new(MemoryStore::new()));
        let reducer = CartReducer::new();
        let mut state = CartState::new();

        for action in actions {
            let _ = reducer.reduce(&mut state, action, &env);
            assert_invariants(&state);
        }
    }

    #[test]
    fn adding_a_second_event_always_replaces_the_cart(
        first in draft_strategy(),
        second in draft_strategy(),
        quantity in 1_u32..5,
    ) {
        prop_assume!(first.event_id != second.event_id);
        // Lines with ticket types derive their quantity from the children;
        // make sure both adds are non-empty.
        prop_assume!(first.ticket_types.is_empty()
            || first.ticket_types.iter().map(|t| t.quantity).sum::<u32>() > 0);
        prop_assume!(second.ticket_types.is_empty()
            || second.ticket_types.iter().map(|t| t.quantity).sum::<u32>() > 0);

        let env = CartEnvironment::new(Arc::new(MemoryStore::new()));
        let reducer = CartReducer::new();
        let mut state = CartState::new();

        let second_event = second.event_id.clone();
        let _ = reducer.reduce(&mut state, CartAction::AddItem { item: first, quantity }, &env);
        let _ = reducer.reduce(&mut state, CartAction::AddItem { item: second, quantity }, &env);

        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].event_id, second_event);
    }
}
