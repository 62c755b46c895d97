//! Checkout total calculation.
//!
//! Derives display totals from in-memory cart state. This mirrors the
//! server's calculation for UX purposes only - the server recomputes the
//! authoritative total at purchase time, and the client never charges off
//! these numbers.
//!
//! A line is priced by the first matching variant:
//!
//! 1. **Day-priced**: any ticket type carries selected days. `item.price`
//!    already holds the server-computed multi-day total, so the total is
//!    that price plus one service fee per ticket unit.
//! 2. **Per-ticket-type**: each child with a known unit price contributes
//!    `(price + fee(price)) × quantity`; day-priced children without a unit
//!    price contribute nothing (they only occur under variant 1).
//! 3. **Flat**: `(price + fee(price)) × quantity` on the line itself.

use crate::cart::{CartItem, CartState};
use crate::fees::FeeConfig;
use crate::money::Money;

/// Total for one cart line, in cents
///
/// Always a non-negative integer number of cents; arithmetic saturates
/// instead of overflowing. Purely derived from in-memory state - no
/// network.
#[must_use]
pub fn item_total(item: &CartItem, fees: &FeeConfig) -> Money {
    let fee = |unit: Money| fees.service_fee.fee_for(unit, item.is_client_taxed);

    if item.is_day_priced() {
        // The fee is charged once per ticket unit, not per day.
        return item
            .price
            .saturating_add(fee(item.price).saturating_mul(item.quantity));
    }

    if item.has_ticket_types() {
        return item
            .ticket_types
            .iter()
            .fold(Money::ZERO, |total, child| match child.price {
                Some(price) => total.saturating_add(
                    price
                        .saturating_add(fee(price))
                        .saturating_mul(child.quantity),
                ),
                None => total,
            });
    }

    item.price
        .saturating_add(fee(item.price))
        .saturating_mul(item.quantity)
}

/// Total for the whole cart, in cents
#[must_use]
pub fn cart_total(state: &CartState, fees: &FeeConfig) -> Money {
    state
        .items
        .iter()
        .fold(Money::ZERO, |total, item| {
            total.saturating_add(item_total(item, fees))
        })
}
