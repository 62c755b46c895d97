//! Service-fee and installment-fee policies.
//!
//! Fee schedules are business configuration, not code: the marketplace can
//! reprice without a client release, so everything here is carried by
//! [`FeeConfig`] and injected where totals are computed. The compiled-in
//! defaults are the launch schedule.
//!
//! All arithmetic is integer cents with half-up rounding applied once at the
//! total level; per-installment values may drift from the exact division by
//! a cent, which is accepted for display purposes (the server owns the
//! authoritative charge).

use crate::money::Money;

/// Per-unit service fee charged to the buyer
///
/// Whether the fee applies at all depends on the event's `is_client_taxed`
/// flag: organizers can absorb the fee instead of passing it on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceFeePolicy {
    /// Percentage of the unit price with a floor
    ///
    /// Free tickets on client-taxed events still pay the floor.
    Percentage {
        /// Fee in basis points (599 = 5.99%)
        bps: u32,
        /// Minimum fee per unit
        minimum: Money,
    },

    /// Flat fee per ticket unit
    Fixed(Money),
}

impl ServiceFeePolicy {
    /// Fee for one unit at the given price
    ///
    /// Returns zero when the event is not client-taxed: the fee is assumed
    /// to be absorbed into the ticket price by the organizer.
    #[must_use]
    pub fn fee_for(&self, unit_price: Money, is_client_taxed: bool) -> Money {
        if !is_client_taxed {
            return Money::ZERO;
        }

        match self {
            Self::Percentage { bps, minimum } => {
                let percentage = apply_bps(unit_price, *bps);
                percentage.max(*minimum)
            },
            Self::Fixed(fee) => *fee,
        }
    }
}

/// Surcharge for paying in a given number of installments
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstallmentFee {
    /// Percentage fee in basis points
    pub bps: u32,
    /// Flat fee added on top of the percentage
    pub fixed: Money,
}

/// Fee schedule for 1..=12 installments
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallmentTable {
    fees: [InstallmentFee; 12],
}

impl InstallmentTable {
    /// Build a table from explicit entries (index 0 = single installment)
    #[must_use]
    pub const fn new(fees: [InstallmentFee; 12]) -> Self {
        Self { fees }
    }

    /// Fee entry for an installment count, `None` outside 1..=12
    #[must_use]
    pub fn for_count(&self, installments: u8) -> Option<&InstallmentFee> {
        if installments == 0 {
            return None;
        }
        self.fees.get(usize::from(installments) - 1)
    }
}

impl Default for InstallmentTable {
    /// Launch schedule: single payment is free, everything else pays a flat
    /// R$ 1,49 plus a percentage that grows half a point per extra
    /// installment starting at 5.49% for two.
    fn default() -> Self {
        let fixed = Money::from_cents(149);
        Self::new([
            InstallmentFee { bps: 0, fixed: Money::ZERO },
            InstallmentFee { bps: 549, fixed },
            InstallmentFee { bps: 599, fixed },
            InstallmentFee { bps: 649, fixed },
            InstallmentFee { bps: 699, fixed },
            InstallmentFee { bps: 749, fixed },
            InstallmentFee { bps: 799, fixed },
            InstallmentFee { bps: 849, fixed },
            InstallmentFee { bps: 899, fixed },
            InstallmentFee { bps: 949, fixed },
            InstallmentFee { bps: 999, fixed },
            InstallmentFee { bps: 1049, fixed },
        ])
    }
}

/// An installment plan priced for a specific order total
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstallmentQuote {
    /// Number of installments
    pub installments: u8,
    /// Order total including the installment surcharge
    pub total_with_fee: Money,
    /// Value of each installment (rounded at the total level)
    pub per_installment: Money,
}

/// The full fee configuration injected into pricing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeeConfig {
    /// Per-unit service fee policy
    pub service_fee: ServiceFeePolicy,
    /// Installment surcharge schedule
    pub installments: InstallmentTable,
    /// Orders below this total can only be paid in one installment
    pub min_installment_total: Money,
    /// Hard ceiling on the number of installments the platform offers
    pub max_installments: u8,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            service_fee: ServiceFeePolicy::Percentage {
                bps: 1000,
                minimum: Money::from_cents(100),
            },
            installments: InstallmentTable::default(),
            min_installment_total: Money::from_cents(1000),
            max_installments: 12,
        }
    }
}

impl FeeConfig {
    /// Price an order total for a given number of installments
    ///
    /// `total_with_fee = total + round(total × percentage) + fixed`, then
    /// `per_installment = round(total_with_fee / n)`.
    ///
    /// Returns `None` when the count is outside the offerable range: zero,
    /// above [`FeeConfig::max_installments`], or more than one installment
    /// for a total below [`FeeConfig::min_installment_total`].
    #[must_use]
    pub fn quote(&self, total: Money, installments: u8) -> Option<InstallmentQuote> {
        if installments == 0 || installments > self.max_installments {
            return None;
        }
        if installments > 1 && total < self.min_installment_total {
            return None;
        }

        let fee = self.installments.for_count(installments)?;
        let total_with_fee = total
            .saturating_add(apply_bps(total, fee.bps))
            .saturating_add(fee.fixed);

        let count = u64::from(installments);
        let per_installment =
            Money::from_cents((total_with_fee.cents() + count / 2) / count);

        Some(InstallmentQuote {
            installments,
            total_with_fee,
            per_installment,
        })
    }

    /// Highest installment count offerable for an order
    ///
    /// Totals under the minimum gate are single-installment only. An event
    /// may cap the count further: the effective maximum is
    /// `min(platform max, event max)` whenever the override is positive.
    #[must_use]
    pub fn available_installments(&self, total: Money, event_max: Option<u8>) -> u8 {
        if total < self.min_installment_total {
            return 1;
        }

        match event_max {
            Some(event_cap) if event_cap >= 1 => self.max_installments.min(event_cap),
            _ => self.max_installments,
        }
    }
}

/// `round_half_up(amount × bps / 10000)` in integer cents
fn apply_bps(amount: Money, bps: u32) -> Money {
    Money::from_cents(
        amount
            .cents()
            .saturating_mul(u64::from(bps))
            .saturating_add(5_000)
            / 10_000,
    )
}
