//! Money value object and currency display helpers.
//!
//! Prices are carried as whole cents (`u64`) to avoid floating-point
//! arithmetic errors. Display formatting targets Brazilian reais, the
//! marketplace's currency: `Money::from_cents(123_456)` renders as
//! `"R$ 1.234,56"`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents money in cents to avoid floating-point arithmetic errors
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero cents
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Adds two money amounts, clamping at `u64::MAX` cents
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Multiplies money by a quantity with overflow checking
    #[must_use]
    pub const fn checked_mul(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Multiplies money by a quantity, clamping at `u64::MAX` cents
    #[must_use]
    pub const fn saturating_mul(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as u64))
    }

    /// Formats the amount as a Brazilian currency string
    ///
    /// Dot as the thousands separator, comma as the decimal separator:
    /// 1250 cents formats as `"R$ 12,50"`, 123456 cents as `"R$ 1.234,56"`.
    #[must_use]
    pub fn to_brl(&self) -> String {
        let units = self.0 / 100;
        let cents = self.0 % 100;

        let digits = units.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (position, digit) in digits.chars().enumerate() {
            if position > 0 && (digits.len() - position) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(digit);
        }

        format!("R$ {grouped},{cents:02}")
    }

    /// Reads a display-formatted currency string back into cents
    ///
    /// This is the lossy, format-coupled inverse of [`Money::to_brl`]: every
    /// non-digit character is stripped and the remaining digits are read as
    /// an integer number of cents (`"R$ 12,50"` → 1250). It is not a general
    /// decimal parser; strings with no digits read as zero.
    #[must_use]
    pub fn from_brl_display(display: &str) -> Self {
        let cents = display
            .chars()
            .filter(char::is_ascii_digit)
            .fold(0_u64, |total, digit| {
                total
                    .saturating_mul(10)
                    .saturating_add(u64::from(digit as u8 - b'0'))
            });

        Self(cents)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_brl())
    }
}
