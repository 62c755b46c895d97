//! Request/response types shared across API calls

use serde::Deserialize;
use std::fmt;

/// Fixed set of API namespaces
///
/// Every request is addressed as `{base_url}/{prefix}/{path}`; the prefix
/// enum keeps callers from concatenating arbitrary strings into endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiPrefix {
    /// Event catalog and details
    Events,
    /// Payments, checkout and holds
    Payments,
    /// Issued tickets and transfers
    Tickets,
    /// Accounts and profiles
    Users,
    /// Organizer CRM
    Crm,
    /// Ticket resale marketplace
    Resale,
}

impl ApiPrefix {
    /// Path segment for this namespace
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Payments => "payments",
            Self::Tickets => "tickets",
            Self::Users => "users",
            Self::Crm => "crm",
            Self::Resale => "resale",
        }
    }
}

impl fmt::Display for ApiPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error payload the API attaches to non-2xx responses
///
/// Both fields are optional on the wire; an empty body deserializes to the
/// default and falls through to the generic message.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    /// Internal error code (e.g. `HOLD_EXPIRED`)
    pub code: Option<String>,
    /// Server-provided message; not shown to users, codes are mapped locally
    pub message: Option<String>,
}

/// Fallback message for failures with no mapped code
pub const GENERIC_ERROR_MESSAGE: &str =
    "Something went wrong. Please try again in a few moments.";

/// Map a known internal error code to its user-facing message
///
/// Unknown codes return `None` and the caller falls back to
/// [`GENERIC_ERROR_MESSAGE`].
#[must_use]
pub fn message_for_code(code: &str) -> Option<&'static str> {
    match code {
        "EVENT_SOLD_OUT" => Some("This event is sold out."),
        "BATCH_SOLD_OUT" => Some("This batch is sold out. Check the next batch for availability."),
        "TICKET_LIMIT_REACHED" => Some("You have reached the ticket limit for this event."),
        "HOLD_EXPIRED" => Some("Your reservation expired and the tickets were released."),
        "PAYMENT_REFUSED" => Some("Your payment was refused. Try another payment method."),
        "INSTALLMENTS_UNAVAILABLE" => Some("Installments are not available for this order."),
        "UNAUTHENTICATED" => Some("Your session expired. Sign in again to continue."),
        "RESALE_UNAVAILABLE" => Some("Resale is not enabled for this event."),
        _ => None,
    }
}
