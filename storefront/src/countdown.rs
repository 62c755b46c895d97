//! Reservation countdown for the checkout flow.
//!
//! A server-side hold locks inventory until an absolute expiry timestamp.
//! This reducer mirrors that window client-side: it reconciles the expiry
//! against the injected clock on every one-second tick, so a laptop waking
//! from sleep lands on the right number instead of resuming a stale count.
//!
//! The state machine has three phases: **Idle** (no expiry supplied),
//! **Counting** (positive seconds remaining), **Expired** (terminal). On the
//! transition into Expired the reducer emits [`CountdownAction::Expired`]
//! exactly once per expiry value; observers on the store broadcast react by
//! releasing the hold and clearing the cart.
//!
//! Supplying a new expiry bumps an internal generation counter. Tick actions
//! carry the generation they were armed with, so a delayed tick from a
//! superseded expiry is recognized as stale and dropped - that is how the
//! old timer is "torn down" without cancellation plumbing.

use boxoffice_core::environment::Clock;
use boxoffice_core::{DateTime, SmallVec, Utc, effect::Effect, reducer::Reducer, smallvec};
use std::sync::Arc;
use std::time::Duration;

/// Interval between countdown ticks
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Phase of the countdown state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownPhase {
    /// No expiry supplied; nothing rendered
    Idle,
    /// Live countdown with a positive number of seconds remaining
    Counting {
        /// Whole seconds until the expiry
        seconds_left: i64,
    },
    /// Terminal: the hold expired and the expiry event has fired
    Expired,
}

/// State of the reservation countdown
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountdownState {
    /// The expiry currently being counted toward
    pub expires_at: Option<DateTime<Utc>>,
    /// Incremented whenever the expiry changes; stale ticks are dropped
    pub generation: u64,
    /// Current phase
    pub phase: CountdownPhase,
}

impl CountdownState {
    /// Creates a new idle countdown
    #[must_use]
    pub const fn new() -> Self {
        Self {
            expires_at: None,
            generation: 0,
            phase: CountdownPhase::Idle,
        }
    }

    /// Whether no expiry is being tracked
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.phase, CountdownPhase::Idle)
    }

    /// Whether the countdown is live
    #[must_use]
    pub const fn is_counting(&self) -> bool {
        matches!(self.phase, CountdownPhase::Counting { .. })
    }

    /// Whether the hold expired
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self.phase, CountdownPhase::Expired)
    }

    /// The clock string to render, `MM:SS`, while counting
    ///
    /// Idle renders nothing and Expired renders a released message, both
    /// owned by the view layer; only the live clock is produced here.
    #[must_use]
    pub fn display(&self) -> Option<String> {
        match self.phase {
            CountdownPhase::Counting { seconds_left } => Some(format_mm_ss(seconds_left)),
            CountdownPhase::Idle | CountdownPhase::Expired => None,
        }
    }
}

impl Default for CountdownState {
    fn default() -> Self {
        Self::new()
    }
}

/// Format seconds as zero-padded `MM:SS`, clamping negatives to `00:00`
///
/// Holds are sub-hour by contract; there is no hour rollover.
#[must_use]
pub fn format_mm_ss(seconds: i64) -> String {
    let clamped = seconds.max(0);
    format!("{:02}:{:02}", clamped / 60, clamped % 60)
}

/// Actions for the reservation countdown
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CountdownAction {
    /// Command: Track a new expiry (or stop tracking with `None`)
    ///
    /// Resets the state machine; a previously expired countdown starts
    /// counting again toward the new value.
    SetExpiry {
        /// Absolute expiry of the current hold
        expires_at: Option<DateTime<Utc>>,
    },

    /// Command: One-second timer tick
    ///
    /// Carries the generation it was armed with so ticks from a superseded
    /// expiry are dropped.
    Tick {
        /// Generation at arming time
        generation: u64,
    },

    /// Event: The hold expired
    ///
    /// Emitted exactly once per expiry value, on the transition into the
    /// Expired phase. Observers release the hold and clear the cart.
    Expired {
        /// The expiry that was reached
        expires_at: DateTime<Utc>,
    },
}

/// Environment dependencies for the countdown reducer
#[derive(Clone)]
pub struct CountdownEnvironment {
    /// Clock the remaining time is reconciled against
    pub clock: Arc<dyn Clock>,
}

impl CountdownEnvironment {
    /// Creates a new `CountdownEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

/// Reducer for the reservation countdown
#[derive(Clone, Debug, Default)]
pub struct CountdownReducer;

impl CountdownReducer {
    /// Creates a new `CountdownReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Recompute the remaining seconds and transition accordingly
    ///
    /// Counting re-arms the one-second tick; crossing zero transitions to
    /// Expired and emits the expiry event (once - callers reset the phase
    /// before re-evaluating a fresh expiry).
    fn evaluate(
        state: &mut CountdownState,
        env: &CountdownEnvironment,
        expires_at: DateTime<Utc>,
    ) -> SmallVec<[Effect<CountdownAction>; 4]> {
        let seconds_left = (expires_at - env.clock.now()).num_seconds();

        if seconds_left <= 0 {
            let already_expired = state.is_expired();
            state.phase = CountdownPhase::Expired;

            if already_expired {
                return SmallVec::new();
            }

            tracing::debug!(%expires_at, "Reservation hold expired");
            return smallvec![Effect::emit(CountdownAction::Expired { expires_at })];
        }

        state.phase = CountdownPhase::Counting { seconds_left };
        smallvec![Effect::Delay {
            duration: TICK_INTERVAL,
            action: Box::new(CountdownAction::Tick {
                generation: state.generation,
            }),
        }]
    }
}

impl Reducer for CountdownReducer {
    type State = CountdownState;
    type Action = CountdownAction;
    type Environment = CountdownEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CountdownAction::SetExpiry { expires_at } => {
                if expires_at == state.expires_at {
                    // Unchanged expiry: the machine keeps its phase and its
                    // armed tick; re-supplying the same hold is a no-op.
                    return SmallVec::new();
                }

                // Invalidate any tick armed for the previous expiry.
                state.generation += 1;
                state.expires_at = expires_at;
                state.phase = CountdownPhase::Idle;

                match expires_at {
                    Some(at) => Self::evaluate(state, env, at),
                    None => SmallVec::new(),
                }
            },

            CountdownAction::Tick { generation } => {
                if generation != state.generation {
                    // Tick armed for a superseded expiry.
                    return SmallVec::new();
                }

                match state.expires_at {
                    Some(at) if state.is_counting() => Self::evaluate(state, env, at),
                    _ => SmallVec::new(),
                }
            },

            // Notification event; the transition already happened.
            CountdownAction::Expired { .. } => SmallVec::new(),
        }
    }
}
