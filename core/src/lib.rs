//! # Boxoffice Core
//!
//! Core traits and types for the Boxoffice storefront architecture.
//!
//! This crate provides the fundamental abstractions for building the
//! client-side state layer of the ticketing storefront using the Reducer
//! pattern: cart, checkout and countdown features are reducers over owned
//! state, with all side effects described as values and executed by the
//! store runtime.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature (cart contents, countdown phase)
//! - **Action**: All possible inputs to a reducer (commands and events)
//! - **Reducer**: `(State, Action, Environment) → Effects`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits (clock, cache)
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O)
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```ignore
//! use boxoffice_core::*;
//!
//! #[derive(Clone, Debug, Default)]
//! struct CartState {
//!     items: Vec<CartItem>,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CartAction {
//!     AddItem { item: CartItemDraft, quantity: u32 },
//!     ItemAdded { opened_cart: bool },
//! }
//!
//! impl Reducer for CartReducer {
//!     type State = CartState;
//!     type Action = CartAction;
//!     type Environment = CartEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CartState,
//!         action: CartAction,
//!         env: &CartEnvironment,
//!     ) -> SmallVec<[Effect<CartAction>; 4]> {
//!         // Business logic goes here
//!         SmallVec::new()
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → Effects`.
/// They contain all business logic and are deterministic and testable; the
/// only ambient inputs they may consult are the dependencies injected via
/// the Environment (clock, persistent cache).
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for CountdownReducer {
    ///     type State = CountdownState;
    ///     type Action = CountdownAction;
    ///     type Environment = CountdownEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut CountdownState,
    ///         action: CountdownAction,
    ///         env: &CountdownEnvironment,
    ///     ) -> SmallVec<[Effect<CountdownAction>; 4]> {
    ///         match action {
    ///             CountdownAction::Tick { .. } => {
    ///                 // Recompute seconds remaining from env.clock
    ///                 SmallVec::new()
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This function:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed by the runtime
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are plain values until the store executes them.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what
    /// should happen, returned from reducers and executed by the Store
    /// runtime. Actions produced by effects are fed back into the reducer
    /// and broadcast to observers.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (for countdown ticks, timeouts)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into
        /// the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Wrap an already-known action so it is re-dispatched and broadcast
        ///
        /// This is how reducers surface notification events (e.g. "cart just
        /// opened", "hold expired") to store observers without performing
        /// any I/O themselves.
        #[must_use]
        pub fn emit(action: Action) -> Effect<Action>
        where
            Action: Send + 'static,
        {
            Effect::Future(Box::pin(std::future::ready(Some(action))))
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};
    use serde::Serialize;
    use serde::de::DeserializeOwned;

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use boxoffice_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let now = clock.now();
    /// assert!(now.timestamp() > 0);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Key-value cache trait - the durable client-side store
    ///
    /// A single process-wide store, keyed by string, holding JSON-serializable
    /// payloads. Implementations persist synchronously on every mutation so
    /// that state survives a restart; reads never hit the network.
    ///
    /// Failure semantics: none surfaced. A corrupt or missing backing store
    /// reads as an empty store, and flush failures are logged by the
    /// implementation rather than returned to the caller.
    pub trait KeyValueStore: Send + Sync {
        /// Upsert - overwrites any existing value unconditionally
        fn add(&self, key: &str, value: serde_json::Value);

        /// Read a value; `None` if the key is absent. Never fails.
        fn get(&self, key: &str) -> Option<serde_json::Value>;

        /// Conditional upsert - only writes if the key already exists
        fn update(&self, key: &str, value: serde_json::Value);

        /// Delete a key; no-op if absent
        fn remove(&self, key: &str);

        /// Empty the entire store (full logout/reset flows only)
        fn clear(&self);
    }

    /// Read a typed value out of a [`KeyValueStore`]
    ///
    /// Returns `None` when the key is absent or the stored payload does not
    /// deserialize as `T` (a corrupt entry reads as missing).
    pub fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
        store
            .get(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Write a typed value into a [`KeyValueStore`]
    ///
    /// Values that fail to serialize are dropped silently; the store keeps
    /// its previous contents for the key.
    pub fn put_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
        if let Ok(json) = serde_json::to_value(value) {
            store.add(key, json);
        }
    }
}
