//! Error taxonomy for the simulation core.
//!
//! Only two kinds of failure ever reach the caller of a frame:
//!
//! - **Resource exhaustion**: a pool or fixed container hit its hard cap.
//!   Capacities are never grown at runtime, so this means the configured
//!   budget is too small for the content.
//! - **Contract violations**: the caller broke an API contract (e.g. attached a
//!   component to an object that lacks the state it needs, or used a handle
//!   after the object was released).
//!
//! Level loading adds [`SimError::Level`]; configuration parsing adds
//! [`SimError::Config`]. Missing optional collaborators (sound, collision
//! registry, world geometry) are *not* errors: they are skipped silently.

use stash::{CapacityError, PoolError};
use thiserror::Error;

use crate::object::{Capabilities, ObjectHandle};

/// Errors produced by the simulation core.
#[derive(Error, Debug)]
pub enum SimError {
    /// A fixed-capacity resource is full.
    #[error("{resource} exhausted (capacity {capacity})")]
    ResourceExhaustion {
        /// Which resource ran out.
        resource: &'static str,
        /// Its fixed capacity.
        capacity: usize,
    },

    /// A component was attached to an object that does not provide the state
    /// it operates on.
    #[error("component `{component}` requires capabilities {missing:?} the object does not provide")]
    MissingCapabilities {
        /// Name of the rejected component.
        component: &'static str,
        /// Capabilities the object lacks.
        missing: Capabilities,
    },

    /// A handle referred to an object that was already released.
    #[error("stale object handle {0}")]
    StaleHandle(ObjectHandle),

    /// Level data could not be parsed; the level fails to start.
    #[error("level data failed to load: {0}")]
    Level(#[source] serde_json::Error),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[source] serde_json::Error),
}

impl SimError {
    /// Builds a mapper naming the resource for a [`CapacityError`].
    ///
    /// ```
    /// # use leapling_core::error::SimError;
    /// # use stash::FixedVec;
    /// let mut queue: FixedVec<u8> = FixedVec::new(0);
    /// let err = queue.push(1).map_err(SimError::exhausted("spawn queue")).unwrap_err();
    /// assert!(err.is_resource_exhaustion());
    /// assert_eq!(err.to_string(), "spawn queue exhausted (capacity 0)");
    /// ```
    pub fn exhausted(resource: &'static str) -> impl Fn(CapacityError) -> SimError {
        move |err| SimError::ResourceExhaustion {
            resource,
            capacity: err.capacity,
        }
    }

    /// Returns `true` for [`SimError::ResourceExhaustion`].
    #[must_use]
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(self, Self::ResourceExhaustion { .. })
    }

    /// Returns `true` for API contract violations.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::MissingCapabilities { .. } | Self::StaleHandle(_))
    }
}

impl From<CapacityError> for SimError {
    fn from(err: CapacityError) -> Self {
        Self::ResourceExhaustion {
            resource: "fixed container",
            capacity: err.capacity,
        }
    }
}

impl From<PoolError> for SimError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::Exhausted { capacity } => Self::ResourceExhaustion {
                resource: "object pool",
                capacity,
            },
            PoolError::StaleHandle(handle) => Self::StaleHandle(handle),
        }
    }
}

/// Result alias for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_map_onto_taxonomy() {
        let exhausted: SimError = PoolError::Exhausted { capacity: 4 }.into();
        assert!(exhausted.is_resource_exhaustion());
        assert!(!exhausted.is_contract_violation());
        assert_eq!(exhausted.to_string(), "object pool exhausted (capacity 4)");
    }

    #[test]
    fn missing_capabilities_is_a_contract_violation() {
        let err = SimError::MissingCapabilities {
            component: "movement",
            missing: Capabilities::VELOCITY,
        };
        assert!(err.is_contract_violation());
        assert!(err.to_string().contains("movement"));
    }
}
