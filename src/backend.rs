//! Backend entity.
//!
//! # Responsibilities
//! - Represent a single backend server (identity, health, LB metadata)
//! - Validate identity and weight at construction
//! - Produce updated copies for every state change
//!
//! # Design Decisions
//! - Immutable value type: health transitions, connection deltas, and
//!   weight changes return a new `Backend` instead of mutating in place
//! - Structural equality over all fields, so comparing pool snapshots is a
//!   plain slice equality check
//! - Connection count and weight are unsigned; the only runtime weight
//!   check left is the zero case

use std::time::SystemTime;

use thiserror::Error;
use url::Url;

/// Validation errors raised when constructing or updating a [`Backend`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    /// URL scheme is outside the http/https set.
    #[error("URL scheme must be http or https, got {0:?}")]
    UnsupportedScheme(String),

    /// URL has no host component.
    #[error("URL must specify a valid host")]
    MissingHost,

    /// Weight must be at least 1.
    #[error("weight must be positive")]
    NonPositiveWeight,
}

/// A single backend server in a load balancer pool.
///
/// Instances are immutable; concurrent readers never need a lock because
/// nothing is ever written in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    url: Url,
    healthy: bool,
    last_health_check: SystemTime,
    failure_reason: Option<String>,
    connection_count: u64,
    weight: u64,
}

impl Backend {
    /// Create a validated backend.
    ///
    /// Fails if the URL scheme is outside {http, https}, the URL has no
    /// host, or the weight is zero. A failure reason supplied together
    /// with `healthy == true` is dropped.
    pub fn new(
        url: Url,
        healthy: bool,
        last_health_check: SystemTime,
        failure_reason: Option<String>,
        connection_count: u64,
        weight: u64,
    ) -> Result<Self, BackendError> {
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(BackendError::UnsupportedScheme(other.to_string())),
        }
        if !url.has_host() {
            return Err(BackendError::MissingHost);
        }
        if weight == 0 {
            return Err(BackendError::NonPositiveWeight);
        }

        Ok(Self {
            url,
            healthy,
            last_health_check,
            failure_reason: if healthy { None } else { failure_reason },
            connection_count,
            weight,
        })
    }

    /// The backend's address.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Whether the backend is currently eligible for selection.
    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    /// Timestamp of the most recent health observation.
    pub fn last_health_check(&self) -> SystemTime {
        self.last_health_check
    }

    /// Reason the backend is unhealthy; always `None` while healthy.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Number of in-flight connections attributed to this backend.
    pub fn connection_count(&self) -> u64 {
        self.connection_count
    }

    /// Relative selection weight.
    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Return a copy with updated health status and check timestamp.
    ///
    /// A transition to healthy always clears the failure reason, whatever
    /// the caller passed; a transition to unhealthy records the reason
    /// as given (possibly `None`).
    pub fn update_health(
        &self,
        healthy: bool,
        timestamp: SystemTime,
        failure_reason: Option<&str>,
    ) -> Self {
        Self {
            healthy,
            last_health_check: timestamp,
            failure_reason: if healthy {
                None
            } else {
                failure_reason.map(str::to_owned)
            },
            ..self.clone()
        }
    }

    /// Return a copy with the connection count adjusted by `delta`.
    ///
    /// The count floors at zero; no delta magnitude is an error.
    pub fn adjust_connections(&self, delta: i64) -> Self {
        Self {
            connection_count: self.connection_count.saturating_add_signed(delta),
            ..self.clone()
        }
    }

    /// Return a copy carrying `new_weight`, all other fields unchanged.
    pub fn with_weight(&self, new_weight: u64) -> Result<Self, BackendError> {
        if new_weight == 0 {
            return Err(BackendError::NonPositiveWeight);
        }
        Ok(Self {
            weight: new_weight,
            ..self.clone()
        })
    }
}
