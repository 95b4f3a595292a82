//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request with a primary backend id:
//!     → circuit_breaker.rs (Primary → Fallback → Degraded)
//!     → timeouts.rs (deadline per stage, overall budget per request)
//!     → degradation.rs (canned answer when both model stages fail)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every backend call has a deadline
//! - No retries within a stage; a failure moves the chain forward
//! - The degraded stage cannot fail, so a request inside its budget always answers

pub mod circuit_breaker;
pub mod degradation;
pub mod timeouts;

pub use circuit_breaker::{ChainError, CircuitBreaker, StageError};
pub use degradation::{degraded_response, DEGRADED_ANSWER};
pub use timeouts::StageTimeouts;
