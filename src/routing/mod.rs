//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request category
//!     → router.rs (lookup)
//!     → cache.rs (current snapshot, refreshed from the source on TTL expiry)
//!     → snapshot.rs (override or default backend)
//!     → backend id
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable; a refresh swaps in a new one atomically
//! - Fetch failures never surface; the last good snapshot keeps serving
//! - Deterministic: same snapshot and category always give the same backend

pub mod cache;
pub mod router;
pub mod snapshot;

pub use cache::{CacheEntry, ConfigCache};
pub use router::Router;
pub use snapshot::RoutingConfig;
