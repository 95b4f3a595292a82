//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, trace span, timeout)
//!     → request.rs (normalize any accepted shape)
//!     → service (route + failover chain)
//!     → response.rs (answer contract or error status)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{normalize, parse_request, X_REQUEST_ID};
pub use response::{AnswerBody, ApiError, ErrorBody, X_ANSWER_STAGE};
pub use server::HttpServer;
