//! Typed client for the model router.

pub mod client;

pub use client::{AskRequest, AskResponse, RouterClient, SdkError};
