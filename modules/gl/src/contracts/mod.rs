//! Contract types for GL module operations.

pub mod posting_request;

pub use posting_request::*;
