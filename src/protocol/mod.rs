//! AirPlay protocol translation
//!
//! Everything between the bytes on the control connection and the
//! backend capability calls: HTTP framing, the two body encodings,
//! unit translation, the fixed response documents, and the per-endpoint
//! handlers tying them together.

#![allow(missing_docs)]

pub mod appletv;
pub mod handler;
pub mod http;
pub mod payload;
pub mod plist;
pub mod position;

#[cfg(test)]
mod handler_tests;

pub use handler::handle_request;
