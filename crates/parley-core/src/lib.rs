//! Shared primitives for Parley crates

#![allow(clippy::must_use_candidate)]

mod context;
mod error;

pub use context::RequestContext;
pub use error::HttpError;
