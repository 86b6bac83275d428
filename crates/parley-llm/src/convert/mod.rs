//! Conversion between canonical types and backend wire formats

pub mod completions;
pub mod responses;
