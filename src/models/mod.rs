//! Models Module
//!
//! Response DTOs for the REST API.

pub mod responses;

pub use responses::*;
