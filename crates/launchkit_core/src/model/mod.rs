//! Launch domain model.
//!
//! # Responsibility
//! - Define the request, extras and result shapes shared by the coordinator
//!   and host adapters.
//!
//! # Invariants
//! - Extras values form a closed set; coercion rules match on it exhaustively.
//! - Result payloads never alias caller-owned request state.

pub mod extra;
pub mod request;
pub mod result;
