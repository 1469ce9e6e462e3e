//! Extras transformation engine.
//!
//! Converts caller extras into the host-safe bundle form. Coercions, in
//! precedence order:
//! 1. float → `int`, truncated toward zero;
//! 2. string with `LONG` prefix → `long` parsed from the remainder;
//! 3. everything else passes through unchanged.

pub mod coerce;

pub use coerce::{coerce_extra, transform_extras, ExtraTransformError, LONG_PREFIX};
