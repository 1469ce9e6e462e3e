//! Per-entry extras coercion.
//!
//! # Invariants
//! - Output key set equals input key set.
//! - One malformed entry fails the whole mapping; no partial output.
//! - Diagnostic logging never changes the produced values.

use crate::logging::sanitize_message;
use crate::model::extra::{BundleMap, BundleValue, ExtraMap, ExtraValue};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Marker prefix requesting a 64-bit integer extra.
pub const LONG_PREFIX: &str = "LONG";

const MAX_LOGGED_VALUE_CHARS: usize = 64;

/// Transforms a caller extras mapping into a new host bundle mapping.
///
/// # Errors
/// - `MalformedLong` when a `LONG`-prefixed string has a non-integer remainder.
pub fn transform_extras(extras: &ExtraMap) -> Result<BundleMap, ExtraTransformError> {
    let mut bundle = BundleMap::new();
    for (key, value) in extras {
        bundle.insert(key.clone(), coerce_extra(key, value)?);
    }
    Ok(bundle)
}

/// Coerces one extras entry.
pub fn coerce_extra(key: &str, value: &ExtraValue) -> Result<BundleValue, ExtraTransformError> {
    debug!(
        "event=extra_transform module=extras stage=before key={} kind={} value={}",
        key,
        value.kind(),
        sanitize_message(&value.to_string(), MAX_LOGGED_VALUE_CHARS)
    );

    let coerced = match value {
        // `as` truncates toward zero, saturates at the i32 bounds and maps NaN to 0.
        ExtraValue::Float(number) => BundleValue::Int(*number as i32),
        ExtraValue::String(text) => match text.strip_prefix(LONG_PREFIX) {
            Some(digits) => match digits.parse::<i64>() {
                Ok(number) => BundleValue::Long(number),
                Err(_) => {
                    return Err(ExtraTransformError::MalformedLong {
                        key: key.to_string(),
                        value: text.clone(),
                    });
                }
            },
            None => BundleValue::String(text.clone()),
        },
        ExtraValue::Integer(number) => BundleValue::Long(*number),
        ExtraValue::Bool(flag) => BundleValue::Bool(*flag),
        ExtraValue::List(items) => BundleValue::List(items.clone()),
        ExtraValue::Map(entries) => BundleValue::Map(entries.clone()),
    };

    debug!(
        "event=extra_transform module=extras stage=after key={} kind={} value={}",
        key,
        coerced.kind(),
        sanitize_message(&coerced.to_string(), MAX_LOGGED_VALUE_CHARS)
    );
    Ok(coerced)
}

/// Extras coercion errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtraTransformError {
    MalformedLong { key: String, value: String },
}

impl Display for ExtraTransformError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedLong { key, value } => write!(
                f,
                "extra `{key}` has `{LONG_PREFIX}` prefix but `{value}` is not a 64-bit integer"
            ),
        }
    }
}

impl Error for ExtraTransformError {}

#[cfg(test)]
mod tests {
    use super::{coerce_extra, transform_extras, ExtraTransformError};
    use crate::model::extra::{BundleValue, ExtraMap, ExtraValue};

    fn coerce(value: ExtraValue) -> Result<BundleValue, ExtraTransformError> {
        coerce_extra("k", &value)
    }

    #[test]
    fn floats_truncate_toward_zero() {
        assert_eq!(coerce(ExtraValue::Float(2.9)), Ok(BundleValue::Int(2)));
        assert_eq!(coerce(ExtraValue::Float(-2.9)), Ok(BundleValue::Int(-2)));
        assert_eq!(coerce(ExtraValue::Float(3.0)), Ok(BundleValue::Int(3)));
        assert_eq!(coerce(ExtraValue::Float(-0.5)), Ok(BundleValue::Int(0)));
    }

    #[test]
    fn floats_saturate_out_of_range() {
        assert_eq!(
            coerce(ExtraValue::Float(1e12)),
            Ok(BundleValue::Int(i32::MAX))
        );
        assert_eq!(
            coerce(ExtraValue::Float(-1e12)),
            Ok(BundleValue::Int(i32::MIN))
        );
        assert_eq!(coerce(ExtraValue::Float(f64::NAN)), Ok(BundleValue::Int(0)));
    }

    #[test]
    fn long_prefix_parses_signed_integers() {
        assert_eq!(coerce("LONG42".into()), Ok(BundleValue::Long(42)));
        assert_eq!(coerce("LONG-7".into()), Ok(BundleValue::Long(-7)));
        assert_eq!(coerce("LONG+7".into()), Ok(BundleValue::Long(7)));
        assert_eq!(
            coerce("LONG9223372036854775807".into()),
            Ok(BundleValue::Long(i64::MAX))
        );
    }

    #[test]
    fn long_prefix_rejects_non_integer_remainder() {
        for raw in [
            "LONG",
            "LONGabc",
            "LONG 1",
            "LONG1.5",
            "LONG9223372036854775808",
        ] {
            let err = coerce(raw.into()).expect_err("malformed remainder must fail");
            assert_eq!(
                err,
                ExtraTransformError::MalformedLong {
                    key: "k".to_string(),
                    value: raw.to_string(),
                }
            );
        }
    }

    #[test]
    fn other_values_pass_through() {
        assert_eq!(
            coerce("long42".into()),
            Ok(BundleValue::String("long42".to_string()))
        );
        assert_eq!(
            coerce(ExtraValue::Bool(false)),
            Ok(BundleValue::Bool(false))
        );
        assert_eq!(coerce(ExtraValue::Integer(5)), Ok(BundleValue::Long(5)));

        let nested = vec![ExtraValue::Float(1.5), ExtraValue::from("LONG1")];
        assert_eq!(
            coerce(ExtraValue::List(nested.clone())),
            Ok(BundleValue::List(nested))
        );
    }

    #[test]
    fn transform_keeps_key_set_and_fails_atomically() {
        let mut extras = ExtraMap::new();
        extras.insert("count".to_string(), ExtraValue::Float(3.7));
        extras.insert("id".to_string(), "LONG10".into());
        extras.insert("name".to_string(), "x".into());

        let bundle = transform_extras(&extras).expect("transform should succeed");
        assert_eq!(
            bundle.keys().collect::<Vec<_>>(),
            extras.keys().collect::<Vec<_>>()
        );
        assert_eq!(bundle["count"], BundleValue::Int(3));
        assert_eq!(bundle["id"], BundleValue::Long(10));

        extras.insert("bad".to_string(), "LONGx".into());
        assert!(transform_extras(&extras).is_err());
        assert_eq!(extras["count"], ExtraValue::Float(3.7));
    }
}
