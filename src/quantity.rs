//! Quantity parsing
//!
//! Raw quantities come straight from a text input, so parsing is lenient: leading
//! whitespace and an optional sign are accepted, the leading run of digits is used, and
//! anything after it is ignored (`"3 items"` reads as `3`).

use thiserror::Error;

/// Smallest quantity that can be committed for a line.
pub const MIN_COMMITTED_QUANTITY: u32 = 1;

/// Quantity validation failures. All of them are recovered locally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The input did not start with an integer.
    #[error("quantity {0:?} is not a number")]
    NotANumber(String),

    /// The quantity is below the minimum that can be committed.
    #[error("Quantity must be at least {minimum}")]
    BelowMinimum {
        /// Quantity that was entered.
        requested: i64,
        /// Smallest accepted quantity.
        minimum: u32,
    },

    /// The quantity exceeds the stock available for the line.
    #[error("Maximum stock available: {max}")]
    AboveStock {
        /// Quantity that was entered.
        requested: u32,
        /// Stock available.
        max: u32,
    },
}

/// Result of validating a committed quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommittedQuantity {
    /// The quantity is valid and should be sent to the storefront.
    Accepted(u32),

    /// The quantity was out of range and has been clamped. Nothing is sent.
    Clamped {
        /// Quantity after clamping.
        quantity: u32,
        /// Why the input was rejected.
        reason: QuantityError,
    },
}

impl CommittedQuantity {
    /// The quantity to display, after any clamping.
    pub fn quantity(&self) -> u32 {
        match self {
            Self::Accepted(quantity) | Self::Clamped { quantity, .. } => *quantity,
        }
    }
}

/// Reads the leading integer from `raw`, if any. Saturates instead of overflowing.
pub fn parse_leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let mut value: Option<i64> = None;

    for digit in digits.chars().map_while(|c| c.to_digit(10)) {
        let current = value.unwrap_or(0);

        value = Some(current.saturating_mul(10).saturating_add(i64::from(digit)));
    }

    value.map(|value| if negative { -value } else { value })
}

/// Parses a quantity being typed. Invalid or negative input reads as zero.
pub fn parse_input(raw: &str) -> u32 {
    parse_leading_integer(raw).map_or(0, saturate)
}

/// Validates a committed quantity against the minimum and an optional stock limit.
pub fn parse_commit(raw: &str, max_stock: Option<u32>) -> CommittedQuantity {
    let Some(requested) = parse_leading_integer(raw) else {
        return CommittedQuantity::Clamped {
            quantity: MIN_COMMITTED_QUANTITY,
            reason: QuantityError::NotANumber(raw.to_string()),
        };
    };

    if requested < i64::from(MIN_COMMITTED_QUANTITY) {
        return CommittedQuantity::Clamped {
            quantity: MIN_COMMITTED_QUANTITY,
            reason: QuantityError::BelowMinimum {
                requested,
                minimum: MIN_COMMITTED_QUANTITY,
            },
        };
    }

    let requested = saturate(requested);

    match max_stock.filter(|max| *max > 0) {
        Some(max) if requested > max => CommittedQuantity::Clamped {
            quantity: max,
            reason: QuantityError::AboveStock { requested, max },
        },
        _ => CommittedQuantity::Accepted(requested),
    }
}

/// Parses an add-to-cart quantity. Blank input defaults to one.
///
/// # Errors
///
/// Returns a [`QuantityError`] if the input is not a number or is below one.
pub fn parse_add_quantity(raw: &str) -> Result<u32, QuantityError> {
    if raw.trim().is_empty() {
        return Ok(MIN_COMMITTED_QUANTITY);
    }

    let requested =
        parse_leading_integer(raw).ok_or_else(|| QuantityError::NotANumber(raw.to_string()))?;

    if requested < i64::from(MIN_COMMITTED_QUANTITY) {
        return Err(QuantityError::BelowMinimum {
            requested,
            minimum: MIN_COMMITTED_QUANTITY,
        });
    }

    Ok(saturate(requested))
}

fn saturate(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn leading_integer_is_lenient() {
        assert_eq!(parse_leading_integer("3"), Some(3));
        assert_eq!(parse_leading_integer("  12abc"), Some(12));
        assert_eq!(parse_leading_integer("+4"), Some(4));
        assert_eq!(parse_leading_integer("-2"), Some(-2));
        assert_eq!(parse_leading_integer("abc"), None);
        assert_eq!(parse_leading_integer(""), None);
        assert_eq!(parse_leading_integer("-"), None);
    }

    #[test]
    fn leading_integer_saturates() {
        assert_eq!(parse_leading_integer("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn input_clamps_invalid_and_negative_to_zero() {
        assert_eq!(parse_input("7"), 7);
        assert_eq!(parse_input("-3"), 0);
        assert_eq!(parse_input(""), 0);
        assert_eq!(parse_input("x"), 0);
        assert_eq!(parse_input("5000000000"), u32::MAX);
    }

    #[test]
    fn commit_accepts_in_range() {
        assert_eq!(parse_commit("3", Some(10)), CommittedQuantity::Accepted(3));
        assert_eq!(parse_commit("10", Some(10)), CommittedQuantity::Accepted(10));
        assert_eq!(parse_commit("250", None), CommittedQuantity::Accepted(250));
    }

    #[test]
    fn commit_clamps_zero_and_negative_to_one() {
        for raw in ["0", "-4"] {
            let committed = parse_commit(raw, Some(10));

            assert_eq!(committed.quantity(), 1, "{raw} should clamp to 1");
            assert!(matches!(
                committed,
                CommittedQuantity::Clamped {
                    reason: QuantityError::BelowMinimum { minimum: 1, .. },
                    ..
                }
            ));
        }
    }

    #[test]
    fn commit_treats_garbage_as_below_minimum() {
        assert_eq!(
            parse_commit("lots", None),
            CommittedQuantity::Clamped {
                quantity: 1,
                reason: QuantityError::NotANumber("lots".to_string()),
            }
        );
    }

    #[test]
    fn commit_clamps_to_stock() {
        assert_eq!(
            parse_commit("12", Some(5)),
            CommittedQuantity::Clamped {
                quantity: 5,
                reason: QuantityError::AboveStock {
                    requested: 12,
                    max: 5
                },
            }
        );
    }

    #[test]
    fn commit_ignores_zero_stock() {
        assert_eq!(parse_commit("12", Some(0)), CommittedQuantity::Accepted(12));
    }

    #[test]
    fn stock_error_message() {
        let error = QuantityError::AboveStock {
            requested: 12,
            max: 5,
        };

        assert_eq!(error.to_string(), "Maximum stock available: 5");
    }

    #[test]
    fn add_quantity_defaults_to_one() -> TestResult {
        assert_eq!(parse_add_quantity("")?, 1);
        assert_eq!(parse_add_quantity("  ")?, 1);
        assert_eq!(parse_add_quantity("4")?, 4);

        Ok(())
    }

    #[test]
    fn add_quantity_rejects_zero_and_garbage() {
        assert!(matches!(
            parse_add_quantity("0"),
            Err(QuantityError::BelowMinimum { requested: 0, .. })
        ));
        assert!(matches!(
            parse_add_quantity("two"),
            Err(QuantityError::NotANumber(_))
        ));
    }
}
