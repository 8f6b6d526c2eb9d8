//! # Denomination Totalizer
//!
//! Turns a drawer count (face value → number of notes/coins) into a balance.
//!
//! ## Counting Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Staff counts the drawer                                                │
//! │                                                                         │
//! │     500 × 5  ─┐                                                         │
//! │     200 × 1  ─┼──► DenominationSet::total() ──► 2900.00                 │
//! │     100 × 2  ─┘            │                                            │
//! │                            ├── unknown face value? → ValidationError    │
//! │                            ├── negative count?     → ValidationError    │
//! │                            └── overflow?           → ValidationError    │
//! │                                                                         │
//! │  ensure_counted(total) ── zero? → ValidationError (nothing was counted) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::ValidationResult;
use crate::MAX_DENOMINATION_COUNT;

/// Face values recognized when no custom set is configured, largest first.
pub const STANDARD_FACE_VALUES: [u32; 9] = [500, 200, 100, 50, 20, 10, 5, 2, 1];

// =============================================================================
// Denomination Counts
// =============================================================================

/// A drawer count as submitted: face value (major units) → count.
///
/// Counts are signed on purpose so a negative entry reaches validation
/// instead of failing deserialization with an opaque message.
///
/// ## Wire Format
/// ```json
/// { "500": 5, "200": 1, "100": 2 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DenominationCounts(BTreeMap<u32, i64>);

impl DenominationCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds counts from `(face_value, count)` pairs. Later pairs for the
    /// same face value replace earlier ones.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, i64)>) -> Self {
        DenominationCounts(pairs.into_iter().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, i64)> + '_ {
        self.0.iter().map(|(face, count)| (*face, *count))
    }
}

// =============================================================================
// Denomination Set
// =============================================================================

/// The face values a drawer may contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenominationSet {
    /// Sorted largest first, no duplicates, no zero.
    face_values: Vec<u32>,
}

impl DenominationSet {
    /// Builds a set from configured face values.
    ///
    /// ## Rules
    /// - at least one face value
    /// - no zero face value
    /// - duplicates are collapsed
    pub fn new(face_values: impl IntoIterator<Item = u32>) -> ValidationResult<Self> {
        let mut values: Vec<u32> = face_values.into_iter().collect();

        if values.is_empty() {
            return Err(ValidationError::Required {
                field: "denominations".to_string(),
            });
        }

        if values.contains(&0) {
            return Err(ValidationError::MustBePositive {
                field: "denomination face value".to_string(),
            });
        }

        values.sort_unstable_by(|a, b| b.cmp(a));
        values.dedup();

        Ok(DenominationSet {
            face_values: values,
        })
    }

    /// The default note and coin set.
    pub fn standard() -> Self {
        DenominationSet {
            face_values: STANDARD_FACE_VALUES.to_vec(),
        }
    }

    pub fn face_values(&self) -> &[u32] {
        &self.face_values
    }

    pub fn contains(&self, face_value: u32) -> bool {
        self.face_values.contains(&face_value)
    }

    /// Computes `Σ(face_value × count)` in minor units.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::denomination::{DenominationCounts, DenominationSet};
    /// use till_core::Money;
    ///
    /// let counts = DenominationCounts::from_pairs([(500, 5), (200, 1), (100, 2)]);
    /// let total = DenominationSet::standard().total(&counts).unwrap();
    /// assert_eq!(total, Money::from_major(2900));
    ///
    /// let negative = DenominationCounts::from_pairs([(100, -1)]);
    /// assert!(DenominationSet::standard().total(&negative).is_err());
    /// ```
    ///
    /// An empty or all-zero count yields zero; rejecting that is a business
    /// rule applied by [`ensure_counted`].
    pub fn total(&self, counts: &DenominationCounts) -> ValidationResult<Money> {
        let mut total = Money::zero();

        for (face_value, count) in counts.iter() {
            if !self.contains(face_value) {
                return Err(ValidationError::NotAllowed {
                    field: format!("denomination {}", face_value),
                    allowed: self.face_values.iter().map(|v| v.to_string()).collect(),
                });
            }

            if !(0..=MAX_DENOMINATION_COUNT).contains(&count) {
                return Err(ValidationError::OutOfRange {
                    field: format!("count of {}", face_value),
                    min: 0,
                    max: MAX_DENOMINATION_COUNT,
                });
            }

            let subtotal = Money::from_major(i64::from(face_value))
                .checked_mul(count)
                .ok_or_else(|| overflow("denomination total"))?;

            total = total
                .checked_add(subtotal)
                .ok_or_else(|| overflow("denomination total"))?;
        }

        Ok(total)
    }
}

impl Default for DenominationSet {
    fn default() -> Self {
        DenominationSet::standard()
    }
}

/// Rejects a zero balance for open/close: a zero count means no cash was
/// actually counted.
pub fn ensure_counted(total: Money, field: &str) -> ValidationResult<Money> {
    if !total.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(total)
}

fn overflow(field: &str) -> ValidationError {
    ValidationError::Overflow {
        field: field.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worked_example_totals() {
        let set = DenominationSet::standard();

        let opening = DenominationCounts::from_pairs([(500, 5), (200, 1), (100, 2)]);
        assert_eq!(set.total(&opening).unwrap(), Money::from_major(2900));

        let closing = DenominationCounts::from_pairs([(500, 8), (200, 2), (100, 1)]);
        assert_eq!(set.total(&closing).unwrap(), Money::from_major(4500));
    }

    #[test]
    fn test_total_matches_sum_of_products() {
        let set = DenominationSet::standard();
        let counts = DenominationCounts::from_pairs([
            (500, 3),
            (200, 0),
            (100, 7),
            (50, 11),
            (20, 4),
            (10, 9),
            (5, 1),
            (2, 13),
            (1, 17),
        ]);
        let expected: i64 = counts.iter().map(|(f, c)| i64::from(f) * c).sum();

        assert_eq!(set.total(&counts).unwrap(), Money::from_major(expected));
    }

    #[test]
    fn test_zero_total_is_a_valid_computation() {
        let set = DenominationSet::standard();
        assert_eq!(set.total(&DenominationCounts::new()).unwrap(), Money::zero());
        assert_eq!(
            set.total(&DenominationCounts::from_pairs([(500, 0)])).unwrap(),
            Money::zero()
        );
    }

    #[test]
    fn test_negative_count_rejected() {
        let set = DenominationSet::standard();
        let counts = DenominationCounts::from_pairs([(500, 2), (100, -1)]);

        let err = set.total(&counts).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_unknown_face_value_rejected() {
        let set = DenominationSet::standard();
        let counts = DenominationCounts::from_pairs([(1000, 1)]);

        let err = set.total(&counts).unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));
    }

    #[test]
    fn test_excessive_count_rejected() {
        let set = DenominationSet::standard();
        let counts = DenominationCounts::from_pairs([(500, MAX_DENOMINATION_COUNT + 1)]);
        assert!(set.total(&counts).is_err());
    }

    #[test]
    fn test_custom_set() {
        let set = DenominationSet::new([1000, 10, 500, 10]).unwrap();
        assert_eq!(set.face_values(), &[1000, 500, 10]);
        assert!(set.contains(1000));
        assert!(!set.contains(200));

        assert!(DenominationSet::new(Vec::<u32>::new()).is_err());
        assert!(DenominationSet::new([100, 0]).is_err());
    }

    #[test]
    fn test_ensure_counted() {
        assert!(ensure_counted(Money::zero(), "opening balance").is_err());
        assert_eq!(
            ensure_counted(Money::from_major(10), "opening balance").unwrap(),
            Money::from_major(10)
        );
    }

    #[test]
    fn test_counts_deserialize_from_json_object() {
        let counts: DenominationCounts =
            serde_json::from_str(r#"{"500": 5, "200": 2, "100": -1}"#).unwrap();
        assert_eq!(
            counts,
            DenominationCounts::from_pairs([(500, 5), (200, 2), (100, -1)])
        );

        let json = serde_json::to_string(&DenominationCounts::from_pairs([(100, 2), (500, 5)]))
            .unwrap();
        assert_eq!(json, r#"{"100":2,"500":5}"#);
    }
}
