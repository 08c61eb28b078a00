//! Membership predicates applied to each neighbor.
//!
//! | Strategy | Matches when |
//! |----------|--------------|
//! | NonZero  | `v != 0` |
//! | Above    | `v > lower` |
//! | Below    | `v < upper` |
//! | Between  | `lower <= v <= upper` |
//! | At       | `v == at` |

use std::fmt;
use std::str::FromStr;

use super::pixel::InputPixel;
use crate::error::ConfigError;

/// Which family of predicate is selected, without its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CountStrategy {
    Above,
    Below,
    Between,
    At,
    #[default]
    NonZero,
}

impl fmt::Display for CountStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CountStrategy::Above => "above",
            CountStrategy::Below => "below",
            CountStrategy::Between => "between",
            CountStrategy::At => "at",
            CountStrategy::NonZero => "nonzero",
        };
        f.write_str(name)
    }
}

impl FromStr for CountStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "above" => Ok(CountStrategy::Above),
            "below" => Ok(CountStrategy::Below),
            "between" => Ok(CountStrategy::Between),
            "at" => Ok(CountStrategy::At),
            "nonzero" | "non_zero" => Ok(CountStrategy::NonZero),
            other => Err(format!("unknown count strategy '{other}'")),
        }
    }
}

/// A selected strategy together with the thresholds it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate<P> {
    NonZero,
    Above { lower: P },
    Below { upper: P },
    Between { lower: P, upper: P },
    At { value: P },
}

impl<P: InputPixel> Predicate<P> {
    pub fn strategy(&self) -> CountStrategy {
        match self {
            Predicate::NonZero => CountStrategy::NonZero,
            Predicate::Above { .. } => CountStrategy::Above,
            Predicate::Below { .. } => CountStrategy::Below,
            Predicate::Between { .. } => CountStrategy::Between,
            Predicate::At { .. } => CountStrategy::At,
        }
    }

    /// Classify a single pixel value.
    ///
    /// This re-tests the variant on every call; hot loops should match on the
    /// predicate once and hand a specialised closure to the inner loop.
    #[inline]
    pub fn matches(&self, value: P) -> bool {
        match *self {
            Predicate::NonZero => value != P::zero(),
            Predicate::Above { lower } => value > lower,
            Predicate::Below { upper } => value < upper,
            Predicate::Between { lower, upper } => lower <= value && value <= upper,
            Predicate::At { value: at } => value == at,
        }
    }

    /// Reject thresholds that can never match.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Predicate::Between { lower, upper } if lower > upper => Err(ConfigError::InvertedBounds {
                lower: format!("{lower:?}"),
                upper: format!("{upper:?}"),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonzero() {
        let p = Predicate::<u8>::NonZero;
        assert!(!p.matches(0));
        assert!(p.matches(1));
        assert!(p.matches(255));
    }

    #[test]
    fn test_above_is_strict() {
        let p = Predicate::Above { lower: 254u8 };
        assert!(!p.matches(254));
        assert!(p.matches(255));
    }

    #[test]
    fn test_below_is_strict() {
        let p = Predicate::Below { upper: 10i16 };
        assert!(p.matches(-3));
        assert!(p.matches(9));
        assert!(!p.matches(10));
    }

    #[test]
    fn test_between_is_inclusive() {
        let p = Predicate::Between { lower: 12u8, upper: 33u8 };
        assert!(!p.matches(11));
        assert!(p.matches(12));
        assert!(p.matches(33));
        assert!(!p.matches(34));
    }

    #[test]
    fn test_at_and_float_values() {
        let p = Predicate::At { value: 0.5f32 };
        assert!(p.matches(0.5));
        assert!(!p.matches(0.25));
        assert!(Predicate::<f32>::NonZero.matches(-0.1));
    }

    #[test]
    fn test_inverted_between_rejected() {
        let p = Predicate::Between { lower: 9u8, upper: 3u8 };
        assert_eq!(
            p.validate(),
            Err(ConfigError::InvertedBounds { lower: "9".into(), upper: "3".into() })
        );
        assert!(Predicate::Between { lower: 3u8, upper: 3u8 }.validate().is_ok());
    }

    #[test]
    fn test_strategy_names_round_trip() {
        for strategy in [
            CountStrategy::Above,
            CountStrategy::Below,
            CountStrategy::Between,
            CountStrategy::At,
            CountStrategy::NonZero,
        ] {
            assert_eq!(strategy.to_string().parse::<CountStrategy>(), Ok(strategy));
        }
        assert!("median".parse::<CountStrategy>().is_err());
    }
}
