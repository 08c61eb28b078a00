//! Filter configuration.
//!
//! The selected strategy and its thresholds are latched separately: picking
//! a strategy through one of the `set_count_*` setters writes both the tag and
//! the thresholds that strategy uses, while thresholds belonging to other
//! strategies are kept but ignored. [`CountNeighborsConfig::predicate`] folds
//! the tag and the live thresholds into a [`Predicate`] when a pass starts.

use std::fmt;

use super::pixel::{CountPixel, InputPixel};
use super::predicate::{CountStrategy, Predicate};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub struct CountNeighborsConfig<P> {
    radius: Vec<usize>,
    selected_strategy: CountStrategy,
    lower_value: P,
    upper_value: P,
    at_value: P,
    pixel_value_of_interest: P,
    pixel_value_flag: bool,
}

impl<P: InputPixel> CountNeighborsConfig<P> {
    /// Defaults for an image with `dimension` axes: radius 1 everywhere,
    /// NONZERO counting, no centre-value gating.
    pub fn new(dimension: usize) -> Self {
        CountNeighborsConfig {
            radius: vec![1; dimension],
            selected_strategy: CountStrategy::NonZero,
            lower_value: P::zero(),
            upper_value: P::zero(),
            at_value: P::zero(),
            pixel_value_of_interest: P::zero(),
            pixel_value_flag: false,
        }
    }

    pub fn set_radius(&mut self, radius: impl Into<Vec<usize>>) -> &mut Self {
        self.radius = radius.into();
        self
    }

    /// Set the same radius on every axis.
    pub fn set_radius_uniform(&mut self, radius: usize) -> &mut Self {
        self.radius.iter_mut().for_each(|r| *r = radius);
        self
    }

    pub fn radius(&self) -> &[usize] {
        &self.radius
    }

    /// Change the strategy tag alone, keeping whatever thresholds are latched.
    pub fn set_selected_strategy(&mut self, strategy: CountStrategy) -> &mut Self {
        self.selected_strategy = strategy;
        self
    }

    pub fn selected_strategy(&self) -> CountStrategy {
        self.selected_strategy
    }

    /// Select a strategy and latch the thresholds it carries.
    pub fn set_strategy(&mut self, predicate: Predicate<P>) -> &mut Self {
        match predicate {
            Predicate::NonZero => {}
            Predicate::Above { lower } => self.lower_value = lower,
            Predicate::Below { upper } => self.upper_value = upper,
            Predicate::Between { lower, upper } => {
                self.lower_value = lower;
                self.upper_value = upper;
            }
            Predicate::At { value } => self.at_value = value,
        }
        self.selected_strategy = predicate.strategy();
        self
    }

    pub fn set_count_above_value(&mut self, value: P) -> &mut Self {
        self.set_strategy(Predicate::Above { lower: value })
    }

    pub fn set_count_below_value(&mut self, value: P) -> &mut Self {
        self.set_strategy(Predicate::Below { upper: value })
    }

    pub fn set_count_between_values(&mut self, lower: P, upper: P) -> &mut Self {
        self.set_strategy(Predicate::Between { lower, upper })
    }

    pub fn set_count_at_value(&mut self, value: P) -> &mut Self {
        self.set_strategy(Predicate::At { value })
    }

    pub fn set_count_non_zero(&mut self) -> &mut Self {
        self.set_strategy(Predicate::NonZero)
    }

    /// Only count neighborhoods whose centre pixel equals `value`.
    pub fn set_value_of_interest(&mut self, value: P) -> &mut Self {
        self.pixel_value_flag = true;
        self.pixel_value_of_interest = value;
        self
    }

    pub fn set_pixel_value_flag(&mut self, enabled: bool) -> &mut Self {
        self.pixel_value_flag = enabled;
        self
    }

    pub fn lower_value(&self) -> P {
        self.lower_value
    }

    pub fn upper_value(&self) -> P {
        self.upper_value
    }

    pub fn at_value(&self) -> P {
        self.at_value
    }

    pub fn pixel_value_of_interest(&self) -> P {
        self.pixel_value_of_interest
    }

    pub fn pixel_value_flag(&self) -> bool {
        self.pixel_value_flag
    }

    /// Centre value required for counting, if gating is enabled.
    pub fn gate(&self) -> Option<P> {
        self.pixel_value_flag.then_some(self.pixel_value_of_interest)
    }

    /// The active strategy with its live thresholds.
    pub fn predicate(&self) -> Predicate<P> {
        match self.selected_strategy {
            CountStrategy::NonZero => Predicate::NonZero,
            CountStrategy::Above => Predicate::Above { lower: self.lower_value },
            CountStrategy::Below => Predicate::Below { upper: self.upper_value },
            CountStrategy::Between => Predicate::Between {
                lower: self.lower_value,
                upper: self.upper_value,
            },
            CountStrategy::At => Predicate::At { value: self.at_value },
        }
    }

    /// Largest count any pixel can receive: `prod(2 * r_i + 1)`.
    ///
    /// `None` if the product does not fit in a `u64`.
    pub fn max_count(&self) -> Option<u64> {
        self.radius.iter().try_fold(1u64, |acc, &r| {
            let side = (r as u64).checked_mul(2)?.checked_add(1)?;
            acc.checked_mul(side)
        })
    }

    /// Check the configuration against an image dimension and output type.
    ///
    /// Returns the predicate to run with.
    pub fn validate<O: CountPixel>(&self, dimension: usize) -> Result<Predicate<P>, ConfigError> {
        if dimension == 0 {
            return Err(ConfigError::ZeroDimensional);
        }
        if self.radius.len() != dimension {
            return Err(ConfigError::RadiusDimension {
                expected: dimension,
                actual: self.radius.len(),
            });
        }
        let max_count = self.max_count().ok_or(ConfigError::NeighborhoodTooLarge)?;
        if usize::try_from(max_count).is_err() {
            return Err(ConfigError::NeighborhoodTooLarge);
        }
        if !O::can_hold(max_count) {
            return Err(ConfigError::CountOverflow { max_count });
        }
        let predicate = self.predicate();
        predicate.validate()?;
        Ok(predicate)
    }
}

impl<P: InputPixel> fmt::Display for CountNeighborsConfig<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Radius: {:?}", self.radius)?;
        writeln!(f, "SelectedStrategy: {}", self.selected_strategy)?;
        writeln!(f, "LowerValue: {:?}", self.lower_value)?;
        writeln!(f, "UpperValue: {:?}", self.upper_value)?;
        writeln!(f, "AtValue: {:?}", self.at_value)?;
        writeln!(f, "PixelValueOfInterest: {:?}", self.pixel_value_of_interest)?;
        write!(f, "PixelValueFlag: {}", self.pixel_value_flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CountNeighborsConfig::<u8>::new(3);
        assert_eq!(config.radius(), &[1, 1, 1]);
        assert_eq!(config.selected_strategy(), CountStrategy::NonZero);
        assert!(!config.pixel_value_flag());
        assert_eq!(config.gate(), None);
        assert_eq!(config.max_count(), Some(27));
    }

    #[test]
    fn test_convenience_setters_latch_thresholds() {
        let mut config = CountNeighborsConfig::<u8>::new(2);
        config.set_count_between_values(12, 33);
        assert_eq!(config.predicate(), Predicate::Between { lower: 12, upper: 33 });

        // Selecting ABOVE overwrites only the lower threshold.
        config.set_count_above_value(100);
        assert_eq!(config.lower_value(), 100);
        assert_eq!(config.upper_value(), 33);
        assert_eq!(config.predicate(), Predicate::Above { lower: 100 });

        config.set_count_at_value(7).set_count_non_zero();
        assert_eq!(config.at_value(), 7);
        assert_eq!(config.predicate(), Predicate::NonZero);

        // Going back to BETWEEN via the bare tag reuses latched values.
        config.set_selected_strategy(CountStrategy::Between);
        assert_eq!(config.predicate(), Predicate::Between { lower: 100, upper: 33 });
    }

    #[test]
    fn test_gating_latest_write_wins() {
        let mut config = CountNeighborsConfig::<u8>::new(2);
        config.set_value_of_interest(255);
        assert_eq!(config.gate(), Some(255));

        config.set_pixel_value_flag(false);
        assert_eq!(config.gate(), None);
        assert_eq!(config.pixel_value_of_interest(), 255);

        config.set_pixel_value_flag(true);
        assert_eq!(config.gate(), Some(255));
    }

    #[test]
    fn test_gating_is_idempotent() {
        let mut once = CountNeighborsConfig::<u8>::new(2);
        once.set_value_of_interest(9);
        let mut twice = once.clone();
        twice.set_value_of_interest(9);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_validate_radius_dimension() {
        let mut config = CountNeighborsConfig::<u8>::new(2);
        config.set_radius(vec![1, 1, 1]);
        assert_eq!(
            config.validate::<u8>(2),
            Err(ConfigError::RadiusDimension { expected: 2, actual: 3 })
        );
        assert_eq!(config.validate::<u8>(0), Err(ConfigError::ZeroDimensional));
    }

    #[test]
    fn test_validate_output_capacity() {
        let mut config = CountNeighborsConfig::<u8>::new(2);
        config.set_radius_uniform(7);
        assert!(config.validate::<u8>(2).is_ok()); // 15 * 15 = 225

        config.set_radius_uniform(8);
        assert_eq!(
            config.validate::<u8>(2),
            Err(ConfigError::CountOverflow { max_count: 289 })
        );
        assert!(config.validate::<u16>(2).is_ok());
    }

    #[test]
    fn test_validate_huge_radius() {
        let mut config = CountNeighborsConfig::<u8>::new(3);
        config.set_radius_uniform(usize::MAX / 2);
        assert_eq!(config.validate::<u64>(3), Err(ConfigError::NeighborhoodTooLarge));
    }

    #[test]
    fn test_validate_inverted_between() {
        let mut config = CountNeighborsConfig::<u8>::new(2);
        config.set_count_between_values(40, 10);
        assert!(matches!(
            config.validate::<u8>(2),
            Err(ConfigError::InvertedBounds { .. })
        ));
    }

    #[test]
    fn test_display_lists_every_option() {
        let mut config = CountNeighborsConfig::<u8>::new(2);
        config.set_count_below_value(5);
        let text = config.to_string();
        assert!(text.contains("Radius: [1, 1]"));
        assert!(text.contains("SelectedStrategy: below"));
        assert!(text.contains("UpperValue: 5"));
        assert!(text.contains("PixelValueFlag: false"));
    }
}
