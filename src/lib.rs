//! Count Neighbors Image Filter
//!
//! For every pixel of an N-dimensional image, count how many pixels inside a
//! rectangular neighborhood satisfy a selected predicate, and write the count
//! into an output image of identical shape. After a pass, the indices of
//! output pixels holding a given count can be collected.
//!
//! ## Image Format
//! Images are `ndarray` dynamic-dimension arrays (`ArrayD` / `ArrayViewD`)
//! in standard (row-major) layout. Any primitive numeric type can be used
//! for input pixels; the output type only has to hold the largest possible
//! count.
//!
//! ## Counting Strategies
//! - **NonZero** (default): `v != 0`
//! - **Above**: `v > lower`
//! - **Below**: `v < upper`
//! - **Between**: `lower <= v <= upper`
//! - **At**: `v == at`
//!
//! Counting can be restricted to neighborhoods whose centre pixel equals a
//! value of interest; other pixels receive a count of zero.
//!
//! ## Pipeline Integration
//! The filter does not own pipeline state. A [`pipeline::PipelineHost`]
//! receives the halo-expanded input request and decides how many work units
//! the output is split into. [`pipeline::InMemoryHost`] covers fully
//! buffered arrays.

pub mod error;
pub mod filters;
pub mod pipeline;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{ConfigError, CountNeighborsError, Result};
pub use filters::{CountNeighborsConfig, CountNeighborsFilter, CountStrategy, Predicate, Region};
pub use pipeline::{InMemoryHost, PipelineHost};

/// Build a `u8` configuration from the loosely typed binding arguments.
///
/// A single-element radius is applied to every axis.
#[cfg(any(feature = "python", feature = "wasm"))]
#[allow(clippy::too_many_arguments)]
pub(crate) fn binding_config(
    dimension: usize,
    radius: &[usize],
    strategy: &str,
    lower: u8,
    upper: u8,
    at: u8,
    value_of_interest: Option<u8>,
) -> std::result::Result<CountNeighborsConfig<u8>, String> {
    let strategy: CountStrategy = strategy.parse()?;
    let mut config = CountNeighborsConfig::new(dimension);
    match radius {
        [] => {}
        [r] => {
            config.set_radius_uniform(*r);
        }
        _ => {
            config.set_radius(radius.to_vec());
        }
    }
    match strategy {
        CountStrategy::NonZero => config.set_count_non_zero(),
        CountStrategy::Above => config.set_count_above_value(lower),
        CountStrategy::Below => config.set_count_below_value(upper),
        CountStrategy::Between => config.set_count_between_values(lower, upper),
        CountStrategy::At => config.set_count_at_value(at),
    };
    if let Some(value) = value_of_interest {
        config.set_value_of_interest(value);
    }
    Ok(config)
}

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArrayDyn, PyReadonlyArrayDyn};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::binding_config;
    use crate::error::CountNeighborsError;
    use crate::filters::CountNeighborsFilter;

    impl From<CountNeighborsError> for PyErr {
        fn from(err: CountNeighborsError) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn run_filter(
        image: &PyReadonlyArrayDyn<'_, u8>,
        radius: &[usize],
        strategy: &str,
        lower: u8,
        upper: u8,
        at: u8,
        value_of_interest: Option<u8>,
    ) -> PyResult<CountNeighborsFilter<u8, u32>> {
        let input = image.as_array();
        let config = binding_config(input.ndim(), radius, strategy, lower, upper, at, value_of_interest)
            .map_err(PyValueError::new_err)?;
        let mut filter = CountNeighborsFilter::<u8, u32>::with_config(config);
        filter.update(input)?;
        Ok(filter)
    }

    // ========================================================================
    // Count Neighbors
    // ========================================================================

    /// Count matching neighbors around every pixel of a uint8 image.
    ///
    /// # Arguments
    /// * `image` - Image with any number of axes
    /// * `radius` - Per-axis radius, or a single radius for every axis
    /// * `strategy` - One of "nonzero", "above", "below", "between", "at"
    /// * `lower` - Threshold for "above" and "between"
    /// * `upper` - Threshold for "below" and "between"
    /// * `at` - Target for "at"
    /// * `value_of_interest` - Only count around centre pixels of this value
    ///
    /// # Returns
    /// uint32 array of counts with the same shape as `image`
    #[pyfunction]
    #[pyo3(signature = (image, radius=vec![1], strategy="nonzero", lower=0, upper=0, at=0, value_of_interest=None))]
    #[allow(clippy::too_many_arguments)]
    pub fn count_neighbors<'py>(
        py: Python<'py>,
        image: PyReadonlyArrayDyn<'py, u8>,
        radius: Vec<usize>,
        strategy: &str,
        lower: u8,
        upper: u8,
        at: u8,
        value_of_interest: Option<u8>,
    ) -> PyResult<Bound<'py, PyArrayDyn<u32>>> {
        let filter = run_filter(&image, &radius, strategy, lower, upper, at, value_of_interest)?;
        let output = filter
            .output()
            .cloned()
            .ok_or_else(|| PyValueError::new_err("filter produced no output"))?;
        Ok(output.into_pyarray(py))
    }

    /// Indices of pixels whose neighbor count equals `target`, in row-major order.
    #[pyfunction]
    #[pyo3(signature = (image, target, radius=vec![1], strategy="nonzero", lower=0, upper=0, at=0, value_of_interest=None))]
    #[allow(clippy::too_many_arguments)]
    pub fn count_neighbors_indices<'py>(
        image: PyReadonlyArrayDyn<'py, u8>,
        target: u32,
        radius: Vec<usize>,
        strategy: &str,
        lower: u8,
        upper: u8,
        at: u8,
        value_of_interest: Option<u8>,
    ) -> PyResult<Vec<Vec<usize>>> {
        let mut filter = run_filter(&image, &radius, strategy, lower, upper, at, value_of_interest)?;
        filter.compute_indices(target);
        Ok(filter.indices().to_vec())
    }

    #[pymodule]
    #[pyo3(name = "count_neighbors")]
    pub fn count_neighbors_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(count_neighbors, m)?)?;
        m.add_function(wrap_pyfunction!(count_neighbors_indices, m)?)?;
        Ok(())
    }
}
