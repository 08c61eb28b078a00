//! WebAssembly exports for the count neighbors filter.
//!
//! These functions are exposed to JavaScript via wasm-bindgen and work on
//! flat row-major 2-D `u8` buffers.

use ndarray::Array2;
use wasm_bindgen::prelude::*;

use crate::binding_config;
use crate::filters::CountNeighborsFilter;

#[allow(clippy::too_many_arguments)]
fn run_filter(
    data: &[u8],
    width: usize,
    height: usize,
    radius: usize,
    strategy: &str,
    lower: u8,
    upper: u8,
    at: u8,
    value_of_interest: Option<u8>,
) -> Result<CountNeighborsFilter<u8, u32>, JsValue> {
    let input = Array2::from_shape_vec((height, width), data.to_vec())
        .map_err(|e| JsValue::from_str(&format!("invalid dimensions: {e}")))?
        .into_dyn();
    let config = binding_config(2, &[radius], strategy, lower, upper, at, value_of_interest)
        .map_err(|e| JsValue::from_str(&e))?;

    let mut filter = CountNeighborsFilter::<u8, u32>::with_config(config);
    filter
        .update(input.view())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(filter)
}

// ============================================================================
// Count Neighbors - u8 in, u32 out
// ============================================================================

/// Count matching neighbors around every pixel.
///
/// # Arguments
/// * `data` - Flat array of grayscale bytes (length = width * height)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `radius` - Neighborhood radius on both axes
/// * `strategy` - One of "nonzero", "above", "below", "between", "at"
/// * `value_of_interest` - Only count around centre pixels of this value
///
/// # Returns
/// Flat array of counts (length = width * height)
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn count_neighbors_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    radius: usize,
    strategy: &str,
    lower: u8,
    upper: u8,
    at: u8,
    value_of_interest: Option<u8>,
) -> Result<Vec<u32>, JsValue> {
    let filter = run_filter(data, width, height, radius, strategy, lower, upper, at, value_of_interest)?;
    let output = filter
        .output()
        .ok_or_else(|| JsValue::from_str("filter produced no output"))?;
    Ok(output.iter().copied().collect())
}

/// Flat pixel offsets (`y * width + x`) whose neighbor count equals `target`.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn count_neighbors_indices_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    radius: usize,
    strategy: &str,
    lower: u8,
    upper: u8,
    at: u8,
    value_of_interest: Option<u8>,
    target: u32,
) -> Result<Vec<u32>, JsValue> {
    let mut filter = run_filter(data, width, height, radius, strategy, lower, upper, at, value_of_interest)?;
    filter.compute_indices(target);
    filter
        .indices()
        .iter()
        .map(|ix| {
            flat_offset(ix, width).ok_or_else(|| {
                JsValue::from_str(&format!("pixel offset of {ix:?} does not fit in u32"))
            })
        })
        .collect()
}

/// Row-major offset `y * width + x`, or `None` if it does not fit in a `u32`.
fn flat_offset(index: &[usize], width: usize) -> Option<u32> {
    index[0]
        .checked_mul(width)
        .and_then(|row| row.checked_add(index[1]))
        .and_then(|offset| u32::try_from(offset).ok())
}
