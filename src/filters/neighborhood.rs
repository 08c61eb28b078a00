//! Rectangular neighborhoods clipped to the image.
//!
//! The neighborhood of centre `c` with radius `r` is every index `x` with
//! `max(0, c_i - r_i) <= x_i <= min(E_i - 1, c_i + r_i)`. Neighbors that fall
//! outside the image are absent, so border pixels see fewer neighbors than
//! interior ones. The centre is a member of its own neighborhood.

use std::ops::Range;

use ndarray::{ArrayViewD, IxDyn, Slice};

/// Enumerates clipped neighborhoods for a fixed radius and image extent.
#[derive(Debug, Clone, Copy)]
pub struct NeighborhoodWalker<'a> {
    radius: &'a [usize],
    extent: &'a [usize],
}

impl<'a> NeighborhoodWalker<'a> {
    pub fn new(radius: &'a [usize], extent: &'a [usize]) -> Self {
        debug_assert_eq!(radius.len(), extent.len());
        NeighborhoodWalker { radius, extent }
    }

    pub fn radius(&self) -> &[usize] {
        self.radius
    }

    /// In-bounds index range along `axis` for a centre coordinate `c`.
    #[inline]
    pub fn axis_bounds(&self, axis: usize, c: usize) -> Range<usize> {
        let start = c.saturating_sub(self.radius[axis]);
        let end = c
            .saturating_add(self.radius[axis])
            .saturating_add(1)
            .min(self.extent[axis]);
        start..end
    }

    /// Clipped bounds of the neighborhood on every axis.
    pub fn bounds(&self, centre: &[usize]) -> Vec<Range<usize>> {
        centre
            .iter()
            .enumerate()
            .map(|(axis, &c)| self.axis_bounds(axis, c))
            .collect()
    }

    /// Number of in-bounds neighbors of `centre`, the centre included.
    pub fn len(&self, centre: &[usize]) -> usize {
        centre
            .iter()
            .enumerate()
            .map(|(axis, &c)| self.axis_bounds(axis, c).len())
            .product()
    }

    /// Every in-bounds neighbor index of `centre` in row-major order.
    pub fn indices(&self, centre: &[usize]) -> impl Iterator<Item = Vec<usize>> {
        let bounds = self.bounds(centre);
        let shape: Vec<usize> = bounds.iter().map(|b| b.len()).collect();
        ndarray::indices(IxDyn(&shape))
            .into_iter()
            .map(move |offset| {
                bounds
                    .iter()
                    .enumerate()
                    .map(|(axis, b)| b.start + offset[axis])
                    .collect()
            })
    }

    /// View of the input covering the neighborhood of `centre`.
    #[inline]
    pub fn view<'v, P>(&self, input: &'v ArrayViewD<'_, P>, centre: &[usize]) -> ArrayViewD<'v, P> {
        input.slice_each_axis(|desc| {
            let axis = desc.axis.index();
            let bounds = self.axis_bounds(axis, centre[axis]);
            Slice::from(bounds)
        })
    }
}
