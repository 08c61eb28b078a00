//! Count neighbors filter.
//!
//! For every pixel of an N-dimensional image, counts how many pixels inside
//! the rectangular neighborhood around it satisfy the configured predicate,
//! and writes that count into the output pixel at the same index.
//!
//! ## Pass structure
//!
//! 1. The configuration is validated against the input dimension and the
//!    output pixel type.
//! 2. The output request is grown by the radius, cropped to the largest
//!    possible input region, and handed to the [`PipelineHost`].
//! 3. The output request is split along axis 0 into one subregion per work
//!    unit. Each subregion owns a disjoint slab of the output buffer and is
//!    processed by a [`RegionWorker`] on the rayon pool.
//! 4. After the join, [`CountNeighborsFilter::compute_indices`] can scan the
//!    finished output for pixels holding a given count.
//!
//! ## Example
//!
//! ```
//! use count_neighbors::filters::CountNeighborsFilter;
//! use ndarray::{array, ArrayD};
//!
//! let image: ArrayD<u8> = array![[255, 255, 255], [255, 255, 255], [255, 255, 255]].into_dyn();
//! let mut filter = CountNeighborsFilter::<u8>::new(2);
//! filter.config_mut().set_count_non_zero();
//!
//! let counts = filter.update(image.view()).unwrap();
//! assert_eq!(counts[[1, 1].as_slice()], 9);
//! ```

use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, trace, warn};
use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, Axis, Dimension, IxDyn};
use num_traits::Bounded;
use rayon::prelude::*;

use super::config::CountNeighborsConfig;
use super::neighborhood::NeighborhoodWalker;
use super::pixel::{CountPixel, InputPixel};
use super::predicate::Predicate;
use super::region::Region;
use crate::error::{ConfigError, CountNeighborsError, Result};
use crate::pipeline::{InMemoryHost, PipelineHost};

// ============================================================================
// Output slabs
// ============================================================================

/// A run of whole axis-0 rows of the output image, owned by one work unit.
pub struct OutputSlab<'a, O> {
    first_row: usize,
    view: ArrayViewMutD<'a, O>,
}

impl<'a, O> OutputSlab<'a, O> {
    /// `view` holds rows `first_row..` of the output along axis 0 and the
    /// full extent along every other axis.
    pub fn new(first_row: usize, view: ArrayViewMutD<'a, O>) -> Self {
        OutputSlab { first_row, view }
    }

    pub fn rows(&self) -> Range<usize> {
        self.first_row..self.first_row + self.view.len_of(Axis(0))
    }
}

/// Cut the output into one slab per region.
///
/// `regions` must be disjoint along axis 0, in ascending order, and inside
/// the output, as produced by [`Region::split_along_slowest_axis`]. A region
/// that breaks this is reported as an invalid requested region.
pub fn split_output<'a, O>(
    output: ArrayViewMutD<'a, O>,
    regions: &[Region],
) -> Result<Vec<(Region, OutputSlab<'a, O>)>> {
    let largest = Region::from_shape(output.shape());
    let mut jobs = Vec::with_capacity(regions.len());
    let mut rest = output;
    let mut consumed = 0;

    for region in regions {
        if region.is_empty() {
            continue;
        }
        if !largest.contains_region(region) || region.origin()[0] < consumed {
            return Err(CountNeighborsError::InvalidRequestedRegion {
                requested: region.clone(),
                largest,
            });
        }
        let start = region.origin()[0];
        let end = region.end(0);
        let (_, tail) = rest.split_at(Axis(0), start - consumed);
        let (slab, tail) = tail.split_at(Axis(0), end - start);
        jobs.push((region.clone(), OutputSlab::new(start, slab)));
        rest = tail;
        consumed = end;
    }

    Ok(jobs)
}

// ============================================================================
// Per-region worker
// ============================================================================

/// Everything a work unit needs to fill its subregion, detached from the
/// filter so it can be shared across threads.
#[derive(Debug, Clone)]
pub struct RegionWorker<'a, P> {
    input: ArrayViewD<'a, P>,
    radius: Vec<usize>,
    predicate: Predicate<P>,
    gate: Option<P>,
}

impl<'a, P: InputPixel> RegionWorker<'a, P> {
    pub fn predicate(&self) -> Predicate<P> {
        self.predicate
    }

    /// Fill every pixel of `region` in `slab`.
    ///
    /// `region` must lie within the rows covered by `slab`. Pixels of the slab
    /// outside `region` are left untouched.
    pub fn generate_region<O: CountPixel>(
        &self,
        region: &Region,
        thread_id: usize,
        mut slab: OutputSlab<'_, O>,
    ) {
        debug_assert!(region.is_empty() || {
            let rows = slab.rows();
            rows.start <= region.origin()[0] && region.end(0) <= rows.end
        });
        trace!("count_neighbors: work unit {thread_id} processing {region}");

        // Pick the strategy once so the inner loop is monomorphised per predicate.
        match self.predicate {
            Predicate::NonZero => {
                let zero = P::zero();
                self.sweep(region, &mut slab, move |v| v != zero)
            }
            Predicate::Above { lower } => self.sweep(region, &mut slab, move |v| v > lower),
            Predicate::Below { upper } => self.sweep(region, &mut slab, move |v| v < upper),
            Predicate::Between { lower, upper } => {
                self.sweep(region, &mut slab, move |v| lower <= v && v <= upper)
            }
            Predicate::At { value } => self.sweep(region, &mut slab, move |v| v == value),
        }

        trace!("count_neighbors: work unit {thread_id} done");
    }

    fn sweep<O, F>(&self, region: &Region, slab: &mut OutputSlab<'_, O>, matches: F)
    where
        O: CountPixel,
        F: Fn(P) -> bool,
    {
        let walker = NeighborhoodWalker::new(&self.radius, self.input.shape());
        let origin = region.origin();

        for mut centre in ndarray::indices(IxDyn(region.size())) {
            for (c, &o) in centre.slice_mut().iter_mut().zip(origin) {
                *c += o;
            }

            let count = match self.gate {
                Some(value) if self.input[centre.slice()] != value => 0,
                _ => walker
                    .view(&self.input, centre.slice())
                    .iter()
                    .filter(|&&v| matches(v))
                    .count(),
            };

            centre[0] -= slab.first_row;
            // Unreachable once the configuration has been validated.
            slab.view[centre.slice()] =
                O::from_count(count).unwrap_or_else(<O as Bounded>::max_value);
        }
    }
}

// ============================================================================
// Filter
// ============================================================================

/// Counts matching neighbors around every pixel.
///
/// `P` is the input pixel type, `O` the output (count) pixel type.
#[derive(Debug, Clone)]
pub struct CountNeighborsFilter<P, O = P> {
    config: CountNeighborsConfig<P>,
    output: Option<ArrayD<O>>,
    computed_region: Option<Region>,
    indices: Vec<Vec<usize>>,
}

impl<P: InputPixel, O: CountPixel> CountNeighborsFilter<P, O> {
    /// Filter with default configuration for images with `dimension` axes.
    pub fn new(dimension: usize) -> Self {
        Self::with_config(CountNeighborsConfig::new(dimension))
    }

    pub fn with_config(config: CountNeighborsConfig<P>) -> Self {
        CountNeighborsFilter {
            config,
            output: None,
            computed_region: None,
            indices: Vec::new(),
        }
    }

    pub fn config(&self) -> &CountNeighborsConfig<P> {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut CountNeighborsConfig<P> {
        &mut self.config
    }

    /// Output of the last successful pass.
    pub fn output(&self) -> Option<&ArrayD<O>> {
        self.output.as_ref()
    }

    /// Output region computed by the last successful pass.
    pub fn computed_region(&self) -> Option<&Region> {
        self.computed_region.as_ref()
    }

    /// Input region needed to compute `output_requested`: the request grown
    /// by the radius on every axis and cropped to `largest`.
    pub fn generate_input_requested_region(
        &self,
        output_requested: &Region,
        largest: &Region,
    ) -> Result<Region> {
        let radius = self.config.radius();
        if radius.len() != output_requested.dimension() {
            return Err(ConfigError::RadiusDimension {
                expected: output_requested.dimension(),
                actual: radius.len(),
            }
            .into());
        }
        if output_requested.is_empty() {
            return Ok(output_requested.clone());
        }

        let padded = output_requested.padded_by_radius(radius);
        padded.crop(largest).ok_or_else(|| {
            warn!("count_neighbors: input request {padded} lies outside {largest}");
            CountNeighborsError::InvalidRequestedRegion {
                requested: padded.clone(),
                largest: largest.clone(),
            }
        })
    }

    /// Validate the configuration against `input` and build a worker for it.
    ///
    /// Hosts that schedule their own threads can combine this with
    /// [`split_output`] and [`RegionWorker::generate_region`].
    pub fn worker<'a>(&self, input: ArrayViewD<'a, P>) -> Result<RegionWorker<'a, P>> {
        let predicate = self.config.validate::<O>(input.ndim())?;
        Ok(RegionWorker {
            input,
            radius: self.config.radius().to_vec(),
            predicate,
            gate: self.config.gate(),
        })
    }

    /// Run a pass over the whole image, in memory, on the rayon pool.
    pub fn update(&mut self, input: ArrayViewD<'_, P>) -> Result<&ArrayD<O>> {
        let mut host = InMemoryHost::new(input.shape());
        let requested = Region::from_shape(input.shape());
        self.update_with(&mut host, input, &requested)
    }

    /// Run a pass computing `requested` of the output under `host`.
    ///
    /// The output is reallocated on every pass, so pixels outside `requested`
    /// are zero.
    pub fn update_with<H>(
        &mut self,
        host: &mut H,
        input: ArrayViewD<'_, P>,
        requested: &Region,
    ) -> Result<&ArrayD<O>>
    where
        H: PipelineHost + ?Sized,
    {
        let shape = input.shape().to_vec();
        let worker = self.worker(input)?;

        let largest = host.largest_possible_region();
        if largest.origin().iter().any(|&o| o != 0)
            || largest.size() != shape.as_slice()
            || !largest.contains_region(requested)
        {
            warn!("count_neighbors: output request {requested} does not fit {largest}");
            return Err(CountNeighborsError::InvalidRequestedRegion {
                requested: requested.clone(),
                largest,
            });
        }

        let input_request = self.generate_input_requested_region(requested, &largest)?;
        host.request_input_region(&input_request)?;

        self.output = None;
        self.computed_region = None;
        let mut output = ArrayD::zeros(IxDyn(&shape));

        let regions = requested.split_along_slowest_axis(host.number_of_work_units());
        debug!(
            "count_neighbors: shape {:?}, radius {:?}, strategy {}, {} work units over {}",
            shape,
            self.config.radius(),
            worker.predicate().strategy(),
            regions.len(),
            requested
        );

        let jobs = split_output(output.view_mut(), &regions)?;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            jobs.into_par_iter()
                .enumerate()
                .for_each(|(thread_id, (region, slab))| {
                    worker.generate_region(&region, thread_id, slab)
                });
        }));
        if let Err(payload) = outcome {
            return Err(CountNeighborsError::Internal(panic_message(payload)));
        }

        debug!("count_neighbors: pass complete");
        self.computed_region = Some(requested.clone());
        let output: &ArrayD<O> = self.output.insert(output);
        Ok(output)
    }

    /// Collect the indices of output pixels equal to `number_of_neighbors`,
    /// in row-major order, replacing the previous list.
    ///
    /// Only pixels inside the region computed by the last pass are reported.
    /// Before any successful pass the list is empty.
    pub fn compute_indices(&mut self, number_of_neighbors: O) {
        self.indices = match (&self.output, &self.computed_region) {
            (Some(output), Some(region)) => output
                .indexed_iter()
                .filter(|&(ref ix, &v)| v == number_of_neighbors && region.contains_index(ix.slice()))
                .map(|(ix, _)| ix.slice().to_vec())
                .collect(),
            _ => Vec::new(),
        };
    }

    pub fn indices(&self) -> &[Vec<usize>] {
        &self.indices
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("worker panicked: {message}")
    } else {
        "worker panicked".to_string()
    }
}
