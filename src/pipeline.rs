//! The interface a host pipeline supplies to the filter.
//!
//! The filter does not own any pipeline state. Before a pass it tells the
//! host which input region it needs (the output request grown by the radius
//! and cropped to the largest possible region), and asks how many work units
//! to split the output into.

use crate::error::{CountNeighborsError, Result};
use crate::filters::region::Region;

pub trait PipelineHost {
    /// The full buffered input region.
    fn largest_possible_region(&self) -> Region;

    /// Receive the halo-expanded input request for the coming pass.
    fn request_input_region(&mut self, region: &Region) -> Result<()>;

    /// Number of disjoint output subregions to process in parallel.
    fn number_of_work_units(&self) -> usize {
        rayon::current_num_threads()
    }
}

/// Host for an input that is already fully in memory.
#[derive(Debug, Clone)]
pub struct InMemoryHost {
    largest: Region,
    work_units: Option<usize>,
    input_requested_region: Option<Region>,
}

impl InMemoryHost {
    pub fn new(shape: &[usize]) -> Self {
        InMemoryHost {
            largest: Region::from_shape(shape),
            work_units: None,
            input_requested_region: None,
        }
    }

    /// Fix the number of work units instead of following the rayon pool.
    pub fn with_work_units(mut self, work_units: usize) -> Self {
        self.work_units = Some(work_units);
        self
    }

    /// The input region requested by the most recent pass.
    pub fn input_requested_region(&self) -> Option<&Region> {
        self.input_requested_region.as_ref()
    }
}

impl PipelineHost for InMemoryHost {
    fn largest_possible_region(&self) -> Region {
        self.largest.clone()
    }

    fn request_input_region(&mut self, region: &Region) -> Result<()> {
        if !self.largest.contains_region(region) {
            return Err(CountNeighborsError::InvalidRequestedRegion {
                requested: region.clone(),
                largest: self.largest.clone(),
            });
        }
        self.input_requested_region = Some(region.clone());
        Ok(())
    }

    fn number_of_work_units(&self) -> usize {
        self.work_units.unwrap_or_else(rayon::current_num_threads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_host_records_request() {
        let mut host = InMemoryHost::new(&[6, 6]);
        let request = Region::new(vec![1, 1], vec![4, 4]);
        host.request_input_region(&request).unwrap();
        assert_eq!(host.input_requested_region(), Some(&request));
    }

    #[test]
    fn test_in_memory_host_rejects_outside_request() {
        let mut host = InMemoryHost::new(&[6, 6]);
        let request = Region::new(vec![4, 4], vec![4, 4]);
        assert!(matches!(
            host.request_input_region(&request),
            Err(CountNeighborsError::InvalidRequestedRegion { .. })
        ));
        assert!(host.input_requested_region().is_none());
    }

    #[test]
    fn test_work_units_override() {
        let host = InMemoryHost::new(&[6, 6]).with_work_units(3);
        assert_eq!(host.number_of_work_units(), 3);
        assert!(InMemoryHost::new(&[6, 6]).number_of_work_units() >= 1);
    }
}
