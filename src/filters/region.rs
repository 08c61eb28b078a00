//! Hyperrectangular regions of the image lattice.
//!
//! A [`Region`] is the half-open box `[origin, origin + size)`. Axis 0 is the
//! slowest-varying axis of a row-major (ndarray standard layout) buffer, which
//! is the axis the driver partitions along.

use std::fmt;

/// Half-open N-dimensional box on the image lattice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    origin: Vec<usize>,
    size: Vec<usize>,
}

impl Region {
    /// Create a region from an origin and a size of equal length.
    pub fn new(origin: Vec<usize>, size: Vec<usize>) -> Self {
        debug_assert_eq!(origin.len(), size.len(), "origin and size must have the same dimension");
        Region { origin, size }
    }

    /// The region covering an entire image of the given shape.
    pub fn from_shape(shape: &[usize]) -> Self {
        Region {
            origin: vec![0; shape.len()],
            size: shape.to_vec(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.size.len()
    }

    pub fn origin(&self) -> &[usize] {
        &self.origin
    }

    pub fn size(&self) -> &[usize] {
        &self.size
    }

    /// Exclusive upper bound along `axis`.
    pub fn end(&self, axis: usize) -> usize {
        self.origin[axis] + self.size[axis]
    }

    pub fn num_pixels(&self) -> usize {
        self.size.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.size.iter().any(|&s| s == 0)
    }

    pub fn contains_index(&self, index: &[usize]) -> bool {
        index.len() == self.dimension()
            && index
                .iter()
                .enumerate()
                .all(|(axis, &i)| i >= self.origin[axis] && i < self.end(axis))
    }

    /// Whether `other` lies entirely inside this region.
    ///
    /// An empty region is contained in any region of the same dimension.
    pub fn contains_region(&self, other: &Region) -> bool {
        if other.dimension() != self.dimension() {
            return false;
        }
        if other.is_empty() {
            return true;
        }
        (0..self.dimension())
            .all(|axis| other.origin[axis] >= self.origin[axis] && other.end(axis) <= self.end(axis))
    }

    /// Grow the region by `radius` on both sides of every axis.
    ///
    /// The lower bound clamps at zero, the lattice origin.
    pub fn padded_by_radius(&self, radius: &[usize]) -> Region {
        debug_assert_eq!(radius.len(), self.dimension());
        let origin: Vec<usize> = self
            .origin
            .iter()
            .zip(radius)
            .map(|(&o, &r)| o.saturating_sub(r))
            .collect();
        let size = (0..self.dimension())
            .map(|axis| self.end(axis).saturating_add(radius[axis]) - origin[axis])
            .collect();
        Region { origin, size }
    }

    /// Intersection with `other`, or `None` if the two do not overlap.
    pub fn crop(&self, other: &Region) -> Option<Region> {
        if other.dimension() != self.dimension() {
            return None;
        }
        let mut origin = Vec::with_capacity(self.dimension());
        let mut size = Vec::with_capacity(self.dimension());
        for axis in 0..self.dimension() {
            let start = self.origin[axis].max(other.origin[axis]);
            let end = self.end(axis).min(other.end(axis));
            if start >= end {
                return None;
            }
            origin.push(start);
            size.push(end - start);
        }
        Some(Region { origin, size })
    }

    /// Split into at most `pieces` disjoint regions along axis 0.
    ///
    /// The pieces cover this region exactly, appear in ascending order, and
    /// differ in extent along axis 0 by at most one. An empty region yields
    /// no pieces.
    pub fn split_along_slowest_axis(&self, pieces: usize) -> Vec<Region> {
        if self.dimension() == 0 || self.is_empty() {
            return Vec::new();
        }
        let rows = self.size[0];
        let pieces = pieces.clamp(1, rows);
        let base = rows / pieces;
        let remainder = rows % pieces;

        let mut start = self.origin[0];
        (0..pieces)
            .map(|i| {
                let len = base + usize::from(i < remainder);
                let mut piece = self.clone();
                piece.origin[0] = start;
                piece.size[0] = len;
                start += len;
                piece
            })
            .collect()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[origin {:?}, size {:?}]", self.origin, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_shape_covers_image() {
        let region = Region::from_shape(&[4, 5]);
        assert_eq!(region.origin(), &[0, 0]);
        assert_eq!(region.num_pixels(), 20);
        assert!(region.contains_index(&[3, 4]));
        assert!(!region.contains_index(&[4, 0]));
    }

    #[test]
    fn test_pad_then_crop_clips_to_image() {
        let largest = Region::from_shape(&[10, 10]);
        let requested = Region::new(vec![0, 8], vec![3, 2]);

        let padded = requested.padded_by_radius(&[2, 2]);
        assert_eq!(padded.origin(), &[0, 6]);
        assert_eq!(padded.size(), &[5, 6]);

        let cropped = padded.crop(&largest).unwrap();
        assert_eq!(cropped.origin(), &[0, 6]);
        assert_eq!(cropped.size(), &[5, 4]);
    }

    #[test]
    fn test_crop_disjoint_is_none() {
        let a = Region::new(vec![0, 0], vec![2, 2]);
        let b = Region::new(vec![5, 5], vec![2, 2]);
        assert!(a.crop(&b).is_none());
    }

    #[test]
    fn test_contains_region() {
        let largest = Region::from_shape(&[8, 8]);
        assert!(largest.contains_region(&Region::new(vec![2, 2], vec![6, 6])));
        assert!(!largest.contains_region(&Region::new(vec![2, 2], vec![7, 6])));
        assert!(largest.contains_region(&Region::new(vec![20, 20], vec![0, 3])));
    }

    #[test]
    fn test_split_is_balanced_and_exact() {
        let region = Region::new(vec![3, 0, 0], vec![10, 4, 2]);
        let pieces = region.split_along_slowest_axis(4);

        assert_eq!(pieces.len(), 4);
        let rows: Vec<usize> = pieces.iter().map(|p| p.size()[0]).collect();
        assert_eq!(rows, vec![3, 3, 2, 2]);
        assert_eq!(pieces[0].origin()[0], 3);
        for pair in pieces.windows(2) {
            assert_eq!(pair[0].end(0), pair[1].origin()[0]);
        }
        assert_eq!(pieces.last().unwrap().end(0), 13);
        let total: usize = pieces.iter().map(Region::num_pixels).sum();
        assert_eq!(total, region.num_pixels());
    }

    #[test]
    fn test_split_more_pieces_than_rows() {
        let region = Region::from_shape(&[2, 9]);
        assert_eq!(region.split_along_slowest_axis(16).len(), 2);
        assert_eq!(region.split_along_slowest_axis(0).len(), 1);
        assert!(Region::from_shape(&[0, 9]).split_along_slowest_axis(4).is_empty());
    }
}
