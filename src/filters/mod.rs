//! Neighbor counting filter and its building blocks.
//!
//! ## Supported Formats
//!
//! Images are N-dimensional `ndarray` arrays of any scalar pixel type:
//!
//! | Input | Output | Notes |
//! |-------|--------|-------|
//! | u8 / u16 / i32 ... | u8 / u16 / u32 ... | Output must hold `prod(2r + 1)` |
//! | f32 / f64 | any integer or float | NONZERO compares against `0.0` |
//!
//! ## Architecture
//!
//! - **Predicate** - classifies one pixel value (`predicate.rs`)
//! - **Neighborhood walker** - clipped rectangular neighborhoods (`neighborhood.rs`)
//! - **Region** - boxes, halo expansion and partitioning (`region.rs`)
//! - **Worker / driver / collector** - the parallel sweep (`count_neighbors.rs`)
//!
//! Work is split along axis 0 and run on the rayon pool; results do not
//! depend on the number of work units.

pub mod config;
pub mod count_neighbors;
pub mod neighborhood;
pub mod pixel;
pub mod predicate;
pub mod region;

pub use config::CountNeighborsConfig;
pub use count_neighbors::{split_output, CountNeighborsFilter, OutputSlab, RegionWorker};
pub use neighborhood::NeighborhoodWalker;
pub use pixel::{CountPixel, InputPixel};
pub use predicate::{CountStrategy, Predicate};
pub use region::Region;
