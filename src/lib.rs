//! Density-based clustering (DBSCAN) for 2D points.
//!
//! Three engines share one input/output contract and trade generality for
//! throughput:
//!
//! - [`Dbscan`]: all-pairs Euclidean baseline, the correctness reference;
//! - [`DbscanGrid`]: uniform-grid Euclidean engine with a lock-free
//!   union-find for parallel cluster merging;
//! - [`dbscan_grid2d_l1`] / [`dbscan_grid2d_l1_aos`]: Manhattan-metric
//!   engine over non-negative `u32` coordinates with three interchangeable
//!   expansion strategies.
//!
//! Labels are `-1` for noise, otherwise dense cluster ids. All engines use
//! the same core-point convention: a point is core when its closed
//! ε-neighborhood, the point itself included, holds at least `min_samples`
//! members. For identical inputs the engines agree up to a bijective
//! relabeling of cluster ids.
//!
//! # Example
//!
//! ```
//! use dbscan2d::{Dbscan, Point};
//!
//! let points = vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(0.1, 0.1),
//!     Point::new(0.2, 0.2),
//!     Point::new(5.0, 5.0),
//!     Point::new(5.1, 5.1),
//!     Point::new(5.2, 5.2),
//!     Point::new(10.0, 10.0),
//! ];
//!
//! let result = Dbscan::new(0.5, 2).unwrap().cluster(&points);
//! assert_eq!(result.num_clusters, 2);
//! assert_eq!(result.labels[6], -1); // isolated point is noise
//! ```

mod baseline;
mod error;
mod grid_l1;
mod grid_l2;
mod types;

pub mod io;
pub mod parallel;
pub mod timing;
pub mod union_find;
pub mod validation;

pub use baseline::Dbscan;
pub use error::DbscanError;
pub use grid_l1::{dbscan_grid2d_l1, dbscan_grid2d_l1_aos, ExpansionMode, GridL1Params, GridL1Result};
pub use grid_l2::DbscanGrid;
pub use timing::{PerfTiming, PerfTimingEntry};
pub use types::{ClusterResult, GridPoint, Point, Scalar, NOISE};
