//! Core types shared by the clustering engines.

use bytemuck::{Pod, Zeroable};
use std::ops::{Add, Div, Mul, Sub};

/// Label assigned to points that belong to no cluster.
pub const NOISE: i32 = -1;

/// Scalar abstraction over the two supported coordinate widths.
///
/// The baseline and grid engines are written once against this trait and
/// monomorphized for `f32` and `f64`; there is no runtime dispatch.
pub trait Scalar:
    Copy
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + std::fmt::Debug
    + Send
    + Sync
{
    const ZERO: Self;

    /// Lossy conversion from `f64`, used when parameters arrive from the CLI.
    fn from_f64(value: f64) -> Self;

    /// Truncate a non-negative value to a cell index.
    fn trunc_usize(self) -> usize;
}

impl Scalar for f32 {
    const ZERO: Self = 0.0;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn trunc_usize(self) -> usize {
        self as usize
    }
}

impl Scalar for f64 {
    const ZERO: Self = 0.0;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn trunc_usize(self) -> usize {
        self as usize
    }
}

/// A 2D point with floating-point coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

impl<T: Scalar> Point<T> {
    #[inline]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Distances are always compared squared; the square root is never taken.
    #[inline]
    pub fn dist_sq(self, other: Self) -> T {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl<T: Scalar> From<(T, T)> for Point<T> {
    #[inline]
    fn from((x, y): (T, T)) -> Self {
        Self::new(x, y)
    }
}

/// A 2D point with non-negative integer coordinates, as consumed by the
/// grid-L1 engine.
///
/// The `#[repr(C)]` layout is load-bearing: an AoS slice of `GridPoint` is
/// reinterpreted as a flat `&[u32]` with stride 2 by the AoS entry point.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct GridPoint {
    pub x: u32,
    pub y: u32,
}

impl GridPoint {
    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Result of a clustering run.
///
/// `labels[i]` is `-1` for noise, otherwise a dense cluster id in
/// `[0, num_clusters)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterResult {
    pub labels: Vec<i32>,
    pub num_clusters: i32,
}

impl ClusterResult {
    /// An empty result, as returned for zero input points.
    pub(crate) fn empty() -> Self {
        Self {
            labels: Vec::new(),
            num_clusters: 0,
        }
    }
}
