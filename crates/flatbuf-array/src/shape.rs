//! Shape strategies: dimension validation and address computation.
//!
//! A [`Shape`] owns everything rank-specific about a flat buffer: how many
//! elements it holds, how a coordinate maps to a flat storage index, and
//! which axis a bad coordinate violates. The container itself is
//! rank-agnostic.
//!
//! Address functions:
//!
//! | Shape | Coordinate | Flat index |
//! |---|---|---|
//! | [`Shape1`] | `x` | `x` |
//! | [`Shape2`] | `(x, y)` | `x * height + y` |
//! | [`Shape3`] | `(x, y, z)` | `z * width * height + y * width + x` |
//!
//! Note that rank 2 uses `x` as the major stride, unlike rank 3.

use std::fmt;

use flatbuf_core::{Axis, FlatBufferError};
use smallvec::{smallvec, SmallVec};

/// Dimension list of a shape, one entry per axis.
pub type Dims = SmallVec<[usize; 3]>;

/// Rank-specific addressing for a flat buffer.
pub trait Shape: Copy + Default + fmt::Debug + PartialEq + Eq + 'static {
    /// Number of axes.
    const RANK: usize;

    /// Coordinate tuple accepted by indexed access.
    type Coord: Copy + fmt::Debug + PartialEq;

    /// Total element count (product of dimensions).
    fn len(&self) -> usize;

    /// Whether the shape holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensions in axis order.
    fn dims(&self) -> Dims;

    /// Validate every axis of `coord` against `[0, dimension)`.
    fn check(&self, coord: Self::Coord) -> Result<(), FlatBufferError>;

    /// The address function. Saturates instead of overflowing, so an
    /// out-of-range coordinate never wraps into range.
    fn flat_index(&self, coord: Self::Coord) -> i64;

    /// Inverse of [`flat_index`](Self::flat_index) for `flat < len()`.
    fn coord_at(&self, flat: usize) -> Self::Coord;

    /// Every coordinate, in flat storage order.
    fn coords(&self) -> Coords<Self> {
        Coords {
            shape: *self,
            next: 0,
        }
    }

    /// Resolve `coord` to a flat index that is safe to dereference.
    ///
    /// With the `checks` feature each axis is validated first, naming the
    /// offending axis. The final flat guard always runs.
    fn locate(&self, coord: Self::Coord) -> Result<usize, FlatBufferError> {
        #[cfg(feature = "checks")]
        self.check(coord)?;

        let flat = self.flat_index(coord);
        usize::try_from(flat)
            .ok()
            .filter(|&index| index < self.len())
            .ok_or(FlatBufferError::IndexOutOfRange {
                axis: Axis::Flat,
                index: flat,
                bound: self.len(),
            })
    }
}

fn dimension(argument: &'static str, value: i32) -> Result<usize, FlatBufferError> {
    usize::try_from(value).map_err(|_| FlatBufferError::InvalidArgument {
        argument,
        reason: format!("{argument} must be >= 0, got {value}"),
    })
}

fn element_count(dims: &[usize]) -> Result<usize, FlatBufferError> {
    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| FlatBufferError::InvalidArgument {
            argument: "shape",
            reason: format!("element count of {dims:?} overflows usize"),
        })
}

fn check_axis(axis: Axis, value: i32, bound: usize) -> Result<(), FlatBufferError> {
    match usize::try_from(value) {
        Ok(v) if v < bound => Ok(()),
        _ => Err(FlatBufferError::IndexOutOfRange {
            axis,
            index: value.into(),
            bound,
        }),
    }
}

/// Rank-1 shape: `size` elements, linear addressing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Shape1 {
    size: usize,
}

impl Shape1 {
    /// Validate a rank-1 shape.
    pub fn new(size: i32) -> Result<Self, FlatBufferError> {
        Ok(Self {
            size: dimension("size", size)?,
        })
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Shape for Shape1 {
    const RANK: usize = 1;
    type Coord = i32;

    fn len(&self) -> usize {
        self.size
    }

    fn dims(&self) -> Dims {
        smallvec![self.size]
    }

    fn check(&self, x: i32) -> Result<(), FlatBufferError> {
        check_axis(Axis::X, x, self.size)
    }

    fn flat_index(&self, x: i32) -> i64 {
        x.into()
    }

    fn coord_at(&self, flat: usize) -> i32 {
        flat as i32
    }
}

/// Rank-2 shape: `width × height` elements, `x` is the major stride.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Shape2 {
    width: usize,
    height: usize,
    len: usize,
}

impl Shape2 {
    /// Validate a rank-2 shape.
    pub fn new(width: i32, height: i32) -> Result<Self, FlatBufferError> {
        let width = dimension("width", width)?;
        let height = dimension("height", height)?;
        Ok(Self {
            width,
            height,
            len: element_count(&[width, height])?,
        })
    }

    /// Extent along `x`.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Extent along `y`.
    pub fn height(&self) -> usize {
        self.height
    }
}

impl Shape for Shape2 {
    const RANK: usize = 2;
    type Coord = (i32, i32);

    fn len(&self) -> usize {
        self.len
    }

    fn dims(&self) -> Dims {
        smallvec![self.width, self.height]
    }

    fn check(&self, (x, y): (i32, i32)) -> Result<(), FlatBufferError> {
        check_axis(Axis::X, x, self.width)?;
        check_axis(Axis::Y, y, self.height)
    }

    fn flat_index(&self, (x, y): (i32, i32)) -> i64 {
        i64::from(x)
            .saturating_mul(self.height as i64)
            .saturating_add(y.into())
    }

    fn coord_at(&self, flat: usize) -> (i32, i32) {
        ((flat / self.height) as i32, (flat % self.height) as i32)
    }
}

/// Rank-3 shape: `width × height × depth` elements, `x` is the minor stride.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Shape3 {
    width: usize,
    height: usize,
    depth: usize,
    len: usize,
}

impl Shape3 {
    /// Validate a rank-3 shape.
    pub fn new(width: i32, height: i32, depth: i32) -> Result<Self, FlatBufferError> {
        let width = dimension("width", width)?;
        let height = dimension("height", height)?;
        let depth = dimension("depth", depth)?;
        Ok(Self {
            width,
            height,
            depth,
            len: element_count(&[width, height, depth])?,
        })
    }

    /// Extent along `x`.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Extent along `y`.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Extent along `z`.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Shape for Shape3 {
    const RANK: usize = 3;
    type Coord = (i32, i32, i32);

    fn len(&self) -> usize {
        self.len
    }

    fn dims(&self) -> Dims {
        smallvec![self.width, self.height, self.depth]
    }

    fn check(&self, (x, y, z): (i32, i32, i32)) -> Result<(), FlatBufferError> {
        check_axis(Axis::X, x, self.width)?;
        check_axis(Axis::Y, y, self.height)?;
        check_axis(Axis::Z, z, self.depth)
    }

    fn flat_index(&self, (x, y, z): (i32, i32, i32)) -> i64 {
        let plane = (self.width as i64).saturating_mul(self.height as i64);
        i64::from(z)
            .saturating_mul(plane)
            .saturating_add(i64::from(y).saturating_mul(self.width as i64))
            .saturating_add(x.into())
    }

    fn coord_at(&self, flat: usize) -> (i32, i32, i32) {
        let x = flat % self.width;
        let y = (flat / self.width) % self.height;
        let z = flat / (self.width * self.height);
        (x as i32, y as i32, z as i32)
    }
}

/// Iterator over a shape's coordinates in flat storage order.
#[derive(Clone, Debug)]
pub struct Coords<S: Shape> {
    shape: S,
    next: usize,
}

impl<S: Shape> Iterator for Coords<S> {
    type Item = S::Coord;

    fn next(&mut self) -> Option<S::Coord> {
        if self.next >= self.shape.len() {
            return None;
        }
        let coord = self.shape.coord_at(self.next);
        self.next += 1;
        Some(coord)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.shape.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl<S: Shape> ExactSizeIterator for Coords<S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn negative_dimensions_name_the_argument() {
        let err = Shape3::new(10, -10, 10).unwrap_err();
        assert!(matches!(
            err,
            FlatBufferError::InvalidArgument {
                argument: "height",
                ..
            }
        ));
        let err = Shape1::new(-1).unwrap_err();
        assert!(matches!(
            err,
            FlatBufferError::InvalidArgument {
                argument: "size",
                ..
            }
        ));
    }

    #[test]
    fn zero_sized_shapes_are_valid() {
        assert!(Shape1::new(0).unwrap().is_empty());
        assert!(Shape2::new(4, 0).unwrap().is_empty());
        assert!(Shape3::new(0, 3, 3).unwrap().coords().next().is_none());
    }

    #[test]
    fn rank2_uses_x_as_major_stride() {
        let s = Shape2::new(16, 22).unwrap();
        assert_eq!(s.flat_index((0, 1)), 1);
        assert_eq!(s.flat_index((1, 0)), 22);
        assert_eq!(s.flat_index((15, 21)), 15 * 22 + 21);
    }

    #[test]
    fn rank3_uses_x_as_minor_stride() {
        let s = Shape3::new(4, 5, 6).unwrap();
        assert_eq!(s.flat_index((1, 0, 0)), 1);
        assert_eq!(s.flat_index((0, 1, 0)), 4);
        assert_eq!(s.flat_index((0, 0, 1)), 20);
    }

    #[test]
    fn check_reports_first_bad_axis() {
        let s = Shape3::new(2, 3, 4).unwrap();
        assert_eq!(
            s.check((0, 3, 0)),
            Err(FlatBufferError::IndexOutOfRange {
                axis: Axis::Y,
                index: 3,
                bound: 3
            })
        );
        assert_eq!(
            s.check((-1, 0, 0)),
            Err(FlatBufferError::IndexOutOfRange {
                axis: Axis::X,
                index: -1,
                bound: 2
            })
        );
    }

    #[test]
    fn flat_index_saturates_instead_of_wrapping() {
        let s = Shape2::new(4, 4).unwrap();
        assert!(s.flat_index((i32::MAX, i32::MAX)) >= 16);
        assert!(s.flat_index((i32::MIN, 0)) < 0);
        let s = Shape3::new(1 << 16, 1 << 16, 1).unwrap_or_default();
        assert!(s.flat_index((0, 0, i32::MAX)) >= 0);
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn element_count_overflow_rejected() {
        assert!(Shape3::new(i32::MAX, i32::MAX, i32::MAX).is_err());
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn element_count_overflow_rejected() {
        let err = Shape3::new(i32::MAX, i32::MAX, i32::MAX).unwrap_err();
        assert!(matches!(
            err,
            FlatBufferError::InvalidArgument {
                argument: "shape",
                ..
            }
        ));
    }

    #[test]
    fn dims_follow_axis_order() {
        assert_eq!(Shape3::new(2, 3, 4).unwrap().dims().as_slice(), &[2, 3, 4]);
        assert_eq!(Shape2::RANK, 2);
    }

    #[cfg(feature = "checks")]
    #[test]
    fn locate_names_axis_when_checked() {
        let s = Shape2::new(16, 22).unwrap();
        let err = s.locate((0, 22)).unwrap_err();
        assert!(matches!(
            err,
            FlatBufferError::IndexOutOfRange { axis: Axis::Y, .. }
        ));
    }

    proptest! {
        #[test]
        fn coords_enumerate_storage_order_2d(w in 0i32..12, h in 0i32..12) {
            let s = Shape2::new(w, h).unwrap();
            let flats: Vec<i64> = s.coords().map(|c| s.flat_index(c)).collect();
            let expected: Vec<i64> = (0..s.len() as i64).collect();
            prop_assert_eq!(flats, expected);
        }

        #[test]
        fn coords_enumerate_storage_order_3d(w in 0i32..8, h in 0i32..8, d in 0i32..8) {
            let s = Shape3::new(w, h, d).unwrap();
            prop_assert_eq!(s.coords().len(), s.len());
            for (flat, coord) in s.coords().enumerate() {
                prop_assert!(s.check(coord).is_ok());
                prop_assert_eq!(s.flat_index(coord), flat as i64);
            }
        }

        #[test]
        fn locate_accepts_exactly_in_bounds(w in 1i32..10, h in 1i32..10, x in -3i32..13, y in -3i32..13) {
            let s = Shape2::new(w, h).unwrap();
            let in_bounds = (0..w).contains(&x) && (0..h).contains(&y);
            if in_bounds {
                prop_assert_eq!(s.locate((x, y)).unwrap() as i64, s.flat_index((x, y)));
            } else if cfg!(feature = "checks") {
                prop_assert!(s.locate((x, y)).is_err());
            }
        }
    }
}
