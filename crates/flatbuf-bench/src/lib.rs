//! Benchmark profiles for the flatbuf containers.
//!
//! - [`grid_profile`]: 256x256 `f32` grid filled with a deterministic ramp
//! - [`volume_profile`]: 64x64x64 `u32` volume filled with flat indices

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use flatbuf_array::{FlatBuffer2D, FlatBuffer3D, Shape};
use flatbuf_core::AllocatorKind;

/// Side length of [`grid_profile`].
pub const GRID_SIDE: i32 = 256;

/// Side length of [`volume_profile`].
pub const VOLUME_SIDE: i32 = 64;

/// A 256x256 persistent grid where each cell holds `x + y / 1000`.
pub fn grid_profile() -> FlatBuffer2D<f32> {
    let mut grid = FlatBuffer2D::new(GRID_SIDE, GRID_SIDE, AllocatorKind::Persistent)
        .expect("benchmark grid shape is valid");
    for (x, y) in grid.shape().coords() {
        grid.set((x, y), x as f32 + y as f32 / 1000.0)
            .expect("coords() yields in-bounds coordinates");
    }
    grid
}

/// A 64x64x64 persistent volume where each cell holds its flat index.
pub fn volume_profile() -> FlatBuffer3D<u32> {
    let mut volume =
        FlatBuffer3D::new(VOLUME_SIDE, VOLUME_SIDE, VOLUME_SIDE, AllocatorKind::Persistent)
            .expect("benchmark volume shape is valid");
    let shape = volume.shape();
    for (flat, coord) in shape.coords().enumerate() {
        volume
            .set(coord, flat as u32)
            .expect("coords() yields in-bounds coordinates");
    }
    volume
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_profile_is_populated() {
        let mut grid = grid_profile();
        assert_eq!(grid.len(), (GRID_SIDE * GRID_SIDE) as usize);
        assert_eq!(grid.get((2, 500 % GRID_SIDE)).unwrap(), 2.0 + 244.0 / 1000.0);
        grid.dispose().unwrap();
    }

    #[test]
    fn volume_profile_export_is_ramp() {
        let mut volume = volume_profile();
        let flat = volume.to_vec().unwrap();
        assert!(flat.iter().enumerate().all(|(i, &v)| v == i as u32));
        volume.dispose().unwrap();
    }
}
