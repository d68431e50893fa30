//! End-to-end read/write scenarios for each rank.

use flatbuf_array::{FlatBuffer1D, FlatBuffer2D, FlatBuffer3D, Shape};
use flatbuf_core::{AllocatorKind, Axis, FlatBufferError};
use flatbuf_test_utils::{assert_released, tracked};

#[test]
fn rank1_squares_then_clear() {
    const SIZE: i32 = 256;
    let mut subject = FlatBuffer1D::<i32>::new(SIZE, AllocatorKind::Scoped).unwrap();
    assert_eq!(subject.size(), SIZE as usize);

    for i in 0..SIZE {
        subject.set(i, i * i).unwrap();
    }
    for i in 0..SIZE {
        assert_eq!(subject.get(i).unwrap(), i * i);
    }

    subject.clear().unwrap();
    for i in 0..SIZE {
        assert_eq!(subject.get(i).unwrap(), 0);
    }

    subject.dispose().unwrap();
}

#[test]
fn rank2_sequential_write_follows_x_major_layout() {
    const WIDTH: i32 = 16;
    const HEIGHT: i32 = 22;
    let mut subject = FlatBuffer2D::<i32>::new(WIDTH, HEIGHT, AllocatorKind::Scoped).unwrap();
    assert_eq!(subject.width(), WIDTH as usize);
    assert_eq!(subject.height(), HEIGHT as usize);

    let mut value = 0;
    for x in 0..WIDTH {
        for y in 0..HEIGHT {
            subject.set((x, y), value).unwrap();
            assert_eq!(subject.get((x, y)).unwrap(), value);
            value += 1;
        }
    }

    let mut value = 0;
    for x in 0..WIDTH {
        for y in 0..HEIGHT {
            assert_eq!(subject.get((x, y)).unwrap(), value);
            value += 1;
        }
    }

    // Nested x-then-y order is exactly flat storage order.
    let expected: Vec<i32> = (0..WIDTH * HEIGHT).collect();
    assert_eq!(subject.to_vec().unwrap(), expected);

    subject.dispose().unwrap();
}

#[cfg(feature = "checks")]
#[test]
fn rank2_out_of_range_coordinates_fail() {
    const WIDTH: i32 = 16;
    const HEIGHT: i32 = 22;
    let mut subject = FlatBuffer2D::<i32>::new(WIDTH, HEIGHT, AllocatorKind::Scoped).unwrap();

    let cases = [
        ((WIDTH, 0), Axis::X, WIDTH as i64),
        ((0, HEIGHT), Axis::Y, HEIGHT as i64),
        ((-1, 0), Axis::X, -1),
        ((0, -1), Axis::Y, -1),
    ];
    for (coord, axis, index) in cases {
        let err = subject.set(coord, 10).unwrap_err();
        match err {
            FlatBufferError::IndexOutOfRange {
                axis: a, index: i, ..
            } => {
                assert_eq!(a, axis, "{coord:?}");
                assert_eq!(i, index, "{coord:?}");
            }
            other => panic!("{coord:?}: expected IndexOutOfRange, got {other:?}"),
        }
        assert!(subject.get(coord).is_err());
    }

    subject.dispose().unwrap();
}

#[test]
fn rank3_sequential_write_read_back() {
    const WIDTH: i32 = 32;
    const HEIGHT: i32 = 32;
    const DEPTH: i32 = 32;
    let mut subject =
        FlatBuffer3D::<i32>::new(WIDTH, HEIGHT, DEPTH, AllocatorKind::Scoped).unwrap();
    assert_eq!(subject.width(), WIDTH as usize);
    assert_eq!(subject.height(), HEIGHT as usize);
    assert_eq!(subject.depth(), DEPTH as usize);

    let mut value = 0;
    for x in 0..WIDTH {
        for y in 0..HEIGHT {
            for z in 0..DEPTH {
                subject.set((x, y, z), value).unwrap();
                assert_eq!(subject.get((x, y, z)).unwrap(), value);
                value += 1;
            }
        }
    }

    let mut value = 0;
    for x in 0..WIDTH {
        for y in 0..HEIGHT {
            for z in 0..DEPTH {
                assert_eq!(subject.get((x, y, z)).unwrap(), value);
                value += 1;
            }
        }
    }

    // Storage order is z-major, x-minor.
    let flat = subject.to_vec().unwrap();
    assert_eq!(flat[0], subject.get((0, 0, 0)).unwrap());
    assert_eq!(flat[1], subject.get((1, 0, 0)).unwrap());
    assert_eq!(flat[WIDTH as usize], subject.get((0, 1, 0)).unwrap());
    assert_eq!(
        flat[(WIDTH * HEIGHT) as usize],
        subject.get((0, 0, 1)).unwrap()
    );

    subject.dispose().unwrap();
}

#[cfg(feature = "checks")]
#[test]
fn rank3_single_axis_out_of_range_fails() {
    const N: i32 = 32;
    let mut subject = FlatBuffer3D::<i32>::new(N, N, N, AllocatorKind::Scoped).unwrap();

    let cases = [
        ((N, 0, 0), Axis::X),
        ((0, N, 0), Axis::Y),
        ((0, 0, N), Axis::Z),
        ((-1, 0, 0), Axis::X),
        ((0, -1, 0), Axis::Y),
        ((0, 0, -1), Axis::Z),
    ];
    for (coord, axis) in cases {
        assert!(
            matches!(
                subject.set(coord, 10),
                Err(FlatBufferError::IndexOutOfRange { axis: a, bound: 32, .. }) if a == axis
            ),
            "{coord:?} should fail on {axis}"
        );
        assert!(subject.get(coord).is_err());
    }

    subject.dispose().unwrap();
}

#[test]
fn construction_rejects_negative_dimensions_and_none_kind() {
    for dims in [(-1, 10, 10), (10, -10, 10), (-1, 10, -1), (-10, -10, -10)] {
        let err = FlatBuffer3D::<i32>::new(dims.0, dims.1, dims.2, AllocatorKind::Scoped)
            .err()
            .unwrap();
        assert!(
            matches!(err, FlatBufferError::InvalidArgument { .. }),
            "{dims:?}"
        );
    }
    assert!(matches!(
        FlatBuffer1D::<i32>::new(-1, AllocatorKind::Persistent).err(),
        Some(FlatBufferError::InvalidArgument { argument: "size", .. })
    ));

    let err = FlatBuffer3D::<i32>::new(32, 32, 32, AllocatorKind::None)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        FlatBufferError::InvalidArgument {
            argument: "kind",
            ..
        }
    ));
}

#[test]
fn storage_order_export_matches_coordinate_walk() {
    let mut grid = FlatBuffer2D::<u32>::new(5, 7, AllocatorKind::Deferred).unwrap();
    let mut cube = FlatBuffer3D::<u32>::new(3, 4, 5, AllocatorKind::Deferred).unwrap();
    for (x, y) in grid.shape().coords() {
        grid.set((x, y), (x * 100 + y) as u32).unwrap();
    }
    for (x, y, z) in cube.shape().coords() {
        cube.set((x, y, z), (x * 10_000 + y * 100 + z) as u32).unwrap();
    }

    let walked: Vec<u32> = grid
        .shape()
        .coords()
        .map(|c| grid.get(c).unwrap())
        .collect();
    assert_eq!(grid.to_vec().unwrap(), walked);

    let walked: Vec<u32> = cube
        .shape()
        .coords()
        .map(|c| cube.get(c).unwrap())
        .collect();
    assert_eq!(cube.to_vec().unwrap(), walked);

    grid.dispose().unwrap();
    cube.dispose().unwrap();
}

#[cfg(feature = "checks")]
#[test]
fn any_access_after_dispose_fails_for_every_rank() {
    let (tracker, allocator) = tracked();

    let mut a = FlatBuffer1D::<i32>::with_allocator(
        flatbuf_array::Shape1::new(4).unwrap(),
        AllocatorKind::Scoped,
        allocator.clone(),
    )
    .unwrap();
    let mut b = FlatBuffer2D::<i32>::with_allocator(
        flatbuf_array::Shape2::new(2, 2).unwrap(),
        AllocatorKind::Scoped,
        allocator.clone(),
    )
    .unwrap();
    let mut c = FlatBuffer3D::<i32>::with_allocator(
        flatbuf_array::Shape3::new(2, 2, 2).unwrap(),
        AllocatorKind::Scoped,
        allocator,
    )
    .unwrap();

    a.dispose().unwrap();
    b.dispose().unwrap();
    c.dispose().unwrap();
    assert_released(&tracker);

    assert_eq!(a.get(0), Err(FlatBufferError::UseAfterDispose));
    assert_eq!(b.set((0, 0), 1), Err(FlatBufferError::UseAfterDispose));
    assert_eq!(c.clear(), Err(FlatBufferError::UseAfterDispose));
    assert_eq!(c.to_vec(), Err(FlatBufferError::UseAfterDispose));
    assert_eq!(a.dispose(), Err(FlatBufferError::UseAfterDispose));
    assert_eq!(b.dispose(), Err(FlatBufferError::UseAfterDispose));
    assert_eq!(c.dispose(), Err(FlatBufferError::UseAfterDispose));
    assert_released(&tracker);
}
