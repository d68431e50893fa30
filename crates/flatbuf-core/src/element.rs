//! The element contract for flat buffers.
//!
//! A flat buffer stores its elements as raw bytes: it zero-fills them on
//! allocation, copies them with `memcpy` and frees the block without running
//! destructors. [`Blittable`] captures what an element type must guarantee
//! for that to be sound, and [`ElementLayout`] is the size/alignment query
//! the containers run once at construction.

#![allow(unsafe_code)]

use std::mem;

use crate::error::FlatBufferError;

/// Plain value data that may be stored in a flat buffer.
///
/// # Safety
///
/// Implementors must guarantee that:
///
/// - the all-zero bit pattern is a valid value of the type;
/// - the type owns nothing: no heap pointers, references, handles or
///   other indirection, so a byte-for-byte copy is a complete copy;
/// - dropping a value is a no-op (implied by the `Copy` bound).
///
/// Primitive integers, floats, `bool`, `char` and fixed-size arrays of
/// blittable types qualify. `#[repr(C)]` structs composed only of
/// blittable fields may implement the trait manually.
pub unsafe trait Blittable: Copy + 'static {
    /// The element's zero value: the all-zero bit pattern.
    fn zeroed() -> Self {
        // SAFETY: the trait contract guarantees all-zero bytes are valid.
        unsafe { mem::zeroed() }
    }
}

macro_rules! blittable_primitives {
    ($($ty:ty),* $(,)?) => {
        $(
            // SAFETY: primitive value type, zero is a valid bit pattern.
            unsafe impl Blittable for $ty {}
        )*
    };
}

blittable_primitives!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, char,
);

// SAFETY: an array of blittable values is itself contiguous blittable data.
unsafe impl<T: Blittable, const N: usize> Blittable for [T; N] {}

/// Byte size and alignment of one element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementLayout {
    /// Byte size of one element; the stride between consecutive elements.
    pub size: usize,
    /// Required alignment in bytes.
    pub align: usize,
}

impl ElementLayout {
    /// Query the layout of `T`.
    pub fn of<T>() -> Self {
        Self {
            size: mem::size_of::<T>(),
            align: mem::align_of::<T>(),
        }
    }

    /// Query and validate the layout of `T` for flat storage.
    ///
    /// Rejects zero-sized types (a flat buffer of them has no address to
    /// compute) and types with drop glue.
    pub fn validated<T>() -> Result<Self, FlatBufferError> {
        let layout = Self::of::<T>();
        if mem::needs_drop::<T>() {
            return Err(FlatBufferError::InvalidArgument {
                argument: "T",
                reason: format!(
                    "{} owns resources and cannot be stored in a flat buffer",
                    std::any::type_name::<T>()
                ),
            });
        }
        if layout.size == 0 {
            return Err(FlatBufferError::InvalidArgument {
                argument: "T",
                reason: format!(
                    "{} is zero-sized and cannot be stored in a flat buffer",
                    std::any::type_name::<T>()
                ),
            });
        }
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    #[repr(C)]
    struct Texel {
        rgba: [u8; 4],
        depth: f32,
    }

    // SAFETY: repr(C) struct of blittable fields.
    unsafe impl Blittable for Texel {}

    #[test]
    fn zeroed_primitives() {
        assert_eq!(i32::zeroed(), 0);
        assert_eq!(f64::zeroed(), 0.0);
        assert!(!bool::zeroed());
        assert_eq!(char::zeroed(), '\0');
        assert_eq!(<[u16; 3]>::zeroed(), [0, 0, 0]);
    }

    #[test]
    fn zeroed_struct() {
        assert_eq!(
            Texel::zeroed(),
            Texel {
                rgba: [0; 4],
                depth: 0.0
            }
        );
    }

    #[test]
    fn layout_reports_size_and_alignment() {
        let layout = ElementLayout::validated::<Texel>().unwrap();
        assert_eq!(layout.size, 8);
        assert_eq!(layout.align, 4);
        assert_eq!(ElementLayout::of::<u64>().size, 8);
    }

    #[test]
    fn zero_sized_type_rejected() {
        let err = ElementLayout::validated::<()>().unwrap_err();
        assert!(matches!(
            err,
            FlatBufferError::InvalidArgument { argument: "T", .. }
        ));
    }

    #[test]
    fn type_with_drop_glue_rejected() {
        let err = ElementLayout::validated::<String>().unwrap_err();
        assert!(err.to_string().contains("owns resources"));
    }
}
