use alloc::boxed::Box;
use core::any::{Any, TypeId};

// -----------------------------------------------------------------------------
// Numeric widening

/// Attempts the documented lossless numeric widenings from the value behind
/// `any` to `T`. Returns `None` when no widening applies.
///
/// The table (target ← permitted sources):
///
/// | target | sources                            |
/// |--------|------------------------------------|
/// | `i16`  | `i8`, `u8`                         |
/// | `i32`  | `i8`, `i16`, `u8`, `u16`           |
/// | `i64`  | `i8`, `i16`, `i32`, `u8`, `u16`, `u32` |
/// | `u16`  | `u8`                               |
/// | `u32`  | `u8`, `u16`                        |
/// | `u64`  | `u8`, `u16`, `u32`                 |
/// | `f32`  | `i8`, `i16`, `u8`, `u16`           |
/// | `f64`  | `i8`, `i16`, `i32`, `u8`, `u16`, `u32`, `f32` |
///
/// Every entry is value-preserving; narrowing and sign-crossing conversions
/// are never performed implicitly.
pub(crate) fn widen<T: Any>(any: &dyn Any) -> Option<T> {
    macro_rules! widen_to {
        ($($target:ty => [$($source:ty),* $(,)?]);* $(;)?) => {
            $(
                if TypeId::of::<T>() == TypeId::of::<$target>() {
                    $(
                        if let Some(v) = any.downcast_ref::<$source>() {
                            let widened: $target = <$target>::from(*v);
                            let boxed: Box<dyn Any> = Box::new(widened);
                            return boxed.downcast::<T>().ok().map(|v| *v);
                        }
                    )*
                    return None;
                }
            )*
        };
    }

    widen_to! {
        i16 => [i8, u8];
        i32 => [i8, i16, u8, u16];
        i64 => [i8, i16, i32, u8, u16, u32];
        u16 => [u8];
        u32 => [u8, u16];
        u64 => [u8, u16, u32];
        f32 => [i8, i16, u8, u16];
        f64 => [i8, i16, i32, u8, u16, u32, f32];
    }

    None
}

#[cfg(test)]
mod tests {
    use super::widen;

    #[test]
    fn widening_preserves_value() {
        assert_eq!(widen::<i64>(&42i32), Some(42i64));
        assert_eq!(widen::<f64>(&42i32), Some(42.0f64));
        assert_eq!(widen::<f64>(&1.5f32), Some(1.5f64));
        assert_eq!(widen::<u64>(&7u16), Some(7u64));
        assert_eq!(widen::<i16>(&200u8), Some(200i16));
    }

    #[test]
    fn narrowing_and_sign_crossing_refused() {
        // Narrowing.
        assert_eq!(widen::<i32>(&42i64), None);
        assert_eq!(widen::<f32>(&42i32), None);
        // Sign crossing.
        assert_eq!(widen::<u32>(&42i32), None);
        assert_eq!(widen::<i32>(&42u32), None);
        // Float to int, never.
        assert_eq!(widen::<i64>(&1.0f64), None);
        // Unrelated types.
        assert_eq!(widen::<f64>(&true), None);
    }
}
