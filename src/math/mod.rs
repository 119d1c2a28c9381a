//! Vector/matrix primitives sized for WGSL buffer layout
//!
//! Three-component values are padded to four lanes so the raw float data
//! can be written to GPU buffers without repacking.

mod matrix;
mod vector;

pub use matrix::{Matrix, MatrixError};
pub use vector::{Vector, VectorError};

use thiserror::Error;

/// Alignment failure for [`round_up`]
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot round up to a multiple of {multiple} from {value}; both operands must be positive")]
pub struct AlignError {
    pub multiple: u64,
    pub value: u64,
}

/// Smallest multiple of `multiple` that is >= `value`.
///
/// Used to pad buffer sizes to the 16-byte granularity uniform and
/// storage bindings expect.
pub fn round_up(multiple: u64, value: u64) -> Result<u64, AlignError> {
    if multiple == 0 || value == 0 {
        return Err(AlignError { multiple, value });
    }
    Ok(value.div_ceil(multiple) * multiple)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_round_up_exact_multiple() {
        assert_eq!(round_up(16, 16), Ok(16));
        assert_eq!(round_up(16, 32), Ok(32));
    }

    #[test]
    fn test_round_up_pads_to_next_multiple() {
        assert_eq!(round_up(16, 1), Ok(16));
        assert_eq!(round_up(16, 12), Ok(16));
        assert_eq!(round_up(16, 17), Ok(32));
        assert_eq!(round_up(4, 10), Ok(12));
    }

    #[test]
    fn test_round_up_rejects_zero_operands() {
        assert!(round_up(0, 10).is_err());
        assert!(round_up(16, 0).is_err());
        assert!(round_up(0, 0).is_err());
    }

    proptest! {
        #[test]
        fn round_up_returns_smallest_multiple(k in 1u64..128, n in 1u64..100_000) {
            let m = round_up(k, n).unwrap();
            prop_assert!(m >= n);
            prop_assert_eq!(m % k, 0);
            // One step smaller would undershoot
            prop_assert!(m < n + k);
        }
    }
}
