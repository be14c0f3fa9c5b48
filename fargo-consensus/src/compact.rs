//! Compact target encoding.
//!
//! A compact target packs a 256-bit threshold into 32 bits: the top byte is a
//! base-256 exponent (the length of the number in bytes) and the low 23 bits are
//! the mantissa. Bit 23 is a sign flag, which no valid target may carry. This is
//! the same representation Bitcoin uses for `nBits`, so the decoder reports the
//! `negative` and `overflow` conditions instead of rejecting anything itself.

use primitive_types::U256;

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// The result of expanding a compact target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedTarget {
    pub target: U256,
    /// Sign bit set on a non-zero mantissa
    pub negative: bool,
    /// The mantissa does not fit in 256 bits at this exponent
    pub overflow: bool,
}

impl DecodedTarget {
    /// A target usable as a proof-of-work threshold: positive and representable.
    pub fn is_valid(&self) -> bool {
        !self.negative && !self.overflow && !self.target.is_zero()
    }

    pub fn valid_target(&self) -> Option<U256> {
        if self.is_valid() {
            Some(self.target)
        } else {
            None
        }
    }
}

/// Expands compact `bits` into a full 256-bit target.
///
/// Every `u32` is a legal input. Bits shifted past the top of the 256-bit range
/// are discarded and reported through `overflow`.
pub fn decode(bits: u32) -> DecodedTarget {
    let size = bits >> 24;
    let mut word = bits & MANTISSA_MASK;

    let target = if size <= 3 {
        word >>= 8 * (3 - size);
        U256::from(word)
    } else {
        let shift = 8 * (size as usize - 3);
        if shift >= 256 {
            U256::zero()
        } else {
            U256::from(word) << shift
        }
    };

    // Both flags look at the mantissa after the small-exponent shift.
    let negative = word != 0 && bits & SIGN_BIT != 0;
    let overflow = word != 0
        && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));

    DecodedTarget {
        target,
        negative,
        overflow,
    }
}

/// Packs `value` into compact form, keeping the three most significant bytes.
///
/// The result never carries the sign bit. Precision below the top 23 mantissa
/// bits is lost, so `decode(encode(x))` is only equal to `x` for values that were
/// themselves produced by `decode`.
pub fn encode(value: U256) -> u32 {
    let mut size = (value.bits() + 7) / 8;
    let mut compact = if size <= 3 {
        (value.low_u64() << (8 * (3 - size))) as u32
    } else {
        (value >> (8 * (size - 3))).low_u64() as u32
    };

    // The mantissa is signed; move a set high bit into a new exponent byte.
    if compact & SIGN_BIT != 0 {
        compact >>= 8;
        size += 1;
    }

    compact | (size as u32) << 24
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_of(bits: u32) -> U256 {
        decode(bits).target
    }

    #[test]
    fn test_zero_mantissas_decode_to_zero() {
        for bits in [
            0x0000_0000u32,
            0x0012_3456,
            0x0100_3456,
            0x0200_0056,
            0x0300_0000,
            0x0400_0000,
            0x0092_3456,
            0x0180_3456,
            0x0280_0056,
            0x0380_0000,
            0x0480_0000,
        ] {
            let decoded = decode(bits);
            assert!(decoded.target.is_zero(), "{:08x}", bits);
            assert!(!decoded.negative, "{:08x}", bits);
            assert!(!decoded.overflow, "{:08x}", bits);
            assert_eq!(encode(decoded.target), 0);
        }
    }

    #[test]
    fn test_small_exponents() {
        assert_eq!(target_of(0x0112_3456), U256::from(0x12));
        assert_eq!(encode(U256::from(0x12)), 0x0112_0000);
        assert_eq!(target_of(0x0212_3456), U256::from(0x1234));
        assert_eq!(encode(U256::from(0x1234)), 0x0212_3400);
        assert_eq!(target_of(0x0312_3456), U256::from(0x12_3456));
        assert_eq!(encode(U256::from(0x12_3456)), 0x0312_3456);
    }

    #[test]
    fn test_high_mantissa_bit_moves_to_exponent() {
        assert_eq!(encode(U256::from(0x80)), 0x0200_8000);
        assert_eq!(target_of(0x0500_9234), U256::from(0x9234_0000u64));
        assert_eq!(encode(U256::from(0x9234_0000u64)), 0x0500_9234);
    }

    #[test]
    fn test_negative_flag() {
        let decoded = decode(0x01fe_dcba);
        assert_eq!(decoded.target, U256::from(0x7e));
        assert!(decoded.negative);

        let decoded = decode(0x0492_3456);
        assert_eq!(decoded.target, U256::from(0x1234_5600u64));
        assert!(decoded.negative);
        assert!(!decoded.is_valid());
    }

    #[test]
    fn test_large_exponent() {
        let decoded = decode(0x2012_3456);
        assert_eq!(decoded.target, U256::from(0x12_3456) << 232usize);
        assert!(!decoded.overflow);
        assert_eq!(encode(decoded.target), 0x2012_3456);
    }

    #[test]
    fn test_overflow_flag() {
        assert!(decode(0xff12_3456).overflow);
        assert!(decode(0x2301_0000).overflow);
        assert!(decode(0x2200_0100).overflow);
        assert!(!decode(0x2200_00ff).overflow);
        assert!(!decode(0x2100_ffff).overflow);
        assert!(decode(0x2101_0000).overflow);
    }

    #[test]
    fn test_mainnet_limit_bits() {
        let limit = fargo_shared_types::params::MAINNET_POW_LIMIT;
        assert_eq!(encode(limit), 0x1e0f_ffff);
        assert_eq!(target_of(0x1e0f_ffff), limit);
    }

    #[test]
    fn test_encode_truncates_low_bytes() {
        let value = U256::from(0x1234_5678u64);
        assert_eq!(encode(value), 0x0412_3456);
        assert_eq!(target_of(encode(value)), U256::from(0x1234_5600u64));
    }
}
