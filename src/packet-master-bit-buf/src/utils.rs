//! Miscellaneous utilities for working with bits.

/// Counts the leading zero bits of `value`.
///
/// Unlike hardware instructions on some targets, this is well
/// defined for `0` and yields [`u32::BITS`].
#[inline]
pub const fn leading_zeros(value: u32) -> u32 {
    value.leading_zeros()
}

/// Gets the number of bits needed to represent `value`, i.e. the
/// position of its highest set bit plus one.
///
/// Zero needs no bits at all.
#[inline]
pub const fn used_bit_width(value: u32) -> u32 {
    u32::BITS - leading_zeros(value)
}

/// Divides `lhs` by `rhs`, rounding towards positive infinity.
#[inline]
pub const fn ceil_div(lhs: u32, rhs: u32) -> u32 {
    lhs.div_ceil(rhs)
}

/// Rounds `value` up to the closest power of two.
///
/// `0` rounds up to `1`. Values above `2^31` saturate at `2^31`.
#[inline]
pub const fn closest_power_of_two(value: u32) -> u32 {
    match 1u32.checked_shl(used_bit_width(value.saturating_sub(1))) {
        Some(v) => v,
        None => 1 << 31,
    }
}

/// Builds a mask of `count` consecutive set bits starting at
/// bit `start`.
///
/// Shifting by the full type width produces an empty shift rather
/// than overflowing, so `bit_mask(0, 32)` is all ones and
/// `bit_mask(32, 1)` is zero.
#[inline]
pub const fn bit_mask(start: u32, count: u32) -> u32 {
    let low = match u32::MAX.checked_shl(count) {
        Some(v) => !v,
        None => u32::MAX,
    };

    match low.checked_shl(start) {
        Some(v) => v,
        None => 0,
    }
}

/// Converts `value` into its wire representation, which is
/// little endian regardless of the host.
#[inline]
pub const fn to_wire_bytes(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Converts a wire representation back into a host integer.
#[inline]
pub const fn from_wire_bytes(bytes: [u8; 4]) -> u32 {
    u32::from_le_bytes(bytes)
}
