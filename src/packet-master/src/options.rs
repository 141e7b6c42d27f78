//! Encoding plans for variable-width unsigned integers.
//!
//! A field with a budget of `max_bits` is split into a power of two
//! number of segments. Segment sizes differ by at most one bit; the
//! bigger ones come first. An encoded value starts with a length
//! prefix naming how many segments its payload spans, followed by
//! the payload rounded up to that many segments.
//!
//! More segments mean a longer prefix but less wasted payload, so
//! the `segments_hint` trades one against the other. Choosing one
//! segment per byte yields a plain byte-count prefix.

use packet_master_bit_buf::utils::{ceil_div, closest_power_of_two, used_bit_width};

/// Caller-facing configuration of an integer field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UintOptions {
    /// The largest number of bits the field ever needs.
    pub max_bits: u32,
    /// The desired number of segments, rounded up to the closest
    /// power of two.
    ///
    /// Leave at `0` for one segment per started byte.
    pub segments_hint: u32,
}

impl UintOptions {
    /// Precomputes the encoding plan for these options.
    #[inline]
    pub const fn prepare(self) -> PreparedUintOptions {
        PreparedUintOptions::new(self.max_bits, self.segments_hint)
    }
}

/// A precomputed encoding plan for an integer field.
///
/// Plans are pure functions of their [`UintOptions`] and can be
/// shared freely between serializers and deserializers. They can
/// only be built through [`PreparedUintOptions::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreparedUintOptions {
    max_bits: u32,
    segment_count: u32,
    small_segment_bits: u32,
    big_segment_bits: u32,
    big_segment_count: u32,
    length_prefix_bits: u32,
}

impl PreparedUintOptions {
    /// Builds the encoding plan for a field of `max_bits` bits.
    ///
    /// `max_bits` must be between 1 and 32. Hints beyond `2^31` are
    /// treated as `2^31`.
    pub const fn new(max_bits: u32, segments_hint: u32) -> Self {
        debug_assert!(max_bits >= 1 && max_bits <= u32::BITS);

        let hint = if segments_hint != 0 {
            segments_hint
        } else {
            ceil_div(max_bits, u8::BITS)
        };
        let segment_count = closest_power_of_two(hint);

        let small_segment_bits = max_bits / segment_count;
        Self {
            max_bits,
            segment_count,
            small_segment_bits,
            big_segment_bits: small_segment_bits + 1,
            big_segment_count: max_bits % segment_count,
            length_prefix_bits: used_bit_width(segment_count - 1),
        }
    }

    /// The largest number of bits the field ever needs.
    #[inline]
    pub const fn max_bits(&self) -> u32 {
        self.max_bits
    }

    /// Total number of segments, always a power of two.
    #[inline]
    pub const fn segment_count(&self) -> u32 {
        self.segment_count
    }

    /// Size of the smaller segments in bits.
    #[inline]
    pub const fn small_segment_bits(&self) -> u32 {
        self.small_segment_bits
    }

    /// Size of the bigger segments in bits.
    #[inline]
    pub const fn big_segment_bits(&self) -> u32 {
        self.big_segment_bits
    }

    /// Number of bigger segments, which precede all smaller ones.
    #[inline]
    pub const fn big_segment_count(&self) -> u32 {
        self.big_segment_count
    }

    /// Number of bits in the length prefix.
    #[inline]
    pub const fn length_prefix_bits(&self) -> u32 {
        self.length_prefix_bits
    }

    /// Gets the number of segments needed for a payload of `used_bits`
    /// bits, along with the bits those segments span.
    ///
    /// Bigger segments are consumed first.
    pub const fn segments_for(&self, used_bits: u32) -> (u32, u32) {
        let mut segments = ceil_div(used_bits, self.big_segment_bits);
        if segments > self.big_segment_count {
            segments = self.big_segment_count;
        }
        let mut bits = segments * self.big_segment_bits;

        if bits < used_bits && self.small_segment_bits != 0 {
            let small = ceil_div(used_bits - bits, self.small_segment_bits);
            segments += small;
            bits += small * self.small_segment_bits;
        }

        (segments, bits)
    }

    /// Gets the number of payload bits spanned by `segments` segments.
    pub const fn bits_for_segments(&self, segments: u32) -> u32 {
        let big = if segments < self.big_segment_count {
            segments
        } else {
            self.big_segment_count
        };
        let small = segments - big;

        big * self.big_segment_bits + small * self.small_segment_bits
    }
}

macro_rules! uint_options_impl {
    ($($ty:ty => $default:ident, $max_bits:ident, $max:ident);* $(;)*) => {
        $(
            #[doc = concat!("The default plan for [`", stringify!($ty), "`], covering all of its bits.")]
            #[inline]
            pub const fn $default() -> PreparedUintOptions {
                PreparedUintOptions::new(<$ty>::BITS, 0)
            }

            #[doc = concat!("A plan for [`", stringify!($ty), "`] values never wider than `bits`.")]
            #[inline]
            pub const fn $max_bits(bits: u32) -> PreparedUintOptions {
                debug_assert!(bits <= <$ty>::BITS);
                PreparedUintOptions::new(bits, 0)
            }

            #[doc = concat!("A plan for [`", stringify!($ty), "`] values never larger than `number`.")]
            ///
            /// Values are not validated against the maximum.
            #[inline]
            pub const fn $max(number: $ty) -> PreparedUintOptions {
                let bits = used_bit_width(number as u32);
                PreparedUintOptions::new(if bits == 0 { 1 } else { bits }, 0)
            }
        )*
    };
}

uint_options_impl! {
    u8 => uint8_default, uint8_max_bits, uint8_max;
    u16 => uint16_default, uint16_max_bits, uint16_max;
    u32 => uint32_default, uint32_max_bits, uint32_max;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plans() {
        let plan = uint8_default();
        assert_eq!(plan.segment_count, 1);
        assert_eq!(plan.small_segment_bits, 8);
        assert_eq!(plan.big_segment_count, 0);
        assert_eq!(plan.length_prefix_bits, 0);

        let plan = uint16_default();
        assert_eq!(plan.segment_count, 2);
        assert_eq!(plan.small_segment_bits, 8);
        assert_eq!(plan.length_prefix_bits, 1);

        let plan = uint32_default();
        assert_eq!(plan.segment_count, 4);
        assert_eq!(plan.small_segment_bits, 8);
        assert_eq!(plan.length_prefix_bits, 2);
    }

    #[test]
    fn uneven_segments() {
        // 20 bits over 4 segments: 5 + 5 + 5 + 5.
        let plan = PreparedUintOptions::new(20, 4);
        assert_eq!(plan.small_segment_bits, 5);
        assert_eq!(plan.big_segment_count, 0);

        // 10 bits over a hint of 3, rounded to 4: 3 + 3 + 2 + 2.
        let plan = UintOptions {
            max_bits: 10,
            segments_hint: 3,
        }
        .prepare();
        assert_eq!(plan.segment_count, 4);
        assert_eq!(plan.big_segment_bits, 3);
        assert_eq!(plan.big_segment_count, 2);
        assert_eq!(plan.small_segment_bits, 2);
        assert_eq!(plan.length_prefix_bits, 2);
    }

    #[test]
    fn segment_budget_adds_up() {
        for max_bits in 1..=32 {
            for hint in 0..=32 {
                let plan = PreparedUintOptions::new(max_bits, hint);
                let small_count = plan.segment_count - plan.big_segment_count;

                assert!(plan.segment_count.is_power_of_two());
                assert_eq!(
                    plan.small_segment_bits * small_count
                        + plan.big_segment_bits * plan.big_segment_count,
                    max_bits
                );
                assert_eq!(plan.bits_for_segments(plan.segment_count), max_bits);
            }
        }
    }

    #[test]
    fn segments_are_symmetric() {
        for max_bits in 1..=32 {
            for hint in [0, 1, 2, 3, 4, 8, 16, 32] {
                let plan = PreparedUintOptions::new(max_bits, hint);

                for used_bits in 1..=max_bits {
                    let (segments, bits) = plan.segments_for(used_bits);

                    assert!(segments >= 1 && segments <= plan.segment_count);
                    assert!(bits >= used_bits && bits <= max_bits);
                    assert_eq!(plan.bits_for_segments(segments), bits);
                }
            }
        }
    }

    #[test]
    fn max_derives_bit_width() {
        assert_eq!(uint8_max(127).max_bits, 7);
        assert_eq!(uint8_max(0).max_bits, 1);
        assert_eq!(uint16_max(1023).max_bits, 10);
        assert_eq!(uint32_max(u32::MAX).max_bits, 32);
    }

    #[test]
    fn huge_hint_saturates() {
        let plan = PreparedUintOptions::new(8, u32::MAX);
        assert_eq!(plan.segment_count(), 1 << 31);
        assert_eq!(plan.length_prefix_bits(), 31);
        assert_eq!(plan.big_segment_bits(), 1);
        assert_eq!(plan.big_segment_count(), 8);
        assert_eq!(plan.small_segment_bits(), 0);

        assert_eq!(plan.segments_for(5), (5, 5));
        assert_eq!(plan.bits_for_segments(plan.segment_count()), 8);
    }
}
