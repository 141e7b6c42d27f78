mod private {
    pub trait Sealed {}
}

/// Unsigned integer types supported by the codec.
///
/// All arithmetic is carried out in [`u32`], which is wide enough
/// for every implementor.
pub trait Uint: Copy + private::Sealed {
    /// The width of the type in bits.
    const BITS: u32;

    #[doc(hidden)]
    fn widen(self) -> u32;

    // Callers guarantee `value` fits into `Self::BITS` bits.
    #[doc(hidden)]
    fn narrow(value: u32) -> Self;
}

macro_rules! uint_impl {
    ($($ty:ty),* $(,)*) => {
        $(
            impl private::Sealed for $ty {}

            impl Uint for $ty {
                const BITS: u32 = <$ty>::BITS;

                #[inline]
                fn widen(self) -> u32 {
                    u32::from(self)
                }

                #[inline]
                fn narrow(value: u32) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

uint_impl! {
    u8,
    u16,
    u32,
}
