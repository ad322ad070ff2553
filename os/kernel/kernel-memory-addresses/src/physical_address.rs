use core::fmt;
use core::ops::{Add, AddAssign};

/// Absolute storage address.
///
/// A thin wrapper around a `u64` that denotes a location in real storage.
/// Arithmetic that could leave the 64-bit address space is only available in
/// checked form, except for the `Add` impls which panic on overflow in debug
/// builds like any other integer addition.
///
/// ### Examples
/// ```rust
/// # use kernel_memory_addresses::*;
/// let pa = PhysicalAddress::new(0x10_0000);
/// assert!(pa.is_aligned(0x1000));
/// assert_eq!(pa.checked_add(0xf_ffff).map(PhysicalAddress::as_u64), Some(0x1f_ffff));
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(u64);

impl PhysicalAddress {
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0)
    }

    #[inline]
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    /// Address of a pointer; meaningful as long as storage is identity-mapped.
    #[inline]
    #[must_use]
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr.expose_provenance() as u64)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Pointer to this address; meaningful as long as storage is identity-mapped.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_mut_ptr<T>(self) -> *mut T {
        core::ptr::with_exposed_provenance_mut(self.0 as usize)
    }

    /// Whether the address is a multiple of `align` (a power of two).
    #[inline]
    #[must_use]
    pub const fn is_aligned(self, align: u64) -> bool {
        debug_assert!(align.is_power_of_two());
        self.0 & (align - 1) == 0
    }

    /// Round up to the next multiple of `align` (a power of two).
    ///
    /// Returns `None` if the result does not fit into 64 bits.
    #[inline]
    #[must_use]
    pub const fn align_up(self, align: u64) -> Option<Self> {
        debug_assert!(align.is_power_of_two());
        match self.0.checked_add(align - 1) {
            Some(v) => Some(Self(v & !(align - 1))),
            None => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn checked_add(self, bytes: u64) -> Option<Self> {
        match self.0.checked_add(bytes) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Number of bytes from `self` up to (excluding) `end`.
    ///
    /// Returns `None` if `end` lies below `self`.
    #[inline]
    #[must_use]
    pub const fn bytes_until(self, end: Self) -> Option<u64> {
        end.0.checked_sub(self.0)
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA(0x{:016X})", self.as_u64())
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.as_u64())
    }
}

impl From<u64> for PhysicalAddress {
    #[inline]
    fn from(v: u64) -> Self {
        Self::new(v)
    }
}

impl From<PhysicalAddress> for u64 {
    #[inline]
    fn from(a: PhysicalAddress) -> Self {
        a.as_u64()
    }
}

impl Add<u64> for PhysicalAddress {
    type Output = Self;
    #[inline]
    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl AddAssign<u64> for PhysicalAddress {
    #[inline]
    fn add_assign(&mut self, rhs: u64) {
        self.0 += rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_next_boundary() {
        let page = PhysicalAddress::new(0x2000);
        assert_eq!(PhysicalAddress::new(0x1001).align_up(0x1000), Some(page));
        assert_eq!(page.align_up(0x1000), Some(page));
        assert_eq!(PhysicalAddress::new(0).align_up(32), Some(PhysicalAddress::zero()));
    }

    #[test]
    fn align_up_reports_overflow() {
        assert_eq!(PhysicalAddress::new(u64::MAX - 3).align_up(16), None);
    }

    #[test]
    fn bytes_until_is_directional() {
        let a = PhysicalAddress::new(0x1000);
        let b = PhysicalAddress::new(0x3000);
        assert_eq!(a.bytes_until(b), Some(0x2000));
        assert_eq!(b.bytes_until(a), None);
        assert_eq!(a.bytes_until(a), Some(0));
    }

    #[test]
    fn checked_add_stops_at_top_of_address_space() {
        assert_eq!(PhysicalAddress::new(u64::MAX).checked_add(1), None);
        assert_eq!(
            PhysicalAddress::new(1 << 20).checked_add((1 << 20) - 1),
            Some(PhysicalAddress::new((2 << 20) - 1))
        );
    }

    #[test]
    fn formats_like_a_register_dump() {
        let pa = PhysicalAddress::new(0x0010_0000);
        assert_eq!(format!("{pa}"), "0x0000000000100000");
        assert_eq!(format!("{pa:?}"), "PA(0x0000000000100000)");
    }
}
