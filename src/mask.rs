//! Per-lane truth values.

use core::marker::PhantomData;
use core::ops::{BitAnd, BitOr, BitXor, Not};

use crate::backend::{Active, Backend, MaskOps};
use crate::element::LaneElement;

/// One truth value per lane of a [`Vector`](crate::Vector).
///
/// Produced by comparisons, consumed by blends, masked assignment and masked
/// reductions. The representation is whatever the backend's compare
/// instructions produce; the per-lane truth value is the only observable.
pub struct Mask<T: LaneElement, B: Backend = Active> {
    repr: B::MaskRepr<T>,
    _backend: PhantomData<B>,
}

impl<T: LaneElement, B: Backend> Copy for Mask<T, B> {}
impl<T: LaneElement, B: Backend> Clone for Mask<T, B> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, B> Mask<T, B>
where
    T: LaneElement,
    B: Backend,
    B::MaskRepr<T>: MaskOps,
{
    /// Number of lanes.
    pub const SIZE: usize = <B::MaskRepr<T> as MaskOps>::LANES;

    #[inline(always)]
    pub(crate) fn from_repr(repr: B::MaskRepr<T>) -> Self {
        Mask {
            repr,
            _backend: PhantomData,
        }
    }

    #[inline(always)]
    pub(crate) fn repr(self) -> B::MaskRepr<T> {
        self.repr
    }

    /// All lanes set to `value`.
    #[inline(always)]
    pub fn splat(value: bool) -> Self {
        Self::from_repr(MaskOps::splat(value))
    }

    /// One bit per lane, lane 0 in bit 0.
    #[inline(always)]
    pub fn to_bits(self) -> u64 {
        self.repr.to_bits()
    }

    /// Truth value of one lane.
    ///
    /// # Panics
    /// In debug builds, when `lane >= SIZE`.
    #[inline(always)]
    pub fn test(self, lane: usize) -> bool {
        self.repr.test(lane)
    }

    /// Number of set lanes.
    #[inline(always)]
    pub fn count(self) -> usize {
        self.repr.count()
    }

    /// True when every lane is set.
    #[inline(always)]
    pub fn is_full(self) -> bool {
        self.repr.all()
    }

    /// True when no lane is set.
    #[inline(always)]
    pub fn is_empty(self) -> bool {
        !self.repr.any()
    }

    /// True when some lanes are set and some are clear.
    #[inline(always)]
    pub fn is_mix(self) -> bool {
        self.repr.any() && !self.repr.all()
    }

    /// Iterates the indices of the set lanes in ascending order.
    ///
    /// The iterator is lazy and cheap to restart; masked per-lane operations
    /// and masked reductions are built on it.
    #[inline(always)]
    pub fn set_lanes(self) -> SetLanes {
        SetLanes {
            bits: self.to_bits(),
        }
    }
}

/// Ascending iterator over set lane indices. See [`Mask::set_lanes`].
#[derive(Copy, Clone, Debug)]
pub struct SetLanes {
    bits: u64,
}

impl Iterator for SetLanes {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<usize> {
        if self.bits == 0 {
            return None;
        }
        let lane = self.bits.trailing_zeros() as usize;
        self.bits &= self.bits - 1;
        Some(lane)
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.bits.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SetLanes {}

impl<T, B> BitAnd for Mask<T, B>
where
    T: LaneElement,
    B: Backend,
    B::MaskRepr<T>: MaskOps,
{
    type Output = Self;

    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        Self::from_repr(self.repr.and(rhs.repr))
    }
}

impl<T, B> BitOr for Mask<T, B>
where
    T: LaneElement,
    B: Backend,
    B::MaskRepr<T>: MaskOps,
{
    type Output = Self;

    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self::from_repr(self.repr.or(rhs.repr))
    }
}

impl<T, B> BitXor for Mask<T, B>
where
    T: LaneElement,
    B: Backend,
    B::MaskRepr<T>: MaskOps,
{
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self {
        Self::from_repr(self.repr.xor(rhs.repr))
    }
}

impl<T, B> Not for Mask<T, B>
where
    T: LaneElement,
    B: Backend,
    B::MaskRepr<T>: MaskOps,
{
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        Self::from_repr(self.repr.not())
    }
}

impl<T, B> PartialEq for Mask<T, B>
where
    T: LaneElement,
    B: Backend,
    B::MaskRepr<T>: MaskOps,
{
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl<T, B> Eq for Mask<T, B>
where
    T: LaneElement,
    B: Backend,
    B::MaskRepr<T>: MaskOps,
{
}

impl<T, B> core::fmt::Debug for Mask<T, B>
where
    T: LaneElement,
    B: Backend,
    B::MaskRepr<T>: MaskOps,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Mask[")?;
        for lane in 0..Self::SIZE {
            let c = if self.test(lane) { '1' } else { '0' };
            write!(f, "{c}")?;
        }
        write!(f, "]")
    }
}
