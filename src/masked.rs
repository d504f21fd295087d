//! The masked-write proxy.
//!
//! `vector.masked(mask)` borrows the vector for a single statement and
//! restricts the following write to the lanes the mask selects:
//!
//! ```ignore
//! v.masked(v.cmp_lt(limit)).assign(limit);
//! let mut clipped = v.masked(m);
//! clipped += step;
//! ```
//!
//! Lanes outside the mask keep their prior contents; every compound form is
//! one lane operation plus one blend.

use core::ops::{
    AddAssign, BitAndAssign, BitOrAssign, BitXorAssign, DivAssign, MulAssign, RemAssign,
    ShlAssign, ShrAssign, SubAssign,
};

use crate::backend::{Backend, IntLaneOps, LaneOps, MaskOps};
use crate::element::{IntegerElement, LaneElement};
use crate::mask::Mask;
use crate::vector::Vector;

/// Write proxy returned by [`Vector::masked`]. Lives for one expression;
/// the `&mut` borrow keeps the target exclusive.
pub struct WriteMasked<'a, T: LaneElement, B: Backend> {
    target: &'a mut Vector<T, B>,
    mask: Mask<T, B>,
}

impl<'a, T, B> WriteMasked<'a, T, B>
where
    T: LaneElement,
    B: Backend,
    B::Repr<T>: LaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    #[inline(always)]
    pub(crate) fn new(target: &'a mut Vector<T, B>, mask: Mask<T, B>) -> Self {
        WriteMasked { target, mask }
    }

    #[inline(always)]
    fn merge(self, updated: Vector<T, B>) {
        *self.target = self.target.blend(self.mask, updated);
    }

    /// Overwrites the masked lanes with the matching lanes of `value`.
    #[inline(always)]
    pub fn assign(self, value: Vector<T, B>) {
        self.merge(value);
    }

    /// Adds one to the masked lanes, returning the updated vector
    /// (pre-increment). Unmasked lanes keep their value in the result too.
    #[inline(always)]
    pub fn pre_increment(self) -> Vector<T, B> {
        let updated = *self.target + Vector::one();
        *self.target = self.target.blend(self.mask, updated);
        *self.target
    }

    /// Adds one to the masked lanes, returning the vector from before the
    /// update (post-increment).
    #[inline(always)]
    pub fn post_increment(self) -> Vector<T, B> {
        let original = *self.target;
        let updated = original + Vector::one();
        self.merge(updated);
        original
    }

    /// Subtracts one from the masked lanes, returning the updated vector
    /// (pre-decrement). Unmasked lanes keep their value in the result too.
    #[inline(always)]
    pub fn pre_decrement(self) -> Vector<T, B> {
        let updated = *self.target - Vector::one();
        *self.target = self.target.blend(self.mask, updated);
        *self.target
    }

    /// Subtracts one from the masked lanes, returning the vector from
    /// before the update (post-decrement).
    #[inline(always)]
    pub fn post_decrement(self) -> Vector<T, B> {
        let original = *self.target;
        let updated = original - Vector::one();
        self.merge(updated);
        original
    }
}

macro_rules! masked_compound_assign {
    ($trait:ident, $method:ident, op = $op:tt,
     bound = $bound:ident, elem = $elem_bound:ident) => {
        impl<T, B> $trait<Vector<T, B>> for WriteMasked<'_, T, B>
        where
            T: $elem_bound,
            B: Backend,
            B::Repr<T>: $bound<T, Mask = B::MaskRepr<T>>,
            B::MaskRepr<T>: MaskOps,
        {
            #[inline(always)]
            fn $method(&mut self, rhs: Vector<T, B>) {
                let updated = *self.target $op rhs;
                *self.target = self.target.blend(self.mask, updated);
            }
        }
    };
}

masked_compound_assign!(AddAssign, add_assign, op = +, bound = LaneOps, elem = LaneElement);
masked_compound_assign!(SubAssign, sub_assign, op = -, bound = LaneOps, elem = LaneElement);
masked_compound_assign!(MulAssign, mul_assign, op = *, bound = LaneOps, elem = LaneElement);
masked_compound_assign!(DivAssign, div_assign, op = /, bound = LaneOps, elem = LaneElement);
masked_compound_assign!(RemAssign, rem_assign, op = %, bound = IntLaneOps, elem = IntegerElement);
masked_compound_assign!(BitAndAssign, bitand_assign, op = &, bound = IntLaneOps, elem = IntegerElement);
masked_compound_assign!(BitOrAssign, bitor_assign, op = |, bound = IntLaneOps, elem = IntegerElement);
masked_compound_assign!(BitXorAssign, bitxor_assign, op = ^, bound = IntLaneOps, elem = IntegerElement);

impl<T, B> ShlAssign<u32> for WriteMasked<'_, T, B>
where
    T: IntegerElement,
    B: Backend,
    B::Repr<T>: IntLaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    #[inline(always)]
    fn shl_assign(&mut self, count: u32) {
        let updated = *self.target << count;
        *self.target = self.target.blend(self.mask, updated);
    }
}

impl<T, B> ShrAssign<u32> for WriteMasked<'_, T, B>
where
    T: IntegerElement,
    B: Backend,
    B::Repr<T>: IntLaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    #[inline(always)]
    fn shr_assign(&mut self, count: u32) {
        let updated = *self.target >> count;
        *self.target = self.target.blend(self.mask, updated);
    }
}

impl<T, B> WriteMasked<'_, T, B>
where
    T: IntegerElement,
    B: Backend,
    B::Repr<T>: IntLaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    /// Per-lane shift counts; the masked lanes shift, the rest stay.
    #[inline(always)]
    pub fn shl_lanes_assign(self, counts: Vector<T, B>) {
        let updated = self.target.shl_lanes(counts);
        self.merge(updated);
    }

    /// Per-lane shift counts; the masked lanes shift, the rest stay.
    #[inline(always)]
    pub fn shr_lanes_assign(self, counts: Vector<T, B>) {
        let updated = self.target.shr_lanes(counts);
        self.merge(updated);
    }
}
