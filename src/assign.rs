//! Conditional assignment through operator tags.
//!
//! The free-function form of the masked write: the operator is a zero-sized
//! tag type picked at the call site, and the whole call monomorphizes to one
//! lane operation plus one blend:
//!
//! ```ignore
//! conditional_assign::<PlusAssign, _, _>(&mut v, mask, step);
//! let before = conditional_update::<PostIncrement, _, _>(&mut v, mask);
//! ```
//!
//! The tag set is sealed and closed. Tags whose operator exists only for
//! integral elements carry that bound, so `XorAssign` on a float vector is
//! rejected when the call is type-checked, exactly like the operator itself.

use crate::backend::{Backend, IntLaneOps, LaneOps, MaskOps};
use crate::element::{IntegerElement, LaneElement};
use crate::mask::Mask;
use crate::vector::Vector;

mod sealed {
    pub trait Sealed {}
}

/// A compound-assignment operator, as a type. See [`conditional_assign`].
pub trait AssignOperator<T: LaneElement, B: Backend>: sealed::Sealed {
    /// The unmasked combine step.
    fn apply(lhs: Vector<T, B>, rhs: Vector<T, B>) -> Vector<T, B>;
}

/// An in-place update operator, as a type. See [`conditional_update`].
pub trait UpdateOperator<T: LaneElement, B: Backend>: sealed::Sealed {
    /// Whether the caller receives the pre-update value (post-increment
    /// convention) instead of the merged result.
    const RETURNS_ORIGINAL: bool;

    /// The unmasked update step.
    fn updated(v: Vector<T, B>) -> Vector<T, B>;
}

/// Applies `Op` to the masked lanes of `target`; the rest are untouched.
#[inline(always)]
pub fn conditional_assign<Op, T, B>(
    target: &mut Vector<T, B>,
    mask: Mask<T, B>,
    rhs: Vector<T, B>,
) where
    Op: AssignOperator<T, B>,
    T: LaneElement,
    B: Backend,
    B::Repr<T>: LaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    let updated = Op::apply(*target, rhs);
    *target = target.blend(mask, updated);
}

/// Applies `Op` to the masked lanes of `target` and returns the vector the
/// operator convention calls for: the merged result for the `Pre*` tags, the
/// pre-update value for the `Post*` tags.
#[inline(always)]
pub fn conditional_update<Op, T, B>(target: &mut Vector<T, B>, mask: Mask<T, B>) -> Vector<T, B>
where
    Op: UpdateOperator<T, B>,
    T: LaneElement,
    B: Backend,
    B::Repr<T>: LaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    let original = *target;
    *target = original.blend(mask, Op::updated(original));
    if Op::RETURNS_ORIGINAL {
        original
    } else {
        *target
    }
}

macro_rules! assign_tag {
    ($(#[$doc:meta])* $name:ident, |$lhs:ident, $rhs:ident| $body:expr,
     bound = $bound:ident, elem = $elem_bound:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
        pub struct $name;

        impl sealed::Sealed for $name {}

        impl<T, B> AssignOperator<T, B> for $name
        where
            T: $elem_bound,
            B: Backend,
            B::Repr<T>: $bound<T, Mask = B::MaskRepr<T>>,
            B::MaskRepr<T>: MaskOps,
        {
            #[inline(always)]
            fn apply($lhs: Vector<T, B>, $rhs: Vector<T, B>) -> Vector<T, B> {
                $body
            }
        }
    };
}

assign_tag!(
    /// Plain overwrite: `lhs = rhs`.
    Assign, |_lhs, rhs| rhs, bound = LaneOps, elem = LaneElement
);
assign_tag!(
    /// `lhs += rhs`.
    PlusAssign, |lhs, rhs| lhs + rhs, bound = LaneOps, elem = LaneElement
);
assign_tag!(
    /// `lhs -= rhs`.
    MinusAssign, |lhs, rhs| lhs - rhs, bound = LaneOps, elem = LaneElement
);
assign_tag!(
    /// `lhs *= rhs`.
    MultiplyAssign, |lhs, rhs| lhs * rhs, bound = LaneOps, elem = LaneElement
);
assign_tag!(
    /// `lhs /= rhs`.
    DivideAssign, |lhs, rhs| lhs / rhs, bound = LaneOps, elem = LaneElement
);
assign_tag!(
    /// `lhs %= rhs`. Integral elements only.
    RemainderAssign, |lhs, rhs| lhs % rhs, bound = IntLaneOps, elem = IntegerElement
);
assign_tag!(
    /// `lhs ^= rhs`. Integral elements only.
    XorAssign, |lhs, rhs| lhs ^ rhs, bound = IntLaneOps, elem = IntegerElement
);
assign_tag!(
    /// `lhs &= rhs`. Integral elements only.
    AndAssign, |lhs, rhs| lhs & rhs, bound = IntLaneOps, elem = IntegerElement
);
assign_tag!(
    /// `lhs |= rhs`. Integral elements only.
    OrAssign, |lhs, rhs| lhs | rhs, bound = IntLaneOps, elem = IntegerElement
);
assign_tag!(
    /// `lhs <<= rhs`, per-lane counts. Integral elements only.
    LeftShiftAssign, |lhs, rhs| lhs << rhs, bound = IntLaneOps, elem = IntegerElement
);
assign_tag!(
    /// `lhs >>= rhs`, per-lane counts. Integral elements only.
    RightShiftAssign, |lhs, rhs| lhs >> rhs, bound = IntLaneOps, elem = IntegerElement
);

macro_rules! update_tag {
    ($(#[$doc:meta])* $name:ident, returns_original = $ret:expr, |$v:ident| $body:expr) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
        pub struct $name;

        impl sealed::Sealed for $name {}

        impl<T, B> UpdateOperator<T, B> for $name
        where
            T: LaneElement,
            B: Backend,
            B::Repr<T>: LaneOps<T, Mask = B::MaskRepr<T>>,
            B::MaskRepr<T>: MaskOps,
        {
            const RETURNS_ORIGINAL: bool = $ret;

            #[inline(always)]
            fn updated($v: Vector<T, B>) -> Vector<T, B> {
                $body
            }
        }
    };
}

update_tag!(
    /// `++lhs`: add one, yield the merged result.
    PreIncrement, returns_original = false, |v| v + Vector::one()
);
update_tag!(
    /// `lhs++`: add one, yield the pre-update value.
    PostIncrement, returns_original = true, |v| v + Vector::one()
);
update_tag!(
    /// `--lhs`: subtract one, yield the merged result.
    PreDecrement, returns_original = false, |v| v - Vector::one()
);
update_tag!(
    /// `lhs--`: subtract one, yield the pre-update value.
    PostDecrement, returns_original = true, |v| v - Vector::one()
);
