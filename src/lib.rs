//! Portable, statically dispatched SIMD lane vectors.
//!
//! A [`Vector<T>`] holds a fixed number of `T` lanes in one hardware
//! register; arithmetic works lane-wise, comparisons produce a [`Mask`], and
//! masked writes go through [`Vector::masked`] or the tag-dispatched
//! [`conditional_assign`]. The instruction-set tier is resolved once at build
//! time (`build.rs`, overridable via `LANEWISE_IMPL`), so there is no runtime
//! dispatch anywhere on the value path.
//!
//! The lane count depends on the element type and the resolved tier;
//! portable code iterates `0..Vector::<T>::SIZE` rather than assuming a
//! width.
//!
//! ```ignore
//! use lanewise::Vector;
//!
//! let x = Vector::<f32>::index_sequence();
//! let clipped = x.min(Vector::splat(2.0));
//! let sum = clipped.sum();
//! ```

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod assign;
pub mod backend;
pub mod element;
pub mod flags;
pub mod implementation;
pub mod mask;
pub mod masked;
pub mod vector;

pub use assign::{
    conditional_assign, conditional_update, AndAssign, Assign, AssignOperator, DivideAssign,
    LeftShiftAssign, MinusAssign, MultiplyAssign, OrAssign, PlusAssign, PostDecrement,
    PostIncrement, PreDecrement, PreIncrement, RemainderAssign, RightShiftAssign,
    UpdateOperator, XorAssign,
};
pub use element::{
    FloatElement, ImplicitFrom, IntegerElement, LaneElement, SignedElement,
};
pub use flags::{
    Aligned, LoadStoreFlag, Streaming, StreamingAligned, StreamingUnaligned, Unaligned,
};
pub use implementation::{
    log_selected, ExtraInstructions, Implementation, CURRENT, EXTRA, VEX_ENCODING,
};
pub use mask::{Mask, SetLanes};
pub use masked::WriteMasked;
pub use vector::{
    abs, copy_sign, is_finite, is_nan, max, min, reciprocal, round, rsqrt, sqrt, IndexVector,
    Vector,
};
