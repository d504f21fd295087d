//! The lane vector.
//!
//! `Vector<T>` holds `Vector::<T>::SIZE` lanes of `T` in one register of the
//! active backend. Arithmetic operators work lane-wise; comparisons produce a
//! [`Mask`]; the operator set is gated by the element category, so bitwise
//! operations on a float vector do not type-check.
//!
//! The lane count is a compile-time constant but varies per element and
//! backend; portable code iterates `0..Vector::<T>::SIZE` instead of assuming
//! a width.

use core::marker::PhantomData;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::backend::{
    Active, Backend, ConvertFrom, FloatLaneOps, IntLaneOps, LaneOps, MaskOps, SignedLaneOps,
    MAX_LANES,
};
use crate::element::{FloatElement, IntegerElement, LaneElement, SignedElement};
use crate::flags::LoadStoreFlag;
use crate::mask::Mask;
use crate::masked::WriteMasked;

/// The index vector type used with gather, scatter and permutation of a
/// `T` vector.
pub type IndexVector<T, B = Active> = Vector<<T as LaneElement>::Index, B>;

/// A SIMD vector of `T` lanes on backend `B`.
pub struct Vector<T: LaneElement, B: Backend = Active> {
    repr: B::Repr<T>,
    _backend: PhantomData<B>,
}

impl<T: LaneElement, B: Backend> Copy for Vector<T, B> {}
impl<T: LaneElement, B: Backend> Clone for Vector<T, B> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

// Linear congruential generator state shared by all `random()` calls in the
// process. Concurrent draws may observe the same state; the contract is
// per-lane validity, not distribution quality.
static RANDOM_STATE: AtomicU32 = AtomicU32::new(0x16d4_83a1);

// ============================================================================
// Core operations, available for every element
// ============================================================================

impl<T, B> Vector<T, B>
where
    T: LaneElement,
    B: Backend,
    B::Repr<T>: LaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    /// Number of lanes.
    pub const SIZE: usize = <B::Repr<T> as LaneOps<T>>::LANES;

    #[inline(always)]
    pub(crate) fn from_repr(repr: B::Repr<T>) -> Self {
        Vector {
            repr,
            _backend: PhantomData,
        }
    }

    #[inline(always)]
    pub(crate) fn repr(self) -> B::Repr<T> {
        self.repr
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// All lanes zero.
    #[inline(always)]
    pub fn zero() -> Self {
        Self::from_repr(<B::Repr<T>>::zero())
    }

    /// All lanes one.
    #[inline(always)]
    pub fn one() -> Self {
        Self::splat(T::ONE)
    }

    /// All lanes set to `value`.
    #[inline(always)]
    pub fn splat(value: T) -> Self {
        Self::from_repr(<B::Repr<T>>::splat(value))
    }

    /// All lanes set to `value` converted as by an `as` cast (out-of-range
    /// integers wrap).
    #[inline(always)]
    pub fn splat_int(value: i32) -> Self {
        Self::splat(T::from_int(value))
    }

    /// Lanes `0, 1, 2, ...` in ascending order.
    #[inline(always)]
    pub fn index_sequence() -> Self {
        Self::generate(|lane| T::from_int(lane as i32))
    }

    /// Builds a vector by calling `f` once per lane index, ascending.
    #[inline(always)]
    pub fn generate(mut f: impl FnMut(usize) -> T) -> Self {
        let mut repr = <B::Repr<T>>::zero();
        for lane in 0..Self::SIZE {
            repr = repr.insert(lane, f(lane));
        }
        Self::from_repr(repr)
    }

    /// Draws every lane from the shared linear congruential generator.
    ///
    /// Float lanes land in `[0, 1)`; integer lanes take the raw draw. The
    /// sequence is deterministic per process start but not otherwise
    /// specified, and concurrent callers may observe overlapping draws.
    pub fn random() -> Self {
        let mut state = RANDOM_STATE.load(Ordering::Relaxed);
        let v = Self::generate(|_| {
            state = state.wrapping_mul(0xdeec_e66d).wrapping_add(11);
            T::from_random_bits(state)
        });
        RANDOM_STATE.store(state, Ordering::Relaxed);
        v
    }

    // ------------------------------------------------------------------
    // Memory
    // ------------------------------------------------------------------

    /// Loads `SIZE` lanes from `ptr` under the given policy flag.
    ///
    /// # Safety
    /// `ptr` must point to `SIZE` readable elements; with an aligned policy
    /// it must additionally be aligned to the backend register width.
    #[inline(always)]
    pub unsafe fn load<F: LoadStoreFlag>(ptr: *const T, _flag: F) -> Self {
        if F::IS_STREAMING && F::IS_ALIGNED {
            Self::from_repr(unsafe { <B::Repr<T>>::load_streaming(ptr) })
        } else if F::IS_ALIGNED {
            Self::from_repr(unsafe { <B::Repr<T>>::load_aligned(ptr) })
        } else {
            Self::from_repr(unsafe { <B::Repr<T>>::load_unaligned(ptr) })
        }
    }

    /// Stores `SIZE` lanes to `ptr` under the given policy flag.
    ///
    /// # Safety
    /// `ptr` must point to `SIZE` writable elements; with an aligned policy
    /// it must additionally be aligned to the backend register width.
    #[inline(always)]
    pub unsafe fn store<F: LoadStoreFlag>(self, ptr: *mut T, _flag: F) {
        if F::IS_STREAMING && F::IS_ALIGNED {
            unsafe { self.repr.store_streaming(ptr) }
        } else if F::IS_ALIGNED {
            unsafe { self.repr.store_aligned(ptr) }
        } else {
            unsafe { self.repr.store_unaligned(ptr) }
        }
    }

    /// Loads from the front of `slice` without an alignment assumption.
    ///
    /// # Panics
    /// When `slice` has fewer than `SIZE` elements.
    #[inline(always)]
    pub fn from_slice(slice: &[T]) -> Self {
        assert!(slice.len() >= Self::SIZE);
        unsafe { Self::from_repr(<B::Repr<T>>::load_unaligned(slice.as_ptr())) }
    }

    /// Stores to the front of `slice` without an alignment assumption.
    ///
    /// # Panics
    /// When `slice` has fewer than `SIZE` elements.
    #[inline(always)]
    pub fn write_to_slice(self, slice: &mut [T]) {
        assert!(slice.len() >= Self::SIZE);
        unsafe { self.repr.store_unaligned(slice.as_mut_ptr()) }
    }

    /// Reads one lane.
    ///
    /// # Panics
    /// In debug builds, when `lane >= SIZE`.
    #[inline(always)]
    pub fn extract(self, lane: usize) -> T {
        self.repr.extract(lane)
    }

    /// Returns `self` with one lane replaced.
    ///
    /// # Panics
    /// In debug builds, when `lane >= SIZE`.
    #[inline(always)]
    pub fn insert(self, lane: usize, value: T) -> Self {
        Self::from_repr(self.repr.insert(lane, value))
    }

    // ------------------------------------------------------------------
    // Gather / scatter
    // ------------------------------------------------------------------

    /// Reads lane `i` from `base[indexes[i]]`.
    ///
    /// # Safety
    /// Every addressed element must be readable; indexes are not checked.
    #[inline(always)]
    pub unsafe fn gather(base: *const T, indexes: IndexVector<T, B>) -> Self
    where
        B::Repr<T::Index>: LaneOps<T::Index, Mask = B::MaskRepr<T::Index>>,
        B::MaskRepr<T::Index>: MaskOps,
    {
        Self::generate(|lane| unsafe {
            base.add(indexes.extract(lane).to_lane_index()).read()
        })
    }

    /// Bounds-checked gather from a slice.
    ///
    /// # Panics
    /// When any index is out of bounds.
    #[inline(always)]
    pub fn gather_checked(slice: &[T], indexes: IndexVector<T, B>) -> Self
    where
        B::Repr<T::Index>: LaneOps<T::Index, Mask = B::MaskRepr<T::Index>>,
        B::MaskRepr<T::Index>: MaskOps,
    {
        Self::generate(|lane| slice[indexes.extract(lane).to_lane_index()])
    }

    /// Writes lane `i` to `base[indexes[i]]`. With duplicate indexes the
    /// highest lane wins.
    ///
    /// # Safety
    /// Every addressed element must be writable; indexes are not checked.
    #[inline(always)]
    pub unsafe fn scatter(self, base: *mut T, indexes: IndexVector<T, B>)
    where
        B::Repr<T::Index>: LaneOps<T::Index, Mask = B::MaskRepr<T::Index>>,
        B::MaskRepr<T::Index>: MaskOps,
    {
        for lane in 0..Self::SIZE {
            unsafe {
                base.add(indexes.extract(lane).to_lane_index())
                    .write(self.extract(lane));
            }
        }
    }

    /// Bounds-checked scatter into a slice.
    ///
    /// # Panics
    /// When any index is out of bounds.
    #[inline(always)]
    pub fn scatter_checked(self, slice: &mut [T], indexes: IndexVector<T, B>)
    where
        B::Repr<T::Index>: LaneOps<T::Index, Mask = B::MaskRepr<T::Index>>,
        B::MaskRepr<T::Index>: MaskOps,
    {
        for lane in 0..Self::SIZE {
            slice[indexes.extract(lane).to_lane_index()] = self.extract(lane);
        }
    }

    // ------------------------------------------------------------------
    // Comparisons
    // ------------------------------------------------------------------

    /// Per-lane `==`.
    #[inline(always)]
    pub fn cmp_eq(self, rhs: Self) -> Mask<T, B> {
        Mask::from_repr(self.repr.cmp_eq(rhs.repr))
    }
    /// Per-lane `!=`.
    #[inline(always)]
    pub fn cmp_ne(self, rhs: Self) -> Mask<T, B> {
        Mask::from_repr(self.repr.cmp_ne(rhs.repr))
    }
    /// Per-lane `<`.
    #[inline(always)]
    pub fn cmp_lt(self, rhs: Self) -> Mask<T, B> {
        Mask::from_repr(self.repr.cmp_lt(rhs.repr))
    }
    /// Per-lane `<=`.
    #[inline(always)]
    pub fn cmp_le(self, rhs: Self) -> Mask<T, B> {
        Mask::from_repr(self.repr.cmp_le(rhs.repr))
    }
    /// Per-lane `>`.
    #[inline(always)]
    pub fn cmp_gt(self, rhs: Self) -> Mask<T, B> {
        Mask::from_repr(self.repr.cmp_gt(rhs.repr))
    }
    /// Per-lane `>=`.
    #[inline(always)]
    pub fn cmp_ge(self, rhs: Self) -> Mask<T, B> {
        Mask::from_repr(self.repr.cmp_ge(rhs.repr))
    }

    /// Per-lane test against zero, the reduction-friendly form of `!v`.
    #[inline(always)]
    pub fn is_zero(self) -> Mask<T, B> {
        self.cmp_eq(Self::zero())
    }

    // ------------------------------------------------------------------
    // Lane-wise arithmetic beyond the operators
    // ------------------------------------------------------------------

    /// Lane-wise minimum.
    #[inline(always)]
    pub fn min(self, rhs: Self) -> Self {
        Self::from_repr(self.repr.min(rhs.repr))
    }

    /// Lane-wise maximum.
    #[inline(always)]
    pub fn max(self, rhs: Self) -> Self {
        Self::from_repr(self.repr.max(rhs.repr))
    }

    /// `self * mul + add`, fused into one rounding when the build carries
    /// the FMA extension.
    #[inline(always)]
    pub fn fused_multiply_add(self, mul: Self, add: Self) -> Self {
        Self::from_repr(self.repr.fused_multiply_add(mul.repr, add.repr))
    }

    /// `if_true` where the mask is set, `self` elsewhere.
    #[inline(always)]
    pub fn blend(self, mask: Mask<T, B>, if_true: Self) -> Self {
        Self::from_repr(<B::Repr<T>>::blend(mask.repr(), if_true.repr, self.repr))
    }

    /// Adds one to every lane.
    #[inline(always)]
    pub fn increment(&mut self) {
        self.repr = self.repr.add(<B::Repr<T>>::splat(T::ONE));
    }

    /// Subtracts one from every lane.
    #[inline(always)]
    pub fn decrement(&mut self) {
        self.repr = self.repr.sub(<B::Repr<T>>::splat(T::ONE));
    }

    /// Zeroes every lane.
    #[inline(always)]
    pub fn set_zero(&mut self) {
        *self = Self::zero();
    }

    /// Zeroes the lanes where the mask is set.
    #[inline(always)]
    pub fn set_zero_where(&mut self, mask: Mask<T, B>) {
        *self = self.blend(mask, Self::zero());
    }

    /// Zeroes the lanes where the mask is clear.
    #[inline(always)]
    pub fn set_zero_where_inverted(&mut self, mask: Mask<T, B>) {
        self.set_zero_where(!mask);
    }

    // ------------------------------------------------------------------
    // Masked write
    // ------------------------------------------------------------------

    /// Restricts the next write to the lanes the mask selects:
    /// `v.masked(m).assign(w)`, or bind the proxy and use a compound
    /// operator. Lanes outside the mask are untouched.
    #[inline(always)]
    pub fn masked(&mut self, mask: Mask<T, B>) -> WriteMasked<'_, T, B> {
        WriteMasked::new(self, mask)
    }

    // ------------------------------------------------------------------
    // Reductions
    // ------------------------------------------------------------------

    /// Sum of all lanes.
    #[inline(always)]
    pub fn sum(self) -> T {
        let mut acc = self.extract(0);
        for lane in 1..Self::SIZE {
            acc = acc.lane_add(self.extract(lane));
        }
        acc
    }

    /// Product of all lanes.
    #[inline(always)]
    pub fn product(self) -> T {
        let mut acc = self.extract(0);
        for lane in 1..Self::SIZE {
            acc = acc.lane_mul(self.extract(lane));
        }
        acc
    }

    /// Smallest lane.
    #[inline(always)]
    pub fn min_element(self) -> T {
        let mut acc = self.extract(0);
        for lane in 1..Self::SIZE {
            acc = acc.lane_min(self.extract(lane));
        }
        acc
    }

    /// Largest lane.
    #[inline(always)]
    pub fn max_element(self) -> T {
        let mut acc = self.extract(0);
        for lane in 1..Self::SIZE {
            acc = acc.lane_max(self.extract(lane));
        }
        acc
    }

    /// Sum of the masked lanes; zero on an empty mask.
    #[inline(always)]
    pub fn sum_where(self, mask: Mask<T, B>) -> T {
        let mut acc = T::ZERO;
        for lane in mask.set_lanes() {
            acc = acc.lane_add(self.extract(lane));
        }
        acc
    }

    /// Product of the masked lanes; one on an empty mask.
    #[inline(always)]
    pub fn product_where(self, mask: Mask<T, B>) -> T {
        let mut acc = T::ONE;
        for lane in mask.set_lanes() {
            acc = acc.lane_mul(self.extract(lane));
        }
        acc
    }

    /// Smallest masked lane; the element's greatest value on an empty mask.
    #[inline(always)]
    pub fn min_where(self, mask: Mask<T, B>) -> T {
        let mut acc = T::GREATEST;
        for lane in mask.set_lanes() {
            acc = acc.lane_min(self.extract(lane));
        }
        acc
    }

    /// Largest masked lane; the element's least value on an empty mask.
    #[inline(always)]
    pub fn max_where(self, mask: Mask<T, B>) -> T {
        let mut acc = T::LEAST;
        for lane in mask.set_lanes() {
            acc = acc.lane_max(self.extract(lane));
        }
        acc
    }

    /// Inclusive prefix sum: lane `i` becomes the sum of lanes `0..=i`.
    #[inline(always)]
    pub fn partial_sum(self) -> Self {
        let mut acc = T::ZERO;
        self.apply(|v| {
            acc = acc.lane_add(v);
            acc
        })
    }

    // ------------------------------------------------------------------
    // Per-lane protocol
    // ------------------------------------------------------------------

    /// Calls `f` with every lane value, ascending.
    #[inline(always)]
    pub fn call(self, mut f: impl FnMut(T)) {
        for lane in 0..Self::SIZE {
            f(self.extract(lane));
        }
    }

    /// Calls `f` with the masked lane values, ascending.
    #[inline(always)]
    pub fn call_where(self, mask: Mask<T, B>, mut f: impl FnMut(T)) {
        for lane in mask.set_lanes() {
            f(self.extract(lane));
        }
    }

    /// Calls `f` once per distinct lane value, in ascending value order.
    ///
    /// Duplicated values reach `f` a single time, so `[3, 1, 3, 2]` produces
    /// the calls `f(1)`, `f(2)`, `f(3)`.
    pub fn call_with_values_sorted(self, mut f: impl FnMut(T)) {
        let buf = self.sorted_lanes();
        let mut previous = None;
        for &v in buf.iter().take(Self::SIZE) {
            if previous != Some(v) {
                f(v);
                previous = Some(v);
            }
        }
    }

    /// Maps every lane through `f`.
    #[inline(always)]
    pub fn apply(self, mut f: impl FnMut(T) -> T) -> Self {
        Self::generate(|lane| f(self.extract(lane)))
    }

    /// Maps the masked lanes through `f`; the rest pass through unchanged.
    #[inline(always)]
    pub fn apply_where(self, mask: Mask<T, B>, mut f: impl FnMut(T) -> T) -> Self {
        let mut repr = self.repr;
        for lane in mask.set_lanes() {
            repr = repr.insert(lane, f(self.extract(lane)));
        }
        Self::from_repr(repr)
    }

    /// Overwrites every lane with successive calls of `f`, ascending.
    #[inline(always)]
    pub fn fill(&mut self, mut f: impl FnMut() -> T) {
        *self = Self::generate(|_| f());
    }

    // ------------------------------------------------------------------
    // Permutations
    // ------------------------------------------------------------------

    /// Lanes in reverse order.
    #[inline(always)]
    pub fn reversed(self) -> Self {
        Self::generate(|lane| self.extract(Self::SIZE - 1 - lane))
    }

    /// Rotates lanes downward: lane `i` takes the value of lane
    /// `(i + amount) mod SIZE`.
    #[inline(always)]
    pub fn rotated(self, amount: i32) -> Self {
        let size = Self::SIZE as i32;
        Self::generate(|lane| {
            let src = (lane as i32 + amount).rem_euclid(size);
            self.extract(src as usize)
        })
    }

    /// Shifts lanes downward by `amount` (upward when negative); vacated
    /// lanes are zero.
    #[inline(always)]
    pub fn shifted(self, amount: i32) -> Self {
        self.shifted_with(amount, Self::zero())
    }

    /// Like [`shifted`](Self::shifted), with vacated lanes taken from the
    /// corresponding lanes of `fill`.
    #[inline(always)]
    pub fn shifted_with(self, amount: i32, fill: Self) -> Self {
        let size = Self::SIZE as i32;
        Self::generate(|lane| {
            let src = lane as i32 + amount;
            if (0..size).contains(&src) {
                self.extract(src as usize)
            } else {
                fill.extract(src.rem_euclid(size) as usize)
            }
        })
    }

    /// Lanes sorted ascending. NaN lanes sort to an unspecified position.
    #[inline(always)]
    pub fn sorted(self) -> Self {
        let buf = self.sorted_lanes();
        Self::generate(|lane| buf[lane])
    }

    /// Interleaves the low halves: `[a0, b0, a1, b1, ...]`.
    #[inline(always)]
    pub fn interleave_low(self, other: Self) -> Self {
        Self::generate(|lane| {
            let src = lane / 2;
            if lane % 2 == 0 {
                self.extract(src)
            } else {
                other.extract(src)
            }
        })
    }

    /// Interleaves the high halves: `[a_mid, b_mid, ...]`.
    #[inline(always)]
    pub fn interleave_high(self, other: Self) -> Self {
        let base = Self::SIZE / 2;
        Self::generate(|lane| {
            let src = base + lane / 2;
            if lane % 2 == 0 {
                self.extract(src)
            } else {
                other.extract(src)
            }
        })
    }

    /// Arbitrary lane permutation: lane `i` takes the value of lane
    /// `indexes[i] mod SIZE` (out-of-range indexes wrap).
    #[inline(always)]
    pub fn permuted(self, indexes: IndexVector<T, B>) -> Self
    where
        B::Repr<T::Index>: LaneOps<T::Index, Mask = B::MaskRepr<T::Index>>,
        B::MaskRepr<T::Index>: MaskOps,
    {
        Self::generate(|lane| {
            self.extract(indexes.extract(lane).to_lane_index() % Self::SIZE)
        })
    }

    // Insertion sort into a fixed buffer; unordered lanes (NaN) stay where
    // the comparison leaves them.
    fn sorted_lanes(self) -> [T; MAX_LANES] {
        let mut buf = [T::ZERO; MAX_LANES];
        for lane in 0..Self::SIZE {
            buf[lane] = self.extract(lane);
        }
        for i in 1..Self::SIZE {
            let mut j = i;
            while j > 0 && buf[j - 1] > buf[j] {
                buf.swap(j - 1, j);
                j -= 1;
            }
        }
        buf
    }
}

// ============================================================================
// Float-only operations
// ============================================================================

impl<T, B> Vector<T, B>
where
    T: FloatElement,
    B: Backend,
    B::Repr<T>: FloatLaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    /// Lane-wise square root.
    #[inline(always)]
    pub fn sqrt(self) -> Self {
        Self::from_repr(self.repr.sqrt())
    }

    /// `1 / x` per lane; approximate for `f32` where the ISA has a
    /// reciprocal instruction.
    #[inline(always)]
    pub fn reciprocal(self) -> Self {
        Self::from_repr(self.repr.reciprocal())
    }

    /// `1 / sqrt(x)` per lane, with the same approximation note as
    /// [`reciprocal`](Self::reciprocal).
    #[inline(always)]
    pub fn rsqrt(self) -> Self {
        Self::from_repr(self.repr.rsqrt())
    }

    /// Rounds to nearest, ties to even.
    #[inline(always)]
    pub fn round(self) -> Self {
        Self::from_repr(self.repr.round())
    }

    /// Rounds toward negative infinity.
    #[inline(always)]
    pub fn floor(self) -> Self {
        Self::from_repr(self.repr.floor())
    }

    /// Rounds toward positive infinity.
    #[inline(always)]
    pub fn ceil(self) -> Self {
        Self::from_repr(self.repr.ceil())
    }

    /// Rounds toward zero.
    #[inline(always)]
    pub fn trunc(self) -> Self {
        Self::from_repr(self.repr.trunc())
    }

    /// Per-lane NaN test.
    #[inline(always)]
    pub fn is_nan(self) -> Mask<T, B> {
        Mask::from_repr(self.repr.is_nan())
    }

    /// Per-lane finiteness test (neither NaN nor infinite).
    #[inline(always)]
    pub fn is_finite(self) -> Mask<T, B> {
        Mask::from_repr(self.repr.is_finite())
    }

    /// Magnitude of `self`, sign of `sign`, per lane.
    #[inline(always)]
    pub fn copy_sign(self, sign: Self) -> Self {
        Self::from_repr(self.repr.copy_sign(sign.repr))
    }

    /// Sets every lane to a quiet NaN.
    #[inline(always)]
    pub fn set_qnan(&mut self) {
        *self = Self::splat(T::QNAN);
    }

    /// Sets the masked lanes to a quiet NaN.
    #[inline(always)]
    pub fn set_qnan_where(&mut self, mask: Mask<T, B>) {
        *self = self.blend(mask, Self::splat(T::QNAN));
    }
}

// ============================================================================
// Signed-only operations
// ============================================================================

impl<T, B> Vector<T, B>
where
    T: SignedElement,
    B: Backend,
    B::Repr<T>: SignedLaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    /// Lane-wise absolute value (wrapping for integers).
    #[inline(always)]
    pub fn abs(self) -> Self {
        Self::from_repr(SignedLaneOps::abs(self.repr))
    }

    /// Per-lane sign-bit test; for floats this includes `-0.0` and negative
    /// NaNs.
    #[inline(always)]
    pub fn is_negative(self) -> Mask<T, B> {
        Mask::from_repr(self.repr.is_negative())
    }
}

// ============================================================================
// Integer-only operations
// ============================================================================

impl<T, B> Vector<T, B>
where
    T: IntegerElement,
    B: Backend,
    B::Repr<T>: IntLaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    /// Shifts every lane left by the count in the matching lane of `counts`.
    #[inline(always)]
    pub fn shl_lanes(self, counts: Self) -> Self {
        Self::from_repr(self.repr.shl_lanes(counts.repr))
    }

    /// Shifts every lane right by the count in the matching lane of
    /// `counts`; logical for unsigned elements, arithmetic for signed.
    #[inline(always)]
    pub fn shr_lanes(self, counts: Self) -> Self {
        Self::from_repr(self.repr.shr_lanes(counts.repr))
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl<T, B> Vector<T, B>
where
    T: LaneElement,
    B: Backend,
    B::Repr<T>: LaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    /// Explicit element conversion. Float to int truncates toward zero;
    /// int to float rounds to nearest; same-width signed/unsigned converts
    /// modulo 2^n; across lane counts the low lanes convert and the rest
    /// are zero.
    #[inline(always)]
    pub fn convert_from<S: LaneElement>(src: Vector<S, B>) -> Self
    where
        B::Repr<S>: LaneOps<S, Mask = B::MaskRepr<S>>,
        B::MaskRepr<S>: MaskOps,
        B::Repr<T>: ConvertFrom<B::Repr<S>>,
    {
        Self::from_repr(<B::Repr<T>>::convert_from(src.repr()))
    }
}

macro_rules! implicit_vector_from {
    ($src:ty => $dst:ty) => {
        impl<B> From<Vector<$src, B>> for Vector<$dst, B>
        where
            B: Backend,
            B::Repr<$src>: LaneOps<$src, Mask = B::MaskRepr<$src>>,
            B::MaskRepr<$src>: MaskOps,
            B::Repr<$dst>: LaneOps<$dst, Mask = B::MaskRepr<$dst>>,
            B::MaskRepr<$dst>: MaskOps,
            B::Repr<$dst>: ConvertFrom<B::Repr<$src>>,
        {
            /// Implicit same-width conversion, modulo 2^n.
            #[inline(always)]
            fn from(src: Vector<$src, B>) -> Self {
                Self::convert_from(src)
            }
        }
    };
}

implicit_vector_from!(i32 => u32);
implicit_vector_from!(u32 => i32);
implicit_vector_from!(i16 => u16);
implicit_vector_from!(u16 => i16);

// ============================================================================
// Operators
// ============================================================================

macro_rules! vector_binop {
    ($trait:ident, $method:ident, $op:ident, $assign_trait:ident, $assign_method:ident,
     bound = $bound:ident, elem = $elem_bound:ident) => {
        impl<T, B> core::ops::$trait for Vector<T, B>
        where
            T: $elem_bound,
            B: Backend,
            B::Repr<T>: $bound<T, Mask = B::MaskRepr<T>>,
            B::MaskRepr<T>: MaskOps,
        {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                Self::from_repr($bound::$op(self.repr, rhs.repr))
            }
        }

        impl<T, B> core::ops::$assign_trait for Vector<T, B>
        where
            T: $elem_bound,
            B: Backend,
            B::Repr<T>: $bound<T, Mask = B::MaskRepr<T>>,
            B::MaskRepr<T>: MaskOps,
        {
            #[inline(always)]
            fn $assign_method(&mut self, rhs: Self) {
                self.repr = $bound::$op(self.repr, rhs.repr);
            }
        }
    };
}

vector_binop!(Add, add, add, AddAssign, add_assign, bound = LaneOps, elem = LaneElement);
vector_binop!(Sub, sub, sub, SubAssign, sub_assign, bound = LaneOps, elem = LaneElement);
vector_binop!(Mul, mul, mul, MulAssign, mul_assign, bound = LaneOps, elem = LaneElement);
vector_binop!(Div, div, div, DivAssign, div_assign, bound = LaneOps, elem = LaneElement);
vector_binop!(Rem, rem, rem, RemAssign, rem_assign, bound = IntLaneOps, elem = IntegerElement);
vector_binop!(BitAnd, bitand, and, BitAndAssign, bitand_assign, bound = IntLaneOps, elem = IntegerElement);
vector_binop!(BitOr, bitor, or, BitOrAssign, bitor_assign, bound = IntLaneOps, elem = IntegerElement);
vector_binop!(BitXor, bitxor, xor, BitXorAssign, bitxor_assign, bound = IntLaneOps, elem = IntegerElement);

impl<T, B> core::ops::Shl<u32> for Vector<T, B>
where
    T: IntegerElement,
    B: Backend,
    B::Repr<T>: IntLaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    type Output = Self;

    #[inline(always)]
    fn shl(self, count: u32) -> Self {
        Self::from_repr(self.repr.shl_imm(count))
    }
}

impl<T, B> core::ops::Shr<u32> for Vector<T, B>
where
    T: IntegerElement,
    B: Backend,
    B::Repr<T>: IntLaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    type Output = Self;

    #[inline(always)]
    fn shr(self, count: u32) -> Self {
        Self::from_repr(self.repr.shr_imm(count))
    }
}

impl<T, B> core::ops::Shl for Vector<T, B>
where
    T: IntegerElement,
    B: Backend,
    B::Repr<T>: IntLaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    type Output = Self;

    /// Per-lane shift counts.
    #[inline(always)]
    fn shl(self, counts: Self) -> Self {
        self.shl_lanes(counts)
    }
}

impl<T, B> core::ops::Shr for Vector<T, B>
where
    T: IntegerElement,
    B: Backend,
    B::Repr<T>: IntLaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    type Output = Self;

    /// Per-lane shift counts.
    #[inline(always)]
    fn shr(self, counts: Self) -> Self {
        self.shr_lanes(counts)
    }
}

impl<T, B> core::ops::ShlAssign<u32> for Vector<T, B>
where
    T: IntegerElement,
    B: Backend,
    B::Repr<T>: IntLaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    #[inline(always)]
    fn shl_assign(&mut self, count: u32) {
        self.repr = self.repr.shl_imm(count);
    }
}

impl<T, B> core::ops::ShrAssign<u32> for Vector<T, B>
where
    T: IntegerElement,
    B: Backend,
    B::Repr<T>: IntLaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    #[inline(always)]
    fn shr_assign(&mut self, count: u32) {
        self.repr = self.repr.shr_imm(count);
    }
}

impl<T, B> core::ops::Not for Vector<T, B>
where
    T: IntegerElement,
    B: Backend,
    B::Repr<T>: IntLaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        Self::from_repr(IntLaneOps::not(self.repr))
    }
}

impl<T, B> core::ops::Neg for Vector<T, B>
where
    T: SignedElement,
    B: Backend,
    B::Repr<T>: SignedLaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        Self::from_repr(self.repr.neg())
    }
}

// ============================================================================
// Trait plumbing
// ============================================================================

impl<T, B> Default for Vector<T, B>
where
    T: LaneElement,
    B: Backend,
    B::Repr<T>: LaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    #[inline(always)]
    fn default() -> Self {
        Self::zero()
    }
}

impl<T, B> PartialEq for Vector<T, B>
where
    T: LaneElement,
    B: Backend,
    B::Repr<T>: LaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    /// All lanes equal. NaN lanes compare unequal, as in the scalar world.
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.cmp_eq(*other).is_full()
    }
}

impl<T, B> core::fmt::Debug for Vector<T, B>
where
    T: LaneElement,
    B: Backend,
    B::Repr<T>: LaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Vector[")?;
        for lane in 0..Self::SIZE {
            if lane != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", self.extract(lane))?;
        }
        write!(f, "]")
    }
}

// ============================================================================
// Free functions
// ============================================================================

/// Lane-wise minimum.
#[inline(always)]
pub fn min<T, B>(a: Vector<T, B>, b: Vector<T, B>) -> Vector<T, B>
where
    T: LaneElement,
    B: Backend,
    B::Repr<T>: LaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    a.min(b)
}

/// Lane-wise maximum.
#[inline(always)]
pub fn max<T, B>(a: Vector<T, B>, b: Vector<T, B>) -> Vector<T, B>
where
    T: LaneElement,
    B: Backend,
    B::Repr<T>: LaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    a.max(b)
}

/// Lane-wise absolute value.
#[inline(always)]
pub fn abs<T, B>(v: Vector<T, B>) -> Vector<T, B>
where
    T: SignedElement,
    B: Backend,
    B::Repr<T>: SignedLaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    v.abs()
}

macro_rules! float_free_fn {
    ($(#[$doc:meta])* $name:ident -> Self) => {
        $(#[$doc])*
        #[inline(always)]
        pub fn $name<T, B>(v: Vector<T, B>) -> Vector<T, B>
        where
            T: FloatElement,
            B: Backend,
            B::Repr<T>: FloatLaneOps<T, Mask = B::MaskRepr<T>>,
            B::MaskRepr<T>: MaskOps,
        {
            v.$name()
        }
    };
    ($(#[$doc:meta])* $name:ident -> Mask) => {
        $(#[$doc])*
        #[inline(always)]
        pub fn $name<T, B>(v: Vector<T, B>) -> Mask<T, B>
        where
            T: FloatElement,
            B: Backend,
            B::Repr<T>: FloatLaneOps<T, Mask = B::MaskRepr<T>>,
            B::MaskRepr<T>: MaskOps,
        {
            v.$name()
        }
    };
}

float_free_fn!(
    /// Lane-wise square root.
    sqrt -> Self
);
float_free_fn!(
    /// Lane-wise `1 / x`; approximate for `f32` on hardware with a
    /// reciprocal instruction.
    reciprocal -> Self
);
float_free_fn!(
    /// Lane-wise `1 / sqrt(x)`.
    rsqrt -> Self
);
float_free_fn!(
    /// Lane-wise round to nearest, ties to even.
    round -> Self
);
float_free_fn!(
    /// Per-lane NaN test.
    is_nan -> Mask
);
float_free_fn!(
    /// Per-lane finiteness test.
    is_finite -> Mask
);

/// Lane-wise magnitude of `v` with the sign of `sign`.
#[inline(always)]
pub fn copy_sign<T, B>(v: Vector<T, B>, sign: Vector<T, B>) -> Vector<T, B>
where
    T: FloatElement,
    B: Backend,
    B::Repr<T>: FloatLaneOps<T, Mask = B::MaskRepr<T>>,
    B::MaskRepr<T>: MaskOps,
{
    v.copy_sign(sign)
}
