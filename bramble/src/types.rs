// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types: rectangles, scalars, and host items.

use core::cmp::Ordering;
use core::fmt::Debug;

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in 2D.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Aabb2D<T> {
    /// Minimum x (left)
    pub min_x: T,
    /// Minimum y (top)
    pub min_y: T,
    /// Maximum x (right)
    pub max_x: T,
    /// Maximum y (bottom)
    pub max_y: T,
}

impl<T> Aabb2D<T> {
    /// Create a new AABB from min/max corners.
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Copy + PartialOrd> Aabb2D<T> {
    /// Whether the two AABBs overlap. Shared edges and corners count.
    pub fn intersects(&self, other: &Self) -> bool {
        le(other.min_x, self.max_x)
            && le(other.min_y, self.max_y)
            && le(self.min_x, other.max_x)
            && le(self.min_y, other.max_y)
    }

    /// Whether this AABB fully contains `other` (inclusive).
    pub fn contains(&self, other: &Self) -> bool {
        le(self.min_x, other.min_x)
            && le(self.min_y, other.min_y)
            && le(other.max_x, self.max_x)
            && le(other.max_y, self.max_y)
    }

    /// Grow this AABB in place so that it covers `other`.
    ///
    /// Extending the [empty](Aabb2D::empty) AABB yields `other` unchanged.
    pub fn extend(&mut self, other: &Self) {
        self.min_x = min_t(self.min_x, other.min_x);
        self.min_y = min_t(self.min_y, other.min_y);
        self.max_x = max_t(self.max_x, other.max_x);
        self.max_y = max_t(self.max_y, other.max_y);
    }

    /// Return true if the AABB is inverted (covers nothing). Assumes no NaN.
    pub fn is_empty(&self) -> bool {
        lt(self.max_x, self.min_x) || lt(self.max_y, self.min_y)
    }
}

impl<T: Scalar> Aabb2D<T> {
    /// The identity element for [`extend`](Aabb2D::extend): an inverted AABB
    /// that any union with a real AABB replaces outright.
    pub fn empty() -> Self {
        Self {
            min_x: T::max_value(),
            min_y: T::max_value(),
            max_x: T::min_value(),
            max_y: T::min_value(),
        }
    }
}

impl Aabb2D<f32> {
    /// Create an AABB from origin and size in f32.
    pub const fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }
}

impl Aabb2D<f64> {
    /// Create an AABB from origin and size in f64.
    pub const fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }
}

impl Aabb2D<i64> {
    /// Create an AABB from origin and size in i64.
    pub const fn from_xywh(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }
}

/// A stored item: a bounding box with an opaque payload.
///
/// The payload is never interpreted by the tree. It is stored, returned from
/// queries, and compared (via `PartialEq` or a caller-supplied predicate)
/// during removal. Payloads should be cheap to clone — an id, a small enum,
/// or an `Arc` handle; bulk loading clones them into packed leaves.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item<T, P> {
    /// Minimum x of the bounding box.
    #[serde(rename = "minX")]
    pub min_x: T,
    /// Minimum y of the bounding box.
    #[serde(rename = "minY")]
    pub min_y: T,
    /// Maximum x of the bounding box.
    #[serde(rename = "maxX")]
    pub max_x: T,
    /// Maximum y of the bounding box.
    #[serde(rename = "maxY")]
    pub max_y: T,
    /// Caller-owned payload, stored verbatim.
    pub payload: P,
}

impl<T, P> Item<T, P> {
    /// Create an item from its bounding coordinates and payload.
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T, payload: P) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
            payload,
        }
    }
}

impl<T: Copy, P> Item<T, P> {
    /// The item's bounding box.
    pub fn bbox(&self) -> Aabb2D<T> {
        Aabb2D::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// Numeric scalar abstraction for 2D AABBs.
///
/// This trait provides the minimal set of operations required by the
/// insertion and split heuristics, and an associated widened accumulator
/// type for area and margin metrics (e.g., f32→f64, i64→i128).
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Widened accumulator type suitable for area/margin computations.
    type Acc: Copy
        + PartialOrd
        + core::ops::Add<Output = Self::Acc>
        + core::ops::Sub<Output = Self::Acc>
        + core::ops::Mul<Output = Self::Acc>
        + Debug;

    /// Subtract two scalar values: a - b.
    fn sub(a: Self, b: Self) -> Self;

    /// Max of the scalar value and zero.
    fn max_zero(v: Self) -> Self;

    /// Convert a scalar to the accumulator type.
    fn widen(v: Self) -> Self::Acc;

    /// Smallest representable value (negative infinity for floats).
    fn min_value() -> Self;

    /// Largest representable value (positive infinity for floats).
    fn max_value() -> Self;
}

impl Scalar for f32 {
    type Acc = f64;

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0.0)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as f64
    }

    #[inline]
    fn min_value() -> Self {
        Self::NEG_INFINITY
    }

    #[inline]
    fn max_value() -> Self {
        Self::INFINITY
    }
}

impl Scalar for f64 {
    type Acc = Self;

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0.0)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v
    }

    #[inline]
    fn min_value() -> Self {
        Self::NEG_INFINITY
    }

    #[inline]
    fn max_value() -> Self {
        Self::INFINITY
    }
}

impl Scalar for i64 {
    type Acc = i128;

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a.saturating_sub(b)
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as i128
    }

    #[inline]
    fn min_value() -> Self {
        Self::MIN
    }

    #[inline]
    fn max_value() -> Self {
        Self::MAX
    }
}

/// Compute the area of an AABB using the scalar's widened accumulator type.
#[inline]
pub fn area<T: Scalar>(a: &Aabb2D<T>) -> T::Acc {
    let w = T::max_zero(T::sub(a.max_x, a.min_x));
    let h = T::max_zero(T::sub(a.max_y, a.min_y));
    T::widen(w) * T::widen(h)
}

/// Semi-perimeter of an AABB, in the widened accumulator type.
#[inline]
pub(crate) fn margin<T: Scalar>(a: &Aabb2D<T>) -> T::Acc {
    let w = T::max_zero(T::sub(a.max_x, a.min_x));
    let h = T::max_zero(T::sub(a.max_y, a.min_y));
    T::widen(w) + T::widen(h)
}

/// Area of the union of two AABBs.
#[inline]
pub(crate) fn enlarged_area<T: Scalar>(a: &Aabb2D<T>, b: &Aabb2D<T>) -> T::Acc {
    area(&union_aabb(*a, *b))
}

/// Area of the overlap of two AABBs; zero if they are disjoint.
#[inline]
pub(crate) fn intersection_area<T: Scalar>(a: &Aabb2D<T>, b: &Aabb2D<T>) -> T::Acc {
    let min_x = max_t(a.min_x, b.min_x);
    let min_y = max_t(a.min_y, b.min_y);
    let max_x = min_t(a.max_x, b.max_x);
    let max_y = min_t(a.max_y, b.max_y);
    let w = T::max_zero(T::sub(max_x, min_x));
    let h = T::max_zero(T::sub(max_y, min_y));
    T::widen(w) * T::widen(h)
}

pub(crate) fn union_aabb<T: PartialOrd + Copy>(a: Aabb2D<T>, b: Aabb2D<T>) -> Aabb2D<T> {
    Aabb2D {
        min_x: min_t(a.min_x, b.min_x),
        min_y: min_t(a.min_y, b.min_y),
        max_x: max_t(a.max_x, b.max_x),
        max_y: max_t(a.max_y, b.max_y),
    }
}

/// Total order over partially ordered values; incomparable pairs compare equal.
#[inline]
pub(crate) fn cmp_t<T: PartialOrd>(a: T, b: T) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

pub(crate) fn lt<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Less)
        .unwrap_or(false)
}
