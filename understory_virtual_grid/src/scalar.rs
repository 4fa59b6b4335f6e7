// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar abstraction for row heights, offsets, and scroll positions.

use core::fmt::Debug;
use core::ops::{Add, Div, Mul, Sub};

/// A floating-point length type used for heights, offsets, and scroll positions.
///
/// Implemented for `f32` and `f64`. Values are expected to be finite; negative
/// lengths are clamped to zero wherever they enter the crate.
pub trait Scalar:
    Copy
    + PartialOrd
    + Debug
    + Default
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    /// The additive identity.
    fn zero() -> Self;

    /// Converts a count (rows, columns) into this scalar type.
    fn from_usize(n: usize) -> Self;

    /// Larger of `self` and `other`.
    #[must_use]
    fn max(self, other: Self) -> Self;

    /// Smaller of `self` and `other`.
    #[must_use]
    fn min(self, other: Self) -> Self;

    /// Returns `true` if the value is neither infinite nor NaN.
    fn is_finite(self) -> bool;

    /// Returns `true` if the sign bit is set (including `-0.0`).
    fn is_sign_negative(self) -> bool;

    /// Clamps negative values to zero, leaving everything else untouched.
    #[must_use]
    fn non_negative(self) -> Self {
        if self.is_sign_negative() {
            Self::zero()
        } else {
            self
        }
    }
}

macro_rules! impl_scalar {
    ($ty:ty) => {
        impl Scalar for $ty {
            #[inline(always)]
            fn zero() -> Self {
                0.0
            }

            #[allow(
                clippy::cast_precision_loss,
                reason = "Row and column counts stay far below the mantissa limit"
            )]
            #[inline]
            fn from_usize(n: usize) -> Self {
                n as Self
            }

            #[inline]
            fn max(self, other: Self) -> Self {
                <$ty>::max(self, other)
            }

            #[inline]
            fn min(self, other: Self) -> Self {
                <$ty>::min(self, other)
            }

            #[inline]
            fn is_finite(self) -> bool {
                <$ty>::is_finite(self)
            }

            #[inline]
            fn is_sign_negative(self) -> bool {
                <$ty>::is_sign_negative(self)
            }
        }
    };
}

impl_scalar!(f32);
impl_scalar!(f64);
