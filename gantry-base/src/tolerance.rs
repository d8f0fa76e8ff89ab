use cgmath::prelude::*;
use cgmath::AbsDiffEq;
use std::fmt::Debug;

/// point and parameter equality tolerance
pub const TOLERANCE: f64 = 1.0e-8;

/// default minimum resolution of a model
pub const RES_MIN: f64 = 1.0e-6;

/// radial tolerance for degenerate-arc detection and circle classification
pub const RADIAL_TOLERANCE: f64 = 1.0e-3;

/// Tolerance-based equality over scalars, points, and vectors.
pub trait Tolerance: AbsDiffEq<Epsilon = f64> + Debug {
    /// The componentwise distance to `other` stays under [`TOLERANCE`].
    fn near(&self, other: &Self) -> bool { self.abs_diff_eq(other, TOLERANCE) }
}

impl<T: AbsDiffEq<Epsilon = f64> + Debug> Tolerance for T {}

/// Near-origin test for any value with a zero.
pub trait Origin: Tolerance + Zero {
    /// The value collapses to the origin within [`TOLERANCE`].
    #[inline(always)]
    fn so_small(&self) -> bool { self.near(&Self::zero()) }
}

impl<T: Tolerance + Zero> Origin for T {}

/// Asserts that `left.near(&right)` (using `Tolerance`). An optional
/// trailing format message is appended to the failure report; the plain
/// form delegates to the message form.
#[macro_export]
macro_rules! assert_near {
    ($left: expr, $right: expr $(,)?) => {
        $crate::assert_near!($left, $right, "")
    };
    ($left: expr, $right: expr, $($arg: tt)+) => {{
        let (left, right) = ($left, $right);
        assert!(
            $crate::tolerance::Tolerance::near(&left, &right),
            "assertion failed: `left` is near `right`\n left: {left:?}\nright: {right:?}\n{}",
            format_args!($($arg)+),
        )
    }};
}

/// Counterpart of [`assert_near!`] for proptest blocks: reports a test
/// failure instead of panicking.
#[macro_export]
macro_rules! prop_assert_near {
    ($left: expr, $right: expr $(,)?) => {
        $crate::prop_assert_near!($left, $right, "")
    };
    ($left: expr, $right: expr, $($arg: tt)+) => {{
        let (left, right) = ($left, $right);
        prop_assert!(
            $crate::tolerance::Tolerance::near(&left, &right),
            "assertion failed: `left` is near `right`\n left: {left:?}\nright: {right:?}\n{}",
            format_args!($($arg)+),
        )
    }};
}
