use cgmath::*;
use serde::*;
use std::ops::{Add, AddAssign};

/// axis-aligned bounding box
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct BoundingBox<V>(V, V);

/// The trait for the corner types of [`BoundingBox`]
pub trait Bounded: Copy {
    #[doc(hidden)]
    fn infinity() -> Self;
    #[doc(hidden)]
    fn neg_infinity() -> Self;
    #[doc(hidden)]
    fn max(&self, other: &Self) -> Self;
    #[doc(hidden)]
    fn min(&self, other: &Self) -> Self;
    #[doc(hidden)]
    fn le_all(&self, other: &Self) -> bool;
    #[doc(hidden)]
    fn has_nan(&self) -> bool;
}

macro_rules! impl_bounded {
    ($typename: ident, $($axis: ident),*) => {
        impl Bounded for $typename<f64> {
            fn infinity() -> Self { $typename::new($({ let $axis = f64::INFINITY; $axis }),*) }
            fn neg_infinity() -> Self { $typename::new($({ let $axis = f64::NEG_INFINITY; $axis }),*) }
            fn max(&self, other: &Self) -> Self {
                $typename::new($(f64::max(self.$axis, other.$axis)),*)
            }
            fn min(&self, other: &Self) -> Self {
                $typename::new($(f64::min(self.$axis, other.$axis)),*)
            }
            fn le_all(&self, other: &Self) -> bool { true $(&& self.$axis <= other.$axis)* }
            fn has_nan(&self) -> bool { false $(|| self.$axis.is_nan())* }
        }
    };
}
impl_bounded!(Point2, x, y);
impl_bounded!(Point3, x, y, z);

impl<V: Bounded> Default for BoundingBox<V> {
    #[inline(always)]
    fn default() -> Self { BoundingBox(V::infinity(), V::neg_infinity()) }
}

impl<V: Bounded> BoundingBox<V> {
    /// Creates an empty bounding box.
    #[inline(always)]
    pub fn new() -> Self { Self::default() }

    /// Adds a point to the bounding box. A point with a NaN component is not added.
    /// # Examples
    /// ```
    /// use gantry_base::{bounding_box::BoundingBox, cgmath64::*};
    /// let mut bdd_box = BoundingBox::new();
    /// bdd_box.push(Point2::new(-1.0, 1.0));
    /// bdd_box.push(Point2::new(1.0, -1.0));
    /// assert_eq!(bdd_box.min(), Point2::new(-1.0, -1.0));
    /// assert_eq!(bdd_box.max(), Point2::new(1.0, 1.0));
    /// ```
    #[inline(always)]
    pub fn push(&mut self, point: V) {
        if point.has_nan() {
            return;
        }
        self.0 = self.0.min(&point);
        self.1 = self.1.max(&point);
    }

    /// Returns the minimum corner. An empty box returns `(+∞, …)`.
    #[inline(always)]
    pub fn min(&self) -> V { self.0 }

    /// Returns the maximum corner. An empty box returns `(-∞, …)`.
    #[inline(always)]
    pub fn max(&self) -> V { self.1 }

    /// Returns whether no point has been pushed.
    #[inline(always)]
    pub fn is_empty(&self) -> bool { !self.0.le_all(&self.1) }

    /// Returns whether `point` lies inside the box (boundary included).
    /// Always `false` for an empty box.
    #[inline(always)]
    pub fn contains(&self, point: V) -> bool { self.0.le_all(&point) && point.le_all(&self.1) }
}

impl<V: Bounded> FromIterator<V> for BoundingBox<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut bdd_box = Self::new();
        iter.into_iter().for_each(|pt| bdd_box.push(pt));
        bdd_box
    }
}

impl<V: Bounded> AddAssign for BoundingBox<V> {
    /// Unions the two boxes.
    #[inline(always)]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.min(&other.0);
        self.1 = self.1.max(&other.1);
    }
}

impl<V: Bounded> Add for BoundingBox<V> {
    type Output = Self;
    #[inline(always)]
    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cgmath64::{Point2, Point3};

    #[test]
    fn empty_box() {
        let bdd_box = BoundingBox::<Point3>::new();
        assert!(bdd_box.is_empty());
        assert!(!bdd_box.contains(Point3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn nan_is_ignored() {
        let mut bdd_box = BoundingBox::new();
        bdd_box.push(Point2::new(f64::NAN, 0.0));
        assert!(bdd_box.is_empty());
        bdd_box.push(Point2::new(2.0, 3.0));
        assert_eq!(bdd_box.min(), Point2::new(2.0, 3.0));
    }

    #[test]
    fn union() {
        let box0: BoundingBox<_> = [Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)]
            .into_iter()
            .collect();
        let box1: BoundingBox<_> = [Point2::new(-1.0, 0.5), Point2::new(0.5, 2.0)]
            .into_iter()
            .collect();
        let union = box0 + box1;
        assert_eq!(union.min(), Point2::new(-1.0, 0.0));
        assert_eq!(union.max(), Point2::new(1.0, 2.0));
        assert!(union.contains(Point2::new(0.9, 1.9)));
        assert!(!union.contains(Point2::new(1.1, 0.0)));
    }
}
