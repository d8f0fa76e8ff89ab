//! Planar geometric primitives for outline composition: the [`Segment`] type
//! (line, circular arc, full circle), intersection classification between any
//! pair of segments, and axis-aligned bounds.
//!
//! All primitives live in the z = 0 plane; constructors reject non-planar
//! input. Segments are plain values and never share storage.

#![cfg_attr(not(debug_assertions), deny(warnings))]
#![deny(clippy::all, rust_2018_idioms)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

use gantry_base::cgmath64::*;
use gantry_base::tolerance::*;

/// classifies the errors that can occur in this crate
pub mod errors;
mod intersect;
mod segment;

pub use errors::{Error, Result};
pub use intersect::IntersectFlag;
pub use segment::{Arc, Circle, Line, Segment, SegmentKind};

/// CCW angle of `p` as seen from `center`, normalized to `[0, 2π)`.
pub(crate) fn angle_of(center: Point3, p: Point3) -> f64 {
    let a = f64::atan2(p.y - center.y, p.x - center.x);
    if a < 0.0 {
        a + 2.0 * std::f64::consts::PI
    } else {
        a
    }
}

pub(crate) fn cross_z(a: Vector3, b: Vector3) -> f64 { a.x * b.y - a.y * b.x }
