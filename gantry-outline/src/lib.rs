//! Closed, oriented chains of planar segments and the boolean composition
//! policy used for board outlines: add or subtract another outline or a
//! circular hole, under the "exactly zero or exactly two unique intersection
//! points" constraint.
//!
//! An outline moves through the states `Open → Closed → Finalized`. Segments
//! are appended while `Open`; [`Outline::close`] verifies the chain is cyclic
//! and computes the orientation; [`Outline::finalize`] makes the outline
//! read-only. Boolean operations never mutate their operands; they return a
//! freshly closed outline.

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

mod boolean;
/// classifies the errors that can occur in this crate
pub mod errors;
mod outline;

pub use errors::{Error, Result};
pub use outline::{Orientation, Outline, OutlineState};
