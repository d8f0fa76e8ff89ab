//! # Overview
//! `gantry_iges` manages a graph of IGES entities: the model container that
//! owns every entity, the capability trait concrete entity types implement,
//! the two-phase load that first creates nodes from DE/PD records and then
//! resolves pointer integers into reference edges, transform-chain
//! composition, model-wide rescaling, and write-out with children sequenced
//! before their referrers.
//!
//! The character-level IGES grammar is not handled here: the host parser
//! delivers structured [`record::RawEntity`] values and the writer receives
//! them back through a [`record::RecordSink`].
//!
//! On top of the graph sits [`extrude::extrude`], which turns a closed
//! [`gantry_outline::Outline`] into the trimmed-surface solids a board
//! model needs.

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

/// concrete entity types and the capability trait
pub mod entity;
/// classifies the errors that can occur in this crate
pub mod errors;
/// outline extrusion into trimmed-surface solids
pub mod extrude;
/// Global-section parameters
pub mod globals;
/// the model container
pub mod model;
/// structured DE/PD records
pub mod record;

pub use entity::{Dependency, Entity, EntityCore, EntityId, RefStatus, SeqMap};
pub use errors::{Error, Result};
pub use extrude::{extrude, ExtrudedSolid};
pub use globals::{GlobalParams, Unit};
pub use model::{Associate, EntityFactory, Model};
pub use record::{DeRef, DirEntry, Param, ParamRecord, RawEntity, RecordSink, StatusFlags};
