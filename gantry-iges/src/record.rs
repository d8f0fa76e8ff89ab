//! Structured directory-entry and parameter-data records: the interface
//! between the entity graph and the host's character-level IGES parser and
//! writer. The 80-column grammar itself lives outside this crate; records
//! arrive and leave as typed field sets.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single parameter of a PD record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Param {
    /// integer parameter
    Int(i64),
    /// real parameter
    Real(f64),
    /// pointer to a directory-entry sequence number
    Pointer(usize),
    /// Hollerith string parameter
    Str(String),
    /// logical parameter
    Logical(bool),
}

/// A type-coded parameter list: the PD section contribution of one entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamRecord {
    /// entity type code, repeated as the first parameter of the PD record
    pub type_code: u32,
    /// the entity-specific payload
    pub params: Vec<Param>,
}

/// columns available to parameter data on one PD line
const PD_COLUMNS: usize = 64;

impl ParamRecord {
    /// Creates an empty record for the given type code.
    pub fn new(type_code: u32) -> ParamRecord {
        ParamRecord {
            type_code,
            params: Vec::new(),
        }
    }

    fn missing(&self, index: usize) -> Error {
        Error::MalformedParameter {
            entity: self.type_code,
            index,
        }
    }

    /// The integer at `index`.
    pub fn int(&self, index: usize) -> Result<i64> {
        match self.params.get(index) {
            Some(Param::Int(v)) => Ok(*v),
            Some(Param::Pointer(v)) => Ok(*v as i64),
            Some(Param::Logical(v)) => Ok(*v as i64),
            _ => Err(self.missing(index)),
        }
    }

    /// The real at `index`; integer parameters widen losslessly.
    pub fn real(&self, index: usize) -> Result<f64> {
        match self.params.get(index) {
            Some(Param::Real(v)) => Ok(*v),
            Some(Param::Int(v)) => Ok(*v as f64),
            _ => Err(self.missing(index)),
        }
    }

    /// The DE pointer at `index`; `0` means "no reference".
    pub fn pointer(&self, index: usize) -> Result<Option<usize>> {
        match self.params.get(index) {
            Some(Param::Pointer(v)) => Ok(Some(*v).filter(|&v| v != 0)),
            Some(Param::Int(v)) if *v >= 0 => Ok(Some(*v as usize).filter(|&v| v != 0)),
            _ => Err(self.missing(index)),
        }
    }

    /// The logical at `index`; integers `0`/`1` are accepted.
    pub fn logical(&self, index: usize) -> Result<bool> {
        match self.params.get(index) {
            Some(Param::Logical(v)) => Ok(*v),
            Some(Param::Int(v)) if (0..=1).contains(v) => Ok(*v == 1),
            _ => Err(self.missing(index)),
        }
    }

    /// The string at `index`, if any.
    pub fn string(&self, index: usize) -> Option<&str> {
        match self.params.get(index) {
            Some(Param::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// The number of PD lines this record occupies, derived from a canonical
    /// 64-column free-format layout so that DE field 14 is stable without
    /// consulting the character-level writer.
    pub fn line_count(&self) -> usize {
        let mut columns = format!("{},", self.type_code).len();
        for param in &self.params {
            let token = match param {
                Param::Int(v) => format!("{v},"),
                Param::Real(v) => format!("{v:.7E},"),
                Param::Pointer(v) => format!("{v},"),
                Param::Str(s) => format!("{}H{s},", s.len()),
                Param::Logical(v) => format!("{},", *v as u8),
            };
            columns += token.len();
        }
        columns.div_ceil(PD_COLUMNS).max(1)
    }
}

/// A reference-or-value directory-entry field. Several DE fields carry
/// either a palette or level number, or (negated in the file) a pointer to
/// a definition entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeRef {
    /// zero in the file: fall back to the receiving system's default
    #[default]
    Default,
    /// a direct value, e.g. a color number or level number
    Value(i64),
    /// a pointer to the directory entry with this sequence number
    Pointer(usize),
}

impl DeRef {
    /// Decodes the signed convention: negative values point at a DE.
    pub fn from_raw(raw: i64) -> DeRef {
        match raw {
            0 => DeRef::Default,
            v if v < 0 => DeRef::Pointer((-v) as usize),
            v => DeRef::Value(v),
        }
    }

    /// Encodes back into the signed convention.
    pub fn to_raw(self) -> i64 {
        match self {
            DeRef::Default => 0,
            DeRef::Value(v) => v,
            DeRef::Pointer(seq) => -(seq as i64),
        }
    }

    /// The pointed-at DE sequence, if this field is a pointer.
    pub fn pointer(self) -> Option<usize> {
        match self {
            DeRef::Pointer(seq) => Some(seq),
            _ => None,
        }
    }
}

/// DE status field 1: blank status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlankStatus {
    /// entity is to be displayed
    #[default]
    Visible,
    /// entity exists but is not displayed
    Blanked,
}

/// DE status field 2: subordinate entity switch (IGES 2.2.4.5.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Subordinate {
    /// top-level entity
    #[default]
    Independent,
    /// the entity cannot exist without its parent
    PhysicallyDependent,
    /// the parent merely groups the entity
    LogicallyDependent,
    /// both physical and logical dependence
    Both,
}

impl Subordinate {
    /// Whether destruction of the last parent should destroy this entity.
    pub fn is_physical(self) -> bool {
        matches!(self, Subordinate::PhysicallyDependent | Subordinate::Both)
    }
}

/// DE status field 3: entity use flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntityUse {
    /// ordinary geometry
    #[default]
    Geometry,
    /// annotation
    Annotation,
    /// definition structure
    Definition,
    /// other use
    Other,
    /// logical or positional use
    LogicalPositional,
    /// 2D parametric geometry, e.g. curves in a surface's parameter space
    Parametric2d,
    /// construction geometry
    ConstructionGeometry,
}

/// DE status field 4: hierarchy flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Hierarchy {
    /// directory-entry attributes apply to children
    #[default]
    GlobalTopDown,
    /// children keep their own attributes
    GlobalDefer,
    /// a property entity enumerates the applicability
    UseProperty,
}

/// The four two-digit subfields of DE field 9.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusFlags {
    /// blank status
    pub blank: BlankStatus,
    /// subordinate entity switch
    pub subordinate: Subordinate,
    /// entity use flag
    pub use_flag: EntityUse,
    /// hierarchy flag
    pub hierarchy: Hierarchy,
}

impl StatusFlags {
    /// Decodes the packed eight-digit status number.
    pub fn from_code(code: u32) -> Option<StatusFlags> {
        let blank = match (code / 1_000_000) % 100 {
            0 => BlankStatus::Visible,
            1 => BlankStatus::Blanked,
            _ => return None,
        };
        let subordinate = match (code / 10_000) % 100 {
            0 => Subordinate::Independent,
            1 => Subordinate::PhysicallyDependent,
            2 => Subordinate::LogicallyDependent,
            3 => Subordinate::Both,
            _ => return None,
        };
        let use_flag = match (code / 100) % 100 {
            0 => EntityUse::Geometry,
            1 => EntityUse::Annotation,
            2 => EntityUse::Definition,
            3 => EntityUse::Other,
            4 => EntityUse::LogicalPositional,
            5 => EntityUse::Parametric2d,
            6 => EntityUse::ConstructionGeometry,
            _ => return None,
        };
        let hierarchy = match code % 100 {
            0 => Hierarchy::GlobalTopDown,
            1 => Hierarchy::GlobalDefer,
            2 => Hierarchy::UseProperty,
            _ => return None,
        };
        Some(StatusFlags {
            blank,
            subordinate,
            use_flag,
            hierarchy,
        })
    }

    /// Encodes back into the packed eight-digit status number.
    pub fn to_code(self) -> u32 {
        let blank = self.blank as u32;
        let subordinate = self.subordinate as u32;
        let use_flag = self.use_flag as u32;
        let hierarchy = self.hierarchy as u32;
        blank * 1_000_000 + subordinate * 10_000 + use_flag * 100 + hierarchy
    }
}

/// One structured directory entry: the twenty fields of the two DE lines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirEntry {
    /// field 1/11: entity type code
    pub entity_type: u32,
    /// field 2: sequence of the first PD line (assigned on write)
    pub param_data: usize,
    /// field 3: structure definition
    pub structure: DeRef,
    /// field 4: line font pattern
    pub line_font: DeRef,
    /// field 5: level
    pub level: DeRef,
    /// field 6: view
    pub view: DeRef,
    /// field 7: transformation matrix DE sequence, `0` for none
    pub transform: usize,
    /// field 8: label display associativity
    pub label_display: DeRef,
    /// field 9: status number
    pub status: StatusFlags,
    /// field 12: line weight number
    pub line_weight: i64,
    /// field 13: color
    pub color: DeRef,
    /// field 14: PD line count (assigned on write)
    pub param_line_count: usize,
    /// field 15: form number
    pub form: i64,
    /// field 18: entity label
    pub label: String,
    /// field 19: entity subscript number
    pub subscript: i64,
    /// field 10/20: sequence number of the first DE line
    pub sequence: usize,
}

impl Default for DirEntry {
    fn default() -> Self { DirEntry::new(0) }
}

impl DirEntry {
    /// Creates a blank DE for the given type code.
    pub fn new(entity_type: u32) -> DirEntry {
        DirEntry {
            entity_type,
            param_data: 0,
            structure: DeRef::Default,
            line_font: DeRef::Default,
            level: DeRef::Default,
            view: DeRef::Default,
            transform: 0,
            label_display: DeRef::Default,
            status: StatusFlags::default(),
            line_weight: 0,
            color: DeRef::Default,
            param_line_count: 0,
            form: 0,
            label: String::new(),
            subscript: 0,
            sequence: 0,
        }
    }
}

/// A directory entry paired with its parameter record: the unit the host
/// parser delivers and the writer receives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawEntity {
    /// the directory entry
    pub de: DirEntry,
    /// the parameter record
    pub pd: ParamRecord,
}

/// Receiver of the write-out record stream.
pub trait RecordSink {
    /// Accepts the next entity in sequence order.
    fn put(&mut self, record: RawEntity) -> std::io::Result<()>;
}

impl RecordSink for Vec<RawEntity> {
    fn put(&mut self, record: RawEntity) -> std::io::Result<()> {
        self.push(record);
        Ok(())
    }
}
