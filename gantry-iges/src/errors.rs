use thiserror::Error;

/// `Result` with crate's errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Entity-graph errors
#[derive(Debug, Error)]
pub enum Error {
    /// A pointer integer named a directory-entry sequence number that no
    /// loaded entity owns, or an entity handle that is no longer live.
    #[error("no entity owns directory entry sequence {0}")]
    UnresolvedReference(usize),
    /// A transform assignment or reference edge would close a cycle.
    #[error("operation would create a cyclic dependency")]
    CyclicDependency,
    /// Load met a type code with no registered factory.
    #[error("entity type {0} has no registered factory")]
    UnsupportedEntity(u32),
    /// A parameter record is shorter than its entity type requires, or a
    /// parameter carries the wrong type.
    #[error("parameter {index} of a type {entity} parameter record is missing or mistyped")]
    MalformedParameter {
        /// entity type code of the record
        entity: u32,
        /// zero-based index of the offending parameter
        index: usize,
    },
    /// The directory entry and its parameter record disagree on the type.
    #[error("directory entry {sequence} declares type {declared} but its parameter record carries {found}")]
    TypeMismatch {
        /// DE sequence number of the offending entity
        sequence: usize,
        /// the type code in the directory entry
        declared: u32,
        /// the type code in the parameter record
        found: u32,
    },
    /// The associate pass failed for one or more entities; every failure is
    /// listed with the DE sequence number it belongs to.
    #[error("association failed for {} entities", .0.len())]
    AssociateFailures(Vec<(usize, Error)>),
    /// wrapper of geometric error
    #[error(transparent)]
    Geometry(#[from] gantry_geometry::Error),
    /// wrapper of outline error
    #[error(transparent)]
    Outline(#[from] gantry_outline::Error),
    /// underlying record stream failure
    #[error("record stream failure: {0}")]
    Io(#[from] std::io::Error),
}

#[test]
fn print_messages() {
    use std::io::Write;
    let stderr = &mut std::io::stderr();
    writeln!(stderr, "****** test of the expressions of error messages ******\n").unwrap();
    writeln!(stderr, "{}\n", Error::UnresolvedReference(17)).unwrap();
    writeln!(stderr, "{}\n", Error::CyclicDependency).unwrap();
    writeln!(stderr, "{}\n", Error::UnsupportedEntity(154)).unwrap();
    writeln!(stderr, "{}\n", Error::MalformedParameter { entity: 126, index: 4 }).unwrap();
    writeln!(
        stderr,
        "{}\n",
        Error::AssociateFailures(vec![(1, Error::UnresolvedReference(9))]),
    )
    .unwrap();
    writeln!(stderr, "*******************************************************").unwrap();
}
