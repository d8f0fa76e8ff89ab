use thiserror::Error;

/// `Result` with crate's errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Outline errors
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    /// A boolean operation found an intersection configuration outside the
    /// supported "exactly zero or exactly two unique points" policy.
    #[error("invalid intersection between outlines: {0}")]
    InvalidIntersection(&'static str),
    /// `add_segment` was given a segment that does not continue the chain.
    #[error("segment start does not meet the open end of the chain")]
    Discontinuous,
    /// The operation requires a closed outline.
    #[error("outline is not closed")]
    NotClosed,
    /// `add_segment` after `close`.
    #[error("outline is already closed")]
    AlreadyClosed,
    /// `close` on an empty chain.
    #[error("outline has no segments")]
    Empty,
    /// wrapper of geometric error
    #[error(transparent)]
    Geometry(#[from] gantry_geometry::Error),
}

#[test]
fn print_messages() {
    use std::io::Write;
    let stderr = &mut std::io::stderr();
    writeln!(stderr, "****** test of the expressions of error messages ******\n").unwrap();
    writeln!(stderr, "{}\n", Error::InvalidIntersection("three unique points")).unwrap();
    writeln!(stderr, "{}\n", Error::Discontinuous).unwrap();
    writeln!(stderr, "{}\n", Error::NotClosed).unwrap();
    writeln!(stderr, "{}\n", Error::AlreadyClosed).unwrap();
    writeln!(stderr, "{}\n", Error::Empty).unwrap();
    writeln!(stderr, "*******************************************************").unwrap();
}
