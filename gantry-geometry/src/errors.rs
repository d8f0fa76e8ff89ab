use thiserror::Error;

/// `Result` with crate's errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Geometrical errors
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    /// Construction was asked for geometry with no extent: a zero-length
    /// line, a zero radius, or arc endpoints whose radii disagree beyond
    /// the radial tolerance.
    /// # Examples
    /// ```
    /// use gantry_geometry::{Error, Segment};
    /// use gantry_base::cgmath64::*;
    /// let p = Point3::new(1.0, 2.0, 0.0);
    /// assert!(matches!(Segment::line(p, p), Err(Error::DegenerateGeometry(_))));
    /// ```
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
    /// A planar primitive was given a point with z ≠ 0.
    #[error("planar primitives must lie in the z = 0 plane")]
    NonPlanar,
}

#[test]
fn print_messages() {
    use std::io::Write;
    let stderr = &mut std::io::stderr();
    writeln!(stderr, "****** test of the expressions of error messages ******\n").unwrap();
    writeln!(stderr, "{}\n", Error::DegenerateGeometry("zero-length line")).unwrap();
    writeln!(stderr, "{}\n", Error::NonPlanar).unwrap();
    writeln!(stderr, "*******************************************************").unwrap();
}
