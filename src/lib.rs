#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(dead_code)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]

//! ε-tolerant triangulation of sets of 2D polygons with holes.
//!
//! The input is a set of simple polygons — outer contours wound
//! counter-clockwise, holes wound clockwise — and the output is a list of
//! counter-clockwise triangles referencing the input vertices. The polygons
//! are first decomposed into y-monotone pieces by a two-pass sweep (forward,
//! then backward), then each monotone piece is triangulated with a
//! reflex-chain scan.
//!
//! The decomposition never computes an intersection: degeneracies that a
//! classical sweep resolves geometrically (ε-coincident vertices, colinear
//! and horizontal edges) are resolved topologically on the backward pass.
//! As a result, input that is not geometrically valid still produces a
//! triangulation whose halfedges close up against the input edges; it may
//! contain inverted triangles, but downstream mesh processing that only
//! relies on topology keeps working.
//!
//! ## Example
//!
//! ```
//! use polygon_triangulation::{triangulate, math::point};
//!
//! let square = vec![
//!     point(0.0, 0.0),
//!     point(1.0, 0.0),
//!     point(1.0, 1.0),
//!     point(0.0, 1.0),
//! ];
//!
//! // A non-positive precision requests the default: 1e-5 times the largest
//! // absolute input coordinate.
//! let triangles = triangulate(&[square], 0.0).unwrap();
//! assert_eq!(triangles.len(), 2);
//! ```
//!
//! Vertices are identified by [`VertexId`]. [`triangulate`] numbers them
//! 0..N−1 in traversal order; [`triangulate_indexed`] preserves ids supplied
//! by the caller, which is what a surrounding mesh pipeline wants when the
//! 2D cross-section refers back into a shared vertex pool.

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod checks;
mod error;
mod math_utils;
mod monotone;
mod triangulator;

#[cfg(test)]
mod triangulator_tests;

#[doc(inline)]
pub use crate::error::*;

#[doc(inline)]
pub use crate::triangulator::{
    triangulate, triangulate_indexed, triangulate_indexed_with_options, triangulate_with_options,
};

#[doc(inline)]
pub use crate::checks::{check_geometry, check_topology};

pub use crate::math_utils::ccw;

pub mod math {
    //! f32 aliases of the euclid types used everywhere in this crate.

    /// Alias for `euclid::default::Point2D<f32>`.
    pub type Point = euclid::default::Point2D<f32>;

    /// Alias for `euclid::default::Vector2D<f32>`.
    pub type Vector = euclid::default::Vector2D<f32>;

    /// Shorthand for `Point::new`.
    #[inline]
    pub fn point(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    /// Shorthand for `Vector::new`.
    #[inline]
    pub fn vector(x: f32, y: f32) -> Vector {
        Vector::new(x, y)
    }
}

use math::Point;

/// The id of an input vertex, preserved verbatim in the output triangles.
///
/// The triangulator never inspects ids; they are opaque labels attached to
/// positions. Several vertices may share an id (for instance where two
/// contours touch), in which case the output simply refers to that id from
/// both sides.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct VertexId(pub u32);

impl VertexId {
    pub fn to_usize(self) -> usize {
        self.0 as usize
    }

    pub fn from_usize(v: usize) -> Self {
        VertexId(v as u32)
    }
}

impl From<u32> for VertexId {
    fn from(v: u32) -> Self {
        VertexId(v)
    }
}

impl From<VertexId> for u32 {
    fn from(v: VertexId) -> Self {
        v.0
    }
}

/// An output triangle: three vertex ids in counter-clockwise order.
pub type Triangle = [VertexId; 3];

/// One polygon contour. Outer contours are wound counter-clockwise, holes
/// clockwise.
pub type SimplePolygon = Vec<Point>;

/// A polygon vertex carrying its caller-supplied id.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PolygonVertex {
    pub position: Point,
    pub id: VertexId,
}

impl PolygonVertex {
    #[inline]
    pub fn new(position: Point, id: VertexId) -> Self {
        PolygonVertex { position, id }
    }
}

/// One polygon contour with caller-supplied vertex ids.
pub type IndexedPolygon = Vec<PolygonVertex>;

/// Parameters of a triangulation run.
///
/// The options are captured by value when a triangulation starts, so
/// concurrent runs with different settings do not interfere.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct TriangulationOptions {
    /// Log every sweep decision to stdout (debug builds only).
    ///
    /// Default value: `false`.
    pub verbose: bool,

    /// Validate the vertex rings between the sweeps and audit the output
    /// triangulation (halfedge closure, and winding unless
    /// `process_overlaps` is set).
    ///
    /// Default value: `false`.
    pub intermediate_checks: bool,

    /// Tolerate input polygons that overlap by more than ε.
    ///
    /// When set, a sweep state with no valid continuation abandons the
    /// remaining decomposition work instead of returning a
    /// [`GeometryError`]; the output is still topologically closed but may
    /// contain inverted triangles.
    ///
    /// Default value: `false`.
    pub process_overlaps: bool,
}

impl TriangulationOptions {
    pub const DEFAULT: Self = TriangulationOptions {
        verbose: false,
        intermediate_checks: false,
        process_overlaps: false,
    };

    #[inline]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[inline]
    pub const fn with_intermediate_checks(mut self, checks: bool) -> Self {
        self.intermediate_checks = checks;
        self
    }

    #[inline]
    pub const fn with_process_overlaps(mut self, tolerate: bool) -> Self {
        self.process_overlaps = tolerate;
        self
    }
}

impl Default for TriangulationOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[test]
fn options_builders() {
    let options = TriangulationOptions::default().with_process_overlaps(true);
    assert!(options.process_overlaps);
    assert!(!options.verbose);
    assert_eq!(
        TriangulationOptions::DEFAULT,
        TriangulationOptions::default()
    );
}
