use crate::Triangle;

/// The triangulator's result type.
pub type TriangulationResult = Result<Vec<Triangle>, TriangulationError>;

/// The input or output is not a closed set of polygons, or an internal
/// invariant of the decomposition was violated. Always fatal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TopologyError {
    /// The combined halfedge multiset has an odd number of entries.
    OddHalfedgeCount,
    /// Forward and backward halfedges are not in equal number.
    UnbalancedHalfedges,
    /// A halfedge has no opposite.
    UnmatchedHalfedge,
    /// A directed edge appears more than once.
    NonManifold,
    /// A vertex ring degenerated to two edges.
    DegenerateMonotone,
    /// A vertex's ring neighbours do not point back at it.
    BrokenRing,
    /// A monotone piece produced no triangles.
    EmptyMonotone,
    /// The triangle total does not match the vertex count.
    TriangleCountMismatch,
}

impl core::fmt::Display for TopologyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TopologyError::OddHalfedgeCount => write!(f, "odd number of halfedges"),
            TopologyError::UnbalancedHalfedges => {
                write!(f, "half of the halfedges should be forward")
            }
            TopologyError::UnmatchedHalfedge => {
                write!(f, "forward and backward halfedges do not match")
            }
            TopologyError::NonManifold => write!(f, "edge set is not a 2-manifold"),
            TopologyError::DegenerateMonotone => write!(f, "two-edge monotone ring"),
            TopologyError::BrokenRing => write!(f, "vertex ring neighbours do not agree"),
            TopologyError::EmptyMonotone => write!(f, "monotone produced no triangles"),
            TopologyError::TriangleCountMismatch => {
                write!(f, "triangulation produced the wrong number of triangles")
            }
        }
    }
}

impl std::error::Error for TopologyError {}

/// The input polygons overlap by more than ε, or the sweep reached a state
/// with no valid placement. Suppressed when
/// [`process_overlaps`](crate::TriangulationOptions::process_overlaps) is set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GeometryError {
    /// The sweep advanced past a vertex that was still waiting to be placed.
    StaleSkippedVertices,
    /// The last remaining vertex elected to be skipped.
    SkippedFinalVertex,
    /// The last queued vertex elected to be skipped.
    SkippedLastQueuedVertex,
    /// A vertex elected to be skipped on the backward sweep, which consumes
    /// only topological information and must never skip.
    SkipOnBackwardSweep,
    /// A hole's Start vertex has no monotone pair enclosing it.
    HoleWithoutEnclosingPair,
    /// An output triangle is wound clockwise by more than ε.
    InvertedTriangle,
}

impl core::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GeometryError::StaleSkippedVertices => {
                write!(f, "sweep advanced past unplaced vertices")
            }
            GeometryError::SkippedFinalVertex => write!(f, "tried to skip the final vertex"),
            GeometryError::SkippedLastQueuedVertex => {
                write!(f, "tried to skip the last queued vertex")
            }
            GeometryError::SkipOnBackwardSweep => {
                write!(f, "skip on the backward sweep")
            }
            GeometryError::HoleWithoutEnclosingPair => {
                write!(f, "hole start without an enclosing pair")
            }
            GeometryError::InvertedTriangle => {
                write!(f, "triangulation is not entirely counter-clockwise")
            }
        }
    }
}

impl std::error::Error for GeometryError {}

/// A precondition violation, rejected before any processing happens.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnsupportedParameter {
    /// A vertex coordinate is NaN or infinite.
    PositionNotFinite,
    /// The precision threshold is NaN.
    PrecisionIsNaN,
    /// A polygon has fewer than three vertices.
    PolygonTooSmall,
}

impl core::fmt::Display for UnsupportedParameter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UnsupportedParameter::PositionNotFinite => write!(f, "position is not finite"),
            UnsupportedParameter::PrecisionIsNaN => write!(f, "precision is not a number"),
            UnsupportedParameter::PolygonTooSmall => {
                write!(f, "polygon has fewer than three vertices")
            }
        }
    }
}

impl std::error::Error for UnsupportedParameter {}

/// The triangulator's error enumeration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TriangulationError {
    UnsupportedParameter(UnsupportedParameter),
    Topology(TopologyError),
    Geometry(GeometryError),
}

impl core::fmt::Display for TriangulationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TriangulationError::UnsupportedParameter(e) => {
                write!(f, "unsupported parameter: {e}")
            }
            TriangulationError::Topology(e) => write!(f, "topology error: {e}"),
            TriangulationError::Geometry(e) => write!(f, "geometry error: {e}"),
        }
    }
}

impl std::error::Error for TriangulationError {}

impl From<UnsupportedParameter> for TriangulationError {
    fn from(value: UnsupportedParameter) -> Self {
        Self::UnsupportedParameter(value)
    }
}

impl From<TopologyError> for TriangulationError {
    fn from(value: TopologyError) -> Self {
        Self::Topology(value)
    }
}

impl From<GeometryError> for TriangulationError {
    fn from(value: GeometryError) -> Self {
        Self::Geometry(value)
    }
}
