//! Post-triangulation audits: halfedge closure against the input edges and
//! winding of the output triangles.

use crate::math::Point;
use crate::math_utils::ccw;
use crate::{GeometryError, IndexedPolygon, TopologyError, Triangle};

use std::collections::HashMap;
use std::mem;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct HalfEdge {
    start: u32,
    end: u32,
}

fn polygon_edges(polygons: &[IndexedPolygon]) -> Vec<HalfEdge> {
    let mut halfedges = Vec::new();
    for poly in polygons {
        for pair in poly.windows(2) {
            halfedges.push(HalfEdge {
                start: pair[0].id.0,
                end: pair[1].id.0,
            });
        }
        if let (Some(first), Some(last)) = (poly.first(), poly.last()) {
            halfedges.push(HalfEdge {
                start: last.id.0,
                end: first.id.0,
            });
        }
    }
    halfedges
}

fn triangle_edges(triangles: &[Triangle]) -> Vec<HalfEdge> {
    let mut halfedges = Vec::with_capacity(triangles.len() * 3);
    for tri in triangles {
        halfedges.push(HalfEdge {
            start: tri[0].0,
            end: tri[1].0,
        });
        halfedges.push(HalfEdge {
            start: tri[1].0,
            end: tri[2].0,
        });
        halfedges.push(HalfEdge {
            start: tri[2].0,
            end: tri[0].0,
        });
    }
    halfedges
}

/// Every directed edge of a closed 2-manifold edge set has exactly one
/// opposite.
fn check_halfedges(halfedges: Vec<HalfEdge>) -> Result<(), TopologyError> {
    if halfedges.len() % 2 != 0 {
        return Err(TopologyError::OddHalfedgeCount);
    }
    let n_edges = halfedges.len() / 2;

    let mut forward: Vec<HalfEdge> = halfedges
        .iter()
        .copied()
        .filter(|e| e.end > e.start)
        .collect();
    let mut backward: Vec<HalfEdge> = halfedges
        .iter()
        .copied()
        .filter(|e| e.end < e.start)
        .collect();
    if forward.len() != n_edges || backward.len() != n_edges {
        return Err(TopologyError::UnbalancedHalfedges);
    }

    for edge in &mut backward {
        mem::swap(&mut edge.start, &mut edge.end);
    }
    forward.sort();
    backward.sort();
    for i in 0..n_edges {
        if forward[i] != backward[i] {
            return Err(TopologyError::UnmatchedHalfedge);
        }
        if i > 0 && (forward[i - 1] == forward[i] || backward[i - 1] == backward[i]) {
            return Err(TopologyError::NonManifold);
        }
    }
    Ok(())
}

/// Checks that the triangles, together with the reverse of the input
/// polygon edges, form a closed 2-manifold: every directed edge has exactly
/// one opposite.
///
/// This holds for any triangulation this crate emits, including the
/// overlap-tolerant kind.
pub fn check_topology(
    triangles: &[Triangle],
    polygons: &[IndexedPolygon],
) -> Result<(), TopologyError> {
    let mut halfedges = triangle_edges(triangles);
    for edge in polygon_edges(polygons) {
        halfedges.push(HalfEdge {
            start: edge.end,
            end: edge.start,
        });
    }
    check_halfedges(halfedges)
}

/// Checks that every triangle is wound counter-clockwise within
/// `precision`. Only meaningful for ε-valid input; overlap-tolerant output
/// is allowed to fail this.
pub fn check_geometry(
    triangles: &[Triangle],
    polygons: &[IndexedPolygon],
    precision: f32,
) -> Result<(), GeometryError> {
    let mut positions: HashMap<u32, Point> = HashMap::new();
    for poly in polygons {
        for vert in poly {
            positions.insert(vert.id.0, vert.position);
        }
    }
    let pos = |id: u32| positions.get(&id).copied().unwrap_or(Point::origin());
    for tri in triangles {
        if ccw(pos(tri[0].0), pos(tri[1].0), pos(tri[2].0), precision) < 0 {
            return Err(GeometryError::InvertedTriangle);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;
    use crate::{PolygonVertex, VertexId};

    fn indexed(points: &[(f32, f32)]) -> IndexedPolygon {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| PolygonVertex::new(point(x, y), VertexId(i as u32)))
            .collect()
    }

    fn tri(a: u32, b: u32, c: u32) -> Triangle {
        [VertexId(a), VertexId(b), VertexId(c)]
    }

    #[test]
    fn closed_square() {
        let square = indexed(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let triangles = vec![tri(0, 1, 2), tri(0, 2, 3)];
        assert_eq!(check_topology(&triangles, &[square.clone()]), Ok(()));
        assert_eq!(check_geometry(&triangles, &[square], 0.0), Ok(()));
    }

    #[test]
    fn missing_triangle() {
        let square = indexed(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let triangles = vec![tri(0, 1, 2)];
        assert_eq!(
            check_topology(&triangles, &[square]),
            Err(TopologyError::OddHalfedgeCount)
        );
    }

    #[test]
    fn flipped_triangle() {
        let triangle = indexed(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        let flipped = vec![tri(0, 2, 1)];
        assert_eq!(
            check_topology(&flipped, &[triangle.clone()]),
            Err(TopologyError::UnbalancedHalfedges)
        );
        assert_eq!(
            check_geometry(&flipped, &[triangle], 0.0),
            Err(GeometryError::InvertedTriangle)
        );
    }
}
