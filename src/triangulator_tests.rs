use crate::math::point;
use crate::{
    check_geometry, check_topology, triangulate, triangulate_indexed,
    triangulate_indexed_with_options, triangulate_with_options, GeometryError, IndexedPolygon,
    PolygonVertex, SimplePolygon, Triangle, TriangulationError, TriangulationOptions,
    UnsupportedParameter, VertexId,
};

use std::collections::{HashMap, HashSet};

fn polygon(points: &[(f32, f32)]) -> SimplePolygon {
    points.iter().map(|&(x, y)| point(x, y)).collect()
}

fn index_polygons(polygons: &[SimplePolygon]) -> Vec<IndexedPolygon> {
    let mut next_id = 0;
    polygons
        .iter()
        .map(|poly| {
            poly.iter()
                .map(|&position| {
                    let vert = PolygonVertex::new(position, VertexId(next_id));
                    next_id += 1;
                    vert
                })
                .collect()
        })
        .collect()
}

/// Triangulates with all checks on and verifies the universal invariants:
/// expected count, halfedge closure against the input, and that no vertex
/// id was invented.
fn triangulate_and_check(
    polygons: &[SimplePolygon],
    precision: f32,
    expected: usize,
) -> Vec<Triangle> {
    let indexed = index_polygons(polygons);
    let options = TriangulationOptions::default().with_intermediate_checks(true);
    let triangles = match triangulate_indexed_with_options(&indexed, precision, &options) {
        Ok(triangles) => triangles,
        Err(e) => panic!("triangulation failed: {e}"),
    };
    assert_eq!(triangles.len(), expected, "triangle count");
    check_topology(&triangles, &indexed).expect("halfedges do not close up");
    let num_verts: u32 = polygons.iter().map(|poly| poly.len() as u32).sum();
    for tri in &triangles {
        for id in tri {
            assert!(id.0 < num_verts, "invented vertex id {id:?}");
        }
    }
    triangles
}

fn count_id(triangles: &[Triangle], id: u32) -> usize {
    triangles
        .iter()
        .flatten()
        .filter(|vert| vert.0 == id)
        .count()
}

/// The triangle multiset, rotated smallest-id-first and sorted, so two
/// triangulations compare independently of triangle and corner order.
fn canonical(triangles: &[Triangle]) -> Vec<Triangle> {
    let mut canon: Vec<Triangle> = triangles
        .iter()
        .map(|tri| {
            let first = (0..3).min_by_key(|&i| tri[i]).unwrap();
            [tri[first], tri[(first + 1) % 3], tri[(first + 2) % 3]]
        })
        .collect();
    canon.sort();
    canon
}

#[test]
fn empty_input() {
    assert_eq!(triangulate(&[], 0.0), Ok(Vec::new()));
}

#[test]
fn single_triangle() {
    triangulate_and_check(&[polygon(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)])], 0.0, 1);
}

#[test]
fn unit_square() {
    let triangles = triangulate_and_check(
        &[polygon(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])],
        0.0,
        2,
    );
    // Both diagonal triangulations are acceptable; every vertex must be
    // used.
    for id in 0..4 {
        assert!(count_id(&triangles, id) >= 1);
    }
}

#[test]
fn merge_vertex_polygon() {
    // An M-shaped polygon: the notch at (2, 2) fuses two monotone regions
    // on the way up, and the backward sweep has to cut them apart again.
    triangulate_and_check(
        &[polygon(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 4.0),
            (2.0, 2.0),
            (0.0, 4.0),
        ])],
        0.0,
        3,
    );
}

#[test]
fn square_with_square_hole() {
    let outer = polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
    let hole = polygon(&[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)]);
    let triangles = triangulate_and_check(&[outer, hole], 0.0, 8);

    // Every hole vertex is used, and the two bridge vertices (the hole's
    // bottom and the merge vertex at its top) are duplicated, so they show
    // up on both sides of the cuts.
    for id in 4..8 {
        assert!(count_id(&triangles, id) >= 1);
    }
    assert!(count_id(&triangles, 4) >= 2);
    assert!(count_id(&triangles, 5) >= 2 || count_id(&triangles, 6) >= 2);
}

#[test]
fn colinear_spike() {
    // The contour doubles back along y = 0, leaving a zero-area spike that
    // must still be covered by a (degenerate) triangle.
    triangulate_and_check(
        &[polygon(&[(0.0, 0.0), (2.0, 0.0), (1.0, 0.0), (1.0, 1.0)])],
        0.01,
        2,
    );
}

#[test]
fn colinear_midpoint() {
    let triangle = polygon(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (1.0, 1.0)]);
    let triangles = triangulate_and_check(&[triangle.clone()], 0.01, 2);
    // The midpoint is a vertex of the output.
    assert!(count_id(&triangles, 1) >= 1);
    check_geometry(&triangles, &index_polygons(&[triangle]), 0.02).unwrap();
}

#[test]
fn touching_squares() {
    let left = polygon(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
    let right = polygon(&[(1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0)]);
    let triangles = triangulate_and_check(&[left, right], 0.0, 4);
    // The shared edge is used from both sides.
    for id in 0..8 {
        assert!(count_id(&triangles, id) >= 1);
    }
}

fn five_point_star() -> SimplePolygon {
    let mut star = Vec::new();
    for k in 0..5 {
        let spike = (90.0 + 72.0 * k as f32).to_radians();
        let notch = (126.0 + 72.0 * k as f32).to_radians();
        star.push(point(spike.cos(), spike.sin()));
        star.push(point(0.5 * notch.cos(), 0.5 * notch.sin()));
    }
    star
}

#[test]
fn star() {
    triangulate_and_check(&[five_point_star()], 0.0, 8);
}

#[test]
fn star_rotations() {
    let star = five_point_star();
    let mut angle = 0.1_f32;
    while angle < std::f32::consts::PI {
        let (sin, cos) = angle.sin_cos();
        let rotated: SimplePolygon = star
            .iter()
            .map(|p| point(p.x * cos - p.y * sin, p.x * sin + p.y * cos))
            .collect();
        triangulate_and_check(&[rotated], 0.0, 8);
        angle += 0.7;
    }
}

#[test]
fn nested_contours() {
    // An island inside the hole: two components, one hole.
    let outer = polygon(&[(0.0, 0.0), (6.0, 0.0), (6.0, 6.0), (0.0, 6.0)]);
    let hole = polygon(&[(1.0, 1.0), (1.0, 5.0), (5.0, 5.0), (5.0, 1.0)]);
    let island = polygon(&[(2.0, 2.0), (3.0, 2.0), (3.0, 3.0), (2.0, 3.0)]);
    triangulate_and_check(&[outer, hole, island], 0.0, 10);
}

#[test]
fn disjoint_triangles() {
    let a = polygon(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
    let b = polygon(&[(3.0, 0.0), (4.0, 0.0), (3.0, 1.0)]);
    triangulate_and_check(&[a, b], 0.0, 2);
}

#[test]
fn epsilon_coincident_vertices() {
    // Two vertices closer together than ε.
    triangulate_and_check(
        &[polygon(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1e-7),
            (1.0, 1.0),
            (0.0, 1.0),
        ])],
        1e-3,
        3,
    );
}

#[test]
fn caller_ids_preserved() {
    let ids = [7, 3, 11, 42];
    let square: IndexedPolygon = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
        .iter()
        .zip(ids)
        .map(|(&(x, y), id)| PolygonVertex::new(point(x, y), VertexId(id)))
        .collect();
    let triangles = triangulate_indexed(&[square], 0.0).unwrap();
    assert_eq!(triangles.len(), 2);
    for tri in &triangles {
        for id in tri {
            assert!(ids.contains(&id.0), "invented vertex id {id:?}");
        }
    }
}

#[test]
fn indexed_matches_unindexed() {
    let polys = vec![five_point_star()];
    let unindexed = triangulate(&polys, 0.0).unwrap();
    let indexed = triangulate_indexed(&index_polygons(&polys), 0.0).unwrap();
    assert_eq!(unindexed, indexed);
}

#[test]
fn retriangulation_is_idempotent() {
    let polys = vec![
        polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]),
        polygon(&[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)]),
    ];
    let indexed = index_polygons(&polys);
    let first = triangulate_indexed(&indexed, 0.0).unwrap();

    // The boundary of the triangulation: directed edges with no opposite.
    // By halfedge closure these are exactly the input polygon edges.
    let mut edges = HashSet::new();
    for tri in &first {
        edges.insert((tri[0].0, tri[1].0));
        edges.insert((tri[1].0, tri[2].0));
        edges.insert((tri[2].0, tri[0].0));
    }
    let mut outgoing = HashMap::new();
    for &(a, b) in &edges {
        if !edges.contains(&(b, a)) {
            outgoing.insert(a, b);
        }
    }
    let positions: HashMap<u32, _> = indexed
        .iter()
        .flatten()
        .map(|vert| (vert.id.0, vert.position))
        .collect();

    // Walk the boundary cycles back into polygons, smallest id first.
    let mut starts: Vec<u32> = outgoing.keys().copied().collect();
    starts.sort();
    let mut rebuilt: Vec<IndexedPolygon> = Vec::new();
    let mut visited = HashSet::new();
    for &start in &starts {
        if visited.contains(&start) {
            continue;
        }
        let mut ring = IndexedPolygon::new();
        let mut id = start;
        loop {
            visited.insert(id);
            ring.push(PolygonVertex::new(positions[&id], VertexId(id)));
            id = outgoing[&id];
            if id == start {
                break;
            }
        }
        rebuilt.push(ring);
    }

    let second = triangulate_indexed(&rebuilt, 0.0).unwrap();
    assert_eq!(canonical(&first), canonical(&second));
}

#[test]
fn scale_invariance() {
    // Scaling the input by a power of two is exact in f32, and the default
    // ε scales with the coordinate bound, so the triangulation must not
    // change at all.
    let star = five_point_star();
    let scaled: SimplePolygon = star.iter().map(|p| point(p.x * 1024.0, p.y * 1024.0)).collect();
    assert_eq!(
        triangulate(&[star], 0.0).unwrap(),
        triangulate(&[scaled], 0.0).unwrap()
    );
}

#[test]
fn overlapping_squares_rejected() {
    let a = polygon(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
    let b = polygon(&[(0.5, 0.0), (1.5, 0.0), (1.5, 1.0), (0.5, 1.0)]);
    match triangulate(&[a, b], 0.0) {
        Err(TriangulationError::Geometry(_)) => {}
        other => panic!("expected a geometry error, got {other:?}"),
    }
}

#[test]
fn overlapping_squares_tolerated() {
    let a = polygon(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
    let b = polygon(&[(0.5, 0.0), (1.5, 0.0), (1.5, 1.0), (0.5, 1.0)]);
    let polys = vec![a, b];
    let options = TriangulationOptions::default().with_process_overlaps(true);
    let triangles = triangulate_with_options(&polys, 0.0, &options).unwrap();
    // For this geometry the overlap is detected before any split has
    // touched the rings, so both 4-vertex squares are closed up as they
    // stand: exactly two triangles each. The result is still manifold
    // against the input edges.
    assert_eq!(triangles.len(), 4);
    check_topology(&triangles, &index_polygons(&polys)).unwrap();
}

#[test]
fn rejects_nan_position() {
    let bad = polygon(&[(0.0, 0.0), (f32::NAN, 0.0), (0.0, 1.0)]);
    assert_eq!(
        triangulate(&[bad], 0.0),
        Err(TriangulationError::UnsupportedParameter(
            UnsupportedParameter::PositionNotFinite
        ))
    );
}

#[test]
fn rejects_degenerate_polygon() {
    let bad = polygon(&[(0.0, 0.0), (1.0, 0.0)]);
    assert_eq!(
        triangulate(&[bad], 0.0),
        Err(TriangulationError::UnsupportedParameter(
            UnsupportedParameter::PolygonTooSmall
        ))
    );
}

#[test]
fn rejects_nan_precision() {
    let square = polygon(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
    assert_eq!(
        triangulate(&[square], f32::NAN),
        Err(TriangulationError::UnsupportedParameter(
            UnsupportedParameter::PrecisionIsNaN
        ))
    );
}

#[test]
fn winding_of_valid_output() {
    let polys = vec![
        polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]),
        polygon(&[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)]),
    ];
    let indexed = index_polygons(&polys);
    let triangles = triangulate_indexed(&indexed, 1e-4).unwrap();
    check_geometry(&triangles, &indexed, 2e-4).unwrap();
}

#[test]
fn error_messages_name_the_failure() {
    let error = TriangulationError::Geometry(GeometryError::StaleSkippedVertices);
    assert_eq!(
        error.to_string(),
        "geometry error: sweep advanced past unplaced vertices"
    );
}
