use crate::math::Point;
use crate::math_utils::ccw;
use crate::{Triangle, VertexId};

/// Generates a triangulation from sequential vertices of one y-monotone
/// polygon (used internally by the sweep in `triangulator`).
///
/// Vertices must be fed in sweep order, each with the side of the monotone
/// it sits on; the final vertex must be flagged `last` so the remaining
/// triangles are flushed. If the input is not actually monotone the result
/// is still topologically valid, just not geometrically.
pub(crate) struct MonotoneTriangulator {
    reflex_chain: Vec<MonotoneVertex>,
    /// The side the reflex chain is on.
    on_right: bool,
    triangle_count: usize,
    precision: f32,
}

#[derive(Copy, Clone, Debug)]
struct MonotoneVertex {
    pos: Point,
    id: VertexId,
}

impl MonotoneTriangulator {
    pub fn new(pos: Point, id: VertexId, precision: f32) -> Self {
        let mut reflex_chain = Vec::with_capacity(16);
        reflex_chain.push(MonotoneVertex { pos, id });
        MonotoneTriangulator {
            reflex_chain,
            on_right: false,
            triangle_count: 0,
            precision,
        }
    }

    pub fn num_triangles(&self) -> usize {
        self.triangle_count
    }

    /// Attach the next vertex to the free end of the polygon input so far.
    pub fn process_vert(
        &mut self,
        pos: Point,
        id: VertexId,
        on_right: bool,
        last: bool,
        triangles: &mut Vec<Triangle>,
    ) {
        let current = MonotoneVertex { pos, id };
        let mut v_top = *self.reflex_chain.last().unwrap();
        if self.reflex_chain.len() < 2 {
            self.reflex_chain.push(current);
            self.on_right = on_right;
            return;
        }
        self.reflex_chain.pop();
        let mut vj = *self.reflex_chain.last().unwrap();
        if self.on_right == on_right && !last {
            // Only pop as long as the remaining chain stays reflex.
            let winding = if self.on_right { 1 } else { -1 };
            let mut orientation = ccw(current.pos, vj.pos, v_top.pos, self.precision);
            while orientation == winding || orientation == 0 {
                self.push_triangle(triangles, current, vj, v_top);
                v_top = vj;
                self.reflex_chain.pop();
                match self.reflex_chain.last() {
                    Some(&v) => vj = v,
                    None => break,
                }
                orientation = ccw(current.pos, vj.pos, v_top.pos, self.precision);
            }
            self.reflex_chain.push(v_top);
            self.reflex_chain.push(current);
        } else {
            // Empty the chain and switch sides. The final vertex always
            // takes this branch, so every remaining triangle is output
            // regardless of geometry.
            self.on_right = !self.on_right;
            let mut v_last = v_top;
            while let Some(vj) = self.reflex_chain.pop() {
                self.push_triangle(triangles, current, v_last, vj);
                v_last = vj;
            }
            self.reflex_chain.push(v_top);
            self.reflex_chain.push(current);
        }
    }

    fn push_triangle(
        &mut self,
        triangles: &mut Vec<Triangle>,
        v0: MonotoneVertex,
        v1: MonotoneVertex,
        v2: MonotoneVertex,
    ) {
        // The chain side decides the winding of the emitted triangle.
        let triangle = if self.on_right {
            [v0.id, v1.id, v2.id]
        } else {
            [v0.id, v2.id, v1.id]
        };
        triangles.push(triangle);
        self.triangle_count += 1;
    }
}

#[cfg(test)]
use crate::math::point;

#[test]
fn test_monotone_triangle() {
    let mut triangles = Vec::new();
    let mut tri = MonotoneTriangulator::new(point(0.0, 0.0), VertexId(0), 0.0);
    tri.process_vert(point(1.0, 0.5), VertexId(1), true, false, &mut triangles);
    tri.process_vert(point(0.2, 1.0), VertexId(2), true, true, &mut triangles);
    assert_eq!(tri.num_triangles(), 1);
    assert_eq!(triangles, vec![[VertexId(2), VertexId(0), VertexId(1)]]);
}

#[test]
fn test_monotone_alternating_sides() {
    let mut triangles = Vec::new();
    let mut tri = MonotoneTriangulator::new(point(0.0, 0.0), VertexId(0), 0.0);
    tri.process_vert(point(1.0, 0.2), VertexId(1), true, false, &mut triangles);
    tri.process_vert(point(-0.5, 0.4), VertexId(2), false, false, &mut triangles);
    tri.process_vert(point(1.2, 0.6), VertexId(3), true, false, &mut triangles);
    tri.process_vert(point(-0.2, 0.8), VertexId(4), false, false, &mut triangles);
    tri.process_vert(point(0.5, 1.0), VertexId(5), true, true, &mut triangles);
    assert_eq!(tri.num_triangles(), 4);
    assert_eq!(triangles.len(), 4);
}

#[test]
fn test_monotone_convex_right_chain() {
    let mut triangles = Vec::new();
    let mut tri = MonotoneTriangulator::new(point(0.0, 0.0), VertexId(0), 0.0);
    tri.process_vert(point(2.0, 0.5), VertexId(1), true, false, &mut triangles);
    tri.process_vert(point(2.5, 1.5), VertexId(2), true, false, &mut triangles);
    tri.process_vert(point(0.0, 2.0), VertexId(3), false, true, &mut triangles);
    assert_eq!(tri.num_triangles(), 2);
    // The convex corner is clipped as soon as the chain allows it.
    assert_eq!(triangles[0], [VertexId(2), VertexId(0), VertexId(1)]);
}

#[test]
fn test_monotone_reflex_left_chain() {
    // A reflex left chain cannot emit anything until the far side arrives.
    let mut triangles = Vec::new();
    let mut tri = MonotoneTriangulator::new(point(0.0, 0.0), VertexId(0), 0.0);
    tri.process_vert(point(-0.2, 0.3), VertexId(1), false, false, &mut triangles);
    tri.process_vert(point(-1.0, 0.6), VertexId(2), false, false, &mut triangles);
    assert_eq!(tri.num_triangles(), 0);
    tri.process_vert(point(1.0, 1.0), VertexId(3), true, false, &mut triangles);
    tri.process_vert(point(0.0, 1.5), VertexId(4), false, true, &mut triangles);
    assert_eq!(tri.num_triangles(), 3);
}
