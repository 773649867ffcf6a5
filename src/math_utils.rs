//! Math helpers for the sweep and the monotone triangulator.

use crate::math::Point;

/// Ratio of the largest absolute input coordinate used as the default
/// precision when the caller does not provide one.
pub(crate) const DEFAULT_PRECISION_RATIO: f32 = 1e-5;

/// ε-tolerant orientation test.
///
/// Returns `1` if the triangle `p0 p1 p2` is counter-clockwise by more than
/// `tol`, `-1` if it is clockwise by more than `tol`, and `0` otherwise.
///
/// The comparison is scale-invariant: the signed area is measured against
/// `tol` times the longest of the two edge lengths out of `p0`, so scaling
/// all points and `tol` by the same factor does not change the result. A
/// return of `0` is the only way ambiguity is expressed; every caller must
/// tolerate it.
pub fn ccw(p0: Point, p1: Point, p2: Point, tol: f32) -> i32 {
    let v1 = p1 - p0;
    let v2 = p2 - p0;
    let area = v1.cross(v2);
    let base2 = v1.square_length().max(v2.square_length());
    if area * area <= base2 * tol * tol {
        0
    } else if area > 0.0 {
        1
    } else {
        -1
    }
}

#[cfg(test)]
use crate::math::point;

#[test]
fn test_ccw() {
    let a = point(0.0, 0.0);
    let b = point(1.0, 0.0);
    let c = point(0.0, 1.0);

    assert_eq!(ccw(a, b, c, 0.0), 1);
    assert_eq!(ccw(a, c, b, 0.0), -1);
    assert_eq!(ccw(a, b, point(2.0, 0.0), 0.0), 0);
}

#[test]
fn test_ccw_tolerance() {
    let a = point(0.0, 0.0);
    let b = point(1.0, 0.0);

    // A sliver just above the baseline: certain without tolerance,
    // ambiguous with it.
    let sliver = point(0.5, 1e-3);
    assert_eq!(ccw(a, b, sliver, 0.0), 1);
    assert_eq!(ccw(a, b, sliver, 1e-2), 0);
    assert_eq!(ccw(b, a, sliver, 1e-2), 0);
}

#[test]
fn test_ccw_scale_invariance() {
    let a = point(0.0, 0.0);
    let b = point(1.0, 0.0);
    let c = point(0.5, 1e-3);

    for &scale in &[1e-3_f32, 1.0, 1e3] {
        let s = |p: Point| point(p.x * scale, p.y * scale);
        assert_eq!(ccw(s(a), s(b), s(c), 1e-2 * scale), 0);
        assert_eq!(ccw(s(a), s(b), s(c), 1e-4 * scale), 1);
    }
}
