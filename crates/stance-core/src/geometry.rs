//! Planar geometry for joint-angle computation.

use nalgebra::Point2;

/// Angle at `vertex` between the rays towards `start` and `end`, in whole
/// degrees.
///
/// The polar angles of both rays are subtracted, the magnitude is reflected
/// into `[0, 180]` (`360 - a` when `a > 180`) and truncated. Coincident
/// points are not guarded: `atan2(0, 0)` is zero, so a degenerate triple
/// yields 0.
pub fn joint_angle(start: Point2<f64>, vertex: Point2<f64>, end: Point2<f64>) -> i32 {
    let to_end = end - vertex;
    let to_start = start - vertex;

    let rad = to_end.y.atan2(to_end.x) - to_start.y.atan2(to_start.x);
    let deg = rad.to_degrees().abs();

    let reflected = if deg > 180.0 { 360.0 - deg } else { deg };
    reflected as i32
}

/// Horizontal distance between two points
pub fn horizontal_separation(a: Point2<f64>, b: Point2<f64>) -> f64 {
    (a.x - b.x).abs()
}
