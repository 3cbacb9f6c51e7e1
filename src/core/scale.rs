//! Scale/easing helpers for the cube's "breathing" transform.
//!
//! While a face rotates away from flat the whole cube shrinks slightly and
//! grows back as the next face lands.

/// Scale range as `[flat, edge]`: the scale at a flat orientation and at the
/// 45° midpoint between two faces.
pub type ScaleRange = [f64; 2];

pub const DEFAULT_SCALE_RANGE: ScaleRange = [1.0, 0.95];

/// Map `a` linearly onto `b`.  Extrapolates outside `a`.
pub fn linear_conversion(a: [f64; 2], b: [f64; 2]) -> impl Fn(f64) -> f64 {
    let from = a[1] - a[0];
    let to = b[1] - b[0];
    move |x| (x - a[0]) * to / from + b[0]
}

/// Circular ease-in over `[0, 1]`.
pub fn circ(t: f64) -> f64 {
    1.0 - t.clamp(-1.0, 1.0).acos().sin()
}

/// Cube scale for a rotation of `angle` degrees.
pub fn scale_for_angle(angle: f64, range: ScaleRange) -> f64 {
    let diff = angle.abs() % 90.0;
    if diff == 0.0 {
        return range[0];
    }

    // Fold both halves of the quarter turn onto `[0.5, 1]`: 1 at a flat
    // face, 0.5 at the midpoint.
    let fold = if diff > 45.0 {
        linear_conversion([90.0, 45.0], [1.0, 0.5])
    } else {
        linear_conversion([45.0, 0.0], [0.5, 1.0])
    };
    let fold = fold(diff);

    let eased = circ(fold);
    let scale = linear_conversion([circ(1.0), circ(0.5)], range);
    scale(eased)
}
