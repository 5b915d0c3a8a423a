use crate::vector::Vector3;
use crate::matrix::Matrix44;

/// Transforms a point by an affine matrix.
///
/// Row-vector convention: the point is multiplied on the left of the matrix,
/// so the translation components in the bottom row apply. If the resulting
/// homogeneous coordinate is neither `0` nor `1`, the x/y/z components are
/// divided by it before returning.
pub fn transform_point(vec: &Vector3, mat: &Matrix44) -> Vector3 {
    let mut x = vec.x * mat[(0, 0)] + vec.y * mat[(1, 0)] + vec.z * mat[(2, 0)] + mat[(3, 0)];
    let mut y = vec.x * mat[(0, 1)] + vec.y * mat[(1, 1)] + vec.z * mat[(2, 1)] + mat[(3, 1)];
    let mut z = vec.x * mat[(0, 2)] + vec.y * mat[(1, 2)] + vec.z * mat[(2, 2)] + mat[(3, 2)];
    let w = vec.x * mat[(0, 3)] + vec.y * mat[(1, 3)] + vec.z * mat[(2, 3)] + mat[(3, 3)];

    if w != 0.0 && w != 1.0 {
        let inv_w = 1.0 / w;
        x *= inv_w;
        y *= inv_w;
        z *= inv_w;
    }

    Vector3::new(x, y, z)
}

/// Transforms a direction by the rotational/scaling part of a matrix.
///
/// Only the upper 3x3 block participates; translation does not apply to
/// directions, and no homogeneous divide is performed.
pub fn transform_direction(vec: &Vector3, mat: &Matrix44) -> Vector3 {
    Vector3::new(
        vec.x * mat[(0, 0)] + vec.y * mat[(1, 0)] + vec.z * mat[(2, 0)],
        vec.x * mat[(0, 1)] + vec.y * mat[(1, 1)] + vec.z * mat[(2, 1)],
        vec.x * mat[(0, 2)] + vec.y * mat[(1, 2)] + vec.z * mat[(2, 2)],
    )
}

/// Solves `a*t^2 + b*t + c = 0` for real roots.
///
/// Returns `None` when the discriminant is negative (no real roots). A zero
/// discriminant yields a repeated root. Roots are returned in ascending
/// order.
///
/// The nonzero-discriminant case uses the form
/// `q = -0.5 * (b + sign(b) * sqrt(disc))`, `t0 = q / a`, `t1 = c / q`,
/// which avoids catastrophic cancellation when `b` and `sqrt(disc)` are
/// close in magnitude and share a sign.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return None;
    }

    let (mut t0, mut t1);
    if discriminant == 0.0 {
        t0 = -0.5 * b / a;
        t1 = t0;
    } else {
        let q = if b > 0.0 {
            -0.5 * (b + discriminant.sqrt())
        } else {
            -0.5 * (b - discriminant.sqrt())
        };

        t0 = q / a;
        t1 = c / q;
    }

    if t0 > t1 {
        std::mem::swap(&mut t0, &mut t1);
    }

    Some((t0, t1))
}

/* Tests */

#[test]
fn quadratic_two_roots() {
    let (t0, t1) = solve_quadratic(1.0, 0.0, -4.0).unwrap();

    assert_eq!(t0, -2.0);
    assert_eq!(t1, 2.0);
}

#[test]
fn quadratic_repeated_root() {
    let (t0, t1) = solve_quadratic(1.0, 2.0, 1.0).unwrap();

    assert_eq!(t0, -1.0);
    assert_eq!(t1, -1.0);
}

#[test]
fn quadratic_no_real_roots() {
    assert_eq!(solve_quadratic(1.0, 0.0, 1.0), None);
}

#[test]
fn quadratic_roots_ascending() {
    let (t0, t1) = solve_quadratic(1.0, -5.0, 6.0).unwrap();

    assert!(t0 <= t1);
    assert!(crate::feq(t0, 2.0));
    assert!(crate::feq(t1, 3.0));
}

#[test]
fn transform_point_translates() {
    let m = Matrix44::translation(5.0, -3.0, 2.0);
    let p = Vector3::new(-3.0, 4.0, 5.0);

    assert_eq!(transform_point(&p, &m), Vector3::new(2.0, 1.0, 7.0));
}

#[test]
fn transform_direction_ignores_translation() {
    let m = Matrix44::translation(5.0, -3.0, 2.0);
    let v = Vector3::new(-3.0, 4.0, 5.0);

    assert_eq!(transform_direction(&v, &m), v);
}

#[test]
fn transform_point_scales() {
    let m = Matrix44::scaling(2.0, 3.0, 4.0);
    let p = Vector3::new(1.0, 1.0, 1.0);

    assert_eq!(transform_point(&p, &m), Vector3::new(2.0, 3.0, 4.0));
}

#[test]
fn transform_point_homogeneous_divide() {
    // Last column scales w by 2, so components are halved on the way out.
    let mut m = Matrix44::identity();
    m[(3, 3)] = 2.0;
    let p = Vector3::new(2.0, 4.0, 6.0);

    assert_eq!(transform_point(&p, &m), Vector3::new(1.0, 2.0, 3.0));
}

#[test]
fn transform_point_rotates() {
    let m = Matrix44::rotation_z(std::f64::consts::PI / 2.0);
    let p = Vector3::new(1.0, 0.0, 0.0);

    assert_eq!(transform_point(&p, &m), Vector3::new(0.0, 1.0, 0.0));
}
