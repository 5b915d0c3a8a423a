use crate::vector::Vector3;

/// The role a ray plays in the trace. Informational only; intersection tests
/// treat both kinds identically.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RayKind {
    Camera,
    Shadow,
}

/// A parametric ray with a bounded valid range.
///
/// The `[t_min, t_max]` interval is the most important invariant in the
/// tracer: exactly one ray flows through every object test for a given
/// pixel, and the trace loop narrows `t_max` as nearer intersections are
/// found. After all objects are tested, `t_max` is the nearest hit distance.
///
/// The inverse direction and per-axis sign bits are computed once at
/// construction and reused by every slab test against this ray, keeping
/// reciprocals out of the per-object hot path.
#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
    pub kind: RayKind,

    pub t_min: f64,
    pub t_max: f64,

    /// Componentwise reciprocal of `direction`.
    pub inv_direction: Vector3,

    /// Per-axis: 1 if the inverse direction component is negative, else 0.
    /// Indexes into a box's `[min, max]` bounds to pick the near plane
    /// without branching.
    pub sign: [usize; 3],
}

impl Ray {
    /// Creates a ray with the full `[0, +inf)` valid range.
    pub fn new(origin: Vector3, direction: Vector3, kind: RayKind) -> Ray {
        Ray::with_range(origin, direction, kind, 0.0, f64::INFINITY)
    }

    /// Creates a ray with an explicit valid range.
    pub fn with_range(origin: Vector3, direction: Vector3, kind: RayKind,
        t_min: f64, t_max: f64) -> Ray {
        let inv_direction = direction.recip();
        let sign = [
            (inv_direction.x < 0.0) as usize,
            (inv_direction.y < 0.0) as usize,
            (inv_direction.z < 0.0) as usize,
        ];

        Ray { origin, direction, kind, t_min, t_max, inv_direction, sign }
    }

    /// Evaluates the ray at parameter `t`.
    pub fn position(&self, t: f64) -> Vector3 {
        self.origin + (self.direction * t)
    }

    /// Narrows the valid range after a closer hit is found.
    ///
    /// `t_max` only ever decreases; attempts to widen the range are ignored.
    pub fn clamp_max(&mut self, t: f64) {
        if t < self.t_max {
            self.t_max = t;
        }
    }
}

/* Tests */

#[test]
fn ray_position() {
    let r = Ray::new(
        Vector3::new(2.0, 3.0, 4.0),
        Vector3::new(1.0, 0.0, 0.0),
        RayKind::Camera,
    );

    assert_eq!(r.position(0.0), Vector3::new(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Vector3::new(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Vector3::new(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Vector3::new(4.5, 3.0, 4.0));
}

#[test]
fn ray_precomputes_inverse() {
    let r = Ray::new(
        Vector3::zero(),
        Vector3::new(2.0, -4.0, 0.5),
        RayKind::Camera,
    );

    assert_eq!(r.inv_direction, Vector3::new(0.5, -0.25, 2.0));
    assert_eq!(r.sign, [0, 1, 0]);
}

#[test]
fn ray_sign_for_axis_aligned_direction() {
    // A zero component becomes an infinite reciprocal, which is positive.
    let r = Ray::new(
        Vector3::zero(),
        Vector3::new(0.0, 0.0, -1.0),
        RayKind::Camera,
    );

    assert_eq!(r.sign, [0, 0, 1]);
}

#[test]
fn ray_clamp_max_narrows_only() {
    let mut r = Ray::new(
        Vector3::zero(),
        Vector3::new(0.0, 0.0, -1.0),
        RayKind::Camera,
    );

    r.clamp_max(7.5);
    assert_eq!(r.t_max, 7.5);

    r.clamp_max(10.0);
    assert_eq!(r.t_max, 7.5);
}

#[test]
fn ray_default_range() {
    let r = Ray::new(Vector3::zero(), Vector3::new(1.0, 0.0, 0.0),
        RayKind::Shadow);

    assert_eq!(r.t_min, 0.0);
    assert!(r.t_max.is_infinite());
}
