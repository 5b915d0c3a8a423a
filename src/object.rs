use crate::vector::{ Vector3, Vector4 };
use crate::matrix::Matrix44;
use crate::math::{ transform_point, transform_direction };
use crate::math::solve_quadratic;
use crate::ray::Ray;
use crate::color::Color;
use crate::error::RenderError;
use crate::consts::FACE_EPSILON;

/// A Phong material record.
///
/// Ambient, diffuse and specular coefficients are stored as `Vector4`
/// channel multipliers. The specular exponent (shininess) lives in the
/// otherwise-unused `w` component of the specular coefficient.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub ambient: Vector4,
    pub diffuse: Vector4,
    pub specular: Vector4,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            ambient: Vector4::new(0.1, 0.1, 0.1, 1.0),
            diffuse: Vector4::new(0.9, 0.9, 0.9, 1.0),
            specular: Vector4::new(0.9, 0.9, 0.9, 200.0),
        }
    }
}

/// The geometric primitives the tracer understands.
///
/// A closed set rather than a trait hierarchy: the per-pixel intersection
/// loop dispatches with a match, which keeps v-table indirection out of the
/// hot path and lets the compiler check exhaustiveness.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Primitive {
    Sphere {
        center: Vector3,
        radius: f64,
    },

    /// An axis-aligned box, stored as `[min, max]` corner bounds so a ray's
    /// sign bits can index the near/far plane per axis.
    Box3 {
        bounds: [Vector3; 2],
    },
}

/// A scene object: a primitive with a world transform, a material and a flat
/// display color.
///
/// The inverse of the world transform is cached at construction; rays are
/// mapped into object space with it when the transform is not the identity.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Object {
    pub primitive: Primitive,
    pub material: Material,
    pub color: Color,

    transform: Matrix44,
    inv_transform: Matrix44,
    has_transform: bool,
}

impl Object {
    /// Creates a sphere with the identity transform.
    pub fn sphere(center: Vector3, radius: f64) -> Object {
        Object {
            primitive: Primitive::Sphere { center, radius },
            material: Default::default(),
            color: Color::white(),
            transform: Matrix44::identity(),
            inv_transform: Matrix44::identity(),
            has_transform: false,
        }
    }

    /// Creates an axis-aligned box with the identity transform.
    pub fn box3(min: Vector3, max: Vector3) -> Object {
        Object {
            primitive: Primitive::Box3 { bounds: [min, max] },
            material: Default::default(),
            color: Color::white(),
            transform: Matrix44::identity(),
            inv_transform: Matrix44::identity(),
            has_transform: false,
        }
    }

    pub fn with_material(mut self, material: Material) -> Object {
        self.material = material;
        self
    }

    pub fn with_color(mut self, color: Color) -> Object {
        self.color = color;
        self
    }

    /// Attaches a world transform, caching its inverse.
    ///
    /// Singular transforms cannot be inverted for ray mapping and are
    /// rejected rather than left to produce NaN geometry.
    pub fn with_transform(mut self, transform: Matrix44)
        -> Result<Object, RenderError> {
        let inv = transform.inverse().ok_or(RenderError::SingularTransform)?;

        self.transform = transform;
        self.inv_transform = inv;
        self.has_transform = true;

        Ok(self)
    }

    pub fn transform(&self) -> &Matrix44 {
        &self.transform
    }

    /// Tests this object against a ray, without modifying the ray.
    ///
    /// Returns the nearest hit distance within the ray's `[t_min, t_max]`
    /// interval, or `None` on a miss. The caller folds these distances over
    /// all objects, keeping the minimum and its owning object, then narrows
    /// the ray's `t_max` itself.
    ///
    /// A root behind `t_min` does not count as a hit; if the near root of a
    /// sphere is behind the origin but the far root is in range (the origin
    /// is inside the sphere), the far root is used.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        if self.has_transform {
            let local = Ray::with_range(
                transform_point(&ray.origin, &self.inv_transform),
                transform_direction(&ray.direction, &self.inv_transform),
                ray.kind,
                ray.t_min,
                ray.t_max,
            );

            // The direction is deliberately not renormalized, so the hit
            // parameter is the same in object space and world space.
            self.intersect_local(&local)
        } else {
            self.intersect_local(ray)
        }
    }

    fn intersect_local(&self, ray: &Ray) -> Option<f64> {
        match self.primitive {
            Primitive::Sphere { center, radius } =>
                intersect_sphere(ray, &center, radius),
            Primitive::Box3 { ref bounds } =>
                intersect_box(ray, bounds),
        }
    }

    /// Computes the outward surface normal at a point on this object.
    ///
    /// The point is assumed to lie on the surface (up to floating error).
    /// For transformed objects the normal is computed in object space and
    /// mapped back through the inverse-transpose, then renormalized.
    pub fn surface_normal(&self, point: &Vector3) -> Vector3 {
        let local_point = if self.has_transform {
            transform_point(point, &self.inv_transform)
        } else {
            *point
        };

        let local_normal = match self.primitive {
            Primitive::Sphere { center, radius } =>
                (local_point - center) / radius,
            Primitive::Box3 { ref bounds } =>
                box_normal(&local_point, bounds),
        };

        if self.has_transform {
            let inv_t = self.inv_transform.transposition();
            transform_direction(&local_normal, &inv_t).normalize()
        } else {
            local_normal
        }
    }
}

fn intersect_sphere(ray: &Ray, center: &Vector3, radius: f64) -> Option<f64> {
    let l = ray.origin - *center;

    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * ray.direction.dot(&l);
    let c = l.dot(&l) - radius * radius;

    let (t0, t1) = solve_quadratic(a, b, c)?;

    if t0 >= ray.t_min && t0 <= ray.t_max {
        Some(t0)
    } else if t1 >= ray.t_min && t1 <= ray.t_max {
        Some(t1)
    } else {
        None
    }
}

/// The slab method. The ray's precomputed sign bits select which bound plane
/// is "near" per axis, so no per-axis comparison branches are needed. The x
/// and y slabs are intersected first, rejecting early when they do not
/// overlap, before the z slab narrows the interval further.
fn intersect_box(ray: &Ray, bounds: &[Vector3; 2]) -> Option<f64> {
    let mut t_min = (bounds[ray.sign[0]].x - ray.origin.x) * ray.inv_direction.x;
    let mut t_max = (bounds[1 - ray.sign[0]].x - ray.origin.x) * ray.inv_direction.x;
    let ty_min = (bounds[ray.sign[1]].y - ray.origin.y) * ray.inv_direction.y;
    let ty_max = (bounds[1 - ray.sign[1]].y - ray.origin.y) * ray.inv_direction.y;

    if t_min > ty_max || ty_min > t_max {
        return None;
    }

    if ty_min > t_min {
        t_min = ty_min;
    }
    if ty_max < t_max {
        t_max = ty_max;
    }

    let tz_min = (bounds[ray.sign[2]].z - ray.origin.z) * ray.inv_direction.z;
    let tz_max = (bounds[1 - ray.sign[2]].z - ray.origin.z) * ray.inv_direction.z;

    if t_min > tz_max || tz_min > t_max {
        return None;
    }

    if tz_min > t_min {
        t_min = tz_min;
    }
    if tz_max < t_max {
        t_max = tz_max;
    }

    // The surviving slab interval must overlap the ray's valid range.
    if t_min > ray.t_max || t_max < ray.t_min {
        return None;
    }

    if t_min >= ray.t_min {
        Some(t_min)
    } else if t_max <= ray.t_max {
        // Entry plane is behind the origin; the ray starts inside the box.
        Some(t_max)
    } else {
        // Inside the box, but the exit plane lies beyond an already-found
        // nearer hit.
        None
    }
}

/// Normal for a point on a box surface, derived from which face the point
/// lies on. Each axis is checked against both bound planes; if floating
/// error leaves no face within epsilon, the closest face wins.
fn box_normal(point: &Vector3, bounds: &[Vector3; 2]) -> Vector3 {
    let mut best_axis = 0;
    let mut best_side = 0;
    let mut best_dist = f64::INFINITY;

    for axis in 0..3 {
        for side in 0..2 {
            let dist = (point[axis] - bounds[side][axis]).abs();
            if dist < best_dist {
                best_dist = dist;
                best_axis = axis;
                best_side = side;
            }
        }
    }

    debug_assert!(best_dist < FACE_EPSILON,
        "point is not on the box surface");

    let magnitude = if best_side == 0 { -1.0 } else { 1.0 };
    match best_axis {
        0 => Vector3::new(magnitude, 0.0, 0.0),
        1 => Vector3::new(0.0, magnitude, 0.0),
        _ => Vector3::new(0.0, 0.0, magnitude),
    }
}

/* Tests */

#[cfg(test)]
use crate::ray::RayKind;

#[test]
fn sphere_intersect_head_on() {
    let s = Object::sphere(Vector3::new(0.0, 0.0, -10.0), 2.5);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0),
        RayKind::Camera);

    let t = s.intersect(&r).unwrap();
    assert!(crate::feq(t, 7.5));
}

#[test]
fn sphere_intersect_miss() {
    let s = Object::sphere(Vector3::new(0.0, 0.0, -10.0), 2.5);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0),
        RayKind::Camera);

    assert_eq!(s.intersect(&r), None);
}

#[test]
fn sphere_behind_origin_is_not_hit() {
    // Both roots are negative: the sphere is entirely behind the ray.
    let s = Object::sphere(Vector3::new(0.0, 0.0, -10.0), 2.5);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0),
        RayKind::Camera);

    assert_eq!(s.intersect(&r), None);
}

#[test]
fn sphere_origin_inside_uses_far_root() {
    let s = Object::sphere(Vector3::zero(), 2.0);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0),
        RayKind::Camera);

    let t = s.intersect(&r).unwrap();
    assert!(crate::feq(t, 2.0));
}

#[test]
fn sphere_beyond_t_max_is_not_hit() {
    let s = Object::sphere(Vector3::new(0.0, 0.0, -10.0), 2.5);
    let r = Ray::with_range(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0),
        RayKind::Camera, 0.0, 5.0);

    assert_eq!(s.intersect(&r), None);
}

#[test]
fn sphere_normal_points_outward() {
    let s = Object::sphere(Vector3::new(0.0, 0.0, -10.0), 2.5);
    let n = s.surface_normal(&Vector3::new(0.0, 0.0, -7.5));

    assert_eq!(n, Vector3::new(0.0, 0.0, 1.0));
    assert!(crate::feq(n.length(), 1.0));
}

#[test]
fn box_intersect_head_on() {
    let b = Object::box3(
        Vector3::new(-1.0, -1.0, -6.0),
        Vector3::new(1.0, 1.0, -4.0),
    );
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0),
        RayKind::Camera);

    let t = b.intersect(&r).unwrap();
    assert!(crate::feq(t, 4.0));
}

#[test]
fn box_intersect_miss() {
    let b = Object::box3(
        Vector3::new(-1.0, -1.0, -6.0),
        Vector3::new(1.0, 1.0, -4.0),
    );
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0),
        RayKind::Camera);

    assert_eq!(b.intersect(&r), None);
}

#[test]
fn box_intersect_negative_direction() {
    // Sign bits must pick the far bound as the near plane here.
    let b = Object::box3(
        Vector3::new(-1.0, -1.0, 4.0),
        Vector3::new(1.0, 1.0, 6.0),
    );
    let r = Ray::new(Vector3::new(0.0, 0.0, 10.0),
        Vector3::new(0.0, 0.0, -1.0), RayKind::Camera);

    let t = b.intersect(&r).unwrap();
    assert!(crate::feq(t, 4.0));
}

#[test]
fn box_origin_inside_uses_exit_plane() {
    let b = Object::box3(
        Vector3::new(-1.0, -1.0, -1.0),
        Vector3::new(1.0, 1.0, 1.0),
    );
    let r = Ray::new(Vector3::zero(), Vector3::new(1.0, 0.0, 0.0),
        RayKind::Camera);

    let t = b.intersect(&r).unwrap();
    assert!(crate::feq(t, 1.0));
}

#[test]
fn box_exit_plane_beyond_t_max_is_not_hit() {
    // The origin is inside the box, but the ray has already been narrowed
    // to a nearer hit than the box's exit plane.
    let b = Object::box3(
        Vector3::new(-1.0, -1.0, -10.0),
        Vector3::new(1.0, 1.0, 1.0),
    );
    let r = Ray::with_range(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0),
        RayKind::Camera, 0.0, 5.0);

    assert_eq!(b.intersect(&r), None);
}

#[test]
fn box_normal_per_face() {
    let b = Object::box3(
        Vector3::new(-1.0, -1.0, -1.0),
        Vector3::new(1.0, 1.0, 1.0),
    );

    assert_eq!(b.surface_normal(&Vector3::new(1.0, 0.2, 0.3)),
        Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(b.surface_normal(&Vector3::new(-1.0, 0.2, 0.3)),
        Vector3::new(-1.0, 0.0, 0.0));
    assert_eq!(b.surface_normal(&Vector3::new(0.1, 1.0, 0.3)),
        Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(b.surface_normal(&Vector3::new(0.1, 0.2, -1.0)),
        Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn transformed_sphere_intersect() {
    let s = Object::sphere(Vector3::zero(), 1.0)
        .with_transform(Matrix44::translation(0.0, 0.0, -10.0))
        .unwrap();
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0),
        RayKind::Camera);

    let t = s.intersect(&r).unwrap();
    assert!(crate::feq(t, 9.0));
}

#[test]
fn singular_transform_rejected() {
    let res = Object::sphere(Vector3::zero(), 1.0)
        .with_transform(Matrix44::scaling(0.0, 1.0, 1.0));

    assert!(res.is_err());
}
