use crate::vector::{ Vector3, Vector4 };
use crate::ray::Ray;
use crate::object::Object;
use crate::color::Color;

/// The light sources the tracer understands.
///
/// A closed set, dispatched with a match like `Primitive`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Light {
    Point(PointLight),
}

impl Light {
    /// Computes this light's color contribution for the nearest hit encoded
    /// in `ray` (its `t_max` holds the hit distance after the object loop).
    pub fn compute(&self, object: &Object, ray: &Ray) -> Color {
        match self {
            Light::Point(point) => point.compute(object, ray),
        }
    }
}

/// A point light with Phong coefficients, distance attenuation and a hard
/// range cutoff.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vector3,

    /// Constant, linear and quadratic attenuation coefficients, in that
    /// order.
    pub attenuation: Vector3,

    /// Maximum reach. Contact points farther than this receive nothing from
    /// the light; there is no soft falloff past the cutoff.
    pub range: f64,

    pub ambient: Vector4,
    pub diffuse: Vector4,
    pub specular: Vector4,
}

impl PointLight {
    pub fn new(position: Vector3, attenuation: Vector3, range: f64,
        ambient: Vector4, diffuse: Vector4, specular: Vector4) -> PointLight {
        PointLight { position, attenuation, range, ambient, diffuse, specular }
    }

    /// A neutral white light, attenuating linearly with distance.
    pub fn white(position: Vector3, range: f64) -> PointLight {
        PointLight {
            position,
            attenuation: Vector3::new(1.0, 0.05, 0.0),
            range,
            ambient: Vector4::new(0.2, 0.2, 0.2, 1.0),
            diffuse: Vector4::new(1.0, 1.0, 1.0, 1.0),
            specular: Vector4::new(1.0, 1.0, 1.0, 1.0),
        }
    }

    /// Phong point evaluation at the ray's nearest hit.
    ///
    /// No shadow rays are cast; the light is assumed visible from every lit
    /// point. Degenerate eye or light vectors (zero length) contribute black
    /// for this pixel rather than propagating NaN.
    pub fn compute(&self, object: &Object, ray: &Ray) -> Color {
        let contact = ray.position(ray.t_max);

        let to_light = self.position - contact;
        let distance = to_light.length();

        // Hard cutoff: beyond the range the light contributes nothing.
        if distance > self.range {
            return Color::black();
        }

        let normal = object.surface_normal(&contact);
        let eye = match (ray.origin - contact).try_normalize() {
            Some(v) => v,
            None => return Color::black(),
        };
        let light_vec = match to_light.try_normalize() {
            Some(v) => v,
            None => return Color::black(),
        };

        let material = &object.material;
        let ambient = material.ambient.modulate(&self.ambient);

        let mut diffuse = Vector4::default();
        let mut specular = Vector4::default();

        let diffuse_factor = light_vec.dot(&normal).max(0.0);
        if diffuse_factor > 0.0 {
            diffuse = diffuse_factor
                * material.diffuse.modulate(&self.diffuse);

            let reflect = -light_vec
                - 2.0 * normal * light_vec.dot(&normal);
            let spec_factor = reflect.dot(&eye).max(0.0)
                .powf(material.specular.w);
            specular = spec_factor
                * material.specular.modulate(&self.specular);
        }

        // Attenuation divides the diffuse and specular terms; ambient light
        // is not attenuated.
        let falloff = self.attenuation
            .dot(&Vector3::new(1.0, distance, distance * distance));
        let attenuation = 1.0 / falloff;

        let total = ambient
            + diffuse * attenuation
            + specular * attenuation;

        let color = Color::from(total);
        if color.is_degenerate() {
            Color::black()
        } else {
            color
        }
    }
}

/* Tests */

#[cfg(test)]
mod light_tests {
    use super::*;
    use crate::ray::RayKind;
    use crate::object::Object;

    fn lit_sphere_ray() -> (Object, Ray) {
        // Head-on hit at (0, 0, -7.5); the contact normal faces the origin.
        let obj = Object::sphere(Vector3::new(0.0, 0.0, -10.0), 2.5);
        let mut ray = Ray::new(Vector3::zero(),
            Vector3::new(0.0, 0.0, -1.0), RayKind::Camera);
        ray.clamp_max(obj.intersect(&ray).unwrap());

        (obj, ray)
    }

    #[test]
    fn out_of_range_light_is_black() {
        let (obj, ray) = lit_sphere_ray();

        // Contact is (0, 0, -7.5); this light sits 15 away.
        let light = PointLight::white(Vector3::new(0.0, 15.0, -7.5), 10.0);

        assert_eq!(light.compute(&obj, &ray), Color::black());
    }

    #[test]
    fn in_range_light_is_lit() {
        let (obj, ray) = lit_sphere_ray();

        let light = PointLight::white(Vector3::new(0.0, 0.0, -2.5), 10.0);
        let color = light.compute(&obj, &ray);

        assert_ne!(color, Color::black());
        assert!(color.r > 0.0);
    }

    #[test]
    fn surface_facing_away_gets_ambient_only() {
        let (obj, ray) = lit_sphere_ray();

        // Behind the sphere relative to the contact normal.
        let light = PointLight::white(Vector3::new(0.0, 0.0, -12.5), 10.0);
        let color = light.compute(&obj, &ray);

        let expected = Color::from(
            obj.material.ambient.modulate(&light.ambient));
        assert_eq!(color, expected);
    }

    #[test]
    fn closer_light_is_brighter() {
        let (obj, ray) = lit_sphere_ray();

        let near = PointLight::white(Vector3::new(0.0, 0.0, -5.0), 100.0);
        let far = PointLight::white(Vector3::new(0.0, 0.0, -1.0), 100.0);

        let near_color = near.compute(&obj, &ray);
        let far_color = far.compute(&obj, &ray);

        assert!(near_color.r > far_color.r);
    }

    #[test]
    fn ambient_not_attenuated() {
        let (obj, ray) = lit_sphere_ray();

        // Diffuse and specular zeroed out: only ambient light survives, and
        // it must not shrink with distance.
        let mut light = PointLight::white(Vector3::new(0.0, 0.0, -2.6), 100.0);
        light.diffuse = Vector4::default();
        light.specular = Vector4::default();

        let near_color = light.compute(&obj, &ray);

        light.position = Vector3::new(0.0, 0.0, -2.0);
        let far_color = light.compute(&obj, &ray);

        assert_eq!(near_color, far_color);
    }

    #[test]
    fn zero_attenuation_is_contained() {
        let (obj, ray) = lit_sphere_ray();

        // An all-zero attenuation triple makes the falloff divisor zero and
        // the diffuse term infinite; the contribution must collapse to
        // black instead of leaking non-finite channels.
        let mut light = PointLight::white(Vector3::new(0.0, 0.0, -2.5), 10.0);
        light.attenuation = Vector3::zero();

        assert_eq!(light.compute(&obj, &ray), Color::black());
    }

    #[test]
    fn enum_dispatch_matches_direct_call() {
        let (obj, ray) = lit_sphere_ray();

        let point = PointLight::white(Vector3::new(0.0, 0.0, -2.5), 10.0);
        let light = Light::Point(point);

        assert_eq!(light.compute(&obj, &ray), point.compute(&obj, &ray));
    }
}
