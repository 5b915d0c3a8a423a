use std::sync::Arc;

use serde::{ Serialize, Deserialize };
use rand::Rng;

use crate::vector::{ Vector3, Vector4 };
use crate::object::{ Object, Material };
use crate::light::{ Light, PointLight };
use crate::color::Color;
use crate::camera::Camera;
use crate::error::{ RenderError, RenderResult };

/// A scene: objects, lights and the active camera.
///
/// Objects and lights are kept in insertion order. When two objects are hit
/// at exactly the same distance, the later one in insertion order wins the
/// shading; otherwise the nearest hit always wins.
pub struct Scene {
    pub objects: Vec<Object>,
    pub lights: Vec<Light>,
    pub camera: Arc<Camera>,
}

impl Scene {
    pub fn new(camera: Arc<Camera>) -> Scene {
        Scene {
            objects: Vec::new(),
            lights: Vec::new(),
            camera,
        }
    }

    /// Traces the camera ray through raster pixel `(x, y)`.
    ///
    /// Every object is tested against a single ray whose `t_max` narrows as
    /// closer hits are found, so each test compares against the current
    /// global minimum. The object owning the minimal hit distance is
    /// retained explicitly and shaded after the full loop; with no hit the
    /// pixel is black.
    ///
    /// All lights contribute additively to the final color.
    pub fn trace(&self, x: u32, y: u32) -> Color {
        let mut ray = self.camera.raster_to_ray(x, y);

        let mut nearest: Option<&Object> = None;
        for object in self.objects.iter() {
            if let Some(t) = object.intersect(&ray) {
                ray.clamp_max(t);
                nearest = Some(object);
            }
        }

        let object = match nearest {
            Some(object) => object,
            None => return Color::black(),
        };

        let mut color = Color::black();
        for light in self.lights.iter() {
            color += light.compute(object, &ray);
        }

        color
    }

    /// The built-in demonstration scene: four spheres under a single white
    /// point light.
    pub fn demo(camera: Arc<Camera>) -> Scene {
        let mut scene = Scene::new(camera);

        scene.objects.push(
            Object::sphere(Vector3::new(0.0, 0.0, -10.0), 2.5)
                .with_color(Color::rgb(0.9, 0.3, 0.3)));
        scene.objects.push(
            Object::sphere(Vector3::new(4.0, 0.0, -12.0), 1.5)
                .with_color(Color::rgb(0.3, 0.9, 0.3)));
        scene.objects.push(
            Object::sphere(Vector3::new(-4.0, 2.0, -10.0), 2.0)
                .with_color(Color::rgb(0.3, 0.3, 0.9)));
        scene.objects.push(
            Object::sphere(Vector3::new(0.0, 6.0, -10.0), 3.0)
                .with_color(Color::rgb(0.9, 0.9, 0.3)));

        scene.lights.push(Light::Point(
            PointLight::white(Vector3::new(0.0, 4.0, 0.0), 50.0)));

        scene
    }

    /// Generates a random scene from an injectable generator.
    ///
    /// Scene construction is deterministic for a given generator state, so a
    /// seeded run is reproducible bit-for-bit.
    pub fn random<R: Rng>(camera: Arc<Camera>, rng: &mut R,
        object_count: usize) -> Scene {
        let mut scene = Scene::new(camera);

        for _ in 0..object_count {
            let center = Vector3::new(
                rng.gen_range(-8.0..8.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-18.0..-6.0),
            );
            let color = Color::rgb(
                rng.gen_range(0.2..1.0),
                rng.gen_range(0.2..1.0),
                rng.gen_range(0.2..1.0),
            );

            if rng.gen_bool(0.75) {
                let radius = rng.gen_range(0.5..2.5);
                scene.objects.push(
                    Object::sphere(center, radius).with_color(color));
            } else {
                let half = Vector3::new(
                    rng.gen_range(0.5..1.5),
                    rng.gen_range(0.5..1.5),
                    rng.gen_range(0.5..1.5),
                );
                scene.objects.push(
                    Object::box3(center - half, center + half)
                        .with_color(color));
            }
        }

        let light_position = Vector3::new(
            rng.gen_range(-5.0..5.0),
            rng.gen_range(2.0..8.0),
            rng.gen_range(-4.0..4.0),
        );
        scene.lights.push(Light::Point(
            PointLight::white(light_position, 60.0)));

        scene
    }

    /// Builds a scene from a parsed description.
    pub fn from_description(desc: SceneDescription)
        -> RenderResult<(Scene, Arc<Camera>)> {
        let camera = Arc::new(Camera::new(
            desc.camera.width,
            desc.camera.height,
            desc.camera.fov_degrees,
        ));

        let mut scene = Scene::new(Arc::clone(&camera));

        for object_desc in desc.objects.into_iter() {
            scene.objects.push(object_desc.build()?);
        }

        for light_desc in desc.lights.into_iter() {
            scene.lights.push(light_desc.build()?);
        }

        Ok((scene, camera))
    }
}

/// A serializable scene description.
///
/// The value-object form of a scene: a front end reads one of these from a
/// JSON file instead of hardcoding shapes in code.
#[derive(Serialize, Deserialize)]
pub struct SceneDescription {
    pub camera: CameraDescription,
    pub objects: Vec<ObjectDescription>,
    pub lights: Vec<LightDescription>,
}

impl SceneDescription {
    pub fn from_json(json: &str) -> RenderResult<SceneDescription> {
        serde_json::from_str(json)
            .map_err(|e| RenderError::SceneDescription(e.to_string()))
    }
}

#[derive(Serialize, Deserialize)]
pub struct CameraDescription {
    pub width: u32,
    pub height: u32,
    pub fov_degrees: f64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ObjectDescription {
    ty: String,

    /// Sphere parameters.
    center: Option<Vec<f64>>,
    radius: Option<f64>,

    /// Box parameters.
    min: Option<Vec<f64>>,
    max: Option<Vec<f64>>,

    color: Vec<f64>,
    material: Option<MaterialDescription>,
}

#[derive(Copy, Clone, Serialize, Deserialize)]
pub struct MaterialDescription {
    ambient: [f64; 4],
    diffuse: [f64; 4],
    specular: [f64; 4],
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LightDescription {
    ty: String,
    position: Vec<f64>,
    attenuation: Vec<f64>,
    range: f64,
    ambient: [f64; 4],
    diffuse: [f64; 4],
    specular: [f64; 4],
}

fn vec3(components: &[f64], what: &str) -> RenderResult<Vector3> {
    if components.len() != 3 {
        return Err(RenderError::SceneDescription(format!(
            "{} needs 3 components, found {}", what, components.len())));
    }

    Ok(Vector3::new(components[0], components[1], components[2]))
}

impl ObjectDescription {
    fn build(self) -> RenderResult<Object> {
        let mut object = match self.ty.as_str() {
            "sphere" => {
                let center = self.center.as_ref().ok_or_else(||
                    RenderError::SceneDescription(
                        "sphere is missing its center".into()))?;
                let radius = self.radius.ok_or_else(||
                    RenderError::SceneDescription(
                        "sphere is missing its radius".into()))?;

                Object::sphere(vec3(center, "sphere center")?, radius)
            },

            "box" => {
                let min = self.min.as_ref().ok_or_else(||
                    RenderError::SceneDescription(
                        "box is missing its min corner".into()))?;
                let max = self.max.as_ref().ok_or_else(||
                    RenderError::SceneDescription(
                        "box is missing its max corner".into()))?;

                Object::box3(vec3(min, "box min")?, vec3(max, "box max")?)
            },

            other => return Err(RenderError::SceneDescription(format!(
                "unrecognized object type: {}", other))),
        };

        object = object.with_color(Color::from(Vector4::new(
            *self.color.get(0).unwrap_or(&1.0),
            *self.color.get(1).unwrap_or(&1.0),
            *self.color.get(2).unwrap_or(&1.0),
            0.0,
        )));

        if let Some(material) = self.material {
            object = object.with_material(Material {
                ambient: array4(&material.ambient),
                diffuse: array4(&material.diffuse),
                specular: array4(&material.specular),
            });
        }

        Ok(object)
    }
}

impl LightDescription {
    fn build(self) -> RenderResult<Light> {
        match self.ty.as_str() {
            "point" => Ok(Light::Point(PointLight::new(
                vec3(&self.position, "light position")?,
                vec3(&self.attenuation, "light attenuation")?,
                self.range,
                array4(&self.ambient),
                array4(&self.diffuse),
                array4(&self.specular),
            ))),

            other => Err(RenderError::SceneDescription(format!(
                "unrecognized light type: {}", other))),
        }
    }
}

fn array4(components: &[f64; 4]) -> Vector4 {
    Vector4::new(components[0], components[1], components[2], components[3])
}

/* Tests */

#[cfg(test)]
mod scene_tests {
    use super::*;

    fn test_camera() -> Arc<Camera> {
        Arc::new(Camera::new(100, 100, 60.0))
    }

    fn center_light() -> Light {
        Light::Point(PointLight::white(Vector3::new(0.0, 0.0, 0.0), 100.0))
    }

    #[test]
    fn trace_miss_is_black() {
        let mut scene = Scene::new(test_camera());
        scene.lights.push(center_light());

        // No objects at all.
        assert_eq!(scene.trace(50, 50), Color::black());
    }

    #[test]
    fn trace_shades_nearest_object_regardless_of_order() {
        let near = Object::sphere(Vector3::new(0.0, 0.0, -5.0), 1.0)
            .with_color(Color::rgb(1.0, 0.0, 0.0));
        let far = Object::sphere(Vector3::new(0.0, 0.0, -12.0), 1.0)
            .with_color(Color::rgb(0.0, 1.0, 0.0));

        // Near object inserted first.
        let mut a = Scene::new(test_camera());
        a.lights.push(center_light());
        a.objects.push(near);
        a.objects.push(far);

        // Near object inserted last.
        let mut b = Scene::new(test_camera());
        b.lights.push(center_light());
        b.objects.push(far);
        b.objects.push(near);

        // Only the near object, as the reference result.
        let mut reference = Scene::new(test_camera());
        reference.lights.push(center_light());
        reference.objects.push(near);

        let expected = reference.trace(50, 50);
        assert_ne!(expected, Color::black());
        assert_eq!(a.trace(50, 50), expected);
        assert_eq!(b.trace(50, 50), expected);
    }

    #[test]
    fn enclosing_box_does_not_steal_shading() {
        let sphere = Object::sphere(Vector3::new(0.0, 0.0, -5.0), 1.5)
            .with_color(Color::rgb(1.0, 0.0, 0.0));
        // A room-sized box surrounding both the camera and the sphere; its
        // exit plane is far behind the sphere hit.
        let room = Object::box3(
            Vector3::new(-50.0, -50.0, -100.0),
            Vector3::new(50.0, 50.0, 50.0),
        ).with_color(Color::rgb(0.0, 1.0, 0.0));

        let mut scene = Scene::new(test_camera());
        scene.lights.push(center_light());
        scene.objects.push(sphere);
        scene.objects.push(room);

        let mut reference = Scene::new(test_camera());
        reference.lights.push(center_light());
        reference.objects.push(sphere);

        let expected = reference.trace(50, 50);
        assert_ne!(expected, Color::black());
        assert_eq!(scene.trace(50, 50), expected);
    }

    #[test]
    fn trace_accumulates_lights_additively() {
        let sphere = Object::sphere(Vector3::new(0.0, 0.0, -5.0), 1.0);

        let mut one = Scene::new(test_camera());
        one.objects.push(sphere);
        one.lights.push(center_light());

        let mut two = Scene::new(test_camera());
        two.objects.push(sphere);
        two.lights.push(center_light());
        two.lights.push(center_light());

        let single = one.trace(50, 50);
        let double = two.trace(50, 50);

        assert_eq!(double, single + single);
    }

    #[test]
    fn trace_without_lights_is_black_on_hit() {
        let mut scene = Scene::new(test_camera());
        scene.objects.push(
            Object::sphere(Vector3::new(0.0, 0.0, -5.0), 1.0));

        assert_eq!(scene.trace(50, 50), Color::black());
    }

    #[test]
    fn demo_scene_has_expected_contents() {
        let scene = Scene::demo(test_camera());

        assert_eq!(scene.objects.len(), 4);
        assert_eq!(scene.lights.len(), 1);
    }

    #[test]
    fn random_scene_is_deterministic_per_seed() {
        use rand::SeedableRng;
        use rand_xoshiro::SplitMix64;

        let mut rng_a = SplitMix64::seed_from_u64(42);
        let mut rng_b = SplitMix64::seed_from_u64(42);

        let a = Scene::random(test_camera(), &mut rng_a, 8);
        let b = Scene::random(test_camera(), &mut rng_b, 8);

        assert_eq!(a.objects, b.objects);
        assert_eq!(a.lights, b.lights);
    }

    #[test]
    fn scene_description_from_json() {
        let json = r#"{
            "camera": { "width": 64, "height": 48, "fov_degrees": 60.0 },
            "objects": [
                {
                    "ty": "sphere",
                    "center": [0.0, 0.0, -10.0],
                    "radius": 2.5,
                    "color": [0.9, 0.3, 0.3]
                },
                {
                    "ty": "box",
                    "min": [-1.0, -1.0, -6.0],
                    "max": [1.0, 1.0, -4.0],
                    "color": [0.3, 0.9, 0.3]
                }
            ],
            "lights": [
                {
                    "ty": "point",
                    "position": [0.0, 4.0, 0.0],
                    "attenuation": [1.0, 0.05, 0.0],
                    "range": 50.0,
                    "ambient": [0.2, 0.2, 0.2, 1.0],
                    "diffuse": [1.0, 1.0, 1.0, 1.0],
                    "specular": [1.0, 1.0, 1.0, 1.0]
                }
            ]
        }"#;

        let desc = SceneDescription::from_json(json).unwrap();
        let (scene, camera) = Scene::from_description(desc).unwrap();

        assert_eq!(camera.width(), 64);
        assert_eq!(scene.objects.len(), 2);
        assert_eq!(scene.lights.len(), 1);
    }

    #[test]
    fn scene_description_rejects_unknown_type() {
        let json = r#"{
            "camera": { "width": 64, "height": 48, "fov_degrees": 60.0 },
            "objects": [
                { "ty": "torus", "color": [1.0, 1.0, 1.0] }
            ],
            "lights": []
        }"#;

        let desc = SceneDescription::from_json(json).unwrap();
        assert!(Scene::from_description(desc).is_err());
    }

    #[test]
    fn scene_description_rejects_bad_json() {
        assert!(SceneDescription::from_json("not json").is_err());
    }
}
