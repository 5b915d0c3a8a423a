use crate::vector::Vector3;
use crate::ray::{ Ray, RayKind };

/// A perspective camera.
///
/// Maps discrete raster coordinates to world-space view rays. The field of
/// view is carried as a precomputed scale, `tan(fov_y / 2)`, which sets the
/// extent of the visible frustum at the near plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    width: u32,
    height: u32,
    aspect_ratio: f64,
    fov_scale: f64,

    pub position: Vector3,
    pub forward: Vector3,
}

impl Camera {
    /// Creates a camera for a `width` by `height` viewport.
    ///
    /// `fov_degrees` is the full vertical viewing angle.
    pub fn new(width: u32, height: u32, fov_degrees: f64) -> Camera {
        let fov_scale = (fov_degrees * 0.5).to_radians().tan();

        Camera {
            width,
            height,
            aspect_ratio: width as f64 / height as f64,
            fov_scale,
            position: Vector3::zero(),
            forward: Vector3::new(0.0, 0.0, -1.0),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the view ray through the center of raster pixel `(x, y)`.
    ///
    /// The pixel center is remapped to normalized device coordinates in
    /// `[-1, 1]` with +y up, the x axis scaled by the aspect ratio and field
    /// of view, and the y axis by the field of view alone. The direction runs
    /// from the camera position through the resulting point on the z = -1
    /// plane. Increasing `x` maps rightward and increasing `y` maps upward in
    /// camera space.
    pub fn raster_to_ray(&self, x: u32, y: u32) -> Ray {
        let f_width = self.width as f64;
        let f_height = self.height as f64;

        let mut screen_x = (2.0 * (x as f64 + 0.5) / f_width) - 1.0;
        screen_x *= self.fov_scale * self.aspect_ratio;

        let mut screen_y = 1.0 - (2.0 * (y as f64 + 0.5) / f_height);
        screen_y *= self.fov_scale;

        let direction = Vector3::new(screen_x, screen_y, -1.0).normalize();

        Ray::new(self.position, direction, RayKind::Camera)
    }
}

/* Tests */

#[test]
fn center_pixel_looks_forward() {
    let c = Camera::new(101, 101, 60.0);
    let r = c.raster_to_ray(50, 50);

    assert_eq!(r.origin, Vector3::zero());
    assert_eq!(r.direction, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn increasing_x_maps_rightward() {
    let c = Camera::new(100, 100, 60.0);

    let left = c.raster_to_ray(10, 50);
    let right = c.raster_to_ray(90, 50);

    assert!(left.direction.x < 0.0);
    assert!(right.direction.x > 0.0);
    assert!(left.direction.x < right.direction.x);
}

#[test]
fn increasing_y_maps_upward_in_camera_space() {
    // Raster y grows downward, so a smaller raster y is higher in the world.
    let c = Camera::new(100, 100, 60.0);

    let top = c.raster_to_ray(50, 10);
    let bottom = c.raster_to_ray(50, 90);

    assert!(top.direction.y > 0.0);
    assert!(bottom.direction.y < 0.0);
}

#[test]
fn wider_fov_widens_frustum() {
    let narrow = Camera::new(100, 100, 30.0);
    let wide = Camera::new(100, 100, 90.0);

    let edge_narrow = narrow.raster_to_ray(99, 50);
    let edge_wide = wide.raster_to_ray(99, 50);

    assert!(edge_wide.direction.x > edge_narrow.direction.x);
}

#[test]
fn aspect_ratio_scales_x() {
    let wide = Camera::new(200, 100, 60.0);
    let square = Camera::new(100, 100, 60.0);

    let edge_wide = wide.raster_to_ray(199, 50);
    let edge_square = square.raster_to_ray(99, 50);

    assert!(edge_wide.direction.x > edge_square.direction.x);
}

#[test]
fn rays_are_unit_length() {
    let c = Camera::new(64, 48, 60.0);

    for &(x, y) in [(0, 0), (63, 47), (32, 24), (0, 47)].iter() {
        let r = c.raster_to_ray(x, y);
        assert!(crate::feq(r.direction.length(), 1.0));
    }
}
