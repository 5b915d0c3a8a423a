use std::ops::{ Add, Sub, Neg, Mul, Div, Index };

use crate::feq;

/// A 3D vector.
///
/// Used for positions, directions and surface normals throughout the ray
/// tracer. Components are `f64`, and the type is `Copy`; vectors are treated
/// as immutable values, with every operation producing a new vector.
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Partial equality on two vectors.
///
/// Vectors are compared component-wise, accounting for possible floating
/// point error in comparisons.
impl PartialEq for Vector3 {
    fn eq(&self, other: &Vector3) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3 { x, y, z }
    }

    pub fn zero() -> Vector3 {
        Vector3 { x: 0.0, y: 0.0, z: 0.0 }
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length_squared(&self) -> f64 {
        self.dot(self)
    }

    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Returns the unit vector pointing in this vector's direction.
    ///
    /// The caller guarantees the vector is nonzero; normalizing a zero-length
    /// vector produces NaN components. Use `try_normalize` where the input is
    /// not known to be nonzero.
    pub fn normalize(&self) -> Vector3 {
        let inv = 1.0 / self.length();

        Vector3 {
            x: self.x * inv,
            y: self.y * inv,
            z: self.z * inv,
        }
    }

    /// Normalizes this vector, returning `None` if it has zero length.
    ///
    /// This is the checked counterpart of `normalize`; the shading path uses
    /// it so that a degenerate direction affects only the pixel being traced
    /// instead of propagating NaN through the pipeline.
    pub fn try_normalize(&self) -> Option<Vector3> {
        let len_sq = self.length_squared();
        if len_sq == 0.0 {
            return None;
        }

        let inv = 1.0 / len_sq.sqrt();
        Some(Vector3 {
            x: self.x * inv,
            y: self.y * inv,
            z: self.z * inv,
        })
    }

    /// Componentwise reciprocal, used for precomputing slab-test divisors.
    ///
    /// Zero components yield infinities, which the slab test handles through
    /// IEEE comparison semantics.
    pub fn recip(&self) -> Vector3 {
        Vector3 {
            x: 1.0 / self.x,
            y: 1.0 / self.y,
            z: 1.0 / self.z,
        }
    }
}

impl Index<usize> for Vector3 {
    type Output = f64;

    fn index<'a>(&'a self, index: usize) -> &'a f64 {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vector3 index out of range: {}", index),
        }
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y, z: -self.z }
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other,
        }
    }
}

impl Mul<Vector3> for f64 {
    type Output = Vector3;

    fn mul(self, other: Vector3) -> Vector3 {
        other * self
    }
}

impl Div<f64> for Vector3 {
    type Output = Self;

    fn div(self, other: f64) -> Self {
        Self {
            x: self.x / other,
            y: self.y / other,
            z: self.z / other,
        }
    }
}

/// A 4D vector.
///
/// Carries lighting coefficients in this crate: ambient, diffuse and specular
/// colors live in `x`, `y`, `z`, with the otherwise-unused `w` available for
/// auxiliary values (the specular exponent, for materials).
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Vector4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl PartialEq for Vector4 {
    fn eq(&self, other: &Vector4) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z) &&
            feq(self.w, other.w)
    }
}

impl Vector4 {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Vector4 {
        Vector4 { x, y, z, w }
    }

    pub fn dot(&self, other: &Vector4) -> f64 {
        self.x * other.x
            + self.y * other.y
            + self.z * other.z
            + self.w * other.w
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Componentwise (Hadamard) product, used for combining material and
    /// light coefficients.
    pub fn modulate(&self, other: &Vector4) -> Vector4 {
        Vector4 {
            x: self.x * other.x,
            y: self.y * other.y,
            z: self.z * other.z,
            w: self.w * other.w,
        }
    }
}

impl Index<usize> for Vector4 {
    type Output = f64;

    fn index<'a>(&'a self, index: usize) -> &'a f64 {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            3 => &self.w,
            _ => panic!("Vector4 index out of range: {}", index),
        }
    }
}

impl Add for Vector4 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
            w: self.w + other.w,
        }
    }
}

impl Sub for Vector4 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
            w: self.w - other.w,
        }
    }
}

impl Mul<f64> for Vector4 {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other,
            w: self.w * other,
        }
    }
}

impl Mul<Vector4> for f64 {
    type Output = Vector4;

    fn mul(self, other: Vector4) -> Vector4 {
        other * self
    }
}

/* Tests */

#[test]
fn add_vectors() {
    let a = Vector3::new(3.0, -2.0, 5.0);
    let b = Vector3::new(-2.0, 3.0, 1.0);

    assert_eq!(a + b, Vector3::new(1.0, 1.0, 6.0));
}

#[test]
fn sub_vectors() {
    let a = Vector3::new(3.0, 2.0, 1.0);
    let b = Vector3::new(5.0, 6.0, 7.0);

    assert_eq!(a - b, Vector3::new(-2.0, -4.0, -6.0));
}

#[test]
fn neg_vector() {
    let a = Vector3::new(1.0, -2.0, 3.0);

    assert_eq!(-a, Vector3::new(-1.0, 2.0, -3.0));
}

#[test]
fn mul_scalar() {
    let a = Vector3::new(1.0, -2.0, 3.0);

    assert_eq!(a * 3.5, Vector3::new(3.5, -7.0, 10.5));
    assert_eq!(3.5 * a, Vector3::new(3.5, -7.0, 10.5));
}

#[test]
fn div_scalar() {
    let a = Vector3::new(2.0, -4.0, 6.0);

    assert_eq!(a / 2.0, Vector3::new(1.0, -2.0, 3.0));
}

#[test]
fn index_components() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector4::new(1.0, 2.0, 3.0, 4.0);

    assert_eq!(a[0], 1.0);
    assert_eq!(a[2], 3.0);
    assert_eq!(b[3], 4.0);
}

#[test]
fn vector_length() {
    let v = Vector3::new(1.0, 2.0, 3.0);

    assert!(feq(v.length(), f64::sqrt(14.0)));
    assert!(feq(v.length_squared(), 14.0));
}

#[test]
fn dot_vectors() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector3::new(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn cross_vectors() {
    let a = Vector3::new(1.0, 2.0, 3.0);
    let b = Vector3::new(2.0, 3.0, 4.0);

    assert_eq!(a.cross(&b), Vector3::new(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a), Vector3::new(1.0, -2.0, 1.0));
}

#[test]
fn normalize_clean() {
    let v = Vector3::new(4.0, 0.0, 0.0);

    assert_eq!(v.normalize(), Vector3::new(1.0, 0.0, 0.0));
}

#[test]
fn normalize_unit_length() {
    let v = Vector3::new(1.0, 2.0, 3.0);

    assert!(feq(v.normalize().length(), 1.0));
}

#[test]
fn normalize_idempotent() {
    let v = Vector3::new(1.0, 2.0, 3.0).normalize();

    assert!(feq(v.normalize().length(), 1.0));
}

#[test]
fn try_normalize_zero() {
    assert_eq!(Vector3::zero().try_normalize(), None);
}

#[test]
fn try_normalize_nonzero() {
    let v = Vector3::new(0.0, 3.0, 4.0);

    assert_eq!(v.try_normalize(), Some(Vector3::new(0.0, 0.6, 0.8)));
}

#[test]
fn modulate_vectors() {
    let a = Vector4::new(1.0, 2.0, 3.0, 4.0);
    let b = Vector4::new(2.0, 0.5, 1.0, 0.0);

    assert_eq!(a.modulate(&b), Vector4::new(2.0, 1.0, 3.0, 0.0));
}
