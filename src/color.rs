use std::ops::{ Add, AddAssign, Mul };

use crate::feq;
use crate::vector::Vector4;

/// A linear RGB color.
///
/// Each channel conventionally ranges from 0.0 to 1.0 inclusive, though
/// intermediate lighting sums may exceed 1.0 before presentation. No gamma
/// correction is applied anywhere in the crate; values are linear light.
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Partial equality on two colors.
///
/// `Color`s are compared component-wise, accounting for possible floating
/// point error in comparisons.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl Color {
    /// Creates a color with red, green and blue values.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// The color black.
    pub fn black() -> Color {
        Color { r: 0.0, g: 0.0, b: 0.0 }
    }

    /// The color white.
    pub fn white() -> Color {
        Color { r: 1.0, g: 1.0, b: 1.0 }
    }

    /// Whether any channel is NaN or infinite. Degenerate shading math is
    /// contained by replacing such colors with black before they reach the
    /// pixel buffer.
    pub fn is_degenerate(&self) -> bool {
        !self.r.is_finite() || !self.g.is_finite() || !self.b.is_finite()
    }
}

/// Conversion from a lighting coefficient vector to a `Color`.
///
/// Takes the x/y/z components as r/g/b; the w component (used for auxiliary
/// values like specular exponents) is discarded.
impl From<Vector4> for Color {
    fn from(v: Vector4) -> Color {
        Color { r: v.x, g: v.y, b: v.z }
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, other: Self) {
        self.r += other.r;
        self.g += other.g;
        self.b += other.b;
    }
}

/// Componentwise multiplication of two colors (the Hadamard product).
impl Mul<Color> for Color {
    type Output = Self;

    fn mul(self, other: Color) -> Self {
        Self {
            r: self.r * other.r,
            g: self.g * other.g,
            b: self.b * other.b,
        }
    }
}

impl Mul<f64> for Color {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

/* Tests */

#[test]
fn add_colors() {
    let a = Color::rgb(0.9, 0.6, 0.75);
    let b = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(a + b, Color::rgb(1.6, 0.7, 1.0));
}

#[test]
fn accumulate_colors() {
    let mut c = Color::black();
    c += Color::rgb(0.25, 0.5, 0.75);
    c += Color::rgb(0.25, 0.0, 0.25);

    assert_eq!(c, Color::rgb(0.5, 0.5, 1.0));
}

#[test]
fn mul_colors() {
    let a = Color::rgb(1.0, 0.2, 0.4);
    let b = Color::rgb(0.9, 1.0, 0.1);

    assert_eq!(a * b, Color::rgb(0.9, 0.2, 0.04));
}

#[test]
fn mul_color_scalar() {
    let c = Color::rgb(0.2, 0.3, 0.4);

    assert_eq!(c * 2.0, Color::rgb(0.4, 0.6, 0.8));
}

#[test]
fn color_from_vector4_discards_w() {
    let v = Vector4::new(0.1, 0.2, 0.3, 64.0);

    assert_eq!(Color::from(v), Color::rgb(0.1, 0.2, 0.3));
}

#[test]
fn degenerate_color_detected() {
    let nan = Color::rgb(0.0, f64::NAN, 0.0);
    let inf = Color::rgb(f64::INFINITY, 0.0, 0.0);

    assert!(nan.is_degenerate());
    assert!(inf.is_degenerate());
    assert!(!Color::black().is_degenerate());
}
