use std::fmt;
use std::ops::{ Index, IndexMut, Mul };
use std::convert::From;

use crate::feq;

/// A 4x4 matrix.
///
/// These matrices encode world transforms for scene objects and the camera.
/// Elements are stored row-major, and accessed with `(row, col)` tuples.
///
/// For methods which modify matrices, they are typically provided in pairs;
/// one which modifies the matrix in-place, and one which returns a new matrix.
/// For example, `transpose` and `transposition`. Method `transpose` takes a
/// `Matrix44`, and turns said matrix into its own transpose. Method
/// `transposition` produces a new matrix, the transpose of the original.
///
/// # Examples
///
/// Creating an identity matrix:
///
/// ```
/// # #![allow(unused)]
/// # use chunk_tracer::matrix::Matrix44;
/// let mat = Matrix44::identity();
/// assert_eq!(mat.inverse(), Some(mat));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Matrix44 {
    data: [f64; 16],
}

/// Determines whether two `Matrix44`s are equal.
///
/// Matrices are compared element-wise. Note that equality is approximate, as
/// `Matrix44` elements are floating point numbers.
impl PartialEq for Matrix44 {
    fn eq(&self, other: &Matrix44) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Matrix44 {
    /// Creates a new `Matrix44`. All elements are initialized to `0.0`.
    pub fn new() -> Matrix44 {
        Matrix44 { data: [0.0; 16] }
    }

    /// Instantiates a 4x4 identity matrix.
    pub fn identity() -> Matrix44 {
        let mut buf = [0.0; 16];
        buf[0] = 1.0; buf[5] = 1.0; buf[10] = 1.0; buf[15] = 1.0;

        Matrix44 { data: buf }
    }

    /// Instantiates a 4x4 translation matrix.
    ///
    /// This crate multiplies row vectors on the left of matrices, so the
    /// translation components live in the bottom row.
    pub fn translation(x: f64, y: f64, z: f64) -> Matrix44 {
        let mut trans = Self::identity();
        trans[(3, 0)] = x;
        trans[(3, 1)] = y;
        trans[(3, 2)] = z;

        trans
    }

    /// Instantiates a 4x4 scaling matrix.
    ///
    /// This matrix scales vectors or points by `x`, `y` and `z` along the X, Y
    /// and Z axes, respectively.
    pub fn scaling(x: f64, y: f64, z: f64) -> Matrix44 {
        let mut scale = Self::identity();
        scale[(0, 0)] = x;
        scale[(1, 1)] = y;
        scale[(2, 2)] = z;

        scale
    }

    /// Instantiates a 4x4 rotation matrix, rotating about the X axis.
    ///
    /// Assumes that parameter `r` is in radians.
    pub fn rotation_x(r: f64) -> Matrix44 {
        let mut rotate = Self::identity();
        rotate[(1, 1)] =  r.cos();
        rotate[(1, 2)] =  r.sin();
        rotate[(2, 1)] = -r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// Instantiates a 4x4 rotation matrix, rotating about the Y axis.
    ///
    /// Assumes that parameter `r` is in radians.
    pub fn rotation_y(r: f64) -> Matrix44 {
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 2)] = -r.sin();
        rotate[(2, 0)] =  r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// Instantiates a 4x4 rotation matrix, rotating about the Z axis.
    ///
    /// Assumes that parameter `r` is in radians.
    pub fn rotation_z(r: f64) -> Matrix44 {
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 1)] =  r.sin();
        rotate[(1, 0)] = -r.sin();
        rotate[(1, 1)] =  r.cos();

        rotate
    }

    /// Produces the transpose of a matrix in-place.
    pub fn transpose(&mut self) {
        for r in 0..4 {
            for c in (r + 1)..4 {
                let tmp = self[(r, c)];
                self[(r, c)] = self[(c, r)];
                self[(c, r)] = tmp;
            }
        }
    }

    /// Produces the transpose of a matrix, returning a new matrix as a result.
    ///
    /// See the documentation on method `transpose` for more information.
    pub fn transposition(&self) -> Matrix44 {
        let mut buf = self.clone();
        buf.transpose();

        buf
    }

    /// Calculates the inverse of a `Matrix44`, if it exists.
    ///
    /// Uses Gauss-Jordan elimination with partial pivoting: for each column,
    /// the remaining row with the largest absolute value in that column is
    /// chosen as the pivot, avoiding division by small or zero entries. If no
    /// usable pivot exists the matrix is singular and `None` is returned.
    pub fn inverse(&self) -> Option<Matrix44> {
        let mut work = self.clone();
        let mut inv = Matrix44::identity();

        for col in 0..4 {
            // Partial pivot: largest absolute value in this column, at or
            // below the diagonal.
            let mut pivot = col;
            for row in (col + 1)..4 {
                if work[(row, col)].abs() > work[(pivot, col)].abs() {
                    pivot = row;
                }
            }

            if work[(pivot, col)] == 0.0 {
                return None;
            }

            if pivot != col {
                work.swap_rows(pivot, col);
                inv.swap_rows(pivot, col);
            }

            // Scale the pivot row so the diagonal entry becomes 1.
            let scale = 1.0 / work[(col, col)];
            for c in 0..4 {
                work[(col, c)] *= scale;
                inv[(col, c)] *= scale;
            }

            // Eliminate the column from every other row.
            for row in 0..4 {
                if row == col {
                    continue;
                }

                let factor = work[(row, col)];
                if factor == 0.0 {
                    continue;
                }

                for c in 0..4 {
                    work[(row, c)] -= factor * work[(col, c)];
                    inv[(row, c)] -= factor * inv[(col, c)];
                }
            }
        }

        Some(inv)
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        for c in 0..4 {
            let tmp = self[(a, c)];
            self[(a, c)] = self[(b, c)];
            self[(b, c)] = tmp;
        }
    }
}

impl From<[f64; 16]> for Matrix44 {
    fn from(data: [f64; 16]) -> Matrix44 {
        Matrix44 { data }
    }
}

impl Index<(usize, usize)> for Matrix44 {
    type Output = f64;

    fn index<'a>(&'a self, index: (usize, usize)) -> &'a f64 {
        &self.data[(index.0 * 4) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix44 {
    fn index_mut<'a>(&'a mut self, index: (usize, usize)) -> &'a mut f64 {
        &mut self.data[(index.0 * 4) + index.1]
    }
}

/// Multiplication between two matrices.
///
/// Note that matrix multiplication is not commutative; in other words, for
/// matrix `A` and matrix `B`, `A * B` is not necessarily equal to `B * A`.
impl Mul<Matrix44> for Matrix44 {
    type Output = Matrix44;

    fn mul(self, other: Matrix44) -> Matrix44 {
        let mut res = Matrix44::new();

        for r in 0..4 {
            for c in 0..4 {
                res[(r, c)] = self[(r, 0)] * other[(0, c)]
                    + self[(r, 1)] * other[(1, c)]
                    + self[(r, 2)] * other[(2, c)]
                    + self[(r, 3)] * other[(3, c)]
            }
        }

        res
    }
}

impl fmt::Display for Matrix44 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..4 {
            write!(f, "|")?;
            for c in 0..4 {
                write!(f, " {} |", self[(r, c)])?;
            }

            // Don't put a newline on the final row (allow the user to do that)
            if r != 3 {
                write!(f, "\n")?;
            }
        }

        Ok(())
    }
}

/* Tests */

#[test]
fn identity() {
    let i = Matrix44::identity();
    let a: Matrix44 = [ 0.0, 1.0,  2.0,  4.0,
                        1.0, 2.0,  4.0,  8.0,
                        2.0, 4.0,  8.0, 16.0,
                        4.0, 8.0, 16.0, 32.0, ].into();

    assert_eq!(i * a, a);
    assert_eq!(a * i, a);
}

#[test]
fn transpose() {
     let a: Matrix44 = [ 0.0, 9.0, 3.0, 0.0,
                         9.0, 8.0, 0.0, 8.0,
                         1.0, 8.0, 5.0, 3.0,
                         0.0, 0.0, 5.0, 8.0, ].into();

     let t: Matrix44 = [ 0.0, 9.0, 1.0, 0.0,
                         9.0, 8.0, 8.0, 0.0,
                         3.0, 0.0, 5.0, 5.0,
                         0.0, 8.0, 3.0, 8.0, ].into();

     assert_eq!(t, a.transposition());
     assert_eq!(t.transposition(), a);
}

#[test]
fn transpose_identity() {
    let i = Matrix44::identity();
    assert_eq!(i, i.transposition());
}

#[test]
fn transpose_in_place() {
    let a: Matrix44 = [ 0.0, 9.0, 3.0, 0.0,
                        9.0, 8.0, 0.0, 8.0,
                        1.0, 8.0, 5.0, 3.0,
                        0.0, 0.0, 5.0, 8.0, ].into();

    let mut b = a;
    b.transpose();

    assert_eq!(b, a.transposition());
}

#[test]
fn inverse_identity() {
    let i = Matrix44::identity();
    assert_eq!(i.inverse(), Some(i));
}

#[test]
fn inverse_known() {
     let a: Matrix44 = [  8.0, -5.0,  9.0,  2.0,
                          7.0,  5.0,  6.0,  1.0,
                         -6.0,  0.0,  9.0,  6.0,
                         -3.0,  0.0, -9.0, -4.0, ].into();

     let i: Matrix44 = [ -0.15385, -0.15385, -0.28205, -0.53846,
                         -0.07692,  0.12308,  0.02564,  0.03077,
                          0.35897,  0.35897,  0.43590,  0.92308,
                         -0.69231, -0.69231, -0.76923, -1.92308, ].into();

     assert_eq!(a.inverse().unwrap(), i);
}

#[test]
fn inverse_round_trip() {
     let a: Matrix44 = [  3.0, -9.0,  7.0,  3.0,
                          3.0,  8.0,  2.0, -9.0,
                         -4.0,  4.0,  4.0,  1.0,
                         -6.0,  5.0, -1.0,  1.0, ].into();

     let inv = a.inverse().unwrap();

     assert_eq!(a * inv, Matrix44::identity());
     assert_eq!(inv * a, Matrix44::identity());
}

#[test]
fn inverse_transform_round_trip() {
    let a = Matrix44::translation(5.0, -3.0, 2.0)
        * Matrix44::rotation_y(std::f64::consts::PI / 3.0)
        * Matrix44::scaling(2.0, 2.0, 2.0);

    assert_eq!(a * a.inverse().unwrap(), Matrix44::identity());
}

#[test]
fn inverse_singular() {
    // Zero row, so no pivot exists for that column.
    let a: Matrix44 = [ 1.0, 2.0, 3.0, 4.0,
                        0.0, 0.0, 0.0, 0.0,
                        5.0, 6.0, 7.0, 8.0,
                        9.0, 1.0, 2.0, 3.0, ].into();

    assert_eq!(a.inverse(), None);
}

#[test]
fn inverse_needs_pivoting() {
    // Zero on the diagonal; inversion only succeeds with row exchange.
    let a: Matrix44 = [ 0.0, 1.0, 0.0, 0.0,
                        1.0, 0.0, 0.0, 0.0,
                        0.0, 0.0, 0.0, 1.0,
                        0.0, 0.0, 1.0, 0.0, ].into();

    let inv = a.inverse().unwrap();
    assert_eq!(a * inv, Matrix44::identity());
}
