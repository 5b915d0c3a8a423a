pub mod vector;
pub mod matrix;
pub mod math;
pub mod ray;
pub mod object;
pub mod light;

pub mod camera;
pub mod scene;
pub mod renderer;

pub mod color;
pub mod canvas;
pub mod surface;

pub mod error;
pub mod consts;

const FEQ_EPSILON: f64 = 0.0001;
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
