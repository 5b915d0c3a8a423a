use crate::error::{ RenderError, RenderResult };

/// The narrow interface the core uses to display pixels.
///
/// A write-only sink: the core never reads back from it. Pixel blocks are
/// interleaved `f32` RGB triples in `[0, 1]` per channel, linear light, with
/// no alpha and no gamma correction.
///
/// Windowing, message pumps and graphics-context setup live behind
/// implementations of this trait, outside the crate. Exactly one presenter
/// thread owns the surface for the duration of a render; implementations do
/// not need to be thread-safe beyond being `Send`.
pub trait DisplaySurface: Send {
    /// Presents a `w` by `h` block of pixels with its top-left corner at
    /// `(x, y)` in the output image.
    fn present_region(&mut self, pixels: &[f32], x: u32, y: u32,
        w: u32, h: u32) -> RenderResult<()>;
}

/// An in-memory surface that records everything presented to it.
///
/// Keeps a full-frame pixel buffer plus a count of presented regions, which
/// is what the scheduler tests assert against (exactly one presentation per
/// chunk, full pixel coverage). Also serves headless CLI runs, where the
/// canvas itself is saved afterwards.
pub struct CaptureSurface {
    width: u32,
    height: u32,
    pixels: Vec<f32>,

    /// How many times each pixel has been covered by a presented region.
    coverage: Vec<u32>,

    /// Total `present_region` calls accepted.
    pub regions_presented: usize,
}

impl CaptureSurface {
    pub fn new(width: u32, height: u32) -> CaptureSurface {
        CaptureSurface {
            width,
            height,
            pixels: vec![0.0; (width * height * 3) as usize],
            coverage: vec![0; (width * height) as usize],
            regions_presented: 0,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let base = (((y * self.width) + x) * 3) as usize;
        Some([self.pixels[base], self.pixels[base + 1], self.pixels[base + 2]])
    }

    /// How many presented regions covered pixel `(x, y)`.
    pub fn coverage(&self, x: u32, y: u32) -> u32 {
        self.coverage[((y * self.width) + x) as usize]
    }

    /// Whether every pixel was covered by at least one presented region.
    pub fn fully_covered(&self) -> bool {
        self.coverage.iter().all(|&c| c > 0)
    }
}

impl DisplaySurface for CaptureSurface {
    fn present_region(&mut self, pixels: &[f32], x: u32, y: u32,
        w: u32, h: u32) -> RenderResult<()> {
        if pixels.len() != (w * h * 3) as usize {
            return Err(RenderError::Present(format!(
                "block of {} floats does not match {}x{} region",
                pixels.len(), w, h)));
        }

        if x + w > self.width || y + h > self.height {
            return Err(RenderError::Present(format!(
                "region {}x{} at ({}, {}) exceeds {}x{} surface",
                w, h, x, y, self.width, self.height)));
        }

        for row in 0..h {
            for col in 0..w {
                let src = (((row * w) + col) * 3) as usize;
                let px = x + col;
                let py = y + row;
                let dst = (((py * self.width) + px) * 3) as usize;

                self.pixels[dst] = pixels[src];
                self.pixels[dst + 1] = pixels[src + 1];
                self.pixels[dst + 2] = pixels[src + 2];
                self.coverage[((py * self.width) + px) as usize] += 1;
            }
        }

        self.regions_presented += 1;
        Ok(())
    }
}

/* Tests */

#[test]
fn capture_surface_records_regions() {
    let mut surface = CaptureSurface::new(4, 4);
    let block = vec![0.5f32; 2 * 2 * 3];

    surface.present_region(&block, 1, 1, 2, 2).unwrap();

    assert_eq!(surface.regions_presented, 1);
    assert_eq!(surface.pixel(1, 1).unwrap(), [0.5, 0.5, 0.5]);
    assert_eq!(surface.pixel(0, 0).unwrap(), [0.0, 0.0, 0.0]);
    assert_eq!(surface.coverage(2, 2), 1);
    assert!(!surface.fully_covered());
}

#[test]
fn capture_surface_rejects_bad_block() {
    let mut surface = CaptureSurface::new(4, 4);
    let block = vec![0.5f32; 5];

    assert!(surface.present_region(&block, 0, 0, 2, 2).is_err());
}

#[test]
fn capture_surface_rejects_out_of_bounds_region() {
    let mut surface = CaptureSurface::new(4, 4);
    let block = vec![0.5f32; 2 * 2 * 3];

    assert!(surface.present_region(&block, 3, 3, 2, 2).is_err());
}

#[test]
fn full_coverage_after_tiling() {
    let mut surface = CaptureSurface::new(4, 4);
    let block = vec![1.0f32; 2 * 2 * 3];

    for y in 0..2 {
        for x in 0..2 {
            surface.present_region(&block, x * 2, y * 2, 2, 2).unwrap();
        }
    }

    assert_eq!(surface.regions_presented, 4);
    assert!(surface.fully_covered());
}
