use std::io;
use std::io::Write;
use std::fs::File;
use std::path::Path;

use crate::color::Color;

/// The shared pixel buffer for a render.
///
/// Tracer workers write each finished chunk into this buffer; the presenter
/// reads chunk sub-rectangles back out as interleaved float RGB for the
/// display surface. Once a render finishes, the canvas can also be saved to
/// an image file.
///
/// For now, only PPM images are supported.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: u32,

    /// The height of the canvas, in pixels.
    pub height: u32,

    /// The pixels of the canvas, stored as a flattened vector.
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a new canvas with specified width and height.
    ///
    /// This function allocates a `Vec<Color>` of size `width * height`, which
    /// may take up a decent amount of memory, depending on image size.
    pub fn new(width: u32, height: u32) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); (width * height) as usize],
        }
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. Pixels are specified in row-column
    /// order, where `y` is the row of the pixel, and `x` is the column. Rows
    /// and columns are zero-indexed.
    pub fn write_pixel(&mut self, x: u32, y: u32, pixel: &Color) {
        // Silently ignore out-of-bounds pixels
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[((y * self.width) + x) as usize] = *pixel;
    }

    /// Reads a color from a location on the `Canvas`.
    ///
    /// Pixels are specified in row-column order, where `y` is the row of the
    /// pixel, and `x` is the column. Rows and columns are zero-indexed. If
    /// the specified pixel location is out-of-bounds, `None` is returned by
    /// this function.
    pub fn read_pixel(&self, x: u32, y: u32) -> Option<Color> {
        // Return nothing if pixel is out-of-bounds
        if x >= self.width || y >= self.height {
            return None;
        }

        Some(self.pixels[((y * self.width) + x) as usize])
    }

    /// Copies a rectangular block of colors into the canvas at `(x, y)`.
    ///
    /// The block is `w` by `h` colors in row-major order. Used by tracer
    /// workers to commit a finished chunk under a single lock acquisition.
    pub fn write_region(&mut self, x: u32, y: u32, w: u32, h: u32,
        block: &[Color]) {
        debug_assert_eq!(block.len(), (w * h) as usize);

        for row in 0..h {
            for col in 0..w {
                let pixel = block[((row * w) + col) as usize];
                self.write_pixel(x + col, y + row, &pixel);
            }
        }
    }

    /// Extracts a rectangular region as interleaved float RGB.
    ///
    /// This is the wire format of the display-surface interface: `f32`
    /// triples in `[0, 1]` per channel, linear light, no alpha and no gamma.
    pub fn region_rgb(&self, x: u32, y: u32, w: u32, h: u32) -> Vec<f32> {
        let mut out = Vec::with_capacity((w * h * 3) as usize);

        for row in 0..h {
            for col in 0..w {
                let pixel = self.read_pixel(x + col, y + row)
                    .unwrap_or_else(Color::black);
                out.push(pixel.r.clamp(0.0, 1.0) as f32);
                out.push(pixel.g.clamp(0.0, 1.0) as f32);
                out.push(pixel.b.clamp(0.0, 1.0) as f32);
            }
        }

        out
    }

    /// Saves the canvas as a plain (P3) PPM file.
    ///
    /// Channel values are scaled to 0..255 and emitted as whitespace
    /// separated tokens, starting a new line whenever appending another
    /// token would push the current one past 70 columns.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut out = File::create(path)?;

        writeln!(&mut out, "P3")?;
        writeln!(&mut out, "{} {}", self.width, self.height)?;
        writeln!(&mut out, "255")?;

        let mut line = String::new();
        for pixel in self.pixels.iter() {
            for &channel in [pixel.r, pixel.g, pixel.b].iter() {
                let value =
                    (channel * 255.0).clamp(0.0, 255.0).ceil() as u8;
                let token = value.to_string();

                if !line.is_empty() {
                    if line.len() + 1 + token.len() > 70 {
                        writeln!(&mut out, "{}", line)?;
                        line.clear();
                    } else {
                        line.push(' ');
                    }
                }
                line.push_str(&token);
            }
        }
        writeln!(&mut out, "{}", line)?;

        Ok(())
    }
}

/* Tests */

#[test]
fn write_and_read_pixel() {
    let purple = Color::rgb(1.0, 0.0, 1.0);
    let mut canvas = Canvas::new(8, 8);
    canvas.write_pixel(4, 2, &purple);

    assert_eq!(canvas.read_pixel(4, 2).unwrap(), purple);
    assert_eq!(canvas.read_pixel(2, 4).unwrap(), Color::black());
}

#[test]
fn out_of_bounds_reads_and_writes() {
    let mut canvas = Canvas::new(4, 4);
    canvas.write_pixel(9, 9, &Color::white());

    assert_eq!(canvas.read_pixel(9, 9), None);
}

#[test]
fn write_region_places_block() {
    let red = Color::rgb(1.0, 0.0, 0.0);
    let mut canvas = Canvas::new(8, 8);
    let block = vec![red; 6];
    canvas.write_region(2, 4, 3, 2, &block);

    assert_eq!(canvas.read_pixel(2, 4).unwrap(), red);
    assert_eq!(canvas.read_pixel(4, 5).unwrap(), red);
    assert_eq!(canvas.read_pixel(5, 4).unwrap(), Color::black());
    assert_eq!(canvas.read_pixel(2, 3).unwrap(), Color::black());
}

#[test]
fn region_rgb_interleaves_channels() {
    let mut canvas = Canvas::new(4, 4);
    canvas.write_pixel(1, 1, &Color::rgb(0.25, 0.5, 0.75));

    let region = canvas.region_rgb(1, 1, 2, 1);

    assert_eq!(region.len(), 6);
    assert_eq!(region[0], 0.25);
    assert_eq!(region[1], 0.5);
    assert_eq!(region[2], 0.75);
    assert_eq!(region[3], 0.0);
}

#[test]
fn region_rgb_clamps_out_of_range() {
    let mut canvas = Canvas::new(2, 2);
    canvas.write_pixel(0, 0, &Color::rgb(2.0, -1.0, 0.5));

    let region = canvas.region_rgb(0, 0, 1, 1);

    assert_eq!(region, vec![1.0, 0.0, 0.5]);
}
