use std::collections::VecDeque;
use std::sync::{ Arc, Mutex, Condvar };
use std::sync::atomic::{ AtomicBool, AtomicUsize, Ordering };
use std::thread;
use std::time::Duration;

use log::{ info, debug, trace };

use crate::canvas::Canvas;
use crate::consts::QUEUE_WAIT_MILLIS;
use crate::error::{ RenderError, RenderResult };
use crate::scene::Scene;
use crate::surface::DisplaySurface;

/// A rectangular block of pixels waiting to be traced.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ChunkData {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A traced block whose pixels now sit in the shared canvas, waiting for the
/// presenter to hand them to the display surface.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderData {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Shared state between the tracing workers and the presenter.
struct RenderState {
    chunk_queue: Mutex<VecDeque<ChunkData>>,
    render_queue: Mutex<VecDeque<RenderData>>,
    render_available: Condvar,
    jobs_remaining: AtomicUsize,
    cancelled: Arc<AtomicBool>,
    canvas: Mutex<Canvas>,
}

/// Renders a scene in parallel, chunk by chunk.
///
/// The raster is tiled into an `n` by `n` grid of equally sized chunks.
/// Worker threads drain the chunk queue, trace each chunk into the shared
/// canvas with a single lock acquisition per chunk, then enqueue the chunk
/// for presentation. One presenter (the calling thread) pops finished chunks
/// and hands them to the display surface; the outstanding-job counter only
/// drops after a chunk has actually been presented, so the render is done
/// exactly when the counter reaches zero.
pub struct SceneRenderer {
    num_chunks: u32,
    num_workers: usize,
    cancelled: Arc<AtomicBool>,
}

impl SceneRenderer {
    /// Creates a renderer with `num_workers` tracing threads and an
    /// automatically sized chunk grid.
    pub fn new(num_workers: usize) -> SceneRenderer {
        SceneRenderer {
            num_chunks: 0,
            num_workers: num_workers.max(1),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Overrides the chunk grid size. Zero restores the automatic choice.
    ///
    /// A manual grid must divide the raster evenly in both dimensions or
    /// [`render`](SceneRenderer::render) fails with `InvalidChunkGrid`.
    pub fn set_num_chunks(&mut self, num_chunks: u32) {
        self.num_chunks = num_chunks;
    }

    /// Requests cancellation. Workers stop picking up chunks and the
    /// presenter abandons the frame; the pending `render` call returns
    /// `Cancelled`.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// The largest grid size that tiles `width` by `height` exactly: the
    /// greatest common divisor of the two dimensions.
    ///
    /// Computed in binary-GCD style. Common factors of two are stripped
    /// first, then the Euclidean remainder loop finishes off the odd
    /// residues.
    pub fn calc_optimal_chunks(width: u32, height: u32) -> u32 {
        if width == 0 || height == 0 {
            return 0;
        }

        let mut a = width;
        let mut b = height;
        let mut twos = 1;
        while a % 2 == 0 && b % 2 == 0 {
            a /= 2;
            b /= 2;
            twos *= 2;
        }

        while b != 0 {
            let remainder = a % b;
            a = b;
            b = remainder;
        }

        twos * a
    }

    /// Pixel dimensions of one chunk for the given raster, `(0, 0)` when the
    /// grid cannot tile it.
    pub fn chunk_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let n = self.grid_size(width, height);
        if n == 0 || width % n != 0 || height % n != 0 {
            return (0, 0);
        }

        (width / n, height / n)
    }

    fn grid_size(&self, width: u32, height: u32) -> u32 {
        if self.num_chunks == 0 {
            SceneRenderer::calc_optimal_chunks(width, height)
        } else {
            self.num_chunks
        }
    }

    /// Renders `scene` at its camera's resolution, presenting every finished
    /// chunk through `surface`, and returns the completed canvas.
    pub fn render(&self, scene: Arc<Scene>,
        surface: &mut dyn DisplaySurface) -> RenderResult<Canvas> {
        let width = scene.camera.width();
        let height = scene.camera.height();

        let n = self.grid_size(width, height);
        if n == 0 || width % n != 0 || height % n != 0 {
            return Err(RenderError::InvalidChunkGrid {
                width,
                height,
                chunks: n,
            });
        }

        let (chunk_width, chunk_height) = (width / n, height / n);
        let total_jobs = (n as usize) * (n as usize);
        if total_jobs == 0 {
            return Err(RenderError::NoChunks);
        }

        info!("rendering {}x{} as a {}x{} grid of {}x{} pixel chunks",
            width, height, n, n, chunk_width, chunk_height);

        let mut chunks = VecDeque::with_capacity(total_jobs);
        for row in 0..n {
            for col in 0..n {
                chunks.push_back(ChunkData {
                    x: col * chunk_width,
                    y: row * chunk_height,
                    width: chunk_width,
                    height: chunk_height,
                });
            }
        }

        self.cancelled.store(false, Ordering::SeqCst);
        let state = Arc::new(RenderState {
            chunk_queue: Mutex::new(chunks),
            render_queue: Mutex::new(VecDeque::with_capacity(total_jobs)),
            render_available: Condvar::new(),
            jobs_remaining: AtomicUsize::new(total_jobs),
            cancelled: Arc::clone(&self.cancelled),
            canvas: Mutex::new(Canvas::new(width, height)),
        });

        debug!("spawning {} tracing workers for {} chunks",
            self.num_workers, total_jobs);

        let mut workers = Vec::with_capacity(self.num_workers);
        for id in 0..self.num_workers {
            let state = Arc::clone(&state);
            let scene = Arc::clone(&scene);
            let handle = thread::Builder::new()
                .name(format!("trace-worker-{}", id))
                .spawn(move || trace_worker(&state, &scene));

            match handle {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    // Let the workers already running drain out before the
                    // error surfaces.
                    self.cancelled.store(true, Ordering::SeqCst);
                    join_workers(workers);
                    return Err(RenderError::Spawn(e));
                },
            }
        }

        let outcome = self.present_loop(&state, surface);
        join_workers(workers);
        outcome?;

        let canvas = state.canvas.lock().unwrap().clone();
        Ok(canvas)
    }

    /// Runs on the calling thread until every chunk has been presented or
    /// the render is cancelled.
    fn present_loop(&self, state: &RenderState,
        surface: &mut dyn DisplaySurface) -> RenderResult<()> {
        while state.jobs_remaining.load(Ordering::SeqCst) > 0 {
            if state.cancelled.load(Ordering::SeqCst) {
                return Err(RenderError::Cancelled);
            }

            let next = {
                let mut queue = state.render_queue.lock().unwrap();
                if queue.is_empty() {
                    let wait = Duration::from_millis(QUEUE_WAIT_MILLIS);
                    queue = state.render_available
                        .wait_timeout(queue, wait).unwrap().0;
                }

                queue.pop_front()
            };

            let data = match next {
                Some(data) => data,
                None => continue,
            };

            let pixels = state.canvas.lock().unwrap()
                .region_rgb(data.x, data.y, data.width, data.height);

            if let Err(e) = surface.present_region(&pixels,
                data.x, data.y, data.width, data.height) {
                state.cancelled.store(true, Ordering::SeqCst);
                return Err(e);
            }

            // Presentation succeeded, so this job is truly finished.
            state.jobs_remaining.fetch_sub(1, Ordering::SeqCst);
            trace!("presented chunk at ({}, {})", data.x, data.y);
        }

        Ok(())
    }
}

/// Drains the chunk queue, tracing each chunk into the shared canvas and
/// queueing it for presentation. Exits when the queue is empty or the
/// render has been cancelled.
fn trace_worker(state: &RenderState, scene: &Scene) {
    loop {
        if state.cancelled.load(Ordering::SeqCst) {
            return;
        }

        let chunk = match state.chunk_queue.lock().unwrap().pop_front() {
            Some(chunk) => chunk,
            None => return,
        };

        trace!("tracing chunk at ({}, {})", chunk.x, chunk.y);

        let mut pixels =
            Vec::with_capacity((chunk.width * chunk.height) as usize);
        for y in chunk.y..(chunk.y + chunk.height) {
            for x in chunk.x..(chunk.x + chunk.width) {
                pixels.push(scene.trace(x, y));
            }
        }

        state.canvas.lock().unwrap().write_region(
            chunk.x, chunk.y, chunk.width, chunk.height, &pixels);

        state.render_queue.lock().unwrap().push_back(RenderData {
            x: chunk.x,
            y: chunk.y,
            width: chunk.width,
            height: chunk.height,
        });
        state.render_available.notify_one();
    }
}

fn join_workers(workers: Vec<thread::JoinHandle<()>>) {
    for worker in workers {
        let _ = worker.join();
    }
}

/* Tests */

#[cfg(test)]
mod renderer_tests {
    use super::*;

    use crate::camera::Camera;
    use crate::color::Color;
    use crate::light::{ Light, PointLight };
    use crate::object::Object;
    use crate::surface::CaptureSurface;
    use crate::vector::Vector3;

    fn test_scene(width: u32, height: u32) -> Arc<Scene> {
        let camera = Arc::new(Camera::new(width, height, 60.0));
        let mut scene = Scene::new(camera);
        scene.objects.push(
            Object::sphere(Vector3::new(0.0, 0.0, -5.0), 1.5));
        scene.lights.push(Light::Point(
            PointLight::white(Vector3::new(0.0, 2.0, 0.0), 50.0)));
        Arc::new(scene)
    }

    #[test]
    fn optimal_chunks_of_default_raster() {
        assert_eq!(SceneRenderer::calc_optimal_chunks(1024, 768), 256);
    }

    #[test]
    fn optimal_chunks_of_coprime_raster() {
        assert_eq!(SceneRenderer::calc_optimal_chunks(17, 19), 1);
    }

    #[test]
    fn optimal_chunks_of_square_raster() {
        assert_eq!(SceneRenderer::calc_optimal_chunks(64, 64), 64);
    }

    #[test]
    fn optimal_chunks_of_empty_raster() {
        assert_eq!(SceneRenderer::calc_optimal_chunks(0, 768), 0);
    }

    #[test]
    fn chunk_dimensions_tile_the_raster_exactly() {
        let renderer = SceneRenderer::new(2);
        let (w, h) = renderer.chunk_dimensions(1024, 768);

        assert_eq!((w, h), (4, 3));
        assert_eq!(w * 256, 1024);
        assert_eq!(h * 256, 768);
    }

    #[test]
    fn manual_grid_must_divide_the_raster() {
        let mut renderer = SceneRenderer::new(2);
        renderer.set_num_chunks(5);

        let scene = test_scene(16, 16);
        let mut surface = CaptureSurface::new(16, 16);
        let result = renderer.render(scene, &mut surface);

        assert!(matches!(result,
            Err(RenderError::InvalidChunkGrid { chunks: 5, .. })));
    }

    #[test]
    fn render_covers_every_pixel_once() {
        let renderer = SceneRenderer::new(3);
        let scene = test_scene(16, 16);
        let mut surface = CaptureSurface::new(16, 16);

        let canvas = renderer.render(scene, &mut surface).unwrap();

        // A 16x16 raster tiles as a 16x16 grid of single pixels.
        assert_eq!(surface.regions_presented, 256);
        assert!(surface.fully_covered());
        assert_eq!(canvas.width, 16);
        assert_eq!(canvas.height, 16);
    }

    #[test]
    fn render_matches_a_straight_trace() {
        let mut renderer = SceneRenderer::new(2);
        renderer.set_num_chunks(4);

        let scene = test_scene(16, 16);
        let mut surface = CaptureSurface::new(16, 16);
        let canvas = renderer.render(Arc::clone(&scene),
            &mut surface).unwrap();

        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(canvas.read_pixel(x, y), Some(scene.trace(x, y)));
            }
        }
    }

    #[test]
    fn render_presents_the_traced_pixels() {
        let mut renderer = SceneRenderer::new(2);
        renderer.set_num_chunks(2);

        let scene = test_scene(8, 8);
        let mut surface = CaptureSurface::new(8, 8);
        let canvas = renderer.render(Arc::clone(&scene),
            &mut surface).unwrap();

        let traced = canvas.read_pixel(4, 4).unwrap();
        let presented = surface.pixel(4, 4).unwrap();
        let expected = Color::rgb(
            presented[0] as f64, presented[1] as f64, presented[2] as f64);

        // The surface stores clamped f32 so the comparison is approximate.
        assert!((traced.r.min(1.0).max(0.0) - expected.r).abs() < 1.0e-4);
        assert!((traced.g.min(1.0).max(0.0) - expected.g).abs() < 1.0e-4);
        assert!((traced.b.min(1.0).max(0.0) - expected.b).abs() < 1.0e-4);
    }

    #[test]
    fn presenter_failure_aborts_the_render() {
        struct RefusingSurface;

        impl DisplaySurface for RefusingSurface {
            fn present_region(&mut self, _pixels: &[f32], _x: u32, _y: u32,
                _w: u32, _h: u32) -> RenderResult<()> {
                Err(RenderError::Present("surface lost".into()))
            }
        }

        let renderer = SceneRenderer::new(2);
        let scene = test_scene(8, 8);

        let mut surface = RefusingSurface;
        let result = renderer.render(scene, &mut surface);

        assert!(matches!(result, Err(RenderError::Present(_))));
    }

    #[test]
    fn cancel_mid_render_returns_cancelled() {
        struct CancellingSurface {
            renderer: Arc<SceneRenderer>,
        }

        impl DisplaySurface for CancellingSurface {
            fn present_region(&mut self, _pixels: &[f32], _x: u32, _y: u32,
                _w: u32, _h: u32) -> RenderResult<()> {
                // Cancel after the first chunk lands; the presenter must
                // notice before touching the next one.
                self.renderer.cancel();
                Ok(())
            }
        }

        let renderer = Arc::new(SceneRenderer::new(2));
        let scene = test_scene(8, 8);

        let mut surface = CancellingSurface {
            renderer: Arc::clone(&renderer),
        };
        let result = renderer.render(scene, &mut surface);

        assert!(matches!(result, Err(RenderError::Cancelled)));
    }

    #[test]
    fn cancel_flag_resets_for_the_next_frame() {
        let renderer = SceneRenderer::new(2);
        renderer.cancel();

        // render() resets the flag for a fresh frame, so cancelling up
        // front must not poison the next call.
        let scene = test_scene(8, 8);
        let mut surface = CaptureSurface::new(8, 8);
        assert!(renderer.render(scene, &mut surface).is_ok());
    }
}
