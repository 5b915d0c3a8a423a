use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use clap::{ ArgEnum, Parser };
use log::{ LevelFilter, info };
use rand::SeedableRng;
use rand_xoshiro::SplitMix64;

use chunk_tracer::camera::Camera;
use chunk_tracer::consts::{
    DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_FOV_DEGREES, FALLBACK_WORKERS,
};
use chunk_tracer::renderer::SceneRenderer;
use chunk_tracer::scene::{ Scene, SceneDescription };
use chunk_tracer::surface::CaptureSurface;

#[derive(Copy, Clone, Debug, ArgEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> LevelFilter {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser)]
#[clap(name = "chunk-tracer", version,
    about = "A chunked, multithreaded ray tracer")]
struct Args {
    /// Image width in pixels.
    #[clap(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    /// Image height in pixels.
    #[clap(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,

    /// Vertical field of view in degrees.
    #[clap(long, default_value_t = DEFAULT_FOV_DEGREES)]
    fov: f64,

    /// Chunk grid size; 0 picks the largest grid that tiles the image.
    #[clap(long, default_value_t = 0)]
    chunks: u32,

    /// Tracing worker threads; 0 uses the available parallelism.
    #[clap(long, default_value_t = 0)]
    workers: usize,

    /// Scene description file (JSON). Overrides --random.
    #[clap(long)]
    scene: Option<PathBuf>,

    /// Render a randomly generated scene with this many objects.
    #[clap(long)]
    random: Option<usize>,

    /// Seed for --random.
    #[clap(long, default_value_t = 0)]
    seed: u64,

    /// Output image path (PPM).
    #[clap(short, long, default_value = "./out.ppm")]
    out: PathBuf,

    #[clap(long, arg_enum, default_value = "info")]
    log_level: LogLevel,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level.into())
        .init();

    let (scene, camera) = match args.scene {
        Some(ref path) => {
            let json = fs::read_to_string(path)?;
            let desc = SceneDescription::from_json(&json)?;
            Scene::from_description(desc)?
        },

        None => {
            let camera = Arc::new(
                Camera::new(args.width, args.height, args.fov));

            let scene = match args.random {
                Some(count) => {
                    let mut rng = SplitMix64::seed_from_u64(args.seed);
                    Scene::random(Arc::clone(&camera), &mut rng, count)
                },
                None => Scene::demo(Arc::clone(&camera)),
            };

            (scene, camera)
        },
    };

    let workers = if args.workers > 0 {
        args.workers
    } else {
        thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(FALLBACK_WORKERS)
    };

    let mut renderer = SceneRenderer::new(workers);
    renderer.set_num_chunks(args.chunks);

    let mut surface = CaptureSurface::new(camera.width(), camera.height());
    let canvas = renderer.render(Arc::new(scene), &mut surface)?;

    canvas.save(&args.out)?;
    info!("wrote {}", args.out.display());

    Ok(())
}
