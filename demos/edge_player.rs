// demos/edge_player.rs — Headless edge-filter player.
//
// Plays a short "video" (a still image panned across the frame, or a
// generated moving scene) through the filter strategies and prints the
// per-strategy telemetry line as it goes:
//
//   none → CPU → Separable → GPU → none → ...   (strategy switch every N frames)
//
// When the last frame has played, playback loops and all telemetry is
// reset, so every report describes the current pass only.
//
// USAGE
// ─────
//   cargo run --example edge_player                         # generated scene
//   cargo run --example edge_player -- path/to/img.png      # pan across an image
//   cargo run --example edge_player -- path/to/img.png 30 3 # 30 frames/strategy, 3 loops
//   cargo run --example edge_player --features opencl       # real OpenCL device

use edgecl::filter::{apply_cpu, FilterStrategy};
use edgecl::gpu::{ComputeApi, GpuSession};
use edgecl::image::Image;
use edgecl::telemetry::StrategyTelemetry;

use tracing::{info, warn};

const WIDTH: usize = 640;
const HEIGHT: usize = 480;

/// Active filter, `None` meaning pass-through.
const CYCLE: [Option<FilterStrategy>; 4] = [
    None,
    Some(FilterStrategy::Naive),
    Some(FilterStrategy::Separable),
    Some(FilterStrategy::Gpu),
];

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let source = match args.get(1) {
        Some(path) => load_image(path),
        None => {
            info!("no image path given, using generated scene");
            None
        }
    };
    let per_strategy: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(20);
    let loops: usize = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(2);

    #[cfg(feature = "opencl")]
    let api = edgecl::gpu::OpenClApi::new();
    #[cfg(not(feature = "opencl"))]
    let api = edgecl::gpu::EmulatedApi::default();

    play(api, source.as_ref(), per_strategy, loops);
}

fn play<A: ComputeApi>(api: A, source: Option<&Image<u8>>, per_strategy: usize, loops: usize) {
    let mut session = match GpuSession::new(api, WIDTH, HEIGHT) {
        Ok(session) => Some(session),
        Err(e) if e.is_device_absent() => {
            warn!(error = %e, "no compute device, GPU strategy disabled");
            None
        }
        Err(e) => {
            warn!(error = %e, "compute session failed, GPU strategy disabled");
            None
        }
    };

    let total_frames = per_strategy * CYCLE.len();
    let mut telemetry = StrategyTelemetry::new();

    for pass in 0..loops {
        // Playback looped: start every pass from clean statistics.
        telemetry.reset_all();
        if let Some(session) = session.as_mut() {
            session.telemetry_mut().reset();
        }
        info!(pass, frames = total_frames, "playback started");

        for index in 0..total_frames {
            let Some(strategy) = CYCLE[index / per_strategy.max(1) % CYCLE.len()] else {
                continue;
            };
            let mut frame = next_frame(source, index);

            match strategy {
                FilterStrategy::Gpu => {
                    let Some(session) = session.as_mut() else {
                        continue;
                    };
                    match session.transform_image(&mut frame) {
                        Ok(timing) => telemetry.get_mut(strategy).update(timing.elapsed_ms),
                        Err(e) => {
                            warn!(error = %e, "frame dispatch failed");
                            continue;
                        }
                    }
                }
                cpu => {
                    apply_cpu(cpu, &mut frame, telemetry.get_mut(cpu));
                }
            }

            if (index + 1) % per_strategy.max(1) == 0 {
                println!("{}", telemetry.report(strategy));
            }
        }
    }

    if let Some(session) = session {
        if let Err(e) = session.destroy() {
            warn!(error = %e, "teardown reported a failure");
        }
    }
}

/// Frame `index` of the clip: the source panned right by `index` pixels, or
/// a generated scene with a moving block.
fn next_frame(source: Option<&Image<u8>>, index: usize) -> Image<u8> {
    let mut frame = Image::new(WIDTH, HEIGHT);
    match source {
        Some(src) if !src.is_empty() => {
            for y in 0..HEIGHT {
                for x in 0..WIDTH {
                    let sx = (x + index) % src.width();
                    let sy = y % src.height();
                    frame.set(x, y, src.get(sx, sy));
                }
            }
        }
        _ => {
            let bx = (index * 8) % WIDTH;
            for y in 0..HEIGHT {
                for x in 0..WIDTH {
                    let mut v = ((x * 200 / WIDTH) + (y * 55 / HEIGHT)) as u8;
                    if x >= bx && x < bx + 80 && (160..320).contains(&y) {
                        v = 230;
                    }
                    frame.set(x, y, v);
                }
            }
        }
    }
    frame
}

fn load_image(path: &str) -> Option<Image<u8>> {
    match image::open(path) {
        Ok(img) => {
            let img = img.to_luma8();
            let (w, h) = img.dimensions();
            info!(path, width = w, height = h, "loaded source image");
            Some(Image::from_vec(w as usize, h as usize, img.into_raw()))
        }
        Err(e) => {
            warn!(path, error = %e, "failed to open image, using generated scene");
            None
        }
    }
}
