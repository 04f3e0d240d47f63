use clap::{Parser, Subcommand};
use glam::Vec3;
use orbitview_camera::{ButtonMask, OrbitCamera};
use orbitview_render::{FrameContext, FrameDriver, FrameSink, ManualClock, Projection};
use orbitview_scene::unit_cube;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orbitview-cli", about = "CLI tool for orbitview operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default pipeline constants
    Info,
    /// Run the camera headless for a number of ticks and report where it
    /// settles
    Simulate {
        /// Number of ticks to run
        #[arg(short, long, default_value = "120")]
        ticks: u64,
        /// Simulated frame step in milliseconds
        #[arg(short, long, default_value = "16.666")]
        step_ms: f64,
        /// Wheel delta applied before the run (negative zooms out)
        #[arg(short = 'z', long, default_value = "-20")]
        wheel: f32,
        /// Horizontal drag in pixels applied before the run
        #[arg(short, long, default_value = "150")]
        drag: f32,
    },
    /// Inspect the built-in demo geometry
    Mesh,
}

/// Sink that keeps the last composed frame instead of drawing it.
struct LastFrame(Option<FrameContext>);

impl FrameSink for LastFrame {
    fn render_frame(&mut self, ctx: &FrameContext) {
        self.0 = Some(*ctx);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("orbitview-cli v{}", env!("CARGO_PKG_VERSION"));
            let p = Projection::default();
            println!(
                "projection: fov_y={:.4} rad, near={}, far={}",
                p.fov_y, p.near, p.far
            );
            let camera = OrbitCamera::default();
            println!(
                "camera defaults: recoil={}, view distance={}",
                camera.target.recoil,
                camera.view_distance()
            );
        }
        Commands::Simulate {
            ticks,
            step_ms,
            wheel,
            drag,
        } => {
            println!("Headless run: ticks={ticks}, step={step_ms}ms");

            let mut camera = OrbitCamera::default();
            camera.wheel_scrolled(wheel);
            camera.pointer_moved(drag, drag / 3.0, ButtonMask::ROTATE);

            let mut driver = FrameDriver::new(camera, Projection::default());
            let mut clock = ManualClock::new(step_ms);
            let mut sink = LastFrame(None);

            let mut remaining = ticks.max(1);
            driver.run(&mut clock, &mut sink, |_| {
                remaining -= 1;
                remaining == 0
            });

            let cam = &driver.camera;
            println!(
                "target:  recoil={:.3}, yaw={:.3}, pitch={:.3}",
                cam.target.recoil, cam.target.rotation.x, cam.target.rotation.y
            );
            println!(
                "current: recoil={:.3}, yaw={:.3}, pitch={:.3}",
                cam.current.recoil, cam.current.rotation.x, cam.current.rotation.y
            );
            println!("view distance: {:.3}", cam.view_distance());

            if let Some(ctx) = sink.0 {
                // where the world origin lands on the page
                let origin = ctx.mvp.project_point3(Vec3::ZERO);
                println!(
                    "origin projects to ({:.4}, {:.4}), depth {:.4}",
                    origin.x, origin.y, origin.z
                );
                println!("frames rendered: {}", driver.ticks());
            }
        }
        Commands::Mesh => {
            let cube = unit_cube();
            println!(
                "unit cube: {} vertices, {} indices, stride {}",
                cube.vertex_count(),
                cube.index_count(),
                cube.layout().stride()
            );
        }
    }

    Ok(())
}
