use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use plotters::prelude::*;
use tracing::info;

use cosmo_trail::config::{ScenarioConfig, ScenarioOverrides};
use cosmo_trail::logging::init_logging;
use cosmo_trail::trails::TrailScene;

/// Runs a scenario without a window, and plots one body's motion trace, as
/// seen from its primary, to a PNG.
#[derive(Debug, Parser)]
struct Args {
    /// Scenario file (RON)
    scenario: PathBuf,

    /// Body to trace
    #[arg(long)]
    body: String,

    /// Frames to simulate
    #[arg(long, default_value_t = 1000)]
    frames: usize,

    /// Where to write the plot
    #[arg(long, default_value = "plots/trace.png")]
    output: PathBuf,

    #[command(flatten)]
    overrides: ScenarioOverrides,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.overrides.log_level.as_deref());

    let mut config = ScenarioConfig::load(&args.scenario)?;
    config.apply_cli_overrides(&args.overrides);

    let mut scene = TrailScene::new(config.build_simulation()?, config.solid_lines());
    let id = scene
        .simulation()
        .orrery()
        .body_by_name(&args.body)
        .map(|body| body.id)
        .ok_or_else(|| format!("No body named {}", args.body))?;
    scene.set_focus(Some(id));

    scene.simulation_mut().start();
    for _ in 0..args.frames {
        scene.step();
    }
    info!(
        "Simulated {} frames, now at JD {}",
        args.frames,
        scene.simulation().current_jd()
    );

    let tracer = scene
        .tracers()
        .get(id)
        .ok_or_else(|| format!("{} has no tracer", args.body))?;
    let used = tracer.current_vertex() + 1;
    let points: Vec<(f64, f64)> = tracer.vertices().take(used).map(|p| (p.x, p.y)).collect();
    let color = tracer.color();
    let color = RGBColor(
        (color.x * 255.0) as u8,
        (color.y * 255.0) as u8,
        (color.z * 255.0) as u8,
    );

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let title = format!("{} ({} frames)", args.body, args.frames);
    draw_plot(&args.output, &title, &points, color)?;
    info!("Wrote {}", args.output.display());
    Ok(())
}

fn draw_plot(
    path: &Path,
    title: &str,
    points: &[(f64, f64)],
    color: RGBColor,
) -> Result<(), Box<dyn Error>> {
    // Square axes, so orbits don't get squashed
    let extent = points
        .iter()
        .map(|(x, y)| x.abs().max(y.abs()))
        .fold(0.0, f64::max)
        .max(1.0)
        * 1.1;

    let root = BitMapBackend::new(path, (800, 800)).into_drawing_area();
    root.fill(&BLACK)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24).into_font().color(&WHITE))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(-extent..extent, -extent..extent)?;

    chart
        .configure_mesh()
        .axis_style(WHITE.mix(0.5))
        .light_line_style(WHITE.mix(0.05))
        .bold_line_style(WHITE.mix(0.1))
        .label_style(("sans-serif", 12).into_font().color(&WHITE))
        .draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), &color))?;
    // The primary sits at the origin
    chart.draw_series(std::iter::once(Circle::new((0.0, 0.0), 4, WHITE.filled())))?;

    root.present()?;
    Ok(())
}
