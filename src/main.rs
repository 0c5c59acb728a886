use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use kiss3d::light::Light;
use kiss3d::window::Window;
use tracing::info;

use cosmo_trail::config::{ScenarioConfig, ScenarioOverrides};
use cosmo_trail::gui::Viewer;
use cosmo_trail::logging::init_logging;
use cosmo_trail::trails::TrailScene;

/// Plays a scenario in a window, drawing orbit lines and motion traces.
#[derive(Debug, Parser)]
struct Args {
    /// Scenario file (RON)
    #[arg(default_value = "scenarios/solar-system.ron")]
    scenario: PathBuf,

    /// Start playing right away instead of paused
    #[arg(long)]
    play: bool,

    /// Write the scenario, with overrides applied, to this file
    #[arg(long)]
    save_scenario: Option<PathBuf>,

    #[command(flatten)]
    overrides: ScenarioOverrides,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.overrides.log_level.as_deref());

    let mut config = ScenarioConfig::load(&args.scenario)?;
    config.apply_cli_overrides(&args.overrides);
    if let Some(path) = &args.save_scenario {
        config.save(path)?;
    }

    let mut simulation = config.build_simulation()?;
    if args.play {
        simulation.start();
    }
    let scene = TrailScene::new(simulation, config.solid_lines());

    let mut window = Window::new(&config.title);
    window.set_light(Light::StickToCamera);
    window.set_framerate_limit(Some(60));

    let viewer = Viewer::new(scene, config.seconds_per_tick, &mut window);
    window.render_loop(viewer);
    info!("Window closed");
    Ok(())
}
