use std::path::PathBuf;

use approx::assert_relative_eq;
use cosmo_trail::astro::DAY;
use cosmo_trail::config::ScenarioConfig;
use cosmo_trail::model::FrameOutcome;
use cosmo_trail::trails::{LineStyle, TrailScene, SCENE_SIZE};

fn scenario_path(name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "scenarios", name].iter().collect()
}

/// A planet around a star, integrated. The star is a million times heavier.
const TWO_BODY: &str = r#"(
    name: "two-body",
    use_physics: true,
    seconds_per_tick: (initial: 3600.0),
    calculations_per_tick: 10,
    bodies: [
        (name: "star", mass: 1e30, radius: 500000.0, is_central: true),
        (name: "planet", mass: 1e24, radius: 6000.0, elements: Some((a: 1.5e8, e: 0.0))),
    ],
)"#;

#[test]
fn test_two_body_physics() {
    let config = ScenarioConfig::from_ron_str(TWO_BODY).unwrap();
    let mut simulation = config.build_simulation().unwrap();

    let rates = *simulation.ticker().rates();
    assert_eq!(rates.calculations_per_tick, 10);
    assert_eq!(rates.delta_t_increment, 360.0);

    // Barycentric frame: the star recoils, and the system barely drifts
    let orrery = simulation.orrery();
    let star = orrery.central();
    let planet = orrery.body_by_name("planet").unwrap();
    assert!(star.velocity.norm() > 0.0);
    let planet_momentum = (planet.velocity * planet.mass).norm();
    assert!(orrery.total_momentum().norm() < 1e-5 * planet_momentum);
    let radius = (planet.position - star.position).norm();

    let start_jd = simulation.current_jd();
    simulation.start();
    for _ in 0..24 {
        assert!(matches!(
            simulation.frame(),
            FrameOutcome::Advanced { elapsed } if elapsed == 3600.0
        ));
    }
    assert_relative_eq!(simulation.current_jd() - start_jd, 1.0, max_relative = 1e-12);

    // A circular orbit stays circular for a day
    let orrery = simulation.orrery();
    let star = orrery.central();
    let planet = orrery.body_by_name("planet").unwrap();
    assert_relative_eq!(
        (planet.position - star.position).norm(),
        radius,
        max_relative = 1e-4
    );
}

#[test]
fn test_solar_system_scenario() {
    let config = ScenarioConfig::load(&scenario_path("solar-system.ron")).unwrap();
    assert!(!config.solid_lines());
    let simulation = config.build_simulation().unwrap();

    let orrery = simulation.orrery();
    assert_eq!(orrery.central().name(), "sun");
    let earth = orrery.body_by_name("earth").unwrap();
    let moon = orrery.body_by_name("moon").unwrap();
    assert!(earth.id < moon.id);
    assert_eq!(moon.parent, Some(earth.id));
    // Without physics, only the central body keeps its mass
    assert_eq!(earth.mass, 1.0);
    // Roughly a year
    assert_relative_eq!(earth.period().unwrap() / DAY, 365.25, max_relative = 1e-2);

    let moon = moon.id;
    let halley = orrery.body_by_name("halley").unwrap().id;
    let mut scene = TrailScene::new(simulation, config.solid_lines());

    // The largest orbit fills the scene
    let largest = scene.simulation().orrery().largest_semimajor_axis();
    assert_relative_eq!(scene.scale().length(largest), SCENE_SIZE);

    let moon_lines = scene.orbit_lines().get(moon).unwrap();
    assert_eq!(moon_lines.orbit().unwrap().style(), LineStyle::Solid);
    let halley_len = scene
        .orbit_lines()
        .get(halley)
        .unwrap()
        .orbit()
        .unwrap()
        .positions()
        .len();

    scene.simulation_mut().start();
    for _ in 0..200 {
        scene.step();
    }

    // Forced traces come up on their own, in their own frame
    let tracer = scene.tracers().get(halley).unwrap();
    assert!(tracer.is_visible());
    assert_eq!(tracer.trace_from(), Some(scene.simulation().orrery().central_id()));
    assert!(tracer.current_vertex() > 1);

    let orbit = scene.orbit_lines().get(halley).unwrap().orbit().unwrap();
    assert_eq!(orbit.positions().len(), halley_len);
    assert_eq!(orbit.colors().len(), halley_len);
}

#[test]
fn test_physics_scenario_forces_solid_lines() {
    let config = ScenarioConfig::load(&scenario_path("inner-planets-physics.ron")).unwrap();
    assert!(config.solid_lines());

    let mut scene = TrailScene::new(config.build_simulation().unwrap(), config.solid_lines());
    assert!(scene
        .orbit_lines()
        .iter()
        .filter_map(|lines| lines.orbit())
        .all(|orbit| orbit.style() == LineStyle::Solid));

    // Masses are kept when integrating
    let earth = scene.simulation().orrery().body_by_name("earth").unwrap();
    assert_eq!(earth.mass, 5.972e24);

    scene.simulation_mut().start();
    for _ in 0..48 {
        scene.step();
    }
    assert_relative_eq!(
        scene.simulation().current_jd() - scene.start_jd(),
        2.0,
        max_relative = 1e-12
    );

    scene.back_to_start();
    assert_eq!(scene.simulation().current_jd(), scene.start_jd());
    assert_eq!(scene.step(), FrameOutcome::Redraw);
}
