//! Scenario files: the bodies of a simulation and how it should run.

use std::collections::HashMap;
use std::path::Path;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ConfigError;
use crate::astro::{ElementRates, OrbitalElements, J2000, KM};
use crate::model::simulation::DEFAULT_CALCULATIONS_PER_TICK;
use crate::model::{
    BodyID, BodyInfo, BodyMotion, Orrery, Simulation, SimulationSettings, VerletIntegrator,
};
use crate::trails::color::parse_hex;

/// Top-level scenario description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Short identifier.
    pub name: String,
    /// Window title.
    pub title: String,
    /// Julian date the simulation starts at.
    pub start_jd: f64,
    /// Integrate gravity instead of following orbital elements.
    pub use_physics: bool,
    /// Move the central body so the system's center of mass stays put.
    pub use_barycenter: bool,
    /// Draw every orbit as a solid line.
    pub force_solid_lines: bool,
    /// Simulated seconds per frame.
    pub seconds_per_tick: SecondsPerTick,
    /// Integration substeps per frame.
    pub calculations_per_tick: u32,
    /// Every body, in any order.
    pub bodies: Vec<BodyConfig>,
}

/// Initial rate of simulated time, and the range it can be adjusted in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SecondsPerTick {
    pub initial: f64,
    pub min: f64,
    pub max: f64,
}

/// One body of a scenario. Distances are in km, angles in degrees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BodyConfig {
    pub name: String,
    /// kg
    pub mass: f64,
    /// km
    pub radius: f64,
    /// `rrggbb` hex.
    pub color: String,
    /// Color of the motion trace, if not the body's own.
    pub trace_color: Option<String>,
    pub is_central: bool,
    /// Never moved by the barycentric correction.
    pub is_still: bool,
    /// The body this one orbits. Bodies without one orbit the central body.
    pub relative_to: Option<String>,
    /// Body whose frame this body's trace is drawn in.
    pub trace_relative_to: Option<String>,
    /// Seconds per turn around the body's own axis.
    pub sidereal_day: Option<f64>,
    pub show_solid_orbit: bool,
    pub force_trace: bool,
    pub elements: Option<ElementsConfig>,
    /// Secular drift of the elements, per Julian century. Having rates makes
    /// the orbit re-evaluable.
    pub rates: Option<RatesConfig>,
    /// Initial position for bodies without elements, km.
    pub position: Option<(f64, f64, f64)>,
    /// Initial velocity for bodies without elements, km/s.
    pub velocity: Option<(f64, f64, f64)>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ElementsConfig {
    pub a: f64,
    pub e: f64,
    pub i: f64,
    pub node: f64,
    pub peri: f64,
    pub mean_anomaly: f64,
    /// Julian date the mean anomaly is given at.
    pub epoch: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RatesConfig {
    pub a: f64,
    pub e: f64,
    pub i: f64,
    pub node: f64,
    pub peri: f64,
    pub mean_anomaly: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: "scenario".to_string(),
            title: "Cosmo Trail".to_string(),
            start_jd: J2000,
            use_physics: false,
            use_barycenter: true,
            force_solid_lines: false,
            seconds_per_tick: SecondsPerTick::default(),
            calculations_per_tick: DEFAULT_CALCULATIONS_PER_TICK,
            bodies: vec![],
        }
    }
}

impl Default for SecondsPerTick {
    fn default() -> Self {
        Self {
            initial: 3600.0,
            min: 1.0,
            max: 30.0 * 86400.0,
        }
    }
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            mass: 0.0,
            radius: 1.0,
            color: "ffffff".to_string(),
            trace_color: None,
            is_central: false,
            is_still: false,
            relative_to: None,
            trace_relative_to: None,
            sidereal_day: None,
            show_solid_orbit: false,
            force_trace: false,
            elements: None,
            rates: None,
            position: None,
            velocity: None,
        }
    }
}

impl Default for ElementsConfig {
    fn default() -> Self {
        Self {
            a: 0.0,
            e: 0.0,
            i: 0.0,
            node: 0.0,
            peri: 0.0,
            mean_anomaly: 0.0,
            epoch: J2000,
        }
    }
}

impl ElementsConfig {
    fn to_elements(self, body: &str) -> Result<OrbitalElements, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidElements {
            body: body.to_string(),
            reason,
        };
        if !(self.a > 0.0) {
            return Err(invalid(format!("semi-major axis must be positive, got {}", self.a)));
        }
        if !(0.0..1.0).contains(&self.e) {
            return Err(invalid(format!("eccentricity must be in [0, 1), got {}", self.e)));
        }
        Ok(OrbitalElements::from_kepler(
            self.a * KM,
            self.e,
            self.i.to_radians(),
            self.node.to_radians(),
            self.peri.to_radians(),
            self.mean_anomaly.to_radians(),
            self.epoch,
        ))
    }
}

impl From<RatesConfig> for ElementRates {
    fn from(rates: RatesConfig) -> Self {
        ElementRates {
            a: rates.a * KM,
            e: rates.e,
            i: rates.i.to_radians(),
            node: rates.node.to_radians(),
            peri: rates.peri.to_radians(),
            mean_anomaly: rates.mean_anomaly.to_radians(),
        }
    }
}

fn parse_color(s: &str) -> Result<Point3<f32>, ConfigError> {
    parse_hex(s).ok_or_else(|| ConfigError::InvalidColor(s.to_string()))
}

fn km_vector((x, y, z): (f64, f64, f64)) -> Vector3<f64> {
    Vector3::new(x, y, z) * KM
}

impl ScenarioConfig {
    /// Parses a scenario from RON text.
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(ConfigError::Parse)
    }

    /// Loads a scenario from a RON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        let config = Self::from_ron_str(&contents)?;
        info!(
            "Loaded scenario {} with {} bodies from {}",
            config.name,
            config.bodies.len(),
            path.display()
        );
        Ok(config)
    }

    /// Writes the scenario out as RON, e.g. to keep the result of CLI
    /// overrides around.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(ConfigError::Write)?;
        }

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(false)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(path, serialized).map_err(ConfigError::Write)?;
        info!("Saved scenario {} to {}", self.name, path.display());
        Ok(())
    }

    pub fn settings(&self) -> SimulationSettings {
        SimulationSettings {
            use_physics: self.use_physics,
            use_barycenter: self.use_barycenter,
            seconds_per_tick: self.seconds_per_tick.initial,
            calculations_per_tick: self.calculations_per_tick,
        }
    }

    /// Orbit lines are solid when asked for, and always when integrating,
    /// since integrated bodies don't follow their elements.
    pub fn solid_lines(&self) -> bool {
        self.force_solid_lines || self.use_physics
    }

    fn index_by_name(&self) -> Result<HashMap<&str, usize>, ConfigError> {
        let mut by_name = HashMap::new();
        for (idx, body) in self.bodies.iter().enumerate() {
            if by_name.insert(body.name.as_str(), idx).is_some() {
                return Err(ConfigError::DuplicateBody(body.name.clone()));
            }
        }
        Ok(by_name)
    }

    fn lookup(
        by_name: &HashMap<&str, usize>,
        body: &str,
        other: &str,
    ) -> Result<usize, ConfigError> {
        by_name
            .get(other)
            .copied()
            .ok_or_else(|| ConfigError::UnknownParent {
                body: body.to_string(),
                parent: other.to_string(),
            })
    }

    /// How many `relative_to` links separate each body from the root frame.
    fn depths(&self, by_name: &HashMap<&str, usize>) -> Result<Vec<usize>, ConfigError> {
        let mut depths = Vec::with_capacity(self.bodies.len());
        for body in self.bodies.iter() {
            let mut depth = 0;
            let mut current = body;
            while let Some(parent) = current.relative_to.as_deref() {
                depth += 1;
                if depth > self.bodies.len() {
                    return Err(ConfigError::CyclicParent(body.name.clone()));
                }
                current = &self.bodies[Self::lookup(by_name, &current.name, parent)?];
            }
            depths.push(depth);
        }
        Ok(depths)
    }

    /// Index of the central body: the first one flagged, otherwise the
    /// heaviest.
    fn central_index(&self) -> Option<usize> {
        self.bodies.iter().position(|b| b.is_central).or_else(|| {
            self.bodies
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.mass.total_cmp(&b.mass))
                .map(|(idx, _)| idx)
        })
    }

    /// Creates every body, parents before their children.
    pub fn build_orrery(&self) -> Result<Orrery, ConfigError> {
        if self.bodies.is_empty() {
            return Err(ConfigError::NoBodies);
        }

        let by_name = self.index_by_name()?;
        let depths = self.depths(&by_name)?;
        let central = self.central_index().ok_or(ConfigError::NoBodies)?;

        // Stable, so bodies at the same depth keep their file order
        let mut order: Vec<usize> = (0..self.bodies.len()).collect();
        order.sort_by_key(|&idx| depths[idx]);
        let mut new_ids = vec![BodyID(0); self.bodies.len()];
        for (new_idx, &idx) in order.iter().enumerate() {
            new_ids[idx] = BodyID(new_idx);
        }

        let mut orrery = Orrery::new();
        for &idx in order.iter() {
            let config = &self.bodies[idx];
            let name = config.name.as_str();

            let mut info = BodyInfo::new(name, config.radius * KM, parse_color(&config.color)?);
            info.trace_color = match &config.trace_color {
                Some(color) => Some(parse_color(color)?),
                None => None,
            };
            info.is_central = idx == central;
            info.is_still = config.is_still;
            info.sidereal_day = config.sidereal_day;
            info.show_solid_orbit = config.show_solid_orbit;
            info.force_trace = config.force_trace;
            info.trace_relative_to = match &config.trace_relative_to {
                Some(other) => Some(new_ids[Self::lookup(&by_name, name, other)?]),
                None => None,
            };

            let parent_idx = match &config.relative_to {
                Some(parent) => Some(Self::lookup(&by_name, name, parent)?),
                None => None,
            };
            let primary_mass = self.bodies[parent_idx.unwrap_or(central)].mass;

            let motion = match (config.elements, config.rates) {
                (Some(elements), Some(rates)) => BodyMotion::reevaluable(
                    elements.to_elements(name)?,
                    rates.into(),
                    primary_mass,
                    config.mass,
                ),
                (Some(elements), None) => {
                    BodyMotion::fixed(elements.to_elements(name)?, primary_mass, config.mass)
                }
                (None, _) => BodyMotion::Free,
            };

            let position = Point3::from(config.position.map_or(Vector3::zeros(), km_vector));
            let velocity = config.velocity.map_or(Vector3::zeros(), km_vector);

            orrery.add_body(
                info,
                config.mass,
                parent_idx.map(|p| new_ids[p]),
                motion,
                position,
                velocity,
            );
        }

        orrery.choose_central_body();
        Ok(orrery)
    }

    /// Builds the bodies and sets the simulation up at the start date.
    pub fn build_simulation(&self) -> Result<Simulation, ConfigError> {
        let orrery = self.build_orrery()?;
        Ok(Simulation::new(
            orrery,
            self.settings(),
            self.start_jd,
            Box::new(VerletIntegrator::new()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SCENARIO: &str = r##"(
        name: "test",
        start_jd: 2451545.0,
        seconds_per_tick: (initial: 7200.0),
        bodies: [
            (
                name: "moon",
                mass: 7.342e22,
                radius: 1737.0,
                color: "aaaaaa",
                relative_to: Some("earth"),
                elements: Some((a: 384400.0, e: 0.0549, i: 5.145)),
                rates: Some((node: -1934.136)),
            ),
            (
                name: "earth",
                mass: 5.972e24,
                radius: 6371.0,
                color: "#3366ff",
                trace_color: Some("ff0000"),
                elements: Some((a: 149598262.0, e: 0.0167)),
                force_trace: true,
                trace_relative_to: Some("sun"),
            ),
            (
                name: "sun",
                mass: 1.989e30,
                radius: 696342.0,
                color: "ffff00",
            ),
        ],
    )"##;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenarios").join("test.ron");
        let config = ScenarioConfig::from_ron_str(SCENARIO).unwrap();

        config.save(&path).unwrap();
        let loaded = ScenarioConfig::load(&path).unwrap();
        assert_eq!(config, loaded);

        let missing = dir.path().join("missing.ron");
        assert!(matches!(
            ScenarioConfig::load(&missing),
            Err(ConfigError::Read(_))
        ));
    }

    #[test]
    fn test_defaults() {
        let config = ScenarioConfig::from_ron_str("()").unwrap();
        assert_eq!(config, ScenarioConfig::default());
        assert!(config.use_barycenter);
        assert_eq!(config.calculations_per_tick, 10);
        assert!(matches!(config.build_orrery(), Err(ConfigError::NoBodies)));
    }

    #[test]
    fn test_parents_come_first() {
        let config = ScenarioConfig::from_ron_str(SCENARIO).unwrap();
        assert_eq!(config.seconds_per_tick.initial, 7200.0);
        assert_eq!(config.seconds_per_tick.max, SecondsPerTick::default().max);

        let orrery = config.build_orrery().unwrap();
        let names: Vec<_> = orrery.bodies().map(|b| b.name()).collect();
        assert_eq!(names, vec!["earth", "sun", "moon"]);

        // Heaviest body is central
        assert_eq!(orrery.central().name(), "sun");

        let earth = orrery.body_by_name("earth").unwrap();
        let moon = orrery.body_by_name("moon").unwrap();
        let sun = orrery.body_by_name("sun").unwrap();
        assert_eq!(moon.parent, Some(earth.id));
        assert_eq!(earth.parent, None);
        assert_eq!(earth.info.trace_relative_to, Some(sun.id));
        assert_eq!(earth.info.trace_color, Some(Point3::new(1.0, 0.0, 0.0)));
        assert!(earth.info.force_trace);
        assert!(moon.motion.is_reevaluable());
        assert!(!earth.motion.is_reevaluable());
        assert_relative_eq!(moon.semimajor_axis().unwrap(), 384400.0 * KM);
        assert_relative_eq!(earth.info.radius, 6371.0 * KM);
    }

    #[test]
    fn test_bad_references() {
        let mut config = ScenarioConfig::from_ron_str(SCENARIO).unwrap();
        config.bodies[0].relative_to = Some("pluto".to_string());
        assert!(matches!(
            config.build_orrery(),
            Err(ConfigError::UnknownParent { ref parent, .. }) if parent == "pluto"
        ));

        config.bodies[0].relative_to = Some("earth".to_string());
        config.bodies[1].relative_to = Some("moon".to_string());
        assert!(matches!(config.build_orrery(), Err(ConfigError::CyclicParent(_))));

        config.bodies[1].relative_to = None;
        config.bodies[2].name = "earth".to_string();
        assert!(matches!(config.build_orrery(), Err(ConfigError::DuplicateBody(_))));
    }

    #[test]
    fn test_bad_values() {
        let mut config = ScenarioConfig::from_ron_str(SCENARIO).unwrap();
        config.bodies[2].color = "yellow".to_string();
        assert!(matches!(config.build_orrery(), Err(ConfigError::InvalidColor(_))));

        let mut config = ScenarioConfig::from_ron_str(SCENARIO).unwrap();
        if let Some(elements) = config.bodies[1].elements.as_mut() {
            elements.e = 1.5;
        }
        assert!(matches!(
            config.build_orrery(),
            Err(ConfigError::InvalidElements { .. })
        ));

        assert!(matches!(
            ScenarioConfig::from_ron_str("(bodies: 3)"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_flagged_central_body() {
        let mut config = ScenarioConfig::from_ron_str(SCENARIO).unwrap();
        config.bodies[1].is_central = true;
        let orrery = config.build_orrery().unwrap();
        assert_eq!(orrery.central().name(), "earth");
        assert_eq!(orrery.bodies().filter(|b| b.is_central()).count(), 1);
    }

    #[test]
    fn test_free_bodies_use_initial_state() {
        let config = ScenarioConfig::from_ron_str(
            r#"(
                use_physics: true,
                bodies: [
                    (name: "a", mass: 1e30, position: Some((1.0, 2.0, 3.0))),
                    (name: "b", mass: 1e20, velocity: Some((0.0, 30.0, 0.0))),
                ],
            )"#,
        )
        .unwrap();
        assert!(config.solid_lines());

        let orrery = config.build_orrery().unwrap();
        let a = orrery.body_by_name("a").unwrap();
        let b = orrery.body_by_name("b").unwrap();
        assert_eq!(a.position, Point3::new(1e3, 2e3, 3e3));
        assert_eq!(b.velocity, Vector3::new(0.0, 3e4, 0.0));
    }
}
