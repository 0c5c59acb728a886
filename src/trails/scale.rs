use nalgebra::Point3;

/// Scene units the largest dimension of a scenario is mapped to.
pub const SCENE_SIZE: f64 = 1000.0;

/// Conversion from simulation meters to scene units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneScale {
    factor: f64,
}

impl SceneScale {
    /// Maps `largest` meters to [SCENE_SIZE] units. A scenario with nothing
    /// orbiting has no meaningful size, and is left unscaled.
    pub fn from_largest_dimension(largest: f64) -> Self {
        let factor = if largest > 0.0 && largest.is_finite() {
            SCENE_SIZE / largest
        } else {
            1.0
        };
        SceneScale { factor }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn length(&self, meters: f64) -> f64 {
        meters * self.factor
    }

    pub fn point(&self, p: &Point3<f64>) -> Point3<f64> {
        *p * self.factor
    }
}

impl Default for SceneScale {
    fn default() -> Self {
        SceneScale { factor: 1.0 }
    }
}
