pub mod astro;
pub mod config;
pub mod gui;
pub mod logging;
pub mod math;
pub mod model;
pub mod trails;
