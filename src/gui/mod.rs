use kiss3d::camera::Camera;
use kiss3d::event::EventManager;
use kiss3d::planar_camera::PlanarCamera;
use kiss3d::post_processing::PostProcessingEffect;
use kiss3d::renderer::Renderer;
use kiss3d::window::{State, Window};

use self::controller::Controller;
use self::view::View;
use crate::config::SecondsPerTick;
use crate::trails::TrailScene;

mod camera;
mod controller;
mod renderer;
mod view;

/// The window-side half of the program: feeds input to the simulation, and
/// draws it.
pub struct Viewer {
    view: View,
    controller: Controller,
}

impl Viewer {
    pub fn new(scene: TrailScene, speed_range: SecondsPerTick, window: &mut Window) -> Self {
        Self {
            view: View::new(scene, window),
            controller: Controller::new(speed_range),
        }
    }

    fn process_user_input(&mut self, mut events: EventManager) {
        for event in events.iter() {
            self.controller.process_event(event, &mut self.view);
        }
    }
}

impl State for Viewer {
    fn cameras_and_effect_and_renderer(
        &mut self,
    ) -> (
        Option<&mut dyn Camera>,
        Option<&mut dyn PlanarCamera>,
        Option<&mut dyn Renderer>,
        Option<&mut dyn PostProcessingEffect>,
    ) {
        self.view.cameras_and_effect_and_renderer()
    }

    fn step(&mut self, window: &mut Window) {
        self.process_user_input(window.events());
        if !self.view.update() {
            window.close();
            return;
        }
        self.view.prerender_scene(window, &self.controller);
        self.controller.increment_frame_counter();
    }
}
