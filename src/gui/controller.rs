use std::time::Instant;

use kiss3d::event::{Action, Event, Key, WindowEvent};
use tracing::info;

use super::view::View;
use crate::config::SecondsPerTick;

// Key config, all in one place
const KEY_PREV_FOCUS: Key = Key::Q;
const KEY_NEXT_FOCUS: Key = Key::E;
const KEY_SPEED_UP: Key = Key::Period;
const KEY_SLOW_DOWN: Key = Key::Comma;
const KEY_REVERSE: Key = Key::R;
const KEY_TOGGLE_PAUSE: Key = Key::Space;
const KEY_TOGGLE_ORBITS: Key = Key::O;
const KEY_BACK_TO_START: Key = Key::Home;
const KEY_QUIT: Key = Key::Escape;

pub struct Controller {
    speed_range: SecondsPerTick,
    fps_counter: FpsCounter,
}

pub struct FpsCounter {
    instant: Instant,
    counter: usize,
    window_size_millis: usize,
    previous_fps: f64,
}

impl FpsCounter {
    pub fn new(window_size_millis: usize) -> Self {
        FpsCounter {
            instant: Instant::now(),
            counter: 0,
            previous_fps: 0.0,
            window_size_millis,
        }
    }

    pub fn reset(&mut self) {
        self.instant = Instant::now();
        self.counter = 0;
    }

    pub fn value(&self) -> f64 {
        self.previous_fps
    }

    pub fn increment(&mut self) {
        self.counter += 1;

        let elapsed = self.instant.elapsed();
        if elapsed.as_millis() > self.window_size_millis as u128 {
            self.previous_fps = (1000 * self.counter) as f64 / elapsed.as_millis() as f64;
            self.reset();
        }
    }
}

/// Scales the rate of simulated time by `factor`, keeping its magnitude in
/// `range`. A negative factor reverses the direction of time.
fn scale_speed(seconds_per_tick: f64, factor: f64, range: &SecondsPerTick) -> f64 {
    let magnitude = nalgebra::clamp(
        seconds_per_tick.abs() * factor.abs(),
        range.min,
        range.max,
    );
    magnitude.copysign(seconds_per_tick * factor)
}

impl Controller {
    pub fn new(speed_range: SecondsPerTick) -> Self {
        Controller {
            speed_range,
            fps_counter: FpsCounter::new(1000),
        }
    }

    pub fn process_event(&mut self, event: Event, view: &mut View) {
        match event.value {
            WindowEvent::Key(KEY_NEXT_FOCUS, Action::Press, _) => view.camera_focus_next(),
            WindowEvent::Key(KEY_PREV_FOCUS, Action::Press, _) => view.camera_focus_prev(),
            WindowEvent::Key(KEY_SPEED_UP, Action::Press, _) => self.change_speed(view, 2.0),
            WindowEvent::Key(KEY_SLOW_DOWN, Action::Press, _) => self.change_speed(view, 0.5),
            WindowEvent::Key(KEY_REVERSE, Action::Press, _) => self.change_speed(view, -1.0),
            WindowEvent::Key(KEY_TOGGLE_PAUSE, Action::Press, _) => {
                view.simulation_mut().toggle_playing();
            }
            WindowEvent::Key(KEY_TOGGLE_ORBITS, Action::Press, _) => view.toggle_orbits(),
            WindowEvent::Key(KEY_BACK_TO_START, Action::Press, _) => view.back_to_start(),
            WindowEvent::Key(KEY_QUIT, Action::Press, _) => view.simulation_mut().kill(),
            _ => {}
        }
    }

    fn change_speed(&self, view: &mut View, factor: f64) {
        let simulation = view.simulation_mut();
        let speed = scale_speed(simulation.seconds_per_tick(), factor, &self.speed_range);
        simulation.set_seconds_per_tick(speed);
        info!("Timestep is {} s / tick", speed);
    }

    pub fn fps(&self) -> f64 {
        self.fps_counter.value()
    }

    pub fn increment_frame_counter(&mut self) {
        self.fps_counter.increment()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_speed() {
        let range = SecondsPerTick {
            initial: 3600.0,
            min: 1.0,
            max: 10_000.0,
        };
        assert_eq!(scale_speed(3600.0, 2.0, &range), 7200.0);
        assert_eq!(scale_speed(7200.0, 2.0, &range), 10_000.0);
        assert_eq!(scale_speed(1.5, 0.5, &range), 1.0);

        // Reversing keeps the magnitude, and the range applies either way
        assert_eq!(scale_speed(3600.0, -1.0, &range), -3600.0);
        assert_eq!(scale_speed(-7200.0, 2.0, &range), -10_000.0);
        assert_eq!(scale_speed(-3600.0, -1.0, &range), 3600.0);
    }
}
