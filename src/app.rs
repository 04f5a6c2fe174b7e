//! Application state and per-frame input handling

use macroquad::prelude::*;

use crate::config::Settings;
use crate::renderer::{Camera, Vec3};

/// What the input pass decided this frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub quit: bool,
    /// A display mode changed (wireframe/texture/depth view)
    pub mode_toggled: bool,
}

/// Live engine state: the camera, the model spin, and display toggles.
pub struct AppState {
    pub camera: Camera,
    pub theta: f32,
    pub wireframe: bool,
    pub textured: bool,
    pub show_depth: bool,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.fov_y_degrees = settings.fov_y_degrees;
        Self {
            camera,
            theta: 0.0,
            wireframe: false,
            textured: false,
            show_depth: false,
        }
    }

    /// Poll the keyboard and advance camera/scene state by `dt` seconds.
    ///
    /// Held keys (level state) drive continuous movement; pressed keys
    /// (rising edge) drive toggles and quitting.
    pub fn handle_input(&mut self, dt: f32, settings: &Settings) -> FrameInput {
        let mut input = FrameInput::default();

        // continuous movement
        if is_key_down(KeyCode::W) {
            self.camera.move_forward(settings.move_speed * dt);
        }
        if is_key_down(KeyCode::S) {
            self.camera.move_forward(-settings.move_speed * dt);
        }
        if is_key_down(KeyCode::Left) {
            self.camera.move_right(-settings.move_speed * dt);
        }
        if is_key_down(KeyCode::Right) {
            self.camera.move_right(settings.move_speed * dt);
        }
        if is_key_down(KeyCode::Up) {
            self.camera.move_up(settings.move_speed * dt);
        }
        if is_key_down(KeyCode::Down) {
            self.camera.move_up(-settings.move_speed * dt);
        }
        if is_key_down(KeyCode::A) {
            self.camera.yaw(-settings.turn_speed * dt);
        }
        if is_key_down(KeyCode::D) {
            self.camera.yaw(settings.turn_speed * dt);
        }

        // model spin
        if is_key_down(KeyCode::Space) {
            self.theta += settings.spin_speed * dt;
        }
        if is_key_down(KeyCode::Backspace) {
            self.theta -= settings.spin_speed * dt;
        }

        // edge-triggered toggles
        if is_key_pressed(KeyCode::Tab) {
            self.wireframe = !self.wireframe;
            input.mode_toggled = true;
        }
        if is_key_pressed(KeyCode::T) {
            self.textured = !self.textured;
            input.mode_toggled = true;
        }
        if is_key_pressed(KeyCode::F1) {
            self.show_depth = !self.show_depth;
            input.mode_toggled = true;
        }
        if is_key_pressed(KeyCode::Escape) {
            input.quit = true;
        }

        input
    }

    pub fn hud_line(&self) -> String {
        format!(
            "cam ({:.1}, {:.1}, {:.1})  {}{}{}",
            self.camera.position.x,
            self.camera.position.y,
            self.camera.position.z,
            if self.wireframe { "[wire] " } else { "" },
            if self.textured { "[tex] " } else { "" },
            if self.show_depth { "[depth]" } else { "" },
        )
    }
}
