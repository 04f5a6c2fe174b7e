//! softras: depth-buffered software 3D rasterizer engine
//!
//! Loads an OBJ mesh and spins it in front of a free-look camera. All
//! 3D drawing happens on the CPU into a framebuffer that is blitted to
//! the window once per frame; the window, input polling, text and audio
//! come from macroquad.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod config;
mod mesh;
mod renderer;

use macroquad::audio::{load_sound, play_sound, play_sound_once, PlaySoundParams, Sound};
use macroquad::prelude::*;

use app::AppState;
use config::Settings;
use mesh::Mesh;
use renderer::{render_triangles, Framebuffer, Texture as RasterTexture, HEIGHT, WIDTH};

const SETTINGS_PATH: &str = "assets/settings.ron";

fn window_conf() -> Conf {
    Conf {
        window_title: format!("softras v{}", VERSION),
        window_width: WIDTH as i32,
        window_height: HEIGHT as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

async fn load_sound_optional(path: &str, what: &str) -> Option<Sound> {
    if path.is_empty() {
        return None;
    }
    match load_sound(path).await {
        Ok(sound) => Some(sound),
        Err(e) => {
            eprintln!("Failed to load {} {}: {}", what, path, e);
            None
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let settings = Settings::load_or_default(SETTINGS_PATH);

    let mesh = match Mesh::load_obj(&settings.mesh_path) {
        Ok(mesh) => {
            println!("Loaded {} ({} triangles)", settings.mesh_path, mesh.len());
            mesh
        }
        Err(e) => {
            eprintln!("Failed to load {}: {} - using built-in cube", settings.mesh_path, e);
            Mesh::unit_cube()
        }
    };

    let fill_texture = if settings.texture_path.is_empty() {
        Err("no texture configured".to_string())
    } else {
        RasterTexture::from_file(&settings.texture_path)
    }
    .unwrap_or_else(|e| {
        eprintln!("{} - using checkerboard", e);
        RasterTexture::checkerboard(
            64,
            64,
            renderer::Color::new(220, 220, 220),
            renderer::Color::new(90, 60, 120),
        )
    });

    let bgm = load_sound_optional(&settings.bgm_path, "music").await;
    let sfx = load_sound_optional(&settings.sfx_path, "sound").await;
    if let Some(bgm) = &bgm {
        play_sound(bgm, PlaySoundParams { looped: true, volume: 0.5 });
    }

    let mut fb = Framebuffer::new(WIDTH, HEIGHT);
    let mut state = AppState::new(&settings);

    println!("=== softras ===");
    println!("WASD move/turn, arrows strafe/fly, Space/Backspace spin");
    println!("Tab wireframe, T texture, F1 depth view, Esc quit");

    loop {
        let dt = get_frame_time();

        let input = state.handle_input(dt, &settings);
        if input.quit {
            break;
        }
        if input.mode_toggled {
            if let Some(sfx) = &sfx {
                play_sound_once(sfx);
            }
        }

        // model spins about two axes, then slides out in front of the
        // origin; rotation composes before translation
        let world = renderer::Mat4::rotation_z(state.theta * 0.5)
            .mul(&renderer::Mat4::rotation_x(state.theta))
            .mul(&renderer::Mat4::translation(0.0, 0.0, settings.model_distance));

        {
            let mut frame = fb.begin_frame(
                &state.camera,
                settings.light_dir,
                settings.near,
                settings.far,
            );
            let texture = state.textured.then_some(&fill_texture);
            render_triangles(&mut frame, mesh.triangles(), &world, texture, state.wireframe);
            if state.show_depth {
                frame.fb.draw_depth_view();
            }
        }

        // present: blit the framebuffer over the whole window
        let present = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.pixels);
        present.set_filter(FilterMode::Nearest);
        draw_texture_ex(
            &present,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(Vec2::new(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        draw_text(&format!("FPS {}", get_fps()), 10.0, 20.0, 20.0, GREEN);
        draw_text(&state.hud_line(), 10.0, 40.0, 20.0, WHITE);

        next_frame().await;
    }
}
