// Copyright (C) 2025 IJB <strike_radius@protonmail.com>
//
// This file is part of portfolio-intro.
//
// portfolio-intro is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of
// the License, or (at your option) any later version.
//
// portfolio-intro is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with portfolio-intro. If not, see <https://www.gnu.org/licenses/>.

//File: src/main.rs

mod audio;
mod config;
mod error;
mod graphics;
mod intro;
mod utils;

// Crates
extern crate find_folder;
extern crate piston_window;
extern crate rand;
extern crate rodio;

use chrono::Utc;
use clap::Parser;
use log::{error, info, warn};
use piston_window::*;
use std::cell::Cell;
use std::env;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use crate::audio::{AudioManager, CuePlayer, SilentAudio};
use crate::config::resolution::{BACKGROUND, HEIGHT, WIDTH};
use crate::config::IntroSettings;
use crate::graphics::{overlay, scene};
use crate::intro::cooldown::{CooldownStore, FileCooldownStore, MemoryCooldownStore};
use crate::intro::sequence::{IntroPhase, IntroSession};

const WINDOW_TITLE: &str = "FabianoFullStack.dev";

#[derive(Parser, Debug)]
#[command(name = "portfolio-intro", version, about = "Animated splash intro for the portfolio")]
struct Cli {
    /// Play the intro even if it was shown within the cooldown window
    #[arg(long)]
    skip_cooldown: bool,

    /// Fix the particle and network layout
    #[arg(long)]
    seed: Option<u64>,

    /// Override the particle count
    #[arg(long)]
    particles: Option<usize>,
}

fn find_assets_folder(exe_dir: &Path) -> PathBuf {
    if let Ok(dir) = find_folder::Search::ParentsThenKids(3, 3).for_folder("assets") {
        return dir;
    }
    let potential_asset_dirs = [
        Some(exe_dir.join("assets")),
        exe_dir.parent().map(|p| p.join("assets")),
        Some(Path::new(".").join("assets")),
    ];
    for dir in potential_asset_dirs.into_iter().flatten() {
        if dir.exists() {
            return dir;
        }
    }
    warn!("Could not find assets directory. Using default path 'assets'.");
    PathBuf::from("assets")
}

fn draw_intro(
    session: &IntroSession,
    cursor: [f64; 2],
    glyphs: Option<&mut Glyphs>,
    c: &Context,
    g: &mut G2d,
) {
    scene::draw_scene(session.scene(), c, g);

    match session.phase() {
        IntroPhase::Idle | IntroPhase::Loading => {
            overlay::draw_loading(session.progress_fraction(), session.progress(), glyphs, c, g);
        }
        IntroPhase::Ready => {
            let hovered = overlay::button_contains(cursor[0], cursor[1]);
            overlay::draw_ready(session.ready_fade(), hovered, glyphs, c, g);
        }
        IntroPhase::Exiting => overlay::draw_ready(session.ready_fade(), false, glyphs, c, g),
        IntroPhase::Finished | IntroPhase::Bypassed => {}
    }

    overlay::draw_flash(session.flash_alpha(), c, g);
}

/// Stand-in for the portfolio page the intro hands over to
fn draw_main_content(glyphs: Option<&mut Glyphs>, c: &Context, g: &mut G2d) {
    if let Some(glyphs) = glyphs {
        text::Text::new_color([1.0, 1.0, 1.0, 1.0], 40)
            .draw(WINDOW_TITLE, glyphs, &c.draw_state, c.transform.trans(80.0, HEIGHT / 2.0), g)
            .ok();
        text::Text::new_color([0.62, 0.64, 0.7, 1.0], 18)
            .draw(
                "Projects  /  About  /  Experience  /  Contact",
                glyphs,
                &c.draw_state,
                c.transform.trans(80.0, HEIGHT / 2.0 + 40.0),
                g,
            )
            .ok();
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut settings = IntroSettings::load_or_default();
    if let Some(seed) = cli.seed {
        settings.seed = Some(seed);
    }
    if let Some(count) = cli.particles {
        settings.particle_count = count;
    }

    let exe_dir = match env::current_exe() {
        Ok(path) => path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(".")),
        Err(e) => {
            warn!("Failed to get executable path: {}. Using working directory.", e);
            PathBuf::from(".")
        }
    };

    let mut audio: Box<dyn CuePlayer> = match AudioManager::new(settings.master_volume) {
        Ok(mut manager) => {
            if let Err(e) = manager.load_sfx_directory(&exe_dir) {
                warn!("Failed to load sound effects: {}. Intro will continue.", e);
            }
            Box::new(manager)
        }
        Err(e) => {
            warn!("{}. Intro will play without sound.", e);
            Box::new(SilentAudio)
        }
    };

    let mut cooldown_store: Box<dyn CooldownStore> = if cli.skip_cooldown {
        info!("Cooldown ignored for this run.");
        Box::new(MemoryCooldownStore::default())
    } else {
        let store = FileCooldownStore::default_location();
        info!("Cooldown state at {:?}", store.path());
        Box::new(store)
    };

    let intro_done = Rc::new(Cell::new(false));
    let done_flag = Rc::clone(&intro_done);
    let mut session = match IntroSession::mount(
        settings,
        Utc::now().timestamp_millis(),
        cooldown_store.as_mut(),
        Box::new(move || {
            info!("Intro finished, showing main content.");
            done_flag.set(true);
        }),
    ) {
        Ok(session) => Some(session),
        Err(e) => {
            error!("Fatal: Failed to start intro: {}", e);
            std::process::exit(1);
        }
    };

    let mut window: PistonWindow = WindowSettings::new(WINDOW_TITLE, [WIDTH as u32, HEIGHT as u32])
        .resizable(false)
        .exit_on_esc(true)
        .build()
        .unwrap_or_else(|e| {
            error!("Fatal: Failed to build PistonWindow: {}", e);
            std::process::exit(1);
        });
    info!("Window created.");

    let assets_path = find_assets_folder(&exe_dir);
    let font_path = assets_path.join("fonts").join("intro.ttf");
    let mut glyphs = match window.load_font(&font_path) {
        Ok(glyphs) => Some(glyphs),
        Err(e) => {
            warn!("Failed to load font at {:?}: {}. Text will be hidden.", font_path, e);
            None
        }
    };

    let clock = Instant::now();
    let mut cursor = [0.0, 0.0];
    let mut dragging = false;

    while let Some(e) = window.next() {
        let now = clock.elapsed().as_secs_f64();

        if let Some(pos) = e.mouse_cursor_args() {
            if dragging {
                if let Some(session) = session.as_mut() {
                    session
                        .scene_mut()
                        .camera
                        .orbit_drag(pos[0] - cursor[0], pos[1] - cursor[1]);
                }
            }
            cursor = pos;
        }

        if let Some(button) = e.press_args() {
            if let Some(session) = session.as_mut() {
                match button {
                    Button::Keyboard(Key::Return) | Button::Keyboard(Key::Space) => {
                        session.enter(now, audio.as_mut());
                    }
                    Button::Mouse(MouseButton::Left) => {
                        if session.phase() == IntroPhase::Ready
                            && overlay::button_contains(cursor[0], cursor[1])
                        {
                            session.enter(now, audio.as_mut());
                        } else {
                            dragging = true;
                        }
                    }
                    _ => {}
                }
            }
        }
        if let Some(Button::Mouse(MouseButton::Left)) = e.release_args() {
            dragging = false;
        }

        if e.update_args().is_some() {
            match session.as_mut() {
                Some(active) => {
                    active.update(now, audio.as_mut());
                    if active.is_finished() {
                        // dropping the session tears it down
                        session = None;
                    }
                }
                None => audio.update(now),
            }
        }

        if e.render_args().is_some() {
            window.draw_2d(&e, |c, g, device| {
                clear(BACKGROUND, g);
                match session.as_ref() {
                    Some(session) if !intro_done.get() => {
                        draw_intro(session, cursor, glyphs.as_mut(), &c, g)
                    }
                    _ => draw_main_content(glyphs.as_mut(), &c, g),
                }
                if let Some(glyphs) = glyphs.as_mut() {
                    glyphs.factory.encoder.flush(device);
                }
            });
        }
    }

    if let Some(mut session) = session.take() {
        info!("Window closed during the intro, {} timers pending.", session.pending_timers());
        session.teardown();
    }
}
