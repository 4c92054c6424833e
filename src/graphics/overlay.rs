// graphics/overlay.rs

use piston_window::character::CharacterCache;
use piston_window::*;

use crate::config::resolution::{HEIGHT, WIDTH};
use crate::utils::math::lerp;

const ACCENT: [f32; 4] = [0.0, 0.95, 1.0, 1.0];
const PRIMARY: [f32; 4] = [0.66, 0.0, 1.0, 1.0];
const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const MUTED: [f32; 4] = [0.62, 0.64, 0.7, 1.0];
const BAR_TRACK: [f32; 4] = [1.0, 1.0, 1.0, 0.1];
const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

const BAR_WIDTH: f64 = 300.0;
const BAR_HEIGHT: f64 = 4.0;
const BUTTON_WIDTH: f64 = 260.0;
const BUTTON_HEIGHT: f64 = 56.0;
const BUTTON_Y: f64 = HEIGHT / 2.0 + 90.0;

pub const LOADING_TITLE: &str = "CARREGANDO SISTEMA";
pub const READY_TITLE: &str = "SISTEMA";
pub const READY_TITLE_ACCENT: &str = " INICIALIZADO";
pub const READY_SUBTITLE: &str = "BEM VINDO AO FabianoFullStack.dev";
pub const BUTTON_LABEL: &str = "ENTRAR";

/// Screen rectangle of the call-to-action, `[x, y, w, h]`
pub fn button_rect() -> [f64; 4] {
    [WIDTH / 2.0 - BUTTON_WIDTH / 2.0, BUTTON_Y, BUTTON_WIDTH, BUTTON_HEIGHT]
}

pub fn button_contains(x: f64, y: f64) -> bool {
    let [bx, by, bw, bh] = button_rect();
    x >= bx && x <= bx + bw && y >= by && y <= by + bh
}

fn with_alpha(color: [f32; 4], alpha: f64) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha.clamp(0.0, 1.0) as f32]
}

/// Draws `text` horizontally centered on `center_x` with its baseline at `y`
fn centered_text(
    text: &str,
    size: u32,
    color: [f32; 4],
    center_x: f64,
    y: f64,
    glyphs: &mut Glyphs,
    c: &Context,
    g: &mut G2d,
) {
    let width = glyphs.width(size, text).unwrap_or(0.0);
    text::Text::new_color(color, size)
        .draw(text, glyphs, &c.draw_state, c.transform.trans(center_x - width / 2.0, y), g)
        .ok();
}

/// Loading title, progress bar and percentage readout
pub fn draw_loading(fraction: f64, percent: u32, glyphs: Option<&mut Glyphs>, c: &Context, g: &mut G2d) {
    let cx = WIDTH / 2.0;
    let cy = HEIGHT / 2.0;
    let bar_x = cx - BAR_WIDTH / 2.0;

    rectangle(BAR_TRACK, [bar_x, cy, BAR_WIDTH, BAR_HEIGHT], c.transform, g);
    rectangle(
        ACCENT,
        [bar_x, cy, BAR_WIDTH * fraction.clamp(0.0, 1.0), BAR_HEIGHT],
        c.transform,
        g,
    );

    if let Some(glyphs) = glyphs {
        centered_text(LOADING_TITLE, 32, WHITE, cx, cy - 24.0, glyphs, c, g);
        centered_text(&format!("{}%", percent), 16, ACCENT, cx, cy + 34.0, glyphs, c, g);
    }
}

/// Title, subtitle and ENTRAR button. `fade` runs 0..=1 and drives both the
/// opacity and a 0.9 -> 1.0 zoom.
pub fn draw_ready(fade: f64, hovered: bool, glyphs: Option<&mut Glyphs>, c: &Context, g: &mut G2d) {
    let cx = WIDTH / 2.0;
    let cy = HEIGHT / 2.0;
    let zoom = lerp(0.9, 1.0, fade.clamp(0.0, 1.0));
    let zoomed = c.trans(cx, cy).zoom(zoom).trans(-cx, -cy);

    let [bx, by, bw, bh] = button_rect();
    if hovered {
        rectangle(with_alpha(ACCENT, fade), [bx, by, bw, bh], zoomed.transform, g);
    }
    Rectangle::new_border(with_alpha(ACCENT, fade), 1.0).draw(
        [bx, by, bw, bh],
        &zoomed.draw_state,
        zoomed.transform,
        g,
    );

    if let Some(glyphs) = glyphs {
        let title_size = 56;
        let title_width = glyphs.width(title_size, READY_TITLE).unwrap_or(0.0);
        let accent_width = glyphs.width(title_size, READY_TITLE_ACCENT).unwrap_or(0.0);
        let title_x = cx - (title_width + accent_width) / 2.0;

        text::Text::new_color(with_alpha(WHITE, fade), title_size)
            .draw(READY_TITLE, glyphs, &zoomed.draw_state, zoomed.transform.trans(title_x, cy - 40.0), g)
            .ok();
        text::Text::new_color(with_alpha(PRIMARY, fade), title_size)
            .draw(
                READY_TITLE_ACCENT,
                glyphs,
                &zoomed.draw_state,
                zoomed.transform.trans(title_x + title_width, cy - 40.0),
                g,
            )
            .ok();

        centered_text(READY_SUBTITLE, 20, with_alpha(MUTED, fade), cx, cy + 10.0, glyphs, &zoomed, g);

        let label_color = if hovered { BLACK } else { ACCENT };
        centered_text(
            BUTTON_LABEL,
            22,
            with_alpha(label_color, fade),
            cx,
            by + bh / 2.0 + 8.0,
            glyphs,
            &zoomed,
            g,
        );
    }
}

/// Full-screen white flash
pub fn draw_flash(alpha: f64, c: &Context, g: &mut G2d) {
    if alpha <= 0.0 {
        return;
    }
    rectangle(with_alpha(WHITE, alpha), [0.0, 0.0, WIDTH, HEIGHT], c.transform, g);
}
