//! Rotary dial clock, the overlay's built-in face.
//!
//! Instead of moving hands, three pre-rendered numeral rings rotate so the
//! current second, minute and hour line up under a fixed reading window on
//! the east side of the dial. Rings are rendered once at init; every frame
//! just rotates them into place.

use chrono::{Local, Timelike};

use crate::display::{
    draw_rotated, draw_rotated_sized, draw_text_scaled, text_width, Color, Surface, GLYPH_HEIGHT,
};
use crate::render_loop::{FrameInfo, OverlayApp};

/// Edge length of the numeral ring panes
const DIAL_SIZE: u32 = 500;
/// Edge length of the mask pane; also the reference window size
const MASK_SIZE: u32 = 520;
/// Label ring radii, outermost first: seconds, minutes, hours
const SECOND_RADIUS: f32 = 222.0;
const MINUTE_RADIUS: f32 = 162.0;
const HOUR_RADIUS: f32 = 102.0;
/// Reading window on the mask, in mask-local pixels
const WINDOW_RECT: (i32, i32, u32, u32) = (330, 250, 182, 20);

const LABEL_SCALE: u32 = 2;
const VEIL: Color = Color::rgba(0, 0, 0, 170);
const FPS_BACK: Color = Color::rgba(0, 0, 0, 192);
const FPS_TEXT: Color = Color::rgb(0, 255, 0);

/// Rotation angles in degrees for the three rings. The seconds ring sweeps
/// continuously; minutes and hours only sweep during the last second and
/// minute of their cycle so they snap between labels the rest of the time.
fn dial_angles(hour: u32, minute: u32, second: u32, subsec: f32) -> (f32, f32, f32) {
    let second_angle = second as f32 * 6.0 + 6.0 * subsec;

    let mut minute_angle = minute as f32 * 6.0;
    if second == 59 {
        minute_angle += 6.0 * subsec;
    }

    let mut hour_angle = hour as f32 * 15.0;
    if minute == 59 && second == 59 {
        hour_angle += 15.0 * subsec;
    }

    (hour_angle, minute_angle, second_angle)
}

/// Point on a circle around the pane center; angle 0 is due east, growing
/// clockwise
fn ring_point(radius: f32, angle_deg: f32) -> (f32, f32) {
    let center = DIAL_SIZE as f32 / 2.0;
    let rad = angle_deg.to_radians();
    (center + rad.cos() * radius, center + rad.sin() * radius)
}

/// Render one ring of two-digit labels, each rotated tangentially so it
/// reads upright when its slot is under the reading window
fn render_ring(pane: &mut Surface, count: u32, step_deg: f32, radius: f32) {
    for i in 0..count {
        let text = format!("{i:02}");
        let mut sprite = Surface::new(
            text_width(&text) * LABEL_SCALE,
            GLYPH_HEIGHT * LABEL_SCALE,
        );
        draw_text_scaled(&mut sprite, 0, 0, &text, LABEL_SCALE, Color::WHITE);

        let angle = i as f32 * step_deg;
        let (cx, cy) = ring_point(radius, angle);
        draw_rotated(pane, &sprite, angle, cx, cy);
    }
}

fn render_mask() -> Surface {
    let mut mask = Surface::new(MASK_SIZE, MASK_SIZE);
    mask.clear(Color::rgba(0, 0, 0, 127));
    let (x, y, w, h) = WINDOW_RECT;
    // Punch the reading window fully transparent, then outline it
    mask.fill_rect(x, y, w, h, Color::TRANSPARENT);
    mask.draw_rect(x - 2, y - 2, w + 4, h + 4, 2, Color::WHITE);
    mask
}

struct DialPanes {
    seconds: Surface,
    minutes: Surface,
    hours: Surface,
    mask: Surface,
}

pub struct ClockFace {
    panes: Option<DialPanes>,
    show_fps: bool,
}

impl ClockFace {
    pub fn new(show_fps: bool) -> Self {
        Self {
            panes: None,
            show_fps,
        }
    }

    fn draw_at(&self, surface: &mut Surface, hour: u32, minute: u32, second: u32, subsec: f32) {
        let Some(panes) = &self.panes else {
            return;
        };

        surface.clear(VEIL);

        let cx = surface.width() as f32 / 2.0;
        let cy = surface.height() as f32 / 2.0;
        let fit = (surface.width().min(surface.height()) as f32) / MASK_SIZE as f32;
        let dial = DIAL_SIZE as f32 * fit;

        let (hour_angle, minute_angle, second_angle) = dial_angles(hour, minute, second, subsec);

        // Counter-rotate so the current value sits under the reading window
        draw_rotated_sized(surface, &panes.seconds, -second_angle, cx, cy, dial, dial);
        draw_rotated_sized(surface, &panes.minutes, -minute_angle, cx, cy, dial, dial);
        draw_rotated_sized(surface, &panes.hours, -hour_angle, cx, cy, dial, dial);

        let mask = MASK_SIZE as f32 * fit;
        draw_rotated_sized(surface, &panes.mask, 0.0, cx, cy, mask, mask);
    }

    fn draw_fps(&self, surface: &mut Surface, fps: u32) {
        let text = format!("FPS:{fps}");
        let w = text_width(&text) * 2 + 4;
        let h = GLYPH_HEIGHT * 2 + 4;
        surface.fill_rect_blend(0, 0, w, h, FPS_BACK);
        draw_text_scaled(surface, 2, 2, &text, 2, FPS_TEXT);
    }
}

impl OverlayApp for ClockFace {
    fn init(&mut self, surface: &mut Surface) {
        let mut seconds = Surface::new(DIAL_SIZE, DIAL_SIZE);
        render_ring(&mut seconds, 60, 6.0, SECOND_RADIUS);

        let mut minutes = Surface::new(DIAL_SIZE, DIAL_SIZE);
        render_ring(&mut minutes, 60, 6.0, MINUTE_RADIUS);

        let mut hours = Surface::new(DIAL_SIZE, DIAL_SIZE);
        render_ring(&mut hours, 24, 15.0, HOUR_RADIUS);

        self.panes = Some(DialPanes {
            seconds,
            minutes,
            hours,
            mask: render_mask(),
        });

        surface.clear(Color::TRANSPARENT);
    }

    fn draw(&mut self, surface: &mut Surface, frame: &FrameInfo) {
        let now = Local::now();
        let subsec = now.nanosecond().min(999_999_999) as f32 / 1_000_000_000.0;
        self.draw_at(surface, now.hour(), now.minute(), now.second(), subsec);

        if self.show_fps {
            self.draw_fps(surface, frame.fps);
        }
    }
}
