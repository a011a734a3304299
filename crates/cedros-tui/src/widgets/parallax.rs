use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
};

use super::{center_text, fill};
use crate::app::App;
use crate::layout::ROW_UNITS;

/// Depth band: each layer drifts with its parallax offset
pub struct ParallaxWidget;

impl ParallaxWidget {
    pub fn render(buf: &mut Buffer, area: Rect, app: &App) {
        let theme = &app.theme;
        fill(buf, area, theme.night);

        let mut layers = app.parallax.layers();
        layers.sort_by_key(|l| l.spec.z_index);
        let count = layers.len().max(1) as f64;

        for (i, layer) in layers.iter().enumerate() {
            let (pattern, color) = Self::glyphs(i, theme.mist, theme.sage, theme.forest);
            // Resting rows spread down the band, back layers higher
            let base = (f64::from(area.height) * (0.2 + 0.5 * i as f64 / count)).round() as i32;
            let row = i32::from(area.y) + base + (layer.offset / ROW_UNITS).round() as i32;
            for dy in 0..2 {
                let y = row + dy;
                if y < i32::from(area.y) || y >= i32::from(area.bottom()) {
                    continue;
                }
                let line: String = pattern.chars().cycle().take(area.width as usize).collect();
                buf.set_string(area.x, y as u16, line, Style::default().fg(color));
            }
        }

        let heading = Style::default()
            .fg(theme.gold_light)
            .add_modifier(Modifier::BOLD);
        center_text(
            buf,
            area,
            i32::from(area.y + area.height / 2),
            app.content.parallax_heading,
            heading,
        );
    }

    fn glyphs(depth: usize, far: Color, mid: Color, near: Color) -> (&'static str, Color) {
        match depth {
            0 => ("   /\\      /\\/\\    ", far),
            1 => ("  ^ ^^  ^^^ ^ ", mid),
            _ => ("\"\",\"\"\"\",,\"", near),
        }
    }
}
