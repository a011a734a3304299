use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, BorderType, Paragraph, Widget, Wrap},
};

use cedros_core::carousel::{item_appearance, CarouselView};

use super::{center_text, clip_rect, fill};
use crate::app::App;
use crate::layout::COL_UNITS;
use crate::theme::Theme;

/// Horizontal carousel of gallery items
pub struct GalleryWidget;

impl GalleryWidget {
    pub fn render(buf: &mut Buffer, area: Rect, app: &App) {
        let theme = &app.theme;
        fill(buf, area, theme.charcoal);

        let heading = Style::default()
            .fg(theme.gold_light)
            .add_modifier(Modifier::BOLD);
        center_text(buf, area, i32::from(area.y) + 1, "Galeria", heading);

        let reduced = app.is_reduced_motion();
        let (view, item_width) = match &app.carousel {
            Some(carousel) => (carousel.view(), carousel.item_width()),
            None => (
                CarouselView {
                    current_index: 0,
                    position: 0.0,
                    is_dragging: false,
                },
                app.layout.viewport_width() * app.config.carousel.item_width_ratio,
            ),
        };

        let track = Rect::new(area.x, area.y + 3, area.width, area.height.saturating_sub(5));
        let mid_x = f64::from(area.x) + f64::from(area.width) / 2.0;
        let mid_y = i32::from(track.y) + i32::from(track.height) / 2;

        for (i, image) in app.content.gallery.iter().enumerate() {
            let look = match &app.carousel {
                Some(carousel) => carousel.appearance(i),
                None => item_appearance(i, view.current_index, false, reduced),
            };
            let center = mid_x + (view.position + i as f64 * item_width) / COL_UNITS;
            let w = (item_width / COL_UNITS * 0.9 * look.scale).round() as i32;
            let h = (f64::from(track.height) * look.scale).round() as i32;
            let x = (center - f64::from(w) / 2.0).round() as i32;
            let Some(rect) = clip_rect(x, mid_y - h / 2, w, h, track) else {
                continue;
            };

            let fg = Theme::fade(theme.cream, theme.charcoal, look.opacity);
            let border = if i == view.current_index { theme.gold } else { fg };
            let mut block = Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border));
            if look.tilt_deg != 0.0 {
                block = block.title_bottom(format!(" {:+.0}\u{b0} ", look.tilt_deg));
            }
            Paragraph::new(format!("{}\n\n{}", image.caption, image.alt))
                .style(Style::default().fg(fg))
                .wrap(Wrap { trim: true })
                .centered()
                .block(block)
                .render(rect, buf);
        }

        // Index dots
        let dots: Vec<&str> = (0..app.content.gallery.len())
            .map(|i| if i == view.current_index { "\u{25cf}" } else { "\u{25cb}" })
            .collect();
        center_text(
            buf,
            area,
            i32::from(area.bottom()) - 1,
            &dots.join(" "),
            Style::default().fg(theme.gold),
        );
    }
}
