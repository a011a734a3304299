use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Widget},
};

use super::{center_text, clip_rect, fill};
use crate::app::App;
use crate::layout::{Section, COL_UNITS, ROW_UNITS};
use crate::theme::Theme;

/// Amenity cards revealed one after another once the grid is in view
///
/// Each card leans towards a nearby pointer by its magnetic offset.
pub struct AmenitiesWidget;

impl AmenitiesWidget {
    pub fn render(buf: &mut Buffer, area: Rect, app: &App, section: &Section) {
        let theme = &app.theme;
        fill(buf, area, theme.sand);

        let heading = Style::default().fg(theme.ink).add_modifier(Modifier::BOLD);
        center_text(buf, area, i32::from(area.y) + 1, "Amenidades", heading);

        let anim = app.animation_config();
        let since = app
            .amenities_revealed_at
            .map(|at| app.clock.saturating_sub(at));
        for (i, (amenity, card)) in app
            .content
            .amenities
            .iter()
            .zip(&app.layout.amenities)
            .enumerate()
        {
            let progress = since.map_or(0.0, |elapsed| anim.reveal_progress(i, elapsed));
            if progress <= 0.0 {
                continue;
            }
            // Cards rise into place as they fade in
            let rise = ((1.0 - progress) * 2.0).round() as i32;
            let pull = app.magnetic_offset(i);
            let x = i32::from(area.x + card.col) + (pull.x / COL_UNITS).round() as i32;
            let y = i32::from(area.y) + card.top.saturating_sub(section.top) as i32
                + rise
                + (pull.y / ROW_UNITS).round() as i32;
            let Some(rect) = clip_rect(x, y, i32::from(card.width), card.rows as i32, area) else {
                continue;
            };

            let fg = Theme::fade(theme.ink, theme.sand, progress);
            let accent = Theme::fade(theme.gold, theme.sand, progress);
            Paragraph::new(vec![
                Line::from(Span::styled(amenity.title, Style::default().fg(accent).add_modifier(Modifier::BOLD))),
                Line::from(Span::styled(amenity.description, Style::default().fg(fg))),
            ])
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(fg)),
            )
            .render(rect, buf);
        }
    }
}
