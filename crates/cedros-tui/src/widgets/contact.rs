use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, BorderType, Paragraph, Widget},
};

use super::{center_text, clip_rect, fill};
use crate::app::App;
use crate::layout::{BUTTON_ROW, COL_UNITS};

/// Contact call to action
pub struct ContactWidget;

impl ContactWidget {
    pub fn render(buf: &mut Buffer, area: Rect, app: &App) {
        let theme = &app.theme;
        fill(buf, area, theme.night);

        let heading = Style::default()
            .fg(theme.gold_light)
            .add_modifier(Modifier::BOLD);
        center_text(buf, area, i32::from(area.y) + 2, app.content.contact_heading, heading);

        let label = app.content.contact_button;
        let w = label.chars().count() as i32 + 6;
        let center_col = (app.layout.button_center().x / COL_UNITS).round() as i32;
        let x = center_col - w / 2;
        let y = i32::from(area.y) + BUTTON_ROW as i32 - 1;
        if let Some(rect) = clip_rect(x, y, w, 3, area) {
            Paragraph::new(label)
                .centered()
                .style(Style::default().fg(theme.night).bg(theme.gold))
                .block(Block::bordered().border_type(BorderType::Thick))
                .render(rect, buf);
        }

        center_text(
            buf,
            area,
            i32::from(area.bottom()) - 1,
            "Los Cedros \u{b7} 116 casas",
            Style::default().fg(theme.stone),
        );
    }
}
