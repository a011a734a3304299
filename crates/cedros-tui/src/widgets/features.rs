use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Widget, Wrap},
};

use super::{center_text, clip_rect, fill};
use crate::app::App;
use crate::layout::{Section, ROW_UNITS};

/// Feature list beside a sticky panel showing the active feature
pub struct FeaturesWidget;

impl FeaturesWidget {
    pub fn render(buf: &mut Buffer, area: Rect, app: &App, section: &Section) {
        let theme = &app.theme;
        fill(buf, area, theme.cream);

        let heading = Style::default().fg(theme.ink).add_modifier(Modifier::BOLD);
        center_text(buf, area, i32::from(area.y) + 1, "Concepto", heading);

        let half = area.width / 2;
        let list = Rect::new(area.x + 2, area.y, half.saturating_sub(4), area.height);
        let active = app.sticky.active_index();

        for (i, (feature, block)) in app
            .content
            .features
            .iter()
            .zip(&app.layout.features)
            .enumerate()
        {
            let top = block.top.saturating_sub(section.top) as i32;
            let Some(rect) = clip_rect(
                i32::from(list.x),
                i32::from(area.y) + top,
                i32::from(list.width),
                block.rows as i32,
                area,
            ) else {
                continue;
            };
            let is_active = active == Some(i);
            let border = if is_active { theme.gold } else { theme.mist };
            let title_style = if is_active {
                Style::default().fg(theme.gold).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.ink)
            };
            Paragraph::new(vec![
                Line::from(Span::styled(feature.title, title_style)),
                Line::from(Span::styled(feature.description, Style::default().fg(theme.stone))),
            ])
            .wrap(Wrap { trim: true })
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(border)),
            )
            .render(rect, buf);
        }

        // Sticky panel: 10% from the viewport top, 80% of its height
        let viewport_rows = app.layout.height;
        let panel_rows = (f64::from(viewport_rows) * 0.8).round() as u16;
        let scrolled = app.scroll_y() / ROW_UNITS - f64::from(section.top)
            + f64::from(viewport_rows) * 0.1;
        let max_top = area.height.saturating_sub(panel_rows);
        let panel_top = scrolled.clamp(0.0, f64::from(max_top)).round() as u16;
        let panel = Rect::new(
            area.x + half + 1,
            area.y + panel_top,
            area.width.saturating_sub(half + 3),
            panel_rows.min(area.height),
        );

        let label = active
            .and_then(|i| app.content.features.get(i))
            .map(|f| f.title)
            .unwrap_or("Los Cedros");
        Block::bordered()
            .border_type(BorderType::Double)
            .style(Style::default().fg(theme.gold).bg(theme.charcoal))
            .render(panel, buf);
        center_text(
            buf,
            panel,
            i32::from(panel.y + panel.height / 2),
            label,
            Style::default().fg(theme.gold_light).add_modifier(Modifier::BOLD),
        );
    }
}
