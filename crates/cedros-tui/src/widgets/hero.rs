use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, BorderType, Widget},
};

use super::{center_text, clip_rect, fill};
use crate::app::App;
use crate::layout::{Section, COL_UNITS, ROW_UNITS};
use crate::theme::Theme;

/// Hero with three images that zoom apart as the section scrolls by
///
/// The visible frame is sticky: it stays pinned to the top of the viewport
/// while the taller section scrolls underneath.
pub struct HeroWidget;

impl HeroWidget {
    pub fn render(buf: &mut Buffer, area: Rect, app: &App, section: &Section) {
        let theme = &app.theme;
        fill(buf, area, theme.cream);

        let viewport_rows = app.layout.height.min(area.height);
        let travel = area.height.saturating_sub(viewport_rows);
        let scrolled = app.scroll_y() / ROW_UNITS - f64::from(section.top);
        let sticky_top = scrolled.clamp(0.0, f64::from(travel)).round() as u16;
        let view = Rect::new(area.x, area.y + sticky_top, area.width, viewport_rows);

        let t = app.hero_transforms();
        let zoom = app.animation_config().ken_burns_scale(app.clock);

        let base_w = i32::from(view.width / 3);
        let base_h = i32::from(view.height / 2);
        let mid_x = i32::from(view.x) + i32::from(view.width) / 2;
        let mid_y = i32::from(view.y) + i32::from(view.height) / 2;

        // Side images
        if t.side_opacity > 0.01 {
            let w = (f64::from(base_w) * 0.6 * t.side_scale).round() as i32;
            let h = (f64::from(base_h) * t.side_scale).round() as i32;
            let shift = (t.side_shift / COL_UNITS).round() as i32;
            let color = Theme::fade(theme.stone, theme.cream, t.side_opacity);
            let left_x = i32::from(view.x) + 2 - shift;
            let right_x = i32::from(view.right()) - 2 - w + shift;
            for x in [left_x, right_x] {
                if let Some(rect) = clip_rect(x, mid_y - h / 2, w, h, view) {
                    Block::bordered()
                        .border_type(BorderType::Rounded)
                        .style(Style::default().fg(color).bg(theme.sand))
                        .render(rect, buf);
                }
            }
        }

        // Centre image
        let w = ((f64::from(base_w) * t.center_scale).round() as i32).min(i32::from(view.width));
        let h = ((f64::from(base_h) * t.center_scale).round() as i32).min(i32::from(view.height));
        if let Some(rect) = clip_rect(mid_x - w / 2, mid_y - h / 2, w, h, view) {
            Block::bordered()
                .border_type(BorderType::Rounded)
                .title_bottom(format!(" {:.0}% ", t.center_scale * zoom * 100.0))
                .style(Style::default().fg(theme.gold).bg(theme.charcoal))
                .render(rect, buf);
        }

        // Title
        if t.title_opacity > 0.01 {
            let row = mid_y + (t.title_shift / ROW_UNITS).round() as i32;
            let title = Style::default()
                .fg(Theme::fade(theme.cream, theme.charcoal, t.title_opacity))
                .add_modifier(Modifier::BOLD);
            let subtitle = Style::default().fg(Theme::fade(theme.gold_light, theme.charcoal, t.title_opacity));
            center_text(buf, view, row - 1, app.content.title, title);
            center_text(buf, view, row + 1, app.content.subtitle, subtitle);
        }
    }
}
