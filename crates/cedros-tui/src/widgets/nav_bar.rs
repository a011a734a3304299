use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
};

use crate::app::App;

const LINKS: &str = "Concepto  Galeria  Amenidades  Contacto ";

/// Top navigation; turns solid once the page has scrolled
pub struct NavBarWidget;

impl NavBarWidget {
    pub fn render(buf: &mut Buffer, area: Rect, app: &App) {
        let theme = &app.theme;
        let (style, link_style) = if app.nav.is_scrolled() {
            (
                Style::default().fg(theme.charcoal).bg(theme.nav_solid),
                Style::default().fg(theme.ink).bg(theme.nav_solid),
            )
        } else {
            // Transparent: keep whatever is underneath
            (Style::default().fg(theme.cream), Style::default().fg(theme.cream))
        };
        if app.nav.is_scrolled() {
            buf.set_style(area, style);
        }
        buf.set_stringn(
            area.x + 1,
            area.y,
            "LOS CEDROS",
            area.width.saturating_sub(1) as usize,
            style.add_modifier(Modifier::BOLD),
        );
        let links_len = LINKS.len() as u16;
        if area.width > links_len + 14 {
            buf.set_string(area.right() - links_len, area.y, LINKS, link_style);
        }
    }
}
