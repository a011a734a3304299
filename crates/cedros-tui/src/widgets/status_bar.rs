use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use cedros_core::scroll::{ScrollDirection, ScrollMode};

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let snapshot = app.snapshot();

        let mode_str = match app.scroll_mode() {
            ScrollMode::Raw => "RAW",
            ScrollMode::Smooth => "SMOOTH",
        };
        let arrow = match snapshot.direction {
            ScrollDirection::Up => "\u{2191}",
            ScrollDirection::Down => "\u{2193}",
        };
        let gallery = app
            .carousel
            .as_ref()
            .map(|c| format!("{}/{}", c.view().current_index + 1, c.item_count()))
            .unwrap_or_else(|| "static".to_string());
        let motion = if app.is_reduced_motion() { "reduced" } else { "full" };

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {} | {}", mode_str, msg)
        } else {
            format!(
                " {} | {:>3.0}% {} | gallery {} | motion: {}",
                mode_str,
                snapshot.progress * 100.0,
                arrow,
                gallery,
                motion
            )
        };

        let help_hint = " q:quit j/k 1-9 h/l m ";
        let used = status_text.chars().count() + help_hint.len();
        let padding_len = (area.width as usize).saturating_sub(used);

        let (fg, bg) = if app.status_message.is_some() {
            (theme.warning, theme.status_bg)
        } else {
            (theme.status_fg, theme.status_bg)
        };
        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(fg).bg(bg)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(bg)),
            Span::styled(help_hint, Style::default().fg(theme.stone).bg(bg)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
