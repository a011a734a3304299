mod amenities;
mod contact;
mod features;
mod gallery;
mod hero;
mod nav_bar;
mod parallax;
mod status_bar;

pub use amenities::AmenitiesWidget;
pub use contact::ContactWidget;
pub use features::FeaturesWidget;
pub use gallery::GalleryWidget;
pub use hero::HeroWidget;
pub use nav_bar::NavBarWidget;
pub use parallax::ParallaxWidget;
pub use status_bar::StatusBarWidget;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    Frame,
};

use crate::app::App;
use crate::layout::{SectionKind, ROW_UNITS};

/// Draw the visible part of the page plus the status bar
pub fn render_page(frame: &mut Frame, app: &App) {
    let [page, status] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

    let scroll_rows = (app.scroll_y() / ROW_UNITS).round() as i64;
    for section in &app.layout.sections {
        let top = i64::from(section.top) - scroll_rows;
        let bottom = top + i64::from(section.rows);
        if bottom <= 0 || top >= i64::from(page.height) {
            continue;
        }

        let rows = u16::try_from(section.rows).unwrap_or(u16::MAX);
        let mut canvas = Buffer::empty(Rect::new(0, 0, page.width, rows));
        let area = canvas.area;
        match section.kind {
            SectionKind::Hero => HeroWidget::render(&mut canvas, area, app, section),
            SectionKind::Parallax => ParallaxWidget::render(&mut canvas, area, app),
            SectionKind::Features => FeaturesWidget::render(&mut canvas, area, app, section),
            SectionKind::Gallery => GalleryWidget::render(&mut canvas, area, app),
            SectionKind::Amenities => AmenitiesWidget::render(&mut canvas, area, app, section),
            SectionKind::Contact => ContactWidget::render(&mut canvas, area, app),
        }

        let skip = (-top).max(0) as u16;
        let dst_top = top.max(0) as u16;
        let visible = (bottom.min(i64::from(page.height)) - top.max(0)) as u16;
        blit(
            &canvas,
            skip,
            frame.buffer_mut(),
            Rect::new(page.x, page.y + dst_top, page.width, visible),
        );
    }

    NavBarWidget::render(frame.buffer_mut(), Rect::new(page.x, page.y, page.width, 1), app);
    StatusBarWidget::render(frame, status, app);
}

/// Copy rows of an off-screen section, starting at `skip`, into `dst_area`
fn blit(src: &Buffer, skip: u16, dst: &mut Buffer, dst_area: Rect) {
    for dy in 0..dst_area.height {
        let sy = skip + dy;
        if sy >= src.area.height {
            break;
        }
        for dx in 0..dst_area.width.min(src.area.width) {
            dst[(dst_area.x + dx, dst_area.y + dy)] = src[(dx, sy)].clone();
        }
    }
}

/// Fill `area` with a background color
fn fill(buf: &mut Buffer, area: Rect, bg: Color) {
    buf.set_style(area, Style::default().bg(bg));
}

/// Rect from signed coordinates, clipped to `bounds`
fn clip_rect(x: i32, y: i32, width: i32, height: i32, bounds: Rect) -> Option<Rect> {
    let left = x.max(i32::from(bounds.x));
    let top = y.max(i32::from(bounds.y));
    let right = (x + width).min(i32::from(bounds.right()));
    let bottom = (y + height).min(i32::from(bounds.bottom()));
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect::new(
        left as u16,
        top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    ))
}

/// Write `text` centred on `row`, clipped to `bounds`
fn center_text(buf: &mut Buffer, bounds: Rect, row: i32, text: &str, style: Style) {
    if row < i32::from(bounds.y) || row >= i32::from(bounds.bottom()) {
        return;
    }
    let len = text.chars().count() as u16;
    let x = bounds.x + bounds.width.saturating_sub(len) / 2;
    buf.set_stringn(x, row as u16, text, bounds.width as usize, style);
}
