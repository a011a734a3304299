//! Terminal page geometry
//!
//! The page is laid out in terminal rows and converted to document units
//! for the motion engine: one row is [`ROW_UNITS`], one column [`COL_UNITS`].

use cedros_core::parallax::{LayerBounds, ParallaxLayerSpec};
use cedros_core::proximity::Point;
use cedros_core::scroll::DocumentMetrics;

use crate::content::PageContent;

pub const ROW_UNITS: f64 = 16.0;
pub const COL_UNITS: f64 = 8.0;

pub const AMENITY_COLUMNS: usize = 3;
pub const AMENITY_CARD_ROWS: u32 = 4;
/// Heading rows above the amenity grid
const AMENITY_GRID_TOP: u32 = 3;
const CONTACT_ROWS: u32 = 10;
/// Row of the contact button inside the contact section
pub const BUTTON_ROW: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Hero,
    Parallax,
    Features,
    Gallery,
    Amenities,
    Contact,
}

/// One section in document rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub top: u32,
    pub rows: u32,
}

impl Section {
    pub fn bottom(&self) -> u32 {
        self.top + self.rows
    }

    pub fn bounds(&self) -> LayerBounds {
        LayerBounds::new(rows_to_units(self.top), rows_to_units(self.rows))
    }

    pub fn contains_row(&self, row: f64) -> bool {
        row >= self.top as f64 && row < self.bottom() as f64
    }
}

/// An amenity card in document cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardCell {
    pub col: u16,
    pub top: u32,
    pub width: u16,
    pub rows: u32,
}

impl CardCell {
    /// Centre in document units
    pub fn center(&self) -> Point {
        Point::new(
            cols_to_units(self.col) + cols_to_units(self.width) / 2.0,
            rows_to_units(self.top) + rows_to_units(self.rows) / 2.0,
        )
    }

    /// Whether document position `p` lies on the card
    pub fn contains(&self, p: Point) -> bool {
        let left = cols_to_units(self.col);
        let top = rows_to_units(self.top);
        p.x >= left
            && p.x < left + cols_to_units(self.width)
            && p.y >= top
            && p.y < top + rows_to_units(self.rows)
    }
}

/// A feature block inside the features section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureBlock {
    pub top: u32,
    pub rows: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub width: u16,
    pub height: u16,
    pub sections: Vec<Section>,
    pub features: Vec<FeatureBlock>,
    pub amenities: Vec<CardCell>,
}

#[inline]
pub fn rows_to_units(rows: u32) -> f64 {
    rows as f64 * ROW_UNITS
}

#[inline]
pub fn cols_to_units(cols: u16) -> f64 {
    cols as f64 * COL_UNITS
}

impl PageLayout {
    /// Lay the page out for a `width` x `height` viewport (status bar excluded)
    pub fn measure(width: u16, height: u16, content: &PageContent) -> Self {
        let h = u32::from(height.max(1));

        let hero_rows = (h * 3 / 2).max(6);
        let parallax_rows = h.max(6);

        let feature_rows = (h * 3 / 10).max(3);
        let gap = (h / 4).max(2);
        let mut features = Vec::with_capacity(content.features.len());
        let features_top = hero_rows + parallax_rows;
        let mut cursor = features_top + 3;
        for _ in &content.features {
            cursor += gap;
            features.push(FeatureBlock {
                top: cursor,
                rows: feature_rows,
            });
            cursor += feature_rows;
        }
        cursor += h / 2;
        let features_rows = cursor - features_top;

        let gallery_rows = (h * 2 / 3).max(10);
        let amenity_lines = content.amenities.len().div_ceil(AMENITY_COLUMNS) as u32;
        let amenities_rows = AMENITY_GRID_TOP + amenity_lines * AMENITY_CARD_ROWS;

        let mut sections = Vec::with_capacity(6);
        let mut top = 0;
        for (kind, rows) in [
            (SectionKind::Hero, hero_rows),
            (SectionKind::Parallax, parallax_rows),
            (SectionKind::Features, features_rows),
            (SectionKind::Gallery, gallery_rows),
            (SectionKind::Amenities, amenities_rows),
            (SectionKind::Contact, CONTACT_ROWS),
        ] {
            sections.push(Section { kind, top, rows });
            top += rows;
        }

        let card_width = width.saturating_sub(4) / AMENITY_COLUMNS as u16;
        let grid_top = sections
            .iter()
            .find(|s| s.kind == SectionKind::Amenities)
            .map_or(0, |s| s.top + AMENITY_GRID_TOP);
        let amenities = (0..content.amenities.len())
            .map(|i| CardCell {
                col: 2 + (i % AMENITY_COLUMNS) as u16 * card_width,
                top: grid_top + (i / AMENITY_COLUMNS) as u32 * AMENITY_CARD_ROWS,
                width: card_width,
                rows: AMENITY_CARD_ROWS,
            })
            .collect();

        Self {
            width,
            height,
            sections,
            features,
            amenities,
        }
    }

    pub fn total_rows(&self) -> u32 {
        self.sections.last().map(Section::bottom).unwrap_or(0)
    }

    pub fn viewport_width(&self) -> f64 {
        cols_to_units(self.width)
    }

    pub fn viewport_height(&self) -> f64 {
        rows_to_units(u32::from(self.height))
    }

    pub fn metrics(&self) -> DocumentMetrics {
        DocumentMetrics::new(rows_to_units(self.total_rows()), self.viewport_height())
    }

    pub fn section(&self, kind: SectionKind) -> Option<Section> {
        self.sections.iter().copied().find(|s| s.kind == kind)
    }

    /// Section under document position `y` (units)
    pub fn section_at(&self, y: f64) -> Option<SectionKind> {
        let row = y / ROW_UNITS;
        self.sections
            .iter()
            .find(|s| s.contains_row(row))
            .map(|s| s.kind)
    }

    /// Measured feature blocks keyed by feature id
    pub fn feature_bounds(&self, content: &PageContent) -> Vec<(String, LayerBounds)> {
        content
            .features
            .iter()
            .zip(&self.features)
            .map(|(feature, block)| {
                (
                    feature.id.to_string(),
                    LayerBounds::new(rows_to_units(block.top), rows_to_units(block.rows)),
                )
            })
            .collect()
    }

    /// Parallax layers, each spanning the parallax band
    pub fn parallax_layers(&self, content: &PageContent) -> Vec<(ParallaxLayerSpec, LayerBounds)> {
        let bounds = self
            .section(SectionKind::Parallax)
            .map(|s| s.bounds())
            .unwrap_or_default();
        content
            .parallax_layers
            .iter()
            .cloned()
            .map(|spec| (spec, bounds))
            .collect()
    }

    /// Amenity card under document position `p`
    pub fn amenity_at(&self, p: Point) -> Option<usize> {
        self.amenities.iter().position(|card| card.contains(p))
    }

    /// Centre of the contact button in document units
    pub fn button_center(&self) -> Point {
        let row = self
            .section(SectionKind::Contact)
            .map(|s| s.top + BUTTON_ROW)
            .unwrap_or(0);
        Point::new(
            self.viewport_width() / 2.0,
            rows_to_units(row) + ROW_UNITS / 2.0,
        )
    }

    /// Document position of the centre of screen cell (`col`, `row`)
    pub fn to_document(&self, col: u16, row: u16, scroll_y: f64) -> Point {
        Point::new(
            cols_to_units(col) + COL_UNITS / 2.0,
            scroll_y + rows_to_units(u32::from(row)) + ROW_UNITS / 2.0,
        )
    }

    /// Screen row of document row `doc_row` at `scroll_y`; negative above the viewport
    pub fn screen_row(&self, doc_row: u32, scroll_y: f64) -> i64 {
        doc_row as i64 - (scroll_y / ROW_UNITS).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cedros_core::sections::center_band_ratio;

    #[test]
    fn test_sections_stack_without_gaps() {
        let layout = PageLayout::measure(100, 30, &PageContent::default());
        let mut expected_top = 0;
        for section in &layout.sections {
            assert_eq!(section.top, expected_top);
            expected_top = section.bottom();
        }
        assert_eq!(layout.total_rows(), expected_top);
        assert_eq!(layout.section(SectionKind::Hero).map(|s| s.rows), Some(45));
    }

    #[test]
    fn test_metrics_in_document_units() {
        let layout = PageLayout::measure(80, 20, &PageContent::default());
        let metrics = layout.metrics();
        assert_eq!(metrics.viewport_height, 320.0);
        assert_eq!(metrics.scroll_height, layout.total_rows() as f64 * 16.0);
        assert_eq!(layout.viewport_width(), 640.0);
    }

    #[test]
    fn test_features_can_fill_center_band() {
        let content = PageContent::default();
        let layout = PageLayout::measure(80, 24, &content);
        let vh = layout.viewport_height();
        for (_, bounds) in layout.feature_bounds(&content) {
            // Scroll so the feature is centred in the viewport
            let scroll_y = bounds.top + bounds.height / 2.0 - vh / 2.0;
            assert!(center_band_ratio(bounds, scroll_y, vh) > 0.5);
        }
    }

    #[test]
    fn test_document_mapping() {
        let layout = PageLayout::measure(80, 24, &PageContent::default());
        let p = layout.to_document(10, 2, 160.0);
        assert_eq!(p, Point::new(84.0, 160.0 + 32.0 + 8.0));
        assert_eq!(layout.section_at(0.0), Some(SectionKind::Hero));
        assert_eq!(layout.screen_row(20, 160.0), 10);
    }

    #[test]
    fn test_amenity_cards_tile_the_grid() {
        let content = PageContent::default();
        let layout = PageLayout::measure(80, 24, &content);
        assert_eq!(layout.amenities.len(), content.amenities.len());
        let section = layout.section(SectionKind::Amenities).unwrap();
        for (i, card) in layout.amenities.iter().enumerate() {
            assert!(card.top >= section.top && card.top + card.rows <= section.bottom());
            assert_eq!(layout.amenity_at(card.center()), Some(i));
        }
        // Neighbours share an edge but never overlap
        let (a, b) = (layout.amenities[0], layout.amenities[1]);
        assert_eq!(a.col + a.width, b.col);
        assert_eq!(layout.amenity_at(Point::new(0.0, a.center().y)), None);
    }

    #[test]
    fn test_button_sits_in_contact_section() {
        let layout = PageLayout::measure(80, 24, &PageContent::default());
        let center = layout.button_center();
        assert_eq!(layout.section_at(center.y), Some(SectionKind::Contact));
        assert_eq!(center.x, 320.0);
    }
}
