use ratatui::style::Color;

/// Page palette
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub cream: Color,
    pub sand: Color,
    pub charcoal: Color,
    pub night: Color,

    // Foreground colors
    pub ink: Color,
    pub stone: Color,
    pub mist: Color,

    // Accent colors
    pub gold: Color,
    pub gold_light: Color,
    pub sage: Color,
    pub forest: Color,

    // Semantic colors
    pub nav_solid: Color,
    pub highlight: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            cream: Color::Rgb(0xf8, 0xf5, 0xf0),
            sand: Color::Rgb(0xe8, 0xdf, 0xd0),
            charcoal: Color::Rgb(0x2c, 0x2c, 0x2c),
            night: Color::Rgb(0x1a, 0x1a, 0x1a),
            ink: Color::Rgb(0x33, 0x33, 0x33),
            stone: Color::Rgb(0x8a, 0x84, 0x7a),
            mist: Color::Rgb(0xd9, 0xd4, 0xcc),
            gold: Color::Rgb(0xc9, 0xa9, 0x61),
            gold_light: Color::Rgb(0xe0, 0xc8, 0x8a),
            sage: Color::Rgb(0x9c, 0xaf, 0x88),
            forest: Color::Rgb(0x3f, 0x5e, 0x3a),
            nav_solid: Color::Rgb(0xff, 0xff, 0xff),
            highlight: Color::Rgb(0xc9, 0xa9, 0x61),
            status_bg: Color::Rgb(0x2c, 0x2c, 0x2c),
            status_fg: Color::Rgb(0xe8, 0xdf, 0xd0),
            warning: Color::Rgb(0xe7, 0x8a, 0x4e),
        }
    }
}

impl Theme {
    /// Blend `color` toward `background` to emulate opacity
    ///
    /// Non-RGB colors are returned as-is above half opacity and as the
    /// background below it.
    pub fn fade(color: Color, background: Color, opacity: f64) -> Color {
        let opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        match (color, background) {
            (Color::Rgb(r, g, b), Color::Rgb(br, bg, bb)) => {
                let mix = |fg: u8, bg: u8| -> u8 {
                    (bg as f64 + (fg as f64 - bg as f64) * opacity).round() as u8
                };
                Color::Rgb(mix(r, br), mix(g, bg), mix(b, bb))
            }
            _ if opacity >= 0.5 => color,
            _ => background,
        }
    }
}
