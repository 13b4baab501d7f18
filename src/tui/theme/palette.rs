//! Color palette - dark grays with a single warm highlight for sung text

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_primary: Color,
    pub fg_primary: Color,
    pub fg_secondary: Color,
    /// Sung words, active syllables, selection.
    pub accent: Color,
    pub accent_alt: Color,
    pub border: Color,
    pub playing: Color,
    pub error: Color,
}

impl Palette {
    pub const STAGE: Self = Self {
        bg_primary: Color::Rgb(0, 0, 0),          // #000000
        fg_primary: Color::Rgb(235, 235, 235),    // #ebebeb
        fg_secondary: Color::Rgb(128, 128, 128),  // #808080
        accent: Color::Rgb(255, 200, 40),         // #ffc828 stage yellow
        accent_alt: Color::Rgb(200, 200, 200),    // #c8c8c8
        border: Color::Rgb(64, 64, 64),           // #404040
        playing: Color::Rgb(255, 255, 255),       // #ffffff
        error: Color::Rgb(230, 90, 80),           // #e65a50
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::STAGE
    }
}
