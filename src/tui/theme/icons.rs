//! Nerd Font glyphs (https://www.nerdfonts.com). Without a Nerd Font the
//! private-use glyphs render as boxes; the progress and spinner glyphs are
//! plain Unicode.

#[derive(Debug, Clone)]
pub struct Icons {
    pub play: &'static str,
    pub pause: &'static str,
    pub volume_mute: &'static str,
    pub volume_low: &'static str,
    pub volume_high: &'static str,

    pub library: &'static str,
    pub help: &'static str,
    pub music: &'static str,
    pub lyrics: &'static str,

    pub success: &'static str,
    pub error: &'static str,
    pub loading: &'static str,
    pub download: &'static str,
    pub edit: &'static str,

    pub selected: &'static str,
    pub unselected: &'static str,

    pub progress_full: &'static str,
    pub progress_empty: &'static str,
    pub progress_head: &'static str,
}

impl Icons {
    /// Font Awesome range of the Nerd Font patch set.
    pub const fn nerd() -> Self {
        Self {
            play: "\u{f04b}",
            pause: "\u{f04c}",
            volume_mute: "\u{f026}",
            volume_low: "\u{f027}",
            volume_high: "\u{f028}",

            library: "\u{f02d}",
            help: "\u{f059}",
            music: "\u{f001}",
            lyrics: "\u{f15c}",

            success: "\u{f00c}",
            error: "\u{f00d}",
            loading: "\u{f110}",
            download: "\u{f019}",
            edit: "\u{f040}",

            selected: "\u{f054}",
            unselected: " ",

            progress_full: "━",
            progress_empty: "─",
            progress_head: "●",
        }
    }
}

impl Default for Icons {
    fn default() -> Self {
        Self::nerd()
    }
}

pub struct LoadingSpinner;

impl LoadingSpinner {
    pub const BRAILLE: [&'static str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

    /// Advances one frame every four redraws.
    pub fn frame(tick: u64) -> &'static str {
        Self::BRAILLE[(tick / 4) as usize % Self::BRAILLE.len()]
    }
}
