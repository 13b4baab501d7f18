use crate::library::song::Song;
use crate::lyrics::loader::LoadedFrom;
use crate::lyrics::model::LyricsDocument;
use crate::lyrics::resolve::{Activation, resolve};
use crate::player::PlaybackRate;
use crate::render::ViewMode;
use crate::sync::SeekCoordinator;
use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Library,
    Player,
    Help,
}

impl Screen {
    pub const ALL: [Screen; 3] = [Screen::Library, Screen::Player, Screen::Help];

    pub fn next(self) -> Self {
        match self {
            Screen::Library => Screen::Player,
            Screen::Player => Screen::Help,
            Screen::Help => Screen::Library,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Screen::Library => Screen::Help,
            Screen::Player => Screen::Library,
            Screen::Help => Screen::Player,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Screen::Library => "library",
            Screen::Player => "player",
            Screen::Help => "help",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    pub fn sidebar_index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: std::time::Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > std::time::Duration::from_secs(3)
    }
}

/// Single-line text entry on the library screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    AddUrl,
    EditTitle { id: String },
    EditArtist { id: String },
    EditLanguage { id: String },
}

impl PromptKind {
    pub fn label(&self) -> &'static str {
        match self {
            PromptKind::AddUrl => "Add song URL",
            PromptKind::EditTitle { .. } => "Title",
            PromptKind::EditArtist { .. } => "Artist",
            PromptKind::EditLanguage { .. } => "Language",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub buffer: String,
}

impl Prompt {
    pub fn new(kind: PromptKind, initial: impl Into<String>) -> Self {
        Self {
            kind,
            buffer: initial.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LibraryList {
    pub songs: Vec<Song>,
    pub selected: usize,
    pub scroll_offset: usize,
    pub loading: bool,
    pub loaded: bool,
}

impl LibraryList {
    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if !self.songs.is_empty() {
            self.selected = (self.selected + 1).min(self.songs.len() - 1);
        }
    }

    pub fn selected_song(&self) -> Option<&Song> {
        self.songs.get(self.selected)
    }

    pub fn set_songs(&mut self, songs: Vec<Song>) {
        self.songs = songs;
        self.selected = self.selected.min(self.songs.len().saturating_sub(1));
        self.loaded = true;
        self.loading = false;
    }

    /// Replace the record with the same id, or append it.
    pub fn upsert(&mut self, song: Song) {
        match self.songs.iter_mut().find(|s| s.id == song.id) {
            Some(existing) => *existing = song,
            None => self.songs.push(song),
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.songs.retain(|s| s.id != id);
        self.selected = self.selected.min(self.songs.len().saturating_sub(1));
    }

    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected - visible_height + 1;
        }
    }
}

/// One opened song in the player. A new session replaces the whole value so
/// nothing leaks from the previous song.
#[derive(Debug, Clone, Default)]
pub struct PlayerSession {
    pub id: u64,
    pub song_id: Option<String>,
    pub title: String,
    pub document: Option<LyricsDocument>,
    pub loaded_from: Option<LoadedFrom>,
    pub source_label: String,
    pub coordinator: SeekCoordinator,
    pub paused: bool,
}

impl PlayerSession {
    pub fn activation(&self) -> Activation {
        self.document
            .as_ref()
            .map(|doc| resolve(self.coordinator.time(), doc))
            .unwrap_or_default()
    }

    pub fn duration(&self) -> f64 {
        self.coordinator
            .duration()
            .or_else(|| self.loaded_from.and(self.document.as_ref()).map(|d| d.duration()))
            .unwrap_or(0.0)
    }
}

/// Screen regions painted last frame that respond to clicks.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    pub words: Vec<(Rect, f64)>,
    pub timeline: Option<Rect>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    /// Seek to this time.
    Word(f64),
    /// Seek to this fraction of the track.
    Timeline(f64),
}

impl HitMap {
    pub fn clear(&mut self) {
        self.words.clear();
        self.timeline = None;
    }

    pub fn hit_test(&self, column: u16, row: u16) -> Option<Hit> {
        let inside = |r: &Rect| {
            column >= r.x && column < r.x.saturating_add(r.width) && row >= r.y && row < r.y.saturating_add(r.height)
        };
        if let Some((_, t)) = self.words.iter().find(|(r, _)| inside(r)) {
            return Some(Hit::Word(*t));
        }
        let tl = self.timeline.filter(inside)?;
        Some(Hit::Timeline(crate::render::timeline::fraction_at(
            column - tl.x,
            tl.width,
        )))
    }
}

pub struct AppState {
    pub should_quit: bool,
    pub tick: u64,

    pub screen: Screen,
    pub sidebar_selected: usize,

    pub library: LibraryList,
    pub prompt: Option<Prompt>,

    pub session: PlayerSession,
    pub view_mode: ViewMode,
    pub show_translations: bool,
    pub rate: PlaybackRate,
    pub volume: u8,
    pub hits: HitMap,

    pub toast: Option<Toast>,
    pub status: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            tick: 0,
            screen: Screen::Library,
            sidebar_selected: 0,
            library: LibraryList::default(),
            prompt: None,
            session: PlayerSession::default(),
            view_mode: ViewMode::default(),
            show_translations: true,
            rate: PlaybackRate::NORMAL,
            volume: 80,
            hits: HitMap::default(),
            toast: None,
            status: String::new(),
        }
    }

    pub fn set_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.sidebar_selected = screen.sidebar_index();
    }

    /// Start a fresh player session and return its id. The placeholder
    /// stays up until the session's own document arrives.
    pub fn new_session(&mut self, song_id: Option<String>, title: String, source_label: String) -> u64 {
        let id = self.session.id + 1;
        self.session = PlayerSession {
            id,
            song_id,
            title,
            source_label,
            document: Some(crate::lyrics::loader::placeholder()),
            ..PlayerSession::default()
        };
        self.hits.clear();
        id
    }
}
