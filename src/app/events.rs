use crate::library::song::Song;
use crate::lyrics::loader::{DocumentSource, LoadedFrom};
use crate::lyrics::model::LyricsDocument;

#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    Player(PlayerEvent),
    Network(NetworkEvent),
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Resize,
}

#[derive(Debug, Clone)]
pub enum PlayerEvent {
    Started,
    Paused,
    Position { seconds: f64 },
    Duration { seconds: f64 },
    /// The engine finished repositioning after a seek.
    Seeked,
    Ended,
    Error(String),
}

#[derive(Debug, Clone)]
pub enum NetworkEvent {
    Error(String),
    LibraryLoaded { songs: Vec<Song> },
    SongUpdated { song: Song },
    SongRemoved { id: String },
    DocumentLoaded {
        session: u64,
        source: DocumentSource,
        document: LyricsDocument,
        from: LoadedFrom,
    },
}
