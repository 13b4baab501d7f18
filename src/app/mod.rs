pub mod actions;
pub mod events;
pub mod player;
pub mod state;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::input;
use crate::library::Library;
use crate::library::song::{Song, SongStatus};
use crate::library::workflow;
use crate::lyrics::loader::{DocumentCache, DocumentSource, LoadedFrom, Loader};
use crate::player::PlaybackClock;
use crate::player::mpv::MpvHandle;
use crate::storage::StorageHandle;
use crate::tui::{self, TuiTerminal};
use actions::Action;
use events::{Event, NetworkEvent};
use state::{AppState, Prompt, PromptKind, Screen, Toast};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// What to open in the player.
#[derive(Debug, Clone)]
pub struct PlayRequest {
    pub song_id: Option<String>,
    pub title: String,
    pub primary: DocumentSource,
    pub fallback: Option<DocumentSource>,
    pub audio: Option<PathBuf>,
}

pub struct App {
    cfg: Config,
    config_path: PathBuf,
    state: AppState,
    backend: BackendClient,
    storage: StorageHandle,
    loader: Loader,
    documents: DocumentCache,
    mpv: Option<MpvHandle>,
    start: Option<PlayRequest>,
}

impl App {
    pub fn new(cfg: Config, config_path: PathBuf, start: Option<PlayRequest>) -> anyhow::Result<Self> {
        let backend = BackendClient::new(
            &cfg.backend.base_url,
            std::time::Duration::from_secs(cfg.backend.timeout_secs),
        )?;
        let storage = StorageHandle::new(cfg.paths.database());
        let loader = Loader::new()?;

        let mut state = AppState::new();
        state.volume = cfg.player.volume;
        state.rate = cfg.player.playback_rate();
        state.view_mode = cfg.ui.view_mode;
        state.show_translations = cfg.ui.show_translations;

        // Restore last screen if available
        if let Some(screen) = cfg.ui.last_screen.as_deref().and_then(Screen::from_name) {
            state.set_screen(screen);
        }

        Ok(Self {
            cfg,
            config_path,
            state,
            backend,
            storage,
            loader,
            documents: DocumentCache::new(8),
            mpv: None,
            start,
        })
    }

    pub async fn run(&mut self, terminal: &mut TuiTerminal) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<Event>(256);

        input::spawn_input_task(tx.clone(), self.cfg.input.mouse);
        // Redraws are driven by input, player and network events.

        let mpv_log = self.cfg.paths.data_dir.join("mpv.log");
        match MpvHandle::spawn(
            tx.clone(),
            self.cfg.player.audio_device.as_deref(),
            Some(&mpv_log),
        )
        .await
        {
            Ok(mut h) => {
                let _ = h.set_volume(self.state.volume);
                if let Err(e) = h.set_rate(self.state.rate) {
                    tracing::warn!("mpv rate: {e:#}");
                }
                self.mpv = Some(h);
            }
            Err(e) => {
                tracing::warn!("mpv unavailable: {e:#}");
                self.state.toast = Some(Toast::error(format!("mpv disabled: {e:#}")));
                self.mpv = None;
            }
        }

        tui::draw(terminal, &mut self.state)?;

        self.spawn_load_library(&tx, true);
        if let Some(req) = self.start.take() {
            self.open_player(req, &tx);
        }

        while let Some(ev) = rx.recv().await {
            match ev {
                Event::Input(input_ev) => {
                    if let Some(action) = input::map_input_to_action(&self.state, input_ev) {
                        self.handle_action(action, &tx).await;
                    }
                }
                Event::Player(pe) => player::on_event(&mut self.state, pe),
                Event::Network(ne) => self.handle_network(ne),
            }

            if self.state.should_quit {
                break;
            }

            self.state.tick = self.state.tick.wrapping_add(1);
            tui::draw(terminal, &mut self.state)?;
        }

        self.save_state_on_quit();

        Ok(())
    }

    fn save_state_on_quit(&mut self) {
        self.cfg.player.volume = self.state.volume;
        self.cfg.player.rate = self.state.rate.as_f64();
        self.cfg.ui.view_mode = self.state.view_mode;
        self.cfg.ui.show_translations = self.state.show_translations;
        self.cfg.ui.last_screen = Some(self.state.screen.name().to_string());

        if let Err(e) = crate::config::save(&self.cfg, Some(&self.config_path)) {
            tracing::warn!("save config: {e:#}");
        }
    }

    async fn handle_action(&mut self, action: Action, tx: &mpsc::Sender<Event>) {
        match action {
            Action::TogglePause
            | Action::SeekBy(_)
            | Action::SeekTo(_)
            | Action::SeekFraction(_)
            | Action::RateUp
            | Action::RateDown
            | Action::PrevSegment
            | Action::NextSegment => self.drive_player(&action),
            Action::VolumeUp | Action::VolumeDown => {
                self.state.volume = if action == Action::VolumeUp {
                    self.state.volume.saturating_add(5).min(100)
                } else {
                    self.state.volume.saturating_sub(5)
                };
                if let Some(mpv) = &self.mpv
                    && let Err(e) = mpv.set_volume(self.state.volume)
                {
                    self.state.toast = Some(Toast::error(format!("{e:#}")));
                }
            }
            Action::OpenSelected => {
                if let Some(song) = self.state.library.selected_song().cloned() {
                    let req = self.play_request_for(&song);
                    self.open_player(req, tx);
                }
            }
            Action::RefreshLibrary => {
                self.documents.clear();
                self.spawn_load_library(tx, false);
            }
            Action::AddSong => {
                self.state.prompt = Some(Prompt::new(PromptKind::AddUrl, ""));
            }
            Action::EditSelected => {
                if let Some(song) = self.state.library.selected_song() {
                    let kind = PromptKind::EditTitle { id: song.id.clone() };
                    self.state.prompt = Some(Prompt::new(kind, song.title.clone()));
                }
            }
            Action::DownloadSelected | Action::SearchLyricsSelected | Action::ProcessSelected => {
                self.spawn_workflow(&action, tx);
            }
            Action::VerifySelected => {
                if let Some(id) = self.selected_id() {
                    let result = self
                        .with_library(move |lib| lib.verify_lyrics(&id))
                        .await;
                    match result {
                        Ok(song) => {
                            self.state.toast = Some(Toast::success(format!("Verified {}", song.title)));
                            self.state.library.upsert(song);
                        }
                        Err(e) => self.state.toast = Some(Toast::error(format!("{e:#}"))),
                    }
                }
            }
            Action::RemoveSelected => {
                if let Some(id) = self.selected_id() {
                    let target = id.clone();
                    match self.with_library(move |lib| lib.remove(&target)).await {
                        Ok(()) => self.handle_network(NetworkEvent::SongRemoved { id }),
                        Err(e) => self.state.toast = Some(Toast::error(format!("{e:#}"))),
                    }
                }
            }
            Action::PromptSubmit => self.submit_prompt(tx).await,
            _ => self.reduce(action),
        }
    }

    fn reduce(&mut self, action: Action) {
        match action {
            Action::Quit => self.state.should_quit = true,
            Action::NextScreen => self.state.set_screen(self.state.screen.next()),
            Action::PrevScreen => self.state.set_screen(self.state.screen.prev()),
            Action::SetScreen(screen) => self.state.set_screen(screen),
            Action::SidebarUp => {
                let idx = self.state.sidebar_selected.saturating_sub(1);
                self.state.set_screen(Screen::ALL[idx]);
            }
            Action::SidebarDown => {
                let idx = (self.state.sidebar_selected + 1).min(Screen::ALL.len() - 1);
                self.state.set_screen(Screen::ALL[idx]);
            }
            Action::ListUp => {
                self.state.library.select_prev();
                self.state.library.update_scroll(20);
            }
            Action::ListDown => {
                self.state.library.select_next();
                self.state.library.update_scroll(20);
            }
            Action::GoTop => {
                self.state.library.selected = 0;
                self.state.library.scroll_offset = 0;
            }
            Action::GoBottom => {
                self.state.library.selected = self.state.library.songs.len().saturating_sub(1);
                self.state.library.update_scroll(20);
            }
            Action::CycleViewMode => {
                self.state.view_mode = self.state.view_mode.next();
                self.state.status = format!("View: {}", self.state.view_mode.label());
            }
            Action::ToggleTranslations => self.state.show_translations = !self.state.show_translations,
            Action::PromptChar(c) => {
                if let Some(p) = &mut self.state.prompt {
                    p.buffer.push(c);
                }
            }
            Action::PromptBackspace => {
                if let Some(p) = &mut self.state.prompt {
                    p.buffer.pop();
                }
            }
            Action::PromptCancel => self.state.prompt = None,
            Action::Resize => {} // handled by terminal
            _ => {}
        }
    }

    fn drive_player(&mut self, action: &Action) {
        let Some(mpv) = self.mpv.as_mut() else {
            self.state.toast = Some(Toast::error("mpv not available"));
            return;
        };
        if let Err(e) = player::apply(&mut self.state, mpv, action) {
            self.state.toast = Some(Toast::error(format!("{e:#}")));
        }
    }

    fn open_player(&mut self, req: PlayRequest, tx: &mpsc::Sender<Event>) {
        let PlayRequest {
            song_id,
            title,
            primary,
            fallback,
            audio,
        } = req;
        let session = self.state.new_session(song_id, title, primary.label());
        self.state.set_screen(Screen::Player);

        if let Some((document, from)) = self.documents.get(&primary) {
            self.state.session.document = Some(document);
            self.state.session.loaded_from = Some(from);
        } else {
            self.state.status = format!("Loading {}", primary.label());
            let loader = self.loader.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let (document, from) = loader.load(&primary, fallback.as_ref()).await;
                let _ = tx
                    .send(Event::Network(NetworkEvent::DocumentLoaded {
                        session,
                        source: primary,
                        document,
                        from,
                    }))
                    .await;
            });
        }

        let Some(audio) = audio else {
            self.state.status = "No audio for this song".into();
            return;
        };
        let Some(mpv) = self.mpv.as_mut() else {
            self.state.status = "mpv not available; lyrics only".into();
            return;
        };
        if !audio.exists() {
            self.state.toast = Some(Toast::error(format!("Missing audio {}", audio.display())));
            return;
        }
        let rate = self.state.rate;
        let started = mpv
            .load_file(&audio)
            .and_then(|()| mpv.set_rate(rate))
            .and_then(|()| mpv.play());
        if let Err(e) = started {
            self.state.toast = Some(Toast::error(format!("mpv load failed: {e:#}")));
        }
    }

    fn play_request_for(&self, song: &Song) -> PlayRequest {
        let (primary, fallback) = DocumentSource::for_song(&self.cfg.paths.processed_dir(), &song.id);
        let audio = match song.audio_file_path.as_deref().map(PathBuf::from) {
            Some(p) if p.is_absolute() => p,
            Some(p) => self.cfg.paths.data_dir.join(p),
            None => self.cfg.paths.audio_file(&song.id),
        };
        PlayRequest {
            song_id: Some(song.id.clone()),
            title: song.display_name(),
            primary,
            fallback: Some(fallback),
            audio: Some(audio),
        }
    }

    fn selected_id(&self) -> Option<String> {
        self.state.library.selected_song().map(|s| s.id.clone())
    }

    async fn with_library<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Library<StorageHandle>) -> anyhow::Result<T> + Send + 'static,
    {
        let storage = self.storage.clone();
        match tokio::task::spawn_blocking(move || f(&Library::new(storage))).await {
            Ok(r) => r,
            Err(e) => Err(anyhow::anyhow!("storage task failed: {e}")),
        }
    }

    async fn submit_prompt(&mut self, tx: &mpsc::Sender<Event>) {
        let Some(prompt) = self.state.prompt.take() else {
            return;
        };
        let value = prompt.buffer.trim().to_string();

        let (id, next) = match prompt.kind {
            PromptKind::AddUrl => {
                if !value.is_empty() {
                    self.spawn_add(value, tx);
                }
                return;
            }
            PromptKind::EditTitle { id } => {
                let next = self.state.library.songs.iter().find(|s| s.id == id).map(|s| {
                    Prompt::new(PromptKind::EditArtist { id: id.clone() }, s.artist.clone())
                });
                let (title, target) = (value.clone(), id.clone());
                self.save_edit(move |lib| lib.edit_metadata(&target, Some(&title), None, None))
                    .await;
                (id, next)
            }
            PromptKind::EditArtist { id } => {
                let next = self.state.library.songs.iter().find(|s| s.id == id).map(|s| {
                    Prompt::new(PromptKind::EditLanguage { id: id.clone() }, s.language.clone())
                });
                let (artist, target) = (value.clone(), id.clone());
                self.save_edit(move |lib| lib.edit_metadata(&target, None, Some(&artist), None))
                    .await;
                (id, next)
            }
            PromptKind::EditLanguage { id } => {
                let (language, target) = (value.clone(), id.clone());
                self.save_edit(move |lib| lib.edit_metadata(&target, None, None, Some(&language)))
                    .await;
                (id, None)
            }
        };
        tracing::debug!(song = %id, "metadata edited");
        self.state.prompt = next;
    }

    async fn save_edit<F>(&mut self, f: F)
    where
        F: FnOnce(&Library<StorageHandle>) -> anyhow::Result<Song> + Send + 'static,
    {
        match self.with_library(f).await {
            Ok(song) => self.state.library.upsert(song),
            Err(e) => self.state.toast = Some(Toast::error(format!("{e:#}"))),
        }
    }

    /// `recover` is only set on startup, when no workflow of ours can be running.
    fn spawn_load_library(&mut self, tx: &mpsc::Sender<Event>, recover: bool) {
        if self.state.library.loading {
            return;
        }
        self.state.library.loading = true;
        self.state.status = "Loading library...".into();

        let storage = self.storage.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let load = move || -> anyhow::Result<Vec<_>> {
                let lib = Library::new(storage);
                if recover {
                    lib.recover_interrupted()?;
                }
                lib.list()
            };
            let ev = match tokio::task::spawn_blocking(load).await {
                Ok(Ok(songs)) => NetworkEvent::LibraryLoaded { songs },
                Ok(Err(e)) => NetworkEvent::Error(format!("Library: {e:#}")),
                Err(e) => NetworkEvent::Error(format!("Library: {e}")),
            };
            let _ = tx.send(Event::Network(ev)).await;
        });
    }

    fn spawn_add(&mut self, url: String, tx: &mpsc::Sender<Event>) {
        self.state.status = format!("Adding {url}");
        let backend = self.backend.clone();
        let storage = self.storage.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let ev = match workflow::add_from_url(&backend, &storage, &url).await {
                Ok(song) => NetworkEvent::SongUpdated { song },
                Err(e) => NetworkEvent::Error(format!("Add: {e:#}")),
            };
            let _ = tx.send(Event::Network(ev)).await;
        });
    }

    fn spawn_workflow(&mut self, action: &Action, tx: &mpsc::Sender<Event>) {
        let Some(song) = self.state.library.selected_song() else {
            return;
        };
        if song.status.is_busy() {
            self.state.toast = Some(Toast::error(format!("{} is {}", song.title, song.status.label())));
            return;
        }
        let id = song.id.clone();
        let step = match action {
            Action::DownloadSelected => "Downloading",
            Action::SearchLyricsSelected => "Searching lyrics for",
            _ => "Processing",
        };
        self.state.status = format!("{step} {}", song.title);

        let action = action.clone();
        let backend = self.backend.clone();
        let storage = self.storage.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = match action {
                Action::DownloadSelected => workflow::download(&backend, &storage, &id).await,
                Action::SearchLyricsSelected => workflow::search_lyrics(&backend, &storage, &id).await,
                _ => workflow::process(&backend, &storage, &id).await,
            };
            let ev = match result {
                Ok(song) => NetworkEvent::SongUpdated { song },
                Err(e) => NetworkEvent::Error(format!("{e:#}")),
            };
            let _ = tx.send(Event::Network(ev)).await;
        });
    }

    fn handle_network(&mut self, ne: NetworkEvent) {
        match ne {
            NetworkEvent::Error(e) => {
                self.state.library.loading = false;
                self.state.toast = Some(Toast::error(e.clone()));
                self.state.status = format!("Error: {e}");
            }
            NetworkEvent::LibraryLoaded { songs } => {
                self.state.library.set_songs(songs);
                self.state.status = if self.state.library.songs.is_empty() {
                    "Library is empty. Press a to add a song.".into()
                } else {
                    format!("Library: {} songs", self.state.library.songs.len())
                };
            }
            NetworkEvent::SongUpdated { song } => {
                self.state.toast = Some(match (&song.status, &song.error) {
                    (SongStatus::Error, Some(err)) => Toast::error(format!("{}: {err}", song.title)),
                    (status, _) => Toast::success(format!("{}: {}", song.title, status.label())),
                });
                if song.status == SongStatus::Ready {
                    // Processing rewrites the song's documents.
                    self.documents.clear();
                }
                self.state.library.upsert(song);
            }
            NetworkEvent::SongRemoved { id } => {
                self.state.library.remove(&id);
                self.state.status = "Song removed".into();
            }
            NetworkEvent::DocumentLoaded {
                session,
                source,
                document,
                from,
            } => {
                if session != self.state.session.id {
                    tracing::debug!(session, current = self.state.session.id, "stale document dropped");
                    return;
                }
                self.documents.put(source, document.clone(), from);
                self.state.status = format!("{} segments", document.segments.len());
                if from == LoadedFrom::Placeholder {
                    self.state.toast = Some(Toast::error("Lyrics unavailable"));
                }
                self.state.session.document = Some(document);
                self.state.session.loaded_from = Some(from);
            }
        }
    }
}
