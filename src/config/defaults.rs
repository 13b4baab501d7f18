use super::{BackendConfig, Config, InputConfig, PathsConfig, PlayerConfig, UiConfig};
use crate::render::ViewMode;
use std::path::PathBuf;

pub fn data_dir() -> PathBuf {
    super::project_dirs()
        .map(|p| p.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("karaoke"))
}

pub fn player() -> PlayerConfig {
    PlayerConfig {
        audio_device: None,
        volume: 80,
        rate: 1.0,
    }
}

pub fn backend() -> BackendConfig {
    BackendConfig {
        base_url: "http://127.0.0.1:3000".to_string(),
        // Downloads and processing run for minutes.
        timeout_secs: 120,
    }
}

pub fn ui() -> UiConfig {
    UiConfig {
        view_mode: ViewMode::Karaoke,
        show_translations: true,
        last_screen: None,
    }
}

pub fn defaults() -> Config {
    Config {
        input: InputConfig { mouse: true },
        paths: PathsConfig { data_dir: data_dir() },
        player: player(),
        backend: backend(),
        ui: ui(),
    }
}
