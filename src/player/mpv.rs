use super::{PlaybackClock, PlaybackRate, SeekOutcome};
use crate::app::events::{Event, PlayerEvent};
use anyhow::Context;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::UnixStream,
    process::{Child, Command},
    sync::mpsc,
};

/// Engine state mirrored from the IPC event stream.
#[derive(Debug, Default)]
struct Shared {
    loaded: AtomicBool,
    time_bits: AtomicU64,
    duration_bits: AtomicU64,
}

impl Shared {
    fn set_time(&self, seconds: f64) {
        self.time_bits.store(seconds.to_bits(), Ordering::Relaxed);
    }

    fn set_duration(&self, seconds: f64) {
        self.duration_bits.store(seconds.to_bits(), Ordering::Relaxed);
        self.loaded.store(seconds > 0.0, Ordering::Relaxed);
    }

    fn reset(&self) {
        self.loaded.store(false, Ordering::Relaxed);
        self.set_time(0.0);
        self.duration_bits.store(0f64.to_bits(), Ordering::Relaxed);
    }
}

/// mpv child process driven over its JSON IPC socket.
///
/// Commands are queued to a writer task so every call returns immediately.
#[derive(Debug)]
pub struct MpvHandle {
    child: Child,
    socket_path: PathBuf,
    commands: mpsc::UnboundedSender<serde_json::Value>,
    request_id: AtomicU64,
    shared: Arc<Shared>,
    rate: PlaybackRate,
}

impl MpvHandle {
    pub async fn spawn(
        event_tx: mpsc::Sender<Event>,
        audio_device: Option<&str>,
        log_file: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let socket_path =
            std::env::temp_dir().join(format!("karaoke-mpv-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&socket_path);

        let mut cmd = Command::new("mpv");
        cmd.args([
            "--no-video",
            "--idle=yes",
            "--input-terminal=no",
            "--really-quiet",
            "--keep-open=yes",
            // speed changes go through scaletempo, not resampling
            "--audio-pitch-correction=yes",
        ]);
        if let Some(dev) = audio_device {
            cmd.arg(format!("--audio-device={dev}"));
        }
        if let Some(p) = log_file {
            cmd.arg(format!("--log-file={}", p.display()));
        }
        let child = cmd
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .context("spawn mpv")?;

        let stream = connect_with_retry(&socket_path).await?;
        let (reader, writer) = tokio::io::split(stream);

        let shared = Arc::new(Shared::default());
        tokio::spawn(read_events_loop(reader, event_tx, shared.clone()));

        let (commands, command_rx) = mpsc::unbounded_channel();
        tokio::spawn(write_commands_loop(writer, command_rx));

        let this = Self {
            child,
            socket_path,
            commands,
            request_id: AtomicU64::new(1),
            shared,
            rate: PlaybackRate::NORMAL,
        };

        this.command(json!({"command":["request_log_messages", "warn"]}))?;
        this.command(json!({"command":["observe_property", 1, "time-pos"]}))?;
        this.command(json!({"command":["observe_property", 2, "duration"]}))?;
        this.command(json!({"command":["observe_property", 3, "pause"]}))?;
        this.command(json!({"command":["observe_property", 4, "eof-reached"]}))?;

        tracing::info!(socket = %this.socket_path.display(), "mpv started");
        Ok(this)
    }

    pub fn load_file(&self, path: &Path) -> anyhow::Result<()> {
        self.shared.reset();
        let target = path.to_string_lossy();
        tracing::info!(%target, "mpv loadfile");
        self.command(json!({"command":["loadfile", target, "replace"]}))
    }

    pub fn set_volume(&self, volume_0_100: u8) -> anyhow::Result<()> {
        self.command(json!({"command":["set_property", "volume", volume_0_100]}))
    }

    fn command(&self, mut v: serde_json::Value) -> anyhow::Result<()> {
        if v.get("request_id").is_none() {
            let id = self.request_id.fetch_add(1, Ordering::Relaxed);
            if let serde_json::Value::Object(ref mut o) = v {
                o.insert("request_id".to_string(), serde_json::Value::from(id));
            }
        }
        self.commands.send(v).context("mpv writer stopped")
    }
}

impl PlaybackClock for MpvHandle {
    fn play(&mut self) -> anyhow::Result<()> {
        self.command(json!({"command":["set_property", "pause", false]}))
    }

    fn pause(&mut self) -> anyhow::Result<()> {
        self.command(json!({"command":["set_property", "pause", true]}))
    }

    fn toggle_pause(&mut self) -> anyhow::Result<()> {
        self.command(json!({"command":["cycle", "pause"]}))
    }

    fn seek(&mut self, seconds: f64) -> anyhow::Result<SeekOutcome> {
        if !self.shared.loaded.load(Ordering::Relaxed) {
            tracing::debug!(seconds, "seek before load ignored");
            return Ok(SeekOutcome::Ignored);
        }
        self.command(json!({"command":["seek", seconds, "absolute+exact"]}))?;
        Ok(SeekOutcome::Applied)
    }

    fn set_rate(&mut self, rate: PlaybackRate) -> anyhow::Result<()> {
        self.command(json!({"command":["set_property", "speed", rate.as_f64()]}))?;
        self.rate = rate;
        Ok(())
    }

    fn rate(&self) -> PlaybackRate {
        self.rate
    }

    fn current_time(&self) -> f64 {
        f64::from_bits(self.shared.time_bits.load(Ordering::Relaxed))
    }

    fn duration(&self) -> Option<f64> {
        self.shared
            .loaded
            .load(Ordering::Relaxed)
            .then(|| f64::from_bits(self.shared.duration_bits.load(Ordering::Relaxed)))
    }
}

impl Drop for MpvHandle {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

async fn connect_with_retry(path: &PathBuf) -> anyhow::Result<UnixStream> {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        match UnixStream::connect(path).await {
            Ok(s) => return Ok(s),
            Err(e) => {
                if tokio::time::Instant::now() > deadline {
                    return Err(e).with_context(|| format!("connect to mpv ipc {}", path.display()));
                }
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
        }
    }
}

async fn write_commands_loop(
    mut writer: tokio::io::WriteHalf<UnixStream>,
    mut rx: mpsc::UnboundedReceiver<serde_json::Value>,
) {
    while let Some(v) = rx.recv().await {
        let mut line = match serde_json::to_vec(&v) {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!("encode mpv json: {e}");
                continue;
            }
        };
        line.push(b'\n');
        if let Err(e) = writer.write_all(&line).await {
            tracing::warn!("write mpv ipc: {e}");
            break;
        }
        let _ = writer.flush().await;
    }
}

async fn read_events_loop(
    reader: tokio::io::ReadHalf<UnixStream>,
    event_tx: mpsc::Sender<Event>,
    shared: Arc<Shared>,
) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Ok(v) = serde_json::from_str::<serde_json::Value>(&line) else {
            continue;
        };
        if let (Some(_rid), Some(err)) = (v.get("request_id"), v.get("error"))
            && let Some(err_s) = err.as_str()
            && err_s != "success"
        {
            let _ = event_tx
                .send(Event::Player(PlayerEvent::Error(format!("mpv ipc error: {err_s}"))))
                .await;
        }
        if let Some(pe) = map_mpv_event(&v) {
            match &pe {
                PlayerEvent::Position { seconds } => shared.set_time(*seconds),
                PlayerEvent::Duration { seconds } => shared.set_duration(*seconds),
                _ => {}
            }
            if event_tx.send(Event::Player(pe)).await.is_err() {
                break;
            }
        }
    }
    tracing::debug!("mpv event stream closed");
}

fn map_mpv_event(v: &serde_json::Value) -> Option<PlayerEvent> {
    match v.get("event")?.as_str()? {
        "property-change" => {
            let name = v.get("name")?.as_str()?;
            match name {
                // data is null while nothing is loaded
                "time-pos" => Some(PlayerEvent::Position {
                    seconds: v.get("data")?.as_f64()?,
                }),
                "duration" => Some(PlayerEvent::Duration {
                    seconds: v.get("data")?.as_f64()?,
                }),
                "pause" => {
                    let paused = v.get("data")?.as_bool().unwrap_or(false);
                    Some(if paused { PlayerEvent::Paused } else { PlayerEvent::Started })
                }
                "eof-reached" => {
                    let eof = v.get("data")?.as_bool().unwrap_or(false);
                    if eof { Some(PlayerEvent::Ended) } else { None }
                }
                _ => None,
            }
        }
        "playback-restart" => Some(PlayerEvent::Seeked),
        "end-file" => {
            let reason = v.get("reason").and_then(|x| x.as_str()).unwrap_or("");
            if reason == "error" {
                let err = v.get("error").and_then(|x| x.as_str()).unwrap_or("unknown");
                Some(PlayerEvent::Error(format!("mpv end-file error: {err}")))
            } else {
                None
            }
        }
        "log-message" => {
            let level = v.get("level")?.as_str().unwrap_or("info");
            let text = v.get("text")?.as_str().unwrap_or("").trim();
            if (level == "warn" || level == "error") && !text.is_empty() {
                Some(PlayerEvent::Error(format!("mpv {level}: {text}")))
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_time_pos() {
        let v = json!({"event": "property-change", "name": "time-pos", "data": 12.5});
        assert!(matches!(map_mpv_event(&v), Some(PlayerEvent::Position { seconds }) if seconds == 12.5));
    }

    #[test]
    fn test_null_time_pos_is_dropped() {
        let v = json!({"event": "property-change", "name": "time-pos", "data": null});
        assert!(map_mpv_event(&v).is_none());
    }

    #[test]
    fn test_playback_restart_is_seek_ack() {
        let v = json!({"event": "playback-restart"});
        assert!(matches!(map_mpv_event(&v), Some(PlayerEvent::Seeked)));
    }

    #[test]
    fn test_end_file_error() {
        let v = json!({"event": "end-file", "reason": "error", "error": "loading failed"});
        assert!(matches!(map_mpv_event(&v), Some(PlayerEvent::Error(e)) if e.contains("loading failed")));
    }

    #[test]
    fn test_shared_loaded_follows_duration() {
        let shared = Shared::default();
        assert!(!shared.loaded.load(Ordering::Relaxed));
        shared.set_duration(180.0);
        assert!(shared.loaded.load(Ordering::Relaxed));
        shared.reset();
        assert!(!shared.loaded.load(Ordering::Relaxed));
    }
}
