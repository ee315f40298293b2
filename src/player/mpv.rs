//! mpv child process driven over its JSON IPC socket
//!
//! One reader task owns the socket's read half. Replies are matched to
//! pending commands by `request_id`; unsolicited events are mapped to
//! [`PlayerEvent`]s and forwarded on an unbounded channel. When the socket
//! closes, the reader drops the event sender and every pending reply, so the
//! event bridge sees a closed channel and waiting commands fail fast.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{PauseOutcome, PlayerEvent, PlayerPort};
use crate::error::{PortError, bounded};
use crate::model::QueueEntry;

const CONNECT_ATTEMPTS: usize = 50;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(100);
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

type Reply = std::result::Result<Value, String>;
/// `None` once the socket has closed; new commands then fail immediately.
type PendingReplies = Arc<Mutex<Option<HashMap<u64, oneshot::Sender<Reply>>>>>;

pub struct MpvPlayer {
    child: Mutex<Option<Child>>,
    writer: Mutex<OwnedWriteHalf>,
    pending: PendingReplies,
    next_request_id: AtomicU64,
    events: Mutex<Option<mpsc::UnboundedReceiver<PlayerEvent>>>,
    queue: Mutex<Vec<QueueEntry>>,
    reader: Mutex<Option<JoinHandle<()>>>,
    socket_path: Option<PathBuf>,
    cleaned_up: AtomicBool,
}

impl MpvPlayer {
    /// Start `mpv --idle` and connect to its IPC socket.
    pub async fn spawn(mpv_path: &str) -> Result<Self> {
        let socket_path =
            std::env::temp_dir().join(format!("navi-rs-mpv-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&socket_path);

        let child = Command::new(mpv_path)
            .arg("--idle=yes")
            .arg("--no-video")
            .arg("--no-terminal")
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to start {mpv_path}"))?;

        tracing::info!(pid = ?child.id(), socket = %socket_path.display(), "mpv started");

        let stream = connect_with_retry(&socket_path).await?;
        Ok(Self::from_stream(stream, Some(child), Some(socket_path)))
    }

    fn from_stream(stream: UnixStream, child: Option<Child>, socket_path: Option<PathBuf>) -> Self {
        let (read_half, write_half) = stream.into_split();
        let pending: PendingReplies = Arc::new(Mutex::new(Some(HashMap::new())));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let reader = tokio::spawn(read_loop(read_half, pending.clone(), event_tx));

        Self {
            child: Mutex::new(child),
            writer: Mutex::new(write_half),
            pending,
            next_request_id: AtomicU64::new(1),
            events: Mutex::new(Some(event_rx)),
            queue: Mutex::new(Vec::new()),
            reader: Mutex::new(Some(reader)),
            socket_path,
            cleaned_up: AtomicBool::new(false),
        }
    }

    async fn command(&self, args: Value) -> Result<Value, PortError> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        match self.pending.lock().await.as_mut() {
            Some(pending) => pending.insert(request_id, tx),
            None => return Err(PortError::Unavailable("mpv")),
        };

        let mut line = serde_json::to_string(&json!({
            "command": args,
            "request_id": request_id,
        }))?;
        line.push('\n');

        let written = self.writer.lock().await.write_all(line.as_bytes()).await;
        if let Err(e) = written {
            if let Some(pending) = self.pending.lock().await.as_mut() {
                pending.remove(&request_id);
            }
            return Err(PortError::Engine(format!("IPC write failed: {e}")));
        }

        match rx.await {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(message)) => Err(PortError::Engine(message)),
            Err(_) => Err(PortError::Unavailable("mpv")),
        }
    }

    async fn get_f64(&self, name: &str) -> Result<f64, PortError> {
        let value = self.command(json!(["get_property", name])).await?;
        value
            .as_f64()
            .ok_or_else(|| PortError::Decode(format!("{name} is not a number")))
    }

    async fn get_bool(&self, name: &str) -> Result<bool, PortError> {
        let value = self.command(json!(["get_property", name])).await?;
        value
            .as_bool()
            .ok_or_else(|| PortError::Decode(format!("{name} is not a flag")))
    }
}

#[async_trait]
impl PlayerPort for MpvPlayer {
    async fn play(&self, url: &str) -> Result<(), PortError> {
        self.command(json!(["loadfile", url, "replace"])).await?;
        self.command(json!(["set_property", "pause", false])).await?;
        Ok(())
    }

    async fn pause(&self) -> Result<PauseOutcome, PortError> {
        if self.is_song_loaded().await? {
            let was_paused = self.is_paused().await?;
            self.command(json!(["cycle", "pause"])).await?;
            return Ok(if was_paused {
                PauseOutcome::Playing
            } else {
                PauseOutcome::Paused
            });
        }

        let first = self.queue.lock().await.first().cloned();
        match first {
            Some(entry) => {
                self.play(&entry.uri).await?;
                Ok(PauseOutcome::Playing)
            }
            None => Ok(PauseOutcome::Stopped),
        }
    }

    async fn stop(&self) -> Result<(), PortError> {
        self.command(json!(["stop"])).await.map(|_| ())
    }

    async fn get_progress(&self) -> Result<(f64, f64), PortError> {
        let position = self.get_f64("time-pos").await?;
        let duration = self.get_f64("duration").await?;
        Ok((position, duration))
    }

    async fn get_volume(&self) -> Result<f64, PortError> {
        self.get_f64("volume").await
    }

    async fn set_volume(&self, volume: f64) -> Result<(), PortError> {
        self.command(json!(["set_property", "volume", volume]))
            .await
            .map(|_| ())
    }

    async fn is_playing(&self) -> bool {
        match (self.is_song_loaded().await, self.is_paused().await) {
            (Ok(loaded), Ok(paused)) => loaded && !paused,
            _ => false,
        }
    }

    async fn is_paused(&self) -> Result<bool, PortError> {
        self.get_bool("pause").await
    }

    async fn is_song_loaded(&self) -> Result<bool, PortError> {
        self.get_bool("idle-active").await.map(|idle| !idle)
    }

    async fn add_to_queue(&self, entry: QueueEntry) {
        self.queue.lock().await.push(entry);
    }

    async fn get_queue(&self) -> Vec<QueueEntry> {
        self.queue.lock().await.clone()
    }

    async fn clear_queue(&self) {
        self.queue.lock().await.clear();
    }

    async fn event_channel(&self) -> Option<mpsc::UnboundedReceiver<PlayerEvent>> {
        self.events.lock().await.take()
    }

    async fn cleanup(&self) {
        if self.cleaned_up.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!("Shutting down mpv");

        if let Err(e) = bounded(SHUTDOWN_GRACE, self.command(json!(["quit"]))).await {
            tracing::debug!(error = %e, "mpv quit command not acknowledged");
        }

        if let Some(mut child) = self.child.lock().await.take() {
            if tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await.is_err() {
                tracing::warn!("mpv did not exit in time, killing it");
                let _ = child.kill().await;
            }
        }

        if let Some(reader) = self.reader.lock().await.take() {
            reader.abort();
        }

        if let Some(path) = &self.socket_path {
            let _ = std::fs::remove_file(path);
        }
    }
}

async fn connect_with_retry(path: &Path) -> Result<UnixStream> {
    let mut last_error = None;
    for _ in 0..CONNECT_ATTEMPTS {
        match UnixStream::connect(path).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                last_error = Some(e);
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
        }
    }
    Err(anyhow!(
        "could not connect to mpv IPC socket {}: {}",
        path.display(),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

async fn read_loop(
    read_half: OwnedReadHalf,
    pending: PendingReplies,
    events: mpsc::UnboundedSender<PlayerEvent>,
) {
    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_message(&line) {
                Some(IpcMessage::Reply { request_id, reply }) => {
                    let waiter = pending
                        .lock()
                        .await
                        .as_mut()
                        .and_then(|pending| pending.remove(&request_id));
                    if let Some(tx) = waiter {
                        let _ = tx.send(reply);
                    }
                }
                Some(IpcMessage::Event(event)) => {
                    tracing::debug!(?event, "mpv event");
                    let _ = events.send(event);
                }
                None => tracing::trace!(line = %line, "Ignoring mpv message"),
            },
            Ok(None) => {
                tracing::info!("mpv IPC socket closed");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "mpv IPC read failed");
                break;
            }
        }
    }
    pending.lock().await.take();
}

#[derive(Debug, PartialEq)]
enum IpcMessage {
    Reply { request_id: u64, reply: Reply },
    Event(PlayerEvent),
}

fn parse_message(line: &str) -> Option<IpcMessage> {
    let value: Value = serde_json::from_str(line).ok()?;

    if let Some(request_id) = value.get("request_id").and_then(Value::as_u64) {
        let status = value.get("error").and_then(Value::as_str).unwrap_or("success");
        let reply = if status == "success" {
            Ok(value.get("data").cloned().unwrap_or(Value::Null))
        } else {
            Err(status.to_string())
        };
        return Some(IpcMessage::Reply { request_id, reply });
    }

    let name = value.get("event").and_then(Value::as_str)?;
    let event = match name {
        "start-file" => PlayerEvent::Loading,
        "file-loaded" => PlayerEvent::Playing,
        "end-file" => match value.get("reason").and_then(Value::as_str) {
            Some("eof") => PlayerEvent::EndOfTrack,
            Some("error") => PlayerEvent::Failed(
                value
                    .get("file_error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            ),
            _ => PlayerEvent::Stopped,
        },
        other => PlayerEvent::Other(other.to_string()),
    };
    Some(IpcMessage::Event(event))
}
