//! Top-level recording session orchestration (spec.md §4.C11): wires the
//! three producers into a single manifest builder. Per spec.md §9 "Design
//! notes", the producers are explicit tasks communicating through bounded
//! queues; the manifest builder is a join point reached on stop, not a
//! callback invoked by each producer.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};
use vision_stratum::capture::ScreenCapture;

use core_types::{FrameMap, SessionManifest, TimestampedEvent};
use uia_config::RecordingConfig;

use crate::audio_producer::{self, AudioProducer};
use crate::errors::RecordingError;
use crate::event_producer::{self, EventProducerConfig};
use crate::frame_producer::FrameProducer;
use crate::manifest::build_manifest;
use crate::transcription::Transcriber;
use crate::triggers::TriggerReason;

/// Program + args for a native helper this pipeline spawns. The helper
/// binaries themselves are out of scope (spec.md §1); only their stdout/file
/// contract is specified.
#[derive(Clone, Debug)]
pub struct HelperCommand {
    pub program: String,
    pub args: Vec<String>,
}

pub struct RecordingSessionConfig {
    pub id: String,
    pub description: String,
    pub session_dir: PathBuf,
    pub event_monitor: HelperCommand,
    pub audio_recorder: Option<HelperCommand>,
    pub recording: RecordingConfig,
    pub capture_timeout: Duration,
}

pub struct RecordingSession {
    id: String,
    description: String,
    session_dir: PathBuf,
    start_time: DateTime<Utc>,
    session_start: Instant,
    narration_proximity_window_ms: i64,

    frames: Arc<Mutex<FrameMap>>,
    events: Arc<Mutex<Vec<TimestampedEvent>>>,

    event_monitor_child: Child,
    event_stop_tx: oneshot::Sender<()>,
    event_task: JoinHandle<()>,

    frame_stop_tx: oneshot::Sender<()>,
    frame_task: JoinHandle<()>,

    audio: Option<(Child, PathBuf)>,
    audio_flush_grace: Duration,

    transcriber: Option<Arc<dyn Transcriber>>,
}

impl RecordingSession {
    pub async fn start(
        config: RecordingSessionConfig,
        transcriber: Option<Arc<dyn Transcriber>>,
    ) -> Result<Self, RecordingError> {
        tokio::fs::create_dir_all(&config.session_dir)
            .await
            .map_err(|err| RecordingError::Io(err.to_string()))?;
        let frames_dir = config.session_dir.join("frames");
        tokio::fs::create_dir_all(&frames_dir)
            .await
            .map_err(|err| RecordingError::Io(err.to_string()))?;

        let mut monitor_child = Command::new(&config.event_monitor.program)
            .args(&config.event_monitor.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                RecordingError::HelperSpawnFailed(config.event_monitor.program.clone(), err.to_string())
            })?;

        let stdout = monitor_child
            .stdout
            .take()
            .ok_or_else(|| RecordingError::HelperSpawnFailed(config.event_monitor.program.clone(), "no stdout pipe".to_string()))?;
        let reader = tokio::io::BufReader::new(stdout);

        let session_start = Instant::now();
        let start_time = Utc::now();

        let (events_tx, mut events_rx) = mpsc::channel::<TimestampedEvent>(256);
        let (triggers_tx, triggers_rx) = mpsc::channel::<TriggerReason>(64);
        let (event_stop_tx, event_stop_rx) = oneshot::channel();
        let (frame_stop_tx, frame_stop_rx) = oneshot::channel();

        let events: Arc<Mutex<Vec<TimestampedEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let events_sink = events.clone();
        tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                events_sink.lock().push(event);
            }
        });

        let event_producer_config = EventProducerConfig {
            coalesce_window_ms: config.recording.coalesce_window_ms,
            heartbeat_interval_ms: config.recording.heartbeat_interval_ms,
            scroll_trigger_px: config.recording.scroll_trigger_px,
        };
        let event_task = tokio::spawn(event_producer::run_event_producer(
            reader,
            session_start,
            start_time,
            event_producer_config,
            events_tx,
            triggers_tx,
            event_stop_rx,
        ));

        let frames: Arc<Mutex<FrameMap>> = Arc::new(Mutex::new(FrameMap::default()));
        let frame_producer = FrameProducer::new(
            ScreenCapture::new(config.capture_timeout),
            frames_dir,
            config.recording.frame_debounce_ms,
        );
        let frames_sink = frames.clone();
        let frame_task = tokio::spawn(frame_producer.run(session_start, triggers_rx, frames_sink, frame_stop_rx));

        let audio = match config.audio_recorder {
            Some(helper) => {
                let output_path = config.session_dir.join("audio.wav");
                let producer = AudioProducer::new(helper.program, helper.args, output_path.clone());
                match producer.start().await {
                    Ok(child) => Some((child, output_path)),
                    Err(err) => {
                        warn!(error = %err, "recording-pipeline: audio recorder failed to start, continuing without audio");
                        None
                    }
                }
            }
            None => None,
        };

        info!(id = %config.id, dir = %config.session_dir.display(), "recording session started");

        Ok(Self {
            id: config.id,
            description: config.description,
            session_dir: config.session_dir,
            start_time,
            session_start,
            narration_proximity_window_ms: config.recording.narration_proximity_window_ms,
            frames,
            events,
            event_monitor_child: monitor_child,
            event_stop_tx,
            event_task,
            frame_stop_tx,
            frame_task,
            audio,
            audio_flush_grace: Duration::from_millis(config.recording.audio_flush_grace_ms),
            transcriber,
        })
    }

    /// Stop orchestration (spec.md §4.C11): stop all producers, flush the
    /// final burst, transcribe if configured and audio exists, then build
    /// and persist the manifest.
    pub async fn stop(mut self) -> Result<SessionManifest, RecordingError> {
        let _ = self.event_stop_tx.send(());
        let _ = self.event_task.await;
        let _ = self.event_monitor_child.start_kill();
        let _ = self.event_monitor_child.wait().await;

        let _ = self.frame_stop_tx.send(());
        let _ = self.frame_task.await;

        let end_time = Utc::now();

        let wav_path = match self.audio.take() {
            Some((child, path)) => audio_producer::stop_and_collect(child, &path, self.audio_flush_grace).await,
            None => None,
        };

        let narration = match (&self.transcriber, &wav_path) {
            (Some(transcriber), Some(path)) => match transcriber.transcribe(path).await {
                Ok(segments) => segments,
                Err(err) => {
                    warn!(error = %err, "recording-pipeline: transcription failed, continuing without narration");
                    Vec::new()
                }
            },
            _ => Vec::new(),
        };

        let events = self.events.lock().clone();
        let frames = self.frames.lock().clone();
        let audio_file = wav_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned());

        let manifest = build_manifest(
            self.id.clone(),
            self.description.clone(),
            self.start_time,
            end_time,
            &events,
            &frames,
            &narration,
            audio_file,
            self.narration_proximity_window_ms,
        );

        write_json_pretty(&self.session_dir.join("events.json"), &events).await?;
        write_json_pretty(&self.session_dir.join("manifest.json"), &manifest).await?;

        Ok(manifest)
    }
}

async fn write_json_pretty<T: serde::Serialize>(path: &std::path::Path, value: &T) -> Result<(), RecordingError> {
    let text = serde_json::to_string_pretty(value).map_err(|err| RecordingError::Io(err.to_string()))?;
    tokio::fs::write(path, text)
        .await
        .map_err(|err| RecordingError::Io(err.to_string()))
}
