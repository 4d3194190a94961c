//! Event producer (spec.md §4.C11): reads NDJSON from the native
//! event-monitor helper, coalesces keystrokes, accumulates scroll distance,
//! and drives the heartbeat, emitting [`TimestampedEvent`]s and
//! [`TriggerReason`]s through bounded channels to its sibling producers.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::warn;

use core_types::{RecordingEvent, TimestampedEvent};

use crate::coalescer::Coalescer;
use crate::events::{parse_ndjson_line, RawInputEvent};
use crate::triggers::{Heartbeat, ScrollAccumulator, TriggerReason};

pub struct EventProducerConfig {
    pub coalesce_window_ms: u64,
    pub heartbeat_interval_ms: u64,
    pub scroll_trigger_px: f64,
}

/// Drives the event producer loop until `reader` is exhausted or `stop`
/// resolves. `session_start` anchors relative-ms timestamps;
/// `wall_clock_start` anchors the absolute timestamps stored alongside them.
pub async fn run_event_producer<R>(
    reader: R,
    session_start: Instant,
    wall_clock_start: DateTime<Utc>,
    config: EventProducerConfig,
    events_tx: Sender<TimestampedEvent>,
    triggers_tx: Sender<TriggerReason>,
    mut stop: oneshot::Receiver<()>,
) where
    R: AsyncBufRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut coalescer = Coalescer::new();
    let mut scroll = ScrollAccumulator::new(config.scroll_trigger_px);
    let mut heartbeat = Heartbeat::new(config.heartbeat_interval_ms);
    let coalesce_window_ms = config.coalesce_window_ms;

    loop {
        let idle_deadline = coalescer
            .last_activity_ms()
            .map(|last_ms| session_start + Duration::from_millis(last_ms + coalesce_window_ms));
        let heartbeat_deadline = session_start + Duration::from_millis(heartbeat.next_deadline_ms());
        let far_future = Instant::now() + Duration::from_secs(3600);

        tokio::select! {
            biased;

            _ = &mut stop => {
                let at_ms = elapsed_ms(session_start);
                flush_burst(&mut coalescer, at_ms, wall_clock_start, &events_tx).await;
                break;
            }

            line = lines.next_line() => {
                match line {
                    Ok(Some(raw)) => {
                        let at_ms = elapsed_ms(session_start);
                        match parse_ndjson_line(&raw) {
                            Ok(raw_event) => {
                                handle_raw_event(
                                    raw_event,
                                    at_ms,
                                    wall_clock_start,
                                    &mut coalescer,
                                    &mut scroll,
                                    &mut heartbeat,
                                    &events_tx,
                                    &triggers_tx,
                                )
                                .await;
                            }
                            Err(err) => {
                                warn!(error = %err, line = %raw, "event-producer: dropping malformed NDJSON line");
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        warn!(error = %err, "event-producer: helper stdout read error");
                        break;
                    }
                }
            }

            _ = tokio::time::sleep_until(idle_deadline.unwrap_or(far_future)), if idle_deadline.is_some() => {
                let at_ms = elapsed_ms(session_start);
                flush_burst(&mut coalescer, at_ms, wall_clock_start, &events_tx).await;
            }

            _ = tokio::time::sleep_until(heartbeat_deadline) => {
                let at_ms = elapsed_ms(session_start);
                if heartbeat.due(at_ms) {
                    heartbeat.note_activity(at_ms);
                    if triggers_tx.send(TriggerReason::Heartbeat).await.is_err() {
                        warn!("event-producer: frame producer channel closed");
                    }
                }
            }
        }
    }
}

fn elapsed_ms(session_start: Instant) -> u64 {
    session_start.elapsed().as_millis() as u64
}

#[allow(clippy::too_many_arguments)]
async fn handle_raw_event(
    raw: RawInputEvent,
    at_ms: u64,
    wall_clock_start: DateTime<Utc>,
    coalescer: &mut Coalescer,
    scroll: &mut ScrollAccumulator,
    heartbeat: &mut Heartbeat,
    events_tx: &Sender<TimestampedEvent>,
    triggers_tx: &Sender<TriggerReason>,
) {
    heartbeat.note_activity(at_ms);

    if let RawInputEvent::Keypress { key } = &raw {
        coalescer.push_keypress(key, at_ms);
        return;
    }

    flush_burst(coalescer, at_ms, wall_clock_start, events_tx).await;

    let event = match raw {
        RawInputEvent::Click { button, x, y } => RecordingEvent::Click { button, x, y },
        RawInputEvent::Doubleclick { x, y } => RecordingEvent::DoubleClick { x, y },
        RawInputEvent::Hotkey { keys } => RecordingEvent::Hotkey { keys },
        RawInputEvent::Scroll { x, y, delta_y } => RecordingEvent::Scroll { x, y, delta_y },
        RawInputEvent::AppSwitch { from_app, to_app } => RecordingEvent::AppSwitch { from_app, to_app },
        RawInputEvent::WindowFocus { app, title } => RecordingEvent::WindowFocus { app, title },
        RawInputEvent::Keypress { .. } => unreachable!("keypress handled above"),
    };

    if let RecordingEvent::Scroll { delta_y, .. } = &event {
        if scroll.push(*delta_y) && triggers_tx.send(TriggerReason::ScrollThreshold).await.is_err() {
            warn!("event-producer: frame producer channel closed");
        }
    }

    send_event(events_tx, event, at_ms, wall_clock_start).await;
}

async fn flush_burst(
    coalescer: &mut Coalescer,
    at_ms: u64,
    wall_clock_start: DateTime<Utc>,
    events_tx: &Sender<TimestampedEvent>,
) {
    if let Some(event) = coalescer.flush(at_ms) {
        send_event(events_tx, event, at_ms, wall_clock_start).await;
    }
}

async fn send_event(
    events_tx: &Sender<TimestampedEvent>,
    event: RecordingEvent,
    relative_ms: u64,
    wall_clock_start: DateTime<Utc>,
) {
    let timestamped = TimestampedEvent {
        at: wall_clock_start + chrono::Duration::milliseconds(relative_ms as i64),
        relative_ms,
        event,
    };
    if events_tx.send(timestamped).await.is_err() {
        warn!("event-producer: manifest builder channel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use tokio::sync::mpsc;

    fn config() -> EventProducerConfig {
        EventProducerConfig {
            coalesce_window_ms: 500,
            heartbeat_interval_ms: 5_000,
            scroll_trigger_px: 500.0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn non_keypress_events_flush_a_pending_burst_first() {
        let ndjson = "{\"type\":\"keypress\",\"key\":\"a\"}\n{\"type\":\"click\",\"button\":\"left\",\"x\":1,\"y\":2}\n";
        let reader = Cursor::new(ndjson.as_bytes().to_vec());
        let (events_tx, mut events_rx) = mpsc::channel(16);
        let (triggers_tx, _triggers_rx) = mpsc::channel(16);
        let (_stop_tx, stop_rx) = oneshot::channel();

        run_event_producer(
            reader,
            Instant::now(),
            Utc::now(),
            config(),
            events_tx,
            triggers_tx,
            stop_rx,
        )
        .await;

        let first = events_rx.recv().await.unwrap();
        assert!(matches!(first.event, RecordingEvent::Typing { .. }));
        let second = events_rx.recv().await.unwrap();
        assert!(matches!(second.event, RecordingEvent::Click { .. }));
        assert!(events_rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn scroll_past_threshold_emits_a_trigger() {
        let ndjson = "{\"type\":\"scroll\",\"x\":0,\"y\":0,\"deltaY\":600}\n";
        let reader = Cursor::new(ndjson.as_bytes().to_vec());
        let (events_tx, mut events_rx) = mpsc::channel(16);
        let (triggers_tx, mut triggers_rx) = mpsc::channel(16);
        let (_stop_tx, stop_rx) = oneshot::channel();

        run_event_producer(
            reader,
            Instant::now(),
            Utc::now(),
            config(),
            events_tx,
            triggers_tx,
            stop_rx,
        )
        .await;

        assert_eq!(triggers_rx.recv().await, Some(TriggerReason::ScrollThreshold));
        let event = events_rx.recv().await.unwrap();
        assert!(matches!(event.event, RecordingEvent::Scroll { .. }));
    }
}
