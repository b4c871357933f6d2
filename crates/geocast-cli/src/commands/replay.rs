//! Scripted replay against an in-memory store.
//!
//! A script is a JSON-lines file. Each non-blank line that does not start
//! with `#` is one operation, tagged by `op`:
//!
//! ```text
//! {"op":"create","as":"a","user_id":"ana","lat":41.0082,"lng":28.9784}
//! {"op":"advance","secs":60}
//! {"op":"end","stream":"a"}
//! {"op":"live_events","ne":"41.1,29.1","sw":"40.9,28.9"}
//! ```
//!
//! Streams are referred to by the label given in `as`. Every operation
//! prints one JSON line; failures print `{"error": kind, "message": ..}` and
//! the script continues. Time only moves on `advance`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use geocast::{
    DeviceCamera, Geocast, GeocastConfig, GeocastError, ManualClock, NewStream, PrivacyMode, Store,
    StreamId, Timestamp, UserId,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

/// One scripted operation.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Op {
    Create {
        #[serde(rename = "as")]
        label: String,
        user_id: UserId,
        lat: f64,
        lng: f64,
        #[serde(default)]
        privacy_mode: PrivacyMode,
        #[serde(default)]
        device_camera: DeviceCamera,
    },
    End {
        stream: String,
    },
    Advance {
        secs: u64,
    },
    LiveStreams {
        ne: Option<String>,
        sw: Option<String>,
    },
    LiveEvents {
        ne: Option<String>,
        sw: Option<String>,
    },
    EventsInRange {
        from: Option<String>,
        to: Option<String>,
        ne: Option<String>,
        sw: Option<String>,
    },
    EventDetail {
        of: String,
    },
}

/// A failed step, rendered as `{"error": kind, "message": ..}`.
#[derive(Debug)]
struct Failure {
    kind: &'static str,
    message: String,
}

impl Failure {
    fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn to_json(&self) -> Value {
        json!({ "error": self.kind, "message": self.message })
    }
}

impl From<GeocastError> for Failure {
    fn from(err: GeocastError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Self::new("encoding", err.to_string())
    }
}

/// Replay state: the instance, its clock and the stream labels seen so far.
pub struct Replay {
    geocast: Geocast,
    clock: Arc<ManualClock>,
    labels: HashMap<String, StreamId>,
}

impl Replay {
    pub fn new(config: GeocastConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(ManualClock::new(Timestamp::now())))
    }

    pub fn with_clock(config: GeocastConfig, clock: Arc<ManualClock>) -> Result<Self> {
        let store = Store::open(&config.store);
        let geocast = Geocast::new(config, store, clock.clone())
            .context("failed to start geocast instance")?;
        Ok(Self {
            geocast,
            clock,
            labels: HashMap::new(),
        })
    }

    /// Runs one script line. Blank lines and `#` comments yield `None`.
    pub fn step(&mut self, line: &str) -> Option<Value> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let result = serde_json::from_str::<Op>(line)
            .map_err(|err| Failure::new("invalid_op", err.to_string()))
            .and_then(|op| self.apply(op));
        Some(result.unwrap_or_else(|failure| failure.to_json()))
    }

    fn apply(&mut self, op: Op) -> Result<Value, Failure> {
        match op {
            Op::Create {
                label,
                user_id,
                lat,
                lng,
                privacy_mode,
                device_camera,
            } => {
                let request = NewStream {
                    user_id,
                    lat,
                    lng,
                    privacy_mode,
                    device_camera,
                };
                let view = self.geocast.create_stream(request)?;
                self.labels.insert(label, view.id);
                Ok(serde_json::to_value(view)?)
            }
            Op::End { stream } => {
                let id = self.resolve(&stream)?;
                Ok(serde_json::to_value(self.geocast.end_stream(id)?)?)
            }
            Op::Advance { secs } => {
                self.clock.advance(Duration::from_secs(secs));
                Ok(json!({ "now": self.clock_now() }))
            }
            Op::LiveStreams { ne, sw } => {
                let bbox = Geocast::parse_bbox(ne.as_deref(), sw.as_deref())?;
                Ok(serde_json::to_value(
                    self.geocast.list_live_streams(bbox.as_ref())?,
                )?)
            }
            Op::LiveEvents { ne, sw } => {
                let bbox = Geocast::parse_bbox(ne.as_deref(), sw.as_deref())?;
                Ok(serde_json::to_value(
                    self.geocast.list_live_events(bbox.as_ref())?,
                )?)
            }
            Op::EventsInRange { from, to, ne, sw } => {
                let bbox = Geocast::parse_bbox(ne.as_deref(), sw.as_deref())?;
                let from = from.as_deref().map(parse_time).transpose()?;
                let to = to.as_deref().map(parse_time).transpose()?;
                Ok(serde_json::to_value(self.geocast.list_events_in_range(
                    from,
                    to,
                    bbox.as_ref(),
                )?)?)
            }
            Op::EventDetail { of } => {
                let id = self.resolve(&of)?;
                let stream = self.geocast.get_stream(id)?;
                let event_id = stream
                    .event_id
                    .ok_or_else(|| Failure::new("not_found", format!("stream {of} has no event")))?;
                Ok(serde_json::to_value(
                    self.geocast.get_event_detail(event_id)?,
                )?)
            }
        }
    }

    fn resolve(&self, label: &str) -> Result<StreamId, Failure> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| Failure::new("not_found", format!("unknown stream label {label}")))
    }

    fn clock_now(&self) -> Timestamp {
        use geocast::Clock as _;
        self.clock.now()
    }
}

fn parse_time(raw: &str) -> Result<Timestamp, Failure> {
    Timestamp::parse_rfc3339(raw)
        .map_err(|err| Failure::new("invalid_op", format!("bad timestamp {raw:?}: {err}")))
}

/// Replays `input` line by line, writing one JSON result per operation.
pub fn replay<R: BufRead, W: Write>(replay: &mut Replay, input: R, mut out: W) -> Result<usize> {
    let mut steps = 0;
    for line in input.lines() {
        let line = line.context("failed to read script")?;
        if let Some(result) = replay.step(&line) {
            writeln!(out, "{result}").context("failed to write result")?;
            steps += 1;
        }
    }
    out.flush().context("failed to flush output")?;
    Ok(steps)
}

/// Runs `script` against a fresh in-memory instance and prints the results.
pub fn run(config: GeocastConfig, script: &Path) -> Result<()> {
    let file =
        File::open(script).with_context(|| format!("failed to open {}", script.display()))?;
    let mut state = Replay::new(config)?;
    let steps = replay(&mut state, BufReader::new(file), io::stdout().lock())?;
    info!(steps, script = %script.display(), "replay finished");
    Ok(())
}
