#![allow(dead_code)]

pub mod envelope;
pub mod error;
pub mod observation;
pub mod recording;
pub mod reftable;
pub mod response;
pub mod stratum;
pub mod workflow;

pub use envelope::{Command, CommandKind, Hello, HelloKind, Layer, ResultEnvelope, ResultKind, Status};
pub use error::StratumErrorKind;
pub use observation::{AvailableLayer, ElementRecord, Observation, PageMetadata, RecentAction};
pub use recording::{
    FrameMap, ManifestEntry, RecordingEvent, SessionManifest, TimestampedEvent,
    TranscriptionSegment,
};
pub use reftable::{RefLookup, RefTable};
pub use response::{OracleAction, OracleReply, ParsedResponse};
pub use stratum::{optional_bool, optional_i64, optional_str, optional_u64, require_str, Stratum};
pub use workflow::{LoopDef, RuleDef, StepDef, VariableDef, WorkflowDefinition};
