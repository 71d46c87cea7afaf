//! Alignment services
//!
//! - `token_builder`: canonical word order and request text
//! - `alignment_client`: forced-alignment HTTP client
//! - `sequential_matcher`: event-to-word matching
//! - `result_sink`: record persistence and outcome notification
//! - `alignment_orchestrator`: the run state machine tying them together

pub mod alignment_client;
pub mod alignment_orchestrator;
pub mod ports;
pub mod result_sink;
pub mod sequential_matcher;
pub mod token_builder;

pub use alignment_client::AlignmentClient;
pub use alignment_orchestrator::{AlignmentOrchestrator, AlignmentPorts};
pub use ports::{
    AlignmentService, AudioUrlResolver, NotificationKind, Notifier, OutcomeReport,
    TimestampStore, TokenSource,
};
pub use result_sink::ResultSink;
pub use sequential_matcher::{match_sequences, MatchCursor, MatchStats, WordMatch};
