//! Study Buddy - single-source retrieval chat client
//!
//! A session controller for chatting with a backend answering engine about
//! exactly one attached source: an uploaded PDF or a YouTube transcript.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod command;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod gateway;
pub mod source;
pub mod state_machine;

pub use config::{ClientConfig, ConfigError};
pub use controller::{spawn_session, SessionClosed, SessionHandle, SessionUpdate};
pub use conversation::{ConversationLog, Role, Turn};
pub use gateway::{GatewayError, GatewayErrorKind, HttpGateway, LoggingGateway, RequestGateway};
pub use source::{DocumentFile, SourceBinding};
pub use state_machine::{OperationKind, Phase, SessionState, SessionView};
