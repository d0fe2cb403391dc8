//! # Resource Console
//!
//! A terminal console for composing and sending requests to a REST resource
//! API that exposes record types under `/api/resource/<Type>`.
//!
//! ## Features
//! - Session endpoint and token credentials
//! - Resource type picked from a catalog or typed freely
//! - HTTP methods: GET, POST, PUT, DELETE
//! - Header editing with automatic Authorization / Content-Type
//! - JSON body validation before anything is sent
//! - Latest-result display with JSON syntax highlighting
//! - Page history with form restoration on back navigation
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Network Layer (Tokio runtime)

pub mod constants;
pub mod models;
pub mod composer;
pub mod validator;
pub mod error;
pub mod executor;
pub mod result;
pub mod navigation;
pub mod storage;
pub mod ui;
pub mod messages;
pub mod app;
pub mod network;

// Re-export commonly used types
pub use models::{HttpMethod, RequestDraft, ResourceType, Session};
pub use error::{RequestError, TransportError, ValidationError};
pub use executor::{prepare, BusyFlag, ExchangeObserver, PreparedRequest, RequestExecutor};
pub use result::{ExecutionResult, ResultState};
pub use navigation::{NavigationHistory, Page};
pub use storage::{FileSettingsStore, Settings, SettingsStore};
pub use messages::{UiEvent, NetworkCommand, NetworkResponse, RenderState};
pub use app::{AppState, AppActor};
pub use network::{NetworkActor, ReqwestTransport, Transport};
