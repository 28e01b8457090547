//! Core chatkit library (transport, session state machine, markdown sanitizer).

pub mod backend;
pub mod charts;
pub mod config;
pub mod markdown;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod widget;
