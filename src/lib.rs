//! Chat-style web UI for a hosted multimodal agent.
//!
//! A prompt and an optional image are collected from the browser, sent to the
//! agent runtime with the image inlined as base64, and the returned summary is
//! rendered back into the page.

pub mod agent;
pub mod chat;
pub mod config;
pub mod handlers;
pub mod routes;
pub mod runtime;
pub mod state;

pub use routes::create_app;
pub use state::AppState;
