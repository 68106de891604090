//! Terminal front end: wires stdin, the engine and the screen to the core
//! state machine.
mod app;
mod config;
mod effects;
mod input;
mod ui;

pub use app::run_app;
