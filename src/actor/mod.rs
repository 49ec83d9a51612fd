//! Actor System for Watch Mode
//!
//! Message-passing concurrency between the watcher, the rebuild pipeline
//! and the browser connections:
//!
//! ```text
//! FsActor --> BuildActor --> WsActor
//! (watch)   (native+bundle)  (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `build` - Rebuild scheduling and execution
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod build;
pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod ws;

pub use coordinator::Coordinator;
