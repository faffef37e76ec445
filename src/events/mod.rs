//! # Events Module
//!
//! Event-driven architecture for UI-agnostic progress reporting.
//!
//! ## Design
//! The core library emits events through channels, allowing any UI
//! (CLI, GUI, web) to subscribe and display progress.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! // In a separate thread, listen for events
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Index(IndexEvent::Progress(p)) => {
//!                 println!("Indexed {}/{}", p.completed, p.total)
//!             }
//!             Event::Row(RowEvent::Resolved { filename, .. }) => {
//!                 println!("Matched {}", filename)
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//!
//! // Run the pipeline with the sender
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
