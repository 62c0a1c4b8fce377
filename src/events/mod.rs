//! # Events Module
//!
//! Event-driven progress reporting for the sweep pipeline.
//!
//! ## Design
//! The core engine emits events through channels, allowing any surface
//! (CLI today, a service wrapper tomorrow) to subscribe and display
//! progress without the engine knowing about it.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Scan(ScanEvent::Completed { total_files }) => {
//!                 println!("Found {} candidates", total_files)
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
