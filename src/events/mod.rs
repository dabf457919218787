//! # Events Module
//!
//! Optional progress notifications for whatever layer renders the index.
//!
//! The core never blocks on a listener: queries and commands stay plain
//! synchronous calls, and events are a side channel a UI may drain to
//! decide when to re-render.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//! let gallery = Gallery::new(config, backend).with_events(sender);
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Scan(ScanEvent::Completed { total_images, .. }) = event {
//!             println!("Indexed {} images", total_images);
//!         }
//!     }
//! });
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
