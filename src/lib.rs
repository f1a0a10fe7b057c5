//! Host-side pieces of the tag-presence daemon: serial and GPIO bindings
//! for the engine's hardware traits, the polling thread, configuration,
//! and UID-to-content lookup.

pub mod config;
pub mod gpio;
pub mod lookup;
pub mod poller;
pub mod port;

pub use config::Config;
pub use gpio::GpioResetLine;
pub use lookup::{StaticLookup, TagContent, TagLookup};
pub use poller::PollerHandle;
pub use port::TtyLink;
