//! Bounded-buffer device and status channels.
//!
//! devchan models a small driver module: a character-device node and a status
//! node, each exchanging bytes with a fixed 1 KiB buffer through a cursor the
//! caller owns.
//!
//! # Crate Structure
//!
//! - [`buffer`] — Fixed-capacity buffer and the bounded transfer protocol
//! - [`host`] — Host runtime boundary for node registration
//! - [`module`] — Device and status channels, counters, module lifecycle

/// Re-export buffer types.
pub mod buffer {
    pub use devchan_buffer::*;
}

/// Re-export host types.
pub mod host {
    pub use devchan_host::*;
}

/// Re-export module types.
pub mod module {
    pub use devchan_module::*;
}
