//! # Crocket
//! Sync-tracker client for demo & animation runtimes.
//!
//! A set of named floating-point sync variables is driven by keyframe
//! tracks. In client mode the tracks are slaved to a live editor over a
//! TCP connection; in player mode they are loaded from a compact track
//! file (CTF) and played back standalone. The host calls
//! [`Session::update`] once per frame with the current time; the library
//! drains pending editor messages, reconciles playback position, samples
//! every track, and reports state & one-shot events through a bitmask.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

pub mod codec;
mod constants;
mod session;
mod state;
mod track;

cfg_if! {
    if #[cfg(feature = "client")] {
        mod connection;
        pub use connection::{AddrError, TransportError};
    }
}

pub use session::{Mode, Session, SessionConfig, TIME_IN_ROWS};
pub use state::SyncState;
pub use track::{
    Interpolation, Keyframe, RegistryError, Track, TrackHandle, TrackRegistry,
};
