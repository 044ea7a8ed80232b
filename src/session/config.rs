use std::net::SocketAddr;
use std::path::PathBuf;

/// "Neutral" rows-per-minute value: host time is already measured in
/// rows, no seconds conversion takes place.
pub const TIME_IN_ROWS: f32 = 60.0;

/// Contains the configuration for a [`Session`](crate::Session).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// File to load track data from when no editor can be reached, and
    /// to save into when the editor requests it. With no path set, the
    /// host is expected to observe the SAVE event and persist the
    /// [serialized](crate::Session::serialize) image by its own means.
    pub save_path: Option<PathBuf>,
    /// A pre-recorded track data image; takes precedence over
    /// `save_path` for loading.
    pub track_data: Option<Vec<u8>>,
    /// Playback speed in rows per minute (beats per minute × rows per
    /// beat), used to convert host seconds into tracker rows. Use
    /// [`TIME_IN_ROWS`] to drive the session with row timestamps
    /// directly.
    pub rows_per_minute: f32,
    /// Editor endpoint override. When unset, the `CROCKET_SERVER`
    /// environment variable is consulted, then `127.0.0.1:1338`.
    /// Ignored by player-only builds.
    pub server: Option<SocketAddr>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            save_path: None,
            track_data: None,
            rows_per_minute: TIME_IN_ROWS,
            server: None,
        }
    }
}
