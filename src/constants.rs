#[cfg(feature = "client")]
use std::time::Duration;

/// Default editor port on localhost, overridable via the
/// `CROCKET_SERVER` environment variable.
#[cfg(feature = "client")]
pub const DEFAULT_SERVER_PORT: u16 = 1338;

/// Send/receive timeout applied while connecting and handshaking.
/// Cleared once the initial track synchronization is complete.
#[cfg(feature = "client")]
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(20);

/// How long to wait for trailing key data after the last track request.
#[cfg(feature = "client")]
pub const SETTLE_TIMEOUT: Duration = Duration::from_millis(100);

/// Keyframe capacity reserved on a track's first insertion.
pub const INITIAL_KEY_CAPACITY: usize = 16;

/// Row nudge applied when converting an editor-ordered row back into
/// host time, so float truncation cannot slip back one segment.
#[cfg(feature = "client")]
pub const SEEK_ROW_NUDGE: f32 = 1.0 / 65536.0;
