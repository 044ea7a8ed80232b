use super::{Interpolation, RegistryError, Track};

/// Opaque handle to a registered track.
///
/// Handles are issued by [`TrackRegistry::try_register`] in
/// registration order; the same ordering is what the editor addresses
/// tracks by on the wire, so a handle stays valid for the life of the
/// registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackHandle(pub(crate) usize);

/// The ordered set of tracks the host declared at startup.
///
/// The registry is static after a [`Session`](crate::Session) is built
/// from it: tracks are never added or removed, only their keyframes
/// change. Registration order is authoritative for the track-index
/// mapping used by every editor command.
pub struct TrackRegistry {
    tracks: Vec<Track>,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    /// Register a named track and receive the handle its sampled value
    /// will be read through.
    pub fn try_register(&mut self, name: &str) -> Result<TrackHandle, RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.tracks.iter().any(|track| track.name() == name) {
            return Err(RegistryError::DuplicateName {
                name: name.to_string(),
            });
        }
        self.tracks.push(Track::new(name.to_string()));
        Ok(TrackHandle(self.tracks.len() - 1))
    }

    /// Register a named track.
    ///
    /// # Panics
    ///
    /// Panics if the name is empty or already registered. For a
    /// non-panicking version, use [`try_register`](Self::try_register).
    pub fn register(&mut self, name: &str) -> TrackHandle {
        self.try_register(name)
            .expect("duplicate or empty track names are not allowed in a TrackRegistry")
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track(&self, handle: TrackHandle) -> Option<&Track> {
        self.tracks.get(handle.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Set or overwrite a keyframe on the track at `track_index`.
    /// Out-of-range indices are ignored, as are unknown indices in
    /// editor commands.
    pub fn set_key(
        &mut self,
        track_index: usize,
        row: u32,
        value: f32,
        interpolation: Interpolation,
    ) {
        if let Some(track) = self.tracks.get_mut(track_index) {
            track.set_key(row, value, interpolation);
        }
    }

    /// Delete the keyframe at exactly `row` on the track at
    /// `track_index`. Unknown indices and missing rows are ignored.
    pub fn delete_key(&mut self, track_index: usize, row: u32) {
        if let Some(track) = self.tracks.get_mut(track_index) {
            track.delete_key(row);
        }
    }

    pub(crate) fn index_of(&self, name: &[u8]) -> Option<usize> {
        self.tracks
            .iter()
            .position(|track| track.name().as_bytes() == name)
    }

    pub(crate) fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    pub(crate) fn tracks_mut(&mut self) -> impl Iterator<Item = &mut Track> {
        self.tracks.iter_mut()
    }
}

impl Default for TrackRegistry {
    fn default() -> Self {
        Self::new()
    }
}
