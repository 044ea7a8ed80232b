use std::fs;
use std::path::Path;

use log::warn;

use crate::codec;
use crate::state::SyncState;
use crate::track::{Track, TrackHandle, TrackRegistry};

use super::SessionConfig;

cfg_if! {
    if #[cfg(feature = "client")] {
        use std::net::SocketAddr;
        use std::path::PathBuf;
        use std::time::{Duration, Instant};

        use log::{debug, info};

        use crate::connection::protocol::{self, ServerCommand};
        use crate::connection::{resolve_server_addr, Readiness, Transport, TransportError};
        use crate::constants::{SEEK_ROW_NUDGE, SETTLE_TIMEOUT};
        use crate::track::Interpolation;
    }
}

/// Operating mode of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Standalone playback from pre-recorded track data.
    Player,
    /// Slaved to a live editor over TCP.
    Client,
}

/// A sync-tracker session: the registry of tracks, the playback state,
/// and (in client mode) the editor connection.
///
/// Build one with [`Session::new`] and call [`update`](Session::update)
/// every frame. Dropping the session closes the editor connection and
/// releases all track storage.
pub struct Session {
    registry: TrackRegistry,
    state: SyncState,
    timescale: f32,
    #[cfg(feature = "client")]
    mode: Mode,
    #[cfg(feature = "client")]
    editor_row: i64,
    #[cfg(feature = "client")]
    save_path: Option<PathBuf>,
    #[cfg(feature = "client")]
    server_addr: Option<SocketAddr>,
    #[cfg(feature = "client")]
    transport: Option<Transport>,
}

impl Session {
    /// The track registry, for read access to names and keyframes.
    pub fn tracks(&self) -> &TrackRegistry {
        &self.registry
    }

    /// The value the sampling pass last wrote for this track.
    pub fn value(&self, handle: TrackHandle) -> f32 {
        self.registry.track(handle).map_or(0.0, Track::value)
    }

    /// Sample a track at an arbitrary time, without side effects.
    pub fn get_value(&self, handle: TrackHandle, time: f32) -> f32 {
        self.registry
            .track(handle)
            .map_or(0.0, |track| track.sample(time * self.timescale))
    }

    /// Advance the session by one frame.
    ///
    /// Drains pending editor messages, reconciles `time` against the
    /// editor's playback position (rewriting `time` when the editor
    /// ordered a seek), samples every track, and returns the state &
    /// event bitmask. Event bits are delivered exactly once.
    pub fn update(&mut self, time: &mut f32) -> SyncState {
        let mut row = *time * self.timescale;
        if row < 0.0 {
            row = 0.0;
        }

        #[cfg(feature = "client")]
        {
            self.reconnect();
            self.drain_messages(None);

            if self.state.contains(SyncState::SEEK) {
                // editor time wins; nudge the row so float truncation
                // cannot land in the previous segment
                row = if self.editor_row != 0 {
                    self.editor_row as f32 + SEEK_ROW_NUDGE
                } else {
                    0.0
                };
                *time = row / self.timescale;
            } else {
                // report our own position whenever a new row starts
                let new_row = row as i64;
                if new_row != self.editor_row {
                    self.send_row(new_row);
                    self.editor_row = new_row;
                }
            }

            if self.state.contains(SyncState::SAVE) {
                self.save_to_file();
            }
        }

        for track in self.registry.tracks_mut() {
            let value = track.sample(row);
            track.set_value(value);
        }

        let result = self.state;
        self.state &= SyncState::PERSISTENT;
        result
    }

    fn load_initial_data(&mut self, explicit: Option<Vec<u8>>, save_path: Option<&Path>) {
        let data = match explicit {
            Some(data) => Some(data),
            None => save_path.and_then(|path| fs::read(path).ok()),
        };
        let Some(data) = data else {
            return;
        };
        if let Err(err) = codec::decode(&mut self.registry, &data) {
            warn!("ignoring track data: {err}");
        }
    }
}

cfg_if! {
    if #[cfg(feature = "client")] {
        impl Session {
            /// Initialize a session over the given track registry.
            ///
            /// One connection attempt is made; if no editor answers,
            /// the session falls back to player mode and loads track
            /// data from `config.track_data` or `config.save_path`.
            /// While the session remains in client mode, every
            /// subsequent update retries the connection.
            pub fn new(registry: TrackRegistry, config: SessionConfig) -> Self {
                let server_addr = match config.server {
                    Some(addr) => Some(addr),
                    None => match resolve_server_addr() {
                        Ok(addr) => Some(addr),
                        Err(err) => {
                            warn!("{err}; forcing player mode");
                            None
                        }
                    },
                };

                let mut session = Self {
                    registry,
                    state: SyncState::EMPTY,
                    timescale: config.rows_per_minute / 60.0,
                    // an unresolvable endpoint means client mode can
                    // never work; start out as a player
                    mode: if server_addr.is_some() { Mode::Client } else { Mode::Player },
                    editor_row: -1,
                    save_path: config.save_path,
                    server_addr,
                    transport: None,
                };

                session.reconnect();
                if !session.state.contains(SyncState::CONNECTED) {
                    session.set_mode(Mode::Player);
                    let save_path = session.save_path.clone();
                    session.load_initial_data(config.track_data, save_path.as_deref());
                }
                session
            }

            /// Current operating mode.
            pub fn mode(&self) -> Mode {
                self.mode
            }

            /// Switch between client and player mode at runtime.
            ///
            /// Switching to player mode closes the editor connection
            /// and resumes playback (so a host leaving a paused editor
            /// session keeps running); switching to client mode arms a
            /// reconnection attempt on the next update.
            pub fn set_mode(&mut self, mode: Mode) {
                if mode == self.mode {
                    return;
                }
                self.mode = mode;
                if mode == Mode::Player {
                    self.disconnect();
                    self.state |= SyncState::PLAYING | SyncState::PLAY;
                }
            }

            /// Produce a freshly allocated CTF image of the current
            /// track data.
            pub fn serialize(&self) -> Vec<u8> {
                codec::encode(&self.registry)
            }

            /// Establish a fresh editor connection, if one is due.
            ///
            /// A no-op while connected or in player mode; otherwise one
            /// full connect-and-handshake attempt.
            fn reconnect(&mut self) {
                if self.mode == Mode::Player || self.state.contains(SyncState::CONNECTED) {
                    return;
                }
                self.disconnect();

                let Some(addr) = self.server_addr else {
                    return;
                };
                let mut transport = match Transport::connect(&addr) {
                    Ok(transport) => transport,
                    Err(err) => {
                        debug!("sync editor not reachable at {addr}: {err}");
                        return;
                    }
                };
                if let Err(err) = protocol::exchange_greetings(&mut transport) {
                    warn!("sync handshake failed: {err}");
                    return;
                }
                self.transport = Some(transport);

                // hand the server the full track list, clearing local
                // keys so the editor's answer is authoritative; drain
                // between requests so replies apply as they arrive
                for index in 0..self.registry.len() {
                    let name = match self.registry.track_mut(index) {
                        Some(track) => {
                            track.clear_keys();
                            track.name().to_string()
                        }
                        None => break,
                    };
                    let sent = match self.transport.as_mut() {
                        Some(transport) => protocol::send_get_track(transport, &name),
                        None => return,
                    };
                    if let Err(err) = sent {
                        warn!("sync connection lost during track sync: {err}");
                        self.disconnect();
                        return;
                    }
                    if !self.drain_messages(None) {
                        return;
                    }
                }

                // give the server a moment to finish its initial dump
                if !self.drain_messages(Some(SETTLE_TIMEOUT)) {
                    return;
                }

                // handshake traffic is done; later reads are gated by
                // readiness polls and may block freely
                if let Some(transport) = self.transport.as_mut() {
                    if let Err(err) = transport.clear_timeouts() {
                        warn!("sync connection lost: {err}");
                        self.disconnect();
                        return;
                    }
                }

                self.state |= SyncState::CONNECTED | SyncState::CONNECT;
                info!("connected to sync editor at {addr}");
            }

            /// Handle every pending server message.
            ///
            /// With no settle timeout this never blocks: it polls,
            /// handles one message, and repeats until the socket is
            /// idle. Returns `false` if the connection died.
            fn drain_messages(&mut self, settle: Option<Duration>) -> bool {
                let deadline = settle.map(|timeout| Instant::now() + timeout);
                loop {
                    let wait = deadline
                        .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                        .unwrap_or(Duration::ZERO);

                    let step: Result<Option<ServerCommand>, TransportError> = {
                        let Some(transport) = self.transport.as_mut() else {
                            return false;
                        };
                        match transport.poll_readable(wait) {
                            Ok(Readiness::Empty) => Ok(None),
                            Ok(Readiness::Ready) => protocol::read_command(transport).map(Some),
                            Err(err) => Err(err),
                        }
                    };

                    match step {
                        Ok(None) => return true,
                        Ok(Some(command)) => {
                            if !self.apply_command(command) {
                                return true;
                            }
                        }
                        Err(err) => {
                            warn!("sync connection lost: {err}");
                            self.disconnect();
                            return false;
                        }
                    }
                }
            }

            /// Apply one server command. Returns `false` when the
            /// drain turn must end (unknown tag: its payload length is
            /// unknown, so nothing further can be parsed safely).
            fn apply_command(&mut self, command: ServerCommand) -> bool {
                match command {
                    ServerCommand::SetKey {
                        track,
                        row,
                        value,
                        interpolation,
                    } => {
                        self.registry.set_key(
                            track as usize,
                            row,
                            value,
                            Interpolation::from_byte(interpolation),
                        );
                    }
                    ServerCommand::DeleteKey { track, row } => {
                        self.registry.delete_key(track as usize, row);
                    }
                    ServerCommand::SetRow { row } => {
                        self.editor_row = i64::from(row);
                        self.state |= SyncState::SEEK;
                    }
                    ServerCommand::Pause { paused: true } => {
                        self.state = (self.state | SyncState::STOP)
                            & !(SyncState::PLAY | SyncState::PLAYING);
                    }
                    ServerCommand::Pause { paused: false } => {
                        self.state = (self.state | SyncState::PLAY | SyncState::PLAYING)
                            & !SyncState::STOP;
                    }
                    ServerCommand::SaveTracks => {
                        self.state |= SyncState::SAVE;
                    }
                    ServerCommand::Action { id } => {
                        self.state |= SyncState::action(id);
                    }
                    ServerCommand::Unknown { tag } => {
                        warn!("ignoring unknown sync command tag {tag}");
                        return false;
                    }
                }
                true
            }

            fn send_row(&mut self, row: i64) {
                let Some(transport) = self.transport.as_mut() else {
                    return;
                };
                if let Err(err) = protocol::send_set_row(transport, row as u32) {
                    warn!("sync connection lost while reporting row: {err}");
                    self.disconnect();
                }
            }

            fn save_to_file(&self) {
                let Some(path) = self.save_path.as_deref() else {
                    return;
                };
                let image = codec::encode(&self.registry);
                if let Err(err) = fs::write(path, image) {
                    warn!("failed to write track data to {}: {err}", path.display());
                }
            }

            /// Drop the socket; fires the DISCONNECT event if a live
            /// connection was lost. The session stays in client mode,
            /// so the next update will try again.
            fn disconnect(&mut self) {
                self.transport = None;
                if self.state.contains(SyncState::CONNECTED) {
                    self.state |= SyncState::DISCONNECT;
                }
                self.state &= !SyncState::CONNECTED;
            }
        }
    } else {
        impl Session {
            /// Initialize a player-only session over the given track
            /// registry, loading track data from `config.track_data`
            /// or `config.save_path`.
            pub fn new(registry: TrackRegistry, config: SessionConfig) -> Self {
                let mut session = Self {
                    registry,
                    state: SyncState::PLAYING | SyncState::PLAY,
                    timescale: config.rows_per_minute / 60.0,
                };
                session.load_initial_data(config.track_data, config.save_path.as_deref());
                session
            }

            /// Current operating mode; player-only builds never leave
            /// [`Mode::Player`].
            pub fn mode(&self) -> Mode {
                Mode::Player
            }

            /// Inert in player-only builds.
            pub fn set_mode(&mut self, mode: Mode) {
                let _ = mode;
            }

            /// Player-only builds carry no encoder; always empty.
            pub fn serialize(&self) -> Vec<u8> {
                Vec::new()
            }
        }
    }
}
