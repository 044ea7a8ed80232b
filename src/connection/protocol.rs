//! Wire protocol spoken with the editor.
//!
//! Commands are byte-tagged; every multi-byte integer travels
//! big-endian, and float payloads are the IEEE-754 bit pattern carried
//! through the same byte-order conversion as a `u32`.

use super::{Transport, TransportError};

pub const CLIENT_GREETING: &[u8; 19] = b"hello, synctracker!";
pub const SERVER_GREETING: &[u8; 12] = b"hello, demo!";

const TAG_SET_KEY: u8 = 0;
const TAG_DELETE_KEY: u8 = 1;
const TAG_GET_TRACK: u8 = 2;
const TAG_SET_ROW: u8 = 3;
const TAG_PAUSE: u8 = 4;
const TAG_SAVE_TRACKS: u8 = 5;
const TAG_ACTION: u8 = 6;

/// One parsed server-to-client command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServerCommand {
    SetKey {
        track: u32,
        row: u32,
        value: f32,
        interpolation: u8,
    },
    DeleteKey {
        track: u32,
        row: u32,
    },
    SetRow {
        row: u32,
    },
    Pause {
        paused: bool,
    },
    SaveTracks,
    Action {
        id: u32,
    },
    /// A tag this revision does not know. Its payload length is
    /// unknown too, so nothing further can be read this turn.
    Unknown {
        tag: u8,
    },
}

/// Read exactly one command off the socket. The caller has already
/// established that a byte is pending.
pub fn read_command(transport: &mut Transport) -> Result<ServerCommand, TransportError> {
    let tag = recv_u8(transport)?;
    match tag {
        TAG_SET_KEY => {
            let track = recv_u32(transport)?;
            let row = recv_u32(transport)?;
            let value = f32::from_bits(recv_u32(transport)?);
            let interpolation = recv_u8(transport)?;
            Ok(ServerCommand::SetKey {
                track,
                row,
                value,
                interpolation,
            })
        }
        TAG_DELETE_KEY => {
            let track = recv_u32(transport)?;
            let row = recv_u32(transport)?;
            Ok(ServerCommand::DeleteKey { track, row })
        }
        TAG_SET_ROW => {
            let row = recv_u32(transport)?;
            Ok(ServerCommand::SetRow { row })
        }
        TAG_PAUSE => {
            let flag = recv_u8(transport)?;
            Ok(ServerCommand::Pause { paused: flag != 0 })
        }
        TAG_SAVE_TRACKS => Ok(ServerCommand::SaveTracks),
        TAG_ACTION => {
            let id = recv_u32(transport)?;
            Ok(ServerCommand::Action { id })
        }
        tag => Ok(ServerCommand::Unknown { tag }),
    }
}

/// Exchange greetings on a fresh connection. Any mismatch is fatal.
pub fn exchange_greetings(transport: &mut Transport) -> Result<(), TransportError> {
    transport.send_all(CLIENT_GREETING)?;
    let mut reply = [0u8; SERVER_GREETING.len()];
    transport.recv_exact(&mut reply)?;
    if &reply != SERVER_GREETING {
        return Err(TransportError::BadGreeting);
    }
    Ok(())
}

/// Request a track's key data by name (GET_TRACK).
pub fn send_get_track(transport: &mut Transport, name: &str) -> Result<(), TransportError> {
    let mut frame = Vec::with_capacity(5 + name.len());
    frame.push(TAG_GET_TRACK);
    frame.extend_from_slice(&(name.len() as u32).to_be_bytes());
    frame.extend_from_slice(name.as_bytes());
    transport.send_all(&frame)
}

/// Report the client's playback row (SET_ROW).
pub fn send_set_row(transport: &mut Transport, row: u32) -> Result<(), TransportError> {
    let mut frame = [0u8; 5];
    frame[0] = TAG_SET_ROW;
    frame[1..5].copy_from_slice(&row.to_be_bytes());
    transport.send_all(&frame)
}

fn recv_u8(transport: &mut Transport) -> Result<u8, TransportError> {
    let mut buf = [0u8; 1];
    transport.recv_exact(&mut buf)?;
    Ok(buf[0])
}

fn recv_u32(transport: &mut Transport) -> Result<u32, TransportError> {
    let mut buf = [0u8; 4];
    transport.recv_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};

    use super::*;
    use crate::connection::Transport;

    fn wired_pair() -> (Transport, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let mut transport = Transport::connect(&addr).unwrap();
        transport.clear_timeouts().unwrap();
        let (server, _) = listener.accept().unwrap();
        (transport, server)
    }

    #[test]
    fn set_key_payload_is_big_endian() {
        let (mut transport, mut server) = wired_pair();

        let mut frame = vec![0u8]; // SET_KEY
        frame.extend_from_slice(&3u32.to_be_bytes());
        frame.extend_from_slice(&160u32.to_be_bytes());
        frame.extend_from_slice(&2.5f32.to_bits().to_be_bytes());
        frame.push(2);
        server.write_all(&frame).unwrap();

        let command = read_command(&mut transport).unwrap();
        assert_eq!(
            command,
            ServerCommand::SetKey {
                track: 3,
                row: 160,
                value: 2.5,
                interpolation: 2,
            }
        );
    }

    #[test]
    fn pause_save_and_action_parse() {
        let (mut transport, mut server) = wired_pair();

        server.write_all(&[4, 1]).unwrap();
        server.write_all(&[4, 0]).unwrap();
        server.write_all(&[5]).unwrap();
        let mut action = vec![6u8];
        action.extend_from_slice(&7u32.to_be_bytes());
        server.write_all(&action).unwrap();

        assert_eq!(
            read_command(&mut transport).unwrap(),
            ServerCommand::Pause { paused: true }
        );
        assert_eq!(
            read_command(&mut transport).unwrap(),
            ServerCommand::Pause { paused: false }
        );
        assert_eq!(read_command(&mut transport).unwrap(), ServerCommand::SaveTracks);
        assert_eq!(
            read_command(&mut transport).unwrap(),
            ServerCommand::Action { id: 7 }
        );
    }

    #[test]
    fn unknown_tags_consume_only_the_tag_byte() {
        let (mut transport, mut server) = wired_pair();
        server.write_all(&[200, 1, 2, 3]).unwrap();

        assert_eq!(
            read_command(&mut transport).unwrap(),
            ServerCommand::Unknown { tag: 200 }
        );
    }

    #[test]
    fn get_track_frame_layout() {
        let (mut transport, mut server) = wired_pair();
        send_get_track(&mut transport, "cam:fov").unwrap();

        let mut frame = [0u8; 12];
        server.read_exact(&mut frame).unwrap();
        assert_eq!(frame[0], 2);
        assert_eq!(u32::from_be_bytes([frame[1], frame[2], frame[3], frame[4]]), 7);
        assert_eq!(&frame[5..], b"cam:fov");
    }

    #[test]
    fn set_row_frame_layout() {
        let (mut transport, mut server) = wired_pair();
        send_set_row(&mut transport, 513).unwrap();

        let mut frame = [0u8; 5];
        server.read_exact(&mut frame).unwrap();
        assert_eq!(frame[0], 3);
        assert_eq!(u32::from_be_bytes([frame[1], frame[2], frame[3], frame[4]]), 513);
    }

    #[test]
    fn greeting_mismatch_is_fatal() {
        let (mut transport, mut server) = wired_pair();
        let handle = std::thread::spawn(move || {
            let mut greeting = [0u8; CLIENT_GREETING.len()];
            server.read_exact(&mut greeting).unwrap();
            assert_eq!(&greeting, CLIENT_GREETING);
            server.write_all(b"hello, w0rld!").unwrap();
            server
        });

        assert!(matches!(
            exchange_greetings(&mut transport),
            Err(TransportError::BadGreeting)
        ));
        handle.join().unwrap();
    }
}
