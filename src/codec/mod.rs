//! Compact Track Format (CTF): the single-file on-disk encoding for a
//! whole registry of tracks.
//!
//! A CTF image starts with a 16-byte signature built to expose the
//! usual transfer accidents:
//! - `crocket\n` (8 bytes) — LF, so LF/CRLF translation is caught
//! - the format version as a native-endian f32 (4 bytes) — an
//!   endianness probe
//! - `\r\n\0\x1a` (4 bytes) — CRLF translation, null stripping, and
//!   DOS end-of-file insertion
//!
//! After the signature: a LEB128 count of non-empty tracks, then per
//! track its length-prefixed ASCII name, a LEB128 key count, and the
//! keys as (LEB128 empty-rows-since-previous-key, native-endian f32
//! value, interpolation byte). Delta-coding the rows keeps typical
//! files small; the first key's delta is its absolute row.

mod error;
pub mod leb128;
mod reader;

pub use error::CodecError;
pub use reader::ByteReader;

use crate::track::{Interpolation, Keyframe, TrackRegistry};

const SIGNATURE_TEXT: &[u8; 8] = b"crocket\n";
const SIGNATURE_VERSION: f32 = 1.0;
const SIGNATURE_TRAILER: &[u8; 4] = b"\r\n\x00\x1a";
const SIGNATURE_LEN: usize = 16;

fn signature() -> [u8; SIGNATURE_LEN] {
    let mut sig = [0u8; SIGNATURE_LEN];
    sig[0..8].copy_from_slice(SIGNATURE_TEXT);
    sig[8..12].copy_from_slice(&SIGNATURE_VERSION.to_ne_bytes());
    sig[12..16].copy_from_slice(SIGNATURE_TRAILER);
    sig
}

/// Serialize every non-empty track into a fresh CTF image.
#[cfg(feature = "client")]
pub fn encode(registry: &TrackRegistry) -> Vec<u8> {
    // upper bound: every LEB128 at maximum width
    let mut capacity = SIGNATURE_LEN + leb128::MAX_LEN;
    for track in registry.iter() {
        capacity += track.name().len()
            + 2 * leb128::MAX_LEN
            + track.keys().len() * (leb128::MAX_LEN + 5);
    }
    let mut out = Vec::with_capacity(capacity);

    out.extend_from_slice(&signature());

    let track_count = registry.iter().filter(|t| !t.keys().is_empty()).count();
    leb128::write(&mut out, track_count as u32);

    for track in registry.iter() {
        if track.keys().is_empty() {
            continue;
        }
        leb128::write(&mut out, track.name().len() as u32);
        out.extend_from_slice(track.name().as_bytes());
        leb128::write(&mut out, track.keys().len() as u32);

        let mut reference: u32 = 0;
        for key in track.keys() {
            leb128::write(&mut out, key.row.wrapping_sub(reference));
            out.extend_from_slice(&key.value.to_ne_bytes());
            out.push(key.interpolation.to_byte());
            reference = key.row.wrapping_add(1);
        }
    }

    out
}

/// Load a CTF image into the registry, replacing the key data of every
/// track named in it. Tracks absent from the image keep their keys;
/// names in the image that are not registered are decoded and
/// discarded to keep the stream aligned.
///
/// A signature mismatch leaves every track untouched. The input is
/// expected to come from a trusted source; beyond bounds-checking, no
/// consistency validation is performed, and a truncated stream may
/// leave tracks that precede the truncation point already replaced.
pub fn decode(registry: &mut TrackRegistry, data: &[u8]) -> Result<(), CodecError> {
    let mut reader = ByteReader::new(data);

    if reader.read_bytes(SIGNATURE_LEN).map_err(|_| CodecError::BadSignature)? != signature() {
        return Err(CodecError::BadSignature);
    }

    let track_count = leb128::read(&mut reader)?;
    for _ in 0..track_count {
        let name_len = leb128::read(&mut reader)? as usize;
        let name = reader.read_bytes(name_len)?;
        let target = registry.index_of(name);

        let key_count = leb128::read(&mut reader)? as usize;
        let mut keys = match target {
            Some(_) => Vec::with_capacity(key_count),
            None => Vec::new(),
        };

        let mut reference: u32 = 0;
        for _ in 0..key_count {
            let delta = leb128::read(&mut reader)?;
            let value = reader.read_f32_ne()?;
            let interpolation = Interpolation::from_byte(reader.read_u8()?);
            if target.is_none() {
                continue;
            }
            let row = delta.wrapping_add(reference);
            reference = row.wrapping_add(1);
            keys.push(Keyframe::new(row, value, interpolation));
        }

        if let Some(index) = target {
            if let Some(track) = registry.track_mut(index) {
                track.replace_keys(keys);
            }
        }
    }

    Ok(())
}
