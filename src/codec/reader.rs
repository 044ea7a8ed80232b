use super::CodecError;

/// Bounds-checked cursor over an in-memory CTF image.
pub struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], CodecError> {
        let remaining = self.data.len() - self.position;
        if remaining < count {
            return Err(CodecError::UnexpectedEnd {
                offset: self.position,
                needed: count - remaining,
            });
        }
        let bytes = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a native-endian single-precision float, as CTF stores them.
    pub fn read_f32_ne(&mut self) -> Result<f32, CodecError> {
        let bytes = self.read_bytes(4)?;
        Ok(f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}
