//! Fixed-width little-endian account/instruction codec.
//!
//! The escrow programs lay their state and instruction payloads out as flat
//! sequences of u8 flags, little-endian u64 amounts, and 32-byte keys.
//! [`ByteReader`] walks such a buffer with bounds checking; [`ByteWriter`]
//! builds one. All multi-byte integers are little-endian.

use solana_sdk::pubkey::Pubkey;

use crate::error::McSwapError;

/// Bounds-checked cursor over raw account data.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], McSwapError> {
        let end = self.pos.checked_add(len).ok_or_else(|| {
            McSwapError::state(format!("offset overflow at {}", self.pos))
        })?;
        if end > self.data.len() {
            return Err(McSwapError::state(format!(
                "account data truncated: need {} bytes at offset {}, have {}",
                len,
                self.pos,
                self.data.len() - self.pos
            )));
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, McSwapError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, McSwapError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u64(&mut self) -> Result<u64, McSwapError> {
        let bytes: [u8; 8] = self.take(8)?.try_into().expect("length checked");
        Ok(u64::from_le_bytes(bytes))
    }

    pub fn read_pubkey(&mut self) -> Result<Pubkey, McSwapError> {
        let bytes: [u8; 32] = self.take(32)?.try_into().expect("length checked");
        Ok(Pubkey::new_from_array(bytes))
    }

    pub fn read_bytes32(&mut self) -> Result<[u8; 32], McSwapError> {
        Ok(self.take(32)?.try_into().expect("length checked"))
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }
}

/// Builder for discriminator-prefixed instruction payloads.
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn put_bool(&mut self, value: bool) -> &mut Self {
        self.put_u8(value as u8)
    }

    pub fn put_u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn put_pubkey(&mut self, value: &Pubkey) -> &mut Self {
        self.buf.extend_from_slice(value.as_ref());
        self
    }

    pub fn put_bytes32(&mut self, value: &[u8; 32]) -> &mut Self {
        self.buf.extend_from_slice(value);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
