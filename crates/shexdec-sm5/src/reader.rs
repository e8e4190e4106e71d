use crate::error::{DecodeError, DecodeErrorKind};

const TOKEN_BYTES: usize = 4;

/// Sequential little-endian token reader over a fixed byte buffer.
///
/// Positions are byte offsets into the buffer the reader was created with.
/// Readers split off with [`TokenReader::split_tokens`] keep reporting token
/// positions relative to the original buffer, so errors raised inside an
/// instruction still point at absolute token offsets.
#[derive(Debug, Clone)]
pub struct TokenReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    origin: usize,
}

impl<'a> TokenReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            origin: 0,
        }
    }

    /// Current byte position within this reader's buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Absolute token index of the next token to be read.
    pub fn token_position(&self) -> usize {
        (self.origin + self.pos) / TOKEN_BYTES
    }

    /// Moves to `offset` bytes from the start of this reader's buffer.
    pub fn seek(&mut self, offset: usize) -> Result<(), DecodeError> {
        if offset > self.bytes.len() {
            return Err(self.truncated(offset - self.pos.min(offset)));
        }
        self.pos = offset;
        Ok(())
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn peek_token(&self) -> Result<u32, DecodeError> {
        self.bytes
            .get(self.pos..self.pos + TOKEN_BYTES)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .ok_or_else(|| self.truncated(TOKEN_BYTES))
    }

    pub fn read_token(&mut self) -> Result<u32, DecodeError> {
        let token = self.peek_token()?;
        self.pos += TOKEN_BYTES;
        Ok(token)
    }

    /// Reads `count` consecutive tokens, failing before allocating if they are not all present.
    pub fn read_tokens(&mut self, count: usize) -> Result<Vec<u32>, DecodeError> {
        let bytes = self.take_bytes(count)?;
        Ok(bytes
            .chunks_exact(TOKEN_BYTES)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }

    /// Splits the next `count` tokens off into their own reader and skips past them.
    pub fn split_tokens(&mut self, count: usize) -> Result<TokenReader<'a>, DecodeError> {
        let origin = self.origin + self.pos;
        let bytes = self.take_bytes(count)?;
        Ok(TokenReader {
            bytes,
            pos: 0,
            origin,
        })
    }

    fn take_bytes(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        let len = count
            .checked_mul(TOKEN_BYTES)
            .filter(|&len| len <= self.remaining())
            .ok_or_else(|| self.truncated(count.saturating_mul(TOKEN_BYTES)))?;
        let bytes = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn truncated(&self, needed: usize) -> DecodeError {
        DecodeError::new(
            self.token_position(),
            DecodeErrorKind::TruncatedInput {
                needed,
                available: self.remaining(),
            },
        )
    }
}
