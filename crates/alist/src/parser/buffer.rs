use alloc::vec::Vec;

use log::debug;

/// Unconsumed input plus the bookkeeping needed to report absolute offsets.
///
/// Bytes before `pos` are consumed. Indexes handed out by this type are
/// relative to the current allocation; [`offset`](Self::offset) maps them to
/// stream offsets.
#[derive(Debug, Default)]
pub(crate) struct InputBuffer {
    data: Vec<u8>,
    pos: usize,
    /// Bytes dropped from the front since the stream began.
    dropped: usize,
}

impl InputBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    #[inline]
    pub(crate) fn bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub(crate) fn get(&self, i: usize) -> Option<u8> {
        self.data.get(i).copied()
    }

    #[inline]
    pub(crate) fn slice(&self, start: usize, end: usize) -> &[u8] {
        &self.data[start..end]
    }

    #[inline]
    pub(crate) fn rest_from(&self, start: usize) -> &[u8] {
        self.data.get(start..).unwrap_or_default()
    }

    #[inline]
    pub(crate) fn advance_to(&mut self, pos: usize) {
        debug_assert!(pos >= self.pos && pos <= self.data.len());
        self.pos = pos;
    }

    /// Number of bytes not yet consumed.
    #[inline]
    pub(crate) fn unread(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Consume everything buffered.
    pub(crate) fn discard_rest(&mut self) {
        self.pos = self.data.len();
    }

    /// Stream offset of buffer index `i`.
    #[inline]
    pub(crate) fn offset(&self, i: usize) -> usize {
        self.dropped + i
    }

    /// Drop consumed bytes: always when nothing is left unread, otherwise
    /// once more than `threshold` bytes have been consumed.
    pub(crate) fn compact(&mut self, threshold: usize) {
        if self.pos == self.data.len() {
            self.dropped += self.pos;
            self.data.clear();
            self.pos = 0;
        } else if self.pos > threshold {
            debug!(
                "compacting input: dropping {} consumed bytes, keeping {}",
                self.pos,
                self.unread()
            );
            self.data.drain(..self.pos);
            self.dropped += self.pos;
            self.pos = 0;
        }
    }

    /// Discard everything, consumed or not.
    pub(crate) fn clear(&mut self) {
        self.discard_rest();
        self.compact(0);
    }
}
