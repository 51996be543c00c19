use std::ops::RangeInclusive;

use alloy::primitives::BlockNumber;

use crate::Error;

/// A block range split into consecutive chunks of `chunk_size` blocks.
///
/// Chunks are computed from their index, so partitions of huge ranges cost nothing to build and
/// can be visited in any order. The last chunk may be shorter than `chunk_size`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChunkPartition {
    from: BlockNumber,
    to: BlockNumber,
    chunk_size: u64,
    len: usize,
}

impl ChunkPartition {
    /// Partition `from..=to`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `chunk_size` is zero, if `from > to`, or if the
    /// number of chunks does not fit into `usize`.
    pub fn new(from: BlockNumber, to: BlockNumber, chunk_size: u64) -> Result<Self, Error> {
        if chunk_size == 0 {
            return Err(Error::invalid_argument("chunk_size=0 must be greater than 0"));
        }
        if from > to {
            return Err(Error::invalid_argument(format!(
                "from_block={from} is greater than to_block={to}"
            )));
        }
        let len = ((to - from) / chunk_size)
            .checked_add(1)
            .and_then(|len| usize::try_from(len).ok())
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "range {from}..={to} has too many chunks of size {chunk_size}"
                ))
            })?;

        Ok(Self { from, to, chunk_size, len })
    }

    /// Number of chunks. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// The chunk at `index`, or `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<RangeInclusive<BlockNumber>> {
        if index >= self.len {
            return None;
        }
        // index < len, so the offset is at most `to - from`
        let start = self.from + index as u64 * self.chunk_size;
        let end = start.saturating_add(self.chunk_size - 1).min(self.to);
        Some(start..=end)
    }

    /// Iterate the chunks from the lowest block upwards.
    #[must_use]
    pub fn iter(&self) -> Chunks {
        Chunks { partition: *self, next: 0 }
    }
}

impl IntoIterator for &ChunkPartition {
    type Item = RangeInclusive<BlockNumber>;
    type IntoIter = Chunks;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the chunks of a [`ChunkPartition`].
#[derive(Clone, Debug)]
pub struct Chunks {
    partition: ChunkPartition,
    next: usize,
}

impl Iterator for Chunks {
    type Item = RangeInclusive<BlockNumber>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = self.partition.get(self.next)?;
        self.next += 1;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.partition.len - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chunks {}
