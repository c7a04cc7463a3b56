//! Binary locator format.
//!
//! ```text
//! +----------+------------+----------+------------------------------+
//! |   Src    | Min Offset |  Count   | Count x Progress             |
//! | (8 bytes)| (8 bytes)  | (8 bytes)| offset(8) from(4) to(4)      |
//! +----------+------------+----------+------------------------------+
//! | User Data Length (8 bytes) | User Data (N bytes)                |
//! +----------------------------+------------------------------------+
//! ```
//!
//! The user-data block is only written when user data is non-empty.
//! All integers are stored in little-endian format.
//!
//! Older writers produced two other shapes that must stay readable:
//! only `src + min_offset`, or `src + min_offset` followed by an opaque
//! blob. Both decode to a legacy locator with a single full-range entry.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tidemark_core::{SourceId, OFFSET_UNSET};
use tracing::debug;

use crate::error::{LocatorError, LocatorResult};
use crate::locator::{merge_progress, Locator};
use crate::progress::Progress;

/// Size of `src + min_offset`.
pub const LOCATOR_HEADER_SIZE: usize = 16;

/// Size of one encoded progress entry.
pub const PROGRESS_ENTRY_SIZE: usize = 16;

/// Size of a count or length prefix.
const LENGTH_PREFIX_SIZE: usize = 8;

impl Locator {
    /// Returns the encoded size of this locator in bytes.
    #[must_use]
    pub fn encoded_size(&self) -> usize {
        let mut size =
            LOCATOR_HEADER_SIZE + LENGTH_PREFIX_SIZE + self.progress.len() * PROGRESS_ENTRY_SIZE;
        if !self.user_data.is_empty() {
            size += LENGTH_PREFIX_SIZE + self.user_data.len();
        }
        size
    }

    /// Encodes the locator to bytes.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_size());
        self.encode_into(&mut buf);
        buf.freeze()
    }

    /// Appends the encoded locator to `buf`.
    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.put_u64_le(self.src.get());
        buf.put_i64_le(self.min_offset);
        buf.put_u64_le(self.progress.len() as u64);
        for entry in &self.progress {
            buf.put_i64_le(entry.offset);
            buf.put_u32_le(entry.from);
            buf.put_u32_le(entry.to);
        }
        if !self.user_data.is_empty() {
            buf.put_u64_le(self.user_data.len() as u64);
            buf.put_slice(&self.user_data);
        }
    }

    /// Decodes a locator, accepting the current and both legacy shapes.
    ///
    /// # Errors
    ///
    /// Returns `Truncated` if the buffer cannot hold `src + min_offset`.
    pub fn decode(data: &[u8]) -> LocatorResult<Self> {
        if data.len() < LOCATOR_HEADER_SIZE {
            return Err(LocatorError::Truncated {
                len: data.len() as u64,
                needed: LOCATOR_HEADER_SIZE as u64,
            });
        }

        let mut buf = data;
        let src = SourceId::new(buf.get_u64_le());
        let min_offset = buf.get_i64_le();

        let mut locator = Self::new(src);
        match EncodedShape::classify(buf, min_offset) {
            EncodedShape::Current {
                mut progress,
                user_data,
            } => {
                merge_progress(&mut progress);
                locator.min_offset = min_offset;
                locator.progress = progress;
                locator.user_data = user_data;
            }
            EncodedShape::Scalar => {
                locator.set_offset(min_offset);
                locator.is_legacy = true;
            }
            EncodedShape::LegacyBlob { user_data } => {
                debug!(
                    src = %src,
                    min_offset,
                    blob_len = user_data.len(),
                    "Decoded legacy locator blob"
                );
                locator.set_offset(min_offset);
                locator.user_data = user_data;
                locator.is_legacy = true;
            }
        }
        Ok(locator)
    }
}

/// The three layouts a persisted locator body can take.
#[derive(Debug)]
enum EncodedShape {
    /// Nothing after `src + min_offset`.
    Scalar,
    /// Well-formed progress block, optionally followed by a user-data block.
    Current {
        progress: Vec<Progress>,
        user_data: Bytes,
    },
    /// Anything else: the whole body is opaque legacy user data.
    LegacyBlob { user_data: Bytes },
}

impl EncodedShape {
    /// Tries the strict layout first, falling back to the legacy blob.
    fn classify(body: &[u8], min_offset: i64) -> Self {
        if body.is_empty() {
            return Self::Scalar;
        }
        match parse_current(body, min_offset) {
            Some((progress, user_data)) => Self::Current {
                progress,
                user_data,
            },
            None => Self::LegacyBlob {
                user_data: Bytes::copy_from_slice(body),
            },
        }
    }
}

/// Parses a progress block plus optional user-data block.
///
/// Returns `None` unless the whole body is consumed by well-formed blocks.
/// Every entry must lie in the hash universe, follow its predecessor without
/// overlap, and carry either an unset offset or one `>= min_offset`.
fn parse_current(mut buf: &[u8], min_offset: i64) -> Option<(Vec<Progress>, Bytes)> {
    if buf.remaining() < LENGTH_PREFIX_SIZE {
        return None;
    }
    let count = buf.get_u64_le();
    let needed = count.checked_mul(PROGRESS_ENTRY_SIZE as u64)?;
    if (buf.remaining() as u64) < needed {
        return None;
    }

    // Bounded by the remaining buffer length checked above.
    #[allow(clippy::cast_possible_truncation)]
    let mut progress: Vec<Progress> = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let offset = buf.get_i64_le();
        let from = buf.get_u32_le();
        let to = buf.get_u32_le();
        let entry = Progress { from, to, offset };

        if !entry.is_well_formed() || (offset != OFFSET_UNSET && offset < min_offset) {
            return None;
        }
        if progress.last().is_some_and(|last| last.to >= from) {
            return None;
        }
        progress.push(entry);
    }

    if !buf.has_remaining() {
        return Some((progress, Bytes::new()));
    }

    if buf.remaining() < LENGTH_PREFIX_SIZE {
        return None;
    }
    let user_data_len = buf.get_u64_le();
    if buf.remaining() as u64 != user_data_len {
        return None;
    }
    Some((progress, Bytes::copy_from_slice(buf)))
}
