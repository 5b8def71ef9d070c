//! BlockImage - the in-memory contents of one disk block.
//!
//! A [`BlockImage`] is a fixed-capacity byte array with typed accessors.
//! Every accessor takes an explicit byte offset; the image keeps no cursor.
//!
//! # Field Encodings
//! ```text
//! int    : 4 bytes, big-endian two's complement
//! bytes  : 4-byte big-endian length, then the raw bytes
//! text   : big-endian UTF-16 code units, then a 2-byte NUL terminator
//! ```
//!
//! Fixed widths and a fixed byte order keep persisted blocks portable.

use crate::common::config::{CHAR_SIZE, INT_SIZE};
use crate::common::{Error, Result};

/// The contents of a single block held in memory.
///
/// Writes are bounds-checked up front: a write that does not fit returns
/// [`Error::BlockOverflow`] and leaves the image untouched.
///
/// # Clone Implementation
/// Like a page, `BlockImage` does not implement `Clone` outside tests.
/// Copying a block should be explicit.
///
/// # Example
/// ```
/// use blockpool::BlockImage;
///
/// let mut image = BlockImage::new(400);
/// image.write_int(396, 12).unwrap();
/// assert_eq!(image.read_int(396).unwrap(), 12);
///
/// // 398 + 4 > 400
/// assert!(image.write_int(398, 12).is_err());
/// ```
pub struct BlockImage {
    data: Box<[u8]>,
}

impl BlockImage {
    /// Create a new zeroed image of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
        }
    }

    /// Size of the image in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Raw contents, for block stores.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Raw mutable contents, for block stores.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Zero out the entire image.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Bytes a writer must reserve for a string of `char_count` characters.
    ///
    /// A character is one UTF-16 code unit; the extra two bytes hold the
    /// terminator.
    #[inline]
    pub const fn max_length(char_count: usize) -> usize {
        char_count * CHAR_SIZE + CHAR_SIZE
    }

    // ========================================================================
    // Integers
    // ========================================================================

    pub fn read_int(&self, offset: usize) -> Result<i32> {
        Ok(i32::from_be_bytes(self.array_at(offset)?))
    }

    pub fn write_int(&mut self, offset: usize, value: i32) -> Result<()> {
        self.check_fits(offset, INT_SIZE)?;
        self.data[offset..offset + INT_SIZE].copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    // ========================================================================
    // Length-prefixed byte arrays
    // ========================================================================

    /// Read a byte array whose length prefix starts at `offset`.
    ///
    /// # Errors
    /// `Error::OffsetOutOfRange` if the prefix or the bytes it announces lie
    /// outside the image (including a negative decoded length).
    pub fn read_bytes(&self, offset: usize) -> Result<Vec<u8>> {
        let len = self.read_int(offset)?;
        let len = usize::try_from(len).map_err(|_| self.out_of_range(offset))?;
        Ok(self.slice_at(offset + INT_SIZE, len)?.to_vec())
    }

    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let needed = INT_SIZE.saturating_add(bytes.len());
        self.check_fits(offset, needed)?;
        let len = i32::try_from(bytes.len()).map_err(|_| self.overflow(offset, needed))?;

        let start = offset + INT_SIZE;
        self.data[offset..start].copy_from_slice(&len.to_be_bytes());
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    // ========================================================================
    // NUL-terminated text
    // ========================================================================

    /// Read text starting at `offset`.
    ///
    /// Decoding stops at the terminator or at the end of the image, whichever
    /// comes first. Unpaired surrogates decode to U+FFFD.
    pub fn read_text(&self, offset: usize) -> Result<String> {
        if offset >= self.capacity() {
            return Err(self.out_of_range(offset));
        }

        let units: Vec<u16> = self.data[offset..]
            .chunks_exact(CHAR_SIZE)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .take_while(|&unit| unit != 0)
            .collect();

        Ok(String::from_utf16_lossy(&units))
    }

    /// Write `text` at `offset`, occupying `max_length` of its UTF-16 length.
    ///
    /// # Errors
    /// - `Error::InteriorNul` if `text` contains U+0000
    /// - `Error::BlockOverflow` if the encoded text does not fit
    pub fn write_text(&mut self, offset: usize, text: &str) -> Result<()> {
        if text.contains('\0') {
            return Err(Error::InteriorNul { offset });
        }

        let units: Vec<u16> = text.encode_utf16().collect();
        self.check_fits(offset, Self::max_length(units.len()))?;

        let mut pos = offset;
        for unit in units.into_iter().chain(std::iter::once(0)) {
            self.data[pos..pos + CHAR_SIZE].copy_from_slice(&unit.to_be_bytes());
            pos += CHAR_SIZE;
        }
        Ok(())
    }

    // ========================================================================
    // Bounds checking
    // ========================================================================

    fn check_fits(&self, offset: usize, needed: usize) -> Result<()> {
        match offset.checked_add(needed) {
            Some(end) if end <= self.capacity() => Ok(()),
            _ => Err(self.overflow(offset, needed)),
        }
    }

    fn slice_at(&self, offset: usize, len: usize) -> Result<&[u8]> {
        match offset.checked_add(len) {
            Some(end) if end <= self.capacity() => Ok(&self.data[offset..end]),
            _ => Err(self.out_of_range(offset)),
        }
    }

    fn array_at<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.slice_at(offset, N)?);
        Ok(out)
    }

    fn overflow(&self, offset: usize, needed: usize) -> Error {
        Error::BlockOverflow {
            offset,
            needed,
            capacity: self.capacity(),
        }
    }

    fn out_of_range(&self, offset: usize) -> Error {
        Error::OffsetOutOfRange {
            offset,
            capacity: self.capacity(),
        }
    }
}

// Clone only available in tests - forces explicit copying in production
#[cfg(test)]
impl Clone for BlockImage {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_image_is_zeroed() {
        let image = BlockImage::new(400);
        assert_eq!(image.capacity(), 400);
        assert!(image.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_int_read_write() {
        let mut image = BlockImage::new(64);
        image.write_int(0, 12).unwrap();
        image.write_int(4, -1).unwrap();
        image.write_int(60, i32::MIN).unwrap();

        assert_eq!(image.read_int(0).unwrap(), 12);
        assert_eq!(image.read_int(4).unwrap(), -1);
        assert_eq!(image.read_int(60).unwrap(), i32::MIN);
    }

    #[test]
    fn test_int_is_big_endian() {
        let mut image = BlockImage::new(8);
        image.write_int(0, 0x0102_0304).unwrap();
        assert_eq!(&image.as_slice()[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_int_overflow_leaves_image_unchanged() {
        let mut image = BlockImage::new(400);
        image.as_mut_slice()[397..].copy_from_slice(&[7, 8, 9]);
        let before = image.clone();

        let err = image.write_int(397, 12).unwrap_err();
        assert!(matches!(
            err,
            Error::BlockOverflow {
                offset: 397,
                needed: 4,
                capacity: 400
            }
        ));
        assert_eq!(image.as_slice(), before.as_slice());
    }

    #[test]
    fn test_int_fits_exactly_at_end() {
        let mut image = BlockImage::new(400);
        assert!(image.write_int(398, 12).is_err());
        image.write_int(396, 12).unwrap();
        assert_eq!(image.read_int(396).unwrap(), 12);
    }

    #[test]
    fn test_read_out_of_range() {
        let image = BlockImage::new(16);
        assert!(matches!(
            image.read_int(14),
            Err(Error::OffsetOutOfRange { offset: 14, .. })
        ));
        assert!(image.read_int(usize::MAX).is_err());
        assert!(image.read_text(16).is_err());
        assert!(image.read_bytes(13).is_err());
    }

    #[test]
    fn test_huge_offset_write_is_overflow() {
        let mut image = BlockImage::new(16);
        assert!(matches!(
            image.write_int(usize::MAX - 1, 1),
            Err(Error::BlockOverflow { .. })
        ));
    }

    #[test]
    fn test_bytes_read_write() {
        let mut image = BlockImage::new(64);
        image.write_bytes(10, b"hello").unwrap();

        assert_eq!(image.read_int(10).unwrap(), 5);
        assert_eq!(image.read_bytes(10).unwrap(), b"hello");
    }

    #[test]
    fn test_empty_bytes_at_end() {
        let mut image = BlockImage::new(64);
        image.write_bytes(60, &[]).unwrap();
        assert!(image.read_bytes(60).unwrap().is_empty());
    }

    #[test]
    fn test_bytes_overflow() {
        let mut image = BlockImage::new(16);
        // 4-byte prefix + 10 bytes = 14; 3 + 14 > 16
        assert!(image.write_bytes(3, &[1; 10]).is_err());
        image.write_bytes(2, &[1; 10]).unwrap();
        assert!(image.as_slice()[..2].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_bytes_bad_length_prefix() {
        let mut image = BlockImage::new(16);
        image.write_int(0, 100).unwrap();
        assert!(image.read_bytes(0).is_err());

        image.write_int(0, -3).unwrap();
        assert!(image.read_bytes(0).is_err());
    }

    #[test]
    fn test_text_read_write() {
        let mut image = BlockImage::new(400);
        image.write_text(390, "task").unwrap();
        assert_eq!(image.read_text(390).unwrap(), "task");
    }

    #[test]
    fn test_text_needs_max_length() {
        let mut image = BlockImage::new(400);

        // "t1" needs 6 bytes; 396 + 6 > 400
        assert_eq!(BlockImage::max_length(2), 6);
        assert!(image.write_text(396, "t1").is_err());
        assert_eq!(image.read_text(396).unwrap(), "");
    }

    #[test]
    fn test_text_encoding_is_fixed_width() {
        let mut image = BlockImage::new(16);
        image.write_text(0, "Ab").unwrap();
        assert_eq!(&image.as_slice()[..6], &[0, b'A', 0, b'b', 0, 0]);
    }

    #[test]
    fn test_text_non_ascii() {
        let mut image = BlockImage::new(64);
        let text = "héllo 世界 🦀";
        image.write_text(0, text).unwrap();
        assert_eq!(image.read_text(0).unwrap(), text);
    }

    #[test]
    fn test_text_rejects_nul() {
        let mut image = BlockImage::new(64);
        assert!(matches!(
            image.write_text(8, "a\0b"),
            Err(Error::InteriorNul { offset: 8 })
        ));
        assert!(image.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_text_unterminated_stops_at_end() {
        let mut image = BlockImage::new(6);
        image.as_mut_slice().copy_from_slice(&[0, b'x', 0, b'y', 0, b'z']);
        assert_eq!(image.read_text(0).unwrap(), "xyz");
        // Odd trailing byte is ignored
        assert_eq!(image.read_text(1).unwrap(), "\u{7800}\u{7900}");
    }

    #[test]
    fn test_reset() {
        let mut image = BlockImage::new(32);
        image.write_int(0, 99).unwrap();
        image.reset();
        assert_eq!(image.read_int(0).unwrap(), 0);
    }
}
