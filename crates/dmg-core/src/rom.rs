//! Cartridge image loading and header validation.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Offset of the boot logo bitmap in the cartridge header.
pub const LOGO_OFFSET: usize = 0x0104;
/// Offset of the title field.
pub const TITLE_OFFSET: usize = 0x0134;
/// Maximum title length in bytes.
pub const TITLE_LEN: usize = 16;
/// Offset of the ROM-size code.
pub const ROM_SIZE_OFFSET: usize = 0x0148;
/// Offset of the header checksum byte.
pub const HEADER_CHECKSUM_OFFSET: usize = 0x014D;
/// Smallest image that contains a complete header.
pub const HEADER_END: usize = 0x0150;

/// Logo bitmap every licensed cartridge carries at `0x0104`.
pub const NINTENDO_LOGO: [u8; 48] = [
    0xCE, 0xED, 0x66, 0x66, 0xCC, 0x0D, 0x00, 0x0B, 0x03, 0x73, 0x00, 0x83, 0x00, 0x0C, 0x00, 0x0D,
    0x00, 0x08, 0x11, 0x1F, 0x88, 0x89, 0x00, 0x0E, 0xDC, 0xCC, 0x6E, 0xE6, 0xDD, 0xDD, 0xD9, 0x99,
    0xBB, 0xBB, 0x67, 0x63, 0x6E, 0x0E, 0xEC, 0xCC, 0xDD, 0xDC, 0x99, 0x9F, 0xBB, 0xB9, 0x33, 0x3E,
];

/// Failure to load or validate a cartridge image.
#[derive(Debug, Error)]
pub enum RomError {
    /// The image file could not be read.
    #[error("failed to read ROM image {}", .path.display())]
    Io {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The image is too short to hold a cartridge header.
    #[error("ROM image is {len} bytes; a header needs at least 0x150")]
    TooShort {
        /// Actual image length.
        len: usize,
    },
    /// The logo bitmap at `0x0104` does not match.
    #[error("ROM header logo does not match")]
    InvalidLogo,
    /// The header checksum at `0x014D` does not match the header bytes.
    #[error("ROM header checksum mismatch: header says {expected:#04X}, computed {computed:#04X}")]
    ChecksumMismatch {
        /// Checksum stored in the header.
        expected: u8,
        /// Checksum computed over `0x0134..=0x014C`.
        computed: u8,
    },
}

/// Computes the header checksum over `0x0134..=0x014C`.
///
/// Returns `None` when `data` is shorter than the header.
#[must_use]
pub fn header_checksum(data: &[u8]) -> Option<u8> {
    data.get(TITLE_OFFSET..HEADER_CHECKSUM_OFFSET).map(|header| {
        header
            .iter()
            .fold(0_u8, |acc, byte| acc.wrapping_sub(*byte).wrapping_sub(1))
    })
}

/// Validated cartridge image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomImage {
    data: Vec<u8>,
    title: String,
}

impl RomImage {
    /// Validates a raw image.
    ///
    /// # Errors
    ///
    /// Returns [`RomError::TooShort`], [`RomError::InvalidLogo`] or
    /// [`RomError::ChecksumMismatch`] when the header is malformed.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, RomError> {
        if data.len() < HEADER_END {
            return Err(RomError::TooShort { len: data.len() });
        }

        if data[LOGO_OFFSET..LOGO_OFFSET + NINTENDO_LOGO.len()] != NINTENDO_LOGO {
            return Err(RomError::InvalidLogo);
        }

        let expected = data[HEADER_CHECKSUM_OFFSET];
        let computed = header_checksum(&data).unwrap_or(!expected);
        if computed != expected {
            return Err(RomError::ChecksumMismatch { expected, computed });
        }

        let title = data[TITLE_OFFSET..TITLE_OFFSET + TITLE_LEN]
            .iter()
            .take_while(|byte| **byte != 0)
            .map(|byte| {
                if byte.is_ascii_graphic() || *byte == b' ' {
                    char::from(*byte)
                } else {
                    '?'
                }
            })
            .collect::<String>()
            .trim_end()
            .to_owned();

        Ok(Self { data, title })
    }

    /// Reads and validates an image from disk.
    ///
    /// # Errors
    ///
    /// Returns [`RomError::Io`] when the file cannot be read, or any error
    /// from [`RomImage::from_bytes`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RomError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| RomError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(data)
    }

    /// Cartridge title with trailing padding removed.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// ROM size declared by the header (`32 KiB << code`), or `None` for
    /// codes outside the documented range.
    #[must_use]
    pub fn declared_size(&self) -> Option<usize> {
        match self.data[ROM_SIZE_OFFSET] {
            code @ 0..=8 => Some(0x8000 << code),
            _ => None,
        }
    }

    /// Raw image bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the image and returns its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::{
        header_checksum, RomError, RomImage, HEADER_CHECKSUM_OFFSET, LOGO_OFFSET, NINTENDO_LOGO,
        ROM_SIZE_OFFSET, TITLE_OFFSET,
    };

    fn image_with_title(title: &[u8]) -> Vec<u8> {
        let mut data = vec![0x00; 0x8000];
        data[LOGO_OFFSET..LOGO_OFFSET + NINTENDO_LOGO.len()].copy_from_slice(&NINTENDO_LOGO);
        data[TITLE_OFFSET..TITLE_OFFSET + title.len()].copy_from_slice(title);
        data[HEADER_CHECKSUM_OFFSET] = header_checksum(&data).expect("full header");
        data
    }

    #[test]
    fn well_formed_header_is_accepted() {
        let image = RomImage::from_bytes(image_with_title(b"TETRIS")).expect("valid header");
        assert_eq!(image.title(), "TETRIS");
        assert_eq!(image.declared_size(), Some(0x8000));
        assert_eq!(image.bytes().len(), 0x8000);
    }

    #[test]
    fn checksum_of_zeroed_header_is_known_value() {
        // 25 bytes of zero: 0 - 25 * 1 = -25 = 0xE7.
        let data = vec![0x00; 0x150];
        assert_eq!(header_checksum(&data), Some(0xE7));
        assert_eq!(header_checksum(&data[..0x140]), None);
    }

    #[test]
    fn declared_size_follows_size_code() {
        let mut data = image_with_title(b"BIG");
        data[ROM_SIZE_OFFSET] = 0x02;
        data[HEADER_CHECKSUM_OFFSET] = header_checksum(&data).expect("full header");
        let image = RomImage::from_bytes(data).expect("valid header");
        assert_eq!(image.declared_size(), Some(128 * 1024));
    }

    #[test]
    fn short_image_is_rejected() {
        let error = RomImage::from_bytes(vec![0; 0x14F]).expect_err("too short");
        assert!(matches!(error, RomError::TooShort { len: 0x14F }));
    }

    #[test]
    fn bad_logo_is_rejected() {
        let mut data = image_with_title(b"X");
        data[LOGO_OFFSET] ^= 0xFF;
        let error = RomImage::from_bytes(data).expect_err("bad logo");
        assert!(matches!(error, RomError::InvalidLogo));
    }

    #[test]
    fn bad_checksum_is_rejected() {
        let mut data = image_with_title(b"X");
        data[HEADER_CHECKSUM_OFFSET] = data[HEADER_CHECKSUM_OFFSET].wrapping_add(1);
        let error = RomImage::from_bytes(data).expect_err("bad checksum");
        assert!(matches!(error, RomError::ChecksumMismatch { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let error = RomImage::from_file("/nonexistent/dmg-core/rom.gb").expect_err("missing");
        assert!(matches!(error, RomError::Io { .. }));
        assert!(error.to_string().contains("/nonexistent/dmg-core/rom.gb"));
    }
}
