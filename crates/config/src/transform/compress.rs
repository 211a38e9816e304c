//! Gzip compression for long text values.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use super::error::{Result, TransformError};

/// Compresses the UTF-8 bytes of `text` with gzip.
pub fn compress(text: &str) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(text.as_bytes())
        .map_err(|e| TransformError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| TransformError::Compression(e.to_string()))
}

/// Inverse of [`compress`].
///
/// # Errors
///
/// Returns `TransformError::Compression` for input that is not a gzip
/// stream, and `TransformError::Encoding` if the inflated bytes are not UTF-8.
pub fn decompress(bytes: &[u8]) -> Result<String> {
    let mut decoder = GzDecoder::new(bytes);
    let mut inflated = Vec::new();
    decoder
        .read_to_end(&mut inflated)
        .map_err(|e| TransformError::Compression(e.to_string()))?;
    String::from_utf8(inflated).map_err(|e| TransformError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let text = "SELECT * FROM accounts WHERE region = 'eu-west-1' ".repeat(40);
        let packed = compress(&text).unwrap();
        assert!(packed.len() < text.len());
        assert_eq!(decompress(&packed).unwrap(), text);
    }

    #[test]
    fn test_empty_string_roundtrip() {
        let packed = compress("").unwrap();
        assert_eq!(decompress(&packed).unwrap(), "");
    }

    #[test]
    fn test_garbage_input_fails() {
        let result = decompress(b"definitely not gzip");
        assert!(matches!(result, Err(TransformError::Compression(_))));
    }
}
