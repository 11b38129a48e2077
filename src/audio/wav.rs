use crate::error::Result;
use crate::pipeline::write_atomic;
use std::path::Path;

/// RIFF header size for a canonical PCM WAVE file
const HEADER_SIZE: usize = 44;

const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const PCM_FORMAT: u16 = 1;

/// Encode mono 16-bit samples as a WAVE file
///
/// Layout (all integers little-endian):
/// ```text
/// "RIFF" [u32 file size - 8] "WAVE"
/// "fmt " [u32 16] [u16 format=1] [u16 channels] [u32 rate] [u32 byte rate] [u16 block align] [u16 bits]
/// "data" [u32 data size] [i16 samples...]
/// ```
///
/// # Arguments
/// * `samples` - Mono PCM samples
/// * `sample_rate` - Samples per second
///
/// # Returns
/// The complete file contents
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate * u32::from(block_align);
    let data_size = (samples.len() * usize::from(block_align)) as u32;

    let mut bytes = Vec::with_capacity(HEADER_SIZE + data_size as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_size).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    bytes.extend_from_slice(&CHANNELS.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_size.to_le_bytes());
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }

    bytes
}

/// Encode and atomically write a WAVE file, creating parent directories
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    write_atomic(path, &encode_wav(samples, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    #[test]
    fn test_header_fields() {
        let bytes = encode_wav(&[0, 1, -1], 44_100);

        assert_eq!(bytes.len(), HEADER_SIZE + 6);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32_at(&bytes, 4), 36 + 6);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32_at(&bytes, 16), 16);
        assert_eq!(u16_at(&bytes, 20), 1); // PCM
        assert_eq!(u16_at(&bytes, 22), 1); // mono
        assert_eq!(u32_at(&bytes, 24), 44_100);
        assert_eq!(u32_at(&bytes, 28), 88_200);
        assert_eq!(u16_at(&bytes, 32), 2);
        assert_eq!(u16_at(&bytes, 34), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(&bytes, 40), 6);
    }

    #[test]
    fn test_samples_are_little_endian() {
        let bytes = encode_wav(&[0x0102, -2], 8000);
        assert_eq!(&bytes[44..], &[0x02, 0x01, 0xFE, 0xFF]);
    }

    #[test]
    fn test_empty_wav() {
        let bytes = encode_wav(&[], 44_100);
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(u32_at(&bytes, 40), 0);
    }

    #[test]
    fn test_write_wav_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sfx/click.wav");
        write_wav(&path, &[5; 10], 44_100).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 64);
    }
}
