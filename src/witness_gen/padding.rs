/*
    sha256 message padding, done outside the circuit so that the circuit only
    has to run the compression function over the first `used_len / 64` blocks

    | message (L bytes) | 0x80 | 0x00 * padK | L * 8 as u64 BE | 0x00 ... 0x00 |
    |<----------------- used_len, multiple of 64 ---------------->|
    |<----------------------------- capacity ---------------------------------->|

    the zero tail up to capacity is part of the witness, the circuit input
    width is fixed
*/

use crate::error::{Error, Result};

pub const BLOCK_BYTES: usize = 64;
const LENGTH_BYTES: usize = 8;
const MARKER: u8 = 0x80;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaddedHeader {
    bytes: Vec<u8>,
    used_len: usize,
}

/// Bytes taken by `message_len` bytes of message once padded.
pub fn padded_len(message_len: usize) -> usize {
    let unaligned = message_len + 1 + LENGTH_BYTES;
    let pad_k = (BLOCK_BYTES - unaligned % BLOCK_BYTES) % BLOCK_BYTES;
    unaligned + pad_k
}

pub fn pad_sha256(message: &[u8], capacity: usize) -> Result<PaddedHeader> {
    if capacity == 0 {
        return Err(Error::Configuration(
            "header capacity must be positive".to_string(),
        ));
    }

    let used_len = padded_len(message.len());
    if used_len > capacity {
        return Err(Error::CapacityExceeded {
            required: used_len,
            capacity,
        });
    }

    let mut bytes = vec![0u8; capacity];
    bytes[..message.len()].copy_from_slice(message);
    bytes[message.len()] = MARKER;

    let bit_len = (message.len() as u64) * 8;
    bytes[used_len - LENGTH_BYTES..used_len].copy_from_slice(&bit_len.to_be_bytes());

    log::debug!(
        "padded {} header bytes to {} ({} blocks), capacity {}",
        message.len(),
        used_len,
        used_len / BLOCK_BYTES,
        capacity
    );

    Ok(PaddedHeader { bytes, used_len })
}

impl PaddedHeader {
    /// The full buffer, `capacity` bytes long.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn used_len(&self) -> usize {
        self.used_len
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Message length read back from the big-endian bit length trailer.
    pub fn message_len(&self) -> usize {
        let mut trailer = [0u8; LENGTH_BYTES];
        trailer.copy_from_slice(&self.bytes[self.used_len - LENGTH_BYTES..self.used_len]);
        (u64::from_be_bytes(trailer) / 8) as usize
    }

    pub fn message(&self) -> &[u8] {
        &self.bytes[..self.message_len()]
    }

    pub fn to_decimal_strings(&self) -> Vec<String> {
        self.bytes.iter().map(|b| b.to_string()).collect()
    }
}

#[test]
fn test_fixed_position_scenario() {
    let header = b"From: voter@example.com\r\nSubject: Survey #123456\r\n";
    assert_eq!(header.len(), 50);

    let padded = pad_sha256(header, 256).unwrap();
    assert_eq!(padded.used_len(), 64);
    assert_eq!(padded.capacity(), 256);
    assert_eq!(&padded.bytes()[..50], &header[..]);
    assert_eq!(padded.bytes()[50], 0x80);
    assert!(padded.bytes()[51..56].iter().all(|&b| b == 0));
    assert_eq!(&padded.bytes()[56..64], &400u64.to_be_bytes());
    assert!(padded.bytes()[64..].iter().all(|&b| b == 0));
    assert_eq!(padded.message_len(), 50);
    assert_eq!(padded.message(), &header[..]);
}

#[test]
fn test_block_boundaries() {
    // 55 bytes is the most that fits one block with the marker and trailer
    assert_eq!(padded_len(0), 64);
    assert_eq!(padded_len(55), 64);
    assert_eq!(padded_len(56), 128);
    assert_eq!(padded_len(64), 128);
    assert_eq!(padded_len(119), 128);
    assert_eq!(padded_len(120), 192);

    let padded = pad_sha256(&[], 64).unwrap();
    assert_eq!(padded.bytes()[0], 0x80);
    assert_eq!(&padded.bytes()[56..], &[0u8; 8]);
}

#[test]
fn test_capacity_exceeded() {
    let message = [b'a'; 56];
    match pad_sha256(&message, 64) {
        Err(Error::CapacityExceeded { required, capacity }) => {
            assert_eq!(required, 128);
            assert_eq!(capacity, 64);
        }
        other => panic!("expected CapacityExceeded, got {:?}", other),
    }

    // message longer than the whole buffer must not panic either
    assert!(matches!(
        pad_sha256(&[1u8; 300], 128),
        Err(Error::CapacityExceeded { .. })
    ));
    assert!(matches!(
        pad_sha256(b"x", 0),
        Err(Error::Configuration(_))
    ));
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn padding_is_aligned_and_deterministic(
            message in prop::collection::vec(any::<u8>(), 0..400),
            extra_blocks in 0usize..4,
        ) {
            let capacity = padded_len(message.len()) + extra_blocks * BLOCK_BYTES;
            let first = pad_sha256(&message, capacity).unwrap();
            let second = pad_sha256(&message, capacity).unwrap();
            prop_assert_eq!(&first, &second);

            let used = first.used_len();
            prop_assert_eq!(used % BLOCK_BYTES, 0);
            prop_assert!(used <= capacity);
            prop_assert!(used - message.len() >= 1 + LENGTH_BYTES);
            prop_assert!(used - message.len() < 1 + LENGTH_BYTES + BLOCK_BYTES);

            let mut trailer = [0u8; 8];
            trailer.copy_from_slice(&first.bytes()[used - 8..used]);
            prop_assert_eq!(u64::from_be_bytes(trailer), message.len() as u64 * 8);
            prop_assert!(first.bytes()[used..].iter().all(|&b| b == 0));
        }

        #[test]
        fn too_small_capacity_is_rejected(
            message in prop::collection::vec(any::<u8>(), 1..400),
        ) {
            let capacity = padded_len(message.len()) - 1;
            let is_capacity_exceeded = matches!(
                pad_sha256(&message, capacity),
                Err(Error::CapacityExceeded { .. })
            );
            prop_assert!(is_capacity_exceeded);
        }
    }
}
