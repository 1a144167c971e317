//! Constructor-argument calldata encoding.
//!
//! Standard head/tail ABI encoding for the closed argument value domain:
//! addresses, unsigned integers, and booleans are static 32-byte words;
//! strings are dynamic (offset word in the head, length-prefixed padded
//! bytes in the tail). The encoded arguments are appended to the creation
//! bytecode.

use wright_deploy::descriptor::ArgValue;

const WORD: usize = 32;

/// Encodes constructor arguments for appending to creation bytecode.
#[must_use]
pub fn encode_constructor_args(args: &[ArgValue]) -> Vec<u8> {
    let head_len = WORD * args.len();
    let mut head: Vec<u8> = Vec::with_capacity(head_len);
    let mut tail: Vec<u8> = Vec::new();

    for arg in args {
        match arg {
            ArgValue::Address(address) => {
                let mut word = [0u8; WORD];
                word[WORD - 20..].copy_from_slice(address.as_bytes());
                head.extend_from_slice(&word);
            }
            ArgValue::Uint(value) => {
                head.extend_from_slice(&uint_word(*value));
            }
            ArgValue::Bool(value) => {
                head.extend_from_slice(&uint_word(u64::from(*value)));
            }
            ArgValue::String(value) => {
                let offset = head_len + tail.len();
                head.extend_from_slice(&uint_word(offset as u64));
                tail.extend_from_slice(&uint_word(value.len() as u64));
                tail.extend_from_slice(value.as_bytes());
                let padded_len = value.len().div_ceil(WORD) * WORD;
                tail.resize(tail.len() + padded_len - value.len(), 0);
            }
        }
    }

    head.extend(tail);
    head
}

fn uint_word(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use wright_core::Address;

    fn addr() -> Address {
        "0x1f9090aae28b8a3dceadf281b0f12828e676c326".parse().unwrap()
    }

    #[test]
    fn empty_args_encode_to_nothing() {
        assert!(encode_constructor_args(&[]).is_empty());
    }

    #[test]
    fn address_is_left_padded_to_a_word() {
        let encoded = encode_constructor_args(&[ArgValue::Address(addr())]);
        assert_eq!(encoded.len(), 32);
        assert_eq!(&encoded[..12], &[0u8; 12]);
        assert_eq!(&encoded[12..], addr().as_bytes());
    }

    #[test]
    fn uint_encodes_big_endian() {
        let encoded = encode_constructor_args(&[ArgValue::Uint(0x1234)]);
        assert_eq!(encoded.len(), 32);
        assert_eq!(encoded[30], 0x12);
        assert_eq!(encoded[31], 0x34);
        assert_eq!(&encoded[..30], &[0u8; 30]);
    }

    #[test]
    fn bool_encodes_as_zero_or_one() {
        let encoded = encode_constructor_args(&[ArgValue::Bool(true), ArgValue::Bool(false)]);
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 1);
        assert_eq!(encoded[63], 0);
    }

    #[test]
    fn string_uses_offset_length_and_padding() {
        let encoded = encode_constructor_args(&[ArgValue::String("abc".into())]);
        // head word: offset 0x20, tail: length 3 + "abc" padded to a word.
        assert_eq!(encoded.len(), 96);
        assert_eq!(encoded[31], 0x20);
        assert_eq!(encoded[63], 3);
        assert_eq!(&encoded[64..67], b"abc");
        assert_eq!(&encoded[67..96], &[0u8; 29]);
    }

    #[test]
    fn word_aligned_string_gets_no_padding() {
        let encoded = encode_constructor_args(&[ArgValue::String("a".repeat(32))]);
        // offset word + length word + exactly one data word.
        assert_eq!(encoded.len(), 96);
    }

    #[test]
    fn mixed_static_and_dynamic_args_interleave_correctly() {
        let encoded = encode_constructor_args(&[
            ArgValue::Uint(1),
            ArgValue::String("hi".into()),
            ArgValue::Address(addr()),
        ]);
        // 3 head words + length word + one data word.
        assert_eq!(encoded.len(), 160);
        // First head word: uint 1.
        assert_eq!(encoded[31], 1);
        // Second head word: offset to tail = 3 * 32 = 0x60.
        assert_eq!(encoded[63], 0x60);
        // Third head word: the address.
        assert_eq!(&encoded[76..96], addr().as_bytes());
        // Tail: length 2 then "hi".
        assert_eq!(encoded[127], 2);
        assert_eq!(&encoded[128..130], b"hi");
    }
}
