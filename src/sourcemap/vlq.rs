//! Base64 VLQ codec used by the `mappings` field of source maps

use crate::errors::{BundlerError, BundlerResult};

const BASE64_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const VLQ_SHIFT: u32 = 5;
const VLQ_CONTINUATION: i64 = 1 << VLQ_SHIFT;
const VLQ_MASK: i64 = VLQ_CONTINUATION - 1;

fn digit_value(c: u8) -> Option<i64> {
    let value = match c {
        b'A'..=b'Z' => c - b'A',
        b'a'..=b'z' => c - b'a' + 26,
        b'0'..=b'9' => c - b'0' + 52,
        b'+' => 62,
        b'/' => 63,
        _ => return None,
    };
    Some(i64::from(value))
}

/// Append the VLQ encoding of `value` to `out`
pub fn encode(value: i64, out: &mut String) {
    // Sign moves to the least significant bit.
    let mut vlq = if value < 0 { ((-value) << 1) | 1 } else { value << 1 };
    loop {
        let mut digit = vlq & VLQ_MASK;
        vlq >>= VLQ_SHIFT;
        if vlq > 0 {
            digit |= VLQ_CONTINUATION;
        }
        out.push(char::from(BASE64_ALPHABET[digit as usize]));
        if vlq == 0 {
            break;
        }
    }
}

/// Decode every value of one comma-free mapping segment
pub fn decode_segment(segment: &str) -> BundlerResult<Vec<i64>> {
    let mut values = Vec::with_capacity(5);
    let mut value: i64 = 0;
    let mut shift: u32 = 0;
    let mut pending = false;

    for byte in segment.bytes() {
        let digit = digit_value(byte).ok_or_else(|| {
            BundlerError::InvalidSourceMap(format!(
                "Invalid base64 character '{}' in mappings",
                char::from(byte)
            ))
        })?;
        if shift > 60 {
            return Err(BundlerError::InvalidSourceMap(
                "VLQ value overflows 64 bits".to_string(),
            ));
        }
        value += (digit & VLQ_MASK) << shift;
        if digit & VLQ_CONTINUATION != 0 {
            shift += VLQ_SHIFT;
            pending = true;
        } else {
            let magnitude = value >> 1;
            values.push(if value & 1 == 1 { -magnitude } else { magnitude });
            value = 0;
            shift = 0;
            pending = false;
        }
    }

    if pending {
        return Err(BundlerError::InvalidSourceMap(format!(
            "Truncated VLQ value in segment '{segment}'"
        )));
    }
    Ok(values)
}
