//! Run-length coding for tile grid text.
//!
//! Payloads are a flat sequence of `(run_length, byte)` pairs. Runs longer than
//! 255 are split across consecutive pairs.

use crate::error::{CorruptReason, DecodeError, EncodeError};

/// Element names whose inner text is stored run-length encoded.
pub const RLE_ELEMENT_NAMES: [&str; 2] = ["solids", "bg"];

/// Returns `true` if inner text of an element called `name` uses run-length coding.
#[must_use]
pub fn uses_rle(name: &str) -> bool {
    RLE_ELEMENT_NAMES.contains(&name)
}

/// Run-length encodes ASCII text.
///
/// # Errors
///
/// Returns [`EncodeError::NonAsciiRle`] for any character outside ASCII.
pub fn encode(text: &str) -> Result<Vec<u8>, EncodeError> {
    if let Some((position, found)) = text.char_indices().find(|(_, c)| !c.is_ascii()) {
        return Err(EncodeError::NonAsciiRle { position, found });
    }

    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len().min(64));
    let mut iter = bytes.iter().copied().peekable();
    while let Some(byte) = iter.next() {
        let mut run = 1u8;
        while run < u8::MAX && iter.peek() == Some(&byte) {
            iter.next();
            run += 1;
        }
        out.push(run);
        out.push(byte);
    }
    Ok(out)
}

/// Expands run-length pairs into text.
///
/// Each payload byte is taken as a single character.
///
/// # Errors
///
/// Returns [`CorruptReason::OddRleLength`] if the payload is not a whole number of pairs.
pub fn decode(payload: &[u8]) -> Result<String, DecodeError> {
    if payload.len() % 2 != 0 {
        return Err(DecodeError::CorruptData(CorruptReason::OddRleLength {
            len: payload.len(),
        }));
    }

    let expanded: usize = payload.chunks_exact(2).map(|pair| pair[0] as usize).sum();
    let mut text = String::with_capacity(expanded);
    for pair in payload.chunks_exact(2) {
        let ch = char::from(pair[1]);
        text.extend(std::iter::repeat(ch).take(pair[0] as usize));
    }
    Ok(text)
}
