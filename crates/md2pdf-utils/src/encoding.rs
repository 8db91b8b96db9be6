//! Decoding of raw input bytes to text.

use encoding_rs::{Encoding, WINDOWS_1252};

/// Decode Markdown source bytes to a UTF-8 string.
///
/// A byte-order mark selects UTF-8, UTF-16LE or UTF-16BE and is dropped.
/// Without one, valid UTF-8 is taken as is and anything else is read as
/// Windows-1252. Returns the text and the name of the encoding used.
pub fn decode_source(bytes: &[u8]) -> (String, &'static str) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        if had_errors {
            log::warn!("Input has malformed {} sequences", encoding.name());
        }
        return (text.into_owned(), encoding.name());
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => (s.to_string(), "UTF-8"),
        Err(e) => {
            log::debug!("Input is not UTF-8 ({}), falling back to windows-1252", e);
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            (text.into_owned(), WINDOWS_1252.name())
        }
    }
}
