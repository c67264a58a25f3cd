use crate::utils::error::{LeadError, Result};
use encoding_rs::{Encoding, UTF_8};

/// Bytes of the file prefix handed to the detector.
pub const DEFAULT_SNIFF_BYTES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    Bom,
    Explicit,
    Sniffed,
    /// Detection was inconclusive; decoded as lossy UTF-8.
    Fallback,
}

#[derive(Debug)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static Encoding,
    pub detection: Detection,
    /// Set when detection fell back; the run continues.
    pub warning: Option<LeadError>,
}

impl DecodedText {
    pub fn encoding_name(&self) -> String {
        self.encoding.name().to_lowercase()
    }
}

pub fn resolve_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| LeadError::UnknownEncodingError {
        label: label.to_string(),
    })
}

/// Decodes an input file.
///
/// Order: a byte order mark wins, then an explicit encoding, then a sniff over the first
/// `sniff_bytes` bytes. If the sniffed encoding cannot decode the whole file cleanly, the
/// text is decoded as lossy UTF-8 and an `EncodingDetectionError` is attached as a warning.
pub fn decode_input(
    input: &str,
    bytes: &[u8],
    preferred: Option<&'static Encoding>,
    sniff_bytes: usize,
) -> DecodedText {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return DecodedText {
            text: text.into_owned(),
            encoding,
            detection: Detection::Bom,
            warning: None,
        };
    }

    if let Some(encoding) = preferred {
        let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
        if had_errors {
            tracing::warn!(
                "{} contains bytes that are invalid in {}; they were replaced",
                input,
                encoding.name()
            );
        }
        return DecodedText {
            text: text.into_owned(),
            encoding,
            detection: Detection::Explicit,
            warning: None,
        };
    }

    let sample = sniff_window(bytes, sniff_bytes);
    let guess = guess_encoding(sample);
    let (text, had_errors) = guess.decode_without_bom_handling(bytes);
    if !had_errors {
        return DecodedText {
            text: text.into_owned(),
            encoding: guess,
            detection: Detection::Sniffed,
            warning: None,
        };
    }

    let (text, _) = UTF_8.decode_without_bom_handling(bytes);
    DecodedText {
        text: text.into_owned(),
        encoding: UTF_8,
        detection: Detection::Fallback,
        warning: Some(LeadError::EncodingDetectionError {
            input: input.to_string(),
            reason: format!(
                "first {} bytes suggested {}, but the rest of the file does not decode as {}",
                sample.len(),
                guess.name(),
                guess.name()
            ),
        }),
    }
}

/// Prefix to sniff, cut back to the last newline so no multi-byte sequence is split.
fn sniff_window(bytes: &[u8], sniff_bytes: usize) -> &[u8] {
    if bytes.len() <= sniff_bytes {
        return bytes;
    }
    let window = &bytes[..sniff_bytes];
    match window.iter().rposition(|&b| b == b'\n') {
        Some(pos) => &window[..=pos],
        None => window,
    }
}

fn guess_encoding(sample: &[u8]) -> &'static Encoding {
    // ASCII 是 UTF-8 的子集
    if sample.is_ascii() {
        return UTF_8;
    }
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(sample, true);
    detector.guess(None, true)
}
