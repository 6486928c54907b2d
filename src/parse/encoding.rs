//! Character-set conversion between the configured input and output
//! encodings.
//!
//! Values stay UTF-8 `String`s in memory. The input encoding reinterprets the
//! bytes the reader produced; the output encoding acts as a strict
//! representability gate. Conversion is strict in both directions — malformed
//! or unmappable data is an error, never replaced silently.

use std::fmt;

use encoding_rs::{Encoding, UTF_8};

use crate::error::{Error, Result};

/// Why a transcode failed; coordinates are attached by the row parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TranscodeError {
    /// Input bytes malformed for the declared input encoding.
    Malformed(&'static str),
    /// Decoded text not representable in the output encoding.
    Unmappable(&'static str),
}

impl fmt::Display for TranscodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscodeError::Malformed(name) => {
                write!(f, "malformed {name} byte sequence")
            }
            TranscodeError::Unmappable(name) => {
                write!(f, "value not representable in {name}")
            }
        }
    }
}

/// Strict transcoder between an input and an output character set.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Transcoder {
    input: &'static Encoding,
    output: &'static Encoding,
}

impl Transcoder {
    /// Resolve a pair of encoding labels (e.g. `"UTF-8"`, `"windows-1252"`).
    ///
    /// Unknown labels are a configuration error.
    pub(crate) fn new(input_label: &str, output_label: &str) -> Result<Self> {
        let input = Encoding::for_label(input_label.as_bytes()).ok_or_else(|| {
            Error::Configuration(format!("unknown input encoding '{input_label}'"))
        })?;
        let output = Encoding::for_label(output_label.as_bytes()).ok_or_else(|| {
            Error::Configuration(format!("unknown output encoding '{output_label}'"))
        })?;
        Ok(Self { input, output })
    }

    /// Whether conversion would leave values untouched.
    pub(crate) fn is_noop(&self) -> bool {
        self.input == self.output
    }

    /// Re-encode `text` from the input character set to the output one.
    pub(crate) fn transcode(&self, text: &str) -> std::result::Result<String, TranscodeError> {
        if self.is_noop() {
            return Ok(text.to_owned());
        }

        let (decoded, had_errors) = self.input.decode_without_bom_handling(text.as_bytes());
        if had_errors {
            return Err(TranscodeError::Malformed(self.input.name()));
        }

        if self.output != UTF_8 {
            let (_, _, had_errors) = self.output.encode(&decoded);
            if had_errors {
                return Err(TranscodeError::Unmappable(self.output.name()));
            }
        }

        Ok(decoded.into_owned())
    }
}
