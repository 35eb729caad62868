//! Manifest files: one URL per line, in a caller-chosen text encoding.

use anyhow::{Context, Result};
use encoding_rs::{DecoderResult, Encoding, UTF_8};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// How manifest files are decoded and split.
#[derive(Debug, Clone, Copy)]
pub struct ManifestOptions {
    /// Used unless the file starts with a byte order mark.
    pub encoding: &'static Encoding,
    pub skip_blank_lines: bool,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            encoding: UTF_8,
            skip_blank_lines: false,
        }
    }
}

impl ManifestOptions {
    /// Resolves a WHATWG encoding label such as `utf-8`, `latin1` or `shift_jis`.
    ///
    /// Python-style spellings (`utf_8`, `latin-1`, `utf-8-sig`) are accepted
    /// too. Labels follow WHATWG meaning: `latin1` and `iso-8859-1` decode as
    /// windows-1252.
    pub fn from_label(label: &str, skip_blank_lines: bool) -> Result<Self> {
        let encoding =
            resolve_label(label).with_context(|| format!("unknown encoding: {}", label))?;
        Ok(Self {
            encoding,
            skip_blank_lines,
        })
    }
}

fn resolve_label(label: &str) -> Option<&'static Encoding> {
    let label = label.trim();
    Encoding::for_label(label.as_bytes()).or_else(|| {
        let normalized = label.to_ascii_lowercase().replace('_', "-");
        let normalized = match normalized.as_str() {
            "latin-1" => "latin1",
            // The BOM is sniffed anyway.
            "utf-8-sig" => "utf-8",
            other => other,
        };
        Encoding::for_label(normalized.as_bytes())
    })
}

/// One URL line of a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub manifest: PathBuf,
    /// 1-based line number.
    pub line: usize,
    /// Line content with surrounding whitespace trimmed; may be empty.
    pub url: String,
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.manifest.display(), self.line)
    }
}

/// Output of `decode_manifest`.
#[derive(Debug)]
pub struct Decoded {
    /// Every complete line before the first malformed one.
    pub text: String,
    /// 1-based line holding the first malformed byte sequence.
    pub malformed_line: Option<usize>,
    /// Encoding actually used (a BOM overrides the requested one).
    pub encoding: &'static Encoding,
}

/// Decodes `bytes` strictly: malformed sequences stop decoding instead of
/// turning into U+FFFD, and the line they sit on is dropped.
pub fn decode_manifest(bytes: &[u8], encoding: &'static Encoding) -> Decoded {
    let (encoding, bom_len) = Encoding::for_bom(bytes).unwrap_or((encoding, 0));
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let mut input = &bytes[bom_len..];
    let mut text = String::new();
    loop {
        let needed = decoder
            .max_utf8_buffer_length_without_replacement(input.len())
            .unwrap_or(input.len());
        text.reserve(needed);
        let (result, read) = decoder.decode_to_string_without_replacement(input, &mut text, true);
        input = &input[read..];
        match result {
            DecoderResult::InputEmpty => {
                return Decoded {
                    text,
                    malformed_line: None,
                    encoding,
                }
            }
            DecoderResult::OutputFull => continue,
            DecoderResult::Malformed(_, _) => {
                text.truncate(text.rfind('\n').map_or(0, |i| i + 1));
                let line = text.matches('\n').count() + 1;
                return Decoded {
                    text,
                    malformed_line: Some(line),
                    encoding,
                };
            }
        }
    }
}

/// Splits decoded manifest text into trimmed entries.
pub fn parse_manifest(manifest: &Path, text: &str, skip_blank_lines: bool) -> Vec<ManifestEntry> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, url)| !(skip_blank_lines && url.is_empty()))
        .map(|(line, url)| ManifestEntry {
            manifest: manifest.to_path_buf(),
            line,
            url: url.to_string(),
        })
        .collect()
}

/// Entries read from one manifest file.
#[derive(Debug)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
    /// Why decoding stopped early; `entries` then holds the lines before it.
    pub error: Option<anyhow::Error>,
}

/// Reads, decodes and splits one manifest file.
///
/// Fails only when the file cannot be read. A malformed line ends the
/// manifest there and is reported in `Manifest::error`.
pub fn read_manifest(path: &Path, options: &ManifestOptions) -> Result<Manifest> {
    let bytes = fs::read(path).with_context(|| format!("read manifest {}", path.display()))?;
    let decoded = decode_manifest(&bytes, options.encoding);
    let error = decoded.malformed_line.map(|line| {
        anyhow::anyhow!("line {} is not valid {}", line, decoded.encoding.name())
            .context(format!("decode manifest {}", path.display()))
    });
    Ok(Manifest {
        entries: parse_manifest(path, &decoded.text, options.skip_blank_lines),
        error,
    })
}
