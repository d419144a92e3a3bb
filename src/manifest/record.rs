use log::warn;
use url::Url;

use crate::manifest::ManifestError;
use crate::sample::{AlignmentSample, ArchiveKind, ReadstoreSample};

/// Schemes the pipelines know how to fetch from. Anything else still parses, with a warning.
pub const KNOWN_SCHEMES: [&str; 6] = ["http", "https", "ftp", "file", "s3", "gnos"];

/// A typed manifest record with a fixed tab-separated layout
pub trait ManifestRecord: Sized {
    /// Number of tab-separated fields in one line
    const FIELDS: usize;

    /// Build a record from exactly `FIELDS` fields taken from 1-based line `line`
    fn from_fields(line: usize, fields: &[&str]) -> Result<Self, ManifestError>;

    fn label(&self) -> &str;
}

/// `URL \t sample_label \t size`
impl ManifestRecord for AlignmentSample {
    const FIELDS: usize = 3;

    fn from_fields(line: usize, fields: &[&str]) -> Result<Self, ManifestError> {
        let [url, label, size] = fields else {
            return Err(ManifestError::MalformedRecord { line, expected: Self::FIELDS, found: fields.len() });
        };

        Ok(AlignmentSample {
            source_url: parse_url(line, url)?,
            label: non_empty(line, "sample_label", label)?,
            size_hint: non_empty(line, "size", size)?,
        })
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// `archive_kind \t URL \t sample_label \t size`
impl ManifestRecord for ReadstoreSample {
    const FIELDS: usize = 4;

    fn from_fields(line: usize, fields: &[&str]) -> Result<Self, ManifestError> {
        let [kind, url, label, size] = fields else {
            return Err(ManifestError::MalformedRecord { line, expected: Self::FIELDS, found: fields.len() });
        };

        let archive_kind: ArchiveKind = kind
            .parse()
            .map_err(|kind| ManifestError::UnrecognizedArchiveKind { line, kind })?;

        Ok(ReadstoreSample {
            archive_kind,
            source_url: parse_url(line, url)?,
            label: non_empty(line, "sample_label", label)?,
            size_hint: non_empty(line, "size", size)?,
        })
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// A URL needs a scheme and something after `scheme:`, both in the manifest text itself
///
/// The text is returned as written; the parsed form is only used for validation.
fn parse_url(line: usize, raw: &str) -> Result<String, ManifestError> {
    let invalid = || ManifestError::InvalidUrl { line, url: raw.to_string() };
    let text = raw.trim();
    match text.split_once(':') {
        Some((scheme, remainder)) if !scheme.is_empty() && !remainder.is_empty() => {}
        _ => return Err(invalid()),
    }

    let url = Url::parse(text).map_err(|_| invalid())?;
    let scheme = url.scheme();
    if !KNOWN_SCHEMES.iter().any(|known| *known == scheme) {
        warn!("Line {line}: URL scheme '{scheme}' is not one of {}", KNOWN_SCHEMES.join(", "));
    }
    Ok(text.to_string())
}

fn non_empty(line: usize, field: &'static str, value: &str) -> Result<String, ManifestError> {
    match value.trim() {
        "" => Err(ManifestError::EmptyField { line, field }),
        v => Ok(v.to_string()),
    }
}
