use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, info};

use crate::manifest::{ManifestError, ManifestRecord};

/// Parse every record of the manifest at `path`, keeping file order
///
/// Comment (`#`) and whitespace-only lines are skipped and don't count as records. Line numbers
/// in errors are 1-based and refer to the file, skipped lines included.
pub fn parse_manifest<R: ManifestRecord>(path: &Path) -> Result<Vec<R>, ManifestError> {
    info!("Reading manifest at {}", path.display());
    let content = fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => ManifestError::ManifestNotFound { path: path.to_path_buf() },
        _ => ManifestError::Io { path: path.to_path_buf(), source: err },
    })?;

    let samples = parse_records::<R>(&content)?;
    info!("Manifest {} holds {} sample(s)", path.display(), samples.len());
    Ok(samples)
}

pub(crate) fn parse_records<R: ManifestRecord>(content: &str) -> Result<Vec<R>, ManifestError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !is_skipped(line))
        .map(|(i, line)| parse_line::<R>(i + 1, line))
        .collect()
}

fn is_skipped(line: &str) -> bool {
    line.starts_with('#') || line.trim().is_empty()
}

fn parse_line<R: ManifestRecord>(line_number: usize, line: &str) -> Result<R, ManifestError> {
    let fields: Vec<&str> = line.trim().split('\t').collect();
    if fields.len() != R::FIELDS {
        return Err(ManifestError::MalformedRecord {
            line: line_number,
            expected: R::FIELDS,
            found: fields.len(),
        });
    }

    let record = R::from_fields(line_number, &fields)?;
    debug!("Line {line_number}: accepted sample {}", record.label());
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{AlignmentSample, ReadstoreSample};

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let content = "# a comment\n\ns3://bucket/a.bam\tsampleA\t4G\n   \t \n";
        let samples = parse_records::<AlignmentSample>(content).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].label, "sampleA");
    }

    #[test]
    fn records_keep_file_order() {
        let content = "s3://b/1.bam\tone\t1G\n# skip\ns3://b/2.bam\ttwo\t2G\n\nfile:///x/3.bam\tthree\t3G\n";
        let labels: Vec<String> = parse_records::<AlignmentSample>(content)
            .unwrap()
            .into_iter()
            .map(|s| s.label)
            .collect();
        assert_eq!(labels, ["one", "two", "three"]);
    }

    #[test]
    fn extra_field_fails_the_whole_manifest() {
        let content = "s3://b/1.bam\tone\t1G\nbogus\ts3://x/y\tsampleB\t1G\n";
        let err = parse_records::<AlignmentSample>(content).unwrap_err();
        assert!(matches!(err, ManifestError::MalformedRecord { line: 2, expected: 3, found: 4 }));
    }

    #[test]
    fn readstore_lines_need_four_fields() {
        let err = parse_records::<ReadstoreSample>("s3://b/run.tar\trun\t5G\n").unwrap_err();
        assert!(matches!(err, ManifestError::MalformedRecord { line: 1, expected: 4, found: 3 }));
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let samples = parse_records::<ReadstoreSample>("tar\ts3://b/run.tar\trun\t5G\r\n").unwrap();
        assert_eq!(samples[0].size_hint, "5G");
    }

    #[test]
    fn missing_manifest_is_reported() {
        let err = parse_manifest::<AlignmentSample>(Path::new("/definitely/not/here.tsv")).unwrap_err();
        assert!(matches!(err, ManifestError::ManifestNotFound { .. }));
    }
}
