//! File-format sniffing from a filename or storage URI suffix

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    NewlineDelimitedJson,
    Avro,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::NewlineDelimitedJson => "NEWLINE_DELIMITED_JSON",
            Self::Avro => "AVRO",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    #[default]
    None,
    Gzip,
}

impl Compression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Gzip => "GZIP",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a filename says about its contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileFormat {
    pub format: Option<SourceFormat>,
    pub field_delimiter: Option<&'static str>,
    pub compression: Compression,
}

/// Suffix match that needs at least one character before the suffix
fn has_suffix(name: &str, suffix: &str) -> bool {
    name.len() > suffix.len() && name.ends_with(suffix)
}

/// Derive (format, field delimiter, compression) from a filename or URI.
///
/// Matching is case-insensitive. A trailing `.gz` means GZIP, except for
/// Avro which BigQuery never compresses.
pub fn detect_file_format(filename: &str) -> FileFormat {
    let lower = filename.to_ascii_lowercase();

    let gzip = has_suffix(&lower, ".gz");
    let stem = if gzip {
        &lower[..lower.len() - ".gz".len()]
    } else {
        lower.as_str()
    };

    let mut detected = FileFormat {
        compression: if gzip { Compression::Gzip } else { Compression::None },
        ..Default::default()
    };

    if has_suffix(stem, ".csv") {
        detected.format = Some(SourceFormat::Csv);
        detected.field_delimiter = Some(",");
    } else if has_suffix(stem, ".tsv") {
        detected.format = Some(SourceFormat::Csv);
        detected.field_delimiter = Some("\t");
    } else if has_suffix(stem, ".json") {
        detected.format = Some(SourceFormat::NewlineDelimitedJson);
    } else if has_suffix(stem, ".avro") {
        detected.format = Some(SourceFormat::Avro);
        detected.compression = Compression::None;
    }

    detected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(name: &str) -> (Option<SourceFormat>, Option<&'static str>, Compression) {
        let f = detect_file_format(name);
        (f.format, f.field_delimiter, f.compression)
    }

    #[test]
    fn test_plain_suffixes() {
        assert_eq!(detect("x.csv"), (Some(SourceFormat::Csv), Some(","), Compression::None));
        assert_eq!(detect("x.tsv"), (Some(SourceFormat::Csv), Some("\t"), Compression::None));
        assert_eq!(
            detect("x.json"),
            (Some(SourceFormat::NewlineDelimitedJson), None, Compression::None)
        );
        assert_eq!(detect("x.avro"), (Some(SourceFormat::Avro), None, Compression::None));
    }

    #[test]
    fn test_gzip_suffixes() {
        assert_eq!(detect("x.csv.gz"), (Some(SourceFormat::Csv), Some(","), Compression::Gzip));
        assert_eq!(detect("x.tsv.gz"), (Some(SourceFormat::Csv), Some("\t"), Compression::Gzip));
        assert_eq!(
            detect("x.json.gz"),
            (Some(SourceFormat::NewlineDelimitedJson), None, Compression::Gzip)
        );
        assert_eq!(detect("x.avro.gz"), (Some(SourceFormat::Avro), None, Compression::None));
    }

    #[test]
    fn test_uris_and_case() {
        assert_eq!(
            detect("gs://bucket/path/EXPORT-*.CSV.GZ"),
            (Some(SourceFormat::Csv), Some(","), Compression::Gzip)
        );
        assert_eq!(detect("gs://bucket/data.Json").0, Some(SourceFormat::NewlineDelimitedJson));
    }

    #[test]
    fn test_unknown_suffix() {
        assert_eq!(detect("x.txt"), (None, None, Compression::None));
        assert_eq!(detect("x.parquet.gz"), (None, None, Compression::Gzip));
        assert_eq!(detect(".csv"), (None, None, Compression::None));
        assert_eq!(detect(""), (None, None, Compression::None));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(SourceFormat::NewlineDelimitedJson.to_string(), "NEWLINE_DELIMITED_JSON");
        assert_eq!(Compression::Gzip.as_str(), "GZIP");
    }
}
