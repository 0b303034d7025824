//! Filename descriptor parsing.
//!
//! Input files carry their identifying fields in the base name:
//! `<tag>_<catalogId>_<objectName>_<satelliteId>_<status>_<epochSeconds>_<classification>.txt`

use crate::constants::FILENAME_TOKEN_COUNT;
use crate::error::{EphemerisError, Result};
use crate::models::{FileDescriptor, OperationalStatus};
use std::path::Path;
use tracing::debug;

/// Decode the descriptor fields from a file path's base name
pub fn parse_file_descriptor(path: &Path) -> Result<FileDescriptor> {
    let malformed = |reason: String| EphemerisError::MalformedFilename {
        path: path.to_path_buf(),
        reason,
    };

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| malformed("file name is missing or not valid UTF-8".to_string()))?;

    let tokens: Vec<&str> = stem.split('_').collect();
    if tokens.len() != FILENAME_TOKEN_COUNT {
        return Err(malformed(format!(
            "expected {} underscore-delimited tokens, found {}",
            FILENAME_TOKEN_COUNT,
            tokens.len()
        )));
    }

    if let Some(position) = tokens.iter().position(|t| t.trim().is_empty()) {
        return Err(malformed(format!("token {} is empty", position + 1)));
    }

    let [tag, catalog_id, object_name, satellite_id, status, epoch, classification] =
        [0, 1, 2, 3, 4, 5, 6].map(|i| tokens[i]);

    let operational_status = OperationalStatus::from_token(status)
        .ok_or_else(|| malformed(format!("unknown operational status '{}'", status)))?;

    let epoch_unix_seconds = epoch
        .parse::<i64>()
        .map_err(|_| malformed(format!("epoch '{}' is not an integer", epoch)))?;

    debug!(
        "Parsed filename {}: catalog_id={}, object={}, status={}",
        stem,
        catalog_id,
        object_name,
        operational_status.as_str()
    );

    Ok(FileDescriptor {
        tag: tag.to_string(),
        catalog_id: catalog_id.to_string(),
        object_name: object_name.to_string(),
        satellite_id: satellite_id.to_string(),
        operational_status,
        epoch_unix_seconds,
        classification: classification.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE: &str =
        "MEME_44714_STARLINK-1008_1851109_Operational_1404299400_UNCLASSIFIED.txt";

    #[test]
    fn test_parse_well_formed_filename() {
        let descriptor = parse_file_descriptor(&PathBuf::from("/data/in").join(SAMPLE)).unwrap();

        assert_eq!(descriptor.tag, "MEME");
        assert_eq!(descriptor.catalog_id, "44714");
        assert_eq!(descriptor.object_name, "STARLINK-1008");
        assert_eq!(descriptor.satellite_id, "1851109");
        assert_eq!(
            descriptor.operational_status,
            OperationalStatus::Operational
        );
        assert_eq!(descriptor.epoch_unix_seconds, 1404299400);
        assert_eq!(descriptor.classification, "UNCLASSIFIED");
    }

    #[test]
    fn test_too_few_tokens() {
        let path = PathBuf::from("MEME_44714_STARLINK-1008_Operational.txt");
        match parse_file_descriptor(&path) {
            Err(EphemerisError::MalformedFilename { path: p, reason }) => {
                assert_eq!(p, path);
                assert!(reason.contains("found 4"));
            }
            other => panic!("Expected MalformedFilename, got {:?}", other),
        }
    }

    #[test]
    fn test_too_many_tokens() {
        let path = PathBuf::from("A_B_C_D_Operational_1_E_F.txt");
        assert!(matches!(
            parse_file_descriptor(&path),
            Err(EphemerisError::MalformedFilename { .. })
        ));
    }

    #[test]
    fn test_unknown_status() {
        let path = PathBuf::from("MEME_44714_STARLINK-1008_1851109_Retired_1404299400_UNCLASSIFIED.txt");
        match parse_file_descriptor(&path) {
            Err(EphemerisError::MalformedFilename { reason, .. }) => {
                assert!(reason.contains("Retired"));
            }
            other => panic!("Expected MalformedFilename, got {:?}", other),
        }
    }

    #[test]
    fn test_non_integer_epoch() {
        let path = PathBuf::from("MEME_44714_STARLINK-1008_1851109_Operational_soon_UNCLASSIFIED.txt");
        assert!(matches!(
            parse_file_descriptor(&path),
            Err(EphemerisError::MalformedFilename { .. })
        ));
    }

    #[test]
    fn test_empty_token() {
        let path = PathBuf::from("MEME__STARLINK-1008_1851109_Operational_1404299400_UNCLASSIFIED.txt");
        assert!(matches!(
            parse_file_descriptor(&path),
            Err(EphemerisError::MalformedFilename { .. })
        ));
    }
}
