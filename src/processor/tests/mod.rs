//! Integration tests for the processor module
//!
//! Exercises whole batches against temporary directories of generated
//! ephemeris files.


use chrono::{Duration, TimeZone, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File name for the `n`th generated object
pub fn ephemeris_name(n: usize, object: &str) -> String {
    format!(
        "MEME_{}_{}_{}_Operational_{}_UNCLASSIFIED.txt",
        44700 + n,
        object,
        1851100 + n,
        1404299400 + n as i64
    )
}

/// Ephemeris text with `records` records, `record_step` seconds apart,
/// declaring a step size of `declared_step` seconds
pub fn ephemeris_content(records: usize, declared_step: u32, record_step: i64) -> String {
    let start = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
    let mut content = format!(
        "created: 2024-07-01T00:00:00Z ephemeris_source: blend\n\
         ephemeris_start: 2024-07-01T00:00:00Z ephemeris_stop: 2024-07-02T00:00:00Z step_size: {}\n\
         UVW\n",
        declared_step
    );

    for i in 0..records {
        let epoch = start + Duration::seconds(record_step * i as i64);
        content.push_str(&format!(
            "{} {} -4215.2 1203.9 0.51 7.12 -0.44\n",
            epoch.format("%Y%j%H%M%S%.3f"),
            6871.0 + i as f64
        ));
        let terms: Vec<String> = (1..=21).map(|t| format!("{}.0e-6", t)).collect();
        for line in terms.chunks(7) {
            content.push_str(&line.join(" "));
            content.push('\n');
        }
    }
    content
}

/// Input and output directories inside a fresh temp dir
pub fn batch_dirs(temp_dir: &TempDir) -> (PathBuf, PathBuf) {
    let input = temp_dir.path().join("input");
    let output = temp_dir.path().join("output");
    fs::create_dir_all(&input).unwrap();
    (input, output)
}

/// Write `good` valid files and `bad` files whose records drift off the
/// declared step size; returns the names of the bad files
pub fn populate_batch(input: &Path, good: usize, bad: usize) -> Vec<String> {
    for n in 0..good {
        fs::write(
            input.join(ephemeris_name(n, "STARLINK-GOOD")),
            ephemeris_content(5, 60, 60),
        )
        .unwrap();
    }

    let mut bad_names = Vec::new();
    for n in good..good + bad {
        let name = ephemeris_name(n, "STARLINK-DRIFT");
        fs::write(input.join(&name), ephemeris_content(5, 60, 90)).unwrap();
        bad_names.push(name);
    }
    bad_names
}

pub fn output_names(output: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(output)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
