use chrono::{NaiveDateTime, Utc};
use std::path::{Path, PathBuf};

/// Generate a timestamped metrics filename: {prefix}_{YYYYmmdd_HHMMSS}.{extension}
pub fn generate_metrics_filename(prefix: &str, extension: &str) -> String {
    generate_metrics_filename_at(prefix, extension, Utc::now().naive_utc())
}

pub fn generate_metrics_filename_at(
    prefix: &str,
    extension: &str,
    timestamp: NaiveDateTime,
) -> String {
    format!(
        "{}_{}.{}",
        prefix,
        timestamp.format("%Y%m%d_%H%M%S"),
        extension
    )
}

/// Pick a path inside `dir` that does not exist yet, appending a counter on collision
pub fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, extension) = match filename.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (filename, None),
    };

    let mut counter = 1;
    loop {
        let name = match extension {
            Some(ext) => format!("{}_{}.{}", stem, counter, ext),
            None => format!("{}_{}", stem, counter),
        };
        let candidate = dir.join(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_generate_metrics_filename_at() {
        let ts = NaiveDate::from_ymd_opt(2025, 11, 4)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap();

        assert_eq!(
            generate_metrics_filename_at("verification", "json", ts),
            "verification_20251104_090507.json"
        );
    }

    #[test]
    fn test_generate_metrics_filename() {
        let filename = generate_metrics_filename("verification", "txt");

        assert!(filename.starts_with("verification_"));
        assert!(filename.ends_with(".txt"));
        // verification_ + YYYYmmdd_HHMMSS + .txt
        assert_eq!(filename.len(), "verification_".len() + 15 + ".txt".len());
    }

    #[test]
    fn test_unique_path_appends_counter() {
        let dir = TempDir::new().unwrap();
        let first = unique_path(dir.path(), "verification_20251104_090507.json");
        std::fs::write(&first, "{}").unwrap();

        let second = unique_path(dir.path(), "verification_20251104_090507.json");
        assert_ne!(first, second);
        assert!(second
            .to_string_lossy()
            .ends_with("verification_20251104_090507_1.json"));
    }
}
