//! Phrase pack adapter: `reading - expression.ext`
//!
//! Usually the file stem is `<reading> - <expression>`, but sometimes both
//! halves are the expression itself, even when it is written in kanji.

use super::scan::AudioFileWalker;
use super::{SourceDescriptor, SourceError};
use crate::db::Entry;
use crate::japanese::is_kana;
use crate::media::relative_file_string;
use tracing::debug;

/// Separates reading and expression in a file stem
pub const NAME_DELIMITER: &str = " - ";

/// Split a file stem into `(expression, reading)`
///
/// Returns None unless the stem contains the delimiter exactly once with
/// text on both sides. When
/// both halves are equal, a kana-only term keeps itself as reading while a
/// term containing kanji gets no reading (any reading will match it).
pub fn parse_file_stem(stem: &str) -> Option<(String, Option<String>)> {
    let parts: Vec<&str> = stem.split(NAME_DELIMITER).collect();
    let [reading, expression] = parts.as_slice() else {
        return None;
    };
    if reading.is_empty() || expression.is_empty() {
        return None;
    }

    if reading == expression {
        if is_kana(reading) {
            Some((reading.to_string(), Some(reading.to_string())))
        } else {
            Some((reading.to_string(), None))
        }
    } else {
        Some((expression.to_string(), Some(reading.to_string())))
    }
}

pub(super) fn collect_entries(descriptor: &SourceDescriptor) -> Result<Vec<Entry>, SourceError> {
    let root = &descriptor.media_dir;
    let mut entries = Vec::new();

    for path in AudioFileWalker::new(&descriptor.id).walk(root)? {
        let Some(relative) = relative_file_string(root, &path) else {
            continue;
        };
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy()) else {
            continue;
        };

        match parse_file_stem(&stem) {
            Some((expression, reading)) => {
                entries.push(Entry::new(expression, reading, &descriptor.id, relative));
            }
            None => {
                debug!(
                    "({}) Skipping file without a single '{}' separator: {}",
                    descriptor.id, NAME_DELIMITER, relative
                );
            }
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reading_and_expression() {
        assert_eq!(
            parse_file_stem("よむ - 読む"),
            Some(("読む".to_string(), Some("よむ".to_string())))
        );
    }

    #[test]
    fn test_kana_only_term() {
        assert_eq!(
            parse_file_stem("ふわふわ - ふわふわ"),
            Some(("ふわふわ".to_string(), Some("ふわふわ".to_string())))
        );
        assert_eq!(
            parse_file_stem("パン - パン"),
            Some(("パン".to_string(), Some("パン".to_string())))
        );
    }

    #[test]
    fn test_kanji_only_term_has_no_reading() {
        assert_eq!(parse_file_stem("読む - 読む"), Some(("読む".to_string(), None)));
    }

    #[test]
    fn test_delimiter_count_must_be_one() {
        assert_eq!(parse_file_stem("読む"), None);
        assert_eq!(parse_file_stem("a - b - c"), None);
        assert_eq!(parse_file_stem("よむ-読む"), None);
    }

    #[test]
    fn test_empty_halves_are_rejected() {
        assert_eq!(parse_file_stem(" - "), None);
        assert_eq!(parse_file_stem("よむ - "), None);
        assert_eq!(parse_file_stem(" - 読む"), None);
    }

    #[test]
    fn test_collect_entries_from_tree() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("y")).unwrap();
        std::fs::write(dir.path().join("y/よむ - 読む.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("読む - 読む.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("no separator.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("よむ - 読む.txt"), b"").unwrap();

        let descriptor = SourceDescriptor {
            id: "jpod".into(),
            media_dir: dir.path().to_path_buf(),
            display: "JPod101".into(),
        };
        let mut entries = collect_entries(&descriptor).unwrap();
        entries.sort_by(|a, b| a.file.cmp(&b.file));

        assert_eq!(
            entries,
            vec![
                Entry::new("読む", Some("よむ".into()), "jpod", "y/よむ - 読む.mp3"),
                Entry::new("読む", None, "jpod", "読む - 読む.mp3"),
            ]
        );
    }
}
