//! Vendor export adapter (`index.json` + `media/`)
//!
//! The index maps headwords to file keys and file keys to their reading and
//! pitch. Readings may be written in either kana script and pitch numbers
//! are usually strings.

use super::json::{read_json, NumberOrText};
use super::{SourceDescriptor, SourceError};
use crate::db::Entry;
use crate::japanese::render_katakana_pitch;
use crate::media::relative_file_string;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

const INDEX_FILE: &str = "index.json";
const MEDIA_DIR: &str = "media";
const UNKNOWN_PITCH: &str = "?";

#[derive(Debug, Deserialize)]
struct AjtIndex {
    #[serde(default)]
    headwords: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    files: HashMap<String, AjtFile>,
}

#[derive(Debug, Deserialize)]
struct AjtFile {
    kana_reading: Option<String>,
    pitch_number: Option<NumberOrText>,
    pitch_pattern: Option<String>,
}

/// Display text for a reading and pitch, e.g. `ヨ＼ム [1]`
///
/// Returns None without a reading or for the unknown pitch `?`. A pitch
/// number that is not an integer (such as `0+2`) falls back to the literal
/// pitch pattern when one is given.
pub fn ajt_display_text(
    reading: Option<&str>,
    pitch_number: Option<&NumberOrText>,
    pitch_pattern: Option<&str>,
) -> Option<String> {
    let reading = reading?;
    let Some(pitch_number) = pitch_number else {
        return pitch_pattern.map(String::from);
    };
    if pitch_number.raw() == UNKNOWN_PITCH {
        return None;
    }

    match pitch_number.as_integer() {
        Some(downstep) => Some(render_katakana_pitch(reading, downstep)),
        None => {
            if pitch_pattern.is_none() {
                debug!("Pitch number is not an integer: {:?}", pitch_number);
            }
            pitch_pattern.map(String::from)
        }
    }
}

pub(super) fn collect_entries(descriptor: &SourceDescriptor) -> Result<Vec<Entry>, SourceError> {
    let root = &descriptor.media_dir;
    let index: AjtIndex = read_json(&root.join(INDEX_FILE))?;
    let mut entries = Vec::new();
    let mut unindexed = 0usize;

    for (expression, file_keys) in &index.headwords {
        for key in file_keys {
            let path = root.join(MEDIA_DIR).join(key);
            if !path.is_file() {
                continue;
            }
            let Some(file) = index.files.get(key) else {
                unindexed += 1;
                continue;
            };
            let Some(relative) = relative_file_string(root, &path) else {
                continue;
            };

            let display = ajt_display_text(
                file.kana_reading.as_deref(),
                file.pitch_number.as_ref(),
                file.pitch_pattern.as_deref(),
            );
            entries.push(
                Entry::new(expression, file.kana_reading.clone(), &descriptor.id, relative)
                    .with_display(display),
            );
        }
    }

    if unindexed > 0 {
        warn!("({}) {} headword files have no file record", descriptor.id, unindexed);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn number(text: &str) -> NumberOrText {
        NumberOrText::Text(text.into())
    }

    #[test]
    fn test_display_from_hiragana_reading() {
        assert_eq!(
            ajt_display_text(Some("よむ"), Some(&number("1")), None).as_deref(),
            Some("ヨ＼ム [1]")
        );
        assert_eq!(
            ajt_display_text(Some("サクラ"), Some(&NumberOrText::Number(0)), None).as_deref(),
            Some("サクラ [0]")
        );
    }

    #[test]
    fn test_display_fallbacks() {
        assert_eq!(ajt_display_text(None, Some(&number("1")), None), None);
        assert_eq!(ajt_display_text(Some("よむ"), Some(&number("?")), Some("LH")), None);
        assert_eq!(
            ajt_display_text(Some("よむ"), Some(&number("0+2")), Some("LHL")).as_deref(),
            Some("LHL")
        );
        assert_eq!(ajt_display_text(Some("よむ"), Some(&number("0+2")), None), None);
    }

    #[test]
    fn test_collect_headword_files() {
        let dir = TempDir::new().unwrap();
        let media = dir.path().join(MEDIA_DIR);
        std::fs::create_dir_all(&media).unwrap();
        for file in ["yomu.ogg", "hashi.ogg", "orphan.ogg"] {
            std::fs::write(media.join(file), b"").unwrap();
        }

        let index = json!({
            "meta": {"version": 1},
            "headwords": {
                "読む": ["yomu.ogg", "absent.ogg"],
                "橋": ["hashi.ogg"],
                "孤児": ["orphan.ogg"]
            },
            "files": {
                "yomu.ogg": {"kana_reading": "よむ", "pitch_number": "1"},
                "hashi.ogg": {"pitch_number": "2"},
                "absent.ogg": {"kana_reading": "よむ", "pitch_number": "1"}
            }
        });
        std::fs::write(dir.path().join(INDEX_FILE), index.to_string()).unwrap();

        let descriptor = SourceDescriptor {
            id: "shinmeikai8".into(),
            media_dir: dir.path().to_path_buf(),
            display: "SMK8 %s".into(),
        };
        let entries = collect_entries(&descriptor).unwrap();

        assert_eq!(
            entries,
            vec![
                Entry::new("橋", None, "shinmeikai8", "media/hashi.ogg"),
                Entry::new("読む", Some("よむ".into()), "shinmeikai8", "media/yomu.ogg")
                    .with_display(Some("ヨ＼ム [1]".into())),
            ]
        );
    }
}
