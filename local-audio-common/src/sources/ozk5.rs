//! Dictionary export adapter (`index.json` entry list)
//!
//! Entries are reachable by kanji and by kana, so an entry whose kanji
//! differs from its kana is stored under both.

use super::ajt_jp::ajt_display_text;
use super::json::{read_json, NumberOrText};
use super::{SourceDescriptor, SourceError};
use crate::db::Entry;
use crate::media::relative_file_string;
use serde::Deserialize;
use tracing::debug;

const INDEX_FILE: &str = "index.json";

fn default_media_dir() -> String {
    "media".to_string()
}

#[derive(Debug, Deserialize)]
struct Ozk5Index {
    #[serde(default)]
    meta: Ozk5Meta,
    #[serde(default)]
    entries: Vec<Ozk5Entry>,
}

#[derive(Debug, Deserialize)]
struct Ozk5Meta {
    #[serde(default = "default_media_dir")]
    media_dir: String,
}

impl Default for Ozk5Meta {
    fn default() -> Self {
        Self {
            media_dir: default_media_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Ozk5Entry {
    kanji: Option<String>,
    kana: String,
    audio_file: String,
    pitch_number: Option<NumberOrText>,
}

pub(super) fn collect_entries(descriptor: &SourceDescriptor) -> Result<Vec<Entry>, SourceError> {
    let root = &descriptor.media_dir;
    let index: Ozk5Index = read_json(&root.join(INDEX_FILE))?;
    let media = root.join(&index.meta.media_dir);
    let mut entries = Vec::new();

    for entry in &index.entries {
        let path = media.join(&entry.audio_file);
        if !path.is_file() {
            debug!("({}) Missing audio file: {}", descriptor.id, path.display());
            continue;
        }
        let Some(relative) = relative_file_string(root, &path) else {
            continue;
        };

        let kanji = entry.kanji.as_deref().filter(|kanji| !kanji.is_empty());
        let display = ajt_display_text(Some(&entry.kana), entry.pitch_number.as_ref(), None);
        let reading = Some(entry.kana.clone());

        entries.push(
            Entry::new(kanji.unwrap_or(&entry.kana), reading.clone(), &descriptor.id, &relative)
                .with_display(display.clone()),
        );

        if kanji.is_some_and(|kanji| kanji != entry.kana) {
            entries.push(
                Entry::new(&entry.kana, reading, &descriptor.id, relative).with_display(display),
            );
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup(index: serde_json::Value, media_dir: &str, files: &[&str]) -> (TempDir, SourceDescriptor) {
        let dir = TempDir::new().unwrap();
        let media = dir.path().join(media_dir);
        std::fs::create_dir_all(&media).unwrap();
        for file in files {
            std::fs::write(media.join(file), b"").unwrap();
        }
        std::fs::write(dir.path().join(INDEX_FILE), index.to_string()).unwrap();

        let descriptor = SourceDescriptor {
            id: "ozk5".into(),
            media_dir: dir.path().to_path_buf(),
            display: "OZK5 %s".into(),
        };
        (dir, descriptor)
    }

    #[test]
    fn test_kanji_entry_is_stored_under_kana_too() {
        let (_dir, descriptor) = setup(
            json!({
                "meta": {"name": "test", "media_dir": "media"},
                "entries": [
                    {"kanji": "亜", "kana": "あ", "audio_file": "a.aac", "pitch_number": "1"},
                    {"kanji": "", "kana": "ああ", "audio_file": "aa.aac"},
                    {"kanji": "いい", "kana": "いい", "audio_file": "ii.aac", "pitch_number": "?"},
                    {"kanji": "胃", "kana": "い", "audio_file": "missing.aac"}
                ]
            }),
            "media",
            &["a.aac", "aa.aac", "ii.aac"],
        );

        let entries = collect_entries(&descriptor).unwrap();
        let display = Some("ア＼ [1]".to_string());
        assert_eq!(
            entries,
            vec![
                Entry::new("亜", Some("あ".into()), "ozk5", "media/a.aac").with_display(display.clone()),
                Entry::new("あ", Some("あ".into()), "ozk5", "media/a.aac").with_display(display),
                Entry::new("ああ", Some("ああ".into()), "ozk5", "media/aa.aac"),
                Entry::new("いい", Some("いい".into()), "ozk5", "media/ii.aac"),
            ]
        );
    }

    #[test]
    fn test_custom_media_dir() {
        let (_dir, descriptor) = setup(
            json!({
                "meta": {"media_dir": "audio"},
                "entries": [{"kana": "え", "audio_file": "e.aac", "pitch_number": 0}]
            }),
            "audio",
            &["e.aac"],
        );

        let entries = collect_entries(&descriptor).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file, "audio/e.aac");
        assert_eq!(entries[0].display.as_deref(), Some("エ [0]"));
    }
}
