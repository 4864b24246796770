//! Pitch accent dictionary adapter (`entries.json` + `audio/`)
//!
//! Each entry carries a kana reading, its kanji spellings, spellings that
//! are explicitly not used, accent records (one audio file each) and
//! subentries. Subentries are either a named sub-headword or a numeral
//! section for counters, which expands into numeral-prefixed headwords.

use super::json::{read_json, NumberOrText};
use super::{SourceDescriptor, SourceError};
use crate::db::Entry;
use crate::japanese::{is_kana, render_accent, AccentSegment};
use crate::media::relative_file_string;
use serde::Deserialize;
use tracing::{debug, warn};

const ENTRIES_FILE: &str = "entries.json";
const AUDIO_DIR: &str = "audio";

/// Separates spellings inside one headword string
const HEADWORD_DELIMITER: &str = "，";
/// Separates counter spellings in numeral sections
const COUNTER_DELIMITER: &str = "・";

/// Counter word meaning "plain integer": the numeral alone is the headword
const PLAIN_INTEGER: &str = "整数";
/// The irregular interrogative numeral and its headword form
const INTERROGATIVE_NUMBER: &str = "何［ナン］";
const INTERROGATIVE_NUMERAL: &str = "何";

const KANJI_DIGITS: [&str; 10] = ["零", "一", "二", "三", "四", "五", "六", "七", "八", "九"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NhkEntry {
    kana: String,
    #[serde(default)]
    kanji: Vec<String>,
    #[serde(default)]
    kanji_not_used: Vec<String>,
    #[serde(default)]
    accents: Vec<NhkAccent>,
    #[serde(default)]
    subentries: Vec<NhkSubentry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NhkAccent {
    sound_file: Option<String>,
    #[serde(default)]
    accent: Vec<NhkSegment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NhkSegment {
    pronunciation: String,
    #[serde(default)]
    silenced_mora: Vec<i64>,
    pitch_accent: NumberOrText,
}

#[derive(Debug, Deserialize)]
struct NhkSubentry {
    head: Option<String>,
    number: Option<NumberOrText>,
    #[serde(default)]
    accents: Vec<NhkAccent>,
}

/// Kanji numeral for 0..=100, 1000 and 10000
pub fn kanji_numeral(n: i64) -> Option<String> {
    match n {
        0..=9 => Some(KANJI_DIGITS[n as usize].to_string()),
        10..=99 => {
            let (tens, ones) = (n / 10, n % 10);
            let mut numeral = String::new();
            if tens > 1 {
                numeral.push_str(KANJI_DIGITS[tens as usize]);
            }
            numeral.push('十');
            if ones > 0 {
                numeral.push_str(KANJI_DIGITS[ones as usize]);
            }
            Some(numeral)
        }
        100 => Some("百".to_string()),
        1000 => Some("千".to_string()),
        10000 => Some("一万".to_string()),
        _ => None,
    }
}

fn to_fullwidth_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => char::from_u32('０' as u32 + d).unwrap_or(c),
            None => c,
        })
        .collect()
}

/// Numeral prefixes a numeral section expands into
///
/// `何［ナン］` gives `何`; integers up to 100 give the full-width digit form
/// and the kanji numeral; 1000 and 10000 only the kanji numeral. Anything
/// else gives nothing.
pub fn numeral_prefixes(number: &NumberOrText) -> Vec<String> {
    if number.raw() == INTERROGATIVE_NUMBER {
        return vec![INTERROGATIVE_NUMERAL.to_string()];
    }

    let Some(n) = number.as_integer() else {
        return Vec::new();
    };
    let Some(kanji) = kanji_numeral(n) else {
        return Vec::new();
    };

    if n > 100 {
        vec![kanji]
    } else {
        vec![to_fullwidth_digits(&number.raw()), kanji]
    }
}

/// Split headword strings on a delimiter, dropping blank pieces
fn parse_headwords(headwords: &[String], delimiter: &str) -> Vec<String> {
    headwords
        .iter()
        .flat_map(|headword| headword.split(delimiter))
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(String::from)
        .collect()
}

struct AccentAudio {
    file: String,
    display: String,
}

struct Collector<'a> {
    descriptor: &'a SourceDescriptor,
    entries: Vec<Entry>,
}

impl<'a> Collector<'a> {
    fn push(&mut self, expression: String, reading: Option<String>, audio: &AccentAudio) {
        self.entries.push(
            Entry::new(expression, reading, &self.descriptor.id, &audio.file)
                .with_display(Some(audio.display.clone())),
        );
    }

    /// Audio file and display text of an accent record, if its file exists
    fn accent_audio(&self, accent: &NhkAccent) -> Option<AccentAudio> {
        let sound_file = accent.sound_file.as_deref()?;
        let root = &self.descriptor.media_dir;
        let path = root.join(AUDIO_DIR).join(sound_file);
        if !path.is_file() {
            debug!("({}) Missing audio file: {}", self.descriptor.id, path.display());
            return None;
        }
        let file = relative_file_string(root, &path)?;

        let mut segments = Vec::with_capacity(accent.accent.len());
        for segment in &accent.accent {
            let Some(pitch_accent) = segment.pitch_accent.as_integer() else {
                warn!(
                    "({}) Non-integer pitch accent {:?} for {}",
                    self.descriptor.id, segment.pitch_accent, sound_file
                );
                return None;
            };
            segments.push(AccentSegment {
                pronunciation: segment.pronunciation.clone(),
                silenced_mora: segment.silenced_mora.clone(),
                pitch_accent,
            });
        }

        Some(AccentAudio {
            file,
            display: render_accent(&segments),
        })
    }

    fn add_entry(&mut self, entry: &NhkEntry) {
        let reading = &entry.kana;
        let mut expressions = parse_headwords(&entry.kanji, HEADWORD_DELIMITER);
        let excluded = parse_headwords(&entry.kanji_not_used, HEADWORD_DELIMITER);
        expressions.retain(|expression| !excluded.iter().any(|unused| expression.contains(unused.as_str())));

        for accent in &entry.accents {
            let Some(audio) = self.accent_audio(accent) else {
                continue;
            };
            if expressions.is_empty() {
                self.push(reading.clone(), Some(reading.clone()), &audio);
            }
            for expression in &expressions {
                self.push(expression.clone(), Some(reading.clone()), &audio);
            }
        }

        for subentry in &entry.subentries {
            if let Some(head) = &subentry.head {
                self.add_named_subentry(head, subentry);
            } else if let Some(number) = &subentry.number {
                self.add_numeral_subentry(entry, number, subentry);
            } else {
                debug!("({}) Skipping subentry without head or number of {}", self.descriptor.id, reading);
            }
        }
    }

    fn add_named_subentry(&mut self, head: &str, subentry: &NhkSubentry) {
        let heads = parse_headwords(&[head.to_string()], HEADWORD_DELIMITER);
        for accent in &subentry.accents {
            let Some(audio) = self.accent_audio(accent) else {
                continue;
            };
            for head in &heads {
                let reading = is_kana(head).then(|| head.clone());
                self.push(head.clone(), reading, &audio);
            }
        }
    }

    fn add_numeral_subentry(&mut self, entry: &NhkEntry, number: &NumberOrText, subentry: &NhkSubentry) {
        let counters: Vec<String> = parse_headwords(&entry.kanji, COUNTER_DELIMITER)
            .into_iter()
            .map(|counter| if counter == PLAIN_INTEGER { String::new() } else { counter })
            .collect();
        let numerals = numeral_prefixes(number);
        if numerals.is_empty() {
            warn!("({}) Unsupported numeral {:?} under {}", self.descriptor.id, number, entry.kana);
            return;
        }

        let bare_counter = if entry.kana == PLAIN_INTEGER { "" } else { entry.kana.as_str() };

        for accent in &subentry.accents {
            let Some(audio) = self.accent_audio(accent) else {
                continue;
            };
            if counters.is_empty() {
                for numeral in &numerals {
                    self.push(format!("{}{}", numeral, bare_counter), None, &audio);
                }
            }
            for counter in &counters {
                for numeral in &numerals {
                    self.push(format!("{}{}", numeral, counter), None, &audio);
                }
            }
        }
    }
}

pub(super) fn collect_entries(descriptor: &SourceDescriptor) -> Result<Vec<Entry>, SourceError> {
    let entries_file = descriptor.media_dir.join(ENTRIES_FILE);
    let documents: Vec<serde_json::Value> = read_json(&entries_file)?;

    let mut collector = Collector {
        descriptor,
        entries: Vec::new(),
    };

    for (index, document) in documents.into_iter().enumerate() {
        match serde_json::from_value::<NhkEntry>(document) {
            Ok(entry) => collector.add_entry(&entry),
            Err(e) => warn!("({}) Skipping malformed entry #{}: {}", descriptor.id, index, e),
        }
    }

    Ok(collector.entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;
    use tempfile::TempDir;

    fn setup(entries: serde_json::Value, audio_files: &[&str]) -> (TempDir, SourceDescriptor) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(AUDIO_DIR)).unwrap();
        for file in audio_files {
            std::fs::write(dir.path().join(AUDIO_DIR).join(file), b"").unwrap();
        }
        std::fs::write(dir.path().join(ENTRIES_FILE), entries.to_string()).unwrap();

        let descriptor = SourceDescriptor {
            id: "nhk16".into(),
            media_dir: dir.path().to_path_buf(),
            display: "NHK16 %s".into(),
        };
        (dir, descriptor)
    }

    fn accent(file: &str, pronunciation: &str, pitch: i64) -> serde_json::Value {
        json!({
            "soundFile": file,
            "accent": [{"pronunciation": pronunciation, "silencedMora": [], "pitchAccent": pitch}]
        })
    }

    fn summary(entries: &[Entry]) -> Vec<(String, Option<String>, String)> {
        entries
            .iter()
            .map(|e| (e.expression.clone(), e.reading.clone(), e.file.clone()))
            .collect()
    }

    #[test]
    fn test_kanji_numerals() {
        assert_eq!(kanji_numeral(0).as_deref(), Some("零"));
        assert_eq!(kanji_numeral(7).as_deref(), Some("七"));
        assert_eq!(kanji_numeral(10).as_deref(), Some("十"));
        assert_eq!(kanji_numeral(11).as_deref(), Some("十一"));
        assert_eq!(kanji_numeral(20).as_deref(), Some("二十"));
        assert_eq!(kanji_numeral(99).as_deref(), Some("九十九"));
        assert_eq!(kanji_numeral(100).as_deref(), Some("百"));
        assert_eq!(kanji_numeral(1000).as_deref(), Some("千"));
        assert_eq!(kanji_numeral(10000).as_deref(), Some("一万"));
        assert_eq!(kanji_numeral(101), None);
        assert_eq!(kanji_numeral(-1), None);
    }

    #[test]
    fn test_numeral_prefixes() {
        let interrogative = NumberOrText::Text("何［ナン］".into());
        assert_eq!(numeral_prefixes(&interrogative), vec!["何"]);

        assert_eq!(numeral_prefixes(&NumberOrText::Text("3".into())), vec!["３", "三"]);
        assert_eq!(numeral_prefixes(&NumberOrText::Number(12)), vec!["１２", "十二"]);
        assert_eq!(numeral_prefixes(&NumberOrText::Number(1000)), vec!["千"]);
        assert!(numeral_prefixes(&NumberOrText::Number(150)).is_empty());
    }

    #[test]
    fn test_parse_headwords() {
        let headwords = vec!["読む，詠む".to_string(), " ".to_string()];
        assert_eq!(parse_headwords(&headwords, "，"), vec!["読む", "詠む"]);
    }

    #[test]
    fn test_entry_per_spelling_with_display() {
        let (_dir, descriptor) = setup(
            json!([{
                "kana": "ヨム",
                "kanji": ["読む，詠む"],
                "kanjiNotUsed": [],
                "accents": [accent("yomu.aac", "ヨム", 1)],
                "subentries": []
            }]),
            &["yomu.aac"],
        );

        let entries = collect_entries(&descriptor).unwrap();
        assert_eq!(
            summary(&entries),
            vec![
                ("読む".into(), Some("ヨム".into()), "audio/yomu.aac".into()),
                ("詠む".into(), Some("ヨム".into()), "audio/yomu.aac".into()),
            ]
        );
        assert!(entries.iter().all(|e| e.display.as_deref() == Some("ヨ＼ム [1]")));
        assert!(entries.iter().all(|e| e.source == "nhk16"));
    }

    #[test]
    fn test_excluded_spellings_and_bare_reading() {
        let (_dir, descriptor) = setup(
            json!([{
                "kana": "アイ",
                "kanji": ["愛"],
                "kanjiNotUsed": ["愛"],
                "accents": [accent("ai.aac", "アイ", 1)],
                "subentries": []
            }]),
            &["ai.aac"],
        );

        let entries = collect_entries(&descriptor).unwrap();
        assert_eq!(
            summary(&entries),
            vec![("アイ".into(), Some("アイ".into()), "audio/ai.aac".into())]
        );
    }

    #[test]
    fn test_missing_audio_skips_only_that_accent() {
        let (_dir, descriptor) = setup(
            json!([{
                "kana": "ハシ",
                "kanji": ["橋"],
                "accents": [accent("missing.aac", "ハシ", 2), accent("hashi.aac", "ハシ", 2), {"soundFile": null, "accent": []}],
                "subentries": []
            }]),
            &["hashi.aac"],
        );

        let entries = collect_entries(&descriptor).unwrap();
        assert_eq!(
            summary(&entries),
            vec![("橋".into(), Some("ハシ".into()), "audio/hashi.aac".into())]
        );
    }

    #[test]
    fn test_named_subentries() {
        let (_dir, descriptor) = setup(
            json!([{
                "kana": "ハナ",
                "kanji": ["花"],
                "accents": [],
                "subentries": [
                    {"head": "花見，はなみ", "accents": [accent("hanami.aac", "ハナミ", 3)]}
                ]
            }]),
            &["hanami.aac"],
        );

        let entries = collect_entries(&descriptor).unwrap();
        assert_eq!(
            summary(&entries),
            vec![
                ("花見".into(), None, "audio/hanami.aac".into()),
                ("はなみ".into(), Some("はなみ".into()), "audio/hanami.aac".into()),
            ]
        );
    }

    #[test]
    fn test_numeral_subentries_with_counter() {
        let (_dir, descriptor) = setup(
            json!([{
                "kana": "ホン",
                "kanji": ["本"],
                "accents": [],
                "subentries": [
                    {"number": "3", "accents": [accent("3hon.aac", "サンボン", 1)]},
                    {"number": "何［ナン］", "accents": [accent("nanbon.aac", "ナンボン", 1)]}
                ]
            }]),
            &["3hon.aac", "nanbon.aac"],
        );

        let entries = collect_entries(&descriptor).unwrap();
        assert_eq!(
            summary(&entries),
            vec![
                ("３本".into(), None, "audio/3hon.aac".into()),
                ("三本".into(), None, "audio/3hon.aac".into()),
                ("何本".into(), None, "audio/nanbon.aac".into()),
            ]
        );
    }

    #[test]
    fn test_plain_integer_section() {
        let (_dir, descriptor) = setup(
            json!([{
                "kana": "整数",
                "kanji": ["整数"],
                "accents": [],
                "subentries": [{"number": 5, "accents": [accent("5.aac", "ゴ", 1)]}]
            }]),
            &["5.aac"],
        );

        let entries = collect_entries(&descriptor).unwrap();
        assert_eq!(
            summary(&entries),
            vec![
                ("５".into(), None, "audio/5.aac".into()),
                ("五".into(), None, "audio/5.aac".into()),
            ]
        );
    }

    #[test]
    fn test_malformed_entry_is_skipped() {
        let (_dir, descriptor) = setup(
            json!([
                {"kanji": "not a list"},
                {"kana": "ネコ", "kanji": ["猫"], "accents": [accent("neko.aac", "ネコ", 1)], "subentries": []}
            ]),
            &["neko.aac"],
        );

        let entries = collect_entries(&descriptor).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].expression, "猫");
    }

    #[test]
    fn test_missing_entries_file() {
        let descriptor = SourceDescriptor {
            id: "nhk16".into(),
            media_dir: Path::new("/nonexistent/nhk16").to_path_buf(),
            display: "NHK16 %s".into(),
        };
        assert!(matches!(
            collect_entries(&descriptor),
            Err(SourceError::MissingIndex(_))
        ));
    }
}
