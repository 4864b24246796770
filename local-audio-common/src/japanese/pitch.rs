//! Pitch accent display text
//!
//! Renders a pronunciation as its mora with a downstep marker inserted
//! before the mora where the pitch drops, followed by the accent number,
//! e.g. `ヨ＼ム [1]`.

use super::kana::{hiragana_to_katakana, katakana_to_hiragana};
use super::mora::split_into_mora;

/// Inserted immediately before the mora following the downstep
pub const DOWNSTEP_MARKER: &str = "＼";

/// Joins multiple accent segments and their numbers
pub const SEGMENT_JOINER: &str = "・";

/// One accented word segment of a pronunciation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccentSegment {
    /// Katakana pronunciation, possibly carrying a reading-convention prefix
    pub pronunciation: String,
    /// 1-based positions of devoiced mora
    pub silenced_mora: Vec<i64>,
    /// Mora position after which the pitch drops; 0 means no downstep
    pub pitch_accent: i64,
}

/// Reading conventions that carry a literal prefix inside the pronunciation
struct PrefixRule {
    token: &'static str,
    display: &'static str,
    offset: i64,
}

/// The `（温度・角度）` marker arrives split at the middle dot: the first half
/// is a segment of its own and the second half prefixes the pronunciation.
const SPLIT_MARKER_HEAD: &str = "（温度";

const PREFIX_RULES: &[PrefixRule] = &[
    PrefixRule {
        token: "角度）",
        display: "（温度・角度）",
        offset: -3,
    },
    PrefixRule {
        token: "（回数）",
        display: "（回数）",
        offset: -4,
    },
];

/// Render a mora sequence with silenced mora and a downstep marker
///
/// Silenced positions are 1-based; positions outside the sequence are
/// ignored. Silenced mora are shown in hiragana to set them apart from the
/// surrounding katakana. A `downstep` of 0 (or less) inserts no marker;
/// otherwise the marker is placed before the mora at 0-based index
/// `downstep`, or at the end when the sequence is shorter.
pub fn render_mora(mut mora: Vec<String>, silenced: &[i64], downstep: i64) -> String {
    for &position in silenced {
        if position < 1 {
            continue;
        }
        let index = (position - 1) as usize;
        // known data anomaly: some silenced positions are past the last mora
        if let Some(m) = mora.get_mut(index) {
            *m = katakana_to_hiragana(m);
        }
    }

    if downstep > 0 {
        let index = (downstep as usize).min(mora.len());
        mora.insert(index, DOWNSTEP_MARKER.to_string());
    }

    mora.concat()
}

/// Render the display text for a full accent record
///
/// Segments are joined with `・`, as are their accent numbers:
/// `<prefix><mora>・<mora> [<n>・<n>]`.
pub fn render_accent(segments: &[AccentSegment]) -> String {
    let mut texts = Vec::with_capacity(segments.len());
    let mut numbers = Vec::with_capacity(segments.len());
    let mut prefix = "";

    for segment in segments {
        let mut pronunciation = segment.pronunciation.as_str();
        if pronunciation == SPLIT_MARKER_HEAD {
            continue;
        }

        let mut offset = 0;
        for rule in PREFIX_RULES {
            if let Some(stripped) = pronunciation.strip_prefix(rule.token) {
                pronunciation = stripped;
                prefix = rule.display;
                offset = rule.offset;
                break;
            }
        }

        let mut downstep = segment.pitch_accent;
        // an offset that would go negative is not applied at all
        if downstep + offset >= 0 {
            downstep += offset;
        }

        numbers.push(downstep.to_string());
        texts.push(render_mora(
            split_into_mora(pronunciation),
            &segment.silenced_mora,
            downstep,
        ));
    }

    format!(
        "{}{} [{}]",
        prefix,
        texts.join(SEGMENT_JOINER),
        numbers.join(SEGMENT_JOINER)
    )
}

/// Render a reading in katakana with a downstep marker: `ヨ＼ム [1]`
pub fn render_katakana_pitch(reading: &str, downstep: i64) -> String {
    let mora = split_into_mora(&hiragana_to_katakana(reading));
    format!("{} [{}]", render_mora(mora, &[], downstep), downstep)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(pronunciation: &str, silenced: &[i64], pitch: i64) -> AccentSegment {
        AccentSegment {
            pronunciation: pronunciation.to_string(),
            silenced_mora: silenced.to_vec(),
            pitch_accent: pitch,
        }
    }

    #[test]
    fn test_no_downstep_inserts_no_marker() {
        let text = render_mora(split_into_mora("サクラ"), &[], 0);
        assert_eq!(text, "サクラ");
    }

    #[test]
    fn test_downstep_inserts_one_marker_before_index() {
        let text = render_mora(split_into_mora("ヨム"), &[], 1);
        assert_eq!(text, "ヨ＼ム");
        assert_eq!(text.matches(DOWNSTEP_MARKER).count(), 1);

        let text = render_mora(split_into_mora("キョウト"), &[], 1);
        assert_eq!(text, "キョ＼ウト");
    }

    #[test]
    fn test_downstep_at_end() {
        assert_eq!(render_mora(split_into_mora("ハナ"), &[], 2), "ハナ＼");
        // past the end clamps to the end
        assert_eq!(render_mora(split_into_mora("ハナ"), &[], 5), "ハナ＼");
    }

    #[test]
    fn test_silenced_mora_rendered_in_hiragana() {
        let text = render_mora(split_into_mora("キシャ"), &[1], 0);
        assert_eq!(text, "きシャ");
    }

    #[test]
    fn test_silenced_mora_out_of_range_is_ignored() {
        let text = render_mora(split_into_mora("キシャ"), &[7, 0], 1);
        assert_eq!(text, "キ＼シャ");
    }

    #[test]
    fn test_marker_follows_silencing() {
        let text = render_mora(split_into_mora("シタ"), &[1], 1);
        assert_eq!(text, "し＼タ");
    }

    #[test]
    fn test_render_accent_single_segment() {
        assert_eq!(render_accent(&[segment("ヨム", &[], 1)]), "ヨ＼ム [1]");
    }

    #[test]
    fn test_render_accent_multiple_segments() {
        let text = render_accent(&[segment("ニホン", &[], 2), segment("ゴ", &[], 0)]);
        assert_eq!(text, "ニホ＼ン・ゴ [2・0]");
    }

    #[test]
    fn test_render_accent_count_prefix() {
        let text = render_accent(&[segment("（回数）イッカイ", &[], 4)]);
        assert_eq!(text, "（回数）イッカイ [0]");
    }

    #[test]
    fn test_render_accent_temperature_prefix() {
        let text = render_accent(&[segment("（温度", &[], 0), segment("角度）イチド", &[], 5)]);
        assert_eq!(text, "（温度・角度）イチ＼ド [2]");
    }

    #[test]
    fn test_negative_offset_not_applied() {
        // 2 - 4 would be negative: keep 2
        let text = render_accent(&[segment("（回数）ニカイ", &[], 2)]);
        assert_eq!(text, "（回数）ニカ＼イ [2]");
    }

    #[test]
    fn test_render_katakana_pitch() {
        assert_eq!(render_katakana_pitch("よむ", 1), "ヨ＼ム [1]");
        assert_eq!(render_katakana_pitch("さくら", 0), "サクラ [0]");
    }
}
