//! Mora segmentation
//!
//! A mora is usually one kana character. Palatalized and extended consonant
//! clusters (きゃ, ファ, ...) and semi-voiced nasal kana written with a
//! combining handakuten (か゚, ...) count as a single mora even though they
//! span two or three characters.

/// Multi-character sequences that form a single mora.
///
/// Not necessarily two characters: き゚ゃ is three (き + U+309A + ゃ).
pub const DIGRAPHS: &[&str] = &[
    "りゃ", "みゃ", "ひゃ", "にゃ", "ちゃ", "しゃ", "きゃ",
    "りゅ", "みゅ", "ひゅ", "にゅ", "ちゅ", "しゅ", "きゅ",
    "りょ", "みょ", "ひょ", "にょ", "ちょ", "しょ", "きょ",
    "ぎゃ", "じゃ", "びゃ", "ぴゃ", "き゚ゃ",
    "ぎゅ", "じゅ", "びゅ", "ぴゅ", "き゚ゅ",
    "ぎょ", "じょ", "びょ", "ぴょ", "き゚ょ",
    "ゔぁ", "ふぁ", "ゔぃ", "うぃ", "ふぃ", "でぃ", "てぃ", "どぅ", "とぅ",
    "ゔぇ", "うぇ", "ふぇ", "ちぇ", "じぇ", "しぇ", "ゔぉ", "うぉ", "ふぉ",
    "リャ", "ミャ", "ヒャ", "ニャ", "チャ", "シャ", "キャ",
    "リュ", "ミュ", "ヒュ", "ニュ", "チュ", "シュ", "キュ",
    "リョ", "ミョ", "ヒョ", "ニョ", "チョ", "ショ", "キョ",
    "ギャ", "ジャ", "ビャ", "ピャ", "キ゚ャ",
    "ギュ", "ジュ", "ビュ", "ピュ", "キ゚ュ",
    "ギョ", "ジョ", "ビョ", "ピョ", "キ゚ョ",
    "ヴァ", "ファ", "ヴィ", "ウィ", "フィ", "ディ", "ティ", "ドゥ", "トゥ",
    "ヴェ", "ウェ", "フェ", "チェ", "ジェ", "シェ", "ヴォ", "ウォ", "フォ",
    "か゚", "き゚", "く゚", "け゚", "こ゚", "カ゚", "キ゚", "ク゚", "ケ゚", "コ゚",
];

/// Longest registered digraph that `text` starts with
fn match_digraph(text: &str) -> Option<&'static str> {
    DIGRAPHS
        .iter()
        .copied()
        .filter(|digraph| text.starts_with(digraph))
        .max_by_key(|digraph| digraph.len())
}

/// Split a kana pronunciation into its mora
///
/// At every position the longest registered digraph wins; otherwise a single
/// character is consumed. Total for any input: the empty string yields an
/// empty list, anything else at least one mora.
///
/// # Examples
/// ```
/// use local_audio_common::japanese::split_into_mora;
///
/// assert_eq!(split_into_mora("キョウ"), vec!["キョ", "ウ"]);
/// assert_eq!(split_into_mora("ヨム"), vec!["ヨ", "ム"]);
/// ```
pub fn split_into_mora(pronunciation: &str) -> Vec<String> {
    let mut mora = Vec::new();
    let mut rest = pronunciation;

    while let Some(first) = rest.chars().next() {
        let len = match match_digraph(rest) {
            Some(digraph) => digraph.len(),
            None => first.len_utf8(),
        };
        mora.push(rest[..len].to_string());
        rest = &rest[len..];
    }

    mora
}
