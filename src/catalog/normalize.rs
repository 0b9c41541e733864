//! Filename normalizer
//!
//! Turns a release-style file name such as `The.Matrix.1999.1080p.mkv` into
//! a readable title and an optional year.

use crate::catalog::{MAX_YEAR, MIN_YEAR};
use regex::Regex;
use std::sync::LazyLock;

/// Quality, source, codec and audio tags removed from titles
///
/// Written in their post-separator form: `WEB-DL` becomes `web dl` and
/// `5.1` becomes `5 1` once `.`, `_` and `-` have been turned into spaces.
const JUNK_TOKENS: &[&str] = &[
    "2160p", "1080p", "720p", "480p", "4k", "uhd", "bluray", "blu ray", "brrip", "bdrip",
    "dvdrip", "web dl", "webdl", "webrip", "hdrip", "hdtv", "remux", "x264", "x265", "h264",
    "h265", "hevc", "10bit", "hdr", "dts", "ac3", "aac", "ddp5 1", "ddp", "atmos", "5 1", "7 1",
];

static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:19|20)\d{2}").unwrap());

static RE_JUNK: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = JUNK_TOKENS
        .iter()
        .map(|token| regex::escape(token))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).unwrap()
});

static RE_GROUPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)").unwrap());

static RE_STRAY_BRACKETS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\[\]()]").unwrap());

static RE_SPACE_COLLAPSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalizes a raw (already percent-decoded) file name into `(title, year)`
///
/// 1. Strip the file extension.
/// 2. Find a standalone 4-digit year in `1900..=2099`; the title is the text
///    before it and everything from the year onward is discarded.
/// 3. Turn `.`, `_` and `-` into spaces.
/// 4. Remove quality/codec/audio tags (whole word, case-insensitive).
/// 5. Remove `[...]` and `(...)` groups and any unmatched bracket.
/// 6. Collapse whitespace and trim.
///
/// A missing year is a valid outcome. If the text before the first year is
/// empty after cleanup (`2012 (2009).mkv`), later year tokens are tried; if
/// none leaves a title, the first token is the year and the whole name is
/// the title.
///
/// # Examples
///
/// ```
/// use dirlist_catalog::normalize_filename;
///
/// let (title, year) = normalize_filename("The.Matrix.1999.1080p.mkv");
/// assert_eq!(title, "The Matrix");
/// assert_eq!(year, Some(1999));
/// ```
pub fn normalize_filename(raw: &str) -> (String, Option<u16>) {
    let stem = strip_extension(raw);
    let mut first_year = None;

    for (start, year) in year_tokens(stem) {
        let title = clean_title(&stem[..start]);
        if !title.is_empty() {
            return (title, Some(year));
        }
        first_year.get_or_insert(year);
    }

    (clean_title(stem), first_year)
}

/// Removes a trailing `.ext` (1 to 5 ASCII alphanumerics) from a file name
pub fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        }
        _ => name,
    }
}

/// Yields `(byte offset, year)` for every standalone year token
///
/// A token is standalone when it is not glued to another letter or digit;
/// `_` counts as a separator so `The_Matrix_1999` is recognized.
fn year_tokens(text: &str) -> impl Iterator<Item = (usize, u16)> + '_ {
    RE_YEAR.find_iter(text).filter_map(move |m| {
        let glued_before = text[..m.start()]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric());
        let glued_after = text[m.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric());
        if glued_before || glued_after {
            return None;
        }

        let year: u16 = m.as_str().parse().ok()?;
        (MIN_YEAR..=MAX_YEAR)
            .contains(&year)
            .then_some((m.start(), year))
    })
}

/// Applies steps 3 to 6 to a title fragment
fn clean_title(fragment: &str) -> String {
    let spaced: String = fragment
        .chars()
        .map(|c| if matches!(c, '.' | '_' | '-') { ' ' } else { c })
        .collect();

    let without_junk = RE_JUNK.replace_all(&spaced, " ");
    let without_groups = RE_GROUPS.replace_all(&without_junk, " ");
    let without_brackets = RE_STRAY_BRACKETS.replace_all(&without_groups, " ");

    RE_SPACE_COLLAPSE
        .replace_all(&without_brackets, " ")
        .trim()
        .to_string()
}
