use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid regex"));

/// Lyrics as they are saved: NFC, no trailing spaces, at most one blank
/// line between stanzas and none around the text.
///
/// Scraped lyrics carry runs of empty lines where `<br>` tags were stacked,
/// and sites mix precomposed and combining accents.
pub fn tidy_lyrics(lyrics: &str) -> String {
    let nfc: String = lyrics.nfc().collect();
    let mut stanzas: Vec<&str> = Vec::new();
    let mut pending_break = false;

    for line in nfc.lines().map(str::trim_end) {
        if line.is_empty() {
            pending_break = !stanzas.is_empty();
            continue;
        }
        if pending_break {
            stanzas.push("");
            pending_break = false;
        }
        stanzas.push(line);
    }

    stanzas.join("\n")
}

/// File-system safe form of a name: accents folded to ASCII, punctuation
/// removed, runs of spaces and hyphens turned into a single `-`.
pub fn slugify(input: &str) -> String {
    let ascii: String = input.nfkd().filter(char::is_ascii).collect();
    let cleaned = NON_WORD.replace_all(&ascii, "");
    SEPARATORS.replace_all(cleaned.trim(), "-").into_owned()
}
