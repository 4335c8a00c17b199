//! Verse windowing over newline-delimited lyrics
//!
//! A verse is one `'\n'`-separated line. Windows are selected with a
//! [`VerseWindow`], never with a row [`Page`](crate::core::models::Page).

use tracing::debug;

use crate::core::models::VerseWindow;

const VERSE_SEPARATOR: char = '\n';

/// Return verses `[start, start + count)` of `lyrics`, clipped to the number
/// of verses and rejoined with newlines.
///
/// A start at or past the last verse yields an empty string. Lyrics without
/// any newline are a single verse, and an empty lyric string is one empty
/// verse.
pub fn window_verses(lyrics: &str, window: VerseWindow) -> String {
    let verses: Vec<&str> = lyrics.split(VERSE_SEPARATOR).collect();

    if window.start >= verses.len() {
        debug!(
            start = window.start,
            verses = verses.len(),
            "Window start exceeds number of verses"
        );
        return String::new();
    }

    let end = window.start.saturating_add(window.count).min(verses.len());
    verses[window.start..end].join("\n")
}

pub fn verse_count(lyrics: &str) -> usize {
    lyrics.split(VERSE_SEPARATOR).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOUR_LINES: &str = "line1\nline2\nline3\nline4";

    #[test]
    fn test_window_inside_lyrics() {
        assert_eq!(window_verses(FOUR_LINES, VerseWindow::new(1, 2)), "line2\nline3");
    }

    #[test]
    fn test_window_is_clipped_at_the_end() {
        assert_eq!(window_verses(FOUR_LINES, VerseWindow::new(3, 5)), "line4");
        assert_eq!(window_verses(FOUR_LINES, VerseWindow::new(0, usize::MAX)), FOUR_LINES);
    }

    #[test]
    fn test_start_past_end_is_empty() {
        assert_eq!(window_verses(FOUR_LINES, VerseWindow::new(10, 2)), "");
        assert_eq!(window_verses(FOUR_LINES, VerseWindow::new(4, 1)), "");
    }

    #[test]
    fn test_zero_count_is_empty() {
        assert_eq!(window_verses(FOUR_LINES, VerseWindow::new(0, 0)), "");
    }

    #[test]
    fn test_empty_and_single_line_lyrics() {
        assert_eq!(window_verses("", VerseWindow::new(0, 3)), "");
        assert_eq!(window_verses("", VerseWindow::new(1, 3)), "");
        assert_eq!(window_verses("solo", VerseWindow::new(0, 3)), "solo");
    }

    #[test]
    fn test_blank_verses_are_preserved() {
        let lyrics = "a\n\nb\n";
        assert_eq!(verse_count(lyrics), 4);
        assert_eq!(window_verses(lyrics, VerseWindow::new(1, 2)), "\nb");
    }
}
