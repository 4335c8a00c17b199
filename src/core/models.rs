//! Song records and the query descriptors used against them
//!
//! Row pagination (`Page`) and verse windowing (`VerseWindow`) are separate
//! types. Both are a start/length pair, but they select different things: a
//! `Page` selects songs out of a result set, a `VerseWindow` selects lines out
//! of one song's lyrics.

use serde::{Deserialize, Serialize};

pub type SongId = i64;

pub const DEFAULT_PAGE_LIMIT: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub group: String,
    pub lyrics: String,
    pub link: String,
    pub release_date: String,
}

/// A song that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSong {
    pub title: String,
    pub group: String,
    #[serde(default)]
    pub lyrics: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub release_date: String,
}

impl NewSong {
    pub fn new(title: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            group: group.into(),
            ..Self::default()
        }
    }

    pub fn lyrics(mut self, lyrics: impl Into<String>) -> Self {
        self.lyrics = lyrics.into();
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    pub fn release_date(mut self, release_date: impl Into<String>) -> Self {
        self.release_date = release_date.into();
        self
    }

    pub(crate) fn into_song(self, id: SongId) -> Song {
        Song {
            id,
            title: self.title,
            group: self.group,
            lyrics: self.lyrics,
            link: self.link,
            release_date: self.release_date,
        }
    }
}

/// Field-level update for an existing song.
///
/// `None` leaves the stored value untouched. `Some(value)` overwrites it, and
/// `Some(String::new())` clears it. Title and group identify the song and
/// cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongPatch {
    pub id: SongId,
    pub lyrics: Option<String>,
    pub link: Option<String>,
    pub release_date: Option<String>,
}

impl SongPatch {
    pub fn new(id: SongId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Build a patch from a full record where an empty field means "keep".
    pub fn from_song(song: &Song) -> Self {
        Self {
            id: song.id,
            lyrics: non_empty(&song.lyrics),
            link: non_empty(&song.link),
            release_date: non_empty(&song.release_date),
        }
    }

    pub fn lyrics(mut self, lyrics: impl Into<String>) -> Self {
        self.lyrics = Some(lyrics.into());
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn release_date(mut self, release_date: impl Into<String>) -> Self {
        self.release_date = Some(release_date.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lyrics.is_none() && self.link.is_none() && self.release_date.is_none()
    }

    pub(crate) fn apply_to(&self, song: &mut Song) {
        if let Some(lyrics) = &self.lyrics {
            song.lyrics = lyrics.clone();
        }
        if let Some(link) = &self.link {
            song.link = link.clone();
        }
        if let Some(release_date) = &self.release_date {
            song.release_date = release_date.clone();
        }
    }
}

/// Row selector: skip `offset` songs, then return at most `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// Line selector over a song's lyrics: verses `[start, start + count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseWindow {
    pub start: usize,
    pub count: usize,
}

impl VerseWindow {
    pub fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }
}

/// Reinterprets a row page as a verse window (`offset` -> `start`,
/// `limit` -> `count`). Callers that receive a single limit/offset pair for
/// lyric retrieval go through this conversion explicitly.
impl From<Page> for VerseWindow {
    fn from(page: Page) -> Self {
        Self {
            start: page.offset as usize,
            count: page.limit as usize,
        }
    }
}

/// Query descriptor for `find_all`.
///
/// Text predicates are case-insensitive substring matches, the release date
/// is an exact match. Absent predicates match every song. Empty strings are
/// normalized to absent by the builder methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongFilter {
    pub title: Option<String>,
    pub group: Option<String>,
    pub lyrics: Option<String>,
    pub link: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub page: Page,
}

impl SongFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl AsRef<str>) -> Self {
        self.title = non_empty(title.as_ref());
        self
    }

    pub fn group(mut self, group: impl AsRef<str>) -> Self {
        self.group = non_empty(group.as_ref());
        self
    }

    pub fn lyrics(mut self, lyrics: impl AsRef<str>) -> Self {
        self.lyrics = non_empty(lyrics.as_ref());
        self
    }

    pub fn link(mut self, link: impl AsRef<str>) -> Self {
        self.link = non_empty(link.as_ref());
        self
    }

    pub fn release_date(mut self, release_date: impl AsRef<str>) -> Self {
        self.release_date = non_empty(release_date.as_ref());
        self
    }

    pub fn page(mut self, limit: u32, offset: u32) -> Self {
        self.page = Page::new(limit, offset);
        self
    }

    /// Drop predicates that were set to an empty string directly.
    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.as_deref().and_then(non_empty),
            group: self.group.as_deref().and_then(non_empty),
            lyrics: self.lyrics.as_deref().and_then(non_empty),
            link: self.link.as_deref().and_then(non_empty),
            release_date: self.release_date.as_deref().and_then(non_empty),
            page: self.page,
        }
    }

    /// Whether `song` satisfies every predicate. Pagination is not applied.
    pub fn matches(&self, song: &Song) -> bool {
        matches_part(self.title.as_deref(), &song.title)
            && matches_part(self.group.as_deref(), &song.group)
            && matches_part(self.lyrics.as_deref(), &song.lyrics)
            && matches_part(self.link.as_deref(), &song.link)
            && self
                .release_date
                .as_deref()
                .map_or(true, |date| date.is_empty() || date == song.release_date)
    }
}

fn matches_part(needle: Option<&str>, haystack: &str) -> bool {
    needle.map_or(true, |needle| contains_ignore_case(haystack, needle))
}

/// Case-insensitive substring test using Unicode lowercase folding.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imagine() -> Song {
        NewSong::new("Imagine", "John Lennon")
            .lyrics("V1\nV2")
            .link("http://x")
            .release_date("1971-09-09")
            .into_song(1)
    }

    #[test]
    fn test_filter_defaults() {
        let filter = SongFilter::new();
        assert_eq!(filter.page.limit, 5);
        assert_eq!(filter.page.offset, 0);
        assert!(filter.matches(&imagine()));
    }

    #[test]
    fn test_empty_strings_are_wildcards() {
        let filter = SongFilter::new().title("").group("").release_date("");
        assert_eq!(filter.title, None);
        assert_eq!(filter.release_date, None);

        let raw = SongFilter {
            title: Some(String::new()),
            ..SongFilter::default()
        };
        assert_eq!(raw.normalized().title, None);
        assert!(raw.matches(&imagine()));
    }

    #[test]
    fn test_partial_match_is_case_insensitive() {
        assert!(SongFilter::new().title("imag").matches(&imagine()));
        assert!(SongFilter::new().group("LENNON").matches(&imagine()));
        assert!(!SongFilter::new().title("yesterday").matches(&imagine()));
    }

    #[test]
    fn test_release_date_is_exact() {
        assert!(SongFilter::new().release_date("1971-09-09").matches(&imagine()));
        assert!(!SongFilter::new().release_date("1971").matches(&imagine()));
    }

    #[test]
    fn test_predicates_are_anded() {
        let filter = SongFilter::new().title("imag").group("beatles");
        assert!(!filter.matches(&imagine()));
    }

    #[test]
    fn test_contains_ignore_case_folds_unicode() {
        assert!(contains_ignore_case("Ёлка", "ёл"));
        assert!(contains_ignore_case("STRASSE", "strasse"));
        assert!(contains_ignore_case("anything", ""));
    }

    #[test]
    fn test_patch_from_song_keeps_empty_fields() {
        let mut song = imagine();
        song.lyrics = String::new();
        song.link = "L2".to_string();

        let patch = SongPatch::from_song(&song);
        assert_eq!(patch.lyrics, None);
        assert_eq!(patch.link.as_deref(), Some("L2"));
        assert_eq!(patch.release_date.as_deref(), Some("1971-09-09"));
    }

    #[test]
    fn test_patch_apply_merges_fields() {
        let mut song = imagine();
        SongPatch::new(1).link("L2").apply_to(&mut song);
        assert_eq!(song.lyrics, "V1\nV2");
        assert_eq!(song.link, "L2");

        SongPatch::new(1).lyrics("").apply_to(&mut song);
        assert_eq!(song.lyrics, "");
        assert!(SongPatch::new(1).is_empty());
    }

    // A page's limit/offset becomes a verse count/start only through this
    // conversion; the two selectors are never interchangeable implicitly.
    #[test]
    fn test_page_converts_to_verse_window() {
        let window = VerseWindow::from(Page::new(2, 1));
        assert_eq!(window, VerseWindow::new(1, 2));
    }
}
