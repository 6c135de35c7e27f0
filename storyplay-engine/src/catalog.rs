//! Chapter catalog
//!
//! Immutable, ordered chapter data validated once at construction. Playback
//! never revalidates: a catalog that exists is a catalog that is well formed.

use serde::Deserialize;
use storyplay_common::{Error, Result};

/// A titled narrative segment
///
/// `lines` and `line_durations_ms` are index-aligned: line `i` stays visible
/// for `line_durations_ms[i]` milliseconds. Chapters are loaded once and
/// never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Chapter {
    /// Chapter title, shown on the title card
    pub title: String,

    /// Ordered narration lines (empty strings are legal beats)
    pub lines: Vec<String>,

    /// Per-line display durations in milliseconds
    pub line_durations_ms: Vec<u64>,

    /// Opaque voice-over reference handed to the host's audio player
    #[serde(default)]
    pub voice_over: Option<String>,

    /// Identifier of the 3D scene displayed behind this chapter
    pub scene_id: String,
}

/// Immutable ordered list of chapters
///
/// Construction is the single validation point: mismatched line/duration
/// lengths, zero durations, or an empty catalog fail here with
/// [`Error::Validation`], before playback is reachable.
#[derive(Debug, Clone)]
pub struct ChapterCatalog {
    chapters: Vec<Chapter>,
    chapter_weight: f64,
}

impl ChapterCatalog {
    /// Create a catalog, validating every chapter
    pub fn new(chapters: Vec<Chapter>) -> Result<Self> {
        if chapters.is_empty() {
            return Err(Error::Validation("catalog has no chapters".to_string()));
        }

        for (index, chapter) in chapters.iter().enumerate() {
            if chapter.lines.len() != chapter.line_durations_ms.len() {
                return Err(Error::Validation(format!(
                    "chapter {} ({:?}): {} lines but {} durations",
                    index,
                    chapter.title,
                    chapter.lines.len(),
                    chapter.line_durations_ms.len()
                )));
            }
            if let Some(pos) = chapter.line_durations_ms.iter().position(|&d| d == 0) {
                return Err(Error::Validation(format!(
                    "chapter {} ({:?}): line {} has zero duration",
                    index, chapter.title, pos
                )));
            }
        }

        let chapter_weight = 100.0 / chapters.len() as f64;
        Ok(Self {
            chapters,
            chapter_weight,
        })
    }

    /// Chapter at index `i`
    ///
    /// Indices are validated by callers against [`total_chapters`];
    /// out-of-range access is a programming error.
    ///
    /// [`total_chapters`]: ChapterCatalog::total_chapters
    pub fn chapter_at(&self, i: usize) -> &Chapter {
        &self.chapters[i]
    }

    /// Number of chapters in the catalog
    pub fn total_chapters(&self) -> usize {
        self.chapters.len()
    }

    /// Fixed share of total progress attributed to one chapter
    /// (`100 / total_chapters`)
    pub fn chapter_weight(&self) -> f64 {
        self.chapter_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(title: &str, lines: &[&str], durations: &[u64]) -> Chapter {
        Chapter {
            title: title.to_string(),
            lines: lines.iter().map(|s| s.to_string()).collect(),
            line_durations_ms: durations.to_vec(),
            voice_over: None,
            scene_id: format!("{}-scene", title),
        }
    }

    #[test]
    fn test_valid_catalog() {
        let catalog = ChapterCatalog::new(vec![
            chapter("One", &["a", "b"], &[1000, 2000]),
            chapter("Two", &["c"], &[1500]),
        ])
        .unwrap();

        assert_eq!(catalog.total_chapters(), 2);
        assert_eq!(catalog.chapter_weight(), 50.0);
        assert_eq!(catalog.chapter_at(1).title, "Two");
    }

    #[test]
    fn test_mismatched_durations_rejected() {
        let result = ChapterCatalog::new(vec![chapter("Bad", &["a", "b"], &[1000])]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let result = ChapterCatalog::new(vec![chapter("Bad", &["a", "b"], &[1000, 0])]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let result = ChapterCatalog::new(vec![]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_empty_lines_are_legal() {
        // The reference catalogs open chapters with a silent empty line.
        let catalog = ChapterCatalog::new(vec![chapter("One", &["", "b"], &[500, 2000])]).unwrap();
        assert_eq!(catalog.chapter_at(0).lines[0], "");
    }

    #[test]
    fn test_chapter_with_no_lines_is_legal() {
        let catalog = ChapterCatalog::new(vec![chapter("Silent", &[], &[])]).unwrap();
        assert_eq!(catalog.chapter_at(0).lines.len(), 0);
    }

    #[test]
    fn test_four_chapter_weight() {
        let catalog = ChapterCatalog::new(vec![
            chapter("A", &["x"], &[100]),
            chapter("B", &["x"], &[100]),
            chapter("C", &["x"], &[100]),
            chapter("D", &["x"], &[100]),
        ])
        .unwrap();
        assert_eq!(catalog.chapter_weight(), 25.0);
    }
}
