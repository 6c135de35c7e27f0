//! Catalog and timing configuration loading
//!
//! Catalogs are TOML files with one `[[chapter]]` table per chapter; timing
//! overrides live in an optional `[timing]` table of the same file.

use std::path::Path;

use serde::Deserialize;
use storyplay_common::{Error, Result, TimingParams};
use tracing::info;

use crate::catalog::{Chapter, ChapterCatalog};

/// Raw story file form, pre-validation
#[derive(Debug, Deserialize)]
struct StoryFile {
    #[serde(rename = "chapter")]
    chapters: Vec<Chapter>,

    #[serde(default)]
    timing: TimingParams,
}

/// A loaded story: validated catalog plus timing parameters
#[derive(Debug, Clone)]
pub struct StoryConfig {
    pub catalog: ChapterCatalog,
    pub timing: TimingParams,
}

impl StoryConfig {
    /// Parse and validate a story from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: StoryFile =
            toml::from_str(text).map_err(|e| Error::Catalog(format!("parse failure: {e}")))?;
        file.timing.validate()?;
        let catalog = ChapterCatalog::new(file.chapters)?;
        Ok(Self {
            catalog,
            timing: file.timing,
        })
    }

    /// Load a story file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        info!(
            path = %path.display(),
            chapters = config.catalog.total_chapters(),
            "story loaded"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [[chapter]]
        title = "One"
        lines = ["a", "b"]
        line_durations_ms = [1000, 2000]
        scene_id = "one"

        [[chapter]]
        title = "Two"
        lines = ["c"]
        line_durations_ms = [1500]
        voice_over = "audio/two.mp3"
        scene_id = "two"
    "#;

    #[test]
    fn test_minimal_story_parses() {
        let config = StoryConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.catalog.total_chapters(), 2);
        assert_eq!(config.catalog.chapter_at(0).voice_over, None);
        assert_eq!(
            config.catalog.chapter_at(1).voice_over.as_deref(),
            Some("audio/two.mp3")
        );
        assert_eq!(config.timing, TimingParams::default());
    }

    #[test]
    fn test_timing_overrides() {
        let text = format!("{MINIMAL}\n[timing]\ntitle_ms = 500\n");
        let config = StoryConfig::from_toml_str(&text).unwrap();
        assert_eq!(config.timing.title_ms, 500);
        assert_eq!(config.timing.line_gap_ms, 1800);
    }

    #[test]
    fn test_invalid_timing_rejected() {
        let text = format!("{MINIMAL}\n[timing]\nscene_swap_ms = 9000\n");
        assert!(StoryConfig::from_toml_str(&text).is_err());
    }

    #[test]
    fn test_mismatched_chapter_rejected() {
        let text = r#"
            [[chapter]]
            title = "Bad"
            lines = ["a"]
            line_durations_ms = [1000, 2000]
            scene_id = "bad"
        "#;
        assert!(matches!(
            StoryConfig::from_toml_str(text),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.toml");
        std::fs::write(&path, MINIMAL).unwrap();

        let config = StoryConfig::load(&path).unwrap();
        assert_eq!(config.catalog.total_chapters(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = StoryConfig::load(Path::new("/nonexistent/story.toml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
