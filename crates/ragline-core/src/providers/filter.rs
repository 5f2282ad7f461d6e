//! Line-level text filtering for scraped pages

use crate::config::LoaderConfig;

/// Drops navigation debris from extracted page text.
///
/// Lines with too few words are removed, and the document is cut at the
/// first remaining line containing a stop phrase (cookie banners,
/// bibliography sections and the like).
#[derive(Debug, Clone, Default)]
pub struct TextFilter {
    /// A line is kept only with at least this many words
    pub min_words: usize,
    pub stop_phrases: Vec<String>,
}

impl TextFilter {
    pub fn new(min_words: usize, stop_phrases: Vec<String>) -> Self {
        Self {
            min_words,
            stop_phrases,
        }
    }

    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(config.min_words, config.stop_phrases.clone())
    }

    pub fn apply(&self, text: &str) -> String {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| line.split_whitespace().count() >= self.min_words)
            .collect();

        let cutoff = lines
            .iter()
            .position(|line| self.stop_phrases.iter().any(|p| line.contains(p.as_str())))
            .unwrap_or(lines.len());

        lines[..cutoff].join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_short_lines() {
        let filter = TextFilter::new(3, vec![]);
        let text = "Home\nAbout us\nthree words here\n  This line has enough words in it.  ";
        assert_eq!(
            filter.apply(text),
            "three words here\nThis line has enough words in it."
        );
    }

    #[test]
    fn test_cuts_at_stop_phrase() {
        let filter = TextFilter::new(0, vec!["We use cookies".to_string()]);
        let text = "First real paragraph\nWe use cookies to improve things\nFooter text";
        assert_eq!(filter.apply(text), "First real paragraph");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(TextFilter::new(3, vec![]).apply(""), "");
    }
}
