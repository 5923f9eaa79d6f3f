//! Documentation chunking
//!
//! Turns crawled pages into retrieval records: whitespace is normalized, the
//! body is cut into overlapping windows, and every window gets a stable id
//! derived from `url|content_hash|index`.

use codemod_artifact::ContentHash;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum characters per chunk
pub const CHUNK_MAX_CHARS: usize = 1200;

/// Characters shared by consecutive chunks
pub const CHUNK_OVERLAP_CHARS: usize = 150;

/// Hex characters kept from a page content hash
pub const PAGE_HASH_LEN: usize = 16;

/// Hex characters kept from a record id
pub const RECORD_ID_LEN: usize = 32;

/// Chunk window settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    pub max_chars: usize,
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chars: CHUNK_MAX_CHARS,
            overlap: CHUNK_OVERLAP_CHARS,
        }
    }
}

/// A fetched documentation page
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentPage {
    pub url: String,
    pub framework: String,
    pub title: String,
    pub content: String,
    /// Truncated SHA-256 of `content`
    pub content_hash: String,
}

impl DocumentPage {
    /// Create page, hashing its content
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        framework: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        Self {
            url: url.into(),
            framework: framework.into(),
            title: title.into(),
            content_hash: page_content_hash(&content),
            content,
        }
    }
}

/// Retrieval record for one chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    pub framework: String,
    pub url: String,
    pub title: String,
    pub content_hash: String,
    pub chunk_index: usize,
    /// Unix seconds
    pub created_at: u64,
}

/// Truncated SHA-256 hex of page content
#[must_use]
pub fn page_content_hash(content: &str) -> String {
    ContentHash::of_text(content)
        .fingerprint(PAGE_HASH_LEN)
        .as_str()
        .to_string()
}

/// Stable record id for a chunk
#[must_use]
pub fn record_id(url: &str, content_hash: &str, index: usize) -> String {
    ContentHash::of_text(&format!("{url}|{content_hash}|{index}"))
        .fingerprint(RECORD_ID_LEN)
        .as_str()
        .to_string()
}

/// Trim every line and drop blank ones
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.replace('\r', "")
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cut `body` into windows of at most `max_chars` characters
///
/// Consecutive windows share `overlap` characters. A body that fits in one
/// window (including an empty one) yields exactly one chunk.
#[must_use]
pub fn size_chunks(body: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    let body = body.trim();
    let chars: Vec<char> = body.chars().collect();
    let max_chars = max_chars.max(1);
    if chars.len() <= max_chars {
        return vec![body.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + max_chars).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        // always advance, even when overlap >= max_chars
        start = end.saturating_sub(overlap).max(start + 1);
    }
    chunks
}

/// Builds retrieval records from pages
#[derive(Debug, Clone, Copy, Default)]
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    /// Create chunker with settings
    #[inline]
    #[must_use]
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// Records for every page, stamped with `created_at`
    ///
    /// Pages whose normalized content is empty produce no records.
    #[must_use]
    pub fn chunk_pages(&self, pages: &[DocumentPage], created_at: u64) -> Vec<ChunkRecord> {
        let mut records = Vec::new();
        for page in pages {
            let text = normalize_whitespace(&page.content);
            if text.is_empty() {
                tracing::debug!("Skipping empty page {}", page.url);
                continue;
            }
            let chunks = size_chunks(&text, self.config.max_chars, self.config.overlap);
            records.extend(chunks.into_iter().enumerate().map(|(idx, chunk)| ChunkRecord {
                id: record_id(&page.url, &page.content_hash, idx),
                text: chunk,
                framework: page.framework.clone(),
                url: page.url.clone(),
                title: page.title.clone(),
                content_hash: page.content_hash.clone(),
                chunk_index: idx,
                created_at,
            }));
        }
        tracing::info!("Chunked {} pages into {} records", pages.len(), records.len());
        records
    }

    /// Records stamped with the current time
    #[must_use]
    pub fn chunk_pages_now(&self, pages: &[DocumentPage]) -> Vec<ChunkRecord> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        self.chunk_pages(pages, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn whitespace_normalization() {
        assert_eq!(
            normalize_whitespace("  Title \r\n\n   body line  \n\t\n end"),
            "Title\nbody line\nend"
        );
    }

    #[test]
    fn short_body_is_one_chunk() {
        assert_eq!(size_chunks("  hello  ", 10, 3), vec!["hello"]);
        assert_eq!(size_chunks("", 10, 3), vec![""]);
    }

    #[test]
    fn windows_overlap() {
        let chunks = size_chunks("abcdefghij", 4, 1);
        assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn default_window_sizes() {
        let body = "x".repeat(3000);
        let chunks = size_chunks(&body, CHUNK_MAX_CHARS, CHUNK_OVERLAP_CHARS);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 1200);
        assert_eq!(chunks[1].len(), 1200);
        // 3000 - (1050 + 1050) = 900
        assert_eq!(chunks[2].len(), 900);
    }

    #[test]
    fn oversized_overlap_still_terminates() {
        let chunks = size_chunks("abcdef", 2, 5);
        assert_eq!(chunks.first().map(String::as_str), Some("ab"));
        assert_eq!(chunks.last().map(String::as_str), Some("ef"));
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundaries() {
        let chunks = size_chunks("ééééé", 2, 0);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn hashes_and_ids() {
        let page = DocumentPage::new("https://nextjs.org/docs", "nextjs", "Docs", "hello world");
        assert_eq!(page.content_hash, "b94d27b9934d3e08");
        let id = record_id(&page.url, &page.content_hash, 0);
        assert_eq!(id.len(), RECORD_ID_LEN);
        assert_ne!(id, record_id(&page.url, &page.content_hash, 1));
    }

    #[test]
    fn chunk_pages_builds_records() {
        let pages = vec![
            DocumentPage::new("u1", "react", "T1", "abcdefghij"),
            DocumentPage::new("u2", "react", "T2", " \n \n"),
        ];
        let records = Chunker::new(ChunkConfig { max_chars: 4, overlap: 1 }).chunk_pages(&pages, 42);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.url == "u1" && r.created_at == 42));
        assert_eq!(
            records.iter().map(|r| r.chunk_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        let json = serde_json::to_value(&records[0]).unwrap();
        assert!(json.get("_id").is_some());
    }
}
