//! Codemod Retrieval Layer
//!
//! Collaborators around the codemod engine: the guidance query boundary used
//! during a session, plus the offline path that crawls framework docs, chunks
//! them, and loads them into a vector store.
//!
//! # Core Concepts
//!
//! - [`GuidanceSource`]: synchronous, best-effort documentation query
//! - [`Chunker`]: pages -> overlapping retrieval records with stable ids
//! - [`crawl`]: bounded fetch pool with exponential backoff
//! - [`ingest`]: batched upserts that survive individual batch failures
//!
//! # Example
//!
//! ```rust,ignore
//! use codemod_retrieval::{crawl, ingest, Chunker, CrawlConfig, IngestConfig};
//!
//! let report = crawl(&fetcher, "nextjs", &urls, &CrawlConfig::default()).await;
//! let records = Chunker::default().chunk_pages_now(&report.pages);
//! let summary = ingest(&store, &records, &IngestConfig::default()).await;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod chunk;
mod crawl;
mod error;
mod ingest;
mod source;

pub use chunk::{
    normalize_whitespace, page_content_hash, record_id, size_chunks, ChunkConfig, ChunkRecord,
    Chunker, DocumentPage, CHUNK_MAX_CHARS, CHUNK_OVERLAP_CHARS,
};
pub use crawl::{
    crawl, fetch_with_retry, CrawlConfig, CrawlReport, PageFetcher, RetryPolicy,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_WORKERS,
};
pub use error::{Result, RetrievalError};
pub use ingest::{ingest, IngestConfig, IngestReport, VectorStore, DEFAULT_NAMESPACE, MAX_BATCH_SIZE};
pub use source::{
    framework_hint, query_or_empty, supplemental_query, truncate_snippet, GuidanceSource,
    NoGuidanceSource, RetrievalMatch, StaticGuidanceSource, DEFAULT_TOP_K, SNIPPET_MAX_CHARS,
    SUPPLEMENTAL_TOP_K,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
