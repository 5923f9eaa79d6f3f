use codemod_retrieval::{
    crawl, ingest, ChunkRecord, Chunker, CrawlConfig, DocumentPage, IngestConfig, PageFetcher,
    Result, RetrievalError, RetryPolicy, VectorStore,
};
use std::sync::Mutex;
use std::time::Duration;

struct SiteFetcher;

#[async_trait::async_trait]
impl PageFetcher for SiteFetcher {
    async fn fetch(&self, url: &str, framework: &str) -> Result<DocumentPage> {
        if url.ends_with("/missing") {
            return Err(RetrievalError::fetch(url, "404"));
        }
        let body = format!("  {url}\n\n  {}\n", "useRouter moved to next/navigation. ".repeat(60));
        Ok(DocumentPage::new(url, framework, "Routing", body))
    }
}

#[derive(Default)]
struct MemoryStore {
    stored: Mutex<Vec<ChunkRecord>>,
}

#[async_trait::async_trait]
impl VectorStore for MemoryStore {
    async fn upsert(&self, _namespace: &str, records: &[ChunkRecord]) -> Result<()> {
        self.stored.lock().unwrap().extend_from_slice(records);
        Ok(())
    }
}

#[tokio::test]
async fn crawl_chunk_and_ingest() {
    let urls: Vec<String> = [
        "https://nextjs.org/docs/app",
        "https://nextjs.org/docs/missing",
        "https://nextjs.org/docs/pages",
    ]
    .iter()
    .map(ToString::to_string)
    .collect();

    let config = CrawlConfig::default().with_retry(RetryPolicy::immediate(2));
    let report = crawl(&SiteFetcher, "nextjs", &urls, &config).await;
    assert_eq!(report.successful(), 2);
    assert_eq!(report.failed_urls, vec!["https://nextjs.org/docs/missing"]);

    let records = Chunker::default().chunk_pages(&report.pages, 1_700_000_000);
    // each page normalizes to about 2190 chars: two windows
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.text.chars().count() <= 1200));

    let store = MemoryStore::default();
    let summary = ingest(
        &store,
        &records,
        &IngestConfig::default()
            .with_namespace("nextjs-docs")
            .with_pause(Duration::ZERO),
    )
    .await;
    assert_eq!(summary.upserted, 4);
    assert_eq!(summary.namespace, "nextjs-docs");

    let stored = store.stored.lock().unwrap();
    let mut ids: Vec<_> = stored.iter().map(|r| r.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}
