//! Testing utilities for the codemod workspace
//!
//! Shared fixtures: repository and artifact payloads, snapshots, and guidance
//! sources that record or fail their queries.

#![allow(missing_docs)]

use codemod_artifact::{RepositorySnapshot, SourceFile};
use codemod_retrieval::{GuidanceSource, RetrievalError, RetrievalMatch};
use serde_json::json;
use std::sync::Mutex;

/// A small Next.js app exercising every built-in rule
pub const NEXT_FILES: [(&str, &str); 6] = [
    (
        "pages/index.tsx",
        "import { useRouter } from 'next/router';\n\nexport default function Home() {\n  const router = useRouter();\n  return null;\n}\n",
    ),
    (
        "pages/legacy.tsx",
        "import Router from 'next/router';\n\nexport function go() {\n  Router.push('/');\n}\n",
    ),
    (
        "components/Avatar.tsx",
        "import Image from 'next/legacy/image';\n\nexport const Avatar = () => <Image src=\"/a.png\" />;\n",
    ),
    (
        "next.config.js",
        "module.exports = {\n  experimental: { serverActions: true },\n};\n",
    ),
    ("lib/math.ts", "export const add = (a: number, b: number) => a + b;\n"),
    ("README.md", "import { useRouter } from 'next/router';\n"),
];

pub fn repo_json(files: &[(&str, &str)], label: &str) -> String {
    let files: Vec<_> = files
        .iter()
        .map(|(path, content)| json!({ "path": path, "content": content }))
        .collect();
    json!({ "label": label, "files": files }).to_string()
}

pub fn next_repo_json() -> String {
    repo_json(&NEXT_FILES, "next-app")
}

pub fn snapshot_of(files: &[(&str, &str)]) -> RepositorySnapshot {
    RepositorySnapshot::from_files(
        files.iter().map(|(path, content)| SourceFile::new(*path, *content)),
        "fixture",
    )
    .unwrap()
}

pub fn artifact_json(package: &str, current: &str, target: &str) -> String {
    json!({
        "package": package,
        "current_version": current,
        "target_version": target,
    })
    .to_string()
}

pub fn next_artifact_json() -> String {
    artifact_json("next", "13.4.0", "14.0.0")
}

pub fn prioritized_artifact_json(risky_first: &[&str], all_package_files: &[&str]) -> String {
    json!({
        "package": "next",
        "current_version": "13.4.0",
        "target_version": "14.0.0",
        "prioritized_files": {
            "risky_first": risky_first,
            "all_package_files": all_package_files,
        },
        "rag_guidance": [{
            "topic": "routing",
            "references": [{
                "url": "https://nextjs.org/docs/app/building-your-application/upgrading",
                "snippet": "Migration: useRouter is now imported from next/navigation in the App Router.",
            }],
        }],
    })
    .to_string()
}

/// Records every query and answers with fixed matches
#[derive(Debug, Default)]
pub struct RecordingGuidanceSource {
    matches: Vec<RetrievalMatch>,
    queries: Mutex<Vec<(String, usize, Option<String>)>>,
}

impl RecordingGuidanceSource {
    pub fn new(matches: Vec<RetrievalMatch>) -> Self {
        Self {
            matches,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<(String, usize, Option<String>)> {
        self.queries.lock().unwrap().clone()
    }
}

impl GuidanceSource for RecordingGuidanceSource {
    fn query(
        &self,
        text: &str,
        top_k: usize,
        framework: Option<&str>,
    ) -> codemod_retrieval::Result<Vec<RetrievalMatch>> {
        self.queries
            .lock()
            .unwrap()
            .push((text.to_string(), top_k, framework.map(str::to_string)));
        Ok(self.matches.iter().take(top_k).cloned().collect())
    }
}

/// Fails every query
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingGuidanceSource;

impl GuidanceSource for FailingGuidanceSource {
    fn query(&self, _: &str, _: usize, _: Option<&str>) -> codemod_retrieval::Result<Vec<RetrievalMatch>> {
        Err(RetrievalError::Query("index unavailable".to_string()))
    }
}
