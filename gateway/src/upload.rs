//! Batch asset upload.
//!
//! Every file becomes its own task: store it, then read it back and check
//! the length. Tasks run concurrently and finish in any order; each one's
//! outcome is reported on its own, so one unreadable file, unreachable store
//! or short read-back never stops the rest.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use compat_core::{AssetClient, AssetKey, Error, Result};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::transport;

/// What one file produced.
#[derive(Debug)]
pub struct UploadReport {
    pub name: String,
    pub result: Result<UploadedAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub key: AssetKey,
    /// Length of the bytes read back after storing.
    pub len: usize,
}

/// Files found directly inside a directory.
#[derive(Debug, Default)]
pub struct Collected {
    /// `(file name, contents)`, sorted by name.
    pub items: Vec<(String, Vec<u8>)>,
    /// Entries that could not be read, already failed.
    pub unreadable: Vec<UploadReport>,
}

/// Regular files directly inside `dir`, following symlinks. Subdirectories
/// are skipped. Only a directory that cannot be listed is an error; a file
/// that cannot be read becomes a failed report.
pub async fn collect_dir(dir: &Path) -> anyhow::Result<Collected> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("reading {}", dir.display()))?;

    let mut collected = Collected::default();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("listing {}", dir.display()))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        let content = match tokio::fs::metadata(&path).await {
            Ok(meta) if !meta.is_file() => continue,
            Ok(_) => tokio::fs::read(&path).await,
            Err(err) => Err(err),
        };
        match content {
            Ok(content) => collected.items.push((name, content)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable file");
                collected.unreadable.push(UploadReport {
                    name: name.clone(),
                    result: Err(Error::Unreadable {
                        name,
                        reason: err.to_string(),
                    }),
                });
            }
        }
    }
    collected.items.sort_by(|a, b| a.0.cmp(&b.0));
    collected.unreadable.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(collected)
}

/// Collect `dir` and upload what could be read. Unreadable files are
/// reported alongside the upload outcomes, all sorted by name.
pub async fn upload_dir(client: AssetClient, dir: &Path) -> anyhow::Result<Vec<UploadReport>> {
    let Collected { items, unreadable } = collect_dir(dir).await?;
    info!(
        count = items.len(),
        unreadable = unreadable.len(),
        dir = %dir.display(),
        "uploading assets"
    );
    let mut reports = upload_all(client, items).await;
    reports.extend(unreadable);
    reports.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(reports)
}

/// Upload every item, one task each, and report every outcome sorted by name.
pub async fn upload_all(client: AssetClient, items: Vec<(String, Vec<u8>)>) -> Vec<UploadReport> {
    let agent = transport::agent();
    let mut pending: BTreeSet<String> = BTreeSet::new();
    let mut tasks = JoinSet::new();

    for (name, content) in items {
        pending.insert(name.clone());
        let client = client.clone();
        let agent = agent.clone();
        tasks.spawn_blocking(move || {
            let result = upload_one(&agent, &client, &name, content);
            UploadReport { name, result }
        });
    }

    let mut reports = Vec::with_capacity(pending.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(report) => {
                match &report.result {
                    Ok(asset) => info!(name = %report.name, len = asset.len, "uploaded"),
                    Err(err) => warn!(name = %report.name, error = %err, "upload failed"),
                }
                pending.remove(&report.name);
                reports.push(report);
            }
            Err(err) => warn!(error = %err, "upload task did not finish"),
        }
    }

    // Tasks that panicked or were cancelled never produced a report.
    reports.extend(pending.into_iter().map(|name| UploadReport {
        name,
        result: Err(Error::UpstreamUnavailable("upload task did not finish".to_string())),
    }));
    reports.sort_by(|a, b| a.name.cmp(&b.name));
    reports
}

fn upload_one(agent: &ureq::Agent, client: &AssetClient, name: &str, content: Vec<u8>) -> Result<UploadedAsset> {
    let expected = content.len();
    let store = client.build_store(name, content);
    let key = client.parse_store(transport::execute(agent, &client.url(&store), &store)?)?;

    let fetch = client.build_get(&key);
    let stored = client.parse_get(transport::execute(agent, &client.url(&fetch), &fetch)?)?;
    if stored.len() != expected {
        return Err(Error::LengthMismatch {
            expected,
            actual: stored.len(),
        });
    }

    Ok(UploadedAsset {
        key,
        len: stored.len(),
    })
}
