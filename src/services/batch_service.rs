// src/services/batch_service.rs
//
// Sequential batch generation. One document is in flight at a time and the
// renderer is never called concurrently.

use std::{
    collections::HashSet,
    io::{Cursor, Write},
    path::PathBuf,
    sync::Arc,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::watch;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{
    common::{error::AppError, filenames},
    db::RecordStore,
    models::{
        batch::{BatchFailure, BatchMode, BatchRequest, BatchResult},
        payslip::PayWindow,
    },
    services::{
        document_service::DocumentRenderer,
        payslip_service::{build_for_worker, today, RecordSnapshot},
    },
};

/// Destination for finished artifacts (single payslips or the archive).
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn deliver(&self, filename: &str, bytes: Vec<u8>) -> Result<(), AppError>;
}

/// Writes artifacts into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn deliver(&self, filename: &str, bytes: Vec<u8>) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        tokio::fs::write(&path, bytes).await?;
        tracing::info!(path = %path.display(), "artifact written");
        Ok(())
    }
}

/// Raises cancellation for a running batch.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// Checked between workers, never mid-render.
#[derive(Debug, Clone)]
pub struct CancelSignal(watch::Receiver<bool>);

impl CancelSignal {
    pub fn pair() -> (CancelHandle, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle(Arc::new(tx)), CancelSignal(rx))
    }

    /// A signal nobody can raise.
    pub fn never() -> Self {
        Self::pair().1
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }
}

/// Hands out artifact names that are unique within one run. Two workers with
/// the same sanitized name get `_2`, `_3`, ... suffixes.
#[derive(Default)]
struct UniqueNames {
    used: HashSet<String>,
}

impl UniqueNames {
    fn claim(&mut self, filename: &str) -> String {
        let mut candidate = filename.to_string();
        let (stem, ext) = filename.rsplit_once('.').unwrap_or((filename, ""));
        let mut n = 2;
        while self.used.contains(&candidate) {
            candidate = if ext.is_empty() {
                format!("{}_{}", stem, n)
            } else {
                format!("{}_{}.{}", stem, n, ext)
            };
            n += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

/// In-memory zip archive.
struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    entries: usize,
}

impl ArchiveBuilder {
    fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            entries: 0,
        }
    }

    fn add(&mut self, name: &str, bytes: &[u8]) -> Result<(), AppError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer.start_file(name, options)?;
        self.writer.write_all(bytes)?;
        self.entries += 1;
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.entries == 0
    }

    fn finish(self) -> Result<Vec<u8>, AppError> {
        Ok(self.writer.finish()?.into_inner())
    }
}

/// Generates a payslip for every worker in the snapshot, in stored order.
///
/// Per-worker rendering or delivery failures are recorded and the run goes
/// on. `progress(current, total)` fires once per attempted worker. In zip mode
/// the archive is delivered once at the end and only when it holds at least
/// one document; a cancelled run still delivers what it rendered.
pub async fn run_batch<P>(
    snapshot: &RecordSnapshot,
    request: &BatchRequest,
    renderer: &dyn DocumentRenderer,
    sink: &dyn ArtifactSink,
    cancel: &CancelSignal,
    generated_date: NaiveDate,
    mut progress: P,
) -> Result<BatchResult, AppError>
where
    P: FnMut(usize, usize) + Send,
{
    let window = PayWindow::new(request.week_start, request.week_end)?;
    let roster = &snapshot.workers;
    let total = roster.len();

    let mut result = BatchResult {
        mode: request.mode,
        total,
        succeeded: 0,
        failures: Vec::new(),
        skipped: Vec::new(),
        cancelled: false,
        files: Vec::new(),
        archive_error: None,
    };
    let mut names = UniqueNames::default();
    let mut archive = match request.mode {
        BatchMode::Zip => Some(ArchiveBuilder::new()),
        BatchMode::Individual => None,
    };

    tracing::info!(
        workers = total,
        mode = ?request.mode,
        week_start = %window.start,
        week_end = %window.end,
        "batch started"
    );

    for (index, worker) in roster.iter().enumerate() {
        if cancel.is_cancelled() {
            result.cancelled = true;
            result.skipped = roster[index..].iter().map(|w| w.id.clone()).collect();
            tracing::warn!(skipped = result.skipped.len(), "batch cancelled");
            break;
        }

        // 1. Build from the shared snapshot
        let payslip = build_for_worker(
            snapshot,
            worker,
            window,
            request.include_advances,
            generated_date,
        );
        let filename = filenames::payslip_filename(&worker.name, window.end);

        // 2. Render, then archive or deliver under a name no earlier worker took
        let outcome = match renderer.render(&payslip, &snapshot.settings).await {
            Ok(bytes) => {
                let name = names.claim(&filename);
                match archive.as_mut() {
                    Some(archive) => archive.add(&name, &bytes),
                    None => {
                        let delivered = sink.deliver(&name, bytes).await;
                        delivered.map(|_| result.files.push(name))
                    }
                }
            }
            Err(e) => Err(e),
        };

        // 3. Record the outcome; a failure never stops the roster
        match outcome {
            Ok(()) => result.succeeded += 1,
            Err(e) => {
                tracing::warn!(worker_id = %worker.id, error = %e, "payslip failed in batch");
                result.failures.push(BatchFailure {
                    worker_id: worker.id.clone(),
                    worker_name: worker.name.clone(),
                    error: e.to_string(),
                });
            }
        }

        progress(index + 1, total);
    }

    // Archive delivery problems are reported in the result, next to the
    // per-worker outcomes, instead of discarding them.
    if let Some(archive) = archive {
        if !archive.is_empty() {
            let name = filenames::archive_filename(window.start, window.end);
            let delivered = match archive.finish() {
                Ok(bytes) => sink.deliver(&name, bytes).await,
                Err(e) => Err(e),
            };
            match delivered {
                Ok(()) => result.files.push(name),
                Err(e) => {
                    tracing::error!(archive = %name, error = %e, "archive not delivered");
                    result.archive_error = Some(e.to_string());
                }
            }
        }
    }

    tracing::info!(summary = %result.summary(), "batch finished");
    Ok(result)
}

/// Loads one snapshot per run and feeds it to [`run_batch`].
#[derive(Clone)]
pub struct BatchService {
    store: RecordStore,
    renderer: Arc<dyn DocumentRenderer>,
    sink: Arc<dyn ArtifactSink>,
}

impl BatchService {
    pub fn new(
        store: RecordStore,
        renderer: Arc<dyn DocumentRenderer>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self { store, renderer, sink }
    }

    pub async fn generate_all<P>(
        &self,
        request: &BatchRequest,
        cancel: &CancelSignal,
        progress: P,
    ) -> Result<BatchResult, AppError>
    where
        P: FnMut(usize, usize) + Send,
    {
        PayWindow::new(request.week_start, request.week_end)?;
        let snapshot = RecordSnapshot::load(&self.store).await?;
        run_batch(
            &snapshot,
            request,
            self.renderer.as_ref(),
            self.sink.as_ref(),
            cancel,
            today(),
            progress,
        )
        .await
    }
}
