//! Single-document session: background analysis and export with an ordered event queue.
//!
//! Workers run on tokio's blocking pool and report through one unbounded
//! channel. Every event carries the generation of the document it belongs to;
//! loading a new document bumps the generation so late events from an older
//! pass are dropped by [`Session::poll`]. Only the owner of the session reads
//! events, mutates the record list and clears the busy flags, so a pass counts
//! as running until its final event has been polled.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

use crate::error::{CorrectionError, ExportError, Result, SplitError};
use crate::export::{ExportOutcome, ExportSummary, Exporter};
use crate::models::config::SplitterConfig;
use crate::models::receipt::ReceiptRecord;
use crate::pdf::PdfExtractor;
use crate::receipt::{distinct_payers, relabel, ReceiptAnalyzer, RelabelOutcome};

/// Recommended interval between [`Session::poll`] calls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Progress reported by background passes.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A record was completed, in sequence order.
    Record(ReceiptRecord),
    /// The analysis pass finished.
    AnalysisComplete { total: usize },
    /// The analysis pass stopped with an error; records already sent stay.
    AnalysisFailed(String),
    /// One record was exported (or failed to).
    ExportProgress {
        done: usize,
        total: usize,
        outcome: ExportOutcome,
    },
    /// The export pass finished.
    ExportComplete(ExportSummary),
    /// The export pass could not run to completion.
    ExportFailed(String),
}

#[derive(Debug)]
struct Tagged {
    generation: u64,
    event: SessionEvent,
}

/// Sends events for one generation.
#[derive(Clone)]
struct EventSink {
    generation: u64,
    tx: UnboundedSender<Tagged>,
}

impl EventSink {
    fn send(&self, event: SessionEvent) {
        // The receiver lives as long as the session; a closed channel means nobody listens.
        let _ = self.tx.send(Tagged {
            generation: self.generation,
            event,
        });
    }
}

#[derive(Debug, Clone)]
struct LoadedDocument {
    name: String,
    data: Arc<Vec<u8>>,
}

impl LoadedDocument {
    fn open(&self) -> Result<PdfExtractor> {
        let mut extractor = PdfExtractor::new();
        extractor.load(&self.data)?;
        Ok(extractor)
    }
}

/// Owns the current document, its records and the event queue.
pub struct Session {
    config: SplitterConfig,
    document: Option<LoadedDocument>,
    records: Vec<ReceiptRecord>,
    generation: u64,
    analyzing: bool,
    /// Generation of the running export, if any.
    exporting: Option<u64>,
    tx: UnboundedSender<Tagged>,
    rx: UnboundedReceiver<Tagged>,
}

impl Session {
    pub fn new(config: SplitterConfig) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            config,
            document: None,
            records: Vec::new(),
            generation: 0,
            analyzing: false,
            exporting: None,
            tx,
            rx,
        }
    }

    /// Read a PDF from disk and start analyzing it. See [`load`](Self::load).
    pub fn load_file(&mut self, path: &Path, local_company: &str) -> Result<u64> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.load(name, data, local_company))
    }

    /// Replace the current document and start an analysis pass in the background.
    ///
    /// Records of the previous document are dropped and any of its pending
    /// events become stale. Must be called from within a tokio runtime.
    /// Returns the new generation.
    pub fn load(&mut self, name: impl Into<String>, data: Vec<u8>, local_company: &str) -> u64 {
        self.generation += 1;
        self.records.clear();
        self.analyzing = true;

        let document = LoadedDocument {
            name: name.into(),
            data: Arc::new(data),
        };
        info!("Loading '{}' as generation {}", document.name, self.generation);
        self.document = Some(document.clone());

        let sink = self.sink();
        let analyzer = ReceiptAnalyzer::new(&self.config);
        let company = local_company.to_string();

        let worker_sink = sink.clone();
        let worker = tokio::task::spawn_blocking(move || -> Result<usize> {
            let extractor = document.open()?;
            let records = analyzer.analyze_with(&extractor, &company, |record| {
                worker_sink.send(SessionEvent::Record(record.clone()));
            })?;
            Ok(records.len())
        });

        tokio::spawn(async move {
            let event = match worker.await {
                Ok(Ok(total)) => SessionEvent::AnalysisComplete { total },
                Ok(Err(e)) => SessionEvent::AnalysisFailed(e.to_string()),
                Err(e) => {
                    error!("Analysis worker panicked: {}", e);
                    SessionEvent::AnalysisFailed(SplitError::Analysis(e.to_string()).to_string())
                }
            };
            sink.send(event);
        });

        self.generation
    }

    /// Start exporting the current records to `output_dir`.
    pub fn start_export(&mut self, output_dir: impl Into<PathBuf>) -> std::result::Result<(), ExportError> {
        let document = self.document.clone().ok_or(ExportError::NoDocument)?;
        if self.analyzing {
            return Err(ExportError::AnalysisInProgress);
        }
        if self.exporting.is_some() {
            return Err(ExportError::AlreadyRunning);
        }
        self.exporting = Some(self.generation);

        let records = self.records.clone();
        let output_dir = output_dir.into();
        let exporter = Exporter::new(self.config.export.clone());
        let sink = self.sink();
        debug!("Exporting {} record(s) to {}", records.len(), output_dir.display());

        let worker_sink = sink.clone();
        let worker = tokio::task::spawn_blocking(move || -> Result<ExportSummary> {
            let extractor = document.open()?;
            let summary = exporter.export(&extractor, &document.name, &records, &output_dir, |done, total, outcome| {
                worker_sink.send(SessionEvent::ExportProgress {
                    done,
                    total,
                    outcome: outcome.clone(),
                });
            })?;
            Ok(summary)
        });

        tokio::spawn(async move {
            let event = match worker.await {
                Ok(Ok(summary)) => SessionEvent::ExportComplete(summary),
                Ok(Err(e)) => SessionEvent::ExportFailed(e.to_string()),
                Err(e) => {
                    error!("Export worker panicked: {}", e);
                    SessionEvent::ExportFailed(e.to_string())
                }
            };
            sink.send(event);
        });

        Ok(())
    }

    /// Drain queued events in order, dropping stale ones and applying records.
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let mut fresh = Vec::new();
        while let Ok(tagged) = self.rx.try_recv() {
            // An export outlives a reload; its last event still ends it.
            if matches!(tagged.event, SessionEvent::ExportComplete(_) | SessionEvent::ExportFailed(_))
                && self.exporting == Some(tagged.generation)
            {
                self.exporting = None;
            }
            if tagged.generation != self.generation {
                debug!("Dropping stale event from generation {}", tagged.generation);
                continue;
            }
            match &tagged.event {
                SessionEvent::Record(record) => self.records.push(record.clone()),
                SessionEvent::AnalysisComplete { .. } | SessionEvent::AnalysisFailed(_) => {
                    self.analyzing = false;
                }
                _ => {}
            }
            fresh.push(tagged.event);
        }
        fresh
    }

    /// Poll every [`DEFAULT_POLL_INTERVAL`] until no pass is running, handing each event to `on_event`.
    pub async fn run_until_idle<F: FnMut(&SessionEvent)>(&mut self, mut on_event: F) {
        let mut ticker = tokio::time::interval(DEFAULT_POLL_INTERVAL);
        loop {
            ticker.tick().await;
            for event in self.poll() {
                on_event(&event);
            }
            if !self.is_busy() {
                break;
            }
        }
    }

    /// Re-derive customer names for records paid by `company`.
    pub fn relabel(&mut self, company: &str) -> RelabelOutcome {
        relabel(&mut self.records, company)
    }

    /// Apply a manual correction to the record with sequence number `seq`.
    pub fn correct(
        &mut self,
        seq: u32,
        name: &str,
        number: &str,
        amount: &str,
    ) -> std::result::Result<(), CorrectionError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.seq == seq)
            .ok_or(CorrectionError::UnknownSequence(seq))?;
        record.apply_correction(name, number, amount)
    }

    pub fn records(&self) -> &[ReceiptRecord] {
        &self.records
    }

    /// Candidate local-company names from the current records.
    pub fn distinct_payers(&self) -> Vec<String> {
        distinct_payers(&self.records)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// File name of the loaded document.
    pub fn document_name(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.name.as_str())
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.is_some()
    }

    /// Whether an analysis or export pass has not yet delivered its final event.
    pub fn is_busy(&self) -> bool {
        self.analyzing || self.is_exporting()
    }

    fn sink(&self) -> EventSink {
        EventSink {
            generation: self.generation,
            tx: self.tx.clone(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SplitterConfig::default())
    }
}
