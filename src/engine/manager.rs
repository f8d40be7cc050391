use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use super::error::{Result, WorkerError};
use super::messages::AnalysisReport;
use super::worker::Worker;
use crate::config::WorkerConfig;
use crate::data::MarketDataSource;

/// Registry entry of a running worker.
struct WorkerHandle {
    cancel: watch::Sender<bool>,
    join: JoinHandle<()>,
}

/// Starts, stops and tracks one worker per symbol.
///
/// The registry lock is only ever held for map reads/writes, never across an `.await`.
/// Dropping the manager drops every cancel sender, which stops all workers.
pub struct WorkerManager {
    /// Shared by every worker
    source: Arc<dyn MarketDataSource>,
    config: Arc<WorkerConfig>,

    /// Analysis reports of every worker
    reports: broadcast::Sender<AnalysisReport>,

    /// Registry of all running workers, by symbol
    active_workers: Mutex<HashMap<String, WorkerHandle>>,
}

impl WorkerManager {
    pub fn new(source: Arc<dyn MarketDataSource>, config: WorkerConfig) -> Self {
        let (reports, _) = broadcast::channel(config.broadcast_capacity.max(1));
        Self {
            source,
            config: Arc::new(config),
            reports,
            active_workers: Mutex::new(HashMap::new()),
        }
    }

    /// Launches a worker for `symbol` unless one is already registered.
    /// Must be called from within a Tokio runtime.
    pub fn start_worker(&self, symbol: &str) -> Result<()> {
        let mut workers = self.lock();
        if workers.contains_key(symbol) {
            return Err(WorkerError::AlreadyRunning(symbol.to_string()));
        }

        // Check, spawn and register under one lock so two callers can't both get past the check
        let (cancel, cancel_rx) = watch::channel(false);
        let worker = Worker::new(
            symbol,
            Arc::clone(&self.source),
            Arc::clone(&self.config),
            self.reports.clone(),
        );
        let join = tokio::spawn(worker.run(cancel_rx));
        workers.insert(symbol.to_string(), WorkerHandle { cancel, join });

        log::info!("Worker started for {}", symbol);
        Ok(())
    }

    /// Signals the worker for `symbol` to stop and forgets it straight away.
    /// Its tasks may still be unwinding when this returns.
    pub fn stop_worker(&self, symbol: &str) -> Result<()> {
        let handle = self
            .lock()
            .remove(symbol)
            .ok_or_else(|| WorkerError::NotRunning(symbol.to_string()))?;

        // Err only means the worker already finished on its own
        let _ = handle.cancel.send(true);

        log::info!("Worker stopped for {}", symbol);
        Ok(())
    }

    /// Symbols with a registered worker. Workers still unwinding after `stop_worker` are not listed.
    pub fn status(&self) -> BTreeSet<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn is_running(&self, symbol: &str) -> bool {
        self.lock().contains_key(symbol)
    }

    /// Receive every analysis report produced from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisReport> {
        self.reports.subscribe()
    }

    /// Stops every worker and waits until all of their tasks have finished.
    pub async fn shutdown(&self) {
        let drained: Vec<(String, WorkerHandle)> = self.lock().drain().collect();
        if drained.is_empty() {
            return;
        }

        for (_, handle) in &drained {
            let _ = handle.cancel.send(true);
        }
        for (symbol, handle) in drained {
            if let Err(e) = handle.join.await {
                log::error!("Worker for {} ended abnormally: {}", symbol, e);
            }
        }
        log::info!("All workers shut down");
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, WorkerHandle>> {
        self.active_workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
