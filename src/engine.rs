// src/engine.rs
use crate::lookup::Lookup;
use crate::resolver::{Resolve, UdpResolver};
use crate::types::{Config, GuesserError, LookupResult, ScanReport, ScanStats};
use crate::utils::{self, Wordlist};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;

/// Completion signal sent by a worker once the input queue is drained.
#[derive(Debug)]
struct Done;

type Batch = Vec<LookupResult>;

pub struct GuesserEngine {
    config: Config,
    lookup: Lookup,
}

impl GuesserEngine {
    pub async fn new(config: Config) -> Result<Self, GuesserError> {
        let resolver = UdpResolver::from_config(&config.resolver).await?;
        Ok(Self::with_resolver(config, Arc::new(resolver)))
    }

    pub fn with_resolver(config: Config, resolver: Arc<dyn Resolve>) -> Self {
        let lookup = Lookup::new(resolver, config.resolver.max_cname_hops);
        Self { config, lookup }
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.config.output.progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {pos} candidates tried, {msg} [{elapsed}]") {
            progress.set_style(style);
        }
        progress.set_message("0 found");
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }

    /// Brute-force `domain` with every label from `wordlist`.
    ///
    /// Returns once every candidate has been looked up exactly once. The
    /// result order is arrival order from the workers.
    pub async fn scan(&self, domain: &str, wordlist: Wordlist) -> Result<ScanReport, GuesserError> {
        let domain = utils::normalize_domain(domain);
        if !utils::is_valid_domain(&domain) {
            return Err(GuesserError::InvalidDomain(domain));
        }

        let workers = self.config.resolver.concurrency;
        if workers == 0 {
            return Err(GuesserError::ConfigError("Concurrency must be at least 1".to_string()));
        }

        info!(
            "Guessing subdomains of {} with {} workers against {}",
            domain, workers, self.config.resolver.server
        );
        let start_time = Instant::now();

        let progress = self.progress_bar();
        let outcome = self.run_pool(&domain, wordlist, workers, &progress).await;
        progress.finish_and_clear();
        let (candidates, results) = outcome?;

        let resolved_hostnames = results
            .iter()
            .map(|r| r.hostname.as_str())
            .collect::<HashSet<_>>()
            .len();

        let stats = ScanStats {
            candidates,
            resolved_hostnames,
            results: results.len(),
            duration: start_time.elapsed(),
        };

        Ok(ScanReport {
            domain,
            server: self.config.resolver.server.clone(),
            results,
            stats,
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Feed the workers, then shut down in order. Returns the number of
    /// candidates sent and the aggregated results.
    async fn run_pool(
        &self,
        domain: &str,
        mut wordlist: Wordlist,
        workers: usize,
        progress: &ProgressBar,
    ) -> Result<(usize, Vec<LookupResult>), GuesserError> {
        let (input_tx, input_rx) = mpsc::channel::<String>(workers);
        let (gather_tx, gather_rx) = mpsc::channel::<Batch>(workers);
        let (tracker_tx, mut tracker_rx) = mpsc::channel::<Done>(workers);
        let (collected_tx, collected_rx) = oneshot::channel::<Vec<LookupResult>>();

        let input_rx = Arc::new(Mutex::new(input_rx));
        let handles: Vec<JoinHandle<()>> = (0..workers)
            .map(|id| {
                self.spawn_worker(
                    id,
                    input_rx.clone(),
                    gather_tx.clone(),
                    tracker_tx.clone(),
                    progress.clone(),
                )
            })
            .collect();
        drop(tracker_tx);
        drop(input_rx);

        let aggregator = Self::spawn_aggregator(gather_rx, collected_tx, progress.clone());

        let mut candidates = 0;
        while let Some(label) = wordlist.next_label().await? {
            let name = utils::candidate_name(&label, domain);
            input_tx
                .send(name)
                .await
                .map_err(|_| GuesserError::WorkerError("All workers exited before the wordlist was consumed".to_string()))?;
            candidates += 1;
        }

        // Phase 1: no more candidates, wait until no worker can send.
        drop(input_tx);
        let mut finished = 0;
        while finished < workers {
            match tracker_rx.recv().await {
                Some(Done) => finished += 1,
                None => {
                    return Err(GuesserError::WorkerError(format!(
                        "{} of {} workers exited without finishing",
                        workers - finished,
                        workers
                    )))
                }
            }
        }
        debug!("All {} workers finished", workers);

        // Phase 2: close the aggregation queue and take the collection.
        drop(gather_tx);
        let results = collected_rx
            .await
            .map_err(|_| GuesserError::WorkerError("Aggregator exited without handing over results".to_string()))?;

        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Worker task failed after signalling completion: {}", e);
            }
        }
        if let Err(e) = aggregator.await {
            warn!("Aggregator task failed after handing over results: {}", e);
        }

        Ok((candidates, results))
    }

    fn spawn_worker(
        &self,
        id: usize,
        input: Arc<Mutex<mpsc::Receiver<String>>>,
        gather: mpsc::Sender<Batch>,
        tracker: mpsc::Sender<Done>,
        progress: ProgressBar,
    ) -> JoinHandle<()> {
        let lookup = self.lookup.clone();

        tokio::spawn(async move {
            let mut processed = 0usize;
            loop {
                // Only one worker waits on the queue at a time.
                let next = input.lock().await.recv().await;
                let Some(name) = next else { break };

                let results = lookup.lookup(&name).await;
                processed += 1;
                progress.inc(1);

                if !results.is_empty() && gather.send(results).await.is_err() {
                    break;
                }
            }

            debug!("Worker {} done after {} candidates", id, processed);
            drop(gather);
            let _ = tracker.send(Done).await;
        })
    }

    fn spawn_aggregator(
        mut gather: mpsc::Receiver<Batch>,
        collected: oneshot::Sender<Vec<LookupResult>>,
        progress: ProgressBar,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut results = Vec::new();
            while let Some(batch) = gather.recv().await {
                results.extend(batch);
                progress.set_message(format!("{} found", results.len()));
            }
            let _ = collected.send(results);
        })
    }
}
