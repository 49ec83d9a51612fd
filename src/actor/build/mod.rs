//! Build Actor - runs rebuild cycles
//!
//! Each cycle runs on tokio's blocking pool:
//!
//! ```text
//! Rebuild --> Building (build-start hooks) --> Bundling (emit) --> CycleDone
//! ```
//!
//! Success sends one `Reload` to the WsActor; failure sends `Error` and the
//! actor goes back to waiting for changes.

mod scheduler;


pub use scheduler::{Admission, RebuildState, Scheduler, Trigger};

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::messages::{BuildMsg, WsMsg};
use crate::bundler::{BundleReport, Bundler};
use crate::core::BuildError;

pub struct BuildActor {
    rx: mpsc::Receiver<BuildMsg>,
    /// Loopback for `CycleDone`
    tx: mpsc::Sender<BuildMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    bundler: Arc<Bundler>,
    scheduler: Arc<Mutex<Scheduler>>,
    /// Last cycle failed; the next success clears the browser overlay
    failed: bool,
}

impl BuildActor {
    pub fn new(
        rx: mpsc::Receiver<BuildMsg>,
        tx: mpsc::Sender<BuildMsg>,
        ws_tx: mpsc::Sender<WsMsg>,
        bundler: Arc<Bundler>,
    ) -> Self {
        Self {
            rx,
            tx,
            ws_tx,
            bundler,
            scheduler: Arc::new(Mutex::new(Scheduler::new())),
            failed: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn scheduler(&self) -> Arc<Mutex<Scheduler>> {
        Arc::clone(&self.scheduler)
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                BuildMsg::Rebuild { changes } => {
                    let (admission, state) = {
                        let mut scheduler = self.scheduler.lock();
                        let state = scheduler.state();
                        (scheduler.request(changes), state)
                    };
                    match admission {
                        Admission::Start(trigger) => self.start_cycle(trigger),
                        Admission::Queued => {
                            crate::debug!("build"; "{:?} in progress, changes queued", state);
                        }
                    }
                }

                BuildMsg::CycleDone(result) => {
                    self.report(result).await;
                    let next = self.scheduler.lock().finish();
                    if let Some(trigger) = next {
                        self.start_cycle(trigger);
                    }
                }

                BuildMsg::Shutdown => {
                    crate::debug!("build"; "shutting down");
                    break;
                }
            }
        }
    }

    fn start_cycle(&self, trigger: Trigger) {
        if trigger.is_initial() {
            crate::log!("build"; "initial build ({})", self.bundler.config().mode);
        } else {
            crate::debug!("build"; "rebuilding for {} change(s)", trigger.changes.len());
        }
        // native build output goes straight to the terminal
        crate::logger::status_detach();

        let bundler = Arc::clone(&self.bundler);
        let scheduler = Arc::clone(&self.scheduler);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || run_cycle(&bundler, &scheduler))
                .await
                .unwrap_or_else(|_| Err(BuildError::Panicked));
            let _ = tx.send(BuildMsg::CycleDone(result)).await;
        });
    }

    async fn report(&mut self, result: Result<BundleReport, BuildError>) {
        match result {
            Ok(report) => {
                crate::core::set_ready();
                if std::mem::take(&mut self.failed) {
                    let _ = self.ws_tx.send(WsMsg::ClearError).await;
                }
                crate::logger::status_success(&format!("built {report}"));
                let _ = self.ws_tx.send(WsMsg::Reload).await;
            }
            Err(err) => {
                self.failed = true;
                let category = err.category();
                let detail = format!("{:#}", anyhow::Error::new(err));
                crate::logger::status_error(&format!("[{category}] rebuild failed"), &detail);
                let _ = self
                    .ws_tx
                    .send(WsMsg::Error {
                        category: category.to_string(),
                        error: detail,
                    })
                    .await;
            }
        }
    }
}

/// One rebuild cycle; runs on a blocking thread.
fn run_cycle(bundler: &Bundler, scheduler: &Mutex<Scheduler>) -> Result<BundleReport, BuildError> {
    bundler.start()?;
    scheduler.lock().enter(RebuildState::Bundling);
    bundler.emit()
}
