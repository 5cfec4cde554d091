use std::sync::Arc;
use std::thread;

use pwa_logging::{pwa_error, pwa_trace};
use tokio::sync::{mpsc, oneshot};

use crate::policy::FetchOutcome;
use crate::{Request, ServiceWorker, WorkerError};

enum WorkerCommand {
    Install {
        precache: Vec<String>,
        reply: oneshot::Sender<Result<(), WorkerError>>,
    },
    Fetch {
        request: Request,
        reply: oneshot::Sender<Result<FetchOutcome, WorkerError>>,
    },
}

/// Runs a worker in its own context: a dedicated thread with a
/// single-threaded event loop. Each signal becomes a task on that loop.
#[derive(Clone)]
pub struct WorkerHandle {
    cmd_tx: mpsc::UnboundedSender<WorkerCommand>,
}

impl WorkerHandle {
    pub fn spawn(worker: Arc<ServiceWorker>) -> Self {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();

        thread::spawn(move || {
            pwa_logging::set_context("worker");
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    // Dropping the receiver makes every later call fail with HostClosed.
                    pwa_error!("could not start worker event loop: {}", err);
                    return;
                }
            };
            let local = tokio::task::LocalSet::new();
            local.block_on(&runtime, async move {
                while let Some(command) = cmd_rx.recv().await {
                    let worker = worker.clone();
                    tokio::task::spawn_local(async move {
                        handle_command(&worker, command).await;
                    });
                }
            });
        });

        Self { cmd_tx }
    }

    /// Delivers the install signal and waits for the worker to activate.
    pub async fn install(&self, precache: Vec<String>) -> Result<(), WorkerError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(WorkerCommand::Install { precache, reply })
            .map_err(|_| WorkerError::HostClosed)?;
        rx.await.map_err(|_| WorkerError::HostClosed)?
    }

    /// Delivers a fetch event and waits for the worker's response.
    pub async fn fetch(&self, request: Request) -> Result<FetchOutcome, WorkerError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(WorkerCommand::Fetch { request, reply })
            .map_err(|_| WorkerError::HostClosed)?;
        rx.await.map_err(|_| WorkerError::HostClosed)?
    }
}

async fn handle_command(worker: &ServiceWorker, command: WorkerCommand) {
    match command {
        WorkerCommand::Install { precache, reply } => {
            let result = worker.install(&precache).await;
            let _ = reply.send(result);
        }
        WorkerCommand::Fetch { request, reply } => {
            pwa_trace!("fetch event {} {}", request.method, request.url);
            let result = worker.handle_fetch(&request).await;
            let _ = reply.send(result);
        }
    }
}
