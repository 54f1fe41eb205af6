//! Common test utilities for vidmerge integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use vidmerge::{ConcatHandler, Config, MergeService};

/// Joins inputs by appending their bytes
pub struct ByteConcatHandler;

#[async_trait]
impl ConcatHandler for ByteConcatHandler {
    async fn concat(
        &self,
        inputs: &[PathBuf],
        _work_dir: &Path,
        output: &Path,
    ) -> vidmerge::Result<()> {
        let mut joined = Vec::new();
        for input in inputs {
            joined.extend(tokio::fs::read(input).await?);
        }
        tokio::fs::write(output, joined).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "bytes"
    }
}

/// Config rooted in `temp` with background sweeps disabled
pub fn test_config(temp: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.output_dir = temp.path().join("output");
    config.storage.work_dir = Some(temp.path().join("work"));
    config.retention.sweep_interval = Duration::ZERO;
    config.tools.search_path = false;
    config
}

/// A server running on an ephemeral port
pub struct TestServer {
    /// Address the server listens on
    pub address: SocketAddr,
    /// The service behind the server
    pub service: Arc<MergeService>,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<vidmerge::Result<()>>,
}

impl TestServer {
    /// Start a server for `config` using `handler` for concatenation
    pub async fn start(config: Config, handler: Arc<dyn ConcatHandler>) -> Self {
        let service = Arc::new(MergeService::with_handler(config, handler).await.unwrap());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();

        let handle = tokio::spawn(vidmerge::api::serve(
            listener,
            service.clone(),
            service.config.clone(),
            async move {
                stopped.await.ok();
            },
        ));

        Self {
            address,
            service,
            stop: Some(stop),
            handle,
        }
    }

    /// Absolute URL for `path` on this server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    /// Stop the server and wait for it to finish
    pub async fn stop(mut self) -> vidmerge::Result<()> {
        if let Some(stop) = self.stop.take() {
            stop.send(()).ok();
        }
        tokio::time::timeout(Duration::from_secs(5), &mut self.handle)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked")
    }
}
