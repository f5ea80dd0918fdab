use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::artifacts::{ArtifactStore, ContractArtifact};
use crate::chain::ChainAdapter;
use crate::forge_utils::ContractSpec;
use crate::report::Report;
use crate::serde_utils;

pub struct DeploymentContext {
    pub chain: Arc<dyn ChainAdapter>,
    pub artifacts: ArtifactStore,
    pub verify_sources: bool,
    report: Mutex<Report>,
    report_path: Option<PathBuf>,
}

impl DeploymentContext {
    pub fn new(
        chain: Arc<dyn ChainAdapter>,
        artifacts: ArtifactStore,
        verify_sources: bool,
        report: Report,
    ) -> Self {
        Self {
            chain,
            artifacts,
            verify_sources,
            report: Mutex::new(report),
            report_path: None,
        }
    }

    /// Persist the report to `path` every time it changes.
    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    pub async fn load_artifact(
        &self,
        spec: &ContractSpec,
    ) -> eyre::Result<ContractArtifact> {
        self.artifacts.load(spec).await
    }

    pub async fn record(&self, update: impl FnOnce(&mut Report)) -> eyre::Result<()> {
        let mut report = self.report.lock().await;

        update(&mut report);

        if let Some(path) = &self.report_path {
            serde_utils::write_serialize(path, &*report).await?;
        }

        Ok(())
    }

    pub async fn report(&self) -> Report {
        self.report.lock().await.clone()
    }
}
