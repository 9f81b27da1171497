use std::path::PathBuf;
use std::sync::Arc;

use scaleops_core::analysis::CannedEvaluator;
use scaleops_core::config::Config;
use scaleops_core::store::WorkspaceStore;
use scaleops_core::workflow::Workflow;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    /// The server is the remote, so its workflow never mirrors anywhere.
    pub workflow: Arc<Workflow>,
}

impl AppState {
    /// Open the project's store. Fails when `root` is not initialized.
    pub fn open(root: PathBuf) -> scaleops_core::Result<Self> {
        let config = Config::load(&root)?;
        let store = WorkspaceStore::open_project(&root, &config)?;
        let evaluator = Box::new(CannedEvaluator::from_config(&config));
        let workflow = Workflow::new(config, store, evaluator);
        Ok(Self {
            root,
            workflow: Arc::new(workflow),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaleops_core::ScaleOpsError;

    #[test]
    fn open_uninitialized_root_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = AppState::open(dir.path().to_path_buf()).err().unwrap();
        assert!(matches!(err, ScaleOpsError::NotInitialized));
    }

    #[test]
    fn open_initialized_root() {
        let dir = tempfile::TempDir::new().unwrap();
        Config::new("demo").save(dir.path()).unwrap();
        let state = AppState::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(state.root, dir.path());
        assert_eq!(state.workflow.config().project.name, "demo");
    }
}
