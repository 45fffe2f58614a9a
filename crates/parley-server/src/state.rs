use std::path::PathBuf;
use std::sync::Arc;

use parley::capabilities::CapabilityRegistry;
use parley::runtime::GenerationRuntime;

/// Shared application state. The registry and runtime are built once at
/// startup; every request borrows them through the `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<dyn GenerationRuntime>,
    pub registry: Arc<CapabilityRegistry>,
    pub uploads_dir: PathBuf,
}
