//! Operation engines.
//!
//! An engine receives the compiled project and decides what to do with it.
//! The set of engines is closed: every operation that reaches dispatch maps
//! to exactly one variant.

pub mod build;
pub mod run;

use std::sync::Arc;

use crate::core::manifest::{ManifestStore, Package};
use crate::core::operation::Operation;
use crate::core::options::Options;
use crate::core::project::Project;
use crate::core::tool::Platform;
use crate::ops::driver::ResolvedPaths;
use crate::ops::errors::DriverResult;
use crate::util::shell::Shell;

pub use build::BuildReport;
pub use run::RunReport;

/// Everything an engine needs for one invocation.
pub struct EngineContext<'a> {
    pub options: &'a Options,
    pub package: &'a Package,
    pub store: &'a ManifestStore,
    pub paths: &'a ResolvedPaths,
    pub project: Project,
    pub shell: Arc<Shell>,
    pub platform: Platform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Build,
    Run,
}

impl Engine {
    /// Engine for an operation. `Init` never reaches dispatch and has none.
    pub fn for_operation(operation: Operation) -> Option<Engine> {
        match operation {
            Operation::Build => Some(Engine::Build),
            Operation::Run => Some(Engine::Run),
            Operation::Init => None,
        }
    }

    pub fn invoke(self, ctx: EngineContext<'_>) -> DriverResult<EngineReport> {
        match self {
            Engine::Build => build::invoke(ctx).map(EngineReport::Built),
            Engine::Run => run::invoke(ctx).map(EngineReport::Ran),
        }
    }
}

/// What an engine produced.
#[derive(Debug)]
pub enum EngineReport {
    Built(BuildReport),
    Ran(RunReport),
}
