//! The build engine: write one artifact per unit.

use crate::ops::emitter::{ArtifactEmitter, EmittedArtifact};
use crate::ops::errors::DriverResult;
use crate::util::fs::relative_path;
use crate::util::hash::short_digest;
use crate::util::shell::Status;

use super::EngineContext;

#[derive(Debug)]
pub struct BuildReport {
    pub artifacts: Vec<EmittedArtifact>,
    /// New value of the manifest build counter, if it could be updated
    pub build_number: Option<u64>,
}

pub(crate) fn invoke(ctx: EngineContext<'_>) -> DriverResult<BuildReport> {
    let EngineContext {
        options,
        package,
        store,
        paths,
        project,
        shell,
        ..
    } = ctx;

    let span = shell.span(format!(
        "`{}` v{} ({} unit{})",
        package.name,
        package.version,
        project.len(),
        if project.len() == 1 { "" } else { "s" }
    ));

    let emitter = ArtifactEmitter::new(&paths.output_dir, options.format());
    let mut artifacts = Vec::with_capacity(project.len());

    for unit in project.into_units() {
        let artifact = emitter.emit(&unit)?;
        shell.status(
            Status::Emitting,
            format!(
                "{} ({} bytes, sha256 {})",
                relative_path(&paths.root, &artifact.path).display(),
                artifact.size(),
                short_digest(&artifact.digest)
            ),
        );
        artifacts.push(artifact);
        // `unit` and its backend module are released here
    }

    let build_number = match store.bump_build() {
        Ok(n) => {
            tracing::debug!("package build number is now {}", n);
            Some(n)
        }
        Err(e) => {
            shell.warn(format!("could not update the build number: {}", e));
            None
        }
    };

    span.finish();

    Ok(BuildReport {
        artifacts,
        build_number,
    })
}
