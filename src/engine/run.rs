//! The run engine: emit textual IR and execute the entry unit with `lli`.

use crate::core::options::ArtifactFormat;
use crate::core::tool::{ToolResolver, ToolType};
use crate::ops::emitter::ArtifactEmitter;
use crate::ops::errors::{DriverError, DriverResult};
use crate::util::process::ProcessBuilder;
use crate::util::shell::Status;

use super::EngineContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub entry: String,
    /// Exit code of the program, `None` if it was terminated by a signal
    pub exit_code: Option<i32>,
}

pub(crate) fn invoke(ctx: EngineContext<'_>) -> DriverResult<RunReport> {
    let EngineContext {
        options,
        package,
        paths,
        project,
        shell,
        platform,
        ..
    } = ctx;

    if options.bitcode {
        shell.warn("`--bitcode` is ignored by `run`; emitting textual IR");
    }

    let entry = package.entry().to_string();
    if project.unit(&entry).is_none() {
        let available: Vec<_> = project.units().iter().map(|u| u.name()).collect();
        return Err(DriverError::EntryNotFound {
            entry,
            available: available.join(", "),
        });
    }

    let emitter = ArtifactEmitter::new(&paths.output_dir, ArtifactFormat::Text);
    let mut entry_path = None;
    let mut extra_modules = Vec::new();
    for unit in project.into_units() {
        let artifact = emitter.emit(&unit)?;
        shell.detail(Status::Emitting, artifact.path.display());
        if artifact.unit == entry {
            entry_path = Some(artifact.path);
        } else {
            extra_modules.push(artifact.path);
        }
    }

    let entry_path = entry_path.ok_or_else(|| {
        DriverError::Internal(format!("entry unit `{}` was not emitted", entry))
    })?;

    let resolver = ToolResolver::new(platform, Some(options.tools_dir()));
    let lli = resolver
        .locate(ToolType::Lli)
        .ok_or(DriverError::ToolNotFound { tool: ToolType::Lli })?;

    let cmd = ProcessBuilder::new(lli)
        .args(
            extra_modules
                .iter()
                .map(|p| format!("--extra-module={}", p.display())),
        )
        .arg(&entry_path)
        .cwd(&paths.root);

    shell.status(Status::Running, format!("`{}`", cmd.display_command()));

    let status = cmd.status().map_err(|e| DriverError::Execution {
        command: cmd.display_command(),
        message: format!("{:#}", e),
    })?;

    let exit_code = status.code();
    match exit_code {
        Some(code) => shell.status(Status::Finished, format!("program exited with {}", code)),
        None => shell.warn("program was terminated by a signal"),
    }

    Ok(RunReport { entry, exit_code })
}
