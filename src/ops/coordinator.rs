//! Per-file compilation dispatch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::core::project::{CompiledUnit, Project};
use crate::frontend::Frontend;
use crate::ops::errors::{DriverError, DriverResult};
use crate::util::fs::relative_path;
use crate::util::shell::{Shell, Status};

/// Compiles scanned files through a front-end into a [`Project`].
pub struct CompilationCoordinator<'a> {
    frontend: &'a dyn Frontend,
    shell: Arc<Shell>,
    jobs: Option<usize>,
}

impl<'a> CompilationCoordinator<'a> {
    pub fn new(frontend: &'a dyn Frontend, shell: Arc<Shell>) -> Self {
        CompilationCoordinator {
            frontend,
            shell,
            jobs: None,
        }
    }

    /// Limit the number of parallel compile jobs.
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Compile every file. Units land in the project in the order of
    /// `files`; the first failure in that order aborts the invocation.
    ///
    /// Once a file has failed, files after it in scan order are skipped.
    pub fn compile(&self, source_root: &Path, files: &[PathBuf]) -> DriverResult<Project> {
        if let Some(j) = self.jobs {
            rayon::ThreadPoolBuilder::new()
                .num_threads(j)
                .build_global()
                .ok(); // Ignore if already set
        }

        let progress = self.shell.progress(files.len() as u64, "Compiling");
        let first_failure = AtomicUsize::new(usize::MAX);

        let results: Vec<Option<DriverResult<CompiledUnit>>> = files
            .par_iter()
            .enumerate()
            .map(|(index, file)| {
                if first_failure.load(Ordering::Acquire) < index {
                    return None;
                }

                self.shell.detail(
                    Status::Compiling,
                    format!("{} ...", relative_path(source_root, file).display()),
                );
                let unit = self
                    .frontend
                    .compile(source_root, file)
                    .map_err(|source| DriverError::Compile {
                        file: file.clone(),
                        source,
                    });
                if unit.is_err() {
                    first_failure.fetch_min(index, Ordering::AcqRel);
                }
                progress.inc();
                Some(unit)
            })
            .collect();

        progress.finish();

        let mut project = Project::new();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        for result in results {
            // A skipped file always sits behind a failed one.
            let unit = result.ok_or_else(|| {
                DriverError::Internal("compilation skipped a file before any failure".to_string())
            })??;

            if let Some(first) = seen.insert(unit.name().to_string(), unit.source().to_path_buf()) {
                return Err(DriverError::DuplicateUnit {
                    unit: unit.name().to_string(),
                    first,
                    second: unit.source().to_path_buf(),
                });
            }
            project.push(unit);
        }

        tracing::debug!("Processed {} file(s).", project.len());
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::IrModule;
    use crate::core::project::unit_name;
    use crate::frontend::{FrontendError, IonFrontend, Pos};
    use crate::util::shell::{ColorChoice, Verbosity};
    use std::time::Duration;
    use tempfile::TempDir;

    fn quiet() -> Arc<Shell> {
        Arc::new(Shell::new(Verbosity::Quiet, ColorChoice::Never))
    }

    /// Finishes files in reverse order to shake out ordering bugs.
    struct SlowFirst;

    impl Frontend for SlowFirst {
        fn compile(&self, root: &Path, file: &Path) -> Result<CompiledUnit, FrontendError> {
            let name = unit_name(root, file);
            let delay = 10 * (5 - name.len().min(5)) as u64;
            std::thread::sleep(Duration::from_millis(delay));
            Ok(CompiledUnit::new(name.clone(), file, Box::new(IrModule::new(name, ""))))
        }
    }

    #[test]
    fn test_order_matches_scan_order() {
        let root = Path::new("/src");
        let files: Vec<PathBuf> = ["a", "bb", "ccc", "dddd"]
            .iter()
            .map(|n| root.join(format!("{n}.ion")))
            .collect();

        let project = CompilationCoordinator::new(&SlowFirst, quiet())
            .compile(root, &files)
            .unwrap();

        let names: Vec<_> = project.units().iter().map(|u| u.name()).collect();
        assert_eq!(names, ["a", "bb", "ccc", "dddd"]);
    }

    #[test]
    fn test_failure_names_file() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good.ion");
        let bad = tmp.path().join("bad.ion");
        std::fs::write(&good, "fn main() -> i32 { return 0; }").unwrap();
        std::fs::write(&bad, "fn main() -> i32 { return 0 }").unwrap();

        let frontend = IonFrontend::new();
        let err = CompilationCoordinator::new(&frontend, quiet())
            .compile(tmp.path(), &[good, bad.clone()])
            .unwrap_err();

        match err {
            DriverError::Compile { file, source } => {
                assert_eq!(file, bad);
                assert_eq!(source.pos(), Some(Pos::new(1, 29)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    /// Counts compile calls and fails on files named `bad`.
    struct Counting(AtomicUsize);

    impl Frontend for Counting {
        fn compile(&self, root: &Path, file: &Path) -> Result<CompiledUnit, FrontendError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            let name = unit_name(root, file);
            if name == "bad" {
                return Err(FrontendError::syntax(Pos::new(1, 1), "broken"));
            }
            Ok(CompiledUnit::new(name.clone(), file, Box::new(IrModule::new(name, ""))))
        }
    }

    #[test]
    fn test_stops_after_failure() {
        let root = Path::new("/src");
        let files: Vec<PathBuf> = ["bad", "b", "c", "d"]
            .iter()
            .map(|n| root.join(format!("{n}.ion")))
            .collect();

        // A private single-threaded pool keeps the order of calls fixed.
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let frontend = Counting(AtomicUsize::new(0));
        let err = pool
            .install(|| CompilationCoordinator::new(&frontend, quiet()).compile(root, &files))
            .unwrap_err();

        assert!(matches!(err, DriverError::Compile { ref file, .. } if file.ends_with("bad.ion")));
        assert_eq!(frontend.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_colliding_unit_names_fail() {
        let tmp = TempDir::new().unwrap();
        let dotted = tmp.path().join("a.b.ion");
        let nested = tmp.path().join("a").join("b.ion");
        std::fs::create_dir(tmp.path().join("a")).unwrap();
        std::fs::write(&dotted, "fn one() -> i32 { return 1; }").unwrap();
        std::fs::write(&nested, "fn two() -> i32 { return 2; }").unwrap();

        let frontend = IonFrontend::new();
        let err = CompilationCoordinator::new(&frontend, quiet())
            .compile(tmp.path(), &[dotted.clone(), nested.clone()])
            .unwrap_err();

        match err {
            DriverError::DuplicateUnit { unit, first, second } => {
                assert_eq!(unit, "a.b");
                assert_eq!(first, dotted);
                assert_eq!(second, nested);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_compile_real_files() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("main.ion");
        std::fs::write(&file, "fn main() -> i32 { return 1 + 2; }").unwrap();

        let frontend = IonFrontend::new();
        let project = CompilationCoordinator::new(&frontend, quiet())
            .jobs(Some(2))
            .compile(tmp.path(), &[file])
            .unwrap();
        assert_eq!(project.len(), 1);
        assert_eq!(project.units()[0].name(), "main");
    }
}
