//! Shared pipeline helpers: filesystem loading and the frontend stages.

use std::path::{Path, PathBuf};
use std::process;

use rill_ast::SourceMap;
use rill_diagnostics::{formatter, json::DiagnosticReport, DiagnosticSink, SinkMode, ToDiagnostic};
use rill_resolve::{load_program, ModuleLoader, ResolvedProgram};
use rill_types::{typecheck, CheckOptions};

use crate::output;

/// Configuration toggles recognized by the core.
#[derive(Debug, Clone)]
pub struct Options {
    /// Surface every diagnostic instead of only the first.
    pub all_errors: bool,
    /// Treat operands of unknown type as errors where a specific type is
    /// required.
    pub strict_types: bool,
    /// Evaluator step ceiling.
    pub max_steps: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            all_errors: false,
            strict_types: true,
            max_steps: None,
        }
    }
}

impl Options {
    pub fn sink_mode(&self) -> SinkMode {
        if self.all_errors {
            SinkMode::All
        } else {
            SinkMode::FirstOnly
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Human,
    Json,
}

/// Resolves `import foo;` to `foo.rill` next to the importing file.
pub struct FsLoader {
    base_dir: PathBuf,
}

impl FsLoader {
    pub fn for_file(path: &str) -> Self {
        let base_dir = Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { base_dir }
    }

    fn module_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.rill", name))
    }
}

impl ModuleLoader for FsLoader {
    fn load(&self, name: &str) -> Result<String, String> {
        std::fs::read_to_string(self.module_path(name)).map_err(|e| e.to_string())
    }

    fn display_name(&self, name: &str) -> String {
        self.module_path(name).display().to_string()
    }
}

/// Print the surfaced diagnostics and exit non-zero.
pub fn fail_with_diagnostics(
    sink: &DiagnosticSink,
    sources: &SourceMap,
    path: &str,
    phase: &str,
    format: Format,
) -> ! {
    let surfaced = sink.surfaced();
    match format {
        Format::Human => {
            for diagnostic in surfaced {
                eprint!("{}", formatter::render(diagnostic, sources));
            }
            eprintln!("\n{}", output::banner_fail(phase, surfaced.len()));
        }
        Format::Json => {
            let report = DiagnosticReport::new(path, surfaced, sources);
            println!(
                "{}",
                serde_json::to_string_pretty(&report).expect("report serializes")
            );
        }
    }
    process::exit(1);
}

/// Run the frontend (load → parse → resolve → typecheck) on a root file.
/// Exits the process on any diagnostic.
pub fn run_frontend(
    path: &str,
    options: &Options,
    format: Format,
) -> (ResolvedProgram, SourceMap) {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!(
                "{}: reading {}: {}",
                output::error_label(),
                output::file_path(path),
                e
            );
            process::exit(1);
        }
    };

    let root_name = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("main")
        .to_string();
    let loader = FsLoader::for_file(path);

    let (sources, result) = load_program(&root_name, path, source, &loader);
    let program = match result {
        Ok(program) => program,
        Err(errors) => {
            let mut sink = DiagnosticSink::new(options.sink_mode());
            sink.report_all(errors);
            fail_with_diagnostics(&sink, &sources, path, "Frontend", format);
        }
    };

    let check_options = CheckOptions {
        strict_types: options.strict_types,
    };
    if let Err(errors) = typecheck(&program, &check_options) {
        let mut sink = DiagnosticSink::new(options.sink_mode());
        sink.report_all(errors);
        fail_with_diagnostics(&sink, &sources, path, "Typecheck", format);
    }

    (program, sources)
}

/// Run a program end to end.
pub fn cmd_run(path: &str, options: &Options, format: Format) {
    let (program, sources) = run_frontend(path, options, format);

    let mut interp =
        rill_interp::Interpreter::new(&program).with_max_steps(options.max_steps);
    if let Err(diag) = interp.run() {
        let diagnostic = diag.to_diagnostic();
        match format {
            Format::Human => {
                eprint!("{}", formatter::render(&diagnostic, &sources));
                eprint!(
                    "{}",
                    formatter::render_call_chain(interp.call_chain(), &sources)
                );
                eprintln!("\n{}", output::banner_fail("Runtime", 1));
            }
            Format::Json => {
                let report = DiagnosticReport::new(path, &[diagnostic], &sources);
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).expect("report serializes")
                );
            }
        }
        process::exit(1);
    }
}

/// Frontend only: parse, resolve, and type-check without executing.
pub fn cmd_check(path: &str, options: &Options, format: Format) {
    let _ = run_frontend(path, options, format);
    match format {
        Format::Human => println!("{}", output::banner_ok("Check")),
        Format::Json => {
            let report = DiagnosticReport::new(path, &[], &SourceMap::new());
            println!(
                "{}",
                serde_json::to_string_pretty(&report).expect("report serializes")
            );
        }
    }
}
