use async_trait::async_trait;
use guestmail_common::Diagnostic;
use regex::Regex;
use std::io::ErrorKind;
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::compiler::{CompileError, CompileOptions, CompileOutput, MarkupCompiler};

/// How long a compile may run before the child is killed
pub const DEFAULT_COMPILE_TIMEOUT: Duration = Duration::from_secs(10);

/// `Line 5 of stdin (mj-texte) — mj-texte is not a valid tag`
fn diagnostic_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^Line (\d+)(?: of [^(]*)?\s*\(([^)]+)\)\s*(?:—|-)+\s*(.+)$")
            .expect("diagnostic pattern is valid")
    })
}

/// Compiler backed by an external executable.
///
/// Source goes to stdin, html comes back on stdout. Stderr lines in the
/// `Line N ... (tag) — message` shape become diagnostics. A child that
/// outlives the timeout is killed and the compile fails.
#[derive(Debug, Clone)]
pub struct ProcessCompiler {
    program: String,
    args: Vec<String>,
    /// Append `--config.*` flags derived from `CompileOptions`
    pass_options: bool,
    timeout: Duration,
}

impl ProcessCompiler {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            pass_options: false,
            timeout: DEFAULT_COMPILE_TIMEOUT,
        }
    }

    /// The `mjml` command line tool reading stdin and writing stdout
    pub fn mjml() -> Self {
        Self {
            program: "mjml".to_string(),
            args: vec!["-i".to_string(), "-s".to_string()],
            pass_options: true,
            timeout: DEFAULT_COMPILE_TIMEOUT,
        }
    }

    pub fn pass_options(mut self, pass: bool) -> Self {
        self.pass_options = pass;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, options: &CompileOptions) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if self.pass_options {
            command.arg(format!(
                "--config.validationLevel={}",
                options.validation_level.as_str()
            ));
            if options.minify {
                command.arg("--config.minify=true");
            }
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl MarkupCompiler for ProcessCompiler {
    async fn compile(
        &self,
        source: &str,
        options: &CompileOptions,
    ) -> Result<CompileOutput, CompileError> {
        let start = Instant::now();
        let mut child = match self.command(options).spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CompileError::Unavailable(format!(
                    "{} is not installed",
                    self.program
                )));
            }
            Err(e) => return Err(e.into()),
        };

        // Feed stdin from its own task so a chatty child can't fill its
        // stdout pipe while we are still writing.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = source.as_bytes().to_vec();
            tokio::spawn(async move {
                let written = stdin.write_all(&input).await;
                drop(stdin);
                written
            })
        });
        let stdout_task = tokio::spawn(read_stream(child.stdout.take()));
        let stderr_task = tokio::spawn(read_stream(child.stderr.take()));

        // On timeout `child` is dropped here and kill_on_drop ends it
        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                warn!(
                    program = %self.program,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "External compiler timed out"
                );
                return Err(CompileError::Failed(format!(
                    "{} timed out after {} ms",
                    self.program,
                    self.timeout.as_millis()
                )));
            }
        };

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                // The child may exit before reading everything
                Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => return Err(CompileError::Failed("stdin writer panicked".to_string())),
            }
        }
        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        let stderr = String::from_utf8_lossy(&stderr);
        let diagnostics = parse_diagnostics(&stderr);
        debug!(
            program = %self.program,
            status = ?status.code(),
            diagnostics = diagnostics.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "External compiler finished"
        );

        if !status.success() && diagnostics.is_empty() {
            return Err(CompileError::Failed(stderr.trim().to_string()));
        }

        Ok(CompileOutput {
            html: String::from_utf8_lossy(&stdout).into_owned(),
            diagnostics,
        })
    }
}

async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut handle) = handle {
        let _ = handle.read_to_end(&mut buf).await;
    }
    buf
}

fn parse_diagnostics(stderr: &str) -> Vec<Diagnostic> {
    stderr
        .lines()
        .filter_map(|line| {
            let caps = diagnostic_pattern().captures(line.trim())?;
            let line_no = caps[1].parse().ok()?;
            Some(
                Diagnostic::new(caps[3].trim())
                    .at_line(line_no)
                    .with_tag(&caps[2]),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mjml_stderr() {
        let stderr = "\
Line 4 of stdin (mj-texte) — mj-texte is not a valid tag
some unrelated noise
Line 9 (mj-button) - Attribute hreff is illegal
";
        let diagnostics = parse_diagnostics(stderr);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].line, Some(4));
        assert_eq!(diagnostics[0].tag.as_deref(), Some("mj-texte"));
        assert_eq!(diagnostics[0].message, "mj-texte is not a valid tag");
        assert_eq!(diagnostics[1].message, "Attribute hreff is illegal");
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let compiler = ProcessCompiler::new("guestmail-no-such-compiler-binary", vec![]);
        let result = compiler.compile("<mjml/>", &CompileOptions::default()).await;
        assert!(matches!(result, Err(CompileError::Unavailable(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_becomes_html() {
        let compiler = ProcessCompiler::new("cat", vec![]);
        let output = compiler
            .compile("<p>hello</p>", &CompileOptions::default())
            .await
            .unwrap();
        assert_eq!(output.html, "<p>hello</p>");
        assert!(output.diagnostics.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_without_diagnostics_is_error() {
        let compiler = ProcessCompiler::new(
            "sh",
            vec!["-c".to_string(), "cat >/dev/null; echo broken >&2; exit 3".to_string()],
        );
        match compiler.compile("<mjml/>", &CompileOptions::default()).await {
            Err(CompileError::Failed(message)) => assert_eq!(message, "broken"),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_with_diagnostics_reports_them() {
        let script = "cat >/dev/null; echo 'Line 2 of stdin (mj-colum) — mj-colum is not a valid tag' >&2; exit 1";
        let compiler = ProcessCompiler::new("sh", vec!["-c".to_string(), script.to_string()]);
        let output = compiler
            .compile("<mjml/>", &CompileOptions::default())
            .await
            .unwrap();
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].line, Some(2));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_compiler_is_killed_at_timeout() {
        let compiler = ProcessCompiler::new("sh", vec!["-c".to_string(), "sleep 5".to_string()])
            .with_timeout(Duration::from_millis(100));

        let started = Instant::now();
        let result = compiler.compile("<mjml/>", &CompileOptions::default()).await;
        assert!(started.elapsed() < Duration::from_secs(2));
        match result {
            Err(CompileError::Failed(message)) => {
                assert_eq!(message, "sh timed out after 100 ms")
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fast_compiler_finishes_inside_timeout() {
        let compiler =
            ProcessCompiler::new("cat", vec![]).with_timeout(Duration::from_secs(5));
        let output = compiler
            .compile("<p>quick</p>", &CompileOptions::default())
            .await
            .unwrap();
        assert_eq!(output.html, "<p>quick</p>");
    }
}
