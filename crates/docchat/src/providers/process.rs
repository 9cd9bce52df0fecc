//! Model runner spawned as a child process (`ollama run <model>`)
//!
//! Each call starts a fresh process, writes the prompt to its stdin and waits
//! for it to exit. There is no pooling: concurrent requests start concurrent
//! runners.

use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::config::LlmConfig;
use crate::generation::format_response;

use super::inferencer::{InferenceError, Inferencer};

type OutputReader = JoinHandle<std::io::Result<Vec<u8>>>;

const AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(10);

/// Inferencer backed by a local runner executable
pub struct ProcessInferencer {
    command: String,
    args: Vec<String>,
    model: String,
    timeout: Duration,
}

impl ProcessInferencer {
    /// Create from configuration: `<command> run <model>`
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args(),
            model: config.model.clone(),
            timeout: config.timeout(),
        }
    }

    /// Create with an arbitrary command line
    pub fn from_parts(
        command: impl Into<String>,
        args: Vec<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            args,
            model: model.into(),
            timeout,
        }
    }

    /// Check if the runner executable starts and answers `--version`
    pub async fn is_available(&self) -> bool {
        let mut probe = Command::new(&self.command);
        probe.arg("--version").stdin(Stdio::null()).kill_on_drop(true);

        match tokio::time::timeout(AVAILABILITY_TIMEOUT, probe.output()).await {
            Ok(Ok(output)) => output.status.success(),
            Ok(Err(e)) => {
                tracing::debug!("Failed to start '{}': {}", self.command, e);
                false
            }
            Err(_) => {
                tracing::debug!("'{} --version' did not finish in time", self.command);
                false
            }
        }
    }

    fn spawn(&self) -> Result<Child, InferenceError> {
        Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A dropped request future must not leave the runner behind
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                InferenceError::Unexpected(format!("Failed to start '{}': {}", self.command, e))
            })
    }
}

#[async_trait]
impl Inferencer for ProcessInferencer {
    async fn infer(&self, prompt: &str) -> Result<String, InferenceError> {
        let start = Instant::now();
        tracing::info!(
            "Running {} {} ({} prompt chars)",
            self.command,
            self.args.join(" "),
            prompt.len()
        );

        let mut child = self.spawn()?;

        let stdin = child.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

        // Feed stdin and drain both outputs concurrently so a chatty runner
        // cannot block on a full pipe
        let prompt = prompt.as_bytes().to_vec();
        let writer = tokio::spawn(async move {
            let mut stdin = stdin;
            stdin.write_all(&prompt).await?;
            stdin.shutdown().await
        });
        let stdout_reader = tokio::spawn(read_all(stdout));
        let stderr_reader = tokio::spawn(read_all(stderr));

        let outcome = tokio::time::timeout(
            self.timeout,
            collect_output(&mut child, stdout_reader, stderr_reader),
        )
        .await;

        let (status, stdout, stderr) = match outcome {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!("{} timed out after {:?}, killing it", self.command, self.timeout);
                if let Err(e) = child.kill().await {
                    tracing::error!("Failed to kill timed out {}: {}", self.command, e);
                }
                writer.abort();
                return Err(InferenceError::Timeout);
            }
        };

        match writer.await {
            Ok(Ok(())) => {}
            // The runner may exit without reading everything
            Ok(Err(e)) => tracing::debug!("Writing prompt to {} failed: {}", self.command, e),
            Err(e) => tracing::debug!("Prompt writer task failed: {}", e),
        }

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
            tracing::warn!("{} exited with {}: {}", self.command, status, stderr);
            return Err(InferenceError::NonZeroExit(stderr));
        }

        let stdout = String::from_utf8_lossy(&stdout);
        let output = stdout.trim();
        if output.is_empty() {
            tracing::warn!("{} produced no output", self.command);
            return Err(InferenceError::EmptyOutput);
        }

        tracing::info!(
            "{} answered in {}ms ({} chars)",
            self.command,
            start.elapsed().as_millis(),
            output.len()
        );

        Ok(format_response(output))
    }

    fn name(&self) -> &str {
        &self.command
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Wait for exit, then gather whatever the readers collected
async fn collect_output(
    child: &mut Child,
    stdout_reader: OutputReader,
    stderr_reader: OutputReader,
) -> Result<(ExitStatus, Vec<u8>, Vec<u8>), InferenceError> {
    let status = child
        .wait()
        .await
        .map_err(|e| InferenceError::Unexpected(format!("Failed to wait for runner: {}", e)))?;

    let stdout = join_reader(stdout_reader, "stdout").await?;
    let stderr = join_reader(stderr_reader, "stderr").await?;

    Ok((status, stdout, stderr))
}

async fn join_reader(reader: OutputReader, stream: &str) -> Result<Vec<u8>, InferenceError> {
    reader
        .await
        .map_err(|e| InferenceError::Unexpected(format!("Reading {} failed: {}", stream, e)))?
        .map_err(|e| InferenceError::Unexpected(format!("Reading {} failed: {}", stream, e)))
}

async fn read_all<R: AsyncRead + Unpin>(mut pipe: R) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf).await?;
    Ok(buf)
}

fn missing_pipe(stream: &str) -> InferenceError {
    InferenceError::Unexpected(format!("Runner {} was not captured", stream))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str, timeout: Duration) -> ProcessInferencer {
        ProcessInferencer::from_parts(
            "sh",
            vec!["-c".to_string(), script.to_string()],
            "test-model",
            timeout,
        )
    }

    #[tokio::test]
    async fn test_prompt_is_written_to_stdin() {
        let runner = shell("cat", Duration::from_secs(10));
        let answer = runner.infer("The sky is blue.").await.unwrap();
        assert_eq!(answer, "The sky is blue.");
    }

    #[tokio::test]
    async fn test_output_is_trimmed_and_formatted() {
        let runner = shell(
            r"printf '\n\033[1mAnswer\033[0m:\n- one\n'",
            Duration::from_secs(10),
        );
        let answer = runner.infer("q").await.unwrap();
        assert_eq!(answer, "Answer:\n\n• one");
    }

    #[tokio::test]
    async fn test_nonzero_exit_carries_stderr() {
        let runner = shell("echo boom >&2; exit 1", Duration::from_secs(10));
        let err = runner.infer("q").await.unwrap_err();
        assert_eq!(err, InferenceError::NonZeroExit("boom".to_string()));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_whitespace_output_is_empty_output() {
        let runner = shell(r"printf '  \n\t \n'", Duration::from_secs(10));
        let err = runner.infer("q").await.unwrap_err();
        assert_eq!(err, InferenceError::EmptyOutput);
    }

    #[tokio::test]
    async fn test_runner_ignoring_stdin_still_answers() {
        let runner = shell("echo ready", Duration::from_secs(10));
        let big_prompt = "x".repeat(1024 * 1024);
        let answer = runner.infer(&big_prompt).await.unwrap();
        assert_eq!(answer, "ready");
    }

    #[tokio::test]
    async fn test_timeout_kills_the_process() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("runner.pid");
        let script = format!("echo $$ > {}; exec sleep 30", pid_file.display());
        let runner = shell(&script, Duration::from_millis(500));

        let start = Instant::now();
        let err = runner.infer("q").await.unwrap_err();
        assert_eq!(err, InferenceError::Timeout);
        assert!(start.elapsed() < Duration::from_secs(10));

        let pid = std::fs::read_to_string(&pid_file).unwrap();
        let alive = std::process::Command::new("kill")
            .args(["-0", pid.trim()])
            .stderr(Stdio::null())
            .status()
            .unwrap()
            .success();
        assert!(!alive, "runner {} still running after timeout", pid.trim());
    }

    #[tokio::test]
    async fn test_missing_executable_is_unexpected() {
        let runner = ProcessInferencer::from_parts(
            "docchat-no-such-runner",
            vec![],
            "none",
            Duration::from_secs(1),
        );
        let err = runner.infer("q").await.unwrap_err();
        assert!(matches!(err, InferenceError::Unexpected(_)));
        assert!(err.to_string().starts_with("Error: "));
        assert!(!runner.is_available().await);
    }

    #[tokio::test]
    async fn test_startable_executable_is_available() {
        let runner = ProcessInferencer::from_parts("true", vec![], "none", Duration::from_secs(5));
        assert!(runner.is_available().await);
    }

    #[test]
    fn test_config_builds_ollama_command_line() {
        let runner = ProcessInferencer::new(&LlmConfig::default());
        assert_eq!(runner.name(), "ollama");
        assert_eq!(runner.model(), "gemma:2b");
        assert_eq!(runner.args, vec!["run", "gemma:2b"]);
        assert_eq!(runner.timeout, Duration::from_secs(120));
    }
}
