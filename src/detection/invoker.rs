//! External classifier invocation.
//!
//! Runs `<interpreter> <script> <image-path>` as a child process. Its stdout
//! and stderr share one pipe so the captured text keeps the order the child
//! wrote it in. Exit code 0 is the only success.

use std::io::Read;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::config::ClassifierConfig;

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("failed to launch classifier `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "classifier exited with code {}",
        .exit_code.map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string())
    )]
    NonZeroExit {
        exit_code: Option<i32>,
        output: String,
    },

    #[error("classifier timed out after {timeout:?}")]
    Timeout { timeout: Duration, output: String },

    #[error("failed to capture classifier output: {0}")]
    Io(#[from] std::io::Error),

    #[error("classifier pool is shut down")]
    PoolClosed,
}

impl InvocationError {
    /// Whatever the child printed before failing, when there is any.
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            Self::NonZeroExit { output, .. } | Self::Timeout { output, .. } => Some(output),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub struct InferenceInvoker {
    interpreter: String,
    script: String,
    timeout: Option<Duration>,
    permits: Arc<Semaphore>,
}

impl InferenceInvoker {
    pub fn new(
        interpreter: impl Into<String>,
        script: impl Into<String>,
        timeout: Option<Duration>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            timeout,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(
            config.interpreter.clone(),
            config.script.clone(),
            config.timeout,
            config.max_concurrency,
        )
    }

    /// Run the classifier on one image and return everything it printed.
    ///
    /// Waits for a pool slot first; at most `max_concurrency` children run at once.
    pub async fn invoke(&self, image_path: &str) -> Result<String, InvocationError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| InvocationError::PoolClosed)?;

        let started = Instant::now();
        let (mut reader, writer) = std::io::pipe()?;

        let mut child = {
            let mut command = Command::new(&self.interpreter);
            command
                .arg(&self.script)
                .arg(image_path)
                .stdin(Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer)
                .kill_on_drop(true);
            #[cfg(unix)]
            command.process_group(0);
            command.spawn().map_err(|source| InvocationError::Spawn {
                program: self.interpreter.clone(),
                source,
            })?
        };
        // The command is dropped here; the child now holds the only write ends.
        let pid = child.id();

        tracing::debug!(
            interpreter = %self.interpreter,
            script = %self.script,
            image_path = %image_path,
            pid = ?pid,
            "Classifier started"
        );

        let mut drain = tokio::task::spawn_blocking(move || {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf).map(|_| buf)
        });

        // The deadline covers the drain too: anything the child leaves behind
        // still holds the pipe open.
        let finished = match self.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, wait_and_drain(&mut child, &mut drain)).await {
                    Ok(finished) => finished,
                    Err(_) => {
                        kill_process_tree(pid, &mut child).await;
                        let output =
                            match tokio::time::timeout(Duration::from_secs(1), &mut drain).await {
                                Ok(Ok(Ok(buf))) => String::from_utf8_lossy(&buf).into_owned(),
                                _ => String::new(),
                            };
                        tracing::warn!(
                            image_path = %image_path,
                            timeout = ?limit,
                            "Classifier killed after timeout"
                        );
                        metrics::histogram!("beanscan_inference_duration_seconds")
                            .record(started.elapsed().as_secs_f64());
                        return Err(InvocationError::Timeout {
                            timeout: limit,
                            output,
                        });
                    }
                }
            }
            None => wait_and_drain(&mut child, &mut drain).await,
        };

        let (status, buf) = finished?;
        let output = String::from_utf8_lossy(&buf).into_owned();
        let elapsed = started.elapsed();
        metrics::histogram!("beanscan_inference_duration_seconds").record(elapsed.as_secs_f64());

        if !status.success() {
            tracing::warn!(
                image_path = %image_path,
                exit_code = ?status.code(),
                "Classifier exited with failure"
            );
            return Err(InvocationError::NonZeroExit {
                exit_code: status.code(),
                output,
            });
        }

        tracing::info!(
            image_path = %image_path,
            elapsed_ms = elapsed.as_millis() as u64,
            bytes = output.len(),
            "Classifier finished"
        );
        Ok(output)
    }
}

async fn wait_and_drain(
    child: &mut Child,
    drain: &mut JoinHandle<std::io::Result<Vec<u8>>>,
) -> std::io::Result<(ExitStatus, Vec<u8>)> {
    let status = child.wait().await?;
    let buf = drain.await.map_err(std::io::Error::other)??;
    Ok((status, buf))
}

/// Kill the classifier and everything it started. The child leads its own
/// process group, so the group id is its pid even after it has been reaped.
async fn kill_process_tree(pid: Option<u32>, child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = pid.and_then(|p| libc::pid_t::try_from(p).ok()) {
            // SAFETY: kill(2) with a negative pid only signals that process group.
            unsafe {
                libc::kill(-pid, libc::SIGKILL);
            }
        }
    }
    #[cfg(not(unix))]
    let _ = pid;

    let _ = child.kill().await;
}
