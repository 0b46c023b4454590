use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use evaluation::EngineError;

/// A spawned engine process with line-based stdio. A dedicated thread
/// pumps stdout into a channel so reads can carry a deadline; the thread
/// exits when the process closes its stdout.
pub struct EngineProcess {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    lines: Receiver<String>,
}

impl EngineProcess {
    pub fn spawn(path: &Path) -> Result<Self, EngineError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                EngineError::Unavailable(format!("failed to start {}: {}", path.display(), e))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Unavailable("engine stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Unavailable("engine stdout not captured".to_string()))?;

        let (tx, rx) = channel();
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            child,
            stdin: BufWriter::new(stdin),
            lines: rx,
        })
    }

    pub fn send(&mut self, line: &str) -> Result<(), EngineError> {
        log::debug!("engine <- {}", line);

        self.stdin
            .write_all(line.as_bytes())
            .and_then(|_| self.stdin.write_all(b"\n"))
            .and_then(|_| self.stdin.flush())
            .map_err(|e| EngineError::Unavailable(format!("engine stdin closed: {}", e)))
    }

    /// Receive the next line, giving up at `deadline`. A disconnected
    /// channel means the process died or closed stdout.
    pub fn recv_deadline(&mut self, deadline: Instant) -> Result<String, EngineError> {
        let remaining = deadline.saturating_duration_since(Instant::now());

        match self.lines.recv_timeout(remaining) {
            Ok(line) => {
                log::debug!("engine -> {}", line);
                Ok(line)
            }
            Err(RecvTimeoutError::Timeout) => Err(EngineError::Timeout(remaining)),
            Err(RecvTimeoutError::Disconnected) => {
                Err(EngineError::Unavailable("engine process exited".to_string()))
            }
        }
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        // Ask for a graceful shutdown; fall back to killing the process.
        if self.send("quit").is_err() {
            let _ = self.child.kill();
            return;
        }

        std::thread::sleep(std::time::Duration::from_millis(100));

        match self.child.try_wait() {
            Ok(Some(_)) => {}
            _ => {
                let _ = self.child.kill();
                let _ = self.child.wait();
            }
        }
    }
}
