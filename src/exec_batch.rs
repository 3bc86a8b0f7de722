//! Exec batch manager: accumulates argv snippets
//! for `-exec cmd {} +` and flushes at size/byte thresholds or at traversal
//! end.

use std::io;
use std::process::Command;

/// POSIX `ARG_MAX` is usually much larger, but a conservative cap keeps any
/// one invocation from overflowing real-world exec limits, matching the
/// historical `find -exec +` default of a few thousand arguments or a byte
/// budget in the low megabytes.
const MAX_BATCH_ARGS: usize = 5_000;
const MAX_BATCH_BYTES: usize = 128 * 1024;

pub struct ExecBatch {
    template: Vec<String>,
    /// Index of the `{}` placeholder within `template`.
    placeholder: usize,
    accumulated: Vec<String>,
    accumulated_bytes: usize,
}

impl ExecBatch {
    pub fn new(template: Vec<String>) -> Self {
        let placeholder = template
            .iter()
            .position(|arg| arg == "{}")
            .unwrap_or(template.len());
        ExecBatch {
            template,
            placeholder,
            accumulated: Vec::new(),
            accumulated_bytes: 0,
        }
    }

    /// Append one visit's path to the batch, flushing immediately if the
    /// size/byte threshold would otherwise be exceeded.
    pub fn push(&mut self, path: &str) -> io::Result<()> {
        if self.accumulated.len() >= MAX_BATCH_ARGS
            || self.accumulated_bytes + path.len() + 1 > MAX_BATCH_BYTES
        {
            self.flush()?;
        }
        self.accumulated_bytes += path.len() + 1;
        self.accumulated.push(path.to_string());
        Ok(())
    }

    /// Launch the accumulated batch as one process, then clear it. A no-op
    /// if nothing has accumulated, so `finish()` can call this
    /// unconditionally at traversal end.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.accumulated.is_empty() {
            return Ok(());
        }
        let mut args: Vec<String> = self.template[..self.placeholder].to_vec();
        args.extend(self.accumulated.drain(..));
        if self.placeholder < self.template.len() {
            args.extend_from_slice(&self.template[self.placeholder + 1..]);
        }
        self.accumulated_bytes = 0;

        let Some((program, rest)) = args.split_first() else {
            return Ok(());
        };
        let status = Command::new(program).args(rest).status()?;
        if !status.success() {
            return Err(io::Error::other(format!(
                "batched exec exited with {status}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_substituted_with_accumulated_paths() {
        let mut batch = ExecBatch::new(vec!["echo".to_string(), "{}".to_string()]);
        batch.push("/a").unwrap();
        batch.push("/b").unwrap();
        assert_eq!(batch.accumulated, vec!["/a".to_string(), "/b".to_string()]);
        batch.flush().unwrap();
        assert!(batch.accumulated.is_empty());
    }

    #[test]
    fn flush_on_empty_batch_is_a_no_op() {
        let mut batch = ExecBatch::new(vec!["true".to_string(), "{}".to_string()]);
        batch.flush().unwrap();
    }
}
