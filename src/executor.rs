//! Running KoAT on a problem.
//!
//! The problem is written to a temporary `method*.koat` file, the solver is
//! started as `<binary> <options...> <file>`, and the first line it prints is
//! the verdict. Both output streams of the child are drained on their own
//! threads, so a chatty solver never blocks on a full pipe.
//!
//! Running the solver never fails: a missing binary, an I/O error or a solver
//! that prints nothing all give the verdict [`MAYBE`].
//!
//! There is no timeout on the parent side. A solver that ignores its own
//! `-timeout` option blocks [`KoatExecutor::execute`].

use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use log::{debug, warn};

use crate::koat::KoatProblem;

/// The verdict when the solver gives no answer.
pub const MAYBE: &str = "MAYBE";

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ExecutorConfig {
    /// Solver executable, looked up in `PATH` unless it is a path.
    pub binary: PathBuf,
    /// Arguments passed before the problem file.
    pub options: Vec<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("koat"),
            options: ["-timeout", "30", "-use-its-parser", "-use-termcomp-format"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ExecutorConfig {
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the value of the `-timeout` option, adding the option if needed.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        let value = secs.to_string();
        match self.options.iter().position(|o| o == "-timeout") {
            Some(i) if i + 1 < self.options.len() => self.options[i + 1] = value,
            Some(_) => self.options.push(value),
            None => {
                self.options.push("-timeout".to_string());
                self.options.push(value);
            }
        }
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct KoatExecutor {
    config: ExecutorConfig,
}

impl KoatExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Runs the solver on `problem` and returns its verdict.
    pub fn execute(&self, problem: &KoatProblem) -> String {
        match self.run(problem) {
            Ok(Some(verdict)) => {
                debug!("{} answered {}", self.config.binary.display(), verdict);
                verdict
            }
            Ok(None) => {
                warn!("{} gave no answer", self.config.binary.display());
                MAYBE.to_string()
            }
            Err(e) => {
                warn!("could not run {}: {}", self.config.binary.display(), e);
                MAYBE.to_string()
            }
        }
    }

    fn run(&self, problem: &KoatProblem) -> io::Result<Option<String>> {
        let mut file = tempfile::Builder::new()
            .prefix("method")
            .suffix(".koat")
            .tempfile()?;
        writeln!(file, "{}", problem)?;
        file.flush()?;
        debug!("wrote problem to {}", file.path().display());

        let mut child = Command::new(&self.config.binary)
            .args(&self.config.options)
            .arg(file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let verdict = thread::scope(|s| {
            let out = s.spawn(move || stdout.and_then(first_line));
            let err = s.spawn(move || {
                if let Some(stderr) = stderr {
                    log_lines(stderr);
                }
            });
            let verdict = out.join().unwrap_or(None);
            let _ = err.join();
            verdict
        });
        let status = child.wait()?;
        debug!("{} exited with {}", self.config.binary.display(), status);

        Ok(verdict)
    }
}

/// Reads the first line, then discards the rest of the stream.
fn first_line(stream: impl Read) -> Option<String> {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    let verdict = match reader.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(&['\n', '\r'][..]).to_string()),
    };
    let _ = io::copy(&mut reader, &mut io::sink());
    verdict
}

fn log_lines(stream: impl Read) {
    for line in BufReader::new(stream).lines() {
        match line {
            Ok(line) => debug!("koat: {}", line),
            Err(_) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use crate::transition::Transitions;

    use test_log::test;

    fn problem() -> KoatProblem {
        KoatProblem::new(Domain::new(), Transitions::new())
    }

    #[test]
    fn test_default_config() {
        let config = ExecutorConfig::default();
        assert_eq!(config.binary, PathBuf::from("koat"));
        assert_eq!(
            config.options,
            vec!["-timeout", "30", "-use-its-parser", "-use-termcomp-format"]
        );
    }

    #[test]
    fn test_with_timeout() {
        let config = ExecutorConfig::default().with_timeout(5);
        assert_eq!(config.options[..2], ["-timeout", "5"]);
        let config = ExecutorConfig::default().with_options(["-v"]).with_timeout(7);
        assert_eq!(config.options, vec!["-v", "-timeout", "7"]);
    }

    #[test]
    fn test_missing_binary() {
        let config = ExecutorConfig::default().with_binary("/nonexistent/koat-binary");
        let verdict = KoatExecutor::new(config).execute(&problem());
        assert_eq!(verdict, MAYBE);
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("YES(?, O(n))\nmore\n".as_bytes()), Some("YES(?, O(n))".to_string()));
        assert_eq!(first_line("".as_bytes()), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_cat_echoes_problem() {
        let config = ExecutorConfig::default().with_binary("cat").with_options(Vec::<String>::new());
        let verdict = KoatExecutor::new(config).execute(&problem());
        assert_eq!(verdict, "(GOAL COMPLEXITY)");
    }

    #[cfg(unix)]
    #[test]
    fn test_noisy_stderr() {
        // more than a pipe buffer of stderr before the verdict
        let script = "head -c 2000000 /dev/zero | tr '\\0' x >&2; echo 'WORST_CASE(?, O(n))'";
        let config = ExecutorConfig::default()
            .with_binary("sh")
            .with_options(["-c", script, "koat"]);
        let verdict = KoatExecutor::new(config).execute(&problem());
        assert_eq!(verdict, "WORST_CASE(?, O(n))");
    }
}
