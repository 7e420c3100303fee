//! Step outputs for CI runners that expose a `GITHUB_OUTPUT` file.

use crate::types::Result;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Paths produced by one invocation.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub topics: Vec<String>,
    pub report_paths: Vec<PathBuf>,
    pub json_paths: Vec<PathBuf>,
}

impl RunSummary {
    pub fn record(&mut self, topic: &str, md_path: PathBuf, json_path: PathBuf) {
        self.topics.push(topic.to_string());
        self.report_paths.push(md_path);
        self.json_paths.push(json_path);
    }

    /// Render in the `key=value` / heredoc format runners expect.
    pub fn render(&self, reports_dir: &Path) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "report-dir={}", reports_dir.display());
        let _ = writeln!(out, "topics-collected={}", self.topics.join(","));
        write_multiline(&mut out, "report-paths", &self.report_paths);
        write_multiline(&mut out, "report-json-paths", &self.json_paths);
        out
    }

    /// Append to `output_file`, creating it when missing.
    pub fn append_to(&self, output_file: &Path, reports_dir: &Path) -> Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(output_file)?;
        file.write_all(self.render(reports_dir).as_bytes())?;
        Ok(())
    }
}

fn write_multiline(out: &mut String, key: &str, paths: &[PathBuf]) {
    let _ = writeln!(out, "{}<<EOF", key);
    for path in paths {
        let _ = writeln!(out, "{}", path.display());
    }
    out.push_str("EOF\n");
}
