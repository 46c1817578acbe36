use anyhow::{Context, Result};
use byterig_config::StopReason;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct ReportConfig {
    pub stimulus: String,
    pub handler: String,
    pub max_bytes: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub status: String,
    pub stop_reason: StopReason,
    pub bytes_delivered: u64,
    pub duration_ms: u64,
    pub stimulus_hash: String,
    pub config: ReportConfig,
    pub failures: Vec<String>,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read stimulus file at {:?}", path))?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

pub fn write_result_json(output_dir: &Path, report: &RunReport) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;
    let path = output_dir.join("result.json");
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}

pub fn write_junit_xml(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, junit_xml(report)).with_context(|| format!("Failed to write {:?}", path))
}

/// Minimal JUnit document: one suite, one case per harness run.
fn junit_xml(report: &RunReport) -> String {
    let failures = report.failures.len();
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<testsuite name=\"byterig test\" tests=\"1\" failures=\"{}\">\n",
        failures
    ));
    xml.push_str(&format!(
        "  <testcase name=\"{}\" time=\"{:.3}\">\n",
        xml_escape(&report.config.stimulus),
        report.duration_ms as f64 / 1000.0
    ));
    for failure in &report.failures {
        xml.push_str(&format!(
            "    <failure message=\"{}\"/>\n",
            xml_escape(failure)
        ));
    }
    xml.push_str("  </testcase>\n");
    xml.push_str("</testsuite>\n");
    xml
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
