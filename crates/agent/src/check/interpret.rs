use std::fmt;

use serde::Deserialize;
use vigil_common::{perfdata, Fault, Metric, Severity};

const MAX_TEXT_CHARS: usize = 200;

/// What a finished check process left behind. `status` is `None` when the
/// process was killed by a signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckOutput {
    pub faults: Vec<Fault>,
    pub metrics: Vec<Metric>,
}

impl CheckOutput {
    pub fn single(fault: Fault) -> Self {
        Self {
            faults: vec![fault],
            metrics: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub enum InterpretError {
    Json(serde_json::Error),
}

impl fmt::Display for InterpretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "{:?}: {e}", e.classify()),
        }
    }
}

impl std::error::Error for InterpretError {}

impl From<serde_json::Error> for InterpretError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

#[derive(Debug, Deserialize)]
struct Report {
    faults: Vec<ReportedFault>,
    #[serde(default)]
    metrics: Vec<ReportedMetric>,
}

#[derive(Debug, Deserialize)]
struct ReportedFault {
    #[serde(default)]
    name: String,
    severity: Severity,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ReportedMetric {
    name: String,
    value: f64,
    #[serde(default)]
    units: String,
}

/// Turn process output into faults and metrics.
///
/// A zero exit status with stdout starting with `{` is a JSON report;
/// anything else is plain text judged by the exit status.
pub fn interpret(output: &ProcessOutput, nagios_performance: bool) -> Result<CheckOutput, InterpretError> {
    if output.status == Some(0) && output.stdout.starts_with('{') {
        return parse_report(&output.stdout);
    }
    Ok(interpret_text(output, nagios_performance))
}

fn parse_report(stdout: &str) -> Result<CheckOutput, InterpretError> {
    let report: Report = serde_json::from_str(stdout)?;
    Ok(CheckOutput {
        faults: report
            .faults
            .into_iter()
            .map(|f| Fault::new(f.name, f.severity, f.message))
            .collect(),
        metrics: report
            .metrics
            .into_iter()
            .map(|m| Metric::new(m.name, m.value, m.units))
            .collect(),
    })
}

fn interpret_text(output: &ProcessOutput, nagios_performance: bool) -> CheckOutput {
    let mut faults = Vec::new();
    let mut metrics = Vec::new();

    if !output.stderr.is_empty() {
        faults.push(Fault::monitor("stderr", Severity::Error, output.stderr.clone()));
    }

    let stdout = if nagios_performance && !output.stdout.is_empty() {
        let (message, parsed) = perfdata::parse_output(&output.stdout);
        metrics = parsed;
        message.trim_end().to_string()
    } else {
        output.stdout.clone()
    };

    let mut text = if stdout.is_empty() { output.stderr.clone() } else { stdout };
    if text.is_empty() {
        faults.push(Fault::monitor("no-out", Severity::Error, ""));
        text = "(no output)".into();
    }
    let text = truncate(text);

    match output.status {
        Some(0) => {}
        Some(1) => faults.push(Fault::new("", Severity::Warning, text)),
        Some(2 | 3) => faults.push(Fault::new("", Severity::Error, text)),
        _ => faults.push(Fault::monitor("status", Severity::Critical, text)),
    }

    CheckOutput { faults, metrics }
}

fn truncate(text: String) -> String {
    match text.char_indices().nth(MAX_TEXT_CHARS) {
        Some((cut, _)) => format!("{} ...", &text[..cut]),
        None => text,
    }
}
