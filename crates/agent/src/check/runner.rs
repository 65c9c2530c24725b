use std::io;
use std::process::Stdio;

use tokio::process::Command;
use vigil_common::time::now_ms;
use vigil_common::{Fault, Severity};

use super::definition::{CheckSpec, CheckState};
use super::hysteresis;
use super::interpret::{interpret, CheckOutput, ProcessOutput};

/// Run `command` through `sh -c` and capture its output. The child is killed
/// if the returned future is dropped before it completes.
pub async fn execute(command: &str) -> io::Result<ProcessOutput> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await?;

    Ok(ProcessOutput {
        status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
    })
}

/// Run one check to completion. Never fails: problems running or
/// interpreting the command become faults.
pub async fn perform(spec: &CheckSpec, state: &mut CheckState) -> CheckOutput {
    let mut output = match execute(&spec.command).await {
        Ok(process) => match interpret(&process, spec.nagios_performance) {
            Ok(mut output) => {
                state.thresholds.evaluate(&output.metrics, &mut output.faults);
                output
            }
            Err(e) => {
                tracing::warn!(check = %spec.name, error = %e, "bad JSON report");
                CheckOutput::single(Fault::new("json-error", Severity::Error, e.to_string()))
            }
        },
        Err(e) => {
            tracing::error!(check = %spec.name, error = %e, "checker failed");
            CheckOutput::single(Fault::new(
                "checker",
                Severity::Error,
                format!("{:?}: {e}", e.kind()),
            ))
        }
    };

    finish(spec, state, &mut output);
    output
}

/// Outcome for a check that missed the tick deadline.
pub fn timed_out(spec: &CheckSpec, state: &mut CheckState) -> CheckOutput {
    tracing::warn!(check = %spec.name, "check timed out, killed");
    let mut output = CheckOutput::single(Fault::monitor("timeout", Severity::Critical, ""));
    finish(spec, state, &mut output);
    output
}

/// Outcome for a check whose task died before reporting back.
pub fn crashed(spec: &CheckSpec, state: &mut CheckState, error: &tokio::task::JoinError) -> CheckOutput {
    tracing::error!(check = %spec.name, error = %error, "check task failed");
    let mut output = CheckOutput::single(Fault::new(
        "checker",
        Severity::Error,
        format!("JoinError: {error}"),
    ));
    finish(spec, state, &mut output);
    output
}

fn finish(spec: &CheckSpec, state: &mut CheckState, output: &mut CheckOutput) {
    hysteresis::apply(spec.retry, &mut state.failures, &mut output.faults);
    let now = now_ms();
    for fault in &mut output.faults {
        fault.updated_ms = now;
    }
    for metric in &mut output.metrics {
        metric.timestamp_ms = now;
    }
}
