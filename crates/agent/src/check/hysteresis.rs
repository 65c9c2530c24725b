use vigil_common::{Fault, Severity};

/// Escalate soft errors once a check has failed more than `retry` ticks in a
/// row. A critical fault pins the counter at the retry budget so any error
/// that follows escalates at once.
pub fn apply(retry: u32, failures: &mut u32, faults: &mut [Fault]) {
    let critical = faults.iter().any(|f| f.severity >= Severity::Critical);
    let errors = faults
        .iter()
        .any(|f| f.severity >= Severity::Error && f.severity < Severity::Critical);

    if critical {
        *failures = (*failures).max(retry);
    }

    if errors {
        *failures += 1;
        let chances = retry + 1;
        for fault in faults
            .iter_mut()
            .filter(|f| f.severity >= Severity::Error && f.severity < Severity::Critical)
        {
            if *failures > retry {
                fault.severity = Severity::Critical;
            } else {
                fault.message = format!("{} ({} of {})", fault.message, failures, chances);
            }
        }
    } else if !critical {
        *failures = 0;
    }
}
