use vigil_common::{Fault, Metric, Severity};

use super::rule::{Bound, Condition, Level};

#[derive(Debug)]
pub struct ThresholdError {
    pub line: String,
    pub reason: String,
}

impl std::fmt::Display for ThresholdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid threshold definition {:?}: {}", self.line, self.reason)
    }
}

impl std::error::Error for ThresholdError {}

/// Per-metric rule with a sticky error state: once the error or critical
/// bound is crossed the metric stays at ERROR until the clear bound holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    pub metric: String,
    pub optional: bool,
    pub warning: Option<Bound>,
    pub error: Option<Bound>,
    pub critical: Option<Bound>,
    pub clear: Option<Bound>,
    pub bad: bool,
}

impl Threshold {
    /// `<metric> [?] [critical OP v] [warning OP v] [error OP v] [clear OP v]`
    pub fn parse(line: &str) -> Result<Self, ThresholdError> {
        let fail = |reason: String| ThresholdError {
            line: line.trim().to_string(),
            reason,
        };

        let mut tokens = line.split_whitespace().peekable();
        let metric = tokens
            .next()
            .ok_or_else(|| fail("missing metric name".into()))?
            .to_string();

        let mut threshold = Self {
            metric,
            optional: false,
            warning: None,
            error: None,
            critical: None,
            clear: None,
            bad: false,
        };

        if tokens.peek() == Some(&"?") {
            threshold.optional = true;
            tokens.next();
        }

        while let Some(word) = tokens.next() {
            let level = Level::parse(word).ok_or_else(|| fail(format!("bad level {word:?}")))?;
            let op = tokens
                .next()
                .ok_or_else(|| fail(format!("missing operator after {word:?}")))?;
            let condition =
                Condition::parse(op).ok_or_else(|| fail(format!("bad operator {op:?}")))?;
            let literal = tokens
                .next()
                .ok_or_else(|| fail(format!("missing value after {op:?}")))?;
            let value = literal
                .parse::<f64>()
                .map_err(|e| fail(format!("bad value {literal:?}: {e}")))?;

            let bound = Some(Bound {
                condition,
                threshold: value,
                literal: literal.to_string(),
            });
            match level {
                Level::Warning => threshold.warning = bound,
                Level::Error => threshold.error = bound,
                Level::Critical => threshold.critical = bound,
                Level::Clear => threshold.clear = bound,
            }
        }

        Ok(threshold)
    }

    pub fn check(&mut self, metrics: &[Metric]) -> Option<Fault> {
        let Some(metric) = metrics.iter().find(|m| m.name == self.metric) else {
            if self.optional {
                return None;
            }
            return Some(self.fault(Severity::Error, "Missing metric".into()));
        };
        let v = metric.value;

        if let Some(bound) = self.critical.as_ref().filter(|b| b.matches(v)) {
            let message = format!("{v} {bound}");
            self.bad = true;
            return Some(self.fault(Severity::Critical, message));
        }
        if let Some(bound) = self.error.as_ref().filter(|b| b.matches(v)) {
            let message = format!("{v} {bound}");
            self.bad = true;
            return Some(self.fault(Severity::Error, message));
        }

        if self.bad {
            match &self.clear {
                Some(clear) if !clear.matches(v) => {
                    let message = format!("{v} not clear {clear}");
                    return Some(self.fault(Severity::Error, message));
                }
                _ => self.bad = false,
            }
        }

        if let Some(bound) = self.warning.as_ref().filter(|b| b.matches(v)) {
            let message = format!("{v} {bound}");
            return Some(self.fault(Severity::Warning, message));
        }

        None
    }

    fn fault(&self, severity: Severity, message: String) -> Fault {
        Fault::new(self.metric.clone(), severity, message)
    }
}

/// All thresholds configured for one check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Thresholds {
    rules: Vec<Threshold>,
}

impl Thresholds {
    pub fn parse(definition: &str) -> Result<Self, ThresholdError> {
        let rules = definition
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(Threshold::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Threshold] {
        &self.rules
    }

    pub fn evaluate(&mut self, metrics: &[Metric], faults: &mut Vec<Fault>) {
        for rule in &mut self.rules {
            if let Some(fault) = rule.check(metrics) {
                faults.push(fault);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foo(value: f64) -> Vec<Metric> {
        vec![Metric::new("foo", value, "")]
    }

    fn check(rule: &mut Threshold, metrics: &[Metric]) -> Option<(Severity, String)> {
        rule.check(metrics).map(|f| {
            assert_eq!(f.name, rule.metric);
            (f.severity, f.message)
        })
    }

    fn required() -> Threshold {
        Threshold::parse("foo critical > 200 warning > 50 error > 99 clear < 80").unwrap()
    }

    fn optional() -> Threshold {
        Threshold::parse("foo ? warning >= 50 error >= 99").unwrap()
    }

    #[test]
    fn parses_levels_in_any_order() {
        let t = required();
        assert_eq!(t.metric, "foo");
        assert!(!t.optional);
        assert_eq!(t.critical.as_ref().unwrap().to_string(), "> 200");
        assert_eq!(t.warning.as_ref().unwrap().to_string(), "> 50");
        assert_eq!(t.error.as_ref().unwrap().to_string(), "> 99");
        assert_eq!(t.clear.as_ref().unwrap().to_string(), "< 80");
        assert!(optional().optional);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(Threshold::parse("foo fatal > 1").is_err());
        assert!(Threshold::parse("foo warning => 1").is_err());
        assert!(Threshold::parse("foo warning >").is_err());
        assert!(Threshold::parse("foo warning > lots").is_err());
        let err = Threshold::parse("foo warning").unwrap_err();
        assert!(err.to_string().contains("invalid threshold definition"));
    }

    #[test]
    fn missing_metric_is_error_unless_optional() {
        let mut r = required();
        assert_eq!(check(&mut r, &foo(42.0)), None);
        assert_eq!(
            check(&mut r, &[]),
            Some((Severity::Error, "Missing metric".into()))
        );

        let mut o = optional();
        assert_eq!(check(&mut o, &foo(42.0)), None);
        assert_eq!(check(&mut o, &[]), None);
    }

    #[test]
    fn severity_levels() {
        let mut r = required();
        assert_eq!(check(&mut r, &foo(51.0)), Some((Severity::Warning, "51 > 50".into())));

        let mut o = optional();
        assert_eq!(check(&mut o, &foo(50.0)), Some((Severity::Warning, "50 >= 50".into())));
        assert_eq!(check(&mut o, &foo(99.0)), Some((Severity::Error, "99 >= 99".into())));

        assert_eq!(check(&mut r, &foo(100.0)), Some((Severity::Error, "100 > 99".into())));
        assert_eq!(check(&mut r, &foo(300.0)), Some((Severity::Critical, "300 > 200".into())));
    }

    #[test]
    fn errors_stick_until_clear() {
        let mut r = required();
        assert_eq!(check(&mut r, &foo(100.0)), Some((Severity::Error, "100 > 99".into())));
        assert!(r.bad);
        assert_eq!(
            check(&mut r, &foo(90.0)),
            Some((Severity::Error, "90 not clear < 80".into()))
        );
        assert_eq!(
            check(&mut r, &foo(80.0)),
            Some((Severity::Error, "80 not clear < 80".into()))
        );
        assert_eq!(check(&mut r, &foo(60.0)), Some((Severity::Warning, "60 > 50".into())));
        assert!(!r.bad);
        assert_eq!(check(&mut r, &foo(90.0)), Some((Severity::Warning, "90 > 50".into())));
        assert_eq!(check(&mut r, &foo(40.0)), None);
    }

    #[test]
    fn clearing_tick_still_reports_warning() {
        let mut t = Threshold::parse("foo warning > 10 error > 50 clear < 40").unwrap();
        check(&mut t, &foo(60.0));
        assert_eq!(check(&mut t, &foo(30.0)), Some((Severity::Warning, "30 > 10".into())));
        assert!(!t.bad);
    }

    #[test]
    fn missing_metric_does_not_clear() {
        let mut r = required();
        check(&mut r, &foo(150.0));
        assert_eq!(check(&mut r, &[]).map(|f| f.0), Some(Severity::Error));
        assert!(r.bad);
    }

    #[test]
    fn first_metric_with_name_wins() {
        let mut r = required();
        let metrics = vec![Metric::new("foo", 300.0, ""), Metric::new("foo", 1.0, "")];
        assert_eq!(check(&mut r, &metrics).map(|f| f.0), Some(Severity::Critical));
    }

    #[test]
    fn block_skips_blank_lines_and_tags_faults() {
        let mut ts = Thresholds::parse("\nfoo warning > 1\n\n  \nbar ? error < 0\n").unwrap();
        assert_eq!(ts.rules().len(), 2);

        let mut faults = Vec::new();
        ts.evaluate(&[Metric::new("foo", 2.0, ""), Metric::new("bar", -1.0, "")], &mut faults);
        let tagged: Vec<_> = faults.iter().map(|f| (f.name.as_str(), f.severity)).collect();
        assert_eq!(tagged, vec![("foo", Severity::Warning), ("bar", Severity::Error)]);
    }

    #[test]
    fn block_reports_bad_line() {
        assert!(Thresholds::parse("foo warning > 1\nbar nope").is_err());
    }
}
