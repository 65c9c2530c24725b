//! Nagios plugin performance data.
//!
//! Plugin output looks like `TEXT | perfdata`, optionally followed by more
//! text lines whose own `|` section continues the perfdata. Records have the
//! shape `label=value[units][;warn[;crit[;min[;max]]]]`.

use std::sync::OnceLock;

use regex::Regex;

use crate::metric::Metric;

fn perf_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"([^=' \t]+|'[^=']+')",
            r"=",
            r"(\d+(?:\.\d*)?|\.\d+)",
            r"([^; \t]*)",
            r"(?:;(?:\d+(?:\.\d*)?|\.\d+)){0,4}",
        ))
        .expect("performance data pattern is valid")
    })
}

/// Split plugin output into the human message and its metrics.
pub fn parse_output(text: &str) -> (String, Vec<Metric>) {
    let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
    let (first_text, first_perf) = split_perf(first);
    let (rest_text, rest_perf) = split_perf(rest);

    let mut perf = String::new();
    if let Some(p) = first_perf {
        perf.push_str(p);
        perf.push(' ');
    }
    if let Some(p) = rest_perf {
        perf.push_str(&p.replace('\n', ""));
    }

    let message = format!("{first_text}\n{rest_text}");
    (message, parse_perf(&perf))
}

fn split_perf(s: &str) -> (&str, Option<&str>) {
    match s.split_once('|') {
        Some((text, perf)) => (text, Some(perf)),
        None => (s, None),
    }
}

fn parse_perf(perf: &str) -> Vec<Metric> {
    perf_pattern()
        .captures_iter(perf)
        .filter_map(|caps| {
            let value = caps[2].parse::<f64>().ok()?;
            Some(Metric::new(&caps[1], value, &caps[3]))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(metrics: &[Metric]) -> Vec<(&str, f64, &str)> {
        metrics
            .iter()
            .map(|m| (m.name.as_str(), m.value, m.units.as_str()))
            .collect()
    }

    #[test]
    fn text_only() {
        let (msg, metrics) = parse_output("DISK OK - free space: / 3326 MB (56%);");
        assert_eq!(msg, "DISK OK - free space: / 3326 MB (56%);\n");
        assert!(metrics.is_empty());
    }

    #[test]
    fn single_line_with_perfdata() {
        let (msg, metrics) =
            parse_output("DISK OK - free space: / 3326 MB (56%); | /=2643MB;5948;5958;0;5968");
        assert_eq!(msg, "DISK OK - free space: / 3326 MB (56%); \n");
        assert_eq!(names(&metrics), vec![("/", 2643.0, "MB")]);
    }

    #[test]
    fn multi_line_perfdata_continues() {
        let text = "DISK OK - free space: / 3326 MB (56%); | /=2643MB;5948;5958;0;5968\n\
                    / 15272 MB (77%);\n\
                    /boot 68 MB (69%);\n\
                    /home 69357 MB (27%);\n\
                    /var/log 819 MB (84%); | /boot=68MB;88;93;0;98\n\
                    /home=69357MB;253404;253409;0;253414\n\
                    /var/log=818MB;970;975;0;980";
        let (msg, metrics) = parse_output(text);
        assert_eq!(
            msg,
            "DISK OK - free space: / 3326 MB (56%); \n/ 15272 MB (77%);\n/boot 68 MB (69%);\n\
             /home 69357 MB (27%);\n/var/log 819 MB (84%); "
        );
        assert_eq!(
            names(&metrics),
            vec![
                ("/", 2643.0, "MB"),
                ("/boot", 68.0, "MB"),
                ("/home", 69357.0, "MB"),
                ("/var/log", 818.0, "MB"),
            ]
        );
    }

    #[test]
    fn loose_separators_and_decimals() {
        let (msg, metrics) = parse_output(
            "PING ok - Packet loss = 0%, RTA = 0.80 ms | percent_packet_loss=0, rta=0.80",
        );
        assert_eq!(msg, "PING ok - Packet loss = 0%, RTA = 0.80 ms \n");
        assert_eq!(
            names(&metrics),
            vec![("percent_packet_loss", 0.0, ","), ("rta", 0.8, "")]
        );
    }

    #[test]
    fn quoted_label() {
        let (msg, metrics) = parse_output("| 'ha ha ha'=3has");
        assert_eq!(msg, "\n");
        assert_eq!(names(&metrics), vec![("'ha ha ha'", 3.0, "has")]);
    }
}
