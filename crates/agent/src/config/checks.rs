use std::collections::BTreeMap;
use std::path::Path;

use super::loader::LoadError;
use crate::check::{Check, CheckDefinition};

/// Load every `*.yml` check file in `directory`. Each top-level key of a
/// file is a check section; checks are ordered by file, then section.
pub fn load_checks(directory: &Path, agent: &str) -> Result<Vec<Check>, LoadError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        let is_check_file = path
            .extension()
            .is_some_and(|ext| ext == "yml" || ext == "yaml");
        if is_check_file && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut checks = Vec::new();
    for path in files {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let contents = std::fs::read_to_string(&path)?;
        let sections: BTreeMap<String, CheckDefinition> = if contents.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_yaml::from_str(&contents)?
        };

        for (section, def) in sections {
            let name = check_name(agent, &stem, &section);
            validate(&name, &def)?;
            let check = Check::from_definition(name.clone(), def)
                .map_err(|error| LoadError::Threshold { check: name, error })?;
            checks.push(check);
        }
    }

    tracing::info!(directory = %directory.display(), checks = checks.len(), "checks loaded");
    Ok(checks)
}

/// `//<agent>/<file>/<section>`, unless the section is already absolute.
pub fn check_name(agent: &str, file: &str, section: &str) -> String {
    if section.starts_with("//") {
        section.to_string()
    } else {
        format!("//{agent}/{file}/{section}")
    }
}

fn validate(name: &str, def: &CheckDefinition) -> Result<(), LoadError> {
    if def.command.trim().is_empty() {
        return Err(LoadError::Validation(format!("{name}: command must not be empty")));
    }
    if def.interval == 0 {
        return Err(LoadError::Validation(format!("{name}: interval must be > 0")));
    }
    if def.retry_interval == 0 {
        return Err(LoadError::Validation(format!("{name}: retry_interval must be > 0")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) {
        std::fs::write(dir.path().join(name), contents).unwrap();
    }

    #[test]
    fn names_are_qualified() {
        assert_eq!(check_name("web1", "disk", "root"), "//web1/disk/root");
        assert_eq!(check_name("web1", "meta", "//global/meta"), "//global/meta");
    }

    #[test]
    fn loads_sorted_checks_from_yaml_files() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir,
            "system.yml",
            "load:\n  command: uptime\n  interval: 5\ndisk:\n  command: df -h\n  retry: 1\n",
        );
        write(&dir, "app.yml", "//global/api:\n  command: curl -f http://api\n");
        write(&dir, "README.txt", "not a check file");
        write(&dir, "empty.yml", "");

        let checks = load_checks(dir.path(), "web1").unwrap();
        let names: Vec<_> = checks.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec!["//global/api", "//web1/system/disk", "//web1/system/load"]
        );
        assert_eq!(checks[2].spec.interval, 5);
        assert_eq!(checks[1].spec.retry, 1);
    }

    #[test]
    fn empty_command_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "bad.yml", "x:\n  command: ''\n");
        let err = load_checks(dir.path(), "h").unwrap_err();
        assert!(err.to_string().contains("//h/bad/x: command"));
    }

    #[test]
    fn zero_intervals_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "bad.yml", "x:\n  command: 'true'\n  retry_interval: 0\n");
        let err = load_checks(dir.path(), "h").unwrap_err();
        assert!(err.to_string().contains("retry_interval"));
    }

    #[test]
    fn bad_threshold_names_check() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir,
            "bad.yml",
            "x:\n  command: 'true'\n  thresholds: 'load warning >> 3'\n",
        );
        let err = load_checks(dir.path(), "h").unwrap_err();
        assert!(matches!(err, LoadError::Threshold { .. }));
        assert!(err.to_string().starts_with("//h/bad/x: "));
    }

    #[test]
    fn missing_directory_is_io_error() {
        assert!(matches!(
            load_checks(Path::new("/nonexistent/checks"), "h"),
            Err(LoadError::Io(_))
        ));
    }
}
