//! File-type classification and existence checks for pipeline files

use super::errors::SyntaxError;
use std::path::{Path, PathBuf};

/// Lower-cased extension of `path`, or an empty string if it has none
///
/// Only the suffix after the final `.` of the file name counts, so
/// `app.gocd.yaml` is `yaml` and a bare `.yaml` is `yaml` too.
#[must_use]
pub fn file_extension(path: &Path) -> String {
    let Some(name) = path.file_name() else {
        return String::new();
    };
    let name = name.to_string_lossy();
    name.rfind('.')
        .map(|dot| name[dot + 1..].to_lowercase())
        .unwrap_or_default()
}

/// Returns the single extension shared by all `paths`
///
/// Fails with [`SyntaxError::MixedFileType`] if more than one extension
/// appears, and with [`SyntaxError::NoPipelineFiles`] on an empty slice.
pub fn classify<P: AsRef<Path>>(paths: &[P]) -> Result<String, SyntaxError> {
    let mut found: Vec<String> = Vec::new();

    for path in paths {
        let extension = file_extension(path.as_ref());
        if !found.contains(&extension) {
            found.push(extension);
        }
    }

    match found.len() {
        0 => Err(SyntaxError::NoPipelineFiles),
        1 => Ok(found.remove(0)),
        _ => Err(SyntaxError::MixedFileType { found }),
    }
}

/// Returns every path in `paths` that does not exist
#[must_use]
pub fn missing_files<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    let mut missing = Vec::new();
    for path in paths {
        let path: &Path = path.as_ref();
        if !path.exists() {
            missing.push(path.to_path_buf());
        }
    }
    missing
}

/// Fails with [`SyntaxError::PipelineFilesNotFound`] naming all missing paths
pub fn ensure_exist<P: AsRef<Path>>(paths: &[P]) -> Result<(), SyntaxError> {
    let missing = missing_files(paths);
    if missing.is_empty() {
        return Ok(());
    }

    tracing::debug!(missing = missing.len(), "Pipeline files not found");
    Err(SyntaxError::PipelineFilesNotFound { paths: missing })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_file_extension_takes_final_suffix() {
        assert_eq!(file_extension(Path::new("pipelines/app.gocd.yaml")), "yaml");
        assert_eq!(file_extension(Path::new("Build.GROOVY")), "groovy");
        assert_eq!(file_extension(Path::new("Makefile")), "");
    }

    #[test]
    fn test_file_extension_of_dotfile() {
        assert_eq!(file_extension(Path::new("ci/.yaml")), "yaml");
        assert_eq!(file_extension(Path::new("ci/.Groovy")), "groovy");
        assert_eq!(file_extension(Path::new("pipeline.")), "");
    }

    #[test]
    fn test_classify_single_family() {
        let paths = ["a.gocd.yaml", "nested/b.gocd.yaml"];
        assert_eq!(classify(&paths).unwrap(), "yaml");
    }

    #[test]
    fn test_classify_mixed_family() {
        let err = classify(&["a.yaml", "b.json"]).unwrap_err();
        match err {
            SyntaxError::MixedFileType { found } => assert_eq!(found, vec!["yaml", "json"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_classify_no_extension_is_empty_family() {
        assert_eq!(classify(&["Jenkinsfile"]).unwrap(), "");
    }

    #[test]
    fn test_classify_empty_input() {
        let paths: [&str; 0] = [];
        assert!(matches!(classify(&paths), Err(SyntaxError::NoPipelineFiles)));
    }

    #[test]
    fn test_ensure_exist_reports_every_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let present = temp_dir.path().join("present.gocd.yaml");
        fs::write(&present, "format_version: 10\n").unwrap();
        let first = temp_dir.path().join("first.gocd.yaml");
        let second = temp_dir.path().join("second.gocd.yaml");

        let err = ensure_exist(&[first.clone(), present, second.clone()]).unwrap_err();

        match &err {
            SyntaxError::PipelineFilesNotFound { paths } => {
                assert_eq!(paths, &vec![first.clone(), second.clone()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        let msg = err.to_string();
        assert!(msg.contains(&first.display().to_string()));
        assert!(msg.contains(&second.display().to_string()));
    }

    #[test]
    fn test_ensure_exist_all_present() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.gocd.json");
        fs::write(&file, "{}").unwrap();
        assert!(ensure_exist(&[file]).is_ok());
    }

    proptest! {
        #[test]
        fn prop_classify_uniform_extension(
            ext in "(yaml|json|groovy|toml)",
            stems in prop::collection::vec("[a-z]{1,8}", 1..6),
        ) {
            let paths: Vec<String> = stems.iter().map(|s| format!("{s}.{ext}")).collect();
            prop_assert_eq!(classify(&paths).unwrap(), ext);
        }

        #[test]
        fn prop_classify_mixed_regardless_of_order(
            stems in prop::collection::vec("[a-z]{1,8}", 2..6),
            split in 1usize..5,
            rotate in 0usize..6,
        ) {
            let split = split.min(stems.len() - 1);
            let mut paths: Vec<String> = stems
                .iter()
                .enumerate()
                .map(|(i, s)| if i < split { format!("{s}.yaml") } else { format!("{s}.json") })
                .collect();
            let len = paths.len();
            paths.rotate_left(rotate % len);
            let is_mixed = matches!(classify(&paths), Err(SyntaxError::MixedFileType { .. }));
            prop_assert!(is_mixed);
        }
    }
}
