// src/infra/paths.rs — Default file locations
//
// The settings file lives in the user's home directory so one key serves
// every working copy. The work list and results file are relative to the
// current directory, one pair per migration pass.

use std::path::PathBuf;

/// Settings file name, created in the home directory.
pub const SETTINGS_FILE: &str = "dataiku-tools-settings.yml";

/// Default work list file (relative to the working directory).
pub const WORK_LIST_FILE: &str = "recipes";

/// Default results file (relative to the working directory).
pub const RESULTS_FILE: &str = "results.csv";

/// Home directory
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default settings file path: ~/dataiku-tools-settings.yml
pub fn settings_path() -> PathBuf {
    dirs_home().join(SETTINGS_FILE)
}
