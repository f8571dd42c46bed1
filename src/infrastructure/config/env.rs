//! Environment file loading.

use std::path::Path;

use dotenvy::Error;

const BASE_FILE: &str = ".env";
const LOCAL_FILE: &str = ".env.local";

/// Load `.env`, then let `.env.local` override it.
///
/// Variables already set in the process environment win over `.env` but
/// not over `.env.local`. Missing files are skipped. Returns the files that
/// were read; a malformed file is reported on stderr and otherwise ignored
/// since logging is not up yet.
pub fn load_env() -> Vec<&'static str> {
    load_env_from(Path::new("."))
}

fn load_env_from(dir: &Path) -> Vec<&'static str> {
    let mut loaded = Vec::new();

    match dotenvy::from_path(dir.join(BASE_FILE)) {
        Ok(()) => loaded.push(BASE_FILE),
        Err(e) => report(BASE_FILE, &e),
    }
    match dotenvy::from_path_override(dir.join(LOCAL_FILE)) {
        Ok(()) => loaded.push(LOCAL_FILE),
        Err(e) => report(LOCAL_FILE, &e),
    }

    loaded
}

fn report(file: &str, error: &Error) {
    if !error.not_found() {
        eprintln!("ignoring {file}: {error}");
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn local_file_overrides_base_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(BASE_FILE),
            "AGENT_SIM_ENV_TEST_A=base\nAGENT_SIM_ENV_TEST_B=base\n",
        )
        .unwrap();
        fs::write(dir.path().join(LOCAL_FILE), "AGENT_SIM_ENV_TEST_B=local\n").unwrap();

        let loaded = load_env_from(dir.path());

        assert_eq!(loaded, vec![BASE_FILE, LOCAL_FILE]);
        assert_eq!(std::env::var("AGENT_SIM_ENV_TEST_A").unwrap(), "base");
        assert_eq!(std::env::var("AGENT_SIM_ENV_TEST_B").unwrap(), "local");
    }

    #[test]
    fn missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_from(dir.path()).is_empty());
    }
}
