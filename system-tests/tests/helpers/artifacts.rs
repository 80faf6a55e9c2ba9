// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Artifact helpers for system-tests.
// Purpose: Pick a per-test run root for report artifacts.
// Dependencies: system-tests, tempfile
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use system_tests::config::SystemTestConfig;
use tempfile::TempDir;

/// Artifact root for a single system-test.
///
/// Uses `ROAST_SYSTEM_TEST_RUN_ROOT/<test>` when set so artifacts survive the
/// run; otherwise a temporary directory removed on drop.
#[derive(Debug)]
pub struct TestArtifacts {
    root: PathBuf,
    _temp: Option<TempDir>,
}

impl TestArtifacts {
    /// Creates the artifact root for a test.
    pub fn new(test_name: &str) -> io::Result<Self> {
        let config = SystemTestConfig::load().map_err(io::Error::other)?;
        match config.run_root {
            Some(root) => {
                let root = root.join(test_name);
                fs::create_dir_all(&root)?;
                Ok(Self {
                    root,
                    _temp: None,
                })
            }
            None => {
                let temp = tempfile::tempdir()?;
                Ok(Self {
                    root: temp.path().to_path_buf(),
                    _temp: Some(temp),
                })
            }
        }
    }

    /// Returns the root directory for the test artifacts.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
