use permit::build::{BuildOutput, NativeBuilder};
use permit::source::{FileSource, SourceKind};
use permit_common::{Layout, NativeArtifact, PermitError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway home: `claude/` is the install root, `src/` a local checkout.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        crate::test_log!("FIXTURE: Creating sandbox install root");
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("claude")).expect("Failed to create install root");
        Self { dir }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("claude")
    }

    pub fn source_root(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.root())
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root().join("settings.json")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root().join("hooks").join(".permit-manifest")
    }

    pub fn installed(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write a file into the local checkout's `hooks/` directory.
    pub fn write_source(&self, name: &str, content: &str) {
        let hooks = self.source_root().join("hooks");
        fs::create_dir_all(&hooks).expect("Failed to create source hooks dir");
        fs::write(hooks.join(name), content).expect("Failed to write source file");
    }

    pub fn write_settings(&self, content: &str) {
        fs::write(self.settings_path(), content).expect("Failed to write settings");
    }

    pub fn read_settings_raw(&self) -> String {
        fs::read_to_string(self.settings_path()).expect("Failed to read settings")
    }

    pub fn read_settings(&self) -> Value {
        serde_json::from_str(&self.read_settings_raw()).expect("settings.json is not JSON")
    }
}

/// In-memory file source; optionally fails on one path.
pub struct MemorySource {
    files: BTreeMap<String, Vec<u8>>,
    fail_on: Option<String>,
}

impl MemorySource {
    pub fn new(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(rel, content)| (rel.to_string(), content.as_bytes().to_vec()))
                .collect(),
            fail_on: None,
        }
    }

    pub fn failing_on(mut self, rel: &str) -> Self {
        self.fail_on = Some(rel.to_string());
        self
    }
}

impl FileSource for MemorySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    fn location(&self) -> String {
        "memory://hooks".to_string()
    }

    fn list_files(&self) -> Result<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn fetch(&self, rel: &str) -> Result<Vec<u8>> {
        if self.fail_on.as_deref() == Some(rel) {
            return Err(PermitError::SourceUnavailable {
                path: format!("memory://{rel}"),
                reason: "HTTP 404".to_string(),
                remote: true,
            });
        }
        self.files
            .get(rel)
            .cloned()
            .ok_or_else(|| PermitError::SourceUnavailable {
                path: rel.to_string(),
                reason: "not listed".to_string(),
                remote: true,
            })
    }
}

/// Compiler stand-in that copies the source to the output on success.
pub struct FakeBuilder {
    pub present: bool,
    pub failing: Vec<String>,
}

impl FakeBuilder {
    pub fn working() -> Self {
        Self {
            present: true,
            failing: Vec::new(),
        }
    }

    pub fn missing() -> Self {
        Self {
            present: false,
            failing: Vec::new(),
        }
    }

    pub fn failing(names: &[&str]) -> Self {
        Self {
            present: true,
            failing: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

impl NativeBuilder for FakeBuilder {
    fn tool_name(&self) -> &str {
        "fakec"
    }

    fn locate(&self) -> Option<PathBuf> {
        self.present.then(|| PathBuf::from("/opt/fake/bin/fakec"))
    }

    fn build(&self, _tool: &Path, source: &Path, output: &Path) -> BuildOutput {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing.contains(&name) {
            return BuildOutput {
                success: false,
                diagnostics: format!("{name}:1:1: error: cannot find 'NSApp' in scope"),
            };
        }
        match fs::copy(source, output) {
            Ok(_) => BuildOutput {
                success: true,
                diagnostics: String::new(),
            },
            Err(e) => BuildOutput {
                success: false,
                diagnostics: e.to_string(),
            },
        }
    }

    fn manual_command(&self, hooks_dir: &Path, artifact: &NativeArtifact) -> String {
        format!(
            "cd {} && fakec -o {} {}",
            hooks_dir.display(),
            artifact.output,
            artifact.source
        )
    }

    fn install_hint(&self) -> String {
        "Install fakec".to_string()
    }
}
