use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

#[path = "support/fake_github.rs"]
mod fake_github;

pub use fake_github::{FakeGitHub, FEED_PATH};

// An isolated HOME and working directory per test, with the install
// directory at $HOME/compatibilitytools.d.
#[allow(dead_code)]
pub struct TestContext {
    pub _temp_dir: TempDir,
    pub home: PathBuf,
    pub work_dir: PathBuf,
    pub install_dir: PathBuf,
    pub bin_path: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let home = temp_dir.path().join("home");
        let work_dir = temp_dir.path().join("work");
        let install_dir = home.join("compatibilitytools.d");
        fs::create_dir_all(&install_dir).unwrap();
        fs::create_dir_all(&work_dir).unwrap();

        let bin_path = PathBuf::from(env!("CARGO_BIN_EXE_ge-updater"));

        Self {
            _temp_dir: temp_dir,
            home,
            work_dir,
            install_dir,
            bin_path,
        }
    }

    pub fn write_config(&self, keep_old: &str) {
        let content = format!(
            "[proton]\nproton_location = /compatibilitytools.d\nkeep_old = {}\n",
            keep_old
        );
        fs::write(self.work_dir.join("config.conf"), content).unwrap();
    }

    pub fn install(&self, versions: &[&str]) {
        for version in versions {
            fs::create_dir_all(self.install_dir.join(version).join("files")).unwrap();
        }
    }

    pub fn cmd(&self, server: &FakeGitHub) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        cmd.current_dir(&self.work_dir);
        cmd.env("HOME", &self.home);
        cmd.env("GE_UPDATER_API_URL", &server.base_url);
        cmd.env_remove("GE_UPDATER_CONFIG");
        cmd.env_remove("GE_UPDATER_KEEP_OLD");
        cmd.env_remove("GE_UPDATER_DOWNLOAD_DIR");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Run with `answers` fed to stdin.
    pub fn run(&self, server: &FakeGitHub, args: &[&str], answers: &str) -> CommandOutput {
        let mut child = self
            .cmd(server)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to run ge-updater");
        {
            let mut stdin = child.stdin.take().expect("stdin was not piped");
            // the process may exit before reading everything
            let _ = stdin.write_all(answers.as_bytes());
        }
        child
            .wait_with_output()
            .expect("Failed to wait for ge-updater")
            .into()
    }

    pub fn installed(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.install_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

#[allow(dead_code)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.status.success() {
            panic!(
                "Command failed with status {:?}\nstdout: {}\nstderr: {}",
                self.status.code(),
                self.stdout,
                self.stderr
            );
        }
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert_eq!(
            self.status.code(),
            Some(1),
            "Expected exit status 1\nstdout: {}\nstderr: {}",
            self.stdout,
            self.stderr
        );
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Stdout did not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Stderr did not contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}
