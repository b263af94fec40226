use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};

use rusqlite::Connection;
use serde_json::Value;
use tempfile::TempDir;

/// Assert command succeeded
#[macro_export]
macro_rules! assert_command_success {
    ($output:expr) => {
        assert!(
            $output.success,
            "Command failed with exit code {}\nstdout: {}\nstderr: {}",
            $output.exit_code, $output.stdout, $output.stderr
        );
    };
    ($output:expr, $msg:expr) => {
        assert!(
            $output.success,
            "{}: exit code {}\nstdout: {}\nstderr: {}",
            $msg, $output.exit_code, $output.stdout, $output.stderr
        );
    };
}

/// Isolated takt root with its own config and database.
pub struct TestFixture {
    pub temp_dir: TempDir,
    /// Working directory for spawned commands
    pub root: PathBuf,
    /// takt root (./.takt)
    pub takt_root: PathBuf,
    pub db_path: PathBuf,
    start_time: Instant,
    test_name: String,
}

impl TestFixture {
    pub fn new(test_name: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let takt_root = root.join(".takt");
        let db_path = takt_root.join("takt.db");
        std::fs::create_dir_all(&takt_root).expect("Failed to create takt root");

        println!("\n{}", "=".repeat(70));
        println!("[FIXTURE] Test: {test_name}");
        println!("[FIXTURE] Root: {}", root.display());
        println!("[FIXTURE] DB: {}", db_path.display());
        println!("{}", "=".repeat(70));

        Self {
            temp_dir,
            root,
            takt_root,
            db_path,
            start_time: Instant::now(),
            test_name: test_name.to_string(),
        }
    }

    /// Fixture with the sample project already imported.
    pub fn with_sample_project(test_name: &str) -> Self {
        let fixture = Self::new(test_name);
        let snapshot = fixture.write_json("snapshot.json", &takt::test_utils::fixtures::sample_snapshot_json());
        let output = fixture.run_takt(&["--robot", "import", &snapshot.display().to_string()]);
        assert_command_success!(output, "import failed");
        fixture
    }

    pub fn write_json(&self, name: &str, value: &Value) -> PathBuf {
        let path = self.root.join(name);
        std::fs::write(&path, serde_json::to_string_pretty(value).expect("serialize fixture"))
            .expect("Failed to write fixture file");
        path
    }

    pub fn write_config(&self, content: &str) {
        std::fs::write(self.takt_root.join("config.toml"), content)
            .expect("Failed to write config");
    }

    pub fn run_takt(&self, args: &[&str]) -> CommandOutput {
        self.run_takt_with_env(args, &[])
    }

    pub fn run_takt_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> CommandOutput {
        let start = Instant::now();
        println!("\n[CMD] takt {}", args.join(" "));

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_takt"));
        cmd.args(args)
            .env("HOME", &self.root)
            .env("XDG_CONFIG_HOME", self.root.join(".config"))
            .env("TAKT_ROOT", &self.takt_root)
            .env_remove("TAKT_CONFIG")
            .env_remove("TAKT_DB")
            .env_remove("RUST_LOG")
            .current_dir(&self.root);
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute takt command");
        let elapsed = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        println!("[CMD] Exit code: {}", output.status.code().unwrap_or(-1));
        println!("[CMD] Timing: {elapsed:?}");
        if !stdout.is_empty() {
            println!("[STDOUT]\n{stdout}");
        }
        if !stderr.is_empty() {
            println!("[STDERR]\n{stderr}");
        }

        CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout,
            stderr,
            elapsed,
        }
    }

    /// Read-only connection for state verification.
    pub fn open_db(&self) -> Connection {
        Connection::open(&self.db_path).expect("Failed to open database")
    }

    pub fn count_rows(&self, table: &str) -> i64 {
        self.open_db()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count query")
    }
}

impl Drop for TestFixture {
    fn drop(&mut self) {
        println!(
            "[FIXTURE] {} finished in {:?}",
            self.test_name,
            self.start_time.elapsed()
        );
    }
}

pub struct CommandOutput {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl CommandOutput {
    /// Parse stdout as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout).unwrap_or_else(|err| {
            panic!("stdout should be valid JSON ({err}):\n{}", self.stdout)
        })
    }
}
