//! Test bot process management.
//!
//! Spawns the `maestro` binary with a generated config in a temporary
//! directory and seeds its data files from `bot_files/`.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::{Child, Command};
use tokio::time::timeout;

pub const BOT_NAME: &str = "maestro";
pub const ADMIN: &str = "boss";
pub const CHANNEL: &str = "mychan";

/// A running bot process.
pub struct TestBot {
    child: Child,
    dir: TempDir,
}

impl TestBot {
    /// Spawn one bot against `address` with the default commands, a
    /// recorded channel, and moderator privileges.
    pub fn spawn(address: &str) -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        seed_data_dir(&dir.path().join("bot_files"))?;

        let config = format!(
            r##"
[server]
address = "{address}"
idle_timeout_secs = 1

[[bot]]
name = "{BOT_NAME}"
oauth = "oauth:test"
channels = ["#MyChan"]
admins = ["Boss"]
record = ["{CHANNEL}"]
moderator = true
data_dir = "{data}"
log_dir = "{logs}"
"##,
            data = toml_path(&dir.path().join("bot_files")),
            logs = toml_path(&dir.path().join("local_logs")),
        );
        Self::spawn_with_config(dir, &config)
    }

    /// Spawn the binary with a raw config body.
    pub fn spawn_with_config(dir: TempDir, config: &str) -> anyhow::Result<Self> {
        let config_path = dir.path().join("maestro.toml");
        std::fs::write(&config_path, config)?;

        let child = Command::new(env!("CARGO_BIN_EXE_maestro"))
            .arg(&config_path)
            .env("RUST_LOG", "debug")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        Ok(Self { child, dir })
    }

    /// Temporary directory holding the config, data files, and logs.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn commands_file(&self) -> PathBuf {
        self.dir().join("bot_files").join("commands.json")
    }

    pub fn prohibited_file(&self) -> PathBuf {
        self.dir().join("bot_files").join("prohibited.json")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.dir().join("local_logs")
    }

    /// Wait for the process to exit on its own.
    pub async fn wait_for_exit(&mut self, dur: Duration) -> anyhow::Result<ExitStatus> {
        Ok(timeout(dur, self.child.wait()).await??)
    }
}

fn seed_data_dir(data_dir: &Path) -> anyhow::Result<()> {
    let seeds = Path::new(env!("CARGO_MANIFEST_DIR")).join("bot_files");
    std::fs::create_dir_all(data_dir)?;
    for name in ["commands.json", "prohibited.json"] {
        std::fs::copy(seeds.join(name), data_dir.join(name))?;
    }
    Ok(())
}

/// Forward slashes keep the path valid inside a TOML basic string.
fn toml_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}
