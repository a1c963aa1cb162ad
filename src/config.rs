use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Paths {
    /// Blog posts, one `<slug>.<extension>` file each
    pub content_dir: PathBuf,
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ContentSettings {
    pub extension: String,
    /// Posts per page on the HTML list
    pub page_size: u32,
    /// Largest `limit` accepted by the listing API
    pub list_limit_max: usize,
}

impl Default for ContentSettings {
    fn default() -> Self {
        ContentSettings {
            extension: "md".to_string(),
            page_size: 10,
            list_limit_max: 100,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Copy, Clone, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GithubSettings {
    pub username: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_github_timeout_ms")]
    pub timeout_ms: u64,
    pub token: Option<String>,
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_github_timeout_ms() -> u64 {
    3000
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct HostSettings {
    /// Limit for each external tool (`nvidia-smi`, `df`).
    #[serde(alias = "gpu_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    pub cpu_sample_ms: u64,
}

impl Default for HostSettings {
    fn default() -> Self {
        HostSettings {
            probe_timeout_ms: 2000,
            cpu_sample_ms: 100,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub paths: Paths,
    #[serde(default)]
    pub content: ContentSettings,
    pub server: Server,
    pub log: Option<Log>,
    pub github: Option<GithubSettings>,
    #[serde(default)]
    pub host: HostSettings,
}

/// Expands a leading `${exe_dir}` to the directory of the running executable.
fn parse_path(path: PathBuf) -> PathBuf {
    let Ok(rest) = path.strip_prefix("${exe_dir}") else {
        return path;
    };

    match env::current_exe() {
        Ok(exe) => match exe.parent() {
            Some(exe_dir) => exe_dir.join(rest),
            None => path,
        },
        Err(_) => path,
    }
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        content_dir: parse_path(cfg.paths.content_dir),
        template_dir: parse_path(cfg.paths.template_dir),
        public_dir: parse_path(cfg.paths.public_dir),
    };
    cfg.content.extension = cfg.content.extension.trim_start_matches('.').to_string();

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}
