use std::env;
use std::path::PathBuf;

use folio::config::{read_config, Config};
use folio::logger::default_log_location;

use crate::config_data::write_sample_cfg;
use crate::CFG_FILE_NAME;

/// Executable directory, then the current directory, then the user config directory.
fn get_config_path() -> Option<PathBuf> {
    let mut candidates = vec![];
    if let Some(exe_dir) = env::current_exe().ok().and_then(|exe| exe.parent().map(|dir| dir.to_path_buf())) {
        candidates.push(exe_dir.join(CFG_FILE_NAME));
    }
    if let Ok(cur_dir) = env::current_dir() {
        candidates.push(cur_dir.join(CFG_FILE_NAME));
    }
    if let Some(cfg_dir) = dirs::config_dir() {
        candidates.push(cfg_dir.join(CFG_FILE_NAME));
    }

    candidates.into_iter().find(|path| path.exists())
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config, String> {
    let config_path = match cfg_path.or_else(get_config_path) {
        Some(path) => path,
        None => return Err("Could not find Folio configuration".to_string()),
    };

    println!("Reading config from {}", config_path.display());
    let mut config = match read_config(&config_path) {
        Ok(config) => config,
        Err(e) => return Err(e.to_string()),
    };

    if let Some(mut log) = config.log {
        log.location = log.location.or_else(default_log_location);
        match log.location {
            Some(ref location) => println!("Log enabled. Files will be written in {}", location.display()),
            None => println!("Log enabled without a log directory. Using stdout"),
        }
        config.log = Some(log);
    } else {
        println!("Log disabled. Using stdout");
    }

    Ok(config)
}

pub(crate) fn generate_cfg(config_path: Option<PathBuf>) -> Result<PathBuf, String> {
    let path = match config_path.or_else(|| dirs::config_dir().map(|dir| dir.join(CFG_FILE_NAME))) {
        Some(path) => path,
        None => return Err("Could not find the user config directory. Please pass --config-path".to_string()),
    };

    if path.exists() {
        return Err(format!("{} already exists", path.display()));
    }

    println!("Writing sample config to {}", path.display());
    write_sample_cfg(&path).map_err(|e| format!("Error writing {}: {}", path.display(), e))?;
    Ok(path)
}
