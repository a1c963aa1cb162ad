use std::fs;
use std::thread::available_parallelism;
use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::Serialize;
use spdlog::debug;
use tokio::process::Command;

use crate::config::HostSettings;

const GB_IN_KB: f64 = 1024.0 * 1024.0;
const TB_IN_KB: f64 = GB_IN_KB * 1024.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuStats {
    pub usage: u32,
    pub cores: u32,
    pub model: String,
}

/// Sizes in GB.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryStats {
    pub used: f64,
    pub total: f64,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpuStats {
    /// Celsius
    pub temperature: u32,
    pub usage: u32,
    /// GB in use
    pub memory: u32,
    pub model: String,
}

/// Sizes in TB.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageStats {
    pub used: f64,
    pub total: f64,
    pub percentage: u32,
}

/// Mbps
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub download_speed: u32,
    pub upload_speed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub platform: String,
    /// Seconds
    pub uptime: u64,
    pub load_average: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostStats {
    pub timestamp: String,
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub gpu: GpuStats,
    pub storage: StorageStats,
    pub network: NetworkStats,
    pub system: SystemInfo,
    /// Set when any value above is made up rather than measured.
    pub simulated: bool,
}

/// Whatever could be measured on this host. Missing values are filled in by [`HostReadings::complete`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostReadings {
    pub cpu_usage: Option<f64>,
    pub cpu_cores: Option<u32>,
    pub cpu_model: Option<String>,
    pub memory: Option<MemoryStats>,
    pub gpu: Option<GpuStats>,
    pub storage: Option<StorageStats>,
    pub network: Option<NetworkStats>,
    pub uptime: Option<u64>,
    pub load_average: Option<Vec<f64>>,
}

impl HostReadings {
    /// Replaces every missing reading with a plausible random value drawn from `rng`.
    pub fn complete<R: Rng + ?Sized>(self, rng: &mut R, now: DateTime<Utc>) -> HostStats {
        let mut simulated = false;

        let usage = match self.cpu_usage {
            Some(usage) => usage.round().clamp(0.0, 100.0) as u32,
            None => {
                simulated = true;
                rng.gen_range(20..=50)
            }
        };
        let cores = self.cpu_cores.unwrap_or_else(|| {
            simulated = true;
            16
        });
        let model = self.cpu_model.unwrap_or_else(|| {
            simulated = true;
            "AMD Ryzen 9 7950X".to_string()
        });

        let memory = self.memory.unwrap_or_else(|| {
            simulated = true;
            MemoryStats {
                used: rng.gen_range(20..40) as f64,
                total: 64.0,
                percentage: rng.gen_range(35..65),
            }
        });

        let gpu = self.gpu.unwrap_or_else(|| {
            simulated = true;
            GpuStats {
                temperature: rng.gen_range(65..80),
                usage: rng.gen_range(50..90),
                memory: rng.gen_range(8..16),
                model: "RTX 4090".to_string(),
            }
        });

        let storage = self.storage.unwrap_or_else(|| {
            simulated = true;
            StorageStats {
                used: round_to(rng.gen_range(1.2..=1.8), 2),
                total: 4.0,
                percentage: rng.gen_range(30..=45),
            }
        });

        let network = self.network.unwrap_or_else(|| {
            simulated = true;
            NetworkStats {
                download_speed: rng.gen_range(850..=950),
                upload_speed: rng.gen_range(450..=550),
            }
        });

        let uptime = self.uptime.unwrap_or_else(|| {
            simulated = true;
            86_400
        });
        let load_average = self.load_average.unwrap_or_else(|| {
            simulated = true;
            vec![1.5, 2.0, 2.2]
        });

        HostStats {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            cpu: CpuStats { usage, cores, model },
            memory,
            gpu,
            storage,
            network,
            system: SystemInfo {
                platform: std::env::consts::OS.to_string(),
                uptime,
                load_average,
            },
            simulated,
        }
    }
}

/// A fully made up record.
pub fn simulate<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> HostStats {
    HostReadings::default().complete(rng, now)
}

pub struct HostProbe {
    probe_timeout: Duration,
    cpu_sample: Duration,
}

impl HostProbe {
    pub fn new(settings: &HostSettings) -> Self {
        HostProbe {
            probe_timeout: Duration::from_millis(settings.probe_timeout_ms),
            cpu_sample: Duration::from_millis(settings.cpu_sample_ms),
        }
    }

    /// Measures what this host exposes. CPU and network rates are sampled over `cpu_sample_ms`
    /// while the external tools run.
    pub async fn read(&self) -> HostReadings {
        let started = Instant::now();
        let cpu_before = read_proc("/proc/stat").and_then(|s| parse_cpu_times(&s));
        let net_before = read_proc("/proc/net/dev").and_then(|s| parse_net_bytes(&s));

        let (gpu, storage, _) = tokio::join!(
            run_probe("nvidia-smi", &["--query-gpu=temperature.gpu,utilization.gpu,memory.used,name", "--format=csv,noheader,nounits"], self.probe_timeout),
            run_probe("df", &["-Pk", "/"], self.probe_timeout),
            tokio::time::sleep(self.cpu_sample),
        );

        let cpu_after = read_proc("/proc/stat").and_then(|s| parse_cpu_times(&s));
        let net_after = read_proc("/proc/net/dev").and_then(|s| parse_net_bytes(&s));
        let elapsed = started.elapsed();

        let cpu_usage = match (cpu_before, cpu_after) {
            (Some(before), Some(after)) => cpu_usage(&before, &after),
            _ => None,
        };
        let network = match (net_before, net_after) {
            (Some(before), Some(after)) => network_rate(before, after, elapsed),
            _ => None,
        };

        HostReadings {
            cpu_usage,
            cpu_cores: available_parallelism().ok().map(|n| n.get() as u32),
            cpu_model: read_proc("/proc/cpuinfo").and_then(|s| parse_cpu_model(&s)),
            memory: read_proc("/proc/meminfo").and_then(|s| parse_meminfo(&s)),
            gpu: gpu.and_then(|s| parse_nvidia_smi(&s)),
            storage: storage.and_then(|s| parse_df(&s)),
            network,
            uptime: read_proc("/proc/uptime").and_then(|s| parse_uptime(&s)),
            load_average: read_proc("/proc/loadavg").and_then(|s| parse_loadavg(&s)),
        }
    }

    /// Measured values where available, simulated ones elsewhere.
    pub async fn collect<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> HostStats {
        let stats = self.read().await.complete(rng, now);
        if stats.simulated {
            debug!("Some host metrics are not available here. Filling them with simulated values");
        }
        stats
    }
}

fn read_proc(path: &str) -> Option<String> {
    fs::read_to_string(path).ok()
}

async fn run_probe(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let mut command = Command::new(program);
    command.args(args).kill_on_drop(true);

    match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) if output.status.success() => String::from_utf8(output.stdout).ok(),
        Ok(Ok(output)) => {
            debug!("{} exited with {}", program, output.status);
            None
        }
        Ok(Err(e)) => {
            debug!("{} is not available: {}", program, e);
            None
        }
        Err(_) => {
            debug!("{} did not answer within {:?}", program, timeout);
            None
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuTimes {
    pub idle: u64,
    pub total: u64,
}

/// Aggregate `cpu` line of `/proc/stat`. Guest time is already part of user time.
pub fn parse_cpu_times(stat: &str) -> Option<CpuTimes> {
    let line = stat.lines().find(|line| line.starts_with("cpu "))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(8)
        .map(|field| field.parse().ok())
        .collect::<Option<Vec<u64>>>()?;
    if fields.len() < 4 {
        return None;
    }

    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    Some(CpuTimes { idle, total: fields.iter().sum() })
}

/// Busy percentage between two samples.
pub fn cpu_usage(before: &CpuTimes, after: &CpuTimes) -> Option<f64> {
    let total = after.total.checked_sub(before.total)?;
    let idle = after.idle.checked_sub(before.idle)?;
    if total == 0 || idle > total {
        return None;
    }
    Some((total - idle) as f64 * 100.0 / total as f64)
}

pub fn parse_meminfo(meminfo: &str) -> Option<MemoryStats> {
    let field = |name: &str| -> Option<u64> {
        let line = meminfo.lines().find(|line| line.starts_with(name))?;
        line[name.len()..].trim_start_matches(':').split_whitespace().next()?.parse().ok()
    };

    let total_kb = field("MemTotal")?;
    let available_kb = field("MemAvailable")?;
    if total_kb == 0 || available_kb > total_kb {
        return None;
    }

    let used_kb = total_kb - available_kb;
    Some(MemoryStats {
        used: round_to(used_kb as f64 / GB_IN_KB, 1),
        total: (total_kb as f64 / GB_IN_KB).round(),
        percentage: (used_kb as f64 * 100.0 / total_kb as f64).round() as u32,
    })
}

pub fn parse_cpu_model(cpuinfo: &str) -> Option<String> {
    cpuinfo
        .lines()
        .find(|line| line.starts_with("model name"))
        .and_then(|line| line.split_once(':'))
        .map(|(_, model)| model.trim().to_string())
        .filter(|model| !model.is_empty())
}

pub fn parse_uptime(uptime: &str) -> Option<u64> {
    let seconds: f64 = uptime.split_whitespace().next()?.parse().ok()?;
    Some(seconds.round() as u64)
}

pub fn parse_loadavg(loadavg: &str) -> Option<Vec<f64>> {
    let loads = loadavg
        .split_whitespace()
        .take(3)
        .map(|field| field.parse().ok())
        .collect::<Option<Vec<f64>>>()?;
    (loads.len() == 3).then_some(loads)
}

/// Received and transmitted bytes summed over every interface but loopback.
pub fn parse_net_bytes(net_dev: &str) -> Option<(u64, u64)> {
    let mut rx = 0;
    let mut tx = 0;
    let mut seen = false;

    for line in net_dev.lines().skip(2) {
        let Some((iface, counters)) = line.split_once(':') else {
            continue;
        };
        if iface.trim() == "lo" {
            continue;
        }
        let counters: Vec<u64> = counters.split_whitespace().filter_map(|c| c.parse().ok()).collect();
        if counters.len() < 9 {
            continue;
        }
        rx += counters[0];
        tx += counters[8];
        seen = true;
    }

    seen.then_some((rx, tx))
}

pub fn network_rate(before: (u64, u64), after: (u64, u64), elapsed: Duration) -> Option<NetworkStats> {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return None;
    }
    let mbps = |bytes: u64| (bytes as f64 * 8.0 / 1_000_000.0 / secs).round() as u32;
    Some(NetworkStats {
        download_speed: mbps(after.0.checked_sub(before.0)?),
        upload_speed: mbps(after.1.checked_sub(before.1)?),
    })
}

/// First GPU of `nvidia-smi --format=csv,noheader,nounits`. Memory comes in MiB.
pub fn parse_nvidia_smi(output: &str) -> Option<GpuStats> {
    let line = output.lines().find(|line| !line.trim().is_empty())?;
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < 4 {
        return None;
    }

    let number = |s: &str| s.parse::<f64>().map(|v| v.round() as u32).unwrap_or(0);
    let model = if parts[3].is_empty() { "Unknown GPU" } else { parts[3] };
    Some(GpuStats {
        temperature: number(parts[0]),
        usage: number(parts[1]),
        memory: (number(parts[2]) as f64 / 1024.0).round() as u32,
        model: model.to_string(),
    })
}

/// Root filesystem usage from POSIX `df -Pk /`.
pub fn parse_df(output: &str) -> Option<StorageStats> {
    let line = output.lines().nth(1)?;
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return None;
    }

    let total_kb: u64 = fields[1].parse().ok()?;
    let used_kb: u64 = fields[2].parse().ok()?;
    let percentage: u32 = fields[4].trim_end_matches('%').parse().ok()?;
    Some(StorageStats {
        used: round_to(used_kb as f64 / TB_IN_KB, 2),
        total: round_to(total_kb as f64 / TB_IN_KB, 2),
        percentage,
    })
}
