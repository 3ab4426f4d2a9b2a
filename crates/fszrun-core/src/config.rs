//! 运行配置和持久化
//!
//! - `SupervisorConfig`: 守护循环的启动参数（程序路径、监听地址、端口来源、冷却时间）
//! - `ClientSettings`: 传输客户端设置，保存在 `<config_dir>/fszrun/client.toml`

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// 未设置 `PORT` 时使用的端口
pub const DEFAULT_PORT: u16 = 5000;

/// 端口环境变量名
pub const PORT_VAR: &str = "PORT";

/// 两次启动之间的固定冷却时间
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(3000);

/// 端口来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSource {
    /// 每次启动前重新读取环境变量
    Env(String),
    /// 固定端口
    Fixed(u16),
}

impl Default for PortSource {
    fn default() -> Self {
        PortSource::Env(PORT_VAR.to_string())
    }
}

impl PortSource {
    /// 解析本次启动要使用的端口
    pub fn resolve(&self) -> u16 {
        match self {
            PortSource::Env(var) => resolve_port(std::env::var(var).ok().as_deref()),
            PortSource::Fixed(port) => *port,
        }
    }
}

/// 将环境变量原始值解析为端口
///
/// 未设置或为空时回退到 [`DEFAULT_PORT`]；无法解析为端口号时同样回退，并记录警告。
pub fn resolve_port(raw: Option<&str>) -> u16 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_PORT;
    };

    match raw.parse::<u16>() {
        Ok(port) => port,
        Err(e) => {
            warn!(
                "Ignoring invalid {} value {:?} ({}), using {}",
                PORT_VAR, raw, e, DEFAULT_PORT
            );
            DEFAULT_PORT
        }
    }
}

/// 守护循环配置
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// 文件服务器可执行文件
    pub program: PathBuf,
    /// 监听地址
    pub listen_addr: String,
    /// 对外提供的目录
    pub root: PathBuf,
    /// 退出后到下一次启动的等待时间
    pub cooldown: Duration,
    pub port: PortSource,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("bin/fsz"),
            listen_addr: "0.0.0.0".to_string(),
            root: PathBuf::from("fs/"),
            cooldown: DEFAULT_COOLDOWN,
            port: PortSource::default(),
        }
    }
}

/// 传输客户端设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// 文件服务器地址
    pub server_url: String,
    /// 上传时每次交给传输层的字节数
    pub chunk_size: usize,
    /// 详细日志模式
    pub verbose: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: format!("http://127.0.0.1:{DEFAULT_PORT}"),
            chunk_size: 64 * 1024,
            verbose: false,
        }
    }
}

impl ClientSettings {
    /// 获取配置文件路径
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fszrun")
            .join("client.toml")
    }

    /// 加载设置（如果文件不存在则使用默认值）
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(settings) => {
                        debug!("Loaded settings from {:?}", path);
                        return settings;
                    }
                    Err(e) => {
                        warn!("Failed to parse settings: {}, using defaults", e);
                    }
                },
                Err(e) => {
                    warn!("Failed to read settings file: {}, using defaults", e);
                }
            }
        }
        Self::default()
    }

    /// 保存设置
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        debug!("Saved settings to {:?}", path);
        Ok(())
    }
}
