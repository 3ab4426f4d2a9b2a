//! 文件服务器子进程
//!
//! `Launcher` / `ServerProcess` 两个 trait 把守护循环和真实进程解耦，
//! `ProcessLauncher` 使用 tokio::process 启动 `bin/fsz`，标准输入输出直接继承。

use async_trait::async_trait;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};

/// 守护循环错误
///
/// 启动失败（程序不存在、无执行权限）与进程运行后退出区分开，
/// 但两者在循环中走同一条重试路径。
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("Executable not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Failed to spawn {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to wait for server process: {0}")]
    Wait(#[from] io::Error),
}

impl SupervisorError {
    /// 根据 spawn 返回的 IO 错误归类
    pub fn from_spawn(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => SupervisorError::ExecutableNotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => {
                SupervisorError::PermissionDenied(path.to_path_buf())
            }
            _ => SupervisorError::Spawn {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// 是否为启动阶段的错误
    pub fn is_launch_failure(&self) -> bool {
        !matches!(self, SupervisorError::Wait(_))
    }
}

/// 子进程退出方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerExit {
    Code(i32),
    Signal(i32),
    Unknown,
}

impl From<ExitStatus> for ServerExit {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ServerExit::Code(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ServerExit::Signal(signal);
            }
        }

        ServerExit::Unknown
    }
}

impl fmt::Display for ServerExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerExit::Code(code) => write!(f, "exit code {code}"),
            ServerExit::Signal(signal) => write!(f, "signal {signal}"),
            ServerExit::Unknown => write!(f, "unknown status"),
        }
    }
}

/// 单次启动参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub listen_addr: String,
    pub port: u16,
    pub root: PathBuf,
}

impl LaunchSpec {
    /// `-l <addr> -p <port> <root>`
    pub fn args(&self) -> Vec<String> {
        vec![
            "-l".to_string(),
            self.listen_addr.clone(),
            "-p".to_string(),
            self.port.to_string(),
            self.root.to_string_lossy().to_string(),
        ]
    }

    pub fn command_line(&self) -> String {
        format!("{} {}", self.program.display(), self.args().join(" "))
    }

    /// 横幅中显示的名称
    pub fn display_name(&self) -> String {
        self.program
            .file_stem()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "server".to_string())
    }
}

/// 正在运行的服务器进程
#[async_trait]
pub trait ServerProcess: Send {
    /// 操作系统进程 ID
    fn id(&self) -> Option<u32>;

    /// 等待进程退出，不区分退出原因
    async fn wait(&mut self) -> Result<ServerExit, SupervisorError>;
}

/// 服务器启动器
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, spec: &LaunchSpec) -> Result<Box<dyn ServerProcess>, SupervisorError>;
}

/// 使用真实子进程的启动器
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

struct ChildProcess {
    child: Child,
}

#[async_trait]
impl ServerProcess for ChildProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn wait(&mut self) -> Result<ServerExit, SupervisorError> {
        let status = self.child.wait().await?;
        Ok(status.into())
    }
}

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(&self, spec: &LaunchSpec) -> Result<Box<dyn ServerProcess>, SupervisorError> {
        let child = Command::new(&spec.program)
            .args(spec.args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            // 等待失败时丢弃句柄也不会留下第二个实例
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SupervisorError::from_spawn(&spec.program, e))?;

        Ok(Box::new(ChildProcess { child }))
    }
}
