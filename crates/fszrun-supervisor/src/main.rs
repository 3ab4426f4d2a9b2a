//! fszrun Supervisor
//!
//! 常驻进程，负责：
//! - 以 `-l <addr> -p <port> <root>` 启动 `bin/fsz`
//! - 子进程退出（无论原因）后等待固定冷却时间再重启
//! - 每次启动前重新读取 `PORT`
//!
//! 没有重试上限，只能通过外部信号停止。

use anyhow::Result;
use clap::Parser;
use fszrun_core::{
    PortSource, ProcessLauncher, Supervisor, SupervisorConfig, SupervisorEvent,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fszrun-supervisor", version, about = "保持 fsz 文件服务器持续运行")]
struct Cli {
    /// 文件服务器可执行文件
    #[arg(long, default_value = "bin/fsz")]
    program: PathBuf,
    /// 监听地址
    #[arg(short, long, default_value = "0.0.0.0")]
    listen: String,
    /// 对外提供的目录
    #[arg(long, default_value = "fs/")]
    root: PathBuf,
    /// 固定端口 (不指定则每次启动前读取 PORT，默认 5000)
    #[arg(short, long)]
    port: Option<u16>,
    /// 退出后重启前的等待时间 (毫秒)
    #[arg(long, default_value = "3000")]
    cooldown_ms: u64,
}

impl Cli {
    fn into_config(self) -> SupervisorConfig {
        SupervisorConfig {
            program: self.program,
            listen_addr: self.listen,
            root: self.root,
            cooldown: Duration::from_millis(self.cooldown_ms),
            port: self.port.map(PortSource::Fixed).unwrap_or_default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 桥接 log crate（fszrun-core 使用）到 tracing
    let _ = tracing_log::LogTracer::init();

    // 初始化日志
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,fszrun_core=debug")),
        )
        .try_init();

    let config = Cli::parse().into_config();
    tracing::info!("fszrun supervisor starting: {:?}", config);

    let mut supervisor = Supervisor::new(config, ProcessLauncher);
    let mut events = supervisor.subscribe();

    tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("丢失了 {} 条事件", n);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            match event {
                SupervisorEvent::Running { attempt, pid } => {
                    tracing::info!("fsz 已启动 (#{}, pid {:?})", attempt, pid);
                }
                SupervisorEvent::Exited {
                    attempt,
                    exit,
                    uptime,
                } => {
                    tracing::warn!("fsz 已退出 (#{}): {}，运行了 {:?}", attempt, exit, uptime);
                }
                SupervisorEvent::LaunchFailed { attempt, error } => {
                    tracing::error!("fsz 启动失败 (#{}): {}", attempt, error);
                }
                SupervisorEvent::CoolingDown { delay } => {
                    tracing::info!("{:?} 后重启", delay);
                }
                SupervisorEvent::Starting { .. } => {}
            }
        }
    });

    supervisor.run().await;

    Ok(())
}
