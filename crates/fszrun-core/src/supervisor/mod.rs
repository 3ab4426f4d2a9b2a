//! 守护循环
//!
//! 保持文件服务器持续可用：
//! 1. 打印启动横幅
//! 2. 以继承的标准输入输出启动 `bin/fsz -l <addr> -p <port> <root>`
//! 3. 阻塞等待子进程退出（不区分退出原因）
//! 4. 固定冷却后回到第 1 步
//!
//! 没有重试上限，也没有退避增长；只能由外部信号终止。

pub mod process;


pub use process::{LaunchSpec, Launcher, ProcessLauncher, ServerExit, ServerProcess, SupervisorError};

use crate::config::SupervisorConfig;
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// 守护循环状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Launching,
    Running,
    Cooldown,
}

/// 守护循环事件
#[derive(Debug, Clone, PartialEq)]
pub enum SupervisorEvent {
    Starting { attempt: u64, port: u16 },
    Running { attempt: u64, pid: Option<u32> },
    Exited {
        attempt: u64,
        exit: ServerExit,
        uptime: Duration,
    },
    LaunchFailed { attempt: u64, error: String },
    CoolingDown { delay: Duration },
}

/// 单轮结果
#[derive(Debug)]
pub enum CycleOutcome {
    /// 进程运行后退出
    Exited { exit: ServerExit, uptime: Duration },
    /// 启动失败或等待失败
    Failed(SupervisorError),
}

#[derive(Debug)]
pub struct CycleReport {
    pub attempt: u64,
    pub port: u16,
    pub outcome: CycleOutcome,
}

/// 启动横幅
pub fn banner(name: &str) -> String {
    let line = format!("| Starting {name} |");
    let border = "=".repeat(line.chars().count());
    format!("{border}\n{line}\n{border}")
}

pub struct Supervisor<L> {
    config: SupervisorConfig,
    launcher: L,
    state: SupervisorState,
    launches: u64,
    events: broadcast::Sender<SupervisorEvent>,
}

impl<L: Launcher> Supervisor<L> {
    pub fn new(config: SupervisorConfig, launcher: L) -> Self {
        let (events, _) = broadcast::channel(64);

        Self {
            config,
            launcher,
            state: SupervisorState::Idle,
            launches: 0,
            events,
        }
    }

    /// 订阅守护循环事件
    pub fn subscribe(&self) -> broadcast::Receiver<SupervisorEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// 累计启动次数
    pub fn launches(&self) -> u64 {
        self.launches
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// 无限循环，不会返回
    pub async fn run(&mut self) {
        info!(
            "Supervising {} (cooldown {:?})",
            self.config.program.display(),
            self.config.cooldown
        );

        loop {
            let report = self.run_cycle().await;
            debug!("Cycle {} finished: {:?}", report.attempt, report.outcome);
        }
    }

    /// 执行一轮：启动、等待退出、冷却
    pub async fn run_cycle(&mut self) -> CycleReport {
        // 每轮重新解析端口，环境变量的修改在下次重启时生效
        let spec = self.launch_spec();
        println!("{}", banner(&spec.display_name()));

        self.set_state(SupervisorState::Launching);
        self.launches += 1;
        let attempt = self.launches;

        info!("Launching #{}: {}", attempt, spec.command_line());
        self.emit(SupervisorEvent::Starting {
            attempt,
            port: spec.port,
        });

        let outcome = match self.launcher.launch(&spec).await {
            Ok(mut process) => {
                let pid = process.id();
                self.set_state(SupervisorState::Running);
                self.emit(SupervisorEvent::Running { attempt, pid });

                let started = Instant::now();
                let result = process.wait().await;
                let uptime = started.elapsed();
                drop(process);

                match result {
                    Ok(exit) => {
                        warn!("Server exited with {} after {:?}", exit, uptime);
                        self.emit(SupervisorEvent::Exited {
                            attempt,
                            exit,
                            uptime,
                        });
                        CycleOutcome::Exited { exit, uptime }
                    }
                    Err(e) => {
                        error!("{}", e);
                        self.emit(SupervisorEvent::Exited {
                            attempt,
                            exit: ServerExit::Unknown,
                            uptime,
                        });
                        CycleOutcome::Failed(e)
                    }
                }
            }
            Err(e) => {
                error!("Failed to launch {}: {}", spec.program.display(), e);
                self.emit(SupervisorEvent::LaunchFailed {
                    attempt,
                    error: e.to_string(),
                });
                CycleOutcome::Failed(e)
            }
        };

        let delay = self.config.cooldown;
        self.set_state(SupervisorState::Cooldown);
        self.emit(SupervisorEvent::CoolingDown { delay });
        tokio::time::sleep(delay).await;

        CycleReport {
            attempt,
            port: spec.port,
            outcome,
        }
    }

    fn launch_spec(&self) -> LaunchSpec {
        LaunchSpec {
            program: self.config.program.clone(),
            listen_addr: self.config.listen_addr.clone(),
            port: self.config.port.resolve(),
            root: self.config.root.clone(),
        }
    }

    fn set_state(&mut self, state: SupervisorState) {
        debug!("Supervisor state: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn emit(&self, event: SupervisorEvent) {
        // 没有订阅者时忽略
        let _ = self.events.send(event);
    }
}
