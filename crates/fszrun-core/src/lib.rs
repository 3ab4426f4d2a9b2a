//! fszrun Core Library
//!
//! 文件托管前端的核心实现：守护 `bin/fsz` 文件服务器进程，
//! 并通过其 HTTP 接口上传和删除文件。
//!
//! # 模块
//!
//! - **config**: 端口解析、守护循环配置、客户端设置
//! - **supervisor**: 启动、等待退出、冷却、重启的无限循环
//! - **transfer**: 上传载荷编码、带进度的上传、删除
//!
//! # 使用示例
//!
//! ## 守护文件服务器
//!
//! ```ignore
//! use fszrun_core::{ProcessLauncher, Supervisor, SupervisorConfig};
//!
//! let mut supervisor = Supervisor::new(SupervisorConfig::default(), ProcessLauncher);
//! supervisor.run().await; // 不会返回
//! ```
//!
//! ## 上传文件
//!
//! ```ignore
//! use fszrun_core::{ChannelView, Location, TransferClient, UploadDialog};
//!
//! let client = TransferClient::new("http://127.0.0.1:5000")?;
//! let (view, mut events) = ChannelView::new();
//!
//! let mut dialog = UploadDialog::new();
//! dialog.open(&Location::new("/f/docs/"));
//! let target = dialog.select("report.txt");
//!
//! let outcome = client.upload(Path::new("report.txt"), target, &view).await?;
//! ```

pub mod config;
pub mod supervisor;
pub mod transfer;

// Config re-exports
pub use config::{ClientSettings, DEFAULT_PORT, PortSource, SupervisorConfig, resolve_port};

// Supervisor re-exports
pub use supervisor::{
    CycleOutcome, CycleReport, LaunchSpec, Launcher, ProcessLauncher, ServerExit, ServerProcess,
    Supervisor, SupervisorError, SupervisorEvent, SupervisorState,
};

// Transfer re-exports
pub use transfer::{
    ChannelView, DeleteOutcome, Location, TransferClient, TransferError, TransferEvent,
    TransferView, UploadDialog, UploadOutcome, UploadTarget,
};
