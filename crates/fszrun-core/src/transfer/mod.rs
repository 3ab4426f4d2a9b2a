//! 文件传输模块
//!
//! 包含:
//! - 上传载荷编码 (Base64 + NUL 结束标记)
//! - 请求路径与上传对话框状态
//! - 带进度和单会话保护的上传
//! - 删除请求及其状态码处理

pub mod client;
pub mod codec;
pub mod delete;
pub mod dialog;
pub mod path;
pub mod upload;
pub mod view;

pub use client::TransferClient;
pub use codec::{CodecError, TERMINATOR, decode_payload, encode_payload};
pub use delete::DeleteOutcome;
pub use dialog::{ClickPoint, DialogBounds, UploadDialog};
pub use path::{FILE_ROUTE, Location, UploadTarget, upload_path};
pub use upload::{UploadGuard, UploadOutcome, UploadPhase, UploadSession};
pub use view::{ChannelView, TransferEvent, TransferView};

use std::path::PathBuf;

/// 传输错误
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid server URL {url}: {reason}")]
    InvalidServer { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
