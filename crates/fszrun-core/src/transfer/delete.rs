//! 删除结果

use serde::Serialize;

pub const FORBIDDEN_MESSAGE: &str = "Could not delete chosen file";
pub const NOT_FOUND_MESSAGE: &str = "Could not find requested file";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// 200
    Deleted,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 其他状态码
    Unexpected { status: u16 },
    /// 请求没有完成
    NetworkFailed { reason: String },
}

impl DeleteOutcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            200 => DeleteOutcome::Deleted,
            403 => DeleteOutcome::Forbidden,
            404 => DeleteOutcome::NotFound,
            status => DeleteOutcome::Unexpected { status },
        }
    }

    /// 需要提示给用户的消息，成功时为 `None`
    pub fn message(&self) -> Option<String> {
        match self {
            DeleteOutcome::Deleted => None,
            DeleteOutcome::Forbidden => Some(FORBIDDEN_MESSAGE.to_string()),
            DeleteOutcome::NotFound => Some(NOT_FOUND_MESSAGE.to_string()),
            DeleteOutcome::Unexpected { status } => {
                Some(format!("Could not delete file ({status})"))
            }
            DeleteOutcome::NetworkFailed { reason } => {
                Some(format!("Could not delete file: {reason}"))
            }
        }
    }
}
