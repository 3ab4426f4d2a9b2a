//! 上传会话
//!
//! 一次上传从选中文件开始，到得到最终结果结束：
//!
//! ```text
//! Idle -> Reading -> Encoding -> Transferring -> Succeeded | Failed
//! ```
//!
//! 同一客户端同时最多只有一个会话，`UploadGuard` 在会话期间拒绝新的上传。

use crate::transfer::path::UploadTarget;
use futures_util::StreamExt;
use log::debug;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use uuid::Uuid;

/// 上传阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Reading,
    Encoding,
    Transferring { percent: u8 },
    Succeeded,
    /// `status` 为 `None` 表示请求没有完成
    Failed { status: Option<u16> },
}

impl UploadPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadPhase::Succeeded | UploadPhase::Failed { .. })
    }
}

/// 一次进行中的上传
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub id: Uuid,
    pub target: UploadTarget,
    pub size: u64,
    phase: UploadPhase,
}

impl UploadSession {
    pub fn new(target: UploadTarget) -> Self {
        Self {
            id: Uuid::new_v4(),
            target,
            size: 0,
            phase: UploadPhase::Idle,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.target.file_name
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn advance(&mut self, phase: UploadPhase) {
        debug!("Upload {} [{}]: {:?} -> {:?}", self.id, self.target.file_name, self.phase, phase);
        self.phase = phase;
    }
}

/// 上传结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum UploadOutcome {
    /// 服务器返回 200
    Succeeded,
    /// 服务器返回其他状态码
    Rejected { status: u16 },
    /// 请求没有完成
    NetworkFailed { reason: String },
    /// 已有上传进行中，本次被忽略
    Busy,
}

/// 截断后的整数百分比
pub fn progress_percent(loaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = u128::from(loaded.min(total)) * 100 / u128::from(total);
    u8::try_from(percent).unwrap_or(100)
}

pub fn uploading_status(file_name: &str, percent: u8) -> String {
    format!("uploading: {file_name} ({percent}%)...")
}

pub fn finished_status(file_name: &str) -> String {
    format!("finished uploading: {file_name}")
}

pub fn failed_status(file_name: &str, reason: &str) -> String {
    format!("failed to upload: {file_name} ({reason})")
}

/// 单会话保护
#[derive(Debug, Clone, Default)]
pub struct UploadGuard {
    busy: Arc<AtomicBool>,
}

/// 持有期间占用上传槽位，释放时自动归还
#[derive(Debug)]
pub struct UploadPermit {
    busy: Arc<AtomicBool>,
}

impl UploadGuard {
    pub fn try_acquire(&self) -> Option<UploadPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| UploadPermit {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for UploadPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// 分块的请求体，每块交给传输层时上报累计字节数
pub(crate) fn progress_body(
    payload: Vec<u8>,
    chunk_size: usize,
    progress: mpsc::UnboundedSender<u64>,
) -> reqwest::Body {
    let chunks: Vec<Vec<u8>> = payload
        .chunks(chunk_size.max(1))
        .map(<[u8]>::to_vec)
        .collect();

    let mut loaded: u64 = 0;
    let stream = futures_util::stream::iter(chunks).map(move |chunk| {
        loaded += chunk.len() as u64;
        let _ = progress.send(loaded);
        Ok::<_, std::io::Error>(chunk)
    });

    reqwest::Body::wrap_stream(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent_truncates() {
        assert_eq!(progress_percent(0, 200), 0);
        assert_eq!(progress_percent(1, 200), 0);
        assert_eq!(progress_percent(199, 200), 99);
        assert_eq!(progress_percent(200, 200), 100);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(0, 0), 100);
        assert_eq!(progress_percent(u64::MAX, u64::MAX), 100);
    }

    #[test]
    fn test_status_texts() {
        assert_eq!(uploading_status("a.txt", 42), "uploading: a.txt (42%)...");
        assert_eq!(finished_status("a.txt"), "finished uploading: a.txt");
        assert_eq!(failed_status("a.txt", "500"), "failed to upload: a.txt (500)");
    }

    #[test]
    fn test_guard_single_permit() {
        let guard = UploadGuard::default();
        let permit = guard.try_acquire().unwrap();
        assert!(guard.is_busy());
        assert!(guard.try_acquire().is_none());

        // 克隆的保护共享同一个槽位
        let cloned = guard.clone();
        assert!(cloned.try_acquire().is_none());

        drop(permit);
        assert!(!guard.is_busy());
        assert!(cloned.try_acquire().is_some());
    }

    #[test]
    fn test_session_phases() {
        let mut session = UploadSession::new(UploadTarget::new("docs", "a.txt"));
        assert_eq!(session.phase(), UploadPhase::Idle);
        assert_eq!(session.file_name(), "a.txt");

        session.advance(UploadPhase::Reading);
        session.advance(UploadPhase::Transferring { percent: 50 });
        assert!(!session.phase().is_terminal());

        session.advance(UploadPhase::Failed { status: Some(500) });
        assert!(session.phase().is_terminal());
    }

    #[test]
    fn test_outcome_json() {
        let json = serde_json::to_string(&UploadOutcome::Rejected { status: 413 }).unwrap();
        assert_eq!(json, r#"{"result":"rejected","status":413}"#);
    }
}
