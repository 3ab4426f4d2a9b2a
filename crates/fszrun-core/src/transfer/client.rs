//! HTTP 传输客户端
//!
//! - `POST /f/<目标目录>/<文件名>`：Base64 + NUL 结束标记的上传载荷，带进度
//! - `DELETE <当前路径>/<文件名>`：删除文件
//!
//! 请求不设置超时，也没有取消操作。

use log::{debug, info, warn};

use crate::config::ClientSettings;
use crate::transfer::TransferError;
use crate::transfer::codec::encode_payload;
use crate::transfer::delete::DeleteOutcome;
use crate::transfer::path::{Location, UploadTarget};
use crate::transfer::upload::{
    UploadGuard, UploadOutcome, UploadPhase, UploadSession, failed_status, finished_status,
    progress_body, progress_percent, uploading_status,
};
use crate::transfer::view::TransferView;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::path::Path;
use tokio::sync::mpsc;

/// 默认分块大小
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// 文件服务器客户端
///
/// 克隆出的客户端共享同一个上传槽位。
#[derive(Debug, Clone)]
pub struct TransferClient {
    http: reqwest::Client,
    server: String,
    chunk_size: usize,
    guard: UploadGuard,
}

impl TransferClient {
    pub fn new(server_url: &str) -> Result<Self, TransferError> {
        let url = reqwest::Url::parse(server_url).map_err(|e| TransferError::InvalidServer {
            url: server_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransferError::InvalidServer {
                url: server_url.to_string(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        Ok(Self {
            http: reqwest::Client::builder().build()?,
            server: server_url.trim_end_matches('/').to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            guard: UploadGuard::default(),
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, TransferError> {
        Ok(Self::new(&settings.server_url)?.with_chunk_size(settings.chunk_size))
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// 完整请求地址
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server, path)
    }

    /// 是否有上传进行中
    pub fn is_uploading(&self) -> bool {
        self.guard.is_busy()
    }

    /// 读取本地文件并上传
    ///
    /// 已有上传进行中时直接返回 `Busy`，不会发出请求。
    pub async fn upload<V: TransferView + ?Sized>(
        &self,
        file: &Path,
        target: UploadTarget,
        view: &V,
    ) -> Result<UploadOutcome, TransferError> {
        let Some(_permit) = self.guard.try_acquire() else {
            debug!("Upload of {} ignored: another upload is in flight", target.file_name);
            return Ok(UploadOutcome::Busy);
        };

        let mut session = UploadSession::new(target);
        session.advance(UploadPhase::Reading);
        let data = match tokio::fs::read(file).await {
            Ok(data) => data,
            Err(source) => {
                warn!("Failed to read {}: {}", file.display(), source);
                session.advance(UploadPhase::Failed { status: None });
                view.on_status(&failed_status(session.file_name(), "read error"));
                view.on_error(&format!("could not read {}: {source}", file.display()));
                return Err(TransferError::Read {
                    path: file.to_path_buf(),
                    source,
                });
            }
        };

        Ok(self.transfer(session, data, view).await)
    }

    /// 上传内存中的数据
    pub async fn upload_bytes<V: TransferView + ?Sized>(
        &self,
        data: Vec<u8>,
        target: UploadTarget,
        view: &V,
    ) -> UploadOutcome {
        let Some(_permit) = self.guard.try_acquire() else {
            debug!("Upload of {} ignored: another upload is in flight", target.file_name);
            return UploadOutcome::Busy;
        };

        self.transfer(UploadSession::new(target), data, view).await
    }

    async fn transfer<V: TransferView + ?Sized>(
        &self,
        mut session: UploadSession,
        data: Vec<u8>,
        view: &V,
    ) -> UploadOutcome {
        session.size = data.len() as u64;

        session.advance(UploadPhase::Encoding);
        let payload = encode_payload(&data);
        drop(data);

        let total = payload.len() as u64;
        let url = self.url(&session.target.path());
        info!(
            "Uploading {} ({} bytes, {} encoded) to {}",
            session.file_name(),
            session.size,
            total,
            url
        );

        session.advance(UploadPhase::Transferring { percent: 0 });
        view.on_status(&uploading_status(session.file_name(), 0));

        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        let request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "text/plain")
            .header(CONTENT_LENGTH, total)
            .body(progress_body(payload, self.chunk_size, progress_tx))
            .send();
        tokio::pin!(request);

        let mut last_percent = 0;
        let mut report = |session: &mut UploadSession, loaded: u64| {
            let percent = progress_percent(loaded, total);
            if percent != last_percent {
                last_percent = percent;
                session.advance(UploadPhase::Transferring { percent });
                view.on_status(&uploading_status(session.file_name(), percent));
            }
        };

        // 进度事件总是先于最终结果处理
        let result = loop {
            tokio::select! {
                biased;
                Some(loaded) = progress_rx.recv() => report(&mut session, loaded),
                result = &mut request => break result,
            }
        };
        while let Ok(loaded) = progress_rx.try_recv() {
            report(&mut session, loaded);
        }

        let file_name = session.file_name().to_string();
        match result {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                info!("Uploaded {}", file_name);
                session.advance(UploadPhase::Succeeded);
                view.on_status(&finished_status(&file_name));
                view.on_reload();
                UploadOutcome::Succeeded
            }
            Ok(response) => {
                let status = response.status().as_u16();
                warn!("Upload of {} rejected with status {}", file_name, status);
                session.advance(UploadPhase::Failed {
                    status: Some(status),
                });
                view.on_status(&failed_status(&file_name, &status.to_string()));
                view.on_error(&format!("upload failed ({status})"));
                UploadOutcome::Rejected { status }
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", file_name, e);
                session.advance(UploadPhase::Failed { status: None });
                view.on_status(&failed_status(&file_name, "network error"));
                view.on_error(&format!("upload failed: {e}"));
                UploadOutcome::NetworkFailed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// 删除当前位置下的文件
    pub async fn delete<V: TransferView + ?Sized>(
        &self,
        location: &Location,
        file_name: &str,
        view: &V,
    ) -> DeleteOutcome {
        let url = self.url(&location.delete_path(file_name));
        info!("Deleting {}", url);

        let outcome = match self.http.delete(&url).send().await {
            Ok(response) => DeleteOutcome::from_status(response.status().as_u16()),
            Err(e) => DeleteOutcome::NetworkFailed {
                reason: e.to_string(),
            },
        };

        match outcome.message() {
            None => view.on_reload(),
            Some(message) => {
                warn!("Delete of {} failed: {:?}", file_name, outcome);
                view.on_alert(&message);
            }
        }

        outcome
    }

    /// 重新获取当前视图，返回状态码和正文长度
    pub async fn fetch_view(&self, location: &Location) -> Result<(u16, usize), TransferError> {
        let response = self.http.get(self.url(location.as_str())).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok((status, body.len()))
    }
}
