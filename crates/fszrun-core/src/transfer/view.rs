//! 界面回调
//!
//! 传输流程只通过 `TransferView` 与界面交互：状态文本、内联错误、
//! 阻塞式提示和刷新当前视图。

use tokio::sync::mpsc;

/// 传输界面回调
pub trait TransferView: Send + Sync {
    /// 状态栏更新
    fn on_status(&self, status: &str);
    /// 对话框内联错误
    fn on_error(&self, message: &str);
    /// 阻塞式提示
    fn on_alert(&self, message: &str);
    /// 重新加载当前视图
    fn on_reload(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    Status(String),
    Error(String),
    Alert(String),
    Reload,
}

/// 把回调转发到通道的界面实现
///
/// 通道不设上限：大文件的进度事件再多，也不能挤掉最后的完成、错误和刷新事件。
pub struct ChannelView {
    tx: mpsc::UnboundedSender<TransferEvent>,
}

impl ChannelView {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TransferEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: TransferEvent) {
        // 接收端已关闭时没有人关心事件
        let _ = self.tx.send(event);
    }
}

impl TransferView for ChannelView {
    fn on_status(&self, status: &str) {
        self.send(TransferEvent::Status(status.to_string()));
    }

    fn on_error(&self, message: &str) {
        self.send(TransferEvent::Error(message.to_string()));
    }

    fn on_alert(&self, message: &str) {
        self.send(TransferEvent::Alert(message.to_string()));
    }

    fn on_reload(&self) {
        self.send(TransferEvent::Reload);
    }
}
