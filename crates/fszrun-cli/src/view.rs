//! 终端界面 - 把传输回调输出到终端

use fszrun_core::TransferView;
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
pub struct TerminalView {
    reload: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// 传输流程是否请求刷新当前视图
    pub fn reload_requested(&self) -> bool {
        self.reload.load(Ordering::Acquire)
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|e| e.clone())
    }
}

impl TransferView for TerminalView {
    fn on_status(&self, status: &str) {
        let mut stderr = std::io::stderr().lock();
        // 进度行原地刷新
        if status.starts_with("uploading:") {
            let _ = write!(stderr, "\r\x1b[2K⏳ {status}");
        } else {
            let _ = writeln!(stderr, "\r\x1b[2K{status}");
        }
        let _ = stderr.flush();
    }

    fn on_error(&self, message: &str) {
        eprintln!("❌ {message}");
        if let Ok(mut last) = self.last_error.lock() {
            *last = Some(message.to_string());
        }
    }

    fn on_alert(&self, message: &str) {
        eprintln!("⚠️  {message}");
    }

    fn on_reload(&self) {
        self.reload.store(true, Ordering::Release);
    }
}
