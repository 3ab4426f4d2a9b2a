//! 上传对话框状态

use crate::transfer::path::{Location, UploadTarget};

pub const SELECT_LABEL: &str = "Select file...";

/// 点击位置，相对于对话框左上角
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickPoint {
    pub x: f64,
    pub y: f64,
}

/// 对话框渲染后的尺寸
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialogBounds {
    pub width: f64,
    pub height: f64,
}

impl DialogBounds {
    pub fn contains(&self, point: ClickPoint) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadDialog {
    pub open: bool,
    /// 可编辑的目标目录
    pub destination: String,
    pub label: String,
    pub error: String,
}

impl UploadDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 打开对话框，并按当前位置预填目标目录
    pub fn open(&mut self, location: &Location) {
        self.error.clear();
        self.label = SELECT_LABEL.to_string();
        self.destination = location.relative().to_string();
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// 选中文件
    pub fn select(&mut self, file_name: &str) -> UploadTarget {
        self.label = format!("Selected: '{file_name}'");
        UploadTarget::new(self.destination.clone(), file_name)
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = message.into();
    }

    /// 处理点击，框外点击关闭对话框，返回是否关闭
    pub fn handle_click(&mut self, point: ClickPoint, bounds: DialogBounds) -> bool {
        if !self.open || bounds.contains(point) {
            return false;
        }
        self.close();
        true
    }
}
