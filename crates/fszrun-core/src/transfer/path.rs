//! 请求路径
//!
//! 路径段之间用字面量 `/` 连接。连接处不会出现重复的分隔符，
//! 但段内部的内容原样保留（不做 `//` 归一化）。

/// 文件服务器的浏览/上传路由前缀
pub const FILE_ROUTE: &str = "/f";

/// 连接路径段
///
/// 每个段去掉首尾的 `/`，空段跳过，结果总是以 `/` 开头。
/// 最后一个非空段原本以 `/` 结尾时保留结尾的 `/`。
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    let parts: Vec<&str> = segments
        .iter()
        .map(|s| s.as_ref().trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect();

    let mut path = format!("/{}", parts.join("/"));

    let trailing = segments
        .iter()
        .rev()
        .map(|s| s.as_ref())
        .find(|s| !s.trim_matches('/').is_empty())
        .is_some_and(|s| s.ends_with('/'));
    if trailing && path.len() > 1 {
        path.push('/');
    }

    path
}

/// 当前浏览位置，例如 `/f/docs/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self { path }
    }

    /// 服务器根目录
    pub fn root() -> Self {
        Self::new(format!("{FILE_ROUTE}/"))
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// 路由前缀之下的目录，用于预填上传对话框
    ///
    /// `/f/docs/` -> `docs`
    pub fn relative(&self) -> &str {
        self.path
            .strip_prefix(FILE_ROUTE)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .unwrap_or(self.path.as_str())
            .trim_matches('/')
    }

    /// `DELETE` 的目标路径：`<当前路径>/<文件名>`
    pub fn delete_path(&self, file_name: &str) -> String {
        join_path(&[self.path.as_str(), file_name])
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

/// 上传目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    /// 对话框中的目标目录（路由前缀之下）
    pub destination: String,
    pub file_name: String,
}

impl UploadTarget {
    pub fn new(destination: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            file_name: file_name.into(),
        }
    }

    /// `POST` 的目标路径
    pub fn path(&self) -> String {
        upload_path(&self.destination, &self.file_name)
    }
}

/// 上传路径：`/f/<目标目录>/<文件名>`
pub fn upload_path(destination: &str, file_name: &str) -> String {
    join_path(&[FILE_ROUTE, destination, file_name])
}
