//! fszrun CLI
//!
//! 命令行传输客户端，通过 HTTP 与 fsz 文件服务器通信

mod view;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fszrun_core::{
    ClientSettings, DeleteOutcome, Location, TransferClient, UploadDialog, UploadOutcome,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use view::TerminalView;

#[derive(Parser)]
#[command(name = "fszrun", version, about = "fsz 文件服务器传输客户端")]
struct Cli {
    /// 服务器地址 (默认读取设置文件)
    #[arg(short, long, global = true)]
    server: Option<String>,
    /// 以 JSON 输出结果
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 上传文件
    Upload {
        /// 要上传的文件
        file: PathBuf,
        /// 当前浏览位置
        #[arg(long, default_value = "/f/")]
        at: String,
        /// 目标目录 (默认由当前位置推导)
        #[arg(short, long)]
        dest: Option<String>,
        /// 上传后的文件名 (默认使用本地文件名)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// 删除文件
    Delete {
        /// 文件名
        name: String,
        /// 当前浏览位置
        #[arg(long, default_value = "/f/")]
        at: String,
    },
    /// 查看或修改设置
    Config {
        /// 保存服务器地址
        #[arg(long)]
        set_server: Option<String>,
        /// 保存上传分块大小 (字节)
        #[arg(long)]
        chunk_size: Option<usize>,
        /// 保存详细日志开关
        #[arg(long)]
        verbose: Option<bool>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut settings = ClientSettings::load();

    init_logging(settings.verbose);

    if let Some(server) = &cli.server {
        settings.server_url = server.clone();
    }

    let success = match cli.command {
        Commands::Upload {
            file,
            at,
            dest,
            name,
        } => upload(&settings, cli.json, file, &at, dest, name).await?,
        Commands::Delete { name, at } => delete(&settings, cli.json, &name, &at).await?,
        Commands::Config {
            set_server,
            chunk_size,
            verbose,
        } => {
            config(settings, set_server, chunk_size, verbose)?;
            true
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// 初始化日志
///
/// 默认只输出警告，设置中打开 verbose 或设置 RUST_LOG 时输出更多
fn init_logging(verbose: bool) {
    let _ = tracing_log::LogTracer::init();

    let default = if verbose {
        "info,fszrun_core=debug"
    } else {
        "warn"
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .try_init();
}

async fn upload(
    settings: &ClientSettings,
    json: bool,
    file: PathBuf,
    at: &str,
    dest: Option<String>,
    name: Option<String>,
) -> Result<bool> {
    let client = TransferClient::from_settings(settings)?;
    let location = Location::new(at);

    let mut dialog = UploadDialog::new();
    dialog.open(&location);
    if let Some(dest) = dest {
        dialog.destination = dest;
    }

    let name = match name {
        Some(name) => name,
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .with_context(|| format!("无法从 {} 获取文件名", file.display()))?,
    };
    let target = dialog.select(&name);

    if !json {
        println!("📤 {} -> {}", file.display(), client.url(&target.path()));
    }

    let view = TerminalView::new();
    let outcome = client.upload(&file, target, &view).await?;

    match &outcome {
        UploadOutcome::Succeeded => {}
        UploadOutcome::Busy => eprintln!("已有上传进行中"),
        UploadOutcome::Rejected { .. } | UploadOutcome::NetworkFailed { .. } => {
            if let Some(error) = view.last_error() {
                dialog.set_error(error);
            }
            eprintln!("   目标目录 '{}' 已保留，可重试", dialog.destination);
        }
    }

    if view.reload_requested() {
        reload(&client, &location, json).await;
    }

    if json {
        print_json(&outcome)?;
    }

    Ok(outcome == UploadOutcome::Succeeded)
}

async fn delete(settings: &ClientSettings, json: bool, name: &str, at: &str) -> Result<bool> {
    let client = TransferClient::from_settings(settings)?;
    let location = Location::new(at);

    if !json {
        println!("🗑️  {}", client.url(&location.delete_path(name)));
    }

    let view = TerminalView::new();
    let outcome = client.delete(&location, name, &view).await;

    if view.reload_requested() {
        reload(&client, &location, json).await;
    }

    if json {
        print_json(&outcome)?;
    }

    Ok(outcome == DeleteOutcome::Deleted)
}

/// 重新获取当前位置
async fn reload(client: &TransferClient, location: &Location, quiet: bool) {
    match client.fetch_view(location).await {
        Ok((status, len)) if !quiet => {
            println!("🔄 已刷新 {} ({}, {} bytes)", location, status, len);
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("刷新 {} 失败: {}", location, e),
    }
}

fn config(
    mut settings: ClientSettings,
    set_server: Option<String>,
    chunk_size: Option<usize>,
    verbose: Option<bool>,
) -> Result<()> {
    let changed = set_server.is_some() || chunk_size.is_some() || verbose.is_some();

    if let Some(server) = set_server {
        // 先校验地址
        TransferClient::new(&server)?;
        settings.server_url = server;
    }
    if let Some(chunk_size) = chunk_size {
        settings.chunk_size = chunk_size.max(1);
    }
    if let Some(verbose) = verbose {
        settings.verbose = verbose;
    }

    if changed {
        settings.save()?;
        println!("✅ 已保存到 {}", ClientSettings::config_path().display());
    }

    println!("服务器: {}", settings.server_url);
    println!("分块大小: {} bytes", settings.chunk_size);
    println!("详细日志: {}", settings.verbose);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_args() {
        let cli = Cli::parse_from([
            "fszrun", "--server", "http://h:1", "upload", "a.txt", "--at", "/f/docs/",
        ]);
        assert_eq!(cli.server.as_deref(), Some("http://h:1"));
        match cli.command {
            Commands::Upload { file, at, dest, .. } => {
                assert_eq!(file, PathBuf::from("a.txt"));
                assert_eq!(at, "/f/docs/");
                assert!(dest.is_none());
            }
            _ => panic!("expected upload"),
        }
    }

    #[test]
    fn test_config_args() {
        let cli = Cli::parse_from([
            "fszrun",
            "config",
            "--set-server",
            "http://10.0.0.2:5000",
            "--chunk-size",
            "4096",
        ]);
        assert!(cli.server.is_none());
        match cli.command {
            Commands::Config {
                set_server,
                chunk_size,
                verbose,
            } => {
                assert_eq!(set_server.as_deref(), Some("http://10.0.0.2:5000"));
                assert_eq!(chunk_size, Some(4096));
                assert!(verbose.is_none());
            }
            _ => panic!("expected config"),
        }
    }

    #[test]
    fn test_delete_defaults_to_root() {
        let cli = Cli::parse_from(["fszrun", "delete", "old.txt", "--json"]);
        assert!(cli.json);
        match cli.command {
            Commands::Delete { name, at } => {
                assert_eq!(name, "old.txt");
                assert_eq!(Location::new(at).delete_path(&name), "/f/old.txt");
            }
            _ => panic!("expected delete"),
        }
    }
}
