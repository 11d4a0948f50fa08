//! # 剪贴板旅程诊断工具 — 应用入口
//!
//! 仅负责日志初始化、命令行解析与模式分发，
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use clap::Parser;

use clipboard_journey::clipboard::{self, reader};
use clipboard_journey::error::AppError;
use clipboard_journey::journey::JourneyTracker;
use clipboard_journey::parser::ClipboardFormatParser;

/// 运行模式
#[derive(Debug, Clone, clap::ValueEnum)]
enum Mode {
    /// 轮询追踪剪贴板变化，Ctrl-C 时保存会话日志
    Journey,
    /// 对当前剪贴板上的格式做一次脱敏解析并打印
    Parse,
}

#[derive(Debug, Parser)]
#[command(
    name = "clipboard-journey",
    about = "剪贴板诊断工具：追踪变化事件，枚举并脱敏解析格式"
)]
struct Args {
    /// 运行模式
    #[arg(long, value_enum, default_value = "journey")]
    mode: Mode,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    clipboard_journey::logging::init();

    let args = Args::parse();
    match args.mode {
        Mode::Journey => {
            let mut tracker = JourneyTracker::new();
            tracker.run().await?;
        }
        Mode::Parse => {
            run_parse_once()?;
        }
    }
    Ok(())
}

/// parse 模式：对当前剪贴板做一次快照解析
///
/// 枚举当前存在的格式，逐个产出脱敏记录并以 JSON 打印。
fn run_parse_once() -> Result<(), AppError> {
    let parser = ClipboardFormatParser::new();

    let format_ids = match clipboard::with_clipboard(|| Ok(reader::enum_format_ids())) {
        Ok(ids) => ids,
        Err(e) => {
            log::warn!("无法枚举剪贴板格式：{}", e);
            Vec::new()
        }
    };

    if format_ids.is_empty() {
        println!("剪贴板上当前没有可解析的格式。");
        return Ok(());
    }

    for id in format_ids {
        let record = parser.parse_format(id);
        println!("{}", serde_json::to_string_pretty(&record)?);
    }
    Ok(())
}
