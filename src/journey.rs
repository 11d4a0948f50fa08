//! 剪贴板旅程追踪器
//!
//! # 设计思路
//!
//! 顶层轮询循环：每 ~100ms 读一次系统的剪贴板变更序列号，
//! 与水位线不同且距上次捕获已超过 3 秒去抖窗口时，捕获一个
//! 完整的事件快照（时间戳、属主进程、全部格式及大小/预览），
//! 追加到会话内存日志并打印；Ctrl-C 时把日志整体落盘为
//! `clipboard_journey_<unix_timestamp>.json`。
//!
//! 脱敏策略与解析器保持一致：文本/HTML 的预览一律替换为固定
//! 脱敏标记，文件路径按元数据保留，其余格式只显示占位预览。
//!
//! # 实现思路
//!
//! - 水位线与事件日志是追踪器实例字段，不用全局可变状态。
//! - 捕获判定 `decide_tick` 是纯函数，去抖属性可直接单测。
//! - 单逻辑线程：在 current-thread 运行时里用 `tokio::select!`
//!   同时等待轮询间隔与 Ctrl-C，循环本身没有并发。
//! - 捕获过程中每一步都自行降级（属主查不到给占位值、单个格式
//!   读不到给占位预览、整体枚举失败给空列表），一次坏数据
//!   不会中断循环。

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::clipboard::owner::{self, OwnerProcess};
use crate::clipboard::{self, reader};
use crate::error::AppError;
use crate::formats;
use crate::parser::{self, REDACTION_MARKER};

/// 轮询间隔
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// 去抖窗口：两次捕获之间的最小间隔
pub const DEBOUNCE_WINDOW: Duration = Duration::from_secs(3);

/// 单个格式在一次快照中的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatRecord {
    pub id: u32,
    pub name: String,
    pub data_size: u64,
    pub data_preview: String,
    /// 历史遗留的占位字段，始终为空
    pub memory_handle: Option<u64>,
}

/// 一次检测到的剪贴板变化事件，创建后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardEvent {
    pub timestamp: DateTime<Local>,
    pub sequence_number: u32,
    pub owner_process: OwnerProcess,
    pub formats: Vec<FormatRecord>,
    pub format_count: usize,
    pub total_data_size: u64,
}

/// 一次轮询 tick 的判定结果
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum TickDecision {
    /// 序列号未变化
    Unchanged,
    /// 有变化但仍在去抖窗口内，水位线不动
    Debounced,
    /// 捕获一个事件快照
    Capture,
}

/// 捕获判定：序列号变化 且 距上次捕获超过去抖窗口
pub(crate) fn decide_tick(
    current_sequence: u32,
    watermark: u32,
    elapsed_since_capture: Option<Duration>,
    debounce: Duration,
) -> TickDecision {
    if current_sequence == watermark {
        return TickDecision::Unchanged;
    }
    match elapsed_since_capture {
        Some(elapsed) if elapsed < debounce => TickDecision::Debounced,
        _ => TickDecision::Capture,
    }
}

/// 剪贴板旅程追踪器
///
/// 持有水位线、去抖时钟与会话内存日志；整个生命周期内
/// 只被轮询循环这一个逻辑线程访问。
pub struct JourneyTracker {
    last_sequence: u32,
    last_event_time: Option<Instant>,
    journey_log: Vec<ClipboardEvent>,
    html_format_id: Option<u32>,
}

impl JourneyTracker {
    pub fn new() -> Self {
        println!("🔒 隐私提示：本工具会在终端显示剪贴板的格式元数据，内容字段已脱敏。");
        println!("   请勿在运行期间复制密码等机密信息。\n");
        Self {
            last_sequence: 0,
            last_event_time: None,
            journey_log: Vec::new(),
            html_format_id: formats::html_format_id(),
        }
    }

    /// 会话中已捕获的事件
    pub fn events(&self) -> &[ClipboardEvent] {
        &self.journey_log
    }

    /// 运行轮询循环直到 Ctrl-C，然后把日志落盘
    pub async fn run(&mut self) -> Result<PathBuf, AppError> {
        println!("🔍 剪贴板旅程追踪已启动");
        println!("{}", "=".repeat(60));

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            self.tick();
            tokio::select! {
                _ = &mut ctrl_c => {
                    println!("\n⏹ 追踪已停止（用户中断）");
                    break;
                }
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
            }
        }

        let path = self.save_log()?;
        println!("💾 旅程日志已保存到 {}", path.display());
        Ok(path)
    }

    /// 单次轮询：读序列号、判定、必要时捕获
    ///
    /// 所有子操作都自行降级，tick 本身不会失败。
    fn tick(&mut self) {
        let current = clipboard::sequence_number();
        let elapsed = self.last_event_time.map(|t| t.elapsed());
        match decide_tick(current, self.last_sequence, elapsed, DEBOUNCE_WINDOW) {
            TickDecision::Unchanged => {}
            TickDecision::Debounced => {
                log::debug!(
                    "去抖窗口内的变化（序列号 {} → {}），暂不捕获",
                    self.last_sequence,
                    current
                );
            }
            TickDecision::Capture => {
                let event = self.capture_event();
                display_event(&event);
                self.last_sequence = event.sequence_number;
                self.last_event_time = Some(Instant::now());
                self.journey_log.push(event);
            }
        }
    }

    /// 捕获一个完整的事件快照
    fn capture_event(&self) -> ClipboardEvent {
        let formats = enumerate_formats(self.html_format_id);
        let total_data_size = formats.iter().map(|f| f.data_size).sum();
        ClipboardEvent {
            timestamp: Local::now(),
            // 捕获时重新取一次序列号，水位线随之更新到快照时刻
            sequence_number: clipboard::sequence_number(),
            owner_process: owner::clipboard_owner(),
            format_count: formats.len(),
            total_data_size,
            formats,
        }
    }

    /// 把会话日志落盘为带时间戳的 JSON 文件
    pub fn save_log(&self) -> Result<PathBuf, AppError> {
        let filename = format!("clipboard_journey_{}.json", chrono::Utc::now().timestamp());
        let path = PathBuf::from(filename);
        write_journey_log(&self.journey_log, &path)?;
        log::info!("已写入 {} 条事件到 {}", self.journey_log.len(), path.display());
        Ok(path)
    }
}

impl Default for JourneyTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// 把事件列表整体序列化到 `path`（pretty JSON）
pub fn write_journey_log(events: &[ClipboardEvent], path: &Path) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(events)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// 在一次剪贴板持有期内枚举全部格式并生成记录
///
/// 整体枚举失败（重试耗尽）降级为空列表，捕获照常进行。
fn enumerate_formats(html_format_id: Option<u32>) -> Vec<FormatRecord> {
    match clipboard::with_clipboard(|| Ok(collect_format_records(html_format_id))) {
        Ok(records) => records,
        Err(e) => {
            log::warn!("枚举剪贴板格式失败，本次事件不含格式明细：{}", e);
            Vec::new()
        }
    }
}

/// 须在剪贴板打开期间调用：逐格式读取大小与脱敏预览
fn collect_format_records(html_format_id: Option<u32>) -> Vec<FormatRecord> {
    reader::enum_format_ids()
        .into_iter()
        .map(|id| summarize_one_format(id, html_format_id))
        .collect()
}

/// 单个格式的最佳努力摘要；读取失败降级为占位预览
fn summarize_one_format(id: u32, html_format_id: Option<u32>) -> FormatRecord {
    let name = formats::format_name(id);
    let result = match parser::classify(id, html_format_id) {
        parser::FormatKind::Text => reader::read_text().map(|t| text_record(id, &name, &t, false)),
        parser::FormatKind::UnicodeText => {
            reader::read_unicode_text().map(|t| text_record(id, &name, &t, true))
        }
        parser::FormatKind::FileList => {
            reader::read_file_list().map(|files| file_list_record(id, &name, &files))
        }
        parser::FormatKind::Html => {
            reader::read_raw_bytes(id).map(|bytes| html_record(id, &name, bytes.len()))
        }
        _ => Ok(opaque_record(id, &name)),
    };

    result.unwrap_or_else(|e| {
        log::error!("读取格式 {}（{}）失败：{}", id, name, e);
        FormatRecord {
            id,
            name,
            data_size: 0,
            data_preview: "<Unable to read>".to_string(),
            memory_handle: None,
        }
    })
}

/// 文本格式记录：大小按编码折算，预览一律脱敏
fn text_record(id: u32, name: &str, text: &str, wide: bool) -> FormatRecord {
    let data_size = if wide {
        (text.encode_utf16().count() * 2) as u64
    } else {
        text.len() as u64
    };
    FormatRecord {
        id,
        name: name.to_string(),
        data_size,
        data_preview: REDACTION_MARKER.to_string(),
        memory_handle: None,
    }
}

/// 文件列表记录：路径是元数据，保留在预览里
fn file_list_record(id: u32, name: &str, files: &[String]) -> FormatRecord {
    let joined = files.join("; ");
    FormatRecord {
        id,
        name: name.to_string(),
        data_size: joined.len() as u64,
        data_preview: format!("Files: {}", joined),
        memory_handle: None,
    }
}

/// HTML 记录：只记字节大小，预览脱敏
fn html_record(id: u32, name: &str, raw_size: usize) -> FormatRecord {
    FormatRecord {
        id,
        name: name.to_string(),
        data_size: raw_size as u64,
        data_preview: REDACTION_MARKER.to_string(),
        memory_handle: None,
    }
}

/// 其他格式：不读取数据，只给占位预览
fn opaque_record(id: u32, name: &str) -> FormatRecord {
    FormatRecord {
        id,
        name: name.to_string(),
        data_size: 0,
        data_preview: format!("<{} data>", name),
        memory_handle: None,
    }
}

/// 控制台展示一条事件
fn display_event(event: &ClipboardEvent) {
    println!("\n📝 剪贴板事件");
    println!("⏰ 时间: {}", event.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"));
    println!("🔢 序列号: {}", event.sequence_number);
    println!(
        "🔑 属主: {} (PID: {})",
        event.owner_process.name, event.owner_process.pid
    );
    println!("📑 窗口: {}", event.owner_process.window_title);
    println!(
        "📒 格式: {} 个，共 {} 字节",
        event.format_count, event.total_data_size
    );
    for (i, fmt) in event.formats.iter().enumerate() {
        println!("  {}. {} (ID: {})", i + 1, fmt.name, fmt.id);
        println!("     大小: {} 字节", fmt.data_size);
        println!("     预览: {}", fmt.data_preview);
    }
    println!("{}", "=".repeat(60));
}
