//! 剪贴板格式注册表
//!
//! # 设计思路
//!
//! 格式 ID → 可读名称的纯查询表，三级回退：
//! 1. 17 个标准格式的固定表（CF_TEXT..CF_DIBV5）
//! 2. Windows 下查询系统注册名（`GetClipboardFormatNameW`）
//! 3. 兜底合成 `Unknown(<id>)` 标签
//!
//! 无副作用，无失败路径：查询失败一律吞掉并落到兜底标签。
//!
//! # 实现思路
//!
//! - 固定表用 `once_cell::sync::Lazy` 构建一次。
//! - 跨平台代码（分发表、测试）需要格式 ID 常量，而 `windows` crate
//!   只在 Windows 目标上可用，故在此定义与 Win32 `CF_*` 同值的 `u32` 常量。
//! - "HTML Format" 不是预定义格式，ID 需在运行时向系统注册后获得。

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// CF_TEXT：ANSI 文本
pub const CF_TEXT: u32 = 1;
/// CF_BITMAP：位图句柄
pub const CF_BITMAP: u32 = 2;
/// CF_DIB：设备无关位图
pub const CF_DIB: u32 = 8;
/// CF_UNICODETEXT：UTF-16 文本
pub const CF_UNICODETEXT: u32 = 13;
/// CF_HDROP：文件拖放列表
pub const CF_HDROP: u32 = 15;

/// 17 个标准剪贴板格式的固定名称表
static STANDARD_FORMATS: Lazy<HashMap<u32, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (1, "CF_TEXT"),
        (2, "CF_BITMAP"),
        (3, "CF_METAFILEPICT"),
        (4, "CF_SYLK"),
        (5, "CF_DIF"),
        (6, "CF_TIFF"),
        (7, "CF_OEMTEXT"),
        (8, "CF_DIB"),
        (9, "CF_PALETTE"),
        (10, "CF_PENDATA"),
        (11, "CF_RIFF"),
        (12, "CF_WAVE"),
        (13, "CF_UNICODETEXT"),
        (14, "CF_ENHMETAFILE"),
        (15, "CF_HDROP"),
        (16, "CF_LOCALE"),
        (17, "CF_DIBV5"),
    ])
});

/// 查询格式的可读名称
///
/// 标准表 → 系统注册名 → `Unknown(<id>)`，保证总能返回。
pub fn format_name(format_id: u32) -> String {
    if let Some(name) = STANDARD_FORMATS.get(&format_id) {
        return (*name).to_string();
    }
    if let Some(name) = registered_format_name(format_id) {
        return name;
    }
    format!("Unknown({})", format_id)
}

/// 查询系统注册的自定义格式名（Windows 专用）
#[cfg(target_os = "windows")]
fn registered_format_name(format_id: u32) -> Option<String> {
    use windows::Win32::System::DataExchange::GetClipboardFormatNameW;

    let mut buf = [0u16; 256];
    let len = unsafe { GetClipboardFormatNameW(format_id, &mut buf) };
    if len <= 0 {
        return None;
    }
    Some(String::from_utf16_lossy(&buf[..len as usize]))
}

/// 非 Windows 平台的占位实现：没有系统注册表可查
#[cfg(not(target_os = "windows"))]
fn registered_format_name(_format_id: u32) -> Option<String> {
    None
}

/// 解析 "HTML Format" 的注册格式 ID（Windows 专用）
///
/// `RegisterClipboardFormatW` 对已注册的名称返回既有 ID，
/// 因此重复调用是幂等的。失败返回 `None`。
#[cfg(target_os = "windows")]
pub fn html_format_id() -> Option<u32> {
    use windows::Win32::System::DataExchange::RegisterClipboardFormatW;
    use windows::core::w;

    let id = unsafe { RegisterClipboardFormatW(w!("HTML Format")) };
    if id == 0 { None } else { Some(id) }
}

/// 非 Windows 平台的占位实现
#[cfg(not(target_os = "windows"))]
pub fn html_format_id() -> Option<u32> {
    None
}
