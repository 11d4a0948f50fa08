//! 剪贴板原始数据读取
//!
//! # 设计思路
//!
//! 提供按格式读取剪贴板数据的底层函数。所有函数都假定剪贴板
//! **已经处于打开状态**，即只能在 [`super::with_clipboard`] 的
//! 闭包内部调用；打开/关闭与重试由访问层统一负责。
//!
//! # 实现思路
//!
//! - 通用路径：`GetClipboardData` → `GlobalLock` → 按 `GlobalSize`
//!   拷贝 → `GlobalUnlock`，拷贝后立即解锁，不让裸指针逃逸。
//! - 文本格式在字节层面截断到第一个 NUL，再做有损解码，
//!   非法序列替换而不是报错。
//! - CF_HDROP 用 `DragQueryFileW` 两段式读取（先取长度再取内容）。

use crate::error::AppError;
use crate::formats;

/// 枚举当前剪贴板上的全部格式 ID（按系统给出的顺序）
#[cfg(target_os = "windows")]
pub fn enum_format_ids() -> Vec<u32> {
    use windows::Win32::System::DataExchange::EnumClipboardFormats;

    let mut ids = Vec::new();
    let mut fmt = unsafe { EnumClipboardFormats(0) };
    while fmt != 0 {
        ids.push(fmt);
        fmt = unsafe { EnumClipboardFormats(fmt) };
    }
    ids
}

/// 非 Windows 平台的占位实现
#[cfg(not(target_os = "windows"))]
pub fn enum_format_ids() -> Vec<u32> {
    Vec::new()
}

/// 读取指定格式的原始字节
///
/// 仅对全局内存句柄承载的格式有效（文本、HTML、自定义格式等）；
/// CF_BITMAP 这类 GDI 句柄格式不要经过此函数。
#[cfg(target_os = "windows")]
pub fn read_raw_bytes(format_id: u32) -> Result<Vec<u8>, AppError> {
    use windows::Win32::Foundation::HGLOBAL;
    use windows::Win32::System::DataExchange::GetClipboardData;
    use windows::Win32::System::Memory::{GlobalLock, GlobalSize, GlobalUnlock};

    unsafe {
        let handle = GetClipboardData(format_id)
            .map_err(|e| AppError::Clipboard(format!("读取格式 {} 失败：{:?}", format_id, e)))?;
        let hglobal = HGLOBAL(handle.0);

        let ptr = GlobalLock(hglobal) as *const u8;
        if ptr.is_null() {
            return Err(AppError::Clipboard(format!("锁定格式 {} 的内存失败", format_id)));
        }

        let size = GlobalSize(hglobal);
        let bytes = std::slice::from_raw_parts(ptr, size).to_vec();
        let _ = GlobalUnlock(hglobal);
        Ok(bytes)
    }
}

/// 非 Windows 平台的占位实现
#[cfg(not(target_os = "windows"))]
pub fn read_raw_bytes(_format_id: u32) -> Result<Vec<u8>, AppError> {
    Err(AppError::Clipboard("剪贴板访问仅在 Windows 上支持".to_string()))
}

/// 读取 CF_TEXT（ANSI 文本），NUL 截断后有损解码
pub fn read_text() -> Result<String, AppError> {
    let mut bytes = read_raw_bytes(formats::CF_TEXT)?;
    if let Some(pos) = bytes.iter().position(|&b| b == 0) {
        bytes.truncate(pos);
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// 读取 CF_UNICODETEXT（UTF-16LE 文本），NUL 截断后有损解码
pub fn read_unicode_text() -> Result<String, AppError> {
    let bytes = read_raw_bytes(formats::CF_UNICODETEXT)?;
    let mut units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    if let Some(pos) = units.iter().position(|&u| u == 0) {
        units.truncate(pos);
    }
    Ok(String::from_utf16_lossy(&units))
}

/// 读取 CF_HDROP 文件列表
#[cfg(target_os = "windows")]
pub fn read_file_list() -> Result<Vec<String>, AppError> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use windows::Win32::System::DataExchange::GetClipboardData;
    use windows::Win32::UI::Shell::{DragQueryFileW, HDROP};

    unsafe {
        let handle = GetClipboardData(formats::CF_HDROP)
            .map_err(|e| AppError::Clipboard(format!("读取 CF_HDROP 失败：{:?}", e)))?;
        let hdrop = HDROP(handle.0);

        let count = DragQueryFileW(hdrop, 0xFFFFFFFF, None);
        let mut files = Vec::with_capacity(count as usize);
        for i in 0..count {
            let len = DragQueryFileW(hdrop, i, None);
            if len == 0 {
                continue;
            }

            let mut buf = vec![0u16; (len + 1) as usize];
            DragQueryFileW(hdrop, i, Some(&mut buf));
            if let Some(pos) = buf.iter().position(|&c| c == 0) {
                buf.truncate(pos);
            }

            files.push(OsString::from_wide(&buf).to_string_lossy().into_owned());
        }
        Ok(files)
    }
}

/// 非 Windows 平台的占位实现
#[cfg(not(target_os = "windows"))]
pub fn read_file_list() -> Result<Vec<String>, AppError> {
    Err(AppError::Clipboard("剪贴板访问仅在 Windows 上支持".to_string()))
}
