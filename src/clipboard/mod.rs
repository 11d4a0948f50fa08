//! 剪贴板访问模块
//!
//! # 设计思路
//!
//! 统一管理对系统剪贴板的所有访问：
//! - **重试守卫**：`with_clipboard` 将"打开 → 操作 → 关闭"包成一个
//!   带上限重试的原子动作。剪贴板是系统级互斥资源，别的进程
//!   （包括资源管理器）随时可能占用，打开失败是常态而非异常。
//! - **RAII Guard**：`ClipboardGuard` 在构造时打开剪贴板，`Drop` 时
//!   关闭，保证任何退出路径（包括 panic）都会释放资源。
//! - **原子操作最小化**：持有剪贴板期间只做必要的读取，立即释放。
//!
//! # 实现思路
//!
//! - 重试引擎 `retry` 与剪贴板解耦，便于单测"失败两次、第三次成功"
//!   这类策略属性。
//! - 每次失败以 warning 记录，耗尽后以 error 记录并返回
//!   `AppError::ClipboardUnavailable`，调用方按"当前无数据"处理。
//! - 重试间隔固定 200ms（等待占用方释放），不做指数退避。
//! - 原始读取归 `reader`，属主进程解析归 `owner`。

pub mod owner;
pub mod reader;

use std::time::Duration;

use crate::error::AppError;

/// 最大尝试次数
pub const MAX_ATTEMPTS: u32 = 3;
/// 两次尝试之间的固定等待
pub const RETRY_DELAY: Duration = Duration::from_millis(200);

/// 带上限重试地执行一个可失败操作
///
/// 每次失败记 warning 并等待 [`RETRY_DELAY`]；连续失败
/// [`MAX_ATTEMPTS`] 次后记 error 并返回
/// [`AppError::ClipboardUnavailable`]。
pub fn retry<T>(mut op: impl FnMut() -> Result<T, AppError>) -> Result<T, AppError> {
    for attempt in 1..=MAX_ATTEMPTS {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) => {
                log::warn!("剪贴板访问失败（第 {}/{} 次）：{}", attempt, MAX_ATTEMPTS, e);
                if attempt < MAX_ATTEMPTS {
                    std::thread::sleep(RETRY_DELAY);
                }
            }
        }
    }
    log::error!("连续 {} 次尝试后仍无法访问剪贴板，放弃本次操作", MAX_ATTEMPTS);
    Err(AppError::ClipboardUnavailable {
        attempts: MAX_ATTEMPTS,
    })
}

/// 在持有剪贴板的前提下执行 `op`，带重试
///
/// 打开失败与 `op` 自身的失败都会触发重试；成功则返回 `op` 的结果。
/// 剪贴板在每次尝试结束时都保证被关闭。
#[cfg(target_os = "windows")]
pub fn with_clipboard<T>(mut op: impl FnMut() -> Result<T, AppError>) -> Result<T, AppError> {
    retry(|| {
        let _guard = ClipboardGuard::acquire()?;
        op()
    })
}

/// 非 Windows 平台的占位实现：直接报不可用，不做无意义的重试等待
#[cfg(not(target_os = "windows"))]
pub fn with_clipboard<T>(_op: impl FnMut() -> Result<T, AppError>) -> Result<T, AppError> {
    Err(AppError::ClipboardUnavailable {
        attempts: MAX_ATTEMPTS,
    })
}

/// 读取剪贴板变更序列号
///
/// 系统在剪贴板内容每次变化时递增该计数器，
/// 轮询它即可检测新的复制事件，无需读取内容本身。
#[cfg(target_os = "windows")]
pub fn sequence_number() -> u32 {
    use windows::Win32::System::DataExchange::GetClipboardSequenceNumber;

    unsafe { GetClipboardSequenceNumber() }
}

/// 非 Windows 平台的占位实现：恒为 0，轮询循环不会触发捕获
#[cfg(not(target_os = "windows"))]
pub fn sequence_number() -> u32 {
    0
}

/// 剪贴板持有权的 RAII 守卫
///
/// 构造时打开剪贴板，`Drop` 时关闭。剪贴板是系统级互斥资源，
/// 持有期间其他进程无法写入，因此守卫的生命周期应尽可能短。
#[cfg(target_os = "windows")]
struct ClipboardGuard;

#[cfg(target_os = "windows")]
impl ClipboardGuard {
    /// 尝试打开剪贴板并取得守卫
    fn acquire() -> Result<Self, AppError> {
        use windows::Win32::System::DataExchange::OpenClipboard;

        unsafe { OpenClipboard(None) }
            .map_err(|e| AppError::Clipboard(format!("打开剪贴板失败：{:?}", e)))?;
        Ok(Self)
    }
}

#[cfg(target_os = "windows")]
impl Drop for ClipboardGuard {
    fn drop(&mut self) {
        use windows::Win32::System::DataExchange::CloseClipboard;

        unsafe {
            let _ = CloseClipboard();
        }
    }
}
