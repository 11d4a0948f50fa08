//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，替代各模块中分散的
//! `.map_err(|e| e.to_string())`、`format!(...)` 等不一致模式。
//!
//! 原型实现把"剪贴板暂时拿不到"当作异常在调用链里传播，
//! 这里改为显式的 `ClipboardUnavailable` 变体：
//! 访问层在重试耗尽后返回它，调用方据此分支，而不是依赖异常。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `std::io::Error` / `serde_json::Error` 提供 `From` 转换，无需手动 map。

/// 应用级统一错误类型
///
/// 所有可失败的操作均返回 `Result<T, AppError>`。
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 单次剪贴板操作失败（打开、读取、锁定内存等）
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 重试耗尽后剪贴板仍不可用
    ///
    /// 调用方应视为"当前无数据"，而不是致命错误。
    #[error("重试 {attempts} 次后仍无法访问剪贴板")]
    ClipboardUnavailable {
        /// 已尝试的次数
        attempts: u32,
    },

    /// 文件系统 I/O 错误（日志落盘、文件大小统计）
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化/反序列化错误
    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// 是否为"剪贴板暂时不可用"（可恢复，按无数据处理）
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AppError::ClipboardUnavailable { .. })
    }
}
