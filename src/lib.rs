//! # 剪贴板旅程诊断工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    main (clap CLI)                   │
//! │            --mode journey │ --mode parse             │
//! └───────────────┬──────────────────────┬───────────────┘
//!                 ↓                      ↓
//! ┌─ journey ──────────────┐  ┌─ parser ────────────────┐
//! │ 轮询序列号 + 去抖        │  │ 格式 ID → 摘要器分发      │
//! │ 事件快照 + JSON 落盘     │  │ 脱敏记录（ParsedFormat） │
//! └───────┬────────────────┘  └──────────┬──────────────┘
//!         ↓                              ↓
//! ┌─ clipboard ─────────────────────────────────────────┐
//! │ with_clipboard 重试守卫 + RAII Guard                 │
//! │ reader 原始读取 │ owner 属主进程解析                  │
//! └───────┬─────────────────────────────────────────────┘
//!         ↓
//! ┌─ formats ──────────────┐  ┌─ error ─────────────────┐
//! │ 格式 ID → 名称注册表    │  │ AppError (thiserror)    │
//! └────────────────────────┘  └─────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，含显式的"暂不可用"变体 |
//! | [`formats`] | 标准格式固定表 + 系统注册名查询 + `Unknown(<id>)` 兜底 |
//! | [`clipboard`] | 打开/关闭/重试的访问守卫、原始读取、属主进程解析 |
//! | [`parser`] | 按格式分发的脱敏摘要器，输出带固定标签的记录 |
//! | [`journey`] | 轮询 + 去抖的事件追踪循环，会话日志落盘 |
//! | [`logging`] | env_logger 初始化，stderr + 调试日志文件双路输出 |
//!
//! ## 平台说明
//!
//! Win32 调用全部收敛在 `clipboard` 与 `formats` 的
//! `#[cfg(target_os = "windows")]` 分支里；其余模块跨平台，
//! 非 Windows 上访问层直接报"不可用"，策略逻辑照常可测。

pub mod clipboard;
pub mod error;
pub mod formats;
pub mod journey;
pub mod logging;
pub mod parser;
