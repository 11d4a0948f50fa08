//! 剪贴板属主进程解析
//!
//! # 设计思路
//!
//! 把"是谁往剪贴板放的数据"解析成结构化身份：
//! 属主窗口句柄 → 进程 PID → 进程名/可执行文件路径 + 窗口标题。
//!
//! 程序化复制（截图工具、部分系统动作）常常没有属主窗口，
//! 这是正常情况而不是错误；任何一步解析失败都返回占位身份，
//! 绝不让一次捕获因为属主查不到而失败。
//!
//! # 实现思路
//!
//! - 窗口 → PID 用 `GetWindowThreadProcessId`，标题用 `GetWindowTextW`。
//! - PID → 进程名/路径委托 `sysinfo`，按单个 PID 刷新，避免全表扫描。
//! - `clipboard_owner()` 是不可失败接口，失败路径全部折叠为占位值。

use serde::{Deserialize, Serialize};

/// 剪贴板属主进程的身份信息
///
/// 无属主或解析失败时为占位值（`pid=0`，`name="Unknown"`）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerProcess {
    /// 进程 PID，0 表示未知
    pub pid: u32,
    /// 进程名
    pub name: String,
    /// 可执行文件完整路径
    pub exe: String,
    /// 属主窗口标题
    pub window_title: String,
}

impl OwnerProcess {
    /// 占位身份：无属主或解析失败
    pub fn unknown() -> Self {
        Self {
            pid: 0,
            name: "Unknown".to_string(),
            exe: String::new(),
            window_title: String::new(),
        }
    }
}

/// 解析当前剪贴板属主进程（Windows 专用）
///
/// 不可失败：无属主窗口（程序化复制的常态）或任何解析失败
/// 都返回 [`OwnerProcess::unknown`]。
#[cfg(target_os = "windows")]
pub fn clipboard_owner() -> OwnerProcess {
    use windows::Win32::System::DataExchange::GetClipboardOwner;
    use windows::Win32::UI::WindowsAndMessaging::GetWindowThreadProcessId;

    let hwnd = match unsafe { GetClipboardOwner() } {
        Ok(hwnd) => hwnd,
        Err(_) => {
            log::debug!("剪贴板当前无属主窗口（程序化复制的常态）");
            return OwnerProcess::unknown();
        }
    };

    let mut pid = 0u32;
    unsafe { GetWindowThreadProcessId(hwnd, Some(&mut pid as *mut u32)) };
    if pid == 0 {
        return OwnerProcess::unknown();
    }

    let (name, exe) = process_identity(pid);
    OwnerProcess {
        pid,
        name,
        exe,
        window_title: window_title(hwnd),
    }
}

/// 非 Windows 平台的占位实现
#[cfg(not(target_os = "windows"))]
pub fn clipboard_owner() -> OwnerProcess {
    OwnerProcess::unknown()
}

/// 按 PID 查询进程名与可执行文件路径
#[cfg(target_os = "windows")]
fn process_identity(pid: u32) -> (String, String) {
    use sysinfo::{Pid, ProcessesToUpdate, System};

    let target = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[target]), true);

    match system.process(target) {
        Some(process) => (
            process.name().to_string_lossy().into_owned(),
            process
                .exe()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
        ),
        None => ("Unknown".to_string(), String::new()),
    }
}

/// 读取窗口标题文本
#[cfg(target_os = "windows")]
fn window_title(hwnd: windows::Win32::Foundation::HWND) -> String {
    use windows::Win32::UI::WindowsAndMessaging::GetWindowTextW;

    let mut buf = [0u16; 512];
    let len = unsafe { GetWindowTextW(hwnd, &mut buf) };
    if len <= 0 {
        return String::new();
    }
    String::from_utf16_lossy(&buf[..len as usize])
}
