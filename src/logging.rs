//! 日志初始化：stderr + 调试日志文件双路输出
//!
//! # 设计思路
//!
//! 诊断会话经常在终端滚屏后才发现问题，重试与解析路径的
//! warn/error 需要留档。`env_logger` 的输出目标只能指定一个，
//! 所以用一个 `TeeWriter` 把每条日志同时写到 stderr 和追加模式
//! 打开的调试日志文件；文件打不开时退回纯 stderr，不影响启动。

use std::fs::{File, OpenOptions};
use std::io::{self, Write};

/// 调试日志文件名（追加模式，与会话日志同目录）
pub const DEBUG_LOG_FILE: &str = "clipboard_journey_debug.log";

/// 把写入同时复制到 stderr 与内部 sink 的组合写入器
pub struct TeeWriter<W: Write> {
    sink: W,
}

impl<W: Write> TeeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }
}

impl<W: Write> Write for TeeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.sink.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.sink.flush()
    }
}

/// 初始化全局日志：默认 info 级，`RUST_LOG` 可覆盖
///
/// 成功打开调试日志文件时，日志同时写入 stderr 与该文件。
pub fn init() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    match open_debug_log() {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(TeeWriter::new(file))));
        }
        Err(e) => {
            eprintln!("无法打开调试日志文件 {}：{}", DEBUG_LOG_FILE, e);
        }
    }

    builder.init();
}

fn open_debug_log() -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(DEBUG_LOG_FILE)
}
