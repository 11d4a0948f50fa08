//! 剪贴板格式解析器
//!
//! # 设计思路
//!
//! 按格式 ID 分发到各格式的摘要器，产出**只含元数据、不含内容**的
//! 结构化记录：文本类内容一律替换为固定脱敏标记，文件列表的路径
//! 视为元数据保留。位图/DIB 出于隐私与复杂度原因固定返回桩记录。
//!
//! `parse_format` 是全函数：任何输入都返回一条结构完整的记录，
//! 绝不 panic、绝不传播错误 ——
//! - 访问层重试耗尽 → 保留该格式自身的 `type` 标签，记录退化为
//!   只带 `note` 的"暂不可用"形态；
//! - 摘要器内部其他错误 → `error` 记录。
//!
//! # 实现思路
//!
//! - 分发表是纯函数 `classify`：格式 ID + 运行时解析的
//!   "HTML Format" ID → 格式种类，未登记的 ID 落到 `Unknown`。
//! - `ParsedFormat` 用 serde 内部标签（`"type"` 字段）序列化，
//!   标签集固定为八个：text、unicode_text、file_list、html、
//!   bitmap、dib、unknown、error。
//! - 四个数据格式的载荷是 `Outcome<T>`：完整摘要或只带 `note`
//!   的不可用形态，serde 按字段形状无标签区分，标签不变。
//! - 行数、文件总大小、HTML 标签探测是独立纯函数，单独测试。

use serde::{Deserialize, Serialize};

use crate::clipboard::{self, reader};
use crate::error::AppError;
use crate::formats;

/// 固定脱敏标记：所有可能含敏感内容的字段都替换为它
pub const REDACTION_MARKER: &str = "[REDACTED FOR PRIVACY]";

/// 访问层重试耗尽时记录携带的说明
pub const UNAVAILABLE_NOTE: &str = "Unable to access clipboard";

/// 数据格式的载荷：完整摘要，或剪贴板暂不可用时的只带说明形态
///
/// 无标签序列化：两种形态的字段集互不重叠，按形状即可区分；
/// 外层 `"type"` 标签保持为格式自身的标签不变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Summary(T),
    Unavailable { note: String },
}

/// CF_TEXT 摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSummary {
    pub encoding: String,
    pub length: usize,
    pub content: String,
    pub lines: usize,
}

/// CF_UNICODETEXT 摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnicodeTextSummary {
    pub encoding: String,
    pub length: usize,
    pub byte_size: usize,
    pub content: String,
    pub lines: usize,
}

/// CF_HDROP 摘要（路径按元数据保留，不脱敏）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileListSummary {
    pub file_count: usize,
    pub files: Vec<String>,
    /// 磁盘上现存文件的大小合计；统计失败时为 -1
    pub total_size: i64,
}

/// HTML Format 摘要：字节大小 + 标签特征
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlSummary {
    pub raw_size: usize,
    pub content: String,
    pub has_images: bool,
    pub has_links: bool,
}

/// 一条格式摘要记录
///
/// 序列化后带固定的 `"type"` 标签（八个之一）；除 `file_list`
/// 的路径外，任何变体都不携带剪贴板的字面内容。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParsedFormat {
    /// CF_TEXT：ANSI 文本
    Text(Outcome<TextSummary>),
    /// CF_UNICODETEXT：UTF-16 文本
    UnicodeText(Outcome<UnicodeTextSummary>),
    /// CF_HDROP：文件列表
    FileList(Outcome<FileListSummary>),
    /// HTML Format
    Html(Outcome<HtmlSummary>),
    /// CF_BITMAP：固定桩记录，不读取数据
    Bitmap { note: String },
    /// CF_DIB：固定桩记录，不读取数据
    Dib { note: String },
    /// 未登记的格式
    Unknown { format_id: u32, note: String },
    /// 摘要器内部出错
    Error { format_id: u32, note: String },
}

/// 分发表登记的格式种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormatKind {
    Text,
    UnicodeText,
    Bitmap,
    Dib,
    FileList,
    Html,
    Unknown,
}

/// 格式 ID → 格式种类
///
/// "HTML Format" 是注册格式，ID 运行时才能确定，故作为参数传入。
pub(crate) fn classify(format_id: u32, html_format_id: Option<u32>) -> FormatKind {
    if Some(format_id) == html_format_id {
        return FormatKind::Html;
    }
    match format_id {
        formats::CF_TEXT => FormatKind::Text,
        formats::CF_UNICODETEXT => FormatKind::UnicodeText,
        formats::CF_BITMAP => FormatKind::Bitmap,
        formats::CF_DIB => FormatKind::Dib,
        formats::CF_HDROP => FormatKind::FileList,
        _ => FormatKind::Unknown,
    }
}

/// 行数 = 换行符数 + 1，空串为 0
pub(crate) fn line_count(text: &str) -> usize {
    if text.is_empty() {
        0
    } else {
        text.matches('\n').count() + 1
    }
}

/// 大小写不敏感的子串探测（只做子串匹配，不解析标记语言）
pub(crate) fn contains_tag(content: &str, tag: &str) -> bool {
    content.to_lowercase().contains(tag)
}

/// 统计现存文件的大小合计
///
/// 不存在的路径跳过；除"不存在"之外的 stat 失败返回 -1 哨兵。
pub(crate) fn total_file_size(paths: &[String]) -> i64 {
    let mut total: i64 = 0;
    for path in paths {
        match std::fs::metadata(path) {
            Ok(meta) => total += meta.len() as i64,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                log::warn!("统计文件大小失败（{}）：{}", path, e);
                return -1;
            }
        }
    }
    total
}

/// 剪贴板格式解析器
///
/// 构造时解析 "HTML Format" 的注册 ID 并记录隐私提示。
pub struct ClipboardFormatParser {
    html_format_id: Option<u32>,
}

impl ClipboardFormatParser {
    pub fn new() -> Self {
        log::warn!("隐私提示：解析器会访问剪贴板内容，输出中内容字段已脱敏");
        Self {
            html_format_id: formats::html_format_id(),
        }
    }

    /// 解析指定格式，总是返回一条结构完整的记录
    pub fn parse_format(&self, format_id: u32) -> ParsedFormat {
        let kind = classify(format_id, self.html_format_id);
        let result = match kind {
            FormatKind::Text => self.summarize_text(),
            FormatKind::UnicodeText => self.summarize_unicode_text(),
            FormatKind::FileList => self.summarize_file_list(),
            FormatKind::Html => self.summarize_html(),
            FormatKind::Bitmap => Ok(ParsedFormat::Bitmap {
                note: "Bitmap parsing not implemented for privacy and complexity reasons."
                    .to_string(),
            }),
            FormatKind::Dib => Ok(ParsedFormat::Dib {
                note: "DIB parsing not implemented for privacy and complexity reasons.".to_string(),
            }),
            FormatKind::Unknown => Ok(ParsedFormat::Unknown {
                format_id,
                note: "Binary data - parsing not implemented".to_string(),
            }),
        };

        match result {
            Ok(parsed) => parsed,
            Err(e) if e.is_unavailable() => unavailable_record(kind, format_id),
            Err(e) => {
                log::error!("解析格式 {} 出错：{}", format_id, e);
                ParsedFormat::Error {
                    format_id,
                    note: e.to_string(),
                }
            }
        }
    }

    fn summarize_text(&self) -> Result<ParsedFormat, AppError> {
        let data = clipboard::with_clipboard(reader::read_text)?;
        Ok(ParsedFormat::Text(Outcome::Summary(TextSummary {
            encoding: "ascii".to_string(),
            length: data.len(),
            content: REDACTION_MARKER.to_string(),
            lines: line_count(&data),
        })))
    }

    fn summarize_unicode_text(&self) -> Result<ParsedFormat, AppError> {
        let data = clipboard::with_clipboard(reader::read_unicode_text)?;
        let units = data.encode_utf16().count();
        Ok(ParsedFormat::UnicodeText(Outcome::Summary(
            UnicodeTextSummary {
                encoding: "utf-16".to_string(),
                length: units,
                byte_size: units * 2,
                content: REDACTION_MARKER.to_string(),
                lines: line_count(&data),
            },
        )))
    }

    fn summarize_file_list(&self) -> Result<ParsedFormat, AppError> {
        let files = clipboard::with_clipboard(reader::read_file_list)?;
        Ok(ParsedFormat::FileList(Outcome::Summary(FileListSummary {
            file_count: files.len(),
            total_size: total_file_size(&files),
            files,
        })))
    }

    fn summarize_html(&self) -> Result<ParsedFormat, AppError> {
        let html_id = self
            .html_format_id
            .ok_or_else(|| AppError::Clipboard("HTML Format 未注册".to_string()))?;
        let bytes = clipboard::with_clipboard(|| reader::read_raw_bytes(html_id))?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(ParsedFormat::Html(Outcome::Summary(HtmlSummary {
            raw_size: bytes.len(),
            content: REDACTION_MARKER.to_string(),
            has_images: contains_tag(&content, "<img"),
            has_links: contains_tag(&content, "<a"),
        })))
    }
}

impl Default for ClipboardFormatParser {
    fn default() -> Self {
        Self::new()
    }
}

/// 重试耗尽时的退化记录：保留格式自身的标签，只带固定说明
fn unavailable_record(kind: FormatKind, format_id: u32) -> ParsedFormat {
    let note = UNAVAILABLE_NOTE.to_string();
    match kind {
        FormatKind::Text => ParsedFormat::Text(Outcome::Unavailable { note }),
        FormatKind::UnicodeText => ParsedFormat::UnicodeText(Outcome::Unavailable { note }),
        FormatKind::FileList => ParsedFormat::FileList(Outcome::Unavailable { note }),
        FormatKind::Html => ParsedFormat::Html(Outcome::Unavailable { note }),
        // 桩与未知格式不访问剪贴板，正常路径到不了这里
        _ => ParsedFormat::Error { format_id, note },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_count_is_breaks_plus_one_for_nonempty() {
        assert_eq!(line_count(""), 0);
        assert_eq!(line_count("a"), 1);
        assert_eq!(line_count("a\nb\nc"), 3);
        assert_eq!(line_count("a\r\nb"), 2);
        assert_eq!(line_count("结尾换行\n"), 2);
    }

    #[test]
    fn tag_detection_is_case_insensitive_substring() {
        assert!(contains_tag("<IMG SRC=\"x.png\">", "<img"));
        assert!(contains_tag("文字<Img>文字", "<img"));
        assert!(!contains_tag("<p>没有图片</p>", "<img"));
        assert!(!contains_tag("<p>没有链接</p>", "<a"));
    }

    #[test]
    fn missing_files_are_skipped_in_total_size() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for name in ["a.bin", "b.bin", "c.bin"] {
            let path = dir.path().join(name);
            let mut f = std::fs::File::create(&path).unwrap();
            f.write_all(&[0u8; 10]).unwrap();
            paths.push(path.display().to_string());
        }
        paths.insert(1, dir.path().join("不存在.bin").display().to_string());

        assert_eq!(total_file_size(&paths), 30);
    }

    #[test]
    fn empty_path_list_sums_to_zero() {
        assert_eq!(total_file_size(&[]), 0);
    }

    #[test]
    fn classify_maps_standard_ids() {
        assert_eq!(classify(formats::CF_TEXT, None), FormatKind::Text);
        assert_eq!(classify(formats::CF_UNICODETEXT, None), FormatKind::UnicodeText);
        assert_eq!(classify(formats::CF_BITMAP, None), FormatKind::Bitmap);
        assert_eq!(classify(formats::CF_DIB, None), FormatKind::Dib);
        assert_eq!(classify(formats::CF_HDROP, None), FormatKind::FileList);
        assert_eq!(classify(3, None), FormatKind::Unknown);
    }

    #[test]
    fn classify_routes_registered_html_id() {
        assert_eq!(classify(49_321, Some(49_321)), FormatKind::Html);
        // 未注册时同一 ID 落到 Unknown
        assert_eq!(classify(49_321, None), FormatKind::Unknown);
    }

    #[test]
    fn stub_formats_never_touch_the_clipboard() {
        let parser = ClipboardFormatParser {
            html_format_id: None,
        };
        match parser.parse_format(formats::CF_BITMAP) {
            ParsedFormat::Bitmap { note } => assert!(note.contains("not implemented")),
            other => panic!("预期 Bitmap 桩记录，得到 {:?}", other),
        }
        match parser.parse_format(formats::CF_DIB) {
            ParsedFormat::Dib { note } => assert!(note.contains("not implemented")),
            other => panic!("预期 Dib 桩记录，得到 {:?}", other),
        }
    }

    #[test]
    fn unknown_format_yields_generic_record() {
        let parser = ClipboardFormatParser {
            html_format_id: None,
        };
        match parser.parse_format(999_983) {
            ParsedFormat::Unknown { format_id, note } => {
                assert_eq!(format_id, 999_983);
                assert_eq!(note, "Binary data - parsing not implemented");
            }
            other => panic!("预期 Unknown 记录，得到 {:?}", other),
        }
    }

    #[test]
    fn parsed_format_tag_matches_fixed_set() {
        let fixed_tags = [
            "text",
            "unicode_text",
            "file_list",
            "html",
            "bitmap",
            "dib",
            "unknown",
            "error",
        ];
        let samples = [
            ParsedFormat::Bitmap { note: "x".into() },
            ParsedFormat::Dib { note: "x".into() },
            ParsedFormat::Unknown { format_id: 7, note: "x".into() },
            ParsedFormat::Error { format_id: 7, note: "x".into() },
            ParsedFormat::Text(Outcome::Summary(TextSummary {
                encoding: "ascii".into(),
                length: 0,
                content: REDACTION_MARKER.into(),
                lines: 0,
            })),
            ParsedFormat::Text(Outcome::Unavailable {
                note: UNAVAILABLE_NOTE.into(),
            }),
            ParsedFormat::FileList(Outcome::Summary(FileListSummary {
                file_count: 0,
                files: vec![],
                total_size: 0,
            })),
            ParsedFormat::Html(Outcome::Unavailable {
                note: UNAVAILABLE_NOTE.into(),
            }),
        ];
        for sample in samples {
            let value = serde_json::to_value(&sample).unwrap();
            let tag = value["type"].as_str().unwrap();
            assert!(fixed_tags.contains(&tag), "标签 {} 不在固定集合中", tag);
        }
    }

    #[test]
    fn unavailable_outcome_keeps_format_tag_and_note_shape() {
        let record = unavailable_record(FormatKind::Text, formats::CF_TEXT);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["note"], UNAVAILABLE_NOTE);
        assert!(value.get("content").is_none());
        assert!(value.get("length").is_none());

        let record = unavailable_record(FormatKind::FileList, formats::CF_HDROP);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "file_list");
        assert_eq!(value["note"], UNAVAILABLE_NOTE);
        assert!(value.get("files").is_none());
    }

    #[test]
    fn outcome_round_trips_both_shapes() {
        let summary = ParsedFormat::UnicodeText(Outcome::Summary(UnicodeTextSummary {
            encoding: "utf-16".into(),
            length: 5,
            byte_size: 10,
            content: REDACTION_MARKER.into(),
            lines: 1,
        }));
        let unavailable = ParsedFormat::UnicodeText(Outcome::Unavailable {
            note: UNAVAILABLE_NOTE.into(),
        });

        for record in [summary, unavailable] {
            let json = serde_json::to_string(&record).unwrap();
            let parsed: ParsedFormat = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, record);
        }
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn text_formats_degrade_in_place_when_clipboard_inaccessible() {
        let parser = ClipboardFormatParser {
            html_format_id: None,
        };
        let expectations = [
            (formats::CF_TEXT, "text"),
            (formats::CF_UNICODETEXT, "unicode_text"),
            (formats::CF_HDROP, "file_list"),
        ];
        for (id, tag) in expectations {
            let value = serde_json::to_value(parser.parse_format(id)).unwrap();
            assert_eq!(value["type"], tag, "格式 {} 的标签不符", id);
            assert_eq!(value["note"], UNAVAILABLE_NOTE);
            assert!(value.get("content").is_none(), "不可用记录不应带内容字段");
        }
    }

    mod parse_totality {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // 任意格式 ID 都必须产出带固定标签的完整记录，绝不 panic
            #[test]
            fn parse_always_returns_tagged_record(format_id in any::<u32>()) {
                let parser = ClipboardFormatParser { html_format_id: None };
                // 限定到不触发真实剪贴板访问的种类，保持属性测试快速稳定
                prop_assume!(!matches!(
                    classify(format_id, None),
                    FormatKind::Text | FormatKind::UnicodeText | FormatKind::FileList
                ));
                let record = parser.parse_format(format_id);
                let value = serde_json::to_value(&record).unwrap();
                prop_assert!(value.get("type").and_then(|t| t.as_str()).is_some());
            }
        }
    }
}
