// 解析器公开接口的集成测试：
// parse_format 对任何输入都返回带固定 "type" 标签的完整记录。

use clipboard_journey::parser::ClipboardFormatParser;

const FIXED_TAGS: [&str; 8] = [
    "text",
    "unicode_text",
    "file_list",
    "html",
    "bitmap",
    "dib",
    "unknown",
    "error",
];

#[test]
fn every_record_carries_a_fixed_type_tag() {
    let parser = ClipboardFormatParser::new();
    // 桩格式、未登记格式，以及（非 Windows 上必然不可用的）文本格式
    for id in [2u32, 8, 3, 16, 424_242] {
        let record = parser.parse_format(id);
        let value = serde_json::to_value(&record).unwrap();
        let tag = value["type"].as_str().expect("记录缺少 type 标签");
        assert!(FIXED_TAGS.contains(&tag), "意外标签：{}", tag);
    }
}

#[test]
fn bitmap_and_dib_are_stubbed_without_reading_data() {
    let parser = ClipboardFormatParser::new();

    let bitmap = serde_json::to_value(parser.parse_format(2)).unwrap();
    assert_eq!(bitmap["type"], "bitmap");
    assert!(bitmap["note"].as_str().unwrap().contains("not implemented"));

    let dib = serde_json::to_value(parser.parse_format(8)).unwrap();
    assert_eq!(dib["type"], "dib");
    assert!(dib["note"].as_str().unwrap().contains("not implemented"));
}

#[test]
fn unregistered_format_reports_unparsed_binary() {
    let parser = ClipboardFormatParser::new();
    // 注册格式 ID 的合法区间是 0xC000..=0xFFFF，取区间外的值避免撞上真实注册格式
    let value = serde_json::to_value(parser.parse_format(424_242)).unwrap();
    assert_eq!(value["type"], "unknown");
    assert_eq!(value["format_id"], 424_242);
    assert_eq!(value["note"], "Binary data - parsing not implemented");
}

// 访问层重试耗尽时，记录保留格式自身的标签，只带固定说明。
// 非 Windows 上访问必然失败，正好用来验证这条退化路径。
#[cfg(not(target_os = "windows"))]
#[test]
fn inaccessible_clipboard_keeps_format_tag_with_note() {
    use clipboard_journey::parser::UNAVAILABLE_NOTE;

    let parser = ClipboardFormatParser::new();

    let text = serde_json::to_value(parser.parse_format(1)).unwrap();
    assert_eq!(text["type"], "text");
    assert_eq!(text["note"], UNAVAILABLE_NOTE);
    assert!(text.get("content").is_none());

    let unicode = serde_json::to_value(parser.parse_format(13)).unwrap();
    assert_eq!(unicode["type"], "unicode_text");
    assert_eq!(unicode["note"], UNAVAILABLE_NOTE);
}
