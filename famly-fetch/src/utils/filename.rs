//! 文件名推导
//!
//! `(图片描述, 模板, 前缀)` → 相对路径,纯函数: 相同输入永远得到相同路径。
//! 下载决策和重跑的幂等性都依赖这一点。
//!
//! 步骤:
//! 1. 从URL的路径部分取扩展名 (小写,没有则为空)
//! 2. `%FP` → 前缀, `%ID` → 图片ID,原样替换,内容不再参与模板展开
//! 3. 其余部分按 strftime 规则用拍摄时间展开
//! 4. 追加扩展名

use chrono::format::{Item, StrftimeItems};
use std::fmt::Write;
use std::path::PathBuf;

use crate::models::{CaptureDate, FilenameError, ImageDescriptor};

/// 模板片段
#[derive(Debug, PartialEq)]
enum Segment<'a> {
    /// 需要日期展开的模板文本
    Template(String),
    /// 原样输出的文本 (前缀或图片ID)
    Literal(&'a str),
}

/// 推导图片的相对保存路径
///
/// # 错误
/// - `FilenameError::EmptyPattern`: 模板为空
/// - `FilenameError::InvalidPattern`: 日期占位符无法识别
///
/// # 示例
/// 模板 `%FP-%Y-%m-%d_%H-%M-%S-%ID`, 前缀 `Alice-note`, ID `42`,
/// 拍摄时间 `2024-03-05T10:15:00`, URL以 `.jpg` 结尾
/// → `Alice-note-2024-03-05_10-15-00-42.jpg`
pub fn derive(
    descriptor: &ImageDescriptor,
    pattern: &str,
    prefix: &str,
) -> Result<PathBuf, FilenameError> {
    if pattern.is_empty() {
        return Err(FilenameError::EmptyPattern);
    }

    let extension = url_extension(&descriptor.url());

    let mut filename = String::new();
    for segment in split_pattern(pattern, prefix, &descriptor.img_id) {
        match segment {
            Segment::Literal(text) => filename.push_str(text),
            Segment::Template(template) => {
                expand_date(&mut filename, &template, &descriptor.date)?
            }
        }
    }
    filename.push_str(&extension);

    Ok(PathBuf::from(filename))
}

/// 校验模板
///
/// 在下载开始前拒绝无效模板,避免处理到一半才失败
pub fn validate_pattern(pattern: &str) -> Result<(), FilenameError> {
    if pattern.trim().is_empty() {
        return Err(FilenameError::EmptyPattern);
    }

    for segment in split_pattern(pattern, "", "") {
        if let Segment::Template(template) = segment {
            if StrftimeItems::new(&template).any(|item| matches!(item, Item::Error)) {
                return Err(FilenameError::InvalidPattern(pattern.to_string()));
            }
        }
    }

    Ok(())
}

/// 从URL路径部分提取扩展名 (含点,小写)
///
/// 查询参数和片段不参与判断;以点开头的文件名视为没有扩展名
pub fn url_extension(url: &str) -> String {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let name = path.rsplit('/').next().unwrap_or_default();
    let stem = name.trim_start_matches('.');

    match stem.rfind('.') {
        Some(pos) => stem[pos..].to_lowercase(),
        None => String::new(),
    }
}

/// 按 `%FP` / `%ID` 切分模板
///
/// `%%` 是转义的百分号,整体保留给日期展开,不会与后面的字母组成占位符
fn split_pattern<'a>(pattern: &str, prefix: &'a str, img_id: &'a str) -> Vec<Segment<'a>> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut rest = pattern;

    while let Some(pos) = rest.find('%') {
        current.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let (literal, consumed) = if tail.starts_with("%%") {
            current.push_str("%%");
            (None, 2)
        } else if tail.starts_with("%FP") {
            (Some(prefix), 3)
        } else if tail.starts_with("%ID") {
            (Some(img_id), 3)
        } else {
            current.push('%');
            (None, 1)
        };

        if let Some(text) = literal {
            if !current.is_empty() {
                segments.push(Segment::Template(std::mem::take(&mut current)));
            }
            segments.push(Segment::Literal(text));
        }

        rest = &tail[consumed..];
    }

    current.push_str(rest);
    if !current.is_empty() {
        segments.push(Segment::Template(current));
    }

    segments
}

fn expand_date(out: &mut String, template: &str, date: &CaptureDate) -> Result<(), FilenameError> {
    let items = StrftimeItems::new(template);
    let written = match date {
        CaptureDate::Zoned(dt) => write!(out, "{}", dt.format_with_items(items)),
        CaptureDate::Naive(dt) => write!(out, "{}", dt.format_with_items(items)),
    };

    written.map_err(|_| FilenameError::InvalidPattern(template.to_string()))
}
