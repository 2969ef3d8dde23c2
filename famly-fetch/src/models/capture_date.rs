//! 拍摄时间模型
//!
//! Famly 返回的时间有时带时区偏移,有时不带。两种情况都要保留原样:
//! 文件名和 EXIF 使用记录时的本地墙上时间,偏移量单独写入 OffsetTimeOriginal。

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use std::fmt;

use crate::models::RecordError;
use crate::utils::time_utils::parse_capture_date;

/// 拍摄时间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureDate {
    /// 带时区偏移的时间 (如 `2024-03-05T10:15:00+01:00`)
    Zoned(DateTime<FixedOffset>),
    /// 不带时区的时间 (如 `2024-03-05T10:15:00`)
    Naive(NaiveDateTime),
}

impl CaptureDate {
    /// 解析远端时间字符串
    ///
    /// # 错误
    /// - `RecordError::InvalidDate`: 无法识别的格式
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        parse_capture_date(raw)
    }

    /// 记录时的本地墙上时间
    pub fn local(&self) -> NaiveDateTime {
        match self {
            Self::Zoned(dt) => dt.naive_local(),
            Self::Naive(dt) => *dt,
        }
    }

    /// 时区偏移 (无时区时为 None)
    pub fn offset(&self) -> Option<FixedOffset> {
        match self {
            Self::Zoned(dt) => Some(*dt.offset()),
            Self::Naive(_) => None,
        }
    }
}

impl fmt::Display for CaptureDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zoned(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Naive(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}
