use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc,
};

use crate::models::{CaptureDate, RecordError};

/// 带时区的时间格式 (RFC 3339 之外的变体)
const ZONED_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// 不带时区的时间格式
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// 解析 Famly 返回的拍摄时间
///
/// 支持的格式:
/// - RFC 3339: "2024-03-05T10:15:00.123Z", "2024-03-05T10:15:00+01:00"
/// - 紧凑偏移: "2024-03-05T10:15:00+0100"
/// - 无时区: "2024-03-05T10:15:00", "2024-03-05 10:15:00"
/// - 仅日期: "2024-03-05" (视为当天 00:00:00)
pub fn parse_capture_date(raw: &str) -> Result<CaptureDate, RecordError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(RecordError::InvalidDate(raw.to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(CaptureDate::Zoned(dt));
    }

    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Ok(CaptureDate::Zoned(dt));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(CaptureDate::Naive(dt));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| CaptureDate::Naive(date.and_time(NaiveTime::default())))
        .map_err(|_| RecordError::InvalidDate(raw.to_string()))
}

/// 格式化为 EXIF DateTimeOriginal
///
/// 输出格式: "YYYY:MM:DD HH:MM:SS" (本地墙上时间)
pub fn format_exif_datetime(date: &CaptureDate) -> String {
    date.local().format("%Y:%m:%d %H:%M:%S").to_string()
}

/// 格式化为 EXIF OffsetTimeOriginal
///
/// 输出格式: "+02:00" / "-05:30"
pub fn format_exif_offset(offset: FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

/// 当前UTC时间的 ISO-8601 字符串 (写入状态文件)
///
/// 例: "2024-01-01T08:30:00.123456+00:00"
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// 解析定时计划 "HH:MM"
pub fn parse_schedule_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()
}

/// 计算下一次执行时间
///
/// 返回严格晚于 `now` 且墙上时间等于 `at` 的最近时刻。
///
/// 例: now=2024-03-05 09:00, at=10:00 → 2024-03-05 10:00
/// 例: now=2024-03-05 10:00, at=10:00 → 2024-03-06 10:00
pub fn next_occurrence(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}
