//! EXIF 写入
//!
//! 把拍摄时间、时区偏移、说明文字、GPS 映射为 EXIF 标签,由 little_exif
//! 写入 JPEG (已有的 Exif 段会被替换)。

use little_exif::exif_tag::ExifTag;
use little_exif::filetype::FileExtension;
use little_exif::metadata::Metadata;
use little_exif::rational::uR64;
use thiserror::Error;

use crate::models::GpsCoordinates;

/// UserComment 的字符编码前缀
const UNICODE_PREFIX: &[u8; 8] = b"UNICODE\0";

/// EXIF写入错误
#[derive(Debug, Error)]
pub enum ExifError {
    /// little_exif 写入失败 (通常是 JPEG 结构损坏)
    #[error("EXIF写入失败: {0}")]
    Write(String),
}

/// 需要写入的元数据
#[derive(Debug, Clone, PartialEq)]
pub struct ExifMetadata {
    /// "YYYY:MM:DD HH:MM:SS"
    pub date_time_original: String,
    /// "+HH:MM",仅在拍摄时间带时区时写入
    pub offset_time_original: Option<String>,
    /// 说明文字
    pub user_comment: Option<String>,
    pub gps: Option<GpsCoordinates>,
}

impl ExifMetadata {
    /// 映射为 EXIF 标签
    pub fn to_tags(&self) -> Vec<ExifTag> {
        let mut tags = vec![ExifTag::DateTimeOriginal(self.date_time_original.clone())];

        if let Some(offset) = &self.offset_time_original {
            tags.push(ExifTag::OffsetTimeOriginal(offset.clone()));
        }
        if let Some(comment) = &self.user_comment {
            tags.push(ExifTag::UserComment(encode_user_comment(comment)));
        }
        if let Some(gps) = self.gps {
            let (lat_ref, lat) = to_dms(gps.latitude, 'N', 'S');
            let (lng_ref, lng) = to_dms(gps.longitude, 'E', 'W');
            tags.push(ExifTag::GPSVersionID(vec![2, 0, 0, 0]));
            tags.push(ExifTag::GPSLatitudeRef(lat_ref.to_string()));
            tags.push(ExifTag::GPSLatitude(rationals(&lat)));
            tags.push(ExifTag::GPSLongitudeRef(lng_ref.to_string()));
            tags.push(ExifTag::GPSLongitude(rationals(&lng)));
        }

        tags
    }
}

/// 写入 EXIF,返回新的 JPEG 字节
///
/// 调用方负责确认数据是 JPEG
///
/// # 错误
/// - `ExifError::Write`: JPEG 结构无法解析
pub fn write_jpeg_metadata(jpeg: &[u8], metadata: &ExifMetadata) -> Result<Vec<u8>, ExifError> {
    let mut exif = Metadata::new();
    for tag in metadata.to_tags() {
        exif.set_tag(tag);
    }

    let mut buffer = jpeg.to_vec();
    exif.write_to_vec(&mut buffer, FileExtension::JPEG)
        .map_err(|e| ExifError::Write(e.to_string()))?;
    Ok(buffer)
}

/// "UNICODE\0" + UTF-16BE
fn encode_user_comment(text: &str) -> Vec<u8> {
    let mut data = UNICODE_PREFIX.to_vec();
    data.extend(text.encode_utf16().flat_map(|unit| unit.to_be_bytes()));
    data
}

fn rationals(values: &[(u32, u32); 3]) -> Vec<uR64> {
    values
        .iter()
        .map(|&(nominator, denominator)| uR64 {
            nominator,
            denominator,
        })
        .collect()
}

/// 十进制度 → (方向, [度, 分, 秒]),秒保留两位小数
pub fn to_dms(value: f64, positive: char, negative: char) -> (char, [(u32, u32); 3]) {
    let reference = if value < 0.0 { negative } else { positive };
    let abs = value.abs();
    let degrees = abs.trunc();
    let minutes_full = (abs - degrees) * 60.0;
    let minutes = minutes_full.trunc();
    let hundredths = ((minutes_full - minutes) * 60.0 * 100.0).round() as u32;

    (
        reference,
        [
            (degrees as u32, 1),
            (minutes as u32, 1),
            reduce(hundredths, 100),
        ],
    )
}

fn reduce(num: u32, den: u32) -> (u32, u32) {
    let divisor = gcd(num, den);
    (num / divisor, den / divisor)
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a.max(1)
    } else {
        gcd(b, a % b)
    }
}
