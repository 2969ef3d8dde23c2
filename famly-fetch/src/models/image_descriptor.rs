//! 图片描述模型
//!
//! 一张远端图片的身份、尺寸、地址和拍摄时间。
//! 两种变体只在URL推导上不同:
//! - Direct: `{prefix}/{width}x{height}/{key}`,稳定不过期
//! - Signed: `{prefix}/{key}/{width}x{height}/{path}?expires={expires}`,
//!   带绝对过期时间,列出后必须尽快下载,不跨运行缓存

use crate::models::famly_records::{DirectImageRaw, ImageRecord, RawImage, SignedImageRaw};
use crate::models::{CaptureDate, RecordError};

/// URL变体
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageVariant {
    /// 直链
    Direct,
    /// 签名链接
    Signed { path: String, expires: String },
}

/// 图片描述
///
/// `img_id` 仅在同一列表接口内唯一: 标记图片、笔记图片、消息图片使用不同的ID命名空间
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub img_id: String,
    pub prefix: String,
    pub width: u32,
    pub height: u32,
    pub key: String,
    pub date: CaptureDate,
    /// 说明文字,仅在启用说明写入时填充
    pub text: Option<String>,
    pub variant: ImageVariant,
}

impl ImageDescriptor {
    /// 从原始记录构造
    ///
    /// 时间优先使用记录的覆盖值,其次使用图片自身的 createdAt;
    /// 说明文字同理。`include_captions` 为 false 时不保留说明文字。
    ///
    /// # 错误
    /// - `RecordError::MissingField`: 缺少ID/尺寸/key/时间等必需字段
    /// - `RecordError::InvalidDate`: 时间无法解析
    pub fn from_record(record: &ImageRecord, include_captions: bool) -> Result<Self, RecordError> {
        let mut descriptor = match &record.raw {
            RawImage::Direct(raw) => Self::from_direct(raw, record.date_override.as_deref())?,
            RawImage::Signed(raw) => Self::from_signed(raw, record.date_override.as_deref())?,
        };

        descriptor.text = if include_captions {
            record.caption.clone().or(descriptor.text)
        } else {
            None
        };

        Ok(descriptor)
    }

    fn from_direct(raw: &DirectImageRaw, date_override: Option<&str>) -> Result<Self, RecordError> {
        let date = resolve_date(date_override, raw.created_at.as_deref())?;

        Ok(Self {
            img_id: required_id(raw.image_id.as_ref().map(ToString::to_string), "imageId")?,
            prefix: required(raw.prefix.clone(), "prefix")?,
            width: required(raw.width, "width")?,
            height: required(raw.height, "height")?,
            key: required(raw.key.clone(), "key")?,
            date,
            text: raw.text.clone(),
            variant: ImageVariant::Direct,
        })
    }

    fn from_signed(raw: &SignedImageRaw, date_override: Option<&str>) -> Result<Self, RecordError> {
        let date = resolve_date(date_override, raw.created_at.as_deref())?;
        let secret = raw.secret.as_ref().ok_or(RecordError::MissingField("secret"))?;

        Ok(Self {
            img_id: required_id(raw.id.as_ref().map(ToString::to_string), "id")?,
            prefix: required(secret.prefix.clone(), "secret.prefix")?,
            width: required(raw.width, "width")?,
            height: required(raw.height, "height")?,
            key: required(secret.key.clone(), "secret.key")?,
            date,
            text: raw.text.clone(),
            variant: ImageVariant::Signed {
                path: required(secret.path.clone(), "secret.path")?,
                expires: required(secret.expires.as_ref().map(ToString::to_string), "secret.expires")?,
            },
        })
    }

    /// 下载地址
    pub fn url(&self) -> String {
        match &self.variant {
            ImageVariant::Direct => {
                format!("{}/{}x{}/{}", self.prefix, self.width, self.height, self.key)
            }
            ImageVariant::Signed { path, expires } => format!(
                "{}/{}/{}x{}/{}?expires={}",
                self.prefix, self.key, self.width, self.height, path, expires
            ),
        }
    }

    /// 是否为带过期时间的签名链接
    pub fn is_signed(&self) -> bool {
        matches!(self.variant, ImageVariant::Signed { .. })
    }
}

fn resolve_date(date_override: Option<&str>, created_at: Option<&str>) -> Result<CaptureDate, RecordError> {
    let raw = date_override
        .or(created_at)
        .ok_or(RecordError::MissingField("createdAt"))?;
    CaptureDate::parse(raw)
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, RecordError> {
    value.ok_or(RecordError::MissingField(field))
}

fn required_id(value: Option<String>, field: &'static str) -> Result<String, RecordError> {
    match value {
        Some(id) if !id.trim().is_empty() => Ok(id),
        Some(id) => Err(RecordError::InvalidValue { field, value: id }),
        None => Err(RecordError::MissingField(field)),
    }
}
