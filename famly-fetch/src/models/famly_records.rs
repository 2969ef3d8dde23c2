//! Famly API 原始记录
//!
//! 图片相关字段全部为 Option: 单条记录缺字段只会让该记录被跳过,
//! 不会导致整页反序列化失败。
//! 字段使用camelCase以对齐Famly API

use serde::Deserialize;
use std::fmt;

/// 字符串或整数标量
///
/// Famly 的图片ID和过期时间在不同接口里可能是字符串也可能是整数
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Int(i64),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Int(i) => write!(f, "{}", i),
        }
    }
}

/// 直链图片记录 (标记图片、消息图片)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectImageRaw {
    pub image_id: Option<Scalar>,
    pub prefix: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub key: Option<String>,
    pub created_at: Option<String>,
    pub text: Option<String>,
}

/// 签名图片记录 (笔记、成长记录)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedImageRaw {
    pub id: Option<Scalar>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub secret: Option<ImageSecretRaw>,
    pub created_at: Option<String>,
    pub text: Option<String>,
}

/// 签名图片的访问凭证
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageSecretRaw {
    pub prefix: Option<String>,
    pub key: Option<String>,
    pub path: Option<String>,
    pub expires: Option<Scalar>,
}

/// 未经校验的图片记录
#[derive(Debug, Clone)]
pub enum RawImage {
    Direct(DirectImageRaw),
    Signed(SignedImageRaw),
}

/// 列表源产出的一条图片记录
///
/// 笔记/成长记录/消息中的图片没有自己的时间和说明,
/// 使用所属条目的创建时间和 "正文 - 作者" 作为覆盖值。
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub raw: RawImage,
    pub date_override: Option<String>,
    pub caption: Option<String>,
}

impl ImageRecord {
    pub fn direct(raw: DirectImageRaw) -> Self {
        Self {
            raw: RawImage::Direct(raw),
            date_override: None,
            caption: None,
        }
    }

    pub fn signed(raw: SignedImageRaw) -> Self {
        Self {
            raw: RawImage::Signed(raw),
            date_override: None,
            caption: None,
        }
    }

    /// 设置时间覆盖值 (构建器模式)
    pub fn with_date(mut self, date: Option<String>) -> Self {
        self.date_override = date;
        self
    }

    /// 设置说明文字 (构建器模式)
    pub fn with_caption(mut self, caption: Option<String>) -> Self {
        self.caption = caption;
        self
    }
}

/// 人名
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonNameRaw {
    pub full_name: Option<String>,
    pub first_name: Option<String>,
}

/// 创建者
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedByRaw {
    pub name: Option<PersonNameRaw>,
}

impl CreatedByRaw {
    pub fn full_name(&self) -> Option<&str> {
        self.name.as_ref().and_then(|n| n.full_name.as_deref())
    }
}

/// 孩子笔记
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRaw {
    pub text: Option<String>,
    pub created_at: Option<String>,
    pub created_by: Option<CreatedByRaw>,
    #[serde(default)]
    pub images: Vec<SignedImageRaw>,
}

/// 笔记分页
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotesPageRaw {
    #[serde(default)]
    pub result: Vec<NoteRaw>,
    pub next: Option<String>,
}

/// 成长记录的正文
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemarkRaw {
    pub body: Option<String>,
}

/// 成长记录的状态
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationStatusRaw {
    pub created_at: Option<String>,
}

/// 成长记录 (Learning Journey observation)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationRaw {
    pub remark: Option<RemarkRaw>,
    pub status: Option<ObservationStatusRaw>,
    pub created_by: Option<CreatedByRaw>,
    #[serde(default)]
    pub images: Vec<SignedImageRaw>,
}

/// 成长记录分页
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObservationsPageRaw {
    #[serde(default)]
    pub results: Vec<ObservationRaw>,
    pub next: Option<String>,
}

/// 会话列表项
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRefRaw {
    pub conversation_id: String,
}

/// 消息作者
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageAuthorRaw {
    pub title: Option<String>,
}

/// 会话中的一条消息
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRaw {
    pub body: Option<String>,
    pub created_at: Option<String>,
    pub author: Option<MessageAuthorRaw>,
    #[serde(default)]
    pub images: Vec<DirectImageRaw>,
}

/// 会话详情
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationRaw {
    #[serde(default)]
    pub messages: Vec<MessageRaw>,
}

/// 拼接说明文字: "正文 - 作者"
///
/// 任一部分缺失时只保留另一部分,两者都缺失时返回 None
pub fn compose_caption(body: Option<&str>, author: Option<&str>) -> Option<String> {
    let body = body.map(str::trim).filter(|s| !s.is_empty());
    let author = author.map(str::trim).filter(|s| !s.is_empty());

    match (body, author) {
        (Some(b), Some(a)) => Some(format!("{} - {}", b, a)),
        (Some(b), None) => Some(b.to_string()),
        (None, Some(a)) => Some(a.to_string()),
        (None, None) => None,
    }
}
