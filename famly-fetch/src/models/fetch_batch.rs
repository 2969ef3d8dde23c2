//! 分页单元
//!
//! 一次列表调用返回的图片记录 + 不透明游标。
//! 游标必须原样传回下一次请求;`next` 为 None 表示最后一页。

use crate::models::famly_records::ImageRecord;

/// 一页列表结果
#[derive(Debug, Clone, Default)]
pub struct FetchBatch {
    /// 按远端返回顺序排列的图片记录
    pub items: Vec<ImageRecord>,
    /// 下一页游标
    pub next: Option<String>,
}

impl FetchBatch {
    pub fn new(items: Vec<ImageRecord>, next: Option<String>) -> Self {
        // 空字符串游标与缺失等价
        let next = next.filter(|cursor| !cursor.is_empty());
        Self { items, next }
    }

    /// 单页来源 (标记图片、消息) 的唯一一页
    pub fn last(items: Vec<ImageRecord>) -> Self {
        Self { items, next: None }
    }

    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}
