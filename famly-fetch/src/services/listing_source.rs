//! 列表来源
//!
//! `ListingSource` 是分页下载循环与远端列表接口之间的边界:
//! 给定游标返回一页图片记录和下一页游标。
//! 每种来源 (标记图片、笔记、成长记录、消息) 一个适配器。

use async_trait::async_trait;

use crate::models::famly_records::{
    compose_caption, ConversationRaw, DirectImageRaw, NotesPageRaw, ObservationsPageRaw,
};
use crate::models::{ApiError, Child, FetchBatch, ImageRecord, SourceKind};
use crate::services::famly_api::{FamlyApiClient, Session};

/// 游标分页的列表接口
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// 来源类型,决定下载间隔
    fn kind(&self) -> SourceKind;

    /// 文件名前缀 (`%FP`)
    fn file_prefix(&self) -> String;

    /// 请求一页
    ///
    /// `cursor` 为 None 表示第一页;返回的游标原样传回下一次调用。
    async fn list(&self, cursor: Option<&str>, page_size: u32) -> Result<FetchBatch, ApiError>;
}

/// 孩子被标记的图片
pub struct TaggedSource<'a> {
    client: &'a FamlyApiClient,
    session: &'a Session,
    child: &'a Child,
}

impl<'a> TaggedSource<'a> {
    pub fn new(client: &'a FamlyApiClient, session: &'a Session, child: &'a Child) -> Self {
        Self {
            client,
            session,
            child,
        }
    }
}

#[async_trait]
impl ListingSource for TaggedSource<'_> {
    fn kind(&self) -> SourceKind {
        SourceKind::Tagged
    }

    fn file_prefix(&self) -> String {
        self.kind().file_prefix(&self.child.first_name)
    }

    async fn list(&self, _cursor: Option<&str>, _page_size: u32) -> Result<FetchBatch, ApiError> {
        let images = self.client.tagged_images(self.session, &self.child.id).await?;
        tracing::info!(
            child = %self.child.first_name,
            count = images.len(),
            "已获取标记图片列表"
        );
        Ok(tagged_batch(images))
    }
}

/// 孩子笔记中的图片
pub struct NotesSource<'a> {
    client: &'a FamlyApiClient,
    session: &'a Session,
    child: &'a Child,
}

impl<'a> NotesSource<'a> {
    pub fn new(client: &'a FamlyApiClient, session: &'a Session, child: &'a Child) -> Self {
        Self {
            client,
            session,
            child,
        }
    }
}

#[async_trait]
impl ListingSource for NotesSource<'_> {
    fn kind(&self) -> SourceKind {
        SourceKind::Notes
    }

    fn file_prefix(&self) -> String {
        self.kind().file_prefix(&self.child.first_name)
    }

    async fn list(&self, cursor: Option<&str>, page_size: u32) -> Result<FetchBatch, ApiError> {
        let page = self
            .client
            .child_notes(self.session, &self.child.id, cursor, page_size)
            .await?;
        tracing::info!(
            child = %self.child.first_name,
            notes = page.result.len(),
            "已获取笔记分页"
        );
        Ok(notes_batch(page))
    }
}

/// 成长记录中的图片
pub struct JourneySource<'a> {
    client: &'a FamlyApiClient,
    session: &'a Session,
    child: &'a Child,
}

impl<'a> JourneySource<'a> {
    pub fn new(client: &'a FamlyApiClient, session: &'a Session, child: &'a Child) -> Self {
        Self {
            client,
            session,
            child,
        }
    }
}

#[async_trait]
impl ListingSource for JourneySource<'_> {
    fn kind(&self) -> SourceKind {
        SourceKind::Journey
    }

    fn file_prefix(&self) -> String {
        self.kind().file_prefix(&self.child.first_name)
    }

    async fn list(&self, cursor: Option<&str>, page_size: u32) -> Result<FetchBatch, ApiError> {
        let page = self
            .client
            .learning_journey(self.session, &self.child.id, cursor, page_size)
            .await?;
        tracing::info!(
            child = %self.child.first_name,
            observations = page.results.len(),
            "已获取学习历程分页"
        );
        Ok(journey_batch(page))
    }
}

/// 消息中的图片
///
/// 按用户而非按孩子;没有游标,一次取回全部会话。
pub struct MessagesSource<'a> {
    client: &'a FamlyApiClient,
    session: &'a Session,
}

impl<'a> MessagesSource<'a> {
    pub fn new(client: &'a FamlyApiClient, session: &'a Session) -> Self {
        Self { client, session }
    }
}

#[async_trait]
impl ListingSource for MessagesSource<'_> {
    fn kind(&self) -> SourceKind {
        SourceKind::Messages
    }

    fn file_prefix(&self) -> String {
        self.kind().file_prefix("")
    }

    async fn list(&self, _cursor: Option<&str>, _page_size: u32) -> Result<FetchBatch, ApiError> {
        let refs = self.client.conversations(self.session).await?;
        tracing::info!(count = refs.len(), "已获取会话列表");

        let mut conversations = Vec::with_capacity(refs.len());
        for conversation in refs.iter().rev() {
            conversations.push(
                self.client
                    .conversation(self.session, &conversation.conversation_id)
                    .await?,
            );
        }

        Ok(messages_batch(conversations))
    }
}

/// 标记图片: 单页,记录自带时间
pub fn tagged_batch(images: Vec<DirectImageRaw>) -> FetchBatch {
    FetchBatch::last(images.into_iter().map(ImageRecord::direct).collect())
}

/// 笔记: 图片时间取笔记的 createdAt,说明为 "正文 - 作者"
pub fn notes_batch(page: NotesPageRaw) -> FetchBatch {
    let mut items = Vec::new();
    for note in page.result {
        let caption = compose_caption(
            note.text.as_deref(),
            note.created_by.as_ref().and_then(|c| c.full_name()),
        );
        for image in note.images {
            items.push(
                ImageRecord::signed(image)
                    .with_date(note.created_at.clone())
                    .with_caption(caption.clone()),
            );
        }
    }
    FetchBatch::new(items, page.next)
}

/// 成长记录: 图片时间取 status.createdAt,说明为 "remark - 作者"
pub fn journey_batch(page: ObservationsPageRaw) -> FetchBatch {
    let mut items = Vec::new();
    for observation in page.results {
        let caption = compose_caption(
            observation.remark.as_ref().and_then(|r| r.body.as_deref()),
            observation.created_by.as_ref().and_then(|c| c.full_name()),
        );
        let date = observation.status.as_ref().and_then(|s| s.created_at.clone());
        for image in observation.images {
            items.push(
                ImageRecord::signed(image)
                    .with_date(date.clone())
                    .with_caption(caption.clone()),
            );
        }
    }
    FetchBatch::new(items, page.next)
}

/// 消息: 会话已按调用方给定的顺序排列,每个会话内的消息倒序遍历
pub fn messages_batch(conversations: Vec<ConversationRaw>) -> FetchBatch {
    let mut items = Vec::new();
    for conversation in conversations {
        for message in conversation.messages.into_iter().rev() {
            let caption = compose_caption(
                message.body.as_deref(),
                message.author.as_ref().and_then(|a| a.title.as_deref()),
            );
            for image in message.images {
                items.push(
                    ImageRecord::direct(image)
                        .with_date(message.created_at.clone())
                        .with_caption(caption.clone()),
                );
            }
        }
    }
    FetchBatch::last(items)
}
