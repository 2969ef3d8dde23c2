use crate::models::{AppError, Child, FetchConfig, RunSummary};
use crate::services::download_state::DownloadState;
use crate::services::famly_api::{FamlyApiClient, Session};
use crate::services::fetch_loop::PaginatedFetchLoop;
use crate::services::image_fetcher::ImageFetcher;
use crate::services::listing_source::{
    JourneySource, ListingSource, MessagesSource, NotesSource, TaggedSource,
};

/// 一次完整的下载运行
///
/// 执行顺序:
/// 1. 加载状态文件 (损坏时直接失败,不做任何下载)
/// 2. 消息图片 (按用户,仅一次)
/// 3. 每个孩子: 标记图片 → 成长记录 → 笔记
///
/// 所有 (孩子, 来源) 严格顺序执行。任何一个循环出错都会中止整个运行,
/// 重新运行即可恢复。
pub struct Downloader<'a> {
    client: &'a FamlyApiClient,
    fetcher: &'a dyn ImageFetcher,
    config: &'a FetchConfig,
    pacing: bool,
}

impl<'a> Downloader<'a> {
    pub fn new(
        client: &'a FamlyApiClient,
        fetcher: &'a dyn ImageFetcher,
        config: &'a FetchConfig,
    ) -> Self {
        Self {
            client,
            fetcher,
            config,
            pacing: true,
        }
    }

    /// 关闭标记图片的下载间隔 (构建器模式)
    pub fn without_pacing(mut self) -> Self {
        self.pacing = false;
        self
    }

    /// 运行一次
    ///
    /// # 错误
    /// - `AppError::State`: 状态文件损坏或无法读取
    /// - `AppError::Api`: 获取孩子列表失败
    /// - `AppError::FetchLoop`: 某个 (孩子, 来源) 循环失败
    pub async fn run(&self, session: &Session) -> Result<RunSummary, AppError> {
        tracing::info!(config = %self.config.summary_for_logging(), "开始下载");

        let mut state = DownloadState::load(&self.config.state_file)?;
        tokio::fs::create_dir_all(&self.config.pictures_folder).await?;

        let mut summary = RunSummary::default();
        let sources = self.config.sources;

        if sources.messages {
            tracing::info!("开始下载消息中的图片");
            let source = MessagesSource::new(self.client, session);
            self.run_source(&source, &mut state, &mut summary).await?;
        }

        let children = self.client.children(session).await?;
        summary.children = children.len();

        for child in &children {
            self.run_child(session, child, &mut state, &mut summary)
                .await?;
        }

        tracing::info!(
            children = summary.children,
            loops = summary.loops,
            stopped_early = summary.stopped_early,
            fetched = summary.fetched,
            skipped = summary.skipped,
            malformed = summary.malformed,
            state_entries = state.len(),
            "本次下载完成"
        );
        Ok(summary)
    }

    async fn run_child(
        &self,
        session: &Session,
        child: &Child,
        state: &mut DownloadState,
        summary: &mut RunSummary,
    ) -> Result<(), AppError> {
        let sources = self.config.sources;

        if sources.tagged {
            tracing::info!(child = %child.first_name, "开始下载标记图片");
            let source = TaggedSource::new(self.client, session, child);
            self.run_source(&source, state, summary).await?;
        }
        if sources.journey {
            tracing::info!(child = %child.first_name, "开始下载学习历程图片");
            let source = JourneySource::new(self.client, session, child);
            self.run_source(&source, state, summary).await?;
        }
        if sources.notes {
            tracing::info!(child = %child.first_name, "开始下载笔记中的图片");
            let source = NotesSource::new(self.client, session, child);
            self.run_source(&source, state, summary).await?;
        }
        Ok(())
    }

    async fn run_source(
        &self,
        source: &dyn ListingSource,
        state: &mut DownloadState,
        summary: &mut RunSummary,
    ) -> Result<(), AppError> {
        let mut fetch_loop = PaginatedFetchLoop::new(self.config, self.fetcher);
        if !self.pacing {
            fetch_loop = fetch_loop.without_pacing();
        }

        let outcome = fetch_loop
            .run(source, state)
            .await
            .map_err(|error| AppError::FetchLoop {
                source_name: source.file_prefix(),
                error,
            })?;

        summary.record(&outcome);
        Ok(())
    }
}
