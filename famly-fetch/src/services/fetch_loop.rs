use std::time::Duration;

use crate::models::{
    FetchBatch, FetchConfig, FetchDecision, FetchLoopError, ImageDescriptor, LoopOutcome,
    LoopTerminal,
};
use crate::services::download_state::DownloadState;
use crate::services::image_fetcher::{FetchRequest, ImageFetcher};
use crate::services::listing_source::ListingSource;
use crate::utils::filename;

/// 分页循环的状态
///
/// FetchingPage → ProcessingItems → (FetchingPage | Done | Stopped)
#[derive(Debug)]
enum LoopState {
    FetchingPage { cursor: Option<String> },
    ProcessingItems { batch: FetchBatch },
    Done,
    Stopped,
}

/// 游标分页下载循环
///
/// 一次 `run` 处理一个 (孩子, 来源) 组合:
/// - 逐页请求列表,游标原样传回
/// - 每张图片按下载历史做决策 (下载 / 跳过 / 停止)
/// - 每页处理完保存一次状态;停止或下载失败时也会先保存
///
/// 循环本身不重试,下载失败直接返回错误,重新运行即可从失败处继续。
pub struct PaginatedFetchLoop<'a> {
    config: &'a FetchConfig,
    fetcher: &'a dyn ImageFetcher,
    pacing: bool,
}

impl<'a> PaginatedFetchLoop<'a> {
    pub fn new(config: &'a FetchConfig, fetcher: &'a dyn ImageFetcher) -> Self {
        Self {
            config,
            fetcher,
            pacing: true,
        }
    }

    /// 关闭来源的下载间隔 (构建器模式)
    pub fn without_pacing(mut self) -> Self {
        self.pacing = false;
        self
    }

    /// 运行到 Done 或 Stopped
    ///
    /// # 错误
    /// - `FetchLoopError::Listing`: 列表请求失败
    /// - `FetchLoopError::Fetch`: 图片下载失败 (之前成功的图片已保存到状态文件)
    /// - `FetchLoopError::State`: 状态文件保存失败
    /// - `FetchLoopError::Filename`: 文件名模板无法用于该图片的时间
    pub async fn run(
        &self,
        source: &dyn ListingSource,
        state: &mut DownloadState,
    ) -> Result<LoopOutcome, FetchLoopError> {
        let prefix = source.file_prefix();
        let kind = source.kind();
        let pacing = if self.pacing { kind.pacing() } else { None };

        tracing::info!(source = %kind, prefix = %prefix, "开始抓取循环");

        let mut outcome = LoopOutcome::new();
        let mut loop_state = LoopState::FetchingPage { cursor: None };

        loop {
            loop_state = match loop_state {
                LoopState::FetchingPage { cursor } => {
                    tracing::debug!(
                        source = %kind,
                        page = outcome.pages_fetched + 1,
                        has_cursor = cursor.is_some(),
                        "正在获取分页"
                    );
                    let batch = source
                        .list(cursor.as_deref(), self.config.page_size)
                        .await?;
                    outcome.pages_fetched += 1;
                    tracing::info!(
                        source = %kind,
                        page = outcome.pages_fetched,
                        items = batch.items.len(),
                        "分页获取完成"
                    );
                    LoopState::ProcessingItems { batch }
                }
                LoopState::ProcessingItems { batch } => {
                    self.process_page(batch, &prefix, pacing, state, &mut outcome)
                        .await?
                }
                LoopState::Done => {
                    outcome.terminal = LoopTerminal::Done;
                    break;
                }
                LoopState::Stopped => {
                    outcome.terminal = LoopTerminal::Stopped;
                    break;
                }
            };
        }

        tracing::info!(
            source = %kind,
            prefix = %prefix,
            terminal = ?outcome.terminal,
            pages = outcome.pages_fetched,
            fetched = outcome.fetched,
            skipped = outcome.skipped,
            malformed = outcome.malformed,
            "抓取循环结束"
        );
        Ok(outcome)
    }

    /// 按页内顺序处理每条记录,返回下一个状态
    async fn process_page(
        &self,
        batch: FetchBatch,
        prefix: &str,
        pacing: Option<Duration>,
        state: &mut DownloadState,
        outcome: &mut LoopOutcome,
    ) -> Result<LoopState, FetchLoopError> {
        for record in &batch.items {
            let descriptor = match ImageDescriptor::from_record(record, self.config.include_captions) {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    tracing::warn!(prefix = %prefix, error = %e, "跳过格式错误的图片记录");
                    outcome.malformed += 1;
                    continue;
                }
            };

            let img_id = descriptor.img_id.as_str();
            match FetchDecision::decide(
                img_id,
                state.contains(img_id),
                self.config.stop_on_existing,
            ) {
                FetchDecision::Stop => {
                    tracing::info!(img_id = %img_id, "图片已下载,停止本次下载");
                    state.save()?;
                    return Ok(LoopState::Stopped);
                }
                FetchDecision::Skip => {
                    tracing::debug!(img_id = %img_id, "图片已下载,跳过");
                    outcome.skipped += 1;
                    continue;
                }
                FetchDecision::Fetch => {}
            }

            if let Err(e) = self.fetch_one(&descriptor, prefix, pacing).await {
                persist_before_error(state);
                return Err(e);
            }

            state.mark(img_id);
            outcome.fetched += 1;
        }

        state.save()?;

        Ok(match batch.next {
            Some(cursor) => LoopState::FetchingPage {
                cursor: Some(cursor),
            },
            None => LoopState::Done,
        })
    }

    async fn fetch_one(
        &self,
        descriptor: &ImageDescriptor,
        prefix: &str,
        pacing: Option<Duration>,
    ) -> Result<(), FetchLoopError> {
        let relative = filename::derive(descriptor, &self.config.filename_pattern, prefix)?;
        let destination = self.config.pictures_folder.join(relative);
        let url = descriptor.url();

        tracing::info!(
            img_id = %descriptor.img_id,
            date = %descriptor.date,
            path = %destination.display(),
            "正在下载图片"
        );

        if let Some(delay) = pacing {
            tokio::time::sleep(delay).await;
        }

        let request = FetchRequest {
            url: &url,
            destination: &destination,
            capture_date: &descriptor.date,
            caption: descriptor.text.as_deref(),
            gps: self.config.gps,
        };
        self.fetcher.fetch(&request).await?;
        Ok(())
    }
}

/// 出错前保存已成功的记录,保存失败只记录日志,返回原错误
fn persist_before_error(state: &DownloadState) {
    if let Err(e) = state.save() {
        tracing::error!(error = %e, "抓取出错后保存状态失败");
    }
}
