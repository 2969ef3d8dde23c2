//! 下载决策
//!
//! 对每张图片决定 下载 / 跳过 / 停止:
//!
//! | 已下载 | stop_on_existing | 决策  |
//! |--------|------------------|-------|
//! | 否     | 任意             | Fetch |
//! | 是     | 是               | Stop  |
//! | 是     | 否               | Skip  |
//!
//! Stop 只在列表严格按"最新在前"排序时才安全,它是性能优化而不是正确性要求;
//! Skip 始终正确,只是重跑时更慢。

/// 单张图片的处理决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDecision {
    /// 未下载过,执行下载
    Fetch,
    /// 已下载,继续处理下一张
    Skip,
    /// 已下载,终止当前 (孩子, 来源) 的整个分页循环
    Stop,
}

impl FetchDecision {
    /// 根据下载历史和停止策略做出决策
    pub fn decide(img_id: &str, already_downloaded: bool, stop_on_existing: bool) -> Self {
        let decision = match (already_downloaded, stop_on_existing) {
            (false, _) => Self::Fetch,
            (true, true) => Self::Stop,
            (true, false) => Self::Skip,
        };

        tracing::trace!(img_id = %img_id, decision = decision.as_str(), "抓取决策");
        decision
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Skip => "skip",
            Self::Stop => "stop",
        }
    }
}
