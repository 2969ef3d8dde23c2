use std::future::Future;

use chrono::{Local, NaiveTime};
use tokio_util::sync::CancellationToken;

use crate::models::{AppError, RunSummary};
use crate::utils::time_utils;

/// 每日定时运行
///
/// 立即运行一次,之后每天在 `at` (本地时间) 再运行。
/// 单次运行失败只记录日志,不影响下一次。取消令牌触发后立即退出,
/// 正在进行的运行会被中断。
pub struct Scheduler {
    at: NaiveTime,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new(at: NaiveTime) -> Self {
        Self {
            at,
            cancel: CancellationToken::new(),
        }
    }

    /// 用于从外部 (如 Ctrl-C) 停止调度
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 运行调度循环,返回执行过的次数
    pub async fn run<F, Fut>(&self, mut job: F) -> u32
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<RunSummary, AppError>>,
    {
        let mut runs = 0;

        loop {
            runs += 1;
            let result = tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!(run = runs, "运行中收到取消信号,中断本次运行");
                    break;
                }
                result = job() => result,
            };

            match result {
                Ok(summary) => tracing::info!(
                    run = runs,
                    fetched = summary.fetched,
                    "定时运行完成"
                ),
                Err(e) => tracing::error!(run = runs, error = %e, "定时运行失败"),
            }

            let now = Local::now().naive_local();
            let next = time_utils::next_occurrence(now, self.at);
            let delay = (next - now).to_std().unwrap_or_default();

            tracing::info!(next_run = %next, "等待下一次定时运行");

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!(runs = runs, "调度已取消");
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        runs
    }
}
