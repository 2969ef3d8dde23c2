//! 下载循环结果模型

/// 分页循环的终态
///
/// 两者对调用方都是成功完成,区别仅在于扫描了多少内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopTerminal {
    /// 所有页处理完毕
    Done,
    /// 遇到已下载图片提前停止
    Stopped,
}

/// 一次 (孩子, 来源) 循环的统计
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    pub terminal: LoopTerminal,
    pub pages_fetched: u32,
    pub fetched: u64,
    pub skipped: u64,
    pub malformed: u64,
}

impl LoopOutcome {
    pub(crate) fn new() -> Self {
        Self {
            terminal: LoopTerminal::Done,
            pages_fetched: 0,
            fetched: 0,
            skipped: 0,
            malformed: 0,
        }
    }
}

/// 一次完整运行的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub children: usize,
    pub loops: u32,
    pub stopped_early: u32,
    pub fetched: u64,
    pub skipped: u64,
    pub malformed: u64,
}

impl RunSummary {
    /// 累加一次循环的结果
    pub fn record(&mut self, outcome: &LoopOutcome) {
        self.loops += 1;
        if outcome.terminal == LoopTerminal::Stopped {
            self.stopped_early += 1;
        }
        self.fetched += outcome.fetched;
        self.skipped += outcome.skipped;
        self.malformed += outcome.malformed;
    }
}
