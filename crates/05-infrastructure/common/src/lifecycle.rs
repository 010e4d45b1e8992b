//! 工作线程生命周期

/// 工作线程停止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// 收到硬停止请求，剩余命令被丢弃
    Hard,
    /// 软停止后队列已排空
    Drained,
}

/// 工作线程生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// 已创建，循环尚未开始
    Created,
    /// 运行中
    Running,
    /// 已停止
    Stopped(StopReason),
}

impl Default for WorkerState {
    fn default() -> Self {
        Self::Created
    }
}

impl WorkerState {
    /// 是否已停止
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Stopped(StopReason::Hard) => write!(f, "stopped(hard)"),
            Self::Stopped(StopReason::Drained) => write!(f, "stopped(drained)"),
        }
    }
}
