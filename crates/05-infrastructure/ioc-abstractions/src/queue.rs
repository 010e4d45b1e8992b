//! 命令队列生产端抽象接口

use ioc_common::{CommandRef, IocResult};

/// 命令投递 trait
///
/// 生产者只持有投递端，消费端由工作线程独占。投递不阻塞，可在任意线程调用。
pub trait CommandSink: Send + Sync {
    /// 投递命令到队尾
    fn put(&self, command: CommandRef) -> IocResult<()>;
}
