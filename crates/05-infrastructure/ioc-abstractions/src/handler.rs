//! 命令异常处理器抽象接口

use ioc_common::{CommandRef, IocError, IocResult};
use std::sync::Arc;

/// 异常处理器 trait
///
/// 工作线程中命令抛出的错误会以 `(command, error)` 的形式交给处理器。
/// 处理器自身的失败只会被报告，不会向外传播。
pub trait ExceptionHandler: Send + Sync {
    /// 处理命令执行错误
    fn handle(&self, command: &CommandRef, error: IocError) -> IocResult<()>;
}

/// 共享异常处理器引用
pub type ExceptionHandlerRef = Arc<dyn ExceptionHandler>;

impl<F> ExceptionHandler for F
where
    F: Fn(&CommandRef, IocError) -> IocResult<()> + Send + Sync,
{
    fn handle(&self, command: &CommandRef, error: IocError) -> IocResult<()> {
        self(command, error)
    }
}
