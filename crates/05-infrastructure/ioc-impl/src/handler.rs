//! 默认异常处理器

use crate::commands::LogCommand;
use ioc_abstractions::ExceptionHandler;
use ioc_common::{Command, CommandRef, IocError, IocResult};

/// 记录日志的异常处理器
///
/// 作用域链中没有注册 `ExceptionHandler` 时工作线程使用它。
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingExceptionHandler;

impl LoggingExceptionHandler {
    /// 创建处理器
    pub fn new() -> Self {
        Self
    }
}

impl ExceptionHandler for LoggingExceptionHandler {
    fn handle(&self, command: &CommandRef, error: IocError) -> IocResult<()> {
        LogCommand::new(command, &error).execute()
    }
}
