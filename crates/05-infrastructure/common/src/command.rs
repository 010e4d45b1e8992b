//! 命令接口定义
//!
//! 命令是延迟执行的统一动作单元，由协作方提供，由工作线程或调用方执行。

use crate::dependency::{arg, downcast, Dependency};
use crate::errors::IocResult;
use std::sync::Arc;

/// 命令 trait
pub trait Command: Send + Sync {
    /// 执行命令
    fn execute(&self) -> IocResult<()>;

    /// 命令名称，用于日志与错误报告
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// 共享命令引用
pub type CommandRef = Arc<dyn Command>;

impl std::fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command").field("name", &self.name()).finish()
    }
}

/// 将命令包装为依赖值
pub fn command_value(command: CommandRef) -> Dependency {
    Arc::new(command)
}

/// 从依赖值中取出命令
pub fn as_command(dependency: Dependency, key: &str) -> IocResult<CommandRef> {
    downcast::<CommandRef>(dependency, key).map(|command| (*command).clone())
}

/// 按位置读取命令参数
pub fn command_arg(args: &[Dependency], index: usize, key: &str) -> IocResult<CommandRef> {
    arg::<CommandRef>(args, index, key).map(|command| (*command).clone())
}
