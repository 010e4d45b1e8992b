//! 依赖解析策略抽象接口
//!
//! 进程内同一时刻只有一个策略生效，策略可在运行时整体替换。

use ioc_common::{as_command, downcast, CommandRef, Dependency, IocResult};
use std::any::Any;
use std::sync::Arc;

/// 依赖解析策略 trait
///
/// 将 `(key, args)` 转换为一个值或一个命令。
pub trait ResolveStrategy: Send + Sync {
    /// 解析依赖
    fn resolve(&self, key: &str, args: &[Dependency]) -> IocResult<Dependency>;

    /// 策略名称
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// 共享策略引用
pub type StrategyRef = Arc<dyn ResolveStrategy>;

/// 带类型转换的解析辅助方法
pub trait ResolveStrategyExt: ResolveStrategy {
    /// 解析并向下转型为具体类型
    fn resolve_as<T>(&self, key: &str, args: &[Dependency]) -> IocResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        downcast::<T>(self.resolve(key, args)?, key)
    }

    /// 解析一个命令
    fn resolve_command(&self, key: &str, args: &[Dependency]) -> IocResult<CommandRef> {
        as_command(self.resolve(key, args)?, key)
    }
}

impl<S: ResolveStrategy + ?Sized> ResolveStrategyExt for S {}

impl<F> ResolveStrategy for F
where
    F: Fn(&str, &[Dependency]) -> IocResult<Dependency> + Send + Sync,
{
    fn resolve(&self, key: &str, args: &[Dependency]) -> IocResult<Dependency> {
        self(key, args)
    }
}
