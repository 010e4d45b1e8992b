//! 进程级解析入口
//!
//! 同一时刻只有一个解析策略生效。`IoC.SetupStrategy` 由引导策略直接应答，
//! 因此无论当前安装了什么策略，都可以整体替换为新策略。

use ioc_abstractions::{ResolveStrategy, StrategyRef};
use ioc_common::{
    arg, as_command, command_value, downcast, keys, value, Command, CommandRef, Dependency,
    Factory, IocError, IocResult,
};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, info};

/// 当前生效的解析策略
static ACTIVE_STRATEGY: Lazy<RwLock<StrategyRef>> =
    Lazy::new(|| RwLock::new(Arc::new(BootstrapStrategy)));

/// 引导策略
///
/// 只认识 `IoC.SetupStrategy` 一个键，用于安装真正的解析策略。
#[derive(Debug, Default, Clone, Copy)]
pub struct BootstrapStrategy;

impl ResolveStrategy for BootstrapStrategy {
    fn resolve(&self, key: &str, args: &[Dependency]) -> IocResult<Dependency> {
        if key == keys::IOC_SETUP_STRATEGY {
            let strategy = arg::<StrategyRef>(args, 0, key)?;
            let command: CommandRef = Arc::new(SetupStrategyCommand::new((*strategy).clone()));
            Ok(command_value(command))
        } else {
            Err(IocError::unknown_dependency(key))
        }
    }

    fn name(&self) -> &str {
        "BootstrapStrategy"
    }
}

/// 安装解析策略命令
///
/// 替换对所有线程的后续解析立即生效。
pub struct SetupStrategyCommand {
    strategy: StrategyRef,
}

impl SetupStrategyCommand {
    /// 创建命令
    pub fn new(strategy: StrategyRef) -> Self {
        Self { strategy }
    }
}

impl Command for SetupStrategyCommand {
    fn execute(&self) -> IocResult<()> {
        info!("安装解析策略: {}", self.strategy.name());
        *ACTIVE_STRATEGY.write() = self.strategy.clone();
        Ok(())
    }
}

/// 进程级 IoC 入口
#[derive(Debug, Clone, Copy)]
pub struct Ioc;

impl Ioc {
    /// 解析依赖，返回未转型的结果
    pub fn resolve_dependency(key: &str, args: &[Dependency]) -> IocResult<Dependency> {
        if key == keys::IOC_SETUP_STRATEGY {
            return BootstrapStrategy.resolve(key, args);
        }

        // 先克隆出策略再解析，工厂内部可以再次调用 Ioc
        let strategy = ACTIVE_STRATEGY.read().clone();
        strategy.resolve(key, args)
    }

    /// 解析依赖并向下转型
    pub fn resolve<T>(key: &str, args: &[Dependency]) -> IocResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        downcast::<T>(Self::resolve_dependency(key, args)?, key)
    }

    /// 解析一个命令
    pub fn resolve_command(key: &str, args: &[Dependency]) -> IocResult<CommandRef> {
        as_command(Self::resolve_dependency(key, args)?, key)
    }

    /// 生成在当前作用域注册依赖的命令
    pub fn register(key: &str, factory: Factory) -> IocResult<CommandRef> {
        debug!("生成注册命令: {}", key);
        Self::resolve_command(keys::IOC_REGISTER, &[value(key.to_string()), value(factory)])
    }

    /// 生成替换解析策略的命令
    pub fn setup_strategy(strategy: StrategyRef) -> IocResult<CommandRef> {
        Self::resolve_command(keys::IOC_SETUP_STRATEGY, &[value(strategy)])
    }

    /// 当前生效的解析策略
    pub fn active_strategy() -> StrategyRef {
        ACTIVE_STRATEGY.read().clone()
    }
}
