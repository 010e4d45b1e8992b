//! # IoC 具体实现
//!
//! 提供基于作用域层级的依赖解析策略与基于队列的命令执行工作线程。
//!
//! ## 核心组件
//!
//! - [`Ioc`] - 进程级解析入口，策略可整体替换
//! - [`Scope`] / [`ScopeRegistry`] - 作用域层级与全局作用域注册表
//! - [`HierarchicalScopeStrategy`] - 按当前作用域逐级向上查找的解析策略
//! - [`Worker`] - 独占一个命令队列的工作线程，支持硬停止与软停止
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use ioc_impl::{value, singleton, Command, InitScopesCommand, Ioc, Scope};
//!
//! fn main() -> Result<(), ioc_impl::IocError> {
//!     InitScopesCommand::new().execute()?;
//!
//!     let scope = Ioc::resolve::<Scope>("Scopes.New", &[value("game".to_string())])?;
//!     Ioc::resolve_command("Scopes.Current.Set", &[value(scope.id().to_string())])?.execute()?;
//!     Ioc::register("Game.Speed", singleton(value(3_u32)))?.execute()?;
//!
//!     let speed = Ioc::resolve::<u32>("Game.Speed", &[])?;
//!     assert_eq!(*speed, 3);
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod commands;
pub mod container;
pub mod context;
pub mod handler;
pub mod registry;
pub mod scope;
pub mod strategy;
pub mod worker;

pub use builder::OperationBuilder;
pub use commands::{LambdaCommand, LogCommand, MacroCommand, RetryCommand};
pub use container::{BootstrapStrategy, Ioc, SetupStrategyCommand};
pub use context::{current_scope, set_current_scope, RegisterDependencyCommand, SetCurrentScopeCommand};
pub use handler::LoggingExceptionHandler;
pub use registry::ScopeRegistry;
pub use scope::Scope;
pub use strategy::{HierarchicalScopeStrategy, InitScopesCommand};
pub use worker::{
    EnqueueCommand, HardStopCommand, RepeatingCommand, SoftStopCommand, StartWorkerCommand, Worker,
    WorkerPlugin, WorkerQueue,
};

// 重新导出公共类型，便于下游只依赖本 crate
pub use ioc_abstractions::{
    adapter_factory_key, adapter_key, Accessor, CommandSink, ExceptionHandler,
    ExceptionHandlerRef, ResolveStrategy, ResolveStrategyExt, StrategyRef,
};
pub use ioc_common::{
    arg, as_command, command_arg, command_value, downcast, factory, keys, optional_arg, singleton,
    value, Command, CommandRef, Dependency, Factory, IocConfig, IocError, IocResult, StopReason,
    WorkerConfig, WorkerState,
};
