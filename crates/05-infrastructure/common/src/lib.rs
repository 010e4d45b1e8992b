//! # IoC Common
//!
//! 这个 crate 提供了 IoC 运行时各层共享的基础类型。
//!
//! ## 核心组件
//!
//! - [`Dependency`] / [`Factory`] - 依赖值与工厂的统一表示
//! - [`Command`] - 延迟执行的统一动作接口
//! - [`IocError`] - 依赖解析与命令执行错误
//! - [`IocConfig`] - 运行时配置
//! - [`WorkerState`] - 工作线程生命周期状态
//!
//! ## 设计原则
//!
//! - 依赖键为字符串，约定 `Namespace.Name` 形式
//! - 解析结果统一为 `Arc<dyn Any + Send + Sync>`，由调用方向下转型
//! - 所有类型均可跨线程共享

pub mod command;
pub mod configuration;
pub mod dependency;
pub mod errors;
pub mod keys;
pub mod lifecycle;

pub use command::*;
pub use configuration::*;
pub use dependency::*;
pub use errors::*;
pub use lifecycle::*;
