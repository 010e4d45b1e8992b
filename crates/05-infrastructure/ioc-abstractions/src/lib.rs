//! # IoC Abstractions
//!
//! IoC 抽象层，定义依赖解析与命令执行的扩展接口。
//!
//! ## 核心接口
//!
//! - [`ResolveStrategy`] - 依赖解析策略接口
//! - [`ExceptionHandler`] - 命令异常处理器接口
//! - [`CommandSink`] - 命令队列生产端接口
//! - [`adapter_key`] - 适配器 getter/setter 解析键约定

pub mod adapter;
pub mod handler;
pub mod queue;
pub mod resolver;

pub use adapter::*;
pub use handler::*;
pub use queue::*;
pub use resolver::*;
