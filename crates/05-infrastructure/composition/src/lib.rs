//! # IoC 组合层
//!
//! 负责把配置、日志与 IoC 运行时组合为一个可运行的整体。
//!
//! ## 主要功能
//!
//! - **运行时构建器**: 加载配置、初始化日志、安装作用域解析策略
//! - **应用作用域**: 在根作用域下创建应用作用域，注册异常处理器与工作线程插件
//! - **工作线程**: 在应用作用域下启动工作线程
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use ioc_composition::RuntimeBuilder;
//! use ioc_impl::LambdaCommand;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = RuntimeBuilder::new().app_scope_id("game").build()?;
//!
//!     let worker = runtime.start_worker("game-1")?;
//!     worker.put(Arc::new(LambdaCommand::new(|| Ok(()))))?;
//!     worker.request_soft_stop();
//!     worker.join()?;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod error;
pub mod runtime;

#[cfg(test)]
mod tests;

pub use builder::RuntimeBuilder;
pub use error::{RuntimeError, RuntimeResult};
pub use runtime::IocRuntime;

// 重新导出配置类型
pub use ioc_common::{IocConfig, LoggingConfig, WorkerConfig};
