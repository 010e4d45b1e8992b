//! 组合层错误类型

use ioc_common::{ConfigError, IocError};
use thiserror::Error;

/// 运行时构建错误
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ioc(#[from] IocError),

    #[error("日志初始化失败: {message}")]
    LoggingFailed { message: String },

    #[error("运行时启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type RuntimeResult<T> = Result<T, RuntimeError>;
