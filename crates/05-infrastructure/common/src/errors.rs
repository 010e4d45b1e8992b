//! 错误类型定义

use thiserror::Error;

/// 依赖解析与命令执行错误类型
#[derive(Error, Debug)]
pub enum IocError {
    #[error("未知依赖: '{key}'")]
    UnknownDependency { key: String },

    #[error("依赖已注册: '{key}'，作用域: '{scope_id}'")]
    DuplicateRegistration { key: String, scope_id: String },

    #[error("无法注册依赖 '{key}': 当前上下文没有作用域")]
    NoCurrentScope { key: String },

    #[error("作用域不存在: '{scope_id}'")]
    ScopeNotFound { scope_id: String },

    #[error("作用域已存在: '{scope_id}'")]
    DuplicateScope { scope_id: String },

    #[error("缺少参数: '{key}' 第 {index} 个参数")]
    MissingArgument { key: String, index: usize },

    #[error("参数类型无效: '{key}' 第 {index} 个参数, 期望 {expected}")]
    InvalidArgument {
        key: String,
        index: usize,
        expected: &'static str,
    },

    #[error("依赖类型不匹配: '{key}', 期望 {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("命令执行失败: {command}, 原因: {source}")]
    CommandFailed {
        command: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("宏命令执行失败: {message}")]
    CompositeFailure {
        message: String,
        #[source]
        source: Box<IocError>,
    },

    #[error("工作线程 '{worker_id}' 执行命令失败: {command}, 原因: {source}")]
    CommandExecution {
        worker_id: String,
        command: String,
        #[source]
        source: Box<IocError>,
    },

    #[error("异常处理器执行失败: {command}, 原因: {source}")]
    HandlerFailure {
        command: String,
        #[source]
        source: Box<IocError>,
    },

    #[error("工作线程启动失败: {worker_id}, 原因: {source}")]
    WorkerSpawnFailed {
        worker_id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("工作线程异常退出: {worker_id}")]
    WorkerPanicked { worker_id: String },
}

impl IocError {
    /// 创建未知依赖错误
    pub fn unknown_dependency(key: impl Into<String>) -> Self {
        Self::UnknownDependency { key: key.into() }
    }

    /// 创建命令失败错误
    ///
    /// 用于业务命令报告任意失败原因。
    pub fn command_failed(
        command: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source: source.into(),
        }
    }

    /// 将错误包装为组合命令失败
    pub fn composite(source: IocError) -> Self {
        Self::CompositeFailure {
            message: source.to_string(),
            source: Box::new(source),
        }
    }

    /// 是否为未知依赖错误
    pub fn is_unknown_dependency(&self) -> bool {
        matches!(self, Self::UnknownDependency { .. })
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置加载失败: {source}")]
    LoadError {
        #[from]
        source: config::ConfigError,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

impl ConfigError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

/// 结果类型别名
pub type IocResult<T> = Result<T, IocError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
