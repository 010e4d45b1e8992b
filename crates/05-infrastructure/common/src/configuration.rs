//! 运行时配置
//!
//! 配置来源依次为默认值、可选配置文件、`IOC__` 前缀的环境变量，后者覆盖前者。

use crate::errors::{ConfigError, ConfigResult};
use crate::keys::ROOT_SCOPE_ID;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "IOC";

/// 工作线程栈大小下限
const MIN_STACK_SIZE: usize = 64 * 1024;

/// IoC 运行时配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IocConfig {
    /// 根作用域 ID
    pub root_scope_id: String,
    /// 工作线程配置
    pub worker: WorkerConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

impl Default for IocConfig {
    fn default() -> Self {
        Self {
            root_scope_id: ROOT_SCOPE_ID.to_string(),
            worker: WorkerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl IocConfig {
    /// 加载配置
    ///
    /// `path` 为空时只使用默认值与环境变量。
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!("加载配置文件: {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.root_scope_id.trim().is_empty() {
            return Err(ConfigError::validation("root_scope_id 不能为空"));
        }
        self.worker.validate()
    }
}

/// 工作线程配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkerConfig {
    /// 线程名前缀，线程名为 `{prefix}-{worker_id}`
    pub thread_name_prefix: String,
    /// 线程栈大小（字节），为空时使用系统默认值
    pub stack_size: Option<usize>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: "ioc-worker".to_string(),
            stack_size: None,
        }
    }
}

impl WorkerConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.thread_name_prefix.trim().is_empty() {
            return Err(ConfigError::validation("worker.thread_name_prefix 不能为空"));
        }
        if let Some(size) = self.stack_size {
            if size < MIN_STACK_SIZE {
                return Err(ConfigError::validation(format!(
                    "worker.stack_size 过小: {size}，最小为 {MIN_STACK_SIZE}"
                )));
            }
        }
        Ok(())
    }

    /// 生成线程名
    pub fn thread_name(&self, worker_id: &str) -> String {
        format!("{}-{}", self.thread_name_prefix, worker_id)
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志过滤指令，格式同 `RUST_LOG`
    pub filter: String,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示线程名
    pub show_thread_names: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            show_target: true,
            show_thread_ids: false,
            show_thread_names: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            filter: "debug".to_string(),
            show_target: true,
            show_thread_ids: true,
            show_thread_names: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            filter: "info".to_string(),
            show_target: false,
            show_thread_ids: false,
            show_thread_names: false,
            json_format: true,
        }
    }
}
