//! 运行时构建器

use crate::error::{RuntimeError, RuntimeResult};
use crate::runtime::IocRuntime;
use ioc_abstractions::ExceptionHandlerRef;
use ioc_common::{keys, singleton, value, Command, IocConfig, LoggingConfig};
use ioc_impl::{
    set_current_scope, HierarchicalScopeStrategy, InitScopesCommand, Ioc, LoggingExceptionHandler,
    WorkerPlugin,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// 运行时构建器
///
/// 使用建造者模式构建 [`IocRuntime`]
pub struct RuntimeBuilder {
    /// 显式提供的配置
    config: Option<IocConfig>,
    /// 配置文件路径
    config_path: Option<PathBuf>,
    /// 应用作用域 ID
    app_scope_id: Option<String>,
    /// 应用作用域的异常处理器
    exception_handler: Option<ExceptionHandlerRef>,
    /// 是否初始化日志
    logging_enabled: bool,
}

impl RuntimeBuilder {
    /// 创建新的运行时构建器
    pub fn new() -> Self {
        Self {
            config: None,
            config_path: None,
            app_scope_id: None,
            exception_handler: None,
            logging_enabled: false, // 默认不初始化日志
        }
    }

    /// 使用显式配置，不再读取配置文件与环境变量
    pub fn with_config(mut self, config: IocConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 从配置文件加载配置（环境变量仍可覆盖）
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// 指定应用作用域 ID，默认随机生成
    pub fn app_scope_id(mut self, id: impl Into<String>) -> Self {
        self.app_scope_id = Some(id.into());
        self
    }

    /// 指定应用作用域的异常处理器，默认记录日志
    pub fn exception_handler(mut self, handler: ExceptionHandlerRef) -> Self {
        self.exception_handler = Some(handler);
        self
    }

    /// 按配置中的 `logging` 初始化日志
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    /// 构建运行时
    ///
    /// 调用线程的当前作用域会被设置为应用作用域。
    pub fn build(self) -> RuntimeResult<IocRuntime> {
        let config = match self.config {
            Some(config) => {
                config.validate()?;
                config
            }
            None => IocConfig::load(self.config_path.as_deref())?,
        };

        // 只有在明确要求时才初始化日志，避免测试中重复初始化
        if self.logging_enabled {
            initialize_logging(&config.logging)?;
        }

        info!("开始构建 IoC 运行时");
        InitScopesCommand::with_root_id(config.root_scope_id.as_str()).execute()?;
        let strategy = HierarchicalScopeStrategy::global().ok_or_else(|| {
            RuntimeError::BootstrapFailed {
                message: "作用域解析策略未安装".to_string(),
            }
        })?;

        let registry = strategy.registry().clone();
        let root = registry.root();
        if root.id() != config.root_scope_id {
            debug!(
                "根作用域已初始化为 {}，忽略配置值 {}",
                root.id(),
                config.root_scope_id
            );
        }

        let app_scope_id = self
            .app_scope_id
            .unwrap_or_else(|| format!("app-{}", uuid::Uuid::new_v4()));
        let scope = registry.new_scope(&app_scope_id, Some(root.id()))?;
        set_current_scope(scope.clone());

        let handler = self
            .exception_handler
            .unwrap_or_else(|| Arc::new(LoggingExceptionHandler::new()));
        Ioc::register(keys::EXCEPTION_HANDLER, singleton(value(handler)))?.execute()?;
        WorkerPlugin::new(&registry, config.worker.clone()).execute()?;

        info!("IoC 运行时构建完成，应用作用域: {}", app_scope_id);
        Ok(IocRuntime::new(config, registry, scope))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 初始化日志系统
fn initialize_logging(config: &LoggingConfig) -> RuntimeResult<()> {
    let filter = EnvFilter::try_new(&config.filter).map_err(|e| RuntimeError::LoggingFailed {
        message: format!("无效的日志过滤指令 '{}': {}", config.filter, e),
    })?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_ids)
        .with_thread_names(config.show_thread_names);

    if config.json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    }
    .map_err(|e| RuntimeError::LoggingFailed {
        message: e.to_string(),
    })?;

    info!("日志系统初始化完成");
    Ok(())
}
