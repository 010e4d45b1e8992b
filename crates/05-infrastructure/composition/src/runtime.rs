//! IoC 运行时

use ioc_common::{keys, value, IocConfig, IocResult};
use ioc_impl::{set_current_scope, Ioc, Scope, ScopeRegistry, Worker};
use std::sync::Arc;
use tracing::debug;

/// 已组装完成的 IoC 运行时
#[derive(Debug, Clone)]
pub struct IocRuntime {
    /// 生效的配置
    config: IocConfig,
    /// 作用域注册表
    registry: Arc<ScopeRegistry>,
    /// 应用作用域
    scope: Arc<Scope>,
}

impl IocRuntime {
    pub(crate) fn new(config: IocConfig, registry: Arc<ScopeRegistry>, scope: Arc<Scope>) -> Self {
        Self {
            config,
            registry,
            scope,
        }
    }

    /// 生效的配置
    pub fn config(&self) -> &IocConfig {
        &self.config
    }

    /// 作用域注册表
    pub fn registry(&self) -> &Arc<ScopeRegistry> {
        &self.registry
    }

    /// 应用作用域
    pub fn scope(&self) -> &Arc<Scope> {
        &self.scope
    }

    /// 把调用线程的当前作用域设置为应用作用域
    ///
    /// 新线程在解析应用依赖之前需要先调用。
    pub fn enter(&self) {
        set_current_scope(self.scope.clone());
    }

    /// 在应用作用域下启动工作线程
    ///
    /// `Thread.Start` 会把当前作用域切换到工作线程作用域，返回前恢复为应用作用域。
    pub fn start_worker(&self, id: &str) -> IocResult<Arc<Worker>> {
        self.enter();
        debug!("启动工作线程: {}", id);
        let started = Ioc::resolve_command(keys::THREAD_START, &[value(id.to_string())])
            .and_then(|start| start.execute())
            .and_then(|()| Ioc::resolve::<Worker>(keys::THREAD, &[]));
        self.enter();
        started
    }
}
