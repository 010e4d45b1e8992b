//! 作用域层级解析策略
//!
//! 1. `Scopes.Root` 直接返回根作用域，无需设置当前作用域
//! 2. 否则取调用线程的当前作用域，未设置时使用根作用域
//! 3. 从该作用域开始逐级向上查找键，找到即调用工厂
//! 4. 整条链都没有定义该键时返回 `UnknownDependency`

use crate::container::Ioc;
use crate::context::{current_scope, set_current_scope};
use crate::registry::ScopeRegistry;
use crate::scope::Scope;
use ioc_abstractions::{ResolveStrategy, StrategyRef};
use ioc_common::{keys, Command, Dependency, IocError, IocResult};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::info;

/// 进程级作用域策略，由 [`InitScopesCommand`] 安装一次
static GLOBAL_STRATEGY: OnceCell<Arc<HierarchicalScopeStrategy>> = OnceCell::new();

/// 作用域层级解析策略
#[derive(Debug, Clone)]
pub struct HierarchicalScopeStrategy {
    registry: Arc<ScopeRegistry>,
}

impl HierarchicalScopeStrategy {
    /// 使用新的注册表创建策略
    pub fn new() -> Self {
        Self::with_registry(ScopeRegistry::new())
    }

    /// 使用指定根作用域 ID 创建策略
    pub fn with_root_id(root_id: &str) -> Self {
        Self::with_registry(ScopeRegistry::with_root_id(root_id))
    }

    /// 使用已有注册表创建策略
    pub fn with_registry(registry: Arc<ScopeRegistry>) -> Self {
        Self { registry }
    }

    /// 作用域注册表
    pub fn registry(&self) -> &Arc<ScopeRegistry> {
        &self.registry
    }

    /// 根作用域
    pub fn root(&self) -> Arc<Scope> {
        self.registry.root()
    }

    /// 已安装的进程级策略
    pub fn global() -> Option<Arc<HierarchicalScopeStrategy>> {
        GLOBAL_STRATEGY.get().cloned()
    }
}

impl Default for HierarchicalScopeStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolveStrategy for HierarchicalScopeStrategy {
    fn resolve(&self, key: &str, args: &[Dependency]) -> IocResult<Dependency> {
        if key == keys::SCOPES_ROOT {
            return Ok(self.registry.root() as Dependency);
        }

        let scope = current_scope().unwrap_or_else(|| self.registry.root());
        scope.resolve(key, args)
    }

    fn name(&self) -> &str {
        "HierarchicalScopeStrategy"
    }
}

/// 初始化作用域命令
///
/// 创建进程级注册表与根作用域，安装作用域层级策略，并把调用线程的当前作用域设为根作用域。
/// 重复执行只会重新设置调用线程的当前作用域。
#[derive(Debug, Clone)]
pub struct InitScopesCommand {
    root_id: String,
}

impl InitScopesCommand {
    /// 使用默认根作用域 ID
    pub fn new() -> Self {
        Self::with_root_id(keys::ROOT_SCOPE_ID)
    }

    /// 使用指定根作用域 ID，仅首次执行时生效
    pub fn with_root_id(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
        }
    }
}

impl Default for InitScopesCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for InitScopesCommand {
    fn execute(&self) -> IocResult<()> {
        let strategy = GLOBAL_STRATEGY.get_or_try_init(|| {
            let strategy = Arc::new(HierarchicalScopeStrategy::with_root_id(&self.root_id));
            Ioc::setup_strategy(strategy.clone() as StrategyRef)?.execute()?;
            info!("作用域初始化完成，根作用域: {}", self.root_id);
            Ok::<_, IocError>(strategy)
        })?;

        set_current_scope(strategy.root());
        Ok(())
    }

    fn name(&self) -> &str {
        "InitScopesCommand"
    }
}
