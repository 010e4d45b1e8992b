//! 当前作用域上下文
//!
//! 每个线程有独立的当前作用域槽位，默认为空（按根作用域解析）。
//! 修改一个线程的槽位不会影响其他线程；槽位不会被自动清除。

use crate::scope::Scope;
use ioc_common::{Command, Factory, IocError, IocResult};
use std::cell::RefCell;
use std::sync::Arc;
use tracing::trace;

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<Arc<Scope>>> = const { RefCell::new(None) };
}

/// 当前线程的作用域
pub fn current_scope() -> Option<Arc<Scope>> {
    CURRENT_SCOPE.with(|slot| slot.borrow().clone())
}

/// 设置当前线程的作用域
pub fn set_current_scope(scope: Arc<Scope>) {
    trace!("设置当前作用域: {}", scope.id());
    CURRENT_SCOPE.with(|slot| *slot.borrow_mut() = Some(scope));
}

/// 设置当前作用域命令
///
/// 以命令形式暴露，便于在生命周期的合适时机执行，例如工作线程每轮循环开始时。
#[derive(Debug, Clone)]
pub struct SetCurrentScopeCommand {
    scope: Arc<Scope>,
}

impl SetCurrentScopeCommand {
    /// 创建命令
    pub fn new(scope: Arc<Scope>) -> Self {
        Self { scope }
    }
}

impl Command for SetCurrentScopeCommand {
    fn execute(&self) -> IocResult<()> {
        set_current_scope(self.scope.clone());
        Ok(())
    }
}

/// 在当前作用域注册依赖的命令
pub struct RegisterDependencyCommand {
    key: String,
    factory: Factory,
}

impl RegisterDependencyCommand {
    /// 创建命令
    pub fn new(key: impl Into<String>, factory: Factory) -> Self {
        Self {
            key: key.into(),
            factory,
        }
    }
}

impl Command for RegisterDependencyCommand {
    fn execute(&self) -> IocResult<()> {
        let scope = current_scope().ok_or_else(|| IocError::NoCurrentScope {
            key: self.key.clone(),
        })?;
        scope.register(self.key.clone(), self.factory.clone())
    }
}
