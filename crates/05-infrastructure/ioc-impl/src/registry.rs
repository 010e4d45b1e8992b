//! 全局作用域注册表
//!
//! 按 ID 持有全部作用域，使作用域可以跨线程通过稳定标识引用。
//! 根作用域随注册表创建，预置 `Scopes.*` 与 `IoC.Register` 依赖。

use crate::commands::LambdaCommand;
use crate::context::{current_scope, RegisterDependencyCommand, SetCurrentScopeCommand};
use crate::scope::Scope;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ioc_common::{
    arg, command_value, factory, keys, optional_arg, CommandRef, Dependency, Factory, IocError,
    IocResult,
};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// 作用域注册表
pub struct ScopeRegistry {
    /// 根作用域
    root: Arc<Scope>,
    /// 全部作用域（含根作用域）
    scopes: DashMap<String, Arc<Scope>>,
}

impl ScopeRegistry {
    /// 使用默认根作用域 ID 创建注册表
    pub fn new() -> Arc<Self> {
        Self::with_root_id(keys::ROOT_SCOPE_ID)
    }

    /// 使用指定根作用域 ID 创建注册表
    pub fn with_root_id(root_id: &str) -> Arc<Self> {
        Arc::new_cyclic(|registry: &Weak<ScopeRegistry>| {
            let root = Arc::new(Scope::with_dependencies(
                root_id,
                root_dependencies(registry.clone()),
                None,
            ));
            let scopes = DashMap::new();
            scopes.insert(root_id.to_string(), root.clone());

            info!("创建作用域注册表，根作用域: {}", root_id);
            Self { root, scopes }
        })
    }

    /// 根作用域
    pub fn root(&self) -> Arc<Scope> {
        self.root.clone()
    }

    /// 按 ID 查找作用域
    pub fn find(&self, scope_id: &str) -> Option<Arc<Scope>> {
        self.scopes.get(scope_id).map(|scope| scope.value().clone())
    }

    /// 按 ID 获取作用域，不存在时报错
    pub fn get(&self, scope_id: &str) -> IocResult<Arc<Scope>> {
        self.find(scope_id).ok_or_else(|| IocError::ScopeNotFound {
            scope_id: scope_id.to_string(),
        })
    }

    /// 是否存在该作用域
    pub fn contains(&self, scope_id: &str) -> bool {
        self.scopes.contains_key(scope_id)
    }

    /// 作用域数量（含根作用域）
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// 是否只剩根作用域
    pub fn is_empty(&self) -> bool {
        self.scopes.len() <= 1
    }

    /// 创建作用域
    ///
    /// 指定 `parent_id` 时以该作用域为父；否则以调用线程的当前作用域为父，
    /// 当前作用域未设置时以根作用域为父。ID 重复时失败。
    pub fn new_scope(&self, scope_id: &str, parent_id: Option<&str>) -> IocResult<Arc<Scope>> {
        // 先确定父作用域，避免持有分片锁时再次访问注册表
        let parent = match parent_id {
            Some(parent_id) => self.get(parent_id)?,
            None => current_scope().unwrap_or_else(|| self.root()),
        };

        match self.scopes.entry(scope_id.to_string()) {
            Entry::Occupied(_) => Err(IocError::DuplicateScope {
                scope_id: scope_id.to_string(),
            }),
            Entry::Vacant(entry) => {
                debug!("创建作用域: {} (父作用域: {})", scope_id, parent.id());
                let scope = Arc::new(Scope::new(scope_id, Some(parent)));
                entry.insert(scope.clone());
                Ok(scope)
            }
        }
    }

    /// 移除单个作用域，根作用域不可移除
    pub fn remove(&self, scope_id: &str) -> Option<Arc<Scope>> {
        if scope_id == self.root.id() {
            return None;
        }
        let removed = self.scopes.remove(scope_id).map(|(_, scope)| scope);
        if removed.is_some() {
            debug!("移除作用域: {}", scope_id);
        }
        removed
    }

    /// 清除除根作用域外的全部作用域
    ///
    /// 仅用于测试。调用时其他线程不应再依赖被清除的作用域。
    pub fn clear(&self) {
        let root_id = self.root.id().to_string();
        let before = self.scopes.len();
        self.scopes.retain(|scope_id, _| *scope_id == root_id);
        warn!("清除作用域: {} 个", before - self.scopes.len());
    }
}

impl std::fmt::Debug for ScopeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeRegistry")
            .field("root", &self.root.id())
            .field("scopes", &self.scopes.len())
            .finish()
    }
}

/// 从弱引用取回注册表
pub(crate) fn upgrade(registry: &Weak<ScopeRegistry>) -> IocResult<Arc<ScopeRegistry>> {
    registry.upgrade().ok_or_else(|| IocError::ScopeNotFound {
        scope_id: keys::ROOT_SCOPE_ID.to_string(),
    })
}

/// 根作用域预置依赖
fn root_dependencies(registry: Weak<ScopeRegistry>) -> HashMap<String, Factory> {
    let mut dependencies: HashMap<String, Factory> = HashMap::new();

    let weak = registry.clone();
    dependencies.insert(
        keys::SCOPES_NEW.to_string(),
        factory(move |args| {
            let scope_id = arg::<String>(args, 0, keys::SCOPES_NEW)?;
            let parent_id = optional_arg::<String>(args, 1, keys::SCOPES_NEW)?;
            let parent_id = parent_id.as_deref().map(String::as_str);
            let scope = upgrade(&weak)?.new_scope(&scope_id, parent_id)?;
            Ok(scope as Dependency)
        }),
    );

    let weak = registry.clone();
    dependencies.insert(
        keys::SCOPES_CURRENT.to_string(),
        factory(move |_| {
            let scope = match current_scope() {
                Some(scope) => scope,
                None => upgrade(&weak)?.root(),
            };
            Ok(scope as Dependency)
        }),
    );

    let weak = registry.clone();
    dependencies.insert(
        keys::SCOPES_CURRENT_SET.to_string(),
        factory(move |args| {
            let scope_id = arg::<String>(args, 0, keys::SCOPES_CURRENT_SET)?;
            let scope = upgrade(&weak)?.get(&scope_id)?;
            let command: CommandRef = Arc::new(SetCurrentScopeCommand::new(scope));
            Ok(command_value(command))
        }),
    );

    let weak = registry;
    dependencies.insert(
        keys::SCOPES_CLEAR.to_string(),
        factory(move |_| {
            let weak = weak.clone();
            let command: CommandRef = Arc::new(LambdaCommand::named(keys::SCOPES_CLEAR, move || {
                upgrade(&weak)?.clear();
                Ok(())
            }));
            Ok(command_value(command))
        }),
    );

    dependencies.insert(
        keys::IOC_REGISTER.to_string(),
        factory(|args| {
            let key = arg::<String>(args, 0, keys::IOC_REGISTER)?;
            let dependency_factory = arg::<Factory>(args, 1, keys::IOC_REGISTER)?;
            let command: CommandRef = Arc::new(RegisterDependencyCommand::new(
                key.as_str(),
                (*dependency_factory).clone(),
            ));
            Ok(command_value(command))
        }),
    );

    dependencies
}
