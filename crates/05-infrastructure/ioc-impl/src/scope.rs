//! 作用域
//!
//! 作用域保存键到工厂的映射，并持有可选的父作用域用于回退查找。
//! 离调用方最近、定义了该键的作用域优先。

use ioc_common::{as_command, downcast, CommandRef, Dependency, Factory, IocError, IocResult};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// 依赖作用域
pub struct Scope {
    /// 作用域 ID
    id: String,
    /// 依赖表，读并发、写串行
    dependencies: RwLock<HashMap<String, Factory>>,
    /// 父作用域，仅用于查找
    parent: Option<Arc<Scope>>,
}

impl Scope {
    /// 创建空作用域
    pub fn new(id: impl Into<String>, parent: Option<Arc<Scope>>) -> Self {
        Self::with_dependencies(id, HashMap::new(), parent)
    }

    /// 使用预置依赖创建作用域
    pub fn with_dependencies(
        id: impl Into<String>,
        dependencies: HashMap<String, Factory>,
        parent: Option<Arc<Scope>>,
    ) -> Self {
        Self {
            id: id.into(),
            dependencies: RwLock::new(dependencies),
            parent,
        }
    }

    /// 作用域 ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 父作用域
    pub fn parent(&self) -> Option<&Arc<Scope>> {
        self.parent.as_ref()
    }

    /// 是否为根作用域（没有父作用域）
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// 到根作用域的层数，根作用域为 0
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent.as_deref();
        while let Some(scope) = current {
            depth += 1;
            current = scope.parent.as_deref();
        }
        depth
    }

    /// 在本作用域注册依赖
    ///
    /// 同一作用域内一个键只能注册一次；在子作用域注册同名键用于遮蔽父作用域。
    pub fn register(&self, key: impl Into<String>, factory: Factory) -> IocResult<()> {
        let key = key.into();
        let mut dependencies = self.dependencies.write();

        if dependencies.contains_key(&key) {
            return Err(IocError::DuplicateRegistration {
                key,
                scope_id: self.id.clone(),
            });
        }

        debug!("注册依赖: {} -> 作用域 {}", key, self.id);
        dependencies.insert(key, factory);
        Ok(())
    }

    /// 本作用域是否直接定义了该键（不查找父作用域）
    pub fn contains(&self, key: &str) -> bool {
        self.dependencies.read().contains_key(key)
    }

    /// 本作用域直接定义的键
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.dependencies.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// 沿作用域链查找工厂
    pub fn lookup(&self, key: &str) -> Option<Factory> {
        let mut current = Some(self);
        while let Some(scope) = current {
            if let Some(factory) = scope.dependencies.read().get(key) {
                trace!("依赖 {} 命中作用域 {}", key, scope.id);
                return Some(factory.clone());
            }
            current = scope.parent.as_deref();
        }
        None
    }

    /// 解析依赖
    ///
    /// 调用工厂时不持有任何锁，工厂内部可以继续注册或解析。
    pub fn resolve(&self, key: &str, args: &[Dependency]) -> IocResult<Dependency> {
        let factory = self
            .lookup(key)
            .ok_or_else(|| IocError::unknown_dependency(key))?;
        factory(args)
    }

    /// 解析依赖并向下转型
    pub fn resolve_as<T>(&self, key: &str, args: &[Dependency]) -> IocResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        downcast::<T>(self.resolve(key, args)?, key)
    }

    /// 解析一个命令
    pub fn resolve_command(&self, key: &str, args: &[Dependency]) -> IocResult<CommandRef> {
        as_command(self.resolve(key, args)?, key)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("dependencies", &self.keys())
            .field("parent", &self.parent.as_ref().map(|parent| parent.id()))
            .finish()
    }
}
