//! 依赖值与工厂
//!
//! 所有解析结果与调用参数都以 [`Dependency`] 形式传递，调用方按需向下转型。

use crate::errors::{IocError, IocResult};
use std::any::{type_name, Any};
use std::sync::Arc;

/// 解析结果或调用参数
pub type Dependency = Arc<dyn Any + Send + Sync>;

/// 依赖工厂函数类型
///
/// 以调用方提供的参数调用，返回一个值或一个命令。
pub type Factory = Arc<dyn Fn(&[Dependency]) -> IocResult<Dependency> + Send + Sync>;

/// 将任意值包装为依赖
pub fn value<T>(value: T) -> Dependency
where
    T: Any + Send + Sync,
{
    Arc::new(value)
}

/// 从闭包创建工厂
pub fn factory<F>(f: F) -> Factory
where
    F: Fn(&[Dependency]) -> IocResult<Dependency> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// 每次解析都返回同一个实例的工厂
pub fn singleton(instance: Dependency) -> Factory {
    Arc::new(move |_: &[Dependency]| Ok(instance.clone()))
}

/// 将依赖向下转型为具体类型
pub fn downcast<T>(dependency: Dependency, key: &str) -> IocResult<Arc<T>>
where
    T: Any + Send + Sync,
{
    dependency
        .downcast::<T>()
        .map_err(|_| IocError::TypeMismatch {
            key: key.to_string(),
            expected: type_name::<T>(),
        })
}

/// 按位置读取工厂参数
pub fn arg<T>(args: &[Dependency], index: usize, key: &str) -> IocResult<Arc<T>>
where
    T: Any + Send + Sync,
{
    let dependency = args.get(index).ok_or_else(|| IocError::MissingArgument {
        key: key.to_string(),
        index,
    })?;

    dependency
        .clone()
        .downcast::<T>()
        .map_err(|_| IocError::InvalidArgument {
            key: key.to_string(),
            index,
            expected: type_name::<T>(),
        })
}

/// 按位置读取可选参数，缺省时返回 `None`
pub fn optional_arg<T>(args: &[Dependency], index: usize, key: &str) -> IocResult<Option<Arc<T>>>
where
    T: Any + Send + Sync,
{
    if index >= args.len() {
        return Ok(None);
    }
    arg(args, index, key).map(Some)
}
