//! 适配器解析键约定
//!
//! 接口适配器的 getter 解析 `"Interface:field.get"(obj)` 并直接返回结果；
//! setter 解析 `"Interface:field.set"(obj, value)` 得到命令后立即执行。

use std::fmt;

/// 访问器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    /// 读取属性
    Get,
    /// 写入属性
    Set,
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Set => write!(f, "set"),
        }
    }
}

/// 生成适配器解析键
pub fn adapter_key(interface: &str, field: &str, accessor: Accessor) -> String {
    format!("{interface}:{field}.{accessor}")
}

/// 适配器注册键: `Adapter.{Interface}`
pub fn adapter_factory_key(interface: &str) -> String {
    format!("Adapter.{interface}")
}
