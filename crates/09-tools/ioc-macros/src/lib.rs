//! # IoC Macros
//!
//! 这个 crate 提供了编译时生成接口适配器的过程宏。
//!
//! ## 核心宏
//!
//! - [`adapter`] - 为 trait 生成按 IoC 解析属性的适配器类型
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use ioc_impl::IocResult;
//! use ioc_macros::adapter;
//!
//! #[adapter(name = "IMovable")]
//! pub trait Movable {
//!     fn get_position(&self) -> IocResult<(i32, i32)>;
//!     fn set_position(&self, value: (i32, i32)) -> IocResult<()>;
//! }
//!
//! // 生成 MovableAdapter:
//! //   get_position 解析 "IMovable:position.get"(target)
//! //   set_position 解析 "IMovable:position.set"(target, value) 并执行返回的命令
//! ```

use proc_macro::TokenStream;

mod adapter;
mod utils;

/// 接口适配器宏
///
/// 保留原 trait，并生成 `<Trait>Adapter` 结构体：
///
/// - `get_<field>(&self, ...args) -> Result<T, E>` 解析 `"<Interface>:<field>.get"(target, ...args)`，
///   返回结果的克隆
/// - `set_<field>(&self, value) -> Result<(), E>` 解析 `"<Interface>:<field>.set"(target, value)`，
///   执行返回的命令
///
/// `E` 需要实现 `From<IocError>`。适配器还提供 `register()`，
/// 在当前作用域注册 `"Adapter.<Interface>"(target) -> <Trait>Adapter`。
///
/// # 参数
///
/// - `name = "IMovable"` - 自定义接口名称（默认为 trait 名称）
#[proc_macro_attribute]
pub fn adapter(args: TokenStream, input: TokenStream) -> TokenStream {
    adapter::adapter_impl(args, input)
}
