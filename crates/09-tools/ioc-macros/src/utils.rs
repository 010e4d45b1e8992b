//! 宏工具函数

use ioc_abstractions::Accessor;
use proc_macro2::Span;
use syn::{Ident, ReturnType, Type};

/// 从方法名中拆出访问器与属性名: `get_fuel_level` -> (`Get`, `fuel_level`)
pub fn split_accessor(method: &Ident) -> Option<(Accessor, String)> {
    let name = method.to_string();
    let (accessor, field) = if let Some(field) = name.strip_prefix("get_") {
        (Accessor::Get, field)
    } else if let Some(field) = name.strip_prefix("set_") {
        (Accessor::Set, field)
    } else {
        return None;
    };

    if field.is_empty() {
        None
    } else {
        Some((accessor, field.to_string()))
    }
}

/// 生成适配器类型名
pub fn adapter_ident(trait_ident: &Ident) -> Ident {
    Ident::new(&format!("{}Adapter", trait_ident), Span::call_site())
}

/// 从 `Result<T, E>` 返回类型中取出 `T`
pub fn result_ok_type(output: &ReturnType) -> Option<&Type> {
    let ReturnType::Type(_, ty) = output else {
        return None;
    };
    let Type::Path(type_path) = ty.as_ref() else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if !segment.ident.to_string().ends_with("Result") {
        return None;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(syn::GenericArgument::Type(inner_type)) => Some(inner_type),
            _ => None,
        },
        _ => None,
    }
}

/// 检查类型是否为 `()`
pub fn is_unit_type(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty())
}
