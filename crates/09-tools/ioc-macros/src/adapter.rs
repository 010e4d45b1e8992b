//! 接口适配器宏实现

use crate::utils::{adapter_ident, is_unit_type, result_ok_type, split_accessor};
use ioc_abstractions::{adapter_factory_key, adapter_key, Accessor};
use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, punctuated::Punctuated, Error, Expr, FnArg,
    ItemTrait, Lit, Meta, Pat, Result, Token, TraitItem, TraitItemFn,
};

/// 适配器参数
#[derive(Debug, Clone, Default)]
pub struct AdapterArgs {
    /// 自定义接口名称
    pub name: Option<String>,
}

impl Parse for AdapterArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut args = AdapterArgs::default();

        let parsed = Punctuated::<Meta, Token![,]>::parse_terminated(input)?;

        for meta in parsed {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("name") => {
                    if let Expr::Lit(expr_lit) = &nv.value {
                        if let Lit::Str(lit_str) = &expr_lit.lit {
                            args.name = Some(lit_str.value());
                            continue;
                        }
                    }
                    return Err(Error::new_spanned(nv.value, "name 必须是字符串"));
                }
                other => return Err(Error::new_spanned(other, "未知参数，仅支持 name = \"...\"")),
            }
        }

        Ok(args)
    }
}

/// 实现 #[adapter] 宏
pub fn adapter_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    let adapter_args = if args.is_empty() {
        AdapterArgs::default()
    } else {
        match syn::parse::<AdapterArgs>(args) {
            Ok(args) => args,
            Err(e) => return e.to_compile_error().into(),
        }
    };

    let item_trait = parse_macro_input!(input as ItemTrait);

    match expand(&adapter_args, &item_trait) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(args: &AdapterArgs, item_trait: &ItemTrait) -> Result<proc_macro2::TokenStream> {
    if !item_trait.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &item_trait.generics,
            "适配器不支持带泛型参数的 trait",
        ));
    }

    let trait_ident = &item_trait.ident;
    let vis = &item_trait.vis;
    let interface = args.name.clone().unwrap_or_else(|| trait_ident.to_string());
    let adapter = adapter_ident(trait_ident);
    let factory_key = adapter_factory_key(&interface);
    let doc = format!("`{}` 的 IoC 适配器", interface);

    let mut methods = Vec::new();
    for item in &item_trait.items {
        match item {
            // 带默认实现的方法沿用默认实现
            TraitItem::Fn(method) if method.default.is_some() => {}
            TraitItem::Fn(method) => methods.push(expand_method(&interface, method)?),
            other => {
                return Err(Error::new_spanned(
                    other,
                    "适配器 trait 只能包含 get_/set_ 方法",
                ))
            }
        }
    }

    Ok(quote! {
        #item_trait

        #[doc = #doc]
        #[derive(Debug, Clone)]
        #vis struct #adapter {
            target: ::ioc_impl::Dependency,
        }

        impl #adapter {
            /// 适配器注册键
            pub const FACTORY_KEY: &'static str = #factory_key;

            /// 包装目标对象
            pub fn new(target: ::ioc_impl::Dependency) -> Self {
                Self { target }
            }

            /// 目标对象
            pub fn target(&self) -> &::ioc_impl::Dependency {
                &self.target
            }

            /// 在当前作用域注册 `Adapter.<Interface>(target) -> 适配器`
            pub fn register() -> ::ioc_impl::IocResult<()> {
                use ::ioc_impl::Command as _;

                let factory = ::ioc_impl::factory(|args| {
                    let target = args.first().cloned().ok_or_else(|| {
                        ::ioc_impl::IocError::MissingArgument {
                            key: Self::FACTORY_KEY.to_string(),
                            index: 0,
                        }
                    })?;
                    ::std::result::Result::Ok(::ioc_impl::value(Self::new(target)))
                });
                ::ioc_impl::Ioc::register(Self::FACTORY_KEY, factory)?.execute()
            }
        }

        impl #trait_ident for #adapter {
            #(#methods)*
        }
    })
}

fn expand_method(interface: &str, method: &TraitItemFn) -> Result<proc_macro2::TokenStream> {
    let sig = &method.sig;

    match sig.receiver() {
        Some(receiver) if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => {
            return Err(Error::new_spanned(sig, "适配器方法的接收者必须是 &self"));
        }
    }

    let (accessor, field) = split_accessor(&sig.ident).ok_or_else(|| {
        Error::new_spanned(&sig.ident, "适配器方法名必须以 get_ 或 set_ 开头")
    })?;
    let key = adapter_key(interface, &field, accessor);
    let ok_type = result_ok_type(&sig.output)
        .ok_or_else(|| Error::new_spanned(&sig.output, "适配器方法必须返回 Result"))?;

    let mut arg_names = Vec::new();
    for input in sig.inputs.iter() {
        if let FnArg::Typed(pat_type) = input {
            match pat_type.pat.as_ref() {
                Pat::Ident(pat_ident) => arg_names.push(pat_ident.ident.clone()),
                other => return Err(Error::new_spanned(other, "适配器方法参数必须是简单标识符")),
            }
        }
    }

    match accessor {
        Accessor::Get => Ok(quote! {
            #sig {
                let __args: ::std::vec::Vec<::ioc_impl::Dependency> =
                    ::std::vec![self.target.clone() #(, ::ioc_impl::value(#arg_names))*];
                let __resolved = ::ioc_impl::Ioc::resolve::<#ok_type>(#key, &__args)?;
                ::std::result::Result::Ok(::std::clone::Clone::clone(&*__resolved))
            }
        }),
        Accessor::Set => {
            if arg_names.len() != 1 {
                return Err(Error::new_spanned(&sig.inputs, "setter 必须只有一个参数"));
            }
            if !is_unit_type(ok_type) {
                return Err(Error::new_spanned(&sig.output, "setter 必须返回 Result<(), E>"));
            }
            let value = &arg_names[0];
            Ok(quote! {
                #sig {
                    use ::ioc_impl::Command as _;

                    let __command = ::ioc_impl::Ioc::resolve_command(
                        #key,
                        &[self.target.clone(), ::ioc_impl::value(#value)],
                    )?;
                    __command.execute()?;
                    ::std::result::Result::Ok(())
                }
            })
        }
    }
}
