//! 解析策略整体替换集成测试
//!
//! 本文件独占一个测试进程，按顺序验证引导、替换与升级。

use anyhow::Result;
use ioc_impl::{
    keys, value, Command, Dependency, HierarchicalScopeStrategy, InitScopesCommand, Ioc, IocError,
    Scope, StrategyRef,
};
use std::sync::Arc;
use std::thread;

fn fixed_speed(speed: u32) -> StrategyRef {
    Arc::new(move |key: &str, _args: &[Dependency]| -> Result<Dependency, IocError> {
        match key {
            "Game.Speed" => Ok(value(speed)),
            other => Err(IocError::unknown_dependency(other)),
        }
    })
}

fn speed_from_other_thread() -> Result<u32, IocError> {
    thread::spawn(|| Ioc::resolve::<u32>("Game.Speed", &[]).map(|speed| *speed))
        .join()
        .expect("resolver thread panicked")
}

#[test]
fn test_strategy_swap_is_global_and_repeatable() -> Result<()> {
    // 引导策略只认识 IoC.SetupStrategy
    assert!(Ioc::resolve_dependency("Game.Speed", &[])
        .unwrap_err()
        .is_unknown_dependency());
    assert_eq!(Ioc::active_strategy().name(), "BootstrapStrategy");

    Ioc::setup_strategy(fixed_speed(3))?.execute()?;
    assert_eq!(*Ioc::resolve::<u32>("Game.Speed", &[])?, 3);
    assert_eq!(speed_from_other_thread()?, 3);

    // 自定义策略不认识 IoC.SetupStrategy，仍然可以替换
    Ioc::setup_strategy(fixed_speed(5))?.execute()?;
    assert_eq!(speed_from_other_thread()?, 5);

    InitScopesCommand::new().execute()?;
    assert_eq!(Ioc::active_strategy().name(), "HierarchicalScopeStrategy");
    assert!(Ioc::resolve_dependency("Game.Speed", &[])
        .unwrap_err()
        .is_unknown_dependency());
    let root = Ioc::resolve::<Scope>(keys::SCOPES_ROOT, &[])?;
    let global = HierarchicalScopeStrategy::global().expect("strategy installed");
    assert!(Arc::ptr_eq(&root, &global.root()));

    Ioc::setup_strategy(fixed_speed(7))?.execute()?;
    assert_eq!(speed_from_other_thread()?, 7);
    assert!(Ioc::resolve_dependency(keys::SCOPES_ROOT, &[])
        .unwrap_err()
        .is_unknown_dependency());
    Ok(())
}
