//! 作用域层级解析集成测试
//!
//! 所有测试共享进程级策略，每个测试使用 uuid 命名的作用域互相隔离。

use anyhow::Result;
use ioc_impl::{
    keys, singleton, value, Command, CommandRef, InitScopesCommand, Ioc, IocError, LambdaCommand,
    MacroCommand, Scope,
};
use parking_lot::Mutex;
use std::sync::{Arc, Barrier};
use std::thread;

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

fn new_scope(id: &str, parent: Option<&str>) -> Result<Arc<Scope>> {
    let mut args = vec![value(id.to_string())];
    if let Some(parent) = parent {
        args.push(value(parent.to_string()));
    }
    Ok(Ioc::resolve::<Scope>(keys::SCOPES_NEW, &args)?)
}

fn enter(id: &str) -> Result<()> {
    Ioc::resolve_command(keys::SCOPES_CURRENT_SET, &[value(id.to_string())])?.execute()?;
    Ok(())
}

fn register(key: &str, number: i32) -> Result<(), IocError> {
    Ioc::register(key, singleton(value(number)))?.execute()
}

fn resolve_number(key: &str) -> Result<i32, IocError> {
    Ioc::resolve::<i32>(key, &[]).map(|number| *number)
}

#[test]
fn test_shadowing_scenario() -> Result<()> {
    InitScopesCommand::new().execute()?;

    let a = unique("A");
    new_scope(&a, Some(keys::ROOT_SCOPE_ID))?;
    enter(&a)?;
    register("x", 1)?;
    assert_eq!(resolve_number("x")?, 1);

    let b = unique("B");
    new_scope(&b, Some(&a))?;
    enter(&b)?;
    register("x", 2)?;
    assert_eq!(resolve_number("x")?, 2);

    enter(&a)?;
    assert_eq!(resolve_number("x")?, 1);
    Ok(())
}

#[test]
fn test_fallback_through_long_chain() -> Result<()> {
    InitScopesCommand::new().execute()?;

    let mut parent = keys::ROOT_SCOPE_ID.to_string();
    let mut ids = Vec::new();
    for level in 0..50 {
        let id = unique(&format!("chain-{level}"));
        new_scope(&id, Some(&parent))?;
        ids.push(id.clone());
        parent = id;
    }

    enter(&ids[10])?;
    register("Chain.Value", 10)?;

    enter(&ids[49])?;
    assert_eq!(resolve_number("Chain.Value")?, 10);

    enter(&ids[9])?;
    assert!(resolve_number("Chain.Value").unwrap_err().is_unknown_dependency());
    Ok(())
}

#[test]
fn test_duplicate_registration_in_same_scope() -> Result<()> {
    InitScopesCommand::new().execute()?;
    let id = unique("dup");
    new_scope(&id, None)?;
    enter(&id)?;

    register("Game.Speed", 1)?;
    let error = register("Game.Speed", 2).unwrap_err();
    assert!(matches!(
        error,
        IocError::DuplicateRegistration { ref key, ref scope_id } if key == "Game.Speed" && *scope_id == id
    ));
    assert_eq!(resolve_number("Game.Speed")?, 1);
    Ok(())
}

#[test]
fn test_child_shadow_is_invisible_to_parent_and_sibling() -> Result<()> {
    InitScopesCommand::new().execute()?;
    let parent = unique("parent");
    let child = unique("child");
    let sibling = unique("sibling");
    new_scope(&parent, Some(keys::ROOT_SCOPE_ID))?;
    new_scope(&child, Some(&parent))?;
    new_scope(&sibling, Some(&parent))?;

    enter(&parent)?;
    register("K", 1)?;
    enter(&child)?;
    register("K", 2)?;

    assert_eq!(resolve_number("K")?, 2);
    enter(&parent)?;
    assert_eq!(resolve_number("K")?, 1);
    enter(&sibling)?;
    assert_eq!(resolve_number("K")?, 1);
    Ok(())
}

#[test]
fn test_new_scope_without_parent_uses_callers_current_scope() -> Result<()> {
    InitScopesCommand::new().execute()?;
    let session = unique("session");
    let nested = unique("nested");

    new_scope(&session, None)?;
    enter(&session)?;
    let scope = new_scope(&nested, None)?;

    assert_eq!(scope.parent().map(|parent| parent.id()), Some(session.as_str()));
    assert!(matches!(
        new_scope(&nested, None).unwrap_err().downcast::<IocError>()?,
        IocError::DuplicateScope { .. }
    ));
    Ok(())
}

#[test]
fn test_current_scope_is_independent_across_100_threads() -> Result<()> {
    InitScopesCommand::new().execute()?;
    const THREADS: usize = 100;
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|index| {
            let barrier = barrier.clone();
            thread::spawn(move || -> Result<(i32, String)> {
                let id = unique(&format!("context-{index}"));
                new_scope(&id, Some(keys::ROOT_SCOPE_ID))?;
                enter(&id)?;
                register("Context.Value", index as i32)?;

                // 全部线程都完成注册后再读取
                barrier.wait();
                let current = Ioc::resolve::<Scope>(keys::SCOPES_CURRENT, &[])?;
                assert_eq!(current.id(), id);
                Ok((resolve_number("Context.Value")?, id))
            })
        })
        .collect();

    for (index, handle) in handles.into_iter().enumerate() {
        let (number, _) = handle.join().expect("context thread panicked")?;
        assert_eq!(number, index as i32);
    }
    Ok(())
}

#[test]
fn test_fresh_thread_resolves_against_root() -> Result<()> {
    InitScopesCommand::new().execute()?;

    let (current, registration) = thread::spawn(|| {
        let current = Ioc::resolve::<Scope>(keys::SCOPES_CURRENT, &[]).map(|scope| scope.id().to_string());
        let registration = register("Orphan.Key", 1);
        (current, registration)
    })
    .join()
    .expect("thread panicked");

    assert_eq!(current?, keys::ROOT_SCOPE_ID);
    assert!(matches!(registration, Err(IocError::NoCurrentScope { .. })));
    Ok(())
}

#[test]
fn test_unknown_dependency_and_root_short_circuit() -> Result<()> {
    InitScopesCommand::new().execute()?;
    let id = unique("lookup");
    new_scope(&id, None)?;
    enter(&id)?;

    let error = Ioc::resolve_dependency("Nowhere.Defined", &[]).unwrap_err();
    assert!(matches!(error, IocError::UnknownDependency { ref key } if key == "Nowhere.Defined"));

    let root = Ioc::resolve::<Scope>(keys::SCOPES_ROOT, &[])?;
    assert!(root.is_root());
    assert!(matches!(
        Ioc::resolve_dependency(keys::SCOPES_CURRENT_SET, &[value(unique("missing"))]),
        Err(IocError::ScopeNotFound { .. })
    ));
    Ok(())
}

#[test]
fn test_macro_command_aborts_on_first_failure() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let step = |name: &'static str, fail: bool| -> CommandRef {
        let trace = trace.clone();
        Arc::new(LambdaCommand::named(name, move || {
            trace.lock().push(name);
            if fail {
                Err(IocError::command_failed(name, "Not enough fuel"))
            } else {
                Ok(())
            }
        }))
    };

    let command = MacroCommand::new(vec![step("ok", false), step("failing", true), step("ok3", false)]);
    let error = command.execute().unwrap_err();

    assert_eq!(*trace.lock(), vec!["ok", "failing"]);
    match error {
        IocError::CompositeFailure { source, message } => {
            assert!(matches!(*source, IocError::CommandFailed { ref command, .. } if command == "failing"));
            assert_eq!(message, source.to_string());
        }
        other => panic!("unexpected error: {other}"),
    }
}
