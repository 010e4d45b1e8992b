//! 工作线程生命周期集成测试
//!
//! 通过 `Thread.*` 依赖驱动工作线程，验证硬停止、软停止与异常处理。

use anyhow::{anyhow, Result};
use ioc_impl::{
    command_value, keys, singleton, value, Command, CommandRef, ExceptionHandlerRef,
    HierarchicalScopeStrategy, InitScopesCommand, Ioc, IocError, LambdaCommand, Scope,
    StopReason, Worker, WorkerConfig, WorkerPlugin, WorkerState,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

fn enter(id: &str) -> Result<()> {
    Ioc::resolve_command(keys::SCOPES_CURRENT_SET, &[value(id.to_string())])?.execute()?;
    Ok(())
}

/// 创建应用作用域并安装工作线程插件，返回作用域 ID
fn app_scope() -> Result<String> {
    InitScopesCommand::new().execute()?;
    let strategy = HierarchicalScopeStrategy::global().ok_or_else(|| anyhow!("策略未安装"))?;

    let id = unique("app");
    Ioc::resolve::<Scope>(keys::SCOPES_NEW, &[value(id.clone())])?;
    enter(&id)?;
    WorkerPlugin::new(strategy.registry(), WorkerConfig::default()).execute()?;
    Ok(id)
}

/// 在应用作用域中启动工作线程，启动后当前作用域即为工作线程作用域
fn start_worker(app: &str) -> Result<Arc<Worker>> {
    enter(app)?;
    let id = unique("worker");
    Ioc::resolve_command(keys::THREAD_START, &[value(id)])?.execute()?;
    Ok(Ioc::resolve::<Worker>(keys::THREAD, &[])?)
}

/// 阻塞工作线程直到放行，使随后投递的命令都排在队列中
fn blocking_gate(executed: &Arc<Mutex<Vec<&'static str>>>) -> (CommandRef, mpsc::Sender<()>) {
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = Mutex::new(release_rx);
    let executed = executed.clone();
    let command: CommandRef = Arc::new(LambdaCommand::named("Gate", move || {
        let _ = release_rx.lock().recv();
        executed.lock().push("gate");
        Ok(())
    }));
    (command, release_tx)
}

fn record(executed: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> CommandRef {
    let executed = executed.clone();
    Arc::new(LambdaCommand::named(name, move || {
        executed.lock().push(name);
        Ok(())
    }))
}

fn put(command: CommandRef) -> Result<(), IocError> {
    Ioc::resolve_command(keys::THREAD_PUT, &[command_value(command)])?.execute()
}

fn wait_until(deadline: Duration, condition: impl Fn() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn test_hard_stop_prevents_later_commands() -> Result<()> {
    let app = app_scope()?;
    let worker = start_worker(&app)?;
    let executed = Arc::new(Mutex::new(Vec::new()));

    for index in 1..=10 {
        let executed = executed.clone();
        put(Arc::new(LambdaCommand::new(move || {
            executed.lock().push(index);
            if index == 3 {
                // 在工作线程内部按工作线程作用域解析
                Ioc::resolve_command(keys::THREAD_HARD_STOP, &[])?.execute()?;
            }
            Ok(())
        })))?;
    }

    worker.join()?;
    assert_eq!(*executed.lock(), vec![1, 2, 3]);
    assert_eq!(worker.state(), WorkerState::Stopped(StopReason::Hard));
    Ok(())
}

#[test]
fn test_soft_stop_drains_queued_commands() -> Result<()> {
    let app = app_scope()?;
    let worker = start_worker(&app)?;
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..200 {
        let counter = counter.clone();
        put(Arc::new(LambdaCommand::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })))?;
    }
    Ioc::resolve_command(keys::THREAD_SOFT_STOP, &[])?.execute()?;
    worker.join()?;

    assert_eq!(counter.load(Ordering::SeqCst), 200);
    assert_eq!(worker.state(), WorkerState::Stopped(StopReason::Drained));
    Ok(())
}

#[test]
fn test_repeating_command_runs_until_stopped() -> Result<()> {
    let app = app_scope()?;
    let worker = start_worker(&app)?;
    let ticks = Arc::new(AtomicUsize::new(0));

    let counter = ticks.clone();
    let tick: CommandRef = Arc::new(LambdaCommand::named("Tick", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(1));
        Ok(())
    }));
    Ioc::resolve_command(keys::THREAD_PUT_WITH_REPEAT, &[command_value(tick)])?.execute()?;

    assert!(wait_until(Duration::from_secs(5), || ticks.load(Ordering::SeqCst) >= 3));
    Ioc::resolve_command(keys::THREAD_HARD_STOP, &[])?.execute()?;
    worker.join()?;

    let stopped_at = ticks.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(20));
    assert_eq!(ticks.load(Ordering::SeqCst), stopped_at);
    Ok(())
}

#[test]
fn test_exception_handler_from_app_scope_receives_failures() -> Result<()> {
    let app = app_scope()?;
    let failures = Arc::new(Mutex::new(Vec::<String>::new()));
    let recorder = failures.clone();
    let handler: ExceptionHandlerRef =
        Arc::new(move |command: &CommandRef, error: IocError| -> Result<(), IocError> {
            if let IocError::CommandExecution { source, .. } = error {
                recorder.lock().push(format!("{}: {}", command.name(), source));
            }
            Ok(())
        });
    Ioc::register(keys::EXCEPTION_HANDLER, singleton(value(handler)))?.execute()?;

    let worker = start_worker(&app)?;
    let survived = Arc::new(AtomicUsize::new(0));
    put(Arc::new(LambdaCommand::named("Move", || {
        Err(IocError::command_failed("Move", "Not enough fuel"))
    })))?;
    let counter = survived.clone();
    put(Arc::new(LambdaCommand::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })))?;
    Ioc::resolve_command(keys::THREAD_SOFT_STOP, &[])?.execute()?;
    worker.join()?;

    assert_eq!(
        *failures.lock(),
        vec!["Move: 命令执行失败: Move, 原因: Not enough fuel".to_string()]
    );
    assert_eq!(survived.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_workers_share_hierarchy_but_keep_own_scope() -> Result<()> {
    let app = app_scope()?;
    Ioc::register("Session.Name", singleton(value("shared".to_string())))?.execute()?;

    let first = start_worker(&app)?;
    let second = start_worker(&app)?;
    let seen = Arc::new(Mutex::new(Vec::new()));

    for worker in [&first, &second] {
        let seen = seen.clone();
        let expected = worker.id().to_string();
        enter(worker.id())?;
        put(Arc::new(LambdaCommand::new(move || {
            let me = Ioc::resolve::<Worker>(keys::THREAD, &[])?;
            let name = Ioc::resolve::<String>("Session.Name", &[])?;
            seen.lock().push((me.id() == expected, name.as_str().to_string()));
            Ok(())
        })))?;
        Ioc::resolve_command(keys::THREAD_SOFT_STOP, &[])?.execute()?;
    }

    first.join()?;
    second.join()?;
    let seen = seen.lock();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|(own, name)| *own && name == "shared"));
    Ok(())
}

#[test]
fn test_start_does_not_block_and_is_not_restarted() -> Result<()> {
    let app = app_scope()?;
    enter(&app)?;
    let id = unique("once");
    let start = Ioc::resolve_command(keys::THREAD_START, &[value(id.clone())])?;
    start.execute()?;
    enter(&app)?;
    start.execute()?;

    let scope = Ioc::resolve::<Scope>(keys::SCOPES_CURRENT, &[])?;
    assert_eq!(scope.id(), id);

    let worker = Ioc::resolve::<Worker>(keys::THREAD, &[])?;
    assert!(wait_until(Duration::from_secs(5), || worker.state() == WorkerState::Running));
    worker.request_soft_stop();
    worker.join()?;
    assert!(worker.is_finished());
    Ok(())
}

#[test]
fn test_queued_hard_stop_skips_commands_behind_it() -> Result<()> {
    let app = app_scope()?;
    enter(&app)?;
    Ioc::resolve_command(keys::THREAD_START, &[value(unique("queued-hard"))])?.execute()?;

    let executed = Arc::new(Mutex::new(Vec::new()));
    let (gate, release) = blocking_gate(&executed);
    put(gate)?;
    put(record(&executed, "first"))?;
    put(Ioc::resolve_command(keys::THREAD_HARD_STOP, &[])?)?;
    put(record(&executed, "second"))?;
    release.send(())?;

    let worker = Ioc::resolve::<Worker>(keys::THREAD, &[])?;
    worker.join()?;

    assert_eq!(*executed.lock(), vec!["gate", "first"]);
    assert_eq!(worker.state(), WorkerState::Stopped(StopReason::Hard));
    Ok(())
}

#[test]
fn test_queued_soft_stop_runs_commands_behind_it() -> Result<()> {
    let app = app_scope()?;
    enter(&app)?;
    Ioc::resolve_command(keys::THREAD_START, &[value(unique("queued-soft"))])?.execute()?;

    let executed = Arc::new(Mutex::new(Vec::new()));
    let (gate, release) = blocking_gate(&executed);
    put(gate)?;
    put(record(&executed, "first"))?;
    put(Ioc::resolve_command(keys::THREAD_SOFT_STOP, &[])?)?;
    put(record(&executed, "second"))?;
    release.send(())?;

    let worker = Ioc::resolve::<Worker>(keys::THREAD, &[])?;
    worker.join()?;

    assert_eq!(*executed.lock(), vec!["gate", "first", "second"]);
    assert_eq!(worker.state(), WorkerState::Stopped(StopReason::Drained));
    Ok(())
}
