//! 基于队列的命令执行工作线程
//!
//! 每个工作线程独占一个命令队列的消费端，并在自己的子作用域中注册
//! `Thread.Put`、`Thread.PutWithRepeat`、`Thread.HardStop`、`Thread.SoftStop` 与 `Thread`。
//!
//! 循环每一轮：
//! 1. 已请求硬停止：立即退出，队列中剩余命令被丢弃
//! 2. 已请求软停止：非阻塞取命令，队列为空则退出
//! 3. 否则阻塞等待下一个命令
//! 4. 重新设置当前作用域为工作线程作用域
//! 5. 执行命令，错误交给 `ExceptionHandler`，处理器自身的失败只记录日志
//!
//! 停止是协作式的：硬停止不会中断正在执行的命令，只阻止下一个命令开始。

use crate::context::{RegisterDependencyCommand, SetCurrentScopeCommand};
use crate::handler::LoggingExceptionHandler;
use crate::registry::{upgrade, ScopeRegistry};
use crate::scope::Scope;
use ioc_abstractions::{CommandSink, ExceptionHandlerRef};
use ioc_common::{
    arg, command_arg, command_value, factory, keys, Command, CommandRef, Dependency, IocError,
    IocResult, StopReason, WorkerConfig, WorkerState,
};
use once_cell::sync::OnceCell;
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle, ThreadId};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

/// 队列元素
enum Envelope {
    /// 待执行的命令
    Run(CommandRef),
    /// 唤醒阻塞中的消费端，使其重新检查停止标志
    Wake,
}

/// 工作线程队列的投递端
///
/// 可克隆，可在任意线程投递，投递不阻塞。
#[derive(Clone)]
pub struct WorkerQueue {
    worker_id: String,
    sender: UnboundedSender<Envelope>,
}

impl WorkerQueue {
    /// 所属工作线程 ID
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    fn wake(&self) {
        // 消费端已退出时无需唤醒
        let _ = self.sender.send(Envelope::Wake);
    }
}

impl CommandSink for WorkerQueue {
    fn put(&self, command: CommandRef) -> IocResult<()> {
        if let Err(rejected) = self.sender.send(Envelope::Run(command)) {
            if let Envelope::Run(command) = rejected.0 {
                warn!(
                    "工作线程 {} 已退出，丢弃命令: {}",
                    self.worker_id,
                    command.name()
                );
            }
        }
        Ok(())
    }
}

impl fmt::Debug for WorkerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerQueue")
            .field("worker_id", &self.worker_id)
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

/// 工作线程
pub struct Worker {
    id: String,
    scope: Arc<Scope>,
    queue: WorkerQueue,
    hard_stop: AtomicBool,
    soft_stop: AtomicBool,
    state: Mutex<WorkerState>,
    stopped: Condvar,
    handle: Mutex<Option<JoinHandle<()>>>,
    thread_id: OnceCell<ThreadId>,
}

impl Worker {
    /// 启动工作线程
    ///
    /// 以调用线程的当前作用域为父创建 ID 为 `id` 的子作用域，在其中注册线程相关依赖，
    /// 然后在新线程中运行消费循环。立即返回，不等待循环开始。
    /// 调用线程的当前作用域保持不变。线程创建失败时子作用域会被移除。
    pub fn start(id: &str, registry: &ScopeRegistry, config: &WorkerConfig) -> IocResult<Arc<Self>> {
        let scope = registry.new_scope(id, None)?;
        Self::spawn(id, scope, config).map_err(|e| {
            registry.remove(id);
            e
        })
    }

    fn spawn(id: &str, scope: Arc<Scope>, config: &WorkerConfig) -> IocResult<Arc<Self>> {
        let (sender, receiver) = mpsc::unbounded_channel();

        let worker = Arc::new(Self {
            id: id.to_string(),
            scope,
            queue: WorkerQueue {
                worker_id: id.to_string(),
                sender,
            },
            hard_stop: AtomicBool::new(false),
            soft_stop: AtomicBool::new(false),
            state: Mutex::new(WorkerState::Created),
            stopped: Condvar::new(),
            handle: Mutex::new(None),
            thread_id: OnceCell::new(),
        });
        worker.register_dependencies()?;

        let mut builder = thread::Builder::new().name(config.thread_name(id));
        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let runner = worker.clone();
        let handle = builder
            .spawn(move || runner.run(receiver))
            .map_err(|source| IocError::WorkerSpawnFailed {
                worker_id: id.to_string(),
                source,
            })?;
        let _ = worker.thread_id.set(handle.thread().id());
        *worker.handle.lock() = Some(handle);

        info!(
            "工作线程已启动: {} (父作用域: {:?})",
            id,
            worker.scope.parent().map(|parent| parent.id())
        );
        Ok(worker)
    }

    /// 工作线程 ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 工作线程作用域
    pub fn scope(&self) -> &Arc<Scope> {
        &self.scope
    }

    /// 队列投递端
    pub fn queue(&self) -> &WorkerQueue {
        &self.queue
    }

    /// 投递命令
    pub fn put(&self, command: CommandRef) -> IocResult<()> {
        self.queue.put(command)
    }

    /// 当前生命周期状态
    pub fn state(&self) -> WorkerState {
        *self.state.lock()
    }

    /// 循环是否已退出，可用于带截止时间的轮询
    pub fn is_finished(&self) -> bool {
        self.state().is_stopped()
    }

    /// 请求硬停止，可重复调用
    pub fn request_hard_stop(&self) {
        if !self.hard_stop.swap(true, Ordering::SeqCst) {
            info!("工作线程 {} 收到硬停止请求", self.id);
        }
        self.queue.wake();
    }

    /// 请求软停止，可重复调用
    pub fn request_soft_stop(&self) {
        if !self.soft_stop.swap(true, Ordering::SeqCst) {
            info!("工作线程 {} 收到软停止请求", self.id);
        }
        self.queue.wake();
    }

    /// 等待工作线程结束
    ///
    /// 可在多个线程中同时调用，每个调用都在循环退出后才返回。不能在工作线程自身中调用。
    pub fn join(&self) -> IocResult<()> {
        if self.thread_id.get() == Some(&thread::current().id()) {
            return Err(IocError::command_failed(
                format!("Worker({})::join", self.id),
                "工作线程不能等待自身结束",
            ));
        }

        // 只有一个调用方持有线程句柄，其余调用方等待停止通知
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            return handle.join().map_err(|_| {
                self.mark_stopped(StopReason::Hard);
                IocError::WorkerPanicked {
                    worker_id: self.id.clone(),
                }
            });
        }

        let mut state = self.state.lock();
        while !state.is_stopped() {
            self.stopped.wait(&mut state);
        }
        Ok(())
    }

    fn mark_stopped(&self, reason: StopReason) {
        let mut state = self.state.lock();
        if !state.is_stopped() {
            *state = WorkerState::Stopped(reason);
        }
        self.stopped.notify_all();
    }

    fn register_dependencies(self: &Arc<Self>) -> IocResult<()> {
        let queue = self.queue.clone();
        self.scope.register(
            keys::THREAD_PUT,
            factory(move |args| {
                let command = command_arg(args, 0, keys::THREAD_PUT)?;
                let enqueue: CommandRef = Arc::new(EnqueueCommand::new(queue.clone(), command));
                Ok(command_value(enqueue))
            }),
        )?;

        let queue = self.queue.clone();
        self.scope.register(
            keys::THREAD_PUT_WITH_REPEAT,
            factory(move |args| {
                let command = command_arg(args, 0, keys::THREAD_PUT_WITH_REPEAT)?;
                let repeating = RepeatingCommand::new(command, queue.clone());
                let enqueue: CommandRef = Arc::new(EnqueueCommand::new(queue.clone(), repeating));
                Ok(command_value(enqueue))
            }),
        )?;

        let worker = Arc::downgrade(self);
        self.scope.register(
            keys::THREAD_HARD_STOP,
            factory(move |_| {
                let command: CommandRef =
                    Arc::new(HardStopCommand(upgrade_worker(&worker, keys::THREAD_HARD_STOP)?));
                Ok(command_value(command))
            }),
        )?;

        let worker = Arc::downgrade(self);
        self.scope.register(
            keys::THREAD_SOFT_STOP,
            factory(move |_| {
                let command: CommandRef =
                    Arc::new(SoftStopCommand(upgrade_worker(&worker, keys::THREAD_SOFT_STOP)?));
                Ok(command_value(command))
            }),
        )?;

        let worker = Arc::downgrade(self);
        self.scope.register(
            keys::THREAD,
            factory(move |_| Ok(upgrade_worker(&worker, keys::THREAD)? as Dependency)),
        )
    }

    fn run(self: Arc<Self>, mut receiver: UnboundedReceiver<Envelope>) {
        let enter_scope = SetCurrentScopeCommand::new(self.scope.clone());
        *self.state.lock() = WorkerState::Running;
        debug!("工作线程 {} 进入循环", self.id);

        let reason = loop {
            if self.hard_stop.load(Ordering::SeqCst) {
                break StopReason::Hard;
            }

            let envelope = if self.soft_stop.load(Ordering::SeqCst) {
                match receiver.try_recv() {
                    Ok(envelope) => envelope,
                    Err(_) => break StopReason::Drained,
                }
            } else {
                match receiver.blocking_recv() {
                    Some(envelope) => envelope,
                    None => break StopReason::Drained,
                }
            };

            let command = match envelope {
                Envelope::Run(command) => command,
                Envelope::Wake => continue,
            };

            if let Err(error) = enter_scope.execute() {
                self.handle_failure(&command, error);
                continue;
            }
            self.execute(&command);
        };

        receiver.close();
        let mut discarded = 0_usize;
        while let Ok(envelope) = receiver.try_recv() {
            if matches!(envelope, Envelope::Run(_)) {
                discarded += 1;
            }
        }
        if discarded > 0 {
            warn!("工作线程 {} 退出，丢弃 {} 个未执行命令", self.id, discarded);
        }

        self.mark_stopped(reason);
        info!("工作线程已停止: {} ({})", self.id, self.state());
    }

    fn execute(&self, command: &CommandRef) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| command.execute()))
            .unwrap_or_else(|payload| {
                Err(IocError::command_failed(command.name(), panic_message(payload.as_ref())))
            });

        if let Err(error) = outcome {
            self.handle_failure(command, error);
        }
    }

    fn handle_failure(&self, command: &CommandRef, error: IocError) {
        let error = IocError::CommandExecution {
            worker_id: self.id.clone(),
            command: command.name().to_string(),
            source: Box::new(error),
        };
        debug!("{}", error);

        let handler = self.exception_handler();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(command, error)))
            .unwrap_or_else(|payload| {
                Err(IocError::command_failed(
                    keys::EXCEPTION_HANDLER,
                    panic_message(payload.as_ref()),
                ))
            });

        if let Err(source) = outcome {
            let failure = IocError::HandlerFailure {
                command: command.name().to_string(),
                source: Box::new(source),
            };
            error!("工作线程 {}: {}", self.id, failure);
        }
    }

    fn exception_handler(&self) -> ExceptionHandlerRef {
        match self
            .scope
            .resolve_as::<ExceptionHandlerRef>(keys::EXCEPTION_HANDLER, &[])
        {
            Ok(handler) => (*handler).clone(),
            Err(e) => {
                if !e.is_unknown_dependency() {
                    error!("工作线程 {} 解析异常处理器失败: {}", self.id, e);
                }
                Arc::new(LoggingExceptionHandler)
            }
        }
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("hard_stop", &self.hard_stop.load(Ordering::SeqCst))
            .field("soft_stop", &self.soft_stop.load(Ordering::SeqCst))
            .finish()
    }
}

/// 作用域中的依赖只弱引用工作线程，工作线程释放后解析失败
fn upgrade_worker(worker: &Weak<Worker>, key: &str) -> IocResult<Arc<Worker>> {
    worker
        .upgrade()
        .ok_or_else(|| IocError::command_failed(key, "工作线程已释放"))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic".to_string()
    }
}

/// 投递命令
#[derive(Debug, Clone)]
pub struct EnqueueCommand {
    queue: WorkerQueue,
    command: CommandRef,
}

impl EnqueueCommand {
    /// 创建命令
    pub fn new(queue: WorkerQueue, command: CommandRef) -> Self {
        Self { queue, command }
    }
}

impl Command for EnqueueCommand {
    fn execute(&self) -> IocResult<()> {
        self.queue.put(self.command.clone())
    }
}

/// 重复执行命令
///
/// 内部命令每次执行成功后把自身重新放回队尾；失败时不再重复。
pub struct RepeatingCommand {
    inner: CommandRef,
    queue: WorkerQueue,
    this: Weak<RepeatingCommand>,
}

impl RepeatingCommand {
    /// 创建命令
    pub fn new(inner: CommandRef, queue: WorkerQueue) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            inner,
            queue,
            this: this.clone(),
        })
    }
}

impl Command for RepeatingCommand {
    fn execute(&self) -> IocResult<()> {
        self.inner.execute()?;
        if let Some(this) = self.this.upgrade() {
            self.queue.put(this)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// 硬停止命令
#[derive(Debug)]
pub struct HardStopCommand(Arc<Worker>);

impl Command for HardStopCommand {
    fn execute(&self) -> IocResult<()> {
        self.0.request_hard_stop();
        Ok(())
    }
}

/// 软停止命令
#[derive(Debug)]
pub struct SoftStopCommand(Arc<Worker>);

impl Command for SoftStopCommand {
    fn execute(&self) -> IocResult<()> {
        self.0.request_soft_stop();
        Ok(())
    }
}

/// 启动工作线程命令
///
/// 启动后把调用线程的当前作用域切换为工作线程作用域，
/// 使后续的 `Thread.*` 解析直接指向该工作线程。重复执行不会再次启动。
pub struct StartWorkerCommand {
    id: String,
    registry: Arc<ScopeRegistry>,
    config: WorkerConfig,
    started: OnceCell<Arc<Worker>>,
}

impl StartWorkerCommand {
    /// 创建命令
    pub fn new(id: impl Into<String>, registry: Arc<ScopeRegistry>, config: WorkerConfig) -> Self {
        Self {
            id: id.into(),
            registry,
            config,
            started: OnceCell::new(),
        }
    }

    /// 已启动的工作线程
    pub fn worker(&self) -> Option<Arc<Worker>> {
        self.started.get().cloned()
    }
}

impl Command for StartWorkerCommand {
    fn execute(&self) -> IocResult<()> {
        let worker = self
            .started
            .get_or_try_init(|| Worker::start(&self.id, &self.registry, &self.config))?;
        SetCurrentScopeCommand::new(worker.scope().clone()).execute()
    }

    fn name(&self) -> &str {
        "StartWorkerCommand"
    }
}

/// 工作线程插件
///
/// 在当前作用域注册 `Thread.Start(id: String) -> Command`。
#[derive(Debug, Clone)]
pub struct WorkerPlugin {
    registry: Weak<ScopeRegistry>,
    config: WorkerConfig,
}

impl WorkerPlugin {
    /// 创建插件
    pub fn new(registry: &Arc<ScopeRegistry>, config: WorkerConfig) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            config,
        }
    }
}

impl Command for WorkerPlugin {
    fn execute(&self) -> IocResult<()> {
        let registry = self.registry.clone();
        let config = self.config.clone();
        let start = factory(move |args| {
            let id = arg::<String>(args, 0, keys::THREAD_START)?;
            let command: CommandRef = Arc::new(StartWorkerCommand::new(
                id.as_str(),
                upgrade(&registry)?,
                config.clone(),
            ));
            Ok(command_value(command))
        });

        RegisterDependencyCommand::new(keys::THREAD_START, start).execute()
    }

    fn name(&self) -> &str {
        "WorkerPlugin"
    }
}
