//! # 示例应用程序
//!
//! 演示在 IoC 工作线程上驱动一个简单的游戏循环：
//! 通过适配器移动飞船，按硬停止或软停止方式结束循环。

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ioc_composition::RuntimeBuilder;
use ioc_impl::{
    arg, command_value, factory, keys, value, Command, CommandRef, Dependency, Ioc, IocResult,
    LambdaCommand, MacroCommand, Worker,
};
use ioc_macros::adapter;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

type Vector = (i64, i64);

/// 停止方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StopMode {
    /// 执行完当前命令后立即退出，丢弃剩余命令
    Hard,
    /// 执行完队列中的全部命令后退出
    Soft,
}

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "IoC 工作线程示例应用")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 游戏循环的步数
    #[arg(short, long, default_value_t = 5)]
    ticks: usize,

    /// 停止方式
    #[arg(long, value_enum, default_value_t = StopMode::Soft)]
    stop: StopMode,
}

#[adapter(name = "IMovable")]
pub trait Movable {
    fn get_position(&self) -> IocResult<Vector>;
    fn set_position(&self, value: Vector) -> IocResult<()>;
    fn get_velocity(&self) -> IocResult<Vector>;
}

/// 飞船
#[derive(Debug)]
struct Ship {
    position: Mutex<Vector>,
    velocity: Vector,
}

/// 移动命令
struct MoveCommand(MovableAdapter);

impl Command for MoveCommand {
    fn execute(&self) -> IocResult<()> {
        let (x, y) = self.0.get_position()?;
        let (dx, dy) = self.0.get_velocity()?;
        self.0.set_position((x + dx, y + dy))
    }

    fn name(&self) -> &str {
        "MoveCommand"
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = RuntimeBuilder::new().with_logging(true).app_scope_id("game");
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    let runtime = builder.build().context("构建 IoC 运行时失败")?;
    info!("启动示例应用，停止方式: {:?}", args.stop);

    register_ship_properties()?;
    let ship: Dependency = Arc::new(Ship {
        position: Mutex::new((12, 5)),
        velocity: (-7, 3),
    });

    let worker = runtime.start_worker("game-loop")?;
    let ticks = Arc::new(AtomicUsize::new(0));
    match args.stop {
        StopMode::Hard => {
            let tick = tick_command(ship.clone(), ticks.clone(), Some(args.ticks));
            run_until_hard_stop(&worker, tick)?;
        }
        StopMode::Soft => {
            let tick = tick_command(ship.clone(), ticks.clone(), None);
            run_until_soft_stop(&worker, tick, args.ticks)?;
        }
    }
    worker.join()?;

    let position = MovableAdapter::new(ship).get_position()?;
    info!(
        "游戏循环结束，执行步数: {}，飞船位置: {:?}",
        ticks.load(Ordering::SeqCst),
        position
    );
    Ok(())
}

/// 注册飞船属性的访问依赖
fn register_ship_properties() -> Result<()> {
    Ioc::register(
        "IMovable:position.get",
        factory(|args| {
            let ship = arg::<Ship>(args, 0, "IMovable:position.get")?;
            let position = *ship.position.lock();
            Ok(value(position))
        }),
    )?
    .execute()?;

    Ioc::register(
        "IMovable:position.set",
        factory(|args| {
            let ship = arg::<Ship>(args, 0, "IMovable:position.set")?;
            let position = *arg::<Vector>(args, 1, "IMovable:position.set")?;
            let command: CommandRef = Arc::new(LambdaCommand::named("SetPosition", move || {
                *ship.position.lock() = position;
                Ok(())
            }));
            Ok(command_value(command))
        }),
    )?
    .execute()?;

    Ioc::register(
        "IMovable:velocity.get",
        factory(|args| {
            let ship = arg::<Ship>(args, 0, "IMovable:velocity.get")?;
            Ok(value(ship.velocity))
        }),
    )?
    .execute()?;
    Ok(())
}

/// 一步游戏循环：移动飞船并计数
///
/// 指定 `stop_after` 时，达到该步数后请求硬停止。
fn tick_command(ship: Dependency, ticks: Arc<AtomicUsize>, stop_after: Option<usize>) -> CommandRef {
    let movement: CommandRef = Arc::new(MoveCommand(MovableAdapter::new(ship)));
    let counter: CommandRef = Arc::new(LambdaCommand::named("CountTick", move || {
        let done = ticks.fetch_add(1, Ordering::SeqCst) + 1;
        info!("第 {} 步完成", done);
        if stop_after.is_some_and(|limit| done >= limit) {
            // 当前线程的作用域为工作线程作用域
            Ioc::resolve_command(keys::THREAD_HARD_STOP, &[])?.execute()?;
        }
        Ok(())
    }));
    Arc::new(MacroCommand::new(vec![movement, counter]))
}

/// 以重复命令驱动循环，由最后一步请求硬停止
fn run_until_hard_stop(worker: &Worker, tick: CommandRef) -> Result<()> {
    worker
        .scope()
        .resolve_command(keys::THREAD_PUT_WITH_REPEAT, &[command_value(tick)])?
        .execute()?;
    Ok(())
}

/// 逐条放入命令后请求软停止，队列排空后退出
fn run_until_soft_stop(worker: &Worker, tick: CommandRef, ticks: usize) -> Result<()> {
    for _ in 0..ticks {
        worker.put(tick.clone())?;
    }
    worker
        .scope()
        .resolve_command(keys::THREAD_SOFT_STOP, &[])?
        .execute()?;
    Ok(())
}
