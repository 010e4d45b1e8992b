//! 通用命令
//!
//! 宏命令、闭包命令、重试命令与日志命令。

use ioc_common::{Command, CommandRef, IocError, IocResult};
use tracing::{debug, error, warn};

/// 闭包命令
pub struct LambdaCommand {
    name: String,
    action: Box<dyn Fn() -> IocResult<()> + Send + Sync>,
}

impl LambdaCommand {
    /// 从闭包创建命令
    pub fn new<F>(action: F) -> Self
    where
        F: Fn() -> IocResult<()> + Send + Sync + 'static,
    {
        Self::named("LambdaCommand", action)
    }

    /// 从闭包创建带名称的命令
    pub fn named<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn() -> IocResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            action: Box::new(action),
        }
    }
}

impl Command for LambdaCommand {
    fn execute(&self) -> IocResult<()> {
        (self.action)()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for LambdaCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LambdaCommand").field("name", &self.name).finish()
    }
}

/// 宏命令
///
/// 按顺序执行子命令。遇到第一个失败立即中止，后续子命令不再执行，
/// 返回包装了原始错误的 [`IocError::CompositeFailure`]。
/// 已执行子命令的副作用不会回滚。
#[derive(Debug, Clone, Default)]
pub struct MacroCommand {
    commands: Vec<CommandRef>,
}

impl MacroCommand {
    /// 创建宏命令
    pub fn new(commands: Vec<CommandRef>) -> Self {
        Self { commands }
    }

    /// 子命令数量
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// 是否没有子命令
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Command for MacroCommand {
    fn execute(&self) -> IocResult<()> {
        for (index, command) in self.commands.iter().enumerate() {
            if let Err(source) = command.execute() {
                debug!(
                    "宏命令在第 {} 个子命令 {} 处中止，跳过 {} 个",
                    index + 1,
                    command.name(),
                    self.commands.len() - index - 1
                );
                return Err(IocError::composite(source));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MacroCommand"
    }
}

impl FromIterator<CommandRef> for MacroCommand {
    fn from_iter<I: IntoIterator<Item = CommandRef>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// 重试命令
///
/// 内部命令失败后重新执行，最多执行 `attempts` 次；全部失败时返回最后一次的错误。
#[derive(Debug, Clone)]
pub struct RetryCommand {
    inner: CommandRef,
    attempts: usize,
}

impl RetryCommand {
    /// 默认执行次数（首次执行加一次重试）
    pub const DEFAULT_ATTEMPTS: usize = 2;

    /// 创建重试命令
    pub fn new(inner: CommandRef) -> Self {
        Self::with_attempts(inner, Self::DEFAULT_ATTEMPTS)
    }

    /// 指定最大执行次数，至少执行一次
    pub fn with_attempts(inner: CommandRef, attempts: usize) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
        }
    }

    /// 最大执行次数
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl Command for RetryCommand {
    fn execute(&self) -> IocResult<()> {
        let mut attempt = 1;
        loop {
            match self.inner.execute() {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.attempts => {
                    warn!(
                        "命令 {} 第 {} 次执行失败，重试: {}",
                        self.inner.name(),
                        attempt,
                        e
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        "RetryCommand"
    }
}

/// 日志命令，记录一次命令失败
#[derive(Debug, Clone)]
pub struct LogCommand {
    command: String,
    message: String,
}

impl LogCommand {
    /// 创建日志命令
    pub fn new(command: &CommandRef, error: &IocError) -> Self {
        Self {
            command: command.name().to_string(),
            message: error.to_string(),
        }
    }
}

impl Command for LogCommand {
    fn execute(&self) -> IocResult<()> {
        error!("命令 {} 执行失败: {}", self.command, self.message);
        Ok(())
    }

    fn name(&self) -> &str {
        "LogCommand"
    }
}
