//! 操作构建器
//!
//! 将 `"<Operation>.Description"` 解析为有序的命令键列表，
//! 逐个以目标对象为参数解析命令，组合为一个宏命令。

use crate::commands::MacroCommand;
use crate::container::Ioc;
use ioc_common::{command_value, factory, Command, CommandRef, Dependency, Factory, IocError, IocResult};
use std::sync::Arc;
use tracing::debug;

/// 操作构建器
#[derive(Debug, Clone)]
pub struct OperationBuilder {
    operation: String,
}

impl OperationBuilder {
    /// 创建构建器
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    /// 描述键: `<Operation>.Description`，值类型为 `Vec<String>`
    pub fn description_key(&self) -> String {
        format!("{}.Description", self.operation)
    }

    /// 为目标对象构建操作命令
    pub fn build(&self, target: &Dependency) -> IocResult<MacroCommand> {
        let steps = Ioc::resolve::<Vec<String>>(&self.description_key(), &[])?;

        debug!("构建操作 {}: {:?}", self.operation, steps);
        steps
            .iter()
            .map(|key| Ioc::resolve_command(key, std::slice::from_ref(target)))
            .collect::<IocResult<Vec<CommandRef>>>()
            .map(MacroCommand::new)
    }

    /// 为目标对象构建并执行操作
    pub fn run(&self, target: &Dependency) -> IocResult<()> {
        self.build(target)?.execute()
    }

    /// 转换为 `(target) -> Command` 工厂，便于注册为 `<Operation>` 键
    pub fn into_factory(self) -> Factory {
        factory(move |args| {
            let target = args.first().ok_or_else(|| IocError::MissingArgument {
                key: self.operation.clone(),
                index: 0,
            })?;
            let command: CommandRef = Arc::new(self.build(target)?);
            Ok(command_value(command))
        })
    }
}
