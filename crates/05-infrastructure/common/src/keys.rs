//! 约定的依赖键

/// 切换解析策略，不依赖任何已安装的策略即可解析
pub const IOC_SETUP_STRATEGY: &str = "IoC.SetupStrategy";
/// 在当前作用域注册依赖: `(key: String, factory: Factory) -> Command`
pub const IOC_REGISTER: &str = "IoC.Register";

/// 根作用域，无需设置当前作用域即可解析
pub const SCOPES_ROOT: &str = "Scopes.Root";
/// 创建作用域: `(id: String, parent_id: Option<String>) -> Scope`
pub const SCOPES_NEW: &str = "Scopes.New";
/// 调用方当前作用域，未设置时为根作用域
pub const SCOPES_CURRENT: &str = "Scopes.Current";
/// 设置调用方当前作用域: `(id: String) -> Command`
pub const SCOPES_CURRENT_SET: &str = "Scopes.Current.Set";
/// 清除除根作用域外的全部作用域（仅用于测试）
pub const SCOPES_CLEAR: &str = "Scopes.Clear";

/// 命令执行失败时调用的异常处理器
pub const EXCEPTION_HANDLER: &str = "ExceptionHandler";

/// 启动工作线程: `(id: String) -> Command`
pub const THREAD_START: &str = "Thread.Start";
/// 当前作用域所属的工作线程
pub const THREAD: &str = "Thread";
/// 向工作线程队列投递命令: `(command) -> Command`
pub const THREAD_PUT: &str = "Thread.Put";
/// 投递每次成功后自动重新入队的命令: `(command) -> Command`
pub const THREAD_PUT_WITH_REPEAT: &str = "Thread.PutWithRepeat";
/// 请求立即停止: `() -> Command`
pub const THREAD_HARD_STOP: &str = "Thread.HardStop";
/// 请求排空队列后停止: `() -> Command`
pub const THREAD_SOFT_STOP: &str = "Thread.SoftStop";

/// 根作用域默认 ID
pub const ROOT_SCOPE_ID: &str = "ROOT";
