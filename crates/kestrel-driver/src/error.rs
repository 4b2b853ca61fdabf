//! 驱动层错误类型定义

use kestrel_link::LinkError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// UDP 链路错误
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// 配置无效（缺少必填项或取值非法）
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// 接口未打开或已关闭
    #[error("Link is not open")]
    NotOpen,

    /// 接收线程启动失败
    #[error("RX thread error: {0}")]
    RxThread(String),

    /// 关闭时接收线程未在限定时间内确认退出
    ///
    /// 非致命：调用方仍可退出，但接收线程可能被泄漏。
    #[error("RX thread did not confirm termination within the shutdown timeout")]
    ShutdownTimeout,

    /// 操作超时
    #[error("Operation timeout")]
    Timeout,
}
