//! 驱动层模块
//!
//! 本模块提供 Kestrel 双臂 UDP 控制链路的驱动功能，包括：
//! - 链路生命周期管理（打开/关闭，有界时间的关闭序列）
//! - 后台反馈接收线程（非阻塞轮询）
//! - 状态同步（ArcSwap 无锁快照读取 + 原子协调标志）
//! - 经过时间时钟（数据包时间戳来源）
//! - 反馈数据日志（制表符分隔的追加文件）
//!
//! # 使用场景
//!
//! 上位机轨迹/控制器进程通过 [`Kestrel`] 以应用自选的频率发送
//! 控制参考，同时独立地读取最新反馈快照。

mod builder;
mod clock;
mod config;
mod datalog;
mod error;
mod rx;
pub mod state;

mod kestrel;

pub use builder::KestrelBuilder;
pub use clock::ElapsedClock;
pub use config::LinkConfig;
pub use error::DriverError;
pub use kestrel::Kestrel;
pub use state::{FeedbackState, LinkContext, LinkMetrics, MetricsSnapshot};
