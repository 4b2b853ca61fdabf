//! 共享反馈状态与协调标志
//!
//! 调用方线程与后台接收线程之间共享的全部状态都集中在
//! [`LinkContext`] 中：
//! - 反馈快照通过 `ArcSwap` 整体替换发布，读取方永远看到
//!   一致的完整记录，不存在撕裂读取
//! - 三个协调标志是独立的 `AtomicBool`
//! - 计数器用于丢弃/接收统计

use arc_swap::ArcSwap;
use kestrel_protocol::FeedbackPacket;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// 最新反馈快照
///
/// 后台接收线程在每个被接受的数据报上构建一个全新实例并整体发布。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedbackState {
    /// 解码后的反馈数据包
    pub feedback: FeedbackPacket,
    /// 接受该数据包时的经过时间（秒）
    pub t_last_update: f32,
    /// 最近两次接受的数据包之间的间隔（秒）
    pub dt_update: f32,
}

/// 链路性能计数器（原子，无锁）
#[derive(Debug, Default)]
pub struct LinkMetrics {
    /// 成功接受并发布的反馈数据报数
    pub rx_packets: AtomicU64,
    /// 因长度不符被丢弃的数据报数
    pub rx_dropped_bad_size: AtomicU64,
    /// 接收 socket 错误次数（瞬态，循环继续）
    pub rx_errors: AtomicU64,
}

/// 计数器快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub rx_packets: u64,
    pub rx_dropped_bad_size: u64,
    pub rx_errors: u64,
}

impl LinkMetrics {
    /// 获取当前所有计数器的快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rx_packets: self.rx_packets.load(Ordering::Relaxed),
            rx_dropped_bad_size: self.rx_dropped_bad_size.load(Ordering::Relaxed),
            rx_errors: self.rx_errors.load(Ordering::Relaxed),
        }
    }
}

/// 共享状态上下文
///
/// 标志的写入方：
/// - `terminate`: 调用方写（`close`），接收线程读
/// - `feedback_received` / `rx_terminated`: 接收线程写，调用方读
///
/// `rx_terminated` 是接收线程退出前的最后一次写入（Release），
/// 也是 `close` 等待的唯一信号。
#[derive(Debug)]
pub struct LinkContext {
    /// 最新反馈快照（无锁读取）
    pub feedback: ArcSwap<FeedbackState>,
    /// 至少收到过一个有效反馈数据报
    pub feedback_received: AtomicBool,
    /// 请求接收线程终止
    pub terminate: AtomicBool,
    /// 接收线程已退出（日志已关闭，socket 已释放）
    pub rx_terminated: AtomicBool,
    /// 性能计数器
    pub metrics: LinkMetrics,
}

impl LinkContext {
    /// 创建初始上下文（全零反馈，所有标志复位）
    pub fn new() -> Self {
        Self {
            feedback: ArcSwap::from_pointee(FeedbackState::default()),
            feedback_received: AtomicBool::new(false),
            terminate: AtomicBool::new(false),
            rx_terminated: AtomicBool::new(false),
            metrics: LinkMetrics::default(),
        }
    }

    /// 发布一个新的反馈快照并置位接收标志
    pub(crate) fn publish_feedback(&self, state: FeedbackState) {
        self.feedback.store(Arc::new(state));
        self.metrics.rx_packets.fetch_add(1, Ordering::Relaxed);
        self.feedback_received.store(true, Ordering::Release);
    }
}

impl Default for LinkContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_initial_state() {
        let ctx = LinkContext::new();
        assert!(!ctx.feedback_received.load(Ordering::Acquire));
        assert!(!ctx.terminate.load(Ordering::Acquire));
        assert!(!ctx.rx_terminated.load(Ordering::Acquire));

        let state = ctx.feedback.load();
        assert_eq!(state.feedback.p_l, [0.0; 3]);
        assert_eq!(state.t_last_update, 0.0);
    }

    #[test]
    fn test_publish_feedback_updates_snapshot_and_flag() {
        let ctx = LinkContext::new();
        let state = FeedbackState {
            feedback: FeedbackPacket {
                p_l: [0.1, 0.2, 0.3],
                ..Default::default()
            },
            t_last_update: 1.5,
            dt_update: 0.01,
        };

        ctx.publish_feedback(state.clone());

        assert!(ctx.feedback_received.load(Ordering::Acquire));
        assert_eq!(*ctx.feedback.load().as_ref(), state);
        assert_eq!(ctx.metrics.snapshot().rx_packets, 1);
    }

    #[test]
    fn test_metrics_snapshot() {
        let metrics = LinkMetrics::default();
        metrics.rx_dropped_bad_size.fetch_add(3, Ordering::Relaxed);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.rx_packets, 0);
        assert_eq!(snapshot.rx_dropped_bad_size, 3);
        assert_eq!(snapshot.rx_errors, 0);
    }
}
