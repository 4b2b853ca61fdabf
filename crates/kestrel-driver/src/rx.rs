//! 后台反馈接收循环
//!
//! 每个打开的链路恰好有一个接收线程。循环形态刻意保持简单：
//! 每轮一次非阻塞接收尝试，然后睡一个轮询间隔——用 CPU 换实现
//! 复杂度，而不是事件驱动等待。反馈更新率因此以 1/poll_interval
//! 为上限。

use crate::clock::ElapsedClock;
use crate::datalog::FeedbackLog;
use crate::state::{FeedbackState, LinkContext};
use kestrel_link::{RX_BUFFER_SIZE, UdpRxSocket};
use kestrel_protocol::FeedbackPacket;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{error, trace, warn};

/// 接收线程主函数
///
/// 状态机：
/// - **Init**: 打开追加模式日志文件。失败则立即置位 `rx_terminated`
///   并退出，保证 `close` 不会挂起。
/// - **轮询循环**（退出条件：`terminate` 置位）：非阻塞接收一个
///   数据报；长度恰好等于反馈包大小时解码并发布，否则丢弃并计数。
/// - **Teardown**: 落盘并关闭日志，释放接收 socket（只在这里释放），
///   最后一步置位 `rx_terminated`。
pub(crate) fn rx_loop(
    socket: UdpRxSocket,
    ctx: Arc<LinkContext>,
    clock: ElapsedClock,
    log_path: PathBuf,
    poll_interval: Duration,
) {
    let mut log = match FeedbackLog::open(&log_path) {
        Ok(log) => log,
        Err(e) => {
            error!(path = %log_path.display(), error = %e, "could not open feedback data log");
            ctx.rx_terminated.store(true, Ordering::Release);
            return;
        },
    };

    let mut buf = [0u8; RX_BUFFER_SIZE];
    let mut log_write_failed = false;

    while !ctx.terminate.load(Ordering::Acquire) {
        match socket.try_recv(&mut buf) {
            Ok(Some(len)) => match FeedbackPacket::decode(&buf[..len]) {
                Ok(packet) => {
                    let now = clock.elapsed();
                    let previous = ctx.feedback.load();
                    let state = FeedbackState {
                        feedback: packet,
                        t_last_update: now,
                        dt_update: now - previous.t_last_update,
                    };
                    ctx.publish_feedback(state);

                    if let Err(e) = log.append(now, &packet)
                        && !log_write_failed
                    {
                        // 只警告一次，之后的写入失败静默跳过
                        warn!(error = %e, "feedback data log write failed");
                        log_write_failed = true;
                    }
                },
                Err(e) => {
                    // 长度不符的数据报：丢弃并计数，不向调用方报告
                    ctx.metrics.rx_dropped_bad_size.fetch_add(1, Ordering::Relaxed);
                    trace!(len, error = %e, "discarding datagram");
                },
            },
            Ok(None) => {},
            Err(e) => {
                // 瞬态 socket 错误：计数后继续轮询
                ctx.metrics.rx_errors.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "feedback receive failed");
            },
        }

        spin_sleep::sleep(poll_interval);
    }

    if let Err(e) = log.flush() {
        warn!(error = %e, "feedback data log flush failed on shutdown");
    }
    drop(log);
    drop(socket);

    // 最后一次写入：close() 等待的唯一信号
    ctx.rx_terminated.store(true, Ordering::Release);
}
