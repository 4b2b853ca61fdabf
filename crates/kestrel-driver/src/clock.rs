//! 经过时间时钟
//!
//! 接口创建时启动的单调秒表，为发出的控制参考打时间戳，
//! 并用于计算反馈更新间隔。

use std::time::Instant;

/// 单调经过时间时钟
///
/// 基于 `Instant`，不受系统时间调整影响。
/// 精度：微秒级时间源截断到单精度浮点，
/// 在分钟到数十分钟量级的会话内足够；不适合数小时级会话。
#[derive(Debug, Clone, Copy)]
pub struct ElapsedClock {
    origin: Instant,
}

impl ElapsedClock {
    /// 启动时钟（原点为当前时刻）
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// 自时钟启动以来的经过时间（秒）
    pub fn elapsed(&self) -> f32 {
        self.origin.elapsed().as_secs_f32()
    }
}
