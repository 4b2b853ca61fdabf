//! # Kestrel Protocol
//!
//! 双臂 UDP 控制链路协议定义（无 I/O 依赖）
//!
//! ## 模块
//!
//! - `control`: 控制参考数据包（上位机 → 双臂）
//! - `feedback`: 反馈数据包（双臂 → 上位机）
//!
//! ## 字节序
//!
//! 线上格式统一使用小端字节序（little-endian），字段顺序固定。
//! 数据包本身不携带字节序标记，两端必须遵守本模块定义的唯一布局。
//! 编解码通过显式的 `to_le_bytes`/`from_le_bytes` 完成，
//! 不依赖内存结构体布局与网络布局一致。

pub mod control;
pub mod feedback;

// 重新导出常用类型
pub use control::*;
pub use feedback::*;

/// 每条机械臂的关节数量
pub const NUM_ARM_JOINTS: usize = 4;

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid packet length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Unknown control mode tag: {0}")]
    UnknownMode(u8),
}

/// 读取缓冲区中指定偏移处的 f32（小端）
///
/// 调用方必须保证 `buf[offset..offset + 4]` 在界内。
#[inline]
pub(crate) fn read_f32_le(buf: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

/// 写入 f32 到缓冲区指定偏移处（小端）
#[inline]
pub(crate) fn write_f32_le(buf: &mut [u8], offset: usize, value: f32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_f32_le_roundtrip() {
        let mut buf = [0u8; 8];
        write_f32_le(&mut buf, 2, 0.25);
        assert_eq!(read_f32_le(&buf, 2), 0.25);
    }

    #[test]
    fn test_write_f32_le_layout() {
        let mut buf = [0u8; 4];
        write_f32_le(&mut buf, 0, 1.0);
        // 1.0f32 = 0x3F800000，小端排列
        assert_eq!(buf, [0x00, 0x00, 0x80, 0x3F]);
    }
}
