//! 反馈数据包解析
//!
//! 双臂控制端周期性地把当前状态（TCP 位置、关节位置/速度/力矩、PWM）
//! 打包为固定 153 字节的数据报发回上位机。
//! 接收路径只接受长度恰好等于 [`FEEDBACK_PACKET_SIZE`] 的数据报。

use crate::{NUM_ARM_JOINTS, ProtocolError, read_f32_le, write_f32_le};

/// 反馈数据包的固定编码长度（字节）
///
/// 1 (packet_id) + 38 个 f32：左右 TCP 位置 (3+3) + 左右关节位置/速度/力矩/PWM (4×8)
pub const FEEDBACK_PACKET_SIZE: usize = 153;

/// 当前唯一使用的反馈包类型标签
///
/// `packet_id` 字段为将来的包类型区分保留；编码端写入本值，
/// 解码端不做校验。
pub const FEEDBACK_PACKET_ID: u8 = 1;

/// 反馈数据包
///
/// 字段单位：TCP 位置 m（相对固定基座坐标系），关节位置 rad，
/// 关节速度 rad/s，关节力矩 Nm，PWM 为 [-1, 1] 的归一化执行器指令。
/// 无力矩传感的硬件上 `tau_l`/`tau_r` 可能恒为零。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedbackPacket {
    /// 包类型标签（保留，当前单一类型）
    pub packet_id: u8,
    /// 左臂 TCP 笛卡尔位置 (m)
    pub p_l: [f32; 3],
    /// 右臂 TCP 笛卡尔位置 (m)
    pub p_r: [f32; 3],
    /// 左臂关节位置 (rad)
    pub q_l: [f32; NUM_ARM_JOINTS],
    /// 右臂关节位置 (rad)
    pub q_r: [f32; NUM_ARM_JOINTS],
    /// 左臂关节速度 (rad/s)
    pub dq_l: [f32; NUM_ARM_JOINTS],
    /// 右臂关节速度 (rad/s)
    pub dq_r: [f32; NUM_ARM_JOINTS],
    /// 左臂关节力矩 (Nm)
    pub tau_l: [f32; NUM_ARM_JOINTS],
    /// 右臂关节力矩 (Nm)
    pub tau_r: [f32; NUM_ARM_JOINTS],
    /// 左臂关节 PWM [-1, 1]
    pub pwm_l: [f32; NUM_ARM_JOINTS],
    /// 右臂关节 PWM [-1, 1]
    pub pwm_r: [f32; NUM_ARM_JOINTS],
}

impl Default for FeedbackPacket {
    fn default() -> Self {
        Self {
            packet_id: FEEDBACK_PACKET_ID,
            p_l: [0.0; 3],
            p_r: [0.0; 3],
            q_l: [0.0; NUM_ARM_JOINTS],
            q_r: [0.0; NUM_ARM_JOINTS],
            dq_l: [0.0; NUM_ARM_JOINTS],
            dq_r: [0.0; NUM_ARM_JOINTS],
            tau_l: [0.0; NUM_ARM_JOINTS],
            tau_r: [0.0; NUM_ARM_JOINTS],
            pwm_l: [0.0; NUM_ARM_JOINTS],
            pwm_r: [0.0; NUM_ARM_JOINTS],
        }
    }
}

impl FeedbackPacket {
    /// 编码到固定缓冲区（零拷贝，小端）
    ///
    /// 主要供模拟器和测试中的对端使用；上位机侧只解码。
    pub fn encode<'a>(&self, buf: &'a mut [u8; FEEDBACK_PACKET_SIZE]) -> &'a [u8] {
        buf[0] = self.packet_id;
        let mut offset = 1;
        for group in [&self.p_l[..], &self.p_r[..]] {
            for v in group {
                write_f32_le(buf, offset, *v);
                offset += 4;
            }
        }
        for group in [
            &self.q_l, &self.q_r, &self.dq_l, &self.dq_r, &self.tau_l, &self.tau_r, &self.pwm_l,
            &self.pwm_r,
        ] {
            for v in group {
                write_f32_le(buf, offset, *v);
                offset += 4;
            }
        }
        &buf[..FEEDBACK_PACKET_SIZE]
    }

    /// 从字节缓冲区解码
    ///
    /// # 错误
    /// - `ProtocolError::InvalidLength`: 长度不是 153 字节
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() != FEEDBACK_PACKET_SIZE {
            return Err(ProtocolError::InvalidLength {
                expected: FEEDBACK_PACKET_SIZE,
                actual: data.len(),
            });
        }

        let mut packet = Self {
            packet_id: data[0],
            ..Self::default()
        };

        let mut offset = 1;
        for k in 0..3 {
            packet.p_l[k] = read_f32_le(data, offset + k * 4);
            packet.p_r[k] = read_f32_le(data, offset + 12 + k * 4);
        }
        offset += 24;
        for group in [
            &mut packet.q_l,
            &mut packet.q_r,
            &mut packet.dq_l,
            &mut packet.dq_r,
            &mut packet.tau_l,
            &mut packet.tau_r,
            &mut packet.pwm_l,
            &mut packet.pwm_r,
        ] {
            for v in group.iter_mut() {
                *v = read_f32_le(data, offset);
                offset += 4;
            }
        }

        Ok(packet)
    }
}
