//! 反馈数据日志
//!
//! 每个被接受的反馈数据报追加一行制表符分隔的文本，
//! 列顺序固定：经过时间、左/右 TCP 位置 (3+3)、左/右关节位置 (4+4)、
//! 左/右关节速度 (4+4)、左/右关节力矩 (4+4)、左/右 PWM (4+4)，
//! 共 39 列。

use kestrel_protocol::FeedbackPacket;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// 一行日志的列数
pub const DATALOG_COLUMNS: usize = 39;

/// 追加模式的反馈日志写入器
pub struct FeedbackLog {
    writer: BufWriter<File>,
}

impl FeedbackLog {
    /// 以追加模式打开（不存在则创建）日志文件
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// 追加一条记录并立即落盘
    pub fn append(&mut self, elapsed: f32, fb: &FeedbackPacket) -> std::io::Result<()> {
        let mut line = String::with_capacity(DATALOG_COLUMNS * 12);
        line.push_str(&elapsed.to_string());
        for group in [&fb.p_l[..], &fb.p_r[..]] {
            for v in group {
                line.push('\t');
                line.push_str(&v.to_string());
            }
        }
        for group in [
            &fb.q_l, &fb.q_r, &fb.dq_l, &fb.dq_r, &fb.tau_l, &fb.tau_r, &fb.pwm_l, &fb.pwm_r,
        ] {
            for v in group {
                line.push('\t');
                line.push_str(&v.to_string());
            }
        }
        line.push('\n');

        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()
    }

    /// 显式落盘（析构时也会尽力落盘）
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}
