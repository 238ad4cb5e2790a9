// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 健康心跳 (Health Reporter)
//!
//! - 成功: 计数清零, 每个周期都推送 up
//! - 失败: 计数 +1, 达到阈值时推送 down 并清零重新计数
//!
//! 心跳推送失败只记录日志, 不影响计数和调度.

use tracing::{debug, error, warn};

use crate::error::HeartbeatError;

/// 心跳状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatStatus {
    Up,
    Down,
}

impl HeartbeatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeartbeatStatus::Up => "up",
            HeartbeatStatus::Down => "down",
        }
    }
}

/// 已发出的一次心跳
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heartbeat {
    pub status: HeartbeatStatus,
    pub msg: String,
}

/// 心跳通道
pub trait HeartbeatTransport {
    fn push(&self, heartbeat: &Heartbeat) -> Result<(), HeartbeatError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthState {
    pub consecutive_failures: u32,
    pub threshold_reached: bool,
}

pub struct HealthReporter {
    state: HealthState,
    threshold: u32,
    transport: Option<Box<dyn HeartbeatTransport>>,
}

impl HealthReporter {
    /// `transport` 为 None 时心跳静默跳过
    pub fn new(threshold: u32, transport: Option<Box<dyn HeartbeatTransport>>) -> Self {
        Self {
            state: HealthState::default(),
            threshold: threshold.max(1),
            transport,
        }
    }

    pub fn state(&self) -> HealthState {
        self.state
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// 抓帧失败, 返回本次发出的心跳 (仅在达到阈值时)
    pub fn on_failure(&mut self) -> Option<Heartbeat> {
        self.state.consecutive_failures += 1;
        self.state.threshold_reached = self.state.consecutive_failures >= self.threshold;
        if !self.state.threshold_reached {
            debug!(
                "抓帧失败 {}/{}",
                self.state.consecutive_failures, self.threshold
            );
            return None;
        }

        let heartbeat = Heartbeat {
            status: HeartbeatStatus::Down,
            msg: format!("Failed {} captures", self.state.consecutive_failures),
        };
        warn!("🔴 连续失败 {} 次, 推送 down", self.state.consecutive_failures);
        self.emit(&heartbeat);
        self.state = HealthState::default();
        Some(heartbeat)
    }

    /// 抓帧成功, 每次都推送 up
    pub fn on_success(&mut self) -> Heartbeat {
        self.state = HealthState::default();
        let heartbeat = Heartbeat {
            status: HeartbeatStatus::Up,
            msg: "OK".to_string(),
        };
        self.emit(&heartbeat);
        heartbeat
    }

    fn emit(&self, heartbeat: &Heartbeat) {
        let Some(transport) = &self.transport else {
            return;
        };
        if let Err(e) = transport.push(heartbeat) {
            error!("Kuma ping error: {}", e);
        }
    }
}

/// Uptime Kuma push 监控
pub struct KumaPush {
    agent: ureq::Agent,
    base_url: String,
}

impl KumaPush {
    /// 配置中的查询参数会被丢弃, 由每次推送重新附加 status/msg
    pub fn new(agent: ureq::Agent, url: &str) -> Self {
        Self {
            agent,
            base_url: strip_query(url).to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl HeartbeatTransport for KumaPush {
    fn push(&self, heartbeat: &Heartbeat) -> Result<(), HeartbeatError> {
        self.agent
            .get(&self.base_url)
            .query("status", heartbeat.status.as_str())
            .query("msg", &heartbeat.msg)
            .call()?;
        debug!("💓 心跳 {} ({})", heartbeat.status.as_str(), heartbeat.msg);
        Ok(())
    }
}

pub fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}
