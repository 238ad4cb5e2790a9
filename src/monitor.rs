// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 监控主循环 (Monitor Loop)
//!
//! 单线程, 每个周期按顺序执行:
//! 1. 抓帧, 失败 → HealthReporter::on_failure, 跳到 5
//! 2. 成功 → HealthReporter::on_success
//! 3. 保存原始帧
//! 4. 检测; 有人且节流放行 → 标注 → 发送 → 成功后 record
//! 5. 休眠 capture_interval
//!
//! 周期之间不重叠, 健康状态与节流状态都只由本循环持有.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use crate::annotate::Annotator;
use crate::capture::FrameSource;
use crate::detection::{persons, DetectionEngine};
use crate::health::HealthReporter;
use crate::notify::{NotificationGate, Notifier, CAPTION};
use crate::storage::FrameStore;

/// 单个周期的结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub captured: bool,
    pub saved: Option<PathBuf>,
    pub detected: bool,
    pub persons: usize,
    pub notified: bool,
}

pub struct MonitorLoop {
    camera: Box<dyn FrameSource>,
    health: HealthReporter,
    store: FrameStore,
    detector: Option<Box<dyn DetectionEngine>>,
    annotator: Annotator,
    notifier: Option<Box<dyn Notifier>>,
    gate: NotificationGate,
    interval: Duration,
    processed: u64,
}

impl MonitorLoop {
    pub fn new(
        camera: Box<dyn FrameSource>,
        health: HealthReporter,
        store: FrameStore,
        gate: NotificationGate,
        interval: Duration,
    ) -> Self {
        Self {
            camera,
            health,
            store,
            detector: None,
            annotator: Annotator::new(None),
            notifier: None,
            gate,
            interval,
            processed: 0,
        }
    }

    pub fn with_detector(mut self, detector: Box<dyn DetectionEngine>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn health(&self) -> &HealthReporter {
        &self.health
    }

    pub fn gate(&self) -> &NotificationGate {
        &self.gate
    }

    /// 成功抓到的帧数
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// 永久运行, 只能由外部信号终止
    pub fn run(&mut self) -> ! {
        info!("✅ 监控启动, 每 {:?} 抓帧一次", self.interval);
        loop {
            self.cycle(Local::now());
            std::thread::sleep(self.interval);
        }
    }

    /// 执行一个完整周期 (不含休眠)
    pub fn cycle(&mut self, now: DateTime<Local>) -> CycleReport {
        let mut report = CycleReport::default();

        let frame = match self.camera.capture() {
            Ok(frame) => frame,
            Err(e) => {
                error!("Capture error: {}", e);
                self.health.on_failure();
                return report;
            }
        };
        report.captured = true;
        self.processed += 1;
        self.health.on_success();

        match self.store.save(&frame, &now) {
            Ok(path) => report.saved = Some(path),
            Err(e) => error!("❌ 保存图片失败: {:#}", e),
        }

        let Some(detector) = self.detector.as_mut() else {
            return report;
        };
        let detections = match detector.detect(&frame) {
            Ok(detections) => detections,
            Err(e) => {
                warn!("⚠️ 检测失败, 本周期视为无检测结果: {}", e);
                Vec::new()
            }
        };
        report.detected = true;
        info!("🔍 YOLO processed image #{} ({} 个目标)", self.processed, detections.len());

        let found = persons(&detections);
        report.persons = found.len();
        if found.is_empty() || !self.gate.allow(now) {
            return report;
        }

        let Some(notifier) = &self.notifier else {
            warn!("⚠️ 检测到 {} 人, 但未配置通知地址", found.len());
            return report;
        };

        let annotated = self.annotator.annotate(&frame, &found);
        match notifier.send(&annotated, CAPTION) {
            Ok(()) => {
                self.gate.record(now);
                report.notified = true;
                info!("🔔 已发送人员通知 ({} 人)", found.len());
            }
            Err(e) => error!("Discord send error: {}", e),
        }

        report
    }
}
