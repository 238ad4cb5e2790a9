// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 网络摄像头哨兵 (Camera Sentinel)
///
/// 单线程守护进程, 每个周期:
/// 1. 抓帧:   HTTP 快照 + 固定旋转
/// 2. 心跳:   成功推 up, 连续失败达到阈值推 down
/// 3. 归档:   按天分目录保存原始帧
/// 4. 检测:   YOLO 人员检测, 限频发送标注图
use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use cam_sentinel::logging;
use cam_sentinel::{
    Annotator, Args, DiscordWebhook, FrameStore, HealthReporter, HeartbeatTransport,
    HttpCamera, KumaPush, MonitorLoop, NotificationGate, YOLOv8, YOLOv8Config,
};

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_file())?;

    info!("🚀 摄像头哨兵启动 v{}", env!("CARGO_PKG_VERSION"));
    if !matches!(args.rotation, 0 | 90 | 180 | 270) {
        warn!("⚠️ 不支持的旋转角度 {}, 不做旋转", args.rotation);
    }
    args.summary();

    let agent = ureq::AgentBuilder::new()
        .timeout(args.request_timeout())
        .build();

    let camera = HttpCamera::new(agent.clone(), args.camera_url.clone(), args.rotation());
    let kuma = args
        .kuma_url()
        .map(|url| Box::new(KumaPush::new(agent.clone(), url)) as Box<dyn HeartbeatTransport>);
    let health = HealthReporter::new(args.failure_threshold, kuma);
    let store = FrameStore::new(args.image_save_folder.clone());
    let gate = NotificationGate::new(args.notification_interval());

    let mut monitor = MonitorLoop::new(
        Box::new(camera),
        health,
        store,
        gate,
        args.capture_interval(),
    );

    if let Some(model) = args.model_path() {
        let detector = YOLOv8::new(YOLOv8Config {
            model: model.to_path_buf(),
            ep: args.execution_provider(),
            imgsz: args.imgsz,
            conf: args.conf,
            iou: args.iou,
        })?
        .with_profile(args.profile);
        detector.summary();
        info!("✅ 检测模型加载成功");

        monitor = monitor
            .with_detector(Box::new(detector))
            .with_annotator(Annotator::load(args.font.as_deref(), &agent));

        match args.discord_webhook_url() {
            Some(url) => {
                let client = reqwest::blocking::Client::builder()
                    .timeout(args.request_timeout())
                    .build()?;
                monitor = monitor.with_notifier(Box::new(DiscordWebhook::new(client, url)));
            }
            None => warn!("⚠️ 未配置 DISCORD_WEBHOOK_URL, 人员检测不会发送通知"),
        }
    }

    monitor.run()
}
