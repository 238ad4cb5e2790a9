// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 模型实现
///
/// ## 完整模型实现 (Full Model Implementation)
/// - **YOLOv8**: 模型加载 + 预处理 + 推理 + 后处理, 实现 `DetectionEngine`
///   - 同样适用于 YOLO11 导出的 ONNX (输出格式相同)
///   - 文件: `yolov8.rs`
///
/// ## 使用示例
/// ```no_run
/// use cam_sentinel::models::{YOLOv8, YOLOv8Config};
/// use cam_sentinel::OrtEP;
///
/// let model = YOLOv8::new(YOLOv8Config {
///     model: "yolo11x.onnx".into(),
///     ep: OrtEP::CPU,
///     imgsz: 640,
///     conf: 0.25,
///     iou: 0.45,
/// })?;
/// model.summary();
/// # Ok::<(), anyhow::Error>(())
/// ```
pub mod yolov8;

pub use yolov8::{letterbox, YOLOv8, YOLOv8Config, YOLOv8Postprocessor};
