// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 检测系统 (Detection System)
///
/// 监控循环把模型当作黑盒: 图片 → 检测结果列表
/// - DetectionEngine: 推理接口 (可用桩实现做测试)
/// - types:           检测框与检测结果
pub mod types;

pub use types::{BBox, Detection, INF_SIZE, PERSON_CLASS_ID, PERSON_LABEL};

use std::cmp::Ordering;

use crate::capture::Frame;
use crate::error::DetectionError;

/// 目标检测接口
pub trait DetectionEngine {
    /// 对一帧做推理, 不修改输入帧
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, DetectionError>;
}

/// 按置信度降序做类别无关的 NMS
pub fn non_max_suppression(xs: &mut Vec<Detection>, iou_threshold: f32) {
    xs.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut current_index = 0;
    for index in 0..xs.len() {
        let mut drop = false;
        for prev_index in 0..current_index {
            let iou = xs[prev_index].bbox.iou(&xs[index].bbox);
            if iou > iou_threshold {
                drop = true;
                break;
            }
        }
        if !drop {
            xs.swap(current_index, index);
            current_index += 1;
        }
    }
    xs.truncate(current_index);
}

/// 只保留人员检测 (不做额外的置信度过滤)
pub fn persons(detections: &[Detection]) -> Vec<Detection> {
    detections.iter().filter(|d| d.is_person()).cloned().collect()
}
