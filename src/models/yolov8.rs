// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// YOLOv8 / YOLO11 检测模型
// 包含: 模型加载、预处理、推理、后处理

use anyhow::{Context, Result};
use fast_image_resize as fr;
use ndarray::{s, Array, ArrayViewD, Axis, IxDyn};
use tracing::info;

use crate::capture::Frame;
use crate::detection::{
    non_max_suppression, BBox, Detection, DetectionEngine, PERSON_CLASS_ID, PERSON_LABEL,
};
use crate::error::DetectionError;
use crate::{OrtBackend, OrtConfig, OrtEP};

/// 输出前 4 维为 cx, cy, w, h
const CXYWH_OFFSET: usize = 4;

/// 填充灰度 (与 ultralytics 一致)
const PAD_VALUE: f32 = 144.0 / 255.0;

/// 模型加载参数
#[derive(Debug, Clone)]
pub struct YOLOv8Config {
    pub model: std::path::PathBuf,
    pub ep: OrtEP,
    pub imgsz: u32,
    pub conf: f32,
    pub iou: f32,
}

/// YOLOv8 完整模型结构
pub struct YOLOv8 {
    engine: OrtBackend,
    postprocessor: YOLOv8Postprocessor,
    profile: bool,
}

impl YOLOv8 {
    pub fn new(config: YOLOv8Config) -> Result<Self> {
        let engine = OrtBackend::build(OrtConfig {
            f: config.model,
            ep: config.ep,
            image_size: (config.imgsz, config.imgsz),
        })?;
        let names = engine.names().unwrap_or_default();
        let postprocessor = YOLOv8Postprocessor::new(names, config.conf, config.iou);

        Ok(Self {
            engine,
            postprocessor,
            profile: false,
        })
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    /// preprocess → run → postprocess
    pub fn forward(&self, frame: &Frame) -> Result<Vec<Detection>> {
        let t_pre = std::time::Instant::now();
        let (xs, ratio) = letterbox(frame, self.engine.width(), self.engine.height())?;
        if self.profile {
            info!("[Model Preprocess]: {:?}", t_pre.elapsed());
        }

        let t_run = std::time::Instant::now();
        let ys = self.engine.run(xs)?;
        if self.profile {
            info!("[Model Inference]: {:?}", t_run.elapsed());
        }

        let (w0, h0) = frame.dimensions();
        Ok(self
            .postprocessor
            .postprocess(ys.view(), ratio, w0 as f32, h0 as f32))
    }

    pub fn summary(&self) {
        self.engine.summary();
    }

    pub fn engine(&self) -> &OrtBackend {
        &self.engine
    }
}

impl DetectionEngine for YOLOv8 {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, DetectionError> {
        self.forward(frame).map_err(DetectionError::Inference)
    }
}

fn scale_wh(w0: f32, h0: f32, w1: f32, h1: f32) -> (f32, f32, f32) {
    let r = (w1 / w0).min(h1 / h0);
    (r, (w0 * r).round(), (h0 * r).round())
}

/// 等比缩放到模型输入尺寸 (左上对齐, 其余填充灰色), 返回 NCHW 张量与缩放比
pub fn letterbox(frame: &Frame, width: u32, height: u32) -> Result<(Array<f32, IxDyn>, f32)> {
    let (w0, h0) = frame.dimensions();
    let (ratio, w_new, h_new) = scale_wh(w0 as f32, h0 as f32, width as f32, height as f32);
    let (w_new, h_new) = ((w_new as u32).clamp(1, width), (h_new as u32).clamp(1, height));

    let src = fr::images::ImageRef::new(w0, h0, frame.as_raw(), fr::PixelType::U8x3)
        .context("Invalid source frame buffer")?;
    let mut dst = fr::images::Image::new(w_new, h_new, fr::PixelType::U8x3);
    fr::Resizer::new()
        .resize(
            &src,
            &mut dst,
            &fr::ResizeOptions::new()
                .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear)),
        )
        .context("Failed to resize frame")?;

    let mut ys = Array::from_elem((1, 3, height as usize, width as usize), PAD_VALUE).into_dyn();
    for (i, rgb) in dst.buffer().chunks_exact(3).enumerate() {
        let x = i % w_new as usize;
        let y = i / w_new as usize;
        ys[[0, 0, y, x]] = rgb[0] as f32 / 255.0;
        ys[[0, 1, y, x]] = rgb[1] as f32 / 255.0;
        ys[[0, 2, y, x]] = rgb[2] as f32 / 255.0;
    }

    Ok((ys, ratio))
}

/// YOLOv8 后处理器: `[1, 4 + nc, anchors]` → 原图坐标的检测结果
pub struct YOLOv8Postprocessor {
    names: Vec<String>,
    conf: f32,
    iou: f32,
}

impl YOLOv8Postprocessor {
    pub fn new(names: Vec<String>, conf: f32, iou: f32) -> Self {
        Self { names, conf, iou }
    }

    pub fn label(&self, id: usize) -> String {
        match self.names.get(id) {
            Some(name) => name.clone(),
            None if self.names.is_empty() && id == PERSON_CLASS_ID => PERSON_LABEL.to_string(),
            None => format!("class_{}", id),
        }
    }

    pub fn postprocess(
        &self,
        preds: ArrayViewD<'_, f32>,
        ratio: f32,
        width_original: f32,
        height_original: f32,
    ) -> Vec<Detection> {
        let mut data: Vec<Detection> = Vec::new();
        let Some(anchor) = preds.axis_iter(Axis(0)).next() else {
            return data;
        };
        if anchor.ndim() != 2 || anchor.shape()[0] <= CXYWH_OFFSET {
            return data;
        }

        for pred in anchor.axis_iter(Axis(1)) {
            let bbox = pred.slice(s![0..CXYWH_OFFSET]);
            let clss = pred.slice(s![CXYWH_OFFSET..]);

            let Some((id, &confidence)) = clss
                .iter()
                .enumerate()
                .reduce(|max, x| if x.1 > max.1 { x } else { max })
            else {
                continue;
            };

            if confidence < self.conf {
                continue;
            }

            let cx = bbox[0] / ratio;
            let cy = bbox[1] / ratio;
            let w = bbox[2] / ratio;
            let h = bbox[3] / ratio;
            let x1 = (cx - w / 2.).clamp(0.0, width_original);
            let y1 = (cy - h / 2.).clamp(0.0, height_original);
            let x2 = (cx + w / 2.).clamp(0.0, width_original);
            let y2 = (cy + h / 2.).clamp(0.0, height_original);

            data.push(Detection {
                class_id: id,
                label: self.label(id),
                confidence,
                bbox: BBox::new(x1, y1, x2, y2),
            });
        }

        non_max_suppression(&mut data, self.iou);
        data
    }
}
