// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! ONNX Runtime 推理后端

use std::path::PathBuf;

use anyhow::{Context, Result};
use ndarray::{Array, IxDyn};
use once_cell::sync::Lazy;
use ort::execution_providers::{CUDAExecutionProvider, TensorRTExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, ValueType};
use regex::Regex;
use tracing::{debug, info};

/// 推理设备
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrtEP {
    CPU,
    CUDA(i32),
    Trt(i32),
}

#[derive(Debug, Clone)]
pub struct OrtConfig {
    pub f: PathBuf,
    pub ep: OrtEP,
    /// 动态输入时使用的 (height, width)
    pub image_size: (u32, u32),
}

pub struct OrtBackend {
    session: Session,
    ep: OrtEP,
    input_name: String,
    output_name: String,
    height: u32,
    width: u32,
    names: Option<Vec<String>>,
}

impl OrtBackend {
    pub fn build(config: OrtConfig) -> Result<Self> {
        let mut builder = Session::builder()?.with_optimization_level(GraphOptimizationLevel::Level3)?;
        builder = match config.ep {
            OrtEP::CPU => builder,
            OrtEP::CUDA(device_id) => builder.with_execution_providers([
                CUDAExecutionProvider::default().with_device_id(device_id).build(),
            ])?,
            OrtEP::Trt(device_id) => builder.with_execution_providers([
                TensorRTExecutionProvider::default().with_device_id(device_id).build(),
                CUDAExecutionProvider::default().with_device_id(device_id).build(),
            ])?,
        };
        let session = builder
            .commit_from_file(&config.f)
            .with_context(|| format!("Failed to load model: {:?}", config.f))?;

        let input = session.inputs.first().context("Model has no inputs")?;
        let output = session.outputs.first().context("Model has no outputs")?;
        let input_name = input.name.clone();
        let output_name = output.name.clone();

        // NCHW, -1 为动态维度
        let (height, width) = match &input.input_type {
            ValueType::Tensor { dimensions, .. } if dimensions.len() == 4 => (
                fixed_dim(dimensions[2]).unwrap_or(config.image_size.0),
                fixed_dim(dimensions[3]).unwrap_or(config.image_size.1),
            ),
            _ => config.image_size,
        };

        let names = session
            .metadata()
            .ok()
            .and_then(|m| m.custom("names").ok().flatten())
            .map(|raw| parse_names(&raw))
            .filter(|names| !names.is_empty());

        debug!(
            "ONNX 输入 {} ({}x{}), 输出 {}",
            input_name, width, height, output_name
        );

        Ok(Self {
            session,
            ep: config.ep,
            input_name,
            output_name,
            height,
            width,
            names,
        })
    }

    /// 执行一次前向推理, 返回第一个输出
    pub fn run(&self, xs: Array<f32, IxDyn>) -> Result<Array<f32, IxDyn>> {
        let input = Tensor::from_array(xs)?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input]?)?;
        let ys = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()?
            .into_owned();
        Ok(ys)
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn ep(&self) -> OrtEP {
        self.ep
    }

    pub fn names(&self) -> Option<Vec<String>> {
        self.names.clone()
    }

    pub fn summary(&self) {
        info!(
            "🧠 ONNX: {:?} | 输入 {}x{} | 类别数 {}",
            self.ep,
            self.width,
            self.height,
            self.names.as_ref().map_or(0, Vec::len)
        );
    }
}

fn fixed_dim(d: i64) -> Option<u32> {
    u32::try_from(d).ok().filter(|d| *d > 0)
}

static NAMES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(['"])([-()\w '"]+)(['"])"#).expect("valid names regex"));

/// 解析 ultralytics 导出的 names 元数据, 例如 `{0: 'person', 1: 'bicycle'}`
pub fn parse_names(raw: &str) -> Vec<String> {
    NAMES_RE
        .captures_iter(raw)
        .map(|c| c.extract::<3>().1[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        let names = parse_names("{0: 'person', 1: 'bicycle', 2: 'traffic light'}");
        assert_eq!(names, vec!["person", "bicycle", "traffic light"]);
    }

    #[test]
    fn test_parse_names_empty() {
        assert!(parse_names("{}").is_empty());
    }

    #[test]
    fn test_fixed_dim() {
        assert_eq!(fixed_dim(640), Some(640));
        assert_eq!(fixed_dim(-1), None);
        assert_eq!(fixed_dim(0), None);
    }
}
