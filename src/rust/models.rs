/// Pretrained image classifiers that can be downloaded on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinModel {
    /// MobileNetV2 trained on ImageNet-1k
    ///
    /// Characteristics:
    /// - Input: 224x224 RGB, ImageNet mean/std normalization
    /// - Output: 1000 logits
    /// - Size: ~14MB
    MobileNetV2,
}

/// Characteristics of a model including its input geometry and output size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCharacteristics {
    /// Square input edge length in pixels
    pub input_size: u32,
    /// Number of output classes (labels)
    pub num_classes: usize,
    /// Approximate size of the model file
    pub model_size_mb: usize,
}

/// Where a model and its labels file are fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub model_url: String,
    pub labels_url: String,
    /// Expected SHA-256 of the model file. When unset, the digest recorded at
    /// download time is what later checks compare against.
    pub model_hash: Option<String>,
    /// Expected SHA-256 of the labels file, with the same fallback
    pub labels_hash: Option<String>,
}

impl BuiltinModel {
    pub fn characteristics(&self) -> ModelCharacteristics {
        match self {
            Self::MobileNetV2 => ModelCharacteristics {
                input_size: 224,
                num_classes: 1000,
                model_size_mb: 14,
            },
        }
    }

    pub fn get_model_info(&self) -> ModelInfo {
        match self {
            Self::MobileNetV2 => ModelInfo {
                name: "mobilenetv2-12".to_string(),
                model_url: "https://github.com/onnx/models/raw/main/validated/vision/classification/mobilenet/model/mobilenetv2-12.onnx".to_string(),
                labels_url: "https://github.com/onnx/models/raw/main/validated/vision/classification/synset.txt".to_string(),
                model_hash: None,
                labels_hash: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_characteristics() {
        let characteristics = BuiltinModel::MobileNetV2.characteristics();
        assert_eq!(characteristics.input_size, 224);
        assert_eq!(characteristics.num_classes, 1000);
    }

    #[test]
    fn test_model_info() {
        let info = BuiltinModel::MobileNetV2.get_model_info();
        assert_eq!(info.name, "mobilenetv2-12");
        assert!(info.model_url.ends_with(".onnx"));
    }
}
