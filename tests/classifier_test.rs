use binwise::{
    Analyzer, BuiltinModel, ClassifierError, ImageClassifier, ModelManager, OnnxImageClassifier,
};
use env_logger::{Builder, Env};
use image::{DynamicImage, Rgb, RgbImage};
use std::sync::Arc;
use std::thread;

fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn"))
        .is_test(true)
        .try_init();
}

async fn setup_classifier() -> Result<OnnxImageClassifier, Box<dyn std::error::Error>> {
    let manager = ModelManager::new_default()?;
    manager.ensure_model_downloaded(BuiltinModel::MobileNetV2).await?;
    Ok(OnnxImageClassifier::builder()
        .with_model_from(&manager, BuiltinModel::MobileNetV2)?
        .with_top_k(5)
        .build()?)
}

fn yellow_square() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([240, 210, 40])))
}

#[test]
fn test_custom_model_requires_existing_files() {
    init();
    let result = OnnxImageClassifier::builder()
        .with_custom_model("/nonexistent/model.onnx", "/nonexistent/labels.txt", Some(224));
    assert!(matches!(result, Err(ClassifierError::BuildError(_))));
}

#[test]
fn test_custom_model_rejects_empty_labels_file() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let dir = std::env::temp_dir().join("binwise-test").join("empty-labels");
    std::fs::create_dir_all(&dir)?;
    let model_path = dir.join("model.onnx");
    let labels_path = dir.join("labels.txt");
    std::fs::write(&model_path, b"not really a model")?;
    std::fs::write(&labels_path, "\n\n")?;

    let result = OnnxImageClassifier::builder().with_custom_model(
        model_path.to_str().unwrap(),
        labels_path.to_str().unwrap(),
        None,
    );
    assert!(matches!(result, Err(ClassifierError::LabelsError(_))));
    Ok(())
}

#[tokio::test]
#[ignore = "downloads the model from the network"]
async fn test_end_to_end_classification() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let classifier = setup_classifier().await?;
    let info = classifier.info();
    assert_eq!(info.num_labels, 1000);
    assert_eq!(info.input_size, 224);

    let predictions = classifier.classify(&yellow_square())?;
    assert_eq!(predictions.len(), 5);
    assert!(predictions.windows(2).all(|w| w[0].score() >= w[1].score()));
    assert!(predictions.iter().all(|p| (0.0..=1.0).contains(&p.score())));

    let analyzer = Analyzer::new(classifier);
    let report = analyzer.analyze(yellow_square()).await?;
    assert!(report.result.confidence <= 99);
    assert_eq!(analyzer.history().await.len(), 1);
    Ok(())
}

#[tokio::test]
#[ignore = "downloads the model from the network"]
async fn test_thread_safety() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = Arc::new(setup_classifier().await?);
    let mut handles = vec![];

    for _ in 0..3 {
        let classifier = Arc::clone(&classifier);
        handles.push(thread::spawn(move || {
            assert!(classifier.classify(&yellow_square()).is_ok());
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
    Ok(())
}
