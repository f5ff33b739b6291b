use std::path::Path;

use log::LevelFilter;
use mvpose::{CsvMarkerStore, CsvPoint3dStore, ProjectConfig, ReconstructionPipeline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    mvpose::core::init_with_level(LevelFilter::Info)?;

    let Some(config_path) = std::env::args().nth(1) else {
        eprintln!("Usage: reconstruct <project.json> [output.csv]");
        return Ok(());
    };
    let output_path = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "reconstructed_3d.csv".to_string());

    let config = ProjectConfig::load_json(&config_path)?;
    let (cameras, rejected) = config.build_cameras();
    if !rejected.is_empty() {
        eprintln!("{} camera(s) excluded due to invalid calibration", rejected.len());
    }

    let base = Path::new(&config_path).parent().unwrap_or(Path::new("."));
    let mut stores = Vec::new();
    let mut store_paths = Vec::new();
    for camera in &cameras {
        let view = &config.views[camera.name()];
        let file = view
            .annotation_file
            .as_deref()
            .ok_or_else(|| format!("view '{}' has no annotation_file", camera.name()))?;
        let path = base.join(file);
        stores.push(CsvMarkerStore::from_path(&path)?);
        store_paths.push(path);
    }

    let frames = stores
        .iter()
        .map(mvpose::MarkerStore::frame_count)
        .min()
        .unwrap_or(0);
    let mut output = CsvPoint3dStore::new(config.body_parts.clone());

    let pipeline = ReconstructionPipeline::new(
        cameras,
        config.threshold,
        config.algorithm,
        config.likelihood_policy,
    );
    let report = pipeline.run(0..frames, &config.body_parts, &mut stores, Some(&mut output))?;

    for (store, path) in stores.iter().zip(&store_paths) {
        store.save(path)?;
    }
    output.save(&output_path)?;

    println!(
        "{} frames, {} keypoints reconstructed, {} skipped -> {}",
        frames,
        report.reconstructed,
        report.skipped(),
        output_path
    );
    Ok(())
}
