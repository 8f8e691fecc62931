//! CLI 명령어 구현 모듈.
//!
//! 모든 명령은 파일 입력만 사용하고 직렬화 가능한 리포트를 반환합니다.

pub mod evaluate;
pub mod score;
pub mod simulate;
pub mod size;
pub mod train;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use signal_classifier::{
    load_active_parameters, resolve_active_parameters, JsonFileStore, ModelParameters,
};
use signal_core::ModelSettings;
use std::fs;
use std::path::Path;

/// JSON 파일을 읽어 역직렬화합니다.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// 명시된 경로 → 설정의 경로 → 기본 모델 순으로 활성 파라미터를 결정합니다.
pub fn load_model(path: Option<&Path>, settings: &ModelSettings) -> ModelParameters {
    let configured = settings.parameters_path.as_deref().map(Path::new);
    match path.or(configured) {
        Some(path) => load_active_parameters(&JsonFileStore::new(path)),
        None => resolve_active_parameters(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_classifier::ModelSource;

    #[test]
    fn test_missing_model_falls_back_to_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let params = load_model(Some(&dir.path().join("absent.json")), &ModelSettings::default());
        assert_eq!(params.metadata.source, ModelSource::Baseline);

        let params = load_model(None, &ModelSettings::default());
        assert!(params.is_baseline());
    }

    #[test]
    fn test_read_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let err = read_json::<Vec<u8>>(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }
}
