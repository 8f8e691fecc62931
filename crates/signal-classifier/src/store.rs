//! 모델 파라미터 저장소와 활성 파라미터 선택.
//!
//! 학습된 스냅샷이 있고 유효하면 그것을, 아니면 기본 모델을 사용합니다.
//! 폴백은 에러가 아니며 메타데이터의 `source`로 드러납니다.

use crate::error::{MlError, MlResult};
use crate::model::ModelParameters;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 버전이 있는 모델 파라미터 스냅샷 저장소.
pub trait ParameterStore {
    /// 스냅샷을 읽습니다. 스냅샷이 없으면 `Ok(None)`.
    fn load(&self) -> MlResult<Option<ModelParameters>>;

    /// 스냅샷을 저장합니다.
    fn save(&self, params: &ModelParameters) -> MlResult<()>;
}

/// JSON 파일 하나에 스냅샷을 보관하는 저장소.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ParameterStore for JsonFileStore {
    fn load(&self) -> MlResult<Option<ModelParameters>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(MlError::ModelLoad(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let params: ModelParameters = serde_json::from_str(&content)?;
        Ok(Some(params))
    }

    fn save(&self, params: &ModelParameters) -> MlResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| MlError::ModelSave(format!("{}: {}", parent.display(), e)))?;
        }

        let json = serde_json::to_string_pretty(params)?;
        fs::write(&self.path, json)
            .map_err(|e| MlError::ModelSave(format!("{}: {}", self.path.display(), e)))?;

        info!(
            path = %self.path.display(),
            version = %params.metadata.version,
            "Model parameters saved"
        );
        Ok(())
    }
}

/// 로드된 스냅샷과 기본 모델 중 활성 파라미터를 고릅니다.
///
/// 스냅샷이 없거나 학습 샘플이 0이거나 수치가 유효하지 않으면 기본 모델입니다.
pub fn resolve_active_parameters(loaded: Option<ModelParameters>) -> ModelParameters {
    match loaded {
        Some(params) if params.is_valid() => params,
        Some(params) => {
            warn!(
                version = %params.metadata.version,
                samples = params.metadata.training_samples,
                "Model snapshot is not usable, falling back to baseline"
            );
            ModelParameters::baseline()
        }
        None => {
            warn!("No trained model snapshot, falling back to baseline");
            ModelParameters::baseline()
        }
    }
}

/// 저장소에서 읽어 활성 파라미터를 결정합니다. 읽기 실패도 기본 모델로 폴백합니다.
pub fn load_active_parameters(store: &dyn ParameterStore) -> ModelParameters {
    match store.load() {
        Ok(loaded) => resolve_active_parameters(loaded),
        Err(e) => {
            warn!(error = %e, "Failed to load model snapshot, falling back to baseline");
            ModelParameters::baseline()
        }
    }
}
