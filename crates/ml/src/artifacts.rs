use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use burnwatch_core::CategoricalEncoderRegistry;
use serde::{Deserialize, Serialize};

use crate::logistic::LogisticModel;
use crate::tree::TreeEnsemble;
use crate::Classifier;

pub const BURNOUT_MODEL_FILE: &str = "burnout_model.json";
pub const ATTRITION_MODEL_FILE: &str = "attrition_model.json";
pub const LABEL_ENCODERS_FILE: &str = "label_encoders.json";

/// On-disk model document; `family` selects the model kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ModelFile {
    TreeEnsemble(TreeEnsemble),
    Logistic(LogisticModel),
}

impl ModelFile {
    pub fn into_classifier(self) -> Arc<dyn Classifier> {
        match self {
            Self::TreeEnsemble(model) => Arc::new(model),
            Self::Logistic(model) => Arc::new(model),
        }
    }
}

/// The three trained artifacts, loaded once and shared read-only.
#[derive(Clone)]
pub struct ModelArtifacts {
    pub burnout: Arc<dyn Classifier>,
    pub attrition: Arc<dyn Classifier>,
    pub encoders: Arc<CategoricalEncoderRegistry>,
}

impl ModelArtifacts {
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let burnout = load_model(&dir.join(BURNOUT_MODEL_FILE))?;
        let attrition = load_model(&dir.join(ATTRITION_MODEL_FILE))?;
        let encoders = load_encoders(&dir.join(LABEL_ENCODERS_FILE))?;

        Ok(Self {
            burnout,
            attrition,
            encoders: Arc::new(encoders),
        })
    }
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("burnout", &self.burnout.model_name())
            .field("attrition", &self.attrition.model_name())
            .finish_non_exhaustive()
    }
}

pub fn load_model(path: &Path) -> Result<Arc<dyn Classifier>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed reading model file: {}", path.display()))?;
    let file = serde_json::from_str::<ModelFile>(&raw)
        .with_context(|| format!("invalid model file: {}", path.display()))?;
    Ok(file.into_classifier())
}

pub fn load_encoders(path: &Path) -> Result<CategoricalEncoderRegistry> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed reading label encoders: {}", path.display()))?;
    let tables = serde_json::from_str::<BTreeMap<String, Vec<String>>>(&raw)
        .with_context(|| format!("invalid label encoder file: {}", path.display()))?;
    CategoricalEncoderRegistry::new(tables)
        .with_context(|| format!("label encoders rejected: {}", path.display()))
}
