//! Artifact locations

use std::path::{Path, PathBuf};

/// Environment variable naming the project root
pub const ROOT_ENV_VAR: &str = "CARESCORE_ROOT";

const IMMUNE_FILE: &str = "divs_immune_model_v7.json";
const ALBUMIN_FILE: &str = "albumin_predictor_improved.json";
const GUIDELINE_FILE: &str = "integrated_guidelines_v3.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Immune,
    Albumin,
    Guidelines,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Immune,
        ArtifactKind::Albumin,
        ArtifactKind::Guidelines,
    ];

    /// Key used in status paths and error tables
    pub fn name(self) -> &'static str {
        match self {
            ArtifactKind::Immune => "immune",
            ArtifactKind::Albumin => "albumin",
            ArtifactKind::Guidelines => "guidelines",
        }
    }
}

/// Project root plus the ordered candidate paths probed for each artifact.
/// The first candidate that exists as a file wins.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    project_root: PathBuf,
    immune: Vec<PathBuf>,
    albumin: Vec<PathBuf>,
    guidelines: Vec<PathBuf>,
}

impl StoreConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let modeling = project_root.join("modeling");
        let artifacts = modeling.join("artifacts");
        let candidates = |file: &str| vec![artifacts.join(file), modeling.join(file)];
        Self {
            immune: candidates(IMMUNE_FILE),
            albumin: candidates(ALBUMIN_FILE),
            guidelines: candidates(GUIDELINE_FILE),
            project_root,
        }
    }

    /// Root from `CARESCORE_ROOT`, else the working directory
    pub fn from_env() -> Self {
        let root = std::env::var_os(ROOT_ENV_VAR)
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(root)
    }

    pub fn with_immune_candidate(mut self, path: impl Into<PathBuf>) -> Self {
        self.immune.insert(0, path.into());
        self
    }

    pub fn with_albumin_candidate(mut self, path: impl Into<PathBuf>) -> Self {
        self.albumin.insert(0, path.into());
        self
    }

    pub fn with_guideline_candidate(mut self, path: impl Into<PathBuf>) -> Self {
        self.guidelines.insert(0, path.into());
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn candidates(&self, kind: ArtifactKind) -> &[PathBuf] {
        match kind {
            ArtifactKind::Immune => &self.immune,
            ArtifactKind::Albumin => &self.albumin,
            ArtifactKind::Guidelines => &self.guidelines,
        }
    }

    /// First existing candidate for `kind`
    pub fn resolve(&self, kind: ArtifactKind) -> Option<PathBuf> {
        let candidates = self.candidates(kind);
        log::debug!("probing {} candidates for {}", candidates.len(), kind.name());
        candidates.iter().find(|path| path.is_file()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_candidates_prefer_artifacts_dir() {
        let config = StoreConfig::new("/srv/care");
        assert_eq!(
            config.candidates(ArtifactKind::Albumin),
            &[
                PathBuf::from("/srv/care/modeling/artifacts/albumin_predictor_improved.json"),
                PathBuf::from("/srv/care/modeling/albumin_predictor_improved.json"),
            ]
        );
    }

    #[test]
    fn explicit_candidate_is_probed_first() {
        let config = StoreConfig::new("/srv/care").with_guideline_candidate("/etc/gl.json");
        let candidates = config.candidates(ArtifactKind::Guidelines);
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0], PathBuf::from("/etc/gl.json"));
    }

    #[test]
    fn resolve_skips_missing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let modeling = tmp.path().join("modeling");
        std::fs::create_dir_all(&modeling).unwrap();
        std::fs::write(modeling.join(IMMUNE_FILE), "{}").unwrap();

        let config = StoreConfig::new(tmp.path());
        assert_eq!(
            config.resolve(ArtifactKind::Immune),
            Some(modeling.join(IMMUNE_FILE))
        );
        assert_eq!(config.resolve(ArtifactKind::Albumin), None);
    }
}
