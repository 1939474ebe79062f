use anyhow::Context;
use std::path::PathBuf;

const REPORT_SUFFIX: &str = "_report.md";

/// Outcome of a best-effort save.
#[derive(Debug)]
pub enum SaveOutcome {
    Saved(PathBuf),
    Failed { path: PathBuf, error: anyhow::Error },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }

    pub fn message(&self) -> String {
        match self {
            SaveOutcome::Saved(path) => format!("Report saved to {}", path.display()),
            SaveOutcome::Failed { path, error } => {
                format!("Error writing report to {}: {error:#}", path.display())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, persona_key: &str) -> PathBuf {
        self.dir.join(report_filename(persona_key))
    }

    /// Writes `content`, replacing any previous report for the persona.
    pub async fn try_save(&self, persona_key: &str, content: &str) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create report dir {}", self.dir.display()))?;

        let path = self.path_for(persona_key);
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("failed to write report {}", path.display()))?;
        Ok(path)
    }

    /// `try_save` that logs instead of propagating.
    pub async fn save(&self, persona_key: &str, content: &str) -> SaveOutcome {
        match self.try_save(persona_key, content).await {
            Ok(path) => {
                tracing::info!(persona = %persona_key, path = %path.display(), "report saved");
                SaveOutcome::Saved(path)
            }
            Err(error) => {
                let path = self.path_for(persona_key);
                tracing::error!(
                    persona = %persona_key,
                    path = %path.display(),
                    error = %error,
                    "report write failed"
                );
                SaveOutcome::Failed { path, error }
            }
        }
    }
}

pub fn report_filename(persona_key: &str) -> String {
    format!(
        "{}{REPORT_SUFFIX}",
        persona_key.trim().to_lowercase().replace(' ', "_")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir()
            .join("folio-report-tests")
            .join(uuid::Uuid::new_v4().to_string())
    }

    #[test]
    fn normalizes_persona_key() {
        assert_eq!(report_filename("college_student"), "college_student_report.md");
        assert_eq!(report_filename("Long Term Holder"), "long_term_holder_report.md");
    }

    #[tokio::test]
    async fn creates_dir_and_overwrites() {
        let dir = scratch_dir();
        let writer = ReportWriter::new(&dir);

        let first = writer.save("College Student", "first").await;
        assert!(first.is_saved());
        let second = writer.save("College Student", "second").await;
        assert!(second.is_saved());

        let path = dir.join("college_student_report.md");
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "second");
        assert_eq!(second.message(), format!("Report saved to {}", path.display()));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn failure_is_reported_not_raised() {
        let dir = scratch_dir();
        tokio::fs::create_dir_all(&dir).await.unwrap();
        // A regular file where the report directory should be.
        let blocker = dir.join("blocked");
        tokio::fs::write(&blocker, "x").await.unwrap();

        let outcome = ReportWriter::new(&blocker).save("college_student", "body").await;
        assert!(!outcome.is_saved());
        assert!(outcome.message().starts_with("Error writing report to "));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
