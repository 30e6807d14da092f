use crate::utils::error::Result;
use std::path::Path;

/// Replaces whatever follows the last `identifier` on each matching line with `version`.
///
/// Returns the number of lines rewritten.
pub async fn write_build_version(path: &Path, identifier: &str, version: &str) -> Result<usize> {
    let content = tokio::fs::read_to_string(path).await?;
    let (rewritten, count) = rewrite_lines(&content, identifier, version);

    if count == 0 {
        tracing::warn!("⚠️ No line in {} contains '{}'", path.display(), identifier);
        return Ok(0);
    }

    tokio::fs::write(path, rewritten).await?;
    tracing::info!("📝 Updated {} line(s) in {} to {}", count, path.display(), version);
    Ok(count)
}

fn rewrite_lines(content: &str, identifier: &str, version: &str) -> (String, usize) {
    let mut out = String::with_capacity(content.len());
    let mut count = 0;

    for line in content.split_inclusive('\n') {
        match line.rfind(identifier) {
            Some(idx) if !identifier.is_empty() => {
                out.push_str(&line[..idx + identifier.len()]);
                out.push_str(version);
                out.push('\n');
                count += 1;
            }
            _ => out.push_str(line),
        }
    }

    (out, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DEPLOYMENT: &str = "\
spec:
  containers:
    - name: web
      image: registry.local/web:0.9.0
    - name: sidecar
      image: registry.local/proxy:1.1
";

    #[test]
    fn test_rewrite_only_matching_lines() {
        let (out, count) = rewrite_lines(DEPLOYMENT, "registry.local/web:", "1.0.1");

        assert_eq!(count, 1);
        assert!(out.contains("      image: registry.local/web:1.0.1\n"));
        assert!(out.contains("      image: registry.local/proxy:1.1\n"));
        assert!(out.starts_with("spec:\n"));
    }

    #[test]
    fn test_rewrite_uses_last_occurrence_and_adds_newline() {
        let (out, count) = rewrite_lines("tag: web:web:old", "web:", "2");
        assert_eq!(count, 1);
        assert_eq!(out, "tag: web:web:2\n");
    }

    #[tokio::test]
    async fn test_write_build_version_updates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deployment.yaml");
        std::fs::write(&path, DEPLOYMENT).unwrap();

        let count = write_build_version(&path, "registry.local/web:", "1.0.1").await.unwrap();

        assert_eq!(count, 1);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("registry.local/web:1.0.1"));
    }

    #[tokio::test]
    async fn test_write_build_version_leaves_unmatched_file_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deployment.yaml");
        std::fs::write(&path, DEPLOYMENT).unwrap();

        let count = write_build_version(&path, "registry.local/app:", "1.0.1").await.unwrap();

        assert_eq!(count, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEPLOYMENT);
    }
}
