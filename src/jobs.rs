use std::path::{Path, PathBuf};

use tokio::io;

/// One job: a `.jobs` file of commands paired with the `.out` path its
/// output lands in, beside the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    /// File stem, used for logs and metrics labels.
    pub name: String,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Scan one directory level for regular `.jobs` files, sorted by file name
/// so a directory always yields the same dispatch order regardless of
/// filesystem iteration order.
pub async fn discover_jobs(dir: &Path) -> io::Result<Vec<JobSpec>> {
    let mut specs = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("jobs") {
            continue;
        }
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("job")
            .to_string();
        let output = path.with_extension("out");
        specs.push(JobSpec { name, input: path, output });
    }
    specs.sort_by(|a, b| a.input.file_name().cmp(&b.input.file_name()));
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("seatgrid-jobs-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn finds_jobs_files_sorted_by_name() {
        let dir = scratch_dir("sorted");
        for name in ["b.jobs", "a.jobs", "c.jobs", "notes.txt", "stale.out"] {
            std::fs::write(dir.join(name), "LIST\n").unwrap();
        }

        let specs = discover_jobs(&dir).await.unwrap();
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn output_sits_beside_input_with_out_extension() {
        let dir = scratch_dir("output");
        std::fs::write(dir.join("batch.jobs"), "").unwrap();

        let specs = discover_jobs(&dir).await.unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].input, dir.join("batch.jobs"));
        assert_eq!(specs[0].output, dir.join("batch.out"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn ignores_subdirectories_even_with_jobs_suffix() {
        let dir = scratch_dir("subdir");
        std::fs::create_dir(dir.join("nested.jobs")).unwrap();
        std::fs::write(dir.join("real.jobs"), "LIST\n").unwrap();

        let specs = discover_jobs(&dir).await.unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "real");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn empty_directory_yields_no_jobs() {
        let dir = scratch_dir("empty");
        assert!(discover_jobs(&dir).await.unwrap().is_empty());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = std::env::temp_dir().join("seatgrid-jobs-never-created");
        assert!(discover_jobs(&dir).await.is_err());
    }
}
