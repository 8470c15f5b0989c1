//! Merge command handler

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::MergeArgs;
use covreport::ExecFileLoader;
use tracing::info;

/// Execute the merge command
///
/// Records of the same class are merged probe by probe; sessions are kept
/// in load order.
pub fn execute_merge(config: &CliConfig, args: &MergeArgs) -> CliResult<()> {
    let loader = merge_files(args)?;
    if let Some(parent) = args.dest.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    loader.save(&args.dest)?;
    info!(
        files = args.files.len(),
        classes = loader.execution_data_store().len(),
        dest = %args.dest.display(),
        "merged execution data"
    );
    if !config.verbosity.is_quiet() {
        println!(
            "Merged {} file(s) into {}",
            args.files.len(),
            args.dest.display()
        );
    }
    Ok(())
}

/// Load every input into one loader
pub fn merge_files(args: &MergeArgs) -> CliResult<ExecFileLoader> {
    let mut loader = ExecFileLoader::new();
    for path in &args.files {
        loader.load(path)?;
    }
    Ok(loader)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use covreport::exec::ExecutionDataWriter;
    use covreport::{ClassId, ExecutionData, SessionInfo};
    use std::path::Path;

    fn write_exec(path: &Path, session: &str, probes: Vec<bool>) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ExecutionDataWriter::new(file).unwrap();
        writer
            .write_session_info(&SessionInfo::new(session, 0, 1))
            .unwrap();
        writer
            .write_execution_data(&ExecutionData::new(ClassId::new(1), "pkg/Foo", probes))
            .unwrap();
        let _ = writer.finish().unwrap();
    }

    #[test]
    fn test_merge_ors_probes_and_keeps_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.exec");
        let b = dir.path().join("b.exec");
        write_exec(&a, "s1", vec![true, false, false]);
        write_exec(&b, "s2", vec![false, false, true]);
        let dest = dir.path().join("out/all.exec");
        let args = MergeArgs {
            files: vec![a, b],
            dest: dest.clone(),
        };
        execute_merge(&CliConfig::new(), &args).unwrap();

        let mut merged = ExecFileLoader::new();
        merged.load(&dest).unwrap();
        let data = merged
            .execution_data_store()
            .get(ClassId::new(1))
            .unwrap();
        assert_eq!(data.probes(), &[true, false, true]);
        let ids: Vec<String> = merged
            .session_info_store()
            .infos()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["s1", "s2"]);
    }

    #[test]
    fn test_merge_incompatible_probe_counts_fails() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.exec");
        let b = dir.path().join("b.exec");
        write_exec(&a, "s1", vec![true]);
        write_exec(&b, "s2", vec![true, false]);
        let args = MergeArgs {
            files: vec![a, b],
            dest: dir.path().join("all.exec"),
        };
        assert!(merge_files(&args).is_err());
    }

    #[test]
    fn test_merge_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = MergeArgs {
            files: vec![dir.path().join("absent.exec")],
            dest: dir.path().join("all.exec"),
        };
        assert!(execute_merge(&CliConfig::new(), &args).is_err());
        assert!(!dir.path().join("all.exec").exists());
    }
}
