use std::path::Path;

use crate::actor::fs::WatchTarget;
use crate::config::BuildConfig;

/// Watch targets for the configured project root.
///
/// Targets with an extension (the manifests) are watched as single files.
pub(super) fn collect_watch_targets(config: &BuildConfig) -> Vec<WatchTarget> {
    config
        .watch_targets()
        .into_iter()
        .map(|path| {
            if is_file_target(&path) {
                WatchTarget::file(path)
            } else {
                WatchTarget::dir(path)
            }
        })
        .collect()
}

fn is_file_target(path: &Path) -> bool {
    path.extension().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::config::Env;

    #[test]
    fn test_fixed_target_set() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli {
            root: Some(dir.path().to_path_buf()),
            ..Cli::default()
        };
        let config = BuildConfig::load(&cli, &Env::default()).unwrap();
        let root = &config.root;

        assert_eq!(
            collect_watch_targets(&config),
            vec![
                WatchTarget::dir(root.join("crate/src")),
                WatchTarget::file(root.join("crate/Cargo.toml")),
                WatchTarget::dir(root.join("crate/yew_styles/src")),
                WatchTarget::file(root.join("crate/yew_styles/Cargo.toml")),
            ]
        );
    }
}
