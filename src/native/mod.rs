//! Native build invoker.
//!
//! Runs the external wasm build script synchronously before every bundle
//! pass. The script inherits our standard streams, so its compiler output
//! appears directly in the terminal.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::bundler::BuildStartHook;
use crate::config::BuildConfig;
use crate::core::BuildError;
use crate::utils::exec::Cmd;

/// External build command with a mode-dependent flag.
#[derive(Debug, Clone)]
pub struct NativeBuild {
    program: PathBuf,
    flag: Option<&'static str>,
    cwd: PathBuf,
    vars: FxHashMap<String, String>,
}

impl NativeBuild {
    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            program: config.native_cmd.clone(),
            flag: config.mode.native_flag(),
            cwd: config.root.clone(),
            vars: build_vars(config),
        }
    }

    fn command(&self) -> Cmd {
        Cmd::new(&self.program)
            .arg_opt(self.flag)
            .cwd(&self.cwd)
            .envs(&self.vars)
    }

    /// Run the build, blocking until the subprocess exits.
    pub fn run(&self) -> Result<(), BuildError> {
        let cmd = self.command();
        let command = cmd.display();
        crate::log!("native"; "running: {}", command);

        let status = cmd.status().map_err(|source| BuildError::Spawn {
            command: command.clone(),
            source,
        })?;

        if !status.success() {
            return Err(BuildError::Native { command, status });
        }

        crate::debug!("native"; "done: {}", command);
        Ok(())
    }
}

impl BuildStartHook for NativeBuild {
    fn name(&self) -> &str {
        "native"
    }

    fn on_build_start(&self) -> Result<(), BuildError> {
        self.run()
    }
}

/// `$WASMSERVE_*` variables exported to the build script.
fn build_vars(config: &BuildConfig) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();
    vars.insert("WASMSERVE_MODE".into(), config.mode.label().into());
    vars.insert("WASMSERVE_ROOT".into(), config.root.display().to_string());
    vars.insert(
        "WASMSERVE_OUT_DIR".into(),
        config.out_dir.display().to_string(),
    );
    vars
}
