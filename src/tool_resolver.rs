//! # Tool Path Resolver
//!
//! Locates the external encoders used by the codec:
//! - `TOOLS_DIR` override (`$TOOLS_DIR/<tool>` or `$TOOLS_DIR/<tool>/<tool>`)
//! - System `PATH`

use crate::error::ConvertError;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Every external tool the codec may invoke
pub const CONVERSION_TOOLS: &[&str] = &["pngquant", "cwebp", "avifenc", "jpegtran"];

/// Finds external tool binaries
#[derive(Debug, Clone, Default)]
pub struct ToolPathResolver {
    /// Directory searched before `PATH`
    tools_dir: Option<PathBuf>,
}

impl ToolPathResolver {
    /// Resolver honouring the `TOOLS_DIR` environment variable
    pub fn new() -> Self {
        let tools_dir = env::var_os("TOOLS_DIR")
            .map(PathBuf::from)
            .filter(|path| path.is_dir());

        if let Some(ref dir) = tools_dir {
            debug!("Using tools directory from TOOLS_DIR: {:?}", dir);
        }

        Self { tools_dir }
    }

    pub fn with_tools_dir(tools_dir: impl Into<PathBuf>) -> Self {
        Self {
            tools_dir: Some(tools_dir.into()),
        }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        if let Some(ref tools_dir) = self.tools_dir {
            if let Some(path) = Self::find_in_tools_dir(tools_dir, tool_name) {
                debug!("Using bundled tool: {} -> {:?}", tool_name, path);
                return Some(path);
            }
        }

        if let Some(system_path) = Self::find_in_system_path(tool_name) {
            debug!("Using system tool: {} -> {:?}", tool_name, system_path);
            return Some(system_path);
        }

        warn!("Tool not found: {}", tool_name);
        None
    }

    fn find_in_tools_dir(tools_dir: &Path, tool_name: &str) -> Option<PathBuf> {
        let file_name = executable_name(tool_name);
        [
            tools_dir.join(&file_name),
            tools_dir.join(tool_name).join(&file_name),
        ]
        .into_iter()
        .find(|path| path.is_file())
    }

    /// Find tool in system PATH
    fn find_in_system_path(tool_name: &str) -> Option<PathBuf> {
        let file_name = executable_name(tool_name);
        let path = env::var_os("PATH")?;
        env::split_paths(&path)
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file())
    }

    /// Resolve a tool or explain how to install it
    pub fn require(&self, tool_name: &str) -> Result<PathBuf, ConvertError> {
        self.resolve_tool(tool_name).ok_or_else(|| {
            ConvertError::MissingDependency(format!(
                "Tool '{}' not found in TOOLS_DIR or PATH (install with: {})",
                tool_name,
                install_instructions(tool_name)
            ))
        })
    }
}

fn executable_name(tool_name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", tool_name)
    } else {
        tool_name.to_string()
    }
}

/// Installation hint for a tool
pub fn install_instructions(tool_name: &str) -> String {
    match tool_name {
        "cwebp" => "sudo apt-get install webp".to_string(),
        "jpegtran" => "sudo apt-get install libjpeg-turbo-progs".to_string(),
        "avifenc" => "sudo apt-get install libavif-bin".to_string(),
        "pngquant" => "sudo apt-get install pngquant".to_string(),
        _ => format!("sudo apt-get install {}", tool_name),
    }
}
