use crate::tools::parse_args;
use crate::traits::{Tool, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct WriteFileArgs {
    path: String,
    content: String,
}

pub struct FileWriteTool {
    workspace: PathBuf,
}

impl FileWriteTool {
    pub fn new(workspace: impl AsRef<Path>) -> Self {
        Self {
            workspace: workspace.as_ref().to_path_buf(),
        }
    }

    /// Creates `path`, or the lowest free `stem_N.ext` (N >= 1) when the name
    /// is taken. Any existing entry counts as taken, dangling symlinks
    /// included. Returns the name used, relative to the workspace.
    fn write_new(&self, path: &Path, content: &str) -> std::io::Result<PathBuf> {
        let mut n = 0;
        loop {
            let candidate = if n == 0 {
                path.to_path_buf()
            } else {
                numbered_path(path, n)
            };

            match create_new(&self.workspace.join(&candidate), content) {
                Ok(()) => return Ok(candidate),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e),
            }
        }
    }
}

/// `report.txt` -> `report_3.txt`, `Makefile` -> `Makefile_3`.
fn numbered_path(path: &Path, n: u64) -> PathBuf {
    let mut file_name = OsString::new();
    if let Some(stem) = path.file_stem() {
        file_name.push(stem);
    }
    file_name.push(format!("_{n}"));
    if let Some(ext) = path.extension() {
        file_name.push(".");
        file_name.push(ext);
    }
    path.with_file_name(file_name)
}

fn create_new(path: &Path, content: &str) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    let mut file = options.open(path)?;
    file.write_all(content.as_bytes())
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file at the given path. Creates the file if it doesn't exist. \
         Existing files are never overwritten: a numbered suffix is added instead."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Relative file path"
                },
                "content": {
                    "type": "string",
                    "description": "Content to write to the file"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let WriteFileArgs { path, content } = parse_args(args)?;
        if path.trim().is_empty() {
            return Ok(ToolResult::error("'path' must not be empty"));
        }

        let path = Path::new(&path);
        let full_path = self.workspace.join(path);

        if let Some(parent) = full_path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            return Ok(ToolResult::error(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            )));
        }

        match self.write_new(path, &content) {
            Ok(target) => Ok(ToolResult::success(format!(
                "Successfully wrote to {}",
                target.display()
            ))),
            Err(e) => Ok(ToolResult::error(format!(
                "Failed to write {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
