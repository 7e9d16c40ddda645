use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod file_read;
pub mod file_write;

pub use file_read::FileReadTool;
pub use file_write::FileWriteTool;

/// Converts the loosely-typed argument object into a tool's argument struct.
pub fn parse_args<T: DeserializeOwned>(args: Value) -> anyhow::Result<T> {
    serde_json::from_value(args).map_err(|e| anyhow::anyhow!("Invalid arguments: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Args {
        path: String,
    }

    #[test]
    fn parse_args_accepts_matching_shape() {
        let args: Args = parse_args(json!({ "path": "a.txt", "extra": true })).unwrap();
        assert_eq!(args.path, "a.txt");
    }

    #[test]
    fn parse_args_reports_missing_field() {
        let err = parse_args::<Args>(json!({})).unwrap_err();
        assert!(err.to_string().contains("missing field `path`"));
    }

    #[test]
    fn parse_args_rejects_non_object() {
        assert!(parse_args::<Args>(json!("a.txt")).is_err());
    }
}
