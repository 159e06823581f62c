//! Parameter shaping for the tools every server ships with

use crate::error::{Result, ToolError};
use crate::tools::ToolParameters;
use serde::{Serialize, Serializer};
use serde_json::json;

/// Shell command execution
pub const EXECUTE_BASH: &str = "execute_bash";

/// IPython cell execution
pub const EXECUTE_IPYTHON_CELL: &str = "execute_ipython_cell";

/// Line-range file editing
pub const EDIT_FILE: &str = "edit_file";

/// Last line of an edit range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnd {
    /// Through the end of the file; sent as `-1`
    EndOfFile,
    /// Through this 1-indexed line, inclusive
    Line(u32),
}

impl LineEnd {
    /// Wire representation
    pub fn as_wire(&self) -> i64 {
        match self {
            LineEnd::EndOfFile => -1,
            LineEnd::Line(line) => i64::from(*line),
        }
    }
}

impl Serialize for LineEnd {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_wire())
    }
}

/// Inclusive, 1-indexed line range for `edit_file`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineRange {
    pub start: u32,
    pub end: LineEnd,
}

impl LineRange {
    /// Build a validated range
    pub fn new(start: u32, end: LineEnd) -> Result<Self> {
        if start == 0 {
            return Err(invalid_range("start must be 1 or greater"));
        }
        if let LineEnd::Line(line) = end {
            if line < start {
                return Err(invalid_range(&format!(
                    "end ({}) must not precede start ({})",
                    line, start
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// Build from raw wire values, where `end = -1` means end of file
    pub fn from_raw(start: i64, end: i64) -> Result<Self> {
        let start = u32::try_from(start)
            .map_err(|_| invalid_range(&format!("start {} is out of range", start)))?;
        let end = match end {
            -1 => LineEnd::EndOfFile,
            line => LineEnd::Line(u32::try_from(line).map_err(|_| {
                invalid_range(&format!(
                    "end {} is not a line number or -1 (end of file)",
                    line
                ))
            })?),
        };
        Self::new(start, end)
    }

    /// The whole file
    pub fn whole_file() -> Self {
        Self {
            start: 1,
            end: LineEnd::EndOfFile,
        }
    }
}

impl Default for LineRange {
    fn default() -> Self {
        Self::whole_file()
    }
}

fn invalid_range(message: &str) -> crate::error::Error {
    ToolError::InvalidParameters {
        message: format!("invalid line range: {}", message),
    }
    .into()
}

/// `{"command": ...}`
pub fn bash_parameters(command: &str) -> ToolParameters {
    object(json!({ "command": command }))
}

/// `{"code": ...}`
pub fn code_cell_parameters(code: &str) -> ToolParameters {
    object(json!({ "code": code }))
}

/// `{"path", "new_content_draft", "start", "end"}`
pub fn edit_file_parameters(path: &str, new_content_draft: &str, range: LineRange) -> ToolParameters {
    object(json!({
        "path": path,
        "new_content_draft": new_content_draft,
        "start": range.start,
        "end": range.end,
    }))
}

fn object(value: serde_json::Value) -> ToolParameters {
    match value {
        serde_json::Value::Object(map) => map,
        _ => ToolParameters::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_parameters() {
        let params = bash_parameters("echo hi");
        assert_eq!(serde_json::Value::Object(params), json!({"command": "echo hi"}));
    }

    #[test]
    fn test_code_cell_parameters() {
        let params = code_cell_parameters("print(1)");
        assert_eq!(serde_json::Value::Object(params), json!({"code": "print(1)"}));
    }

    #[test]
    fn test_edit_file_sends_end_sentinel_verbatim() {
        let params = edit_file_parameters("src/app.py", "x = 1\n", LineRange::default());
        assert_eq!(
            serde_json::Value::Object(params),
            json!({
                "path": "src/app.py",
                "new_content_draft": "x = 1\n",
                "start": 1,
                "end": -1,
            })
        );
    }

    #[test]
    fn test_edit_file_explicit_range() {
        let range = LineRange::new(3, LineEnd::Line(7)).unwrap();
        let params = edit_file_parameters("a.txt", "", range);
        assert_eq!(params["start"], json!(3));
        assert_eq!(params["end"], json!(7));
    }

    #[test]
    fn test_from_raw_accepts_valid_ranges() {
        assert_eq!(LineRange::from_raw(1, -1).unwrap(), LineRange::whole_file());
        assert_eq!(
            LineRange::from_raw(4, 4).unwrap(),
            LineRange {
                start: 4,
                end: LineEnd::Line(4)
            }
        );
    }

    #[test]
    fn test_from_raw_rejects_malformed_ranges() {
        assert!(LineRange::from_raw(0, -1).is_err());
        assert!(LineRange::from_raw(-3, 10).is_err());
        assert!(LineRange::from_raw(1, -2).is_err());
        assert!(LineRange::from_raw(10, 5).is_err());
    }
}
