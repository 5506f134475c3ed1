//! Writes model-produced markdown into a timestamped local file

use async_trait::async_trait;
use chatbot_core::Result as AgentResult;
use chatbot_llm::tools::schema;
use chatbot_tools::Tool;
use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::AssistantError;

/// Tool name the model calls
pub const FILE_WRITER_TOOL_NAME: &str = "write_file";

const DESCRIPTION: &str = "将指定内容写入本地文件。参数 content 为需要写入文档的具体内容 \
(markdown 格式)。返回写入结果提示信息。";

#[derive(Debug, Deserialize)]
struct WriteParams {
    content: String,
}

/// Name of the file written at `now`: `output_<YYYYMMDDHHMMSS>.md`
pub fn output_file_name(now: DateTime<Local>) -> String {
    format!("output_{}.md", now.format("%Y%m%d%H%M%S"))
}

/// Saves content under the output directory
///
/// Failures never surface as errors; the model gets a message carrying the
/// reason instead. Two writes within the same second share a file name and the
/// later one wins.
pub struct FileWriterTool {
    output_dir: PathBuf,
}

impl FileWriterTool {
    /// Create a writer targeting `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory files are written into
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `content` and describe the outcome
    pub async fn write(&self, content: &str) -> String {
        match self.try_write(content).await {
            Ok(path) => {
                info!(path = %path.display(), bytes = content.len(), "Wrote output file");
                format!("已成功写入本地文件：{}", path.display())
            }
            Err(e) => {
                warn!(dir = %self.output_dir.display(), error = %e, "Output file write failed");
                format!("文件写入失败：{e}")
            }
        }
    }

    async fn try_write(&self, content: &str) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let path = self.output_dir.join(output_file_name(Local::now()));
        tokio::fs::write(&path, content).await?;

        std::path::absolute(&path)
    }
}

#[async_trait]
impl Tool for FileWriterTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: WriteParams = serde_json::from_value(params)
            .map_err(|e| AssistantError::InvalidParameters(e.to_string()))?;

        Ok(Value::String(self.write(&params.content).await))
    }

    fn name(&self) -> &str {
        FILE_WRITER_TOOL_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({ "content": schema::string("需要写入文档的具体内容") }),
            &["content"],
        )
    }
}
