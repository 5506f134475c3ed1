//! Command-line interface for chatbot-rs
//!
//! # Usage
//!
//! ```bash
//! # Keys can also live in a .env file in the working directory
//! export DASHSCOPE_API_KEY="sk-..."
//! export OPENWEATHER_API_KEY="..."
//! export TAVILY_API_KEY="tvly-..."
//!
//! # One question
//! chatbot -m "杭州今天天气怎么样？"
//!
//! # Interactive session
//! chatbot
//! ```

use async_trait::async_trait;
use chatbot_assistant::{
    AssistantConfig, ReqwestTransport, create_assistant_with, create_provider,
};
use chatbot_core::{Agent, Context};
use chatbot_runtime::{ExecutorEventHandler, ToolAgent};
use clap::Parser;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

const HELP: &str = "\
Commands:
  /help   显示帮助 (Show this help)
  /exit   退出 (Exit)

Or ask in natural language:
  杭州今天天气怎么样？
  最近有什么科技新闻？
  把上海的天气总结写入文件";

#[derive(Parser, Debug)]
#[command(name = "chatbot")]
#[command(about = "Chat assistant with web search, weather and file tools", long_about = None)]
struct Args {
    /// Ask one question, print the answer and exit
    #[arg(short, long)]
    message: Option<String>,

    /// Chat model (default: qwen-flash, or CHATBOT_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// OpenAI-compatible API base URL (default: DashScope, or CHATBOT_API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// Directory for files written by the assistant (or CHATBOT_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Model/tool rounds allowed per question
    #[arg(long)]
    max_iterations: Option<usize>,
}

impl Args {
    fn into_config(self, base: AssistantConfig) -> chatbot_assistant::Result<AssistantConfig> {
        let mut builder = AssistantConfig::builder().base(base);
        if let Some(model) = self.model {
            builder = builder.model(model);
        }
        if let Some(api_base) = self.api_base {
            builder = builder.api_base(api_base);
        }
        if let Some(dir) = self.output_dir {
            builder = builder.output_dir(dir);
        }
        if let Some(max) = self.max_iterations {
            builder = builder.max_iterations(max);
        }
        builder.build()
    }
}

/// REPL input, after trimming
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Help,
    Exit,
    Question(&'a str),
}

impl<'a> Input<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            "" => Self::Empty,
            "/help" => Self::Help,
            "/exit" | "/quit" => Self::Exit,
            text => Self::Question(text),
        }
    }
}

/// Echoes tool activity to stderr
struct ToolEcho;

#[async_trait]
impl ExecutorEventHandler for ToolEcho {
    async fn on_tool_start(&self, _id: &str, name: &str, input: &Value) {
        eprintln!("  → {name} {input}");
    }

    async fn on_tool_done(
        &self,
        _id: &str,
        name: &str,
        result: std::result::Result<&str, &str>,
        duration_ms: u64,
    ) {
        match result {
            Ok(_) => eprintln!("  ✓ {name} ({duration_ms} ms)"),
            Err(e) => eprintln!("  ✗ {name} ({duration_ms} ms): {e}"),
        }
    }
}

async fn ask(agent: &ToolAgent, question: &str, context: &mut Context) -> anyhow::Result<String> {
    let answer = agent.process(question.to_string(), context).await?;
    info!(
        tools = ?context.tools_called(),
        iterations = context.iterations(),
        "Turn completed"
    );
    Ok(answer)
}

async fn run_repl(agent: &ToolAgent, mut context: Context) -> anyhow::Result<()> {
    println!("chatbot ready. Type /help for commands, /exit to quit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        match Input::parse(&line) {
            Input::Empty => {}
            Input::Help => println!("{HELP}\n"),
            Input::Exit => {
                println!("Goodbye!");
                break;
            }
            Input::Question(question) => match ask(agent, question, &mut context).await {
                Ok(answer) => println!("{answer}\n"),
                Err(e) => eprintln!("Error: {e}\n"),
            },
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = chatbot_utils::load_dotenv();
    chatbot_utils::init_tracing("warn,chatbot=info");
    if let Some(path) = &dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    let mut args = Args::parse();
    let message = args.message.take();
    let config = args.into_config(AssistantConfig::from_env())?;

    if config.weather.api_key.is_none() {
        warn!("OPENWEATHER_API_KEY is not set; weather lookups will be rejected");
    }
    if config.search.api_key.is_none() {
        warn!("TAVILY_API_KEY is not set; web search is unavailable");
    }

    let provider = create_provider(&config)?;
    let transport = Arc::new(ReqwestTransport::new(config.request_timeout)?);
    let agent = create_assistant_with(provider, &config, transport, Some(Arc::new(ToolEcho)))?;

    let session_id = uuid::Uuid::new_v4().to_string();
    info!(session = %session_id, model = %config.model, "Starting chatbot");
    let mut context = Context::new().with_session_id(session_id);

    match message {
        Some(question) => {
            let answer = ask(&agent, &question, &mut context).await?;
            println!("{answer}");
        }
        None => run_repl(&agent, context).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_parsing() {
        assert_eq!(Input::parse("  \n"), Input::Empty);
        assert_eq!(Input::parse("/help\n"), Input::Help);
        assert_eq!(Input::parse("/exit"), Input::Exit);
        assert_eq!(
            Input::parse(" 杭州天气怎么样？\n"),
            Input::Question("杭州天气怎么样？")
        );
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "chatbot",
            "--model",
            "qwen-plus",
            "--output-dir",
            "/tmp/chatbot-out",
            "--max-iterations",
            "3",
        ]);
        assert!(args.message.is_none());

        let config = args.into_config(AssistantConfig::default()).unwrap();
        assert_eq!(config.model, "qwen-plus");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/chatbot-out"));
        assert_eq!(config.max_iterations, 3);
    }

    #[test]
    fn test_one_shot_message_flag() {
        let args = Args::parse_from(["chatbot", "-m", "最近有什么新闻？"]);
        assert_eq!(args.message.as_deref(), Some("最近有什么新闻？"));
    }

    #[test]
    fn test_invalid_flag_values_rejected() {
        let args = Args::parse_from(["chatbot", "--max-iterations", "0"]);
        assert!(args.into_config(AssistantConfig::default()).is_err());
    }
}
