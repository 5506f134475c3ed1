//! Tools exposed to the model

pub mod file_writer;
pub mod search;
pub mod weather;

pub use file_writer::{FILE_WRITER_TOOL_NAME, FileWriterTool, output_file_name};
pub use search::{SEARCH_TOOL_NAME, SearchHit, SearchTool};
pub use weather::{WEATHER_TOOL_NAME, WeatherTool};
