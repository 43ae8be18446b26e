//! CLI domain: parse, route, output, and presentation only.
//! Generation itself lives in the generation module; the route drives one run.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::Cli;
pub use presentation::{format_run_header, format_summary_json, format_summary_text, ConsoleSink};
pub use route::RunContext;
