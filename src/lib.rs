// Library surface for headless/integration tests and reuse.
// The binary in main.rs only adds the CLI and terminal plumbing.
pub mod app;
pub mod app_dirs;
pub mod best_score;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod runtime;
pub mod session;
pub mod target_text;
pub mod time_series;
pub mod timer;
pub mod ui;
pub mod util;
pub mod word_source;
