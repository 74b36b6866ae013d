//! different utility modules used throughout the project
/// terminal and file logging set up with simplelog
pub mod logger;
/// rendering of the surfaces and the real-axis curve with plotters
pub mod plots;
/// named color scales for phase coloring
pub mod color_scales;
/// tiny module to save sampled surfaces into csv files
pub mod save_results;
/// TOML plot file: domain, expressions, plot and logging sections
pub mod config;
