//! examples of usage of RustedComplexPlot
/// Numbered plot requests: single functions, several rows, custom z-mappings
pub mod complex_plot_examples;
