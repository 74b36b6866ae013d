/// Tokenizer for expression text (nom combinators)
pub mod lexer;
/// Rewrites user-typed text into an evaluable token stream
///
///# Example
/// ```
/// use RustedComplexPlot::symbolic::preprocess::preprocess_function;
/// let p = preprocess_function("cos(x)").unwrap();
/// // a real-only row is lifted onto the complex grid
/// assert_eq!(p.normalized(), "(cos(X)) + 0 * z");
/// ```
pub mod preprocess;
/// recursive descent parser: tokens to `Expr`
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Complex engine
/// a module
/// 1) turns a String expression into an expression tree over complex numbers
/// 2) inspects and rewrites the tree (variables, substitution)
/// 3) prints it back for logs and error messages
///# Example#
/// ```
/// use RustedComplexPlot::symbolic::complex_engine::Expr;
/// let parsed = Expr::parse_expression("sin(z) / (z + 1)").unwrap();
/// println!("parsed_expression {}", parsed);
/// let variables = parsed.extract_variables();
/// assert_eq!(variables.len(), 1);
/// ```
pub mod complex_engine;
/// Fixed set of callable functions and the complex Gamma function
pub mod complex_functions;
/// Sandboxed interpreter over arrays of complex values
pub mod complex_eval;
pub mod symbolic_errors;
