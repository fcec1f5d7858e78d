/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Program, class and feature declarations
/// - expressions: The closed set of expression kinds and operators
pub mod ast;
pub mod expressions;
