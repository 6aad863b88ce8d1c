//! Tsumiki Block Program Code Generator Library
//!
//! This library provides the core functionality for turning a visual block
//! program into an Arduino sketch (`setup()`/`loop()` source text).

pub mod block;
pub mod error;
pub mod generator;
pub mod library;
pub mod template;

// Re-export commonly used types
pub use block::{Block, BlockDocument, BlockId, FieldValue, VariableDecl};
pub use error::{Diagnostic, DiagnosticCollector, Severity, TsumikiError, TsumikiResult};
pub use generator::{
    generate, Context, Emitted, Emitter, EmitterRegistry, GeneratedProgram, GeneratorConfig,
    GeneratorSession, Order, Section,
};
pub use library::{load_definitions, EmitterDefinition, TemplateEmitter};
