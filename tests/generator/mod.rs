//! コード生成テストの共通モジュール
//!
//! コード生成テストで使用する共通のヘルパー関数を定義する。

use tsumiki::{
    generate, Block, BlockDocument, EmitterRegistry, FieldValue, GeneratedProgram,
    GeneratorConfig,
};

/// 標準ブロック入りのレジストリを作るヘルパー関数
pub fn registry() -> EmitterRegistry {
    EmitterRegistry::with_builtins()
}

/// デフォルト設定でドキュメントからスケッチを生成するヘルパー関数
pub fn generate_program(document: &BlockDocument) -> GeneratedProgram {
    generate(document, &registry(), GeneratorConfig::default())
}

/// 数値リテラルブロックを作るヘルパー関数
pub fn number_block(id: &str, value: f64) -> Block {
    let mut block = Block::new(id, "math_number");
    block.fields.insert("NUM".to_owned(), FieldValue::Number(value));
    block
}

/// 四則演算ブロックを作るヘルパー関数
pub fn arithmetic_block(id: &str, op: &str, a: &str, b: &str) -> Block {
    let mut block = Block::new(id, "math_arithmetic");
    block
        .fields
        .insert("OP".to_owned(), FieldValue::Text(op.to_owned()));
    block.value_inputs.insert("A".to_owned(), a.into());
    block.value_inputs.insert("B".to_owned(), b.into());
    block
}

/// 変数代入ブロックを作るヘルパー関数
pub fn set_block(id: &str, var: &str, value: &str) -> Block {
    let mut block = Block::new(id, "variables_set");
    block
        .fields
        .insert("VAR".to_owned(), FieldValue::Text(var.to_owned()));
    block.value_inputs.insert("VALUE".to_owned(), value.into());
    block
}

mod chain_test;
mod diagnostics_test;
