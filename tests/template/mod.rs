//! テンプレートエミッタテストの共通モジュール

use tsumiki::{
    generate, Block, BlockDocument, EmitterDefinition, EmitterRegistry, FieldValue,
    GeneratedProgram, GeneratorConfig,
};

/// サーボライブラリの定義（テスト用の代表例）
pub fn servo_definition() -> EmitterDefinition {
    serde_json::from_str(
        r##"{
            "blockType": "servo_write",
            "templates": {
                "library": "#include <Servo.h>",
                "object": "Servo ${OBJECT};",
                "setup": "${OBJECT}.attach(${PIN});",
                "code": "${OBJECT}.write(${ANGLE});"
            },
            "args": {
                "values": ["PIN", "ANGLE"]
            }
        }"##,
    )
    .expect("valid servo definition")
}

/// 数値リテラルブロック
pub fn number_block(id: &str, value: f64) -> Block {
    let mut block = Block::new(id, "math_number");
    block.fields.insert("NUM".to_owned(), FieldValue::Number(value));
    block
}

/// サーボ書き込みブロック（PIN/ANGLEは数値ブロックへ接続）
pub fn servo_block(id: &str, pin_id: &str, angle_id: &str) -> Block {
    let mut block = Block::new(id, "servo_write");
    block.value_inputs.insert("PIN".to_owned(), pin_id.into());
    block.value_inputs.insert("ANGLE".to_owned(), angle_id.into());
    block
}

/// 定義を登録したレジストリで生成する
pub fn generate_with(
    definitions: Vec<EmitterDefinition>,
    document: &BlockDocument,
) -> GeneratedProgram {
    let mut registry = EmitterRegistry::with_builtins();
    for definition in definitions {
        registry.register_definition(definition);
    }
    generate(document, &registry, GeneratorConfig::default())
}

// サブモジュールの宣言
mod emitter_test;
