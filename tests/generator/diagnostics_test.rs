//! 診断と決定性のテスト

use super::*;
use pretty_assertions::assert_eq;
use tsumiki::{Block, BlockDocument, Severity};

#[test]
fn test_unknown_block_type_is_non_fatal() {
    // 未知の型のブロックを挟んでも残りのグラフは生成される
    let mut known = Block::new("a", "time_delay");
    known.value_inputs.insert("MS".to_owned(), "m1".into());
    known.next = Some("mystery".into());

    let mut unknown = Block::new("mystery", "vendor_widget");
    unknown.next = Some("c".into());

    let mut tail = Block::new("c", "time_delay");
    tail.value_inputs.insert("MS".to_owned(), "m2".into());

    let document = BlockDocument::new()
        .with_block(known)
        .with_block(unknown)
        .with_block(tail)
        .with_block(number_block("m1", 1.0))
        .with_block(number_block("m2", 2.0))
        .with_root("a");

    let program = generate_program(&document);

    // プレースホルダは空でない可視のマーカー
    assert!(program.code.contains("// unknown block: vendor_widget"));
    // 前後のブロックは生成されている
    assert!(program.code.contains("delay(1);"));
    assert!(program.code.contains("delay(2);"));

    let unknown_diags: Vec<_> = program
        .diagnostics
        .iter()
        .filter(|d| d.message.contains("vendor_widget"))
        .collect();
    assert_eq!(unknown_diags.len(), 1);
    assert_eq!(unknown_diags[0].severity, Severity::Error);
    assert_eq!(
        unknown_diags[0].block_id.as_ref().map(|id| id.as_str()),
        Some("mystery")
    );
}

#[test]
fn test_unknown_block_in_value_position() {
    let mut delay = Block::new("a", "time_delay");
    delay.value_inputs.insert("MS".to_owned(), "mystery".into());

    let document = BlockDocument::new()
        .with_block(delay)
        .with_block(Block::new("mystery", "vendor_sensor"))
        .with_root("a");

    let program = generate_program(&document);
    // 値位置のプレースホルダも空でない
    assert!(program
        .code
        .contains("delay(0 /* unknown block: vendor_sensor */);"));
}

#[test]
fn test_statement_in_value_position_is_flagged() {
    let mut delay = Block::new("a", "time_delay");
    // time_delay（文）を値入力へ接続する
    delay.value_inputs.insert("MS".to_owned(), "b".into());

    let mut inner = Block::new("b", "time_delay");
    inner.value_inputs.insert("MS".to_owned(), "m".into());

    let document = BlockDocument::new()
        .with_block(delay)
        .with_block(inner)
        .with_block(number_block("m", 1.0))
        .with_root("a");

    let program = generate_program(&document);
    assert!(program
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Warning));
    // それでも全文は出力される
    assert!(program.code.contains("void loop()"));
}

#[test]
fn test_generation_is_deterministic() {
    // 同じグラフに対する2回のパスはバイト単位で同一
    let document = BlockDocument::new()
        .with_variable("count", "int")
        .with_block(set_block("s", "count", "sum"))
        .with_block(arithmetic_block("sum", "ADD", "one", "two"))
        .with_block(number_block("one", 1.0))
        .with_block(number_block("two", 2.0))
        .with_root("s");

    let first = generate_program(&document);
    let second = generate_program(&document);
    assert_eq!(first.code, second.code);
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn test_roots_render_in_declaration_order() {
    let document = BlockDocument::new()
        .with_block({
            let mut b = Block::new("late", "time_delay");
            b.value_inputs.insert("MS".to_owned(), "m1".into());
            b
        })
        .with_block({
            let mut b = Block::new("early", "time_delay");
            b.value_inputs.insert("MS".to_owned(), "m2".into());
            b
        })
        .with_block(number_block("m1", 111.0))
        .with_block(number_block("m2", 222.0))
        // rootsの順序が出力順を決める（ブロック表の順ではない）
        .with_root("early")
        .with_root("late");

    let program = generate_program(&document);
    let early = program.code.find("delay(222);").unwrap();
    let late = program.code.find("delay(111);").unwrap();
    assert!(early < late);
}

#[test]
fn test_missing_root_block_is_reported() {
    let document = BlockDocument::new().with_root("ghost");
    let program = generate_program(&document);
    assert!(program.code.contains("void loop()"));
    assert!(program
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Error));
}

#[test]
fn test_document_json_round_trip() {
    let json = r#"{
        "roots": ["w"],
        "blocks": {
            "w": {
                "id": "w",
                "type": "io_digitalwrite",
                "fields": {"STATE": "HIGH"},
                "valueInputs": {"PIN": "p"}
            },
            "p": {"id": "p", "type": "math_number", "fields": {"NUM": 9}}
        }
    }"#;

    let document = BlockDocument::from_json(json).expect("valid document");
    let program = generate_program(&document);
    assert!(program.code.contains("digitalWrite(9, HIGH);"));
    assert!(program.code.contains("pinMode(9, OUTPUT);"));
}
