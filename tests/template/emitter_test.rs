//! テンプレートエミッタ経由の生成テスト

use super::*;
use pretty_assertions::assert_eq;
use tsumiki::{Block, BlockDocument, EmitterDefinition, FieldValue, Severity};

#[test]
fn test_servo_sketch() {
    let mut first = servo_block("s1", "p1", "a1");
    first.next = Some("s2".into());
    let second = servo_block("s2", "p2", "a2");

    let document = BlockDocument::new()
        .with_block(first)
        .with_block(second)
        .with_block(number_block("p1", 9.0))
        .with_block(number_block("a1", 0.0))
        .with_block(number_block("p2", 9.0))
        .with_block(number_block("a2", 180.0))
        .with_root("s1");

    let program = generate_with(vec![servo_definition()], &document);

    assert_eq!(
        program.code,
        "#include <Servo.h>\n\n\
         Servo servo_9;\n\n\
         void setup() {\n\
         \x20 servo_9.attach(9);\n\
         }\n\n\
         void loop() {\n\
         \x20 servo_9.write(0);\n\
         \x20 servo_9.write(180);\n\
         }\n"
    );
}

#[test]
fn test_same_pin_objects_deduplicate() {
    // ピン9を設定する2つのブロックはservo_9という1つの宣言に収束する
    let mut first = servo_block("s1", "p1", "a1");
    first.next = Some("s2".into());
    let document = BlockDocument::new()
        .with_block(first)
        .with_block(servo_block("s2", "p2", "a2"))
        .with_block(number_block("p1", 9.0))
        .with_block(number_block("a1", 10.0))
        .with_block(number_block("p2", 9.0))
        .with_block(number_block("a2", 20.0))
        .with_root("s1");

    let program = generate_with(vec![servo_definition()], &document);
    assert_eq!(program.code.matches("Servo servo_9;").count(), 1);
    assert_eq!(program.code.matches(".attach(9);").count(), 1);
}

#[test]
fn test_different_pins_get_separate_objects() {
    let mut first = servo_block("s1", "p1", "a1");
    first.next = Some("s2".into());
    let document = BlockDocument::new()
        .with_block(first)
        .with_block(servo_block("s2", "p2", "a2"))
        .with_block(number_block("p1", 9.0))
        .with_block(number_block("a1", 10.0))
        .with_block(number_block("p2", 10.0))
        .with_block(number_block("a2", 20.0))
        .with_root("s1");

    let program = generate_with(vec![servo_definition()], &document);
    assert!(program.code.contains("Servo servo_9;"));
    assert!(program.code.contains("Servo servo_10;"));
    assert!(program.code.contains("servo_10.attach(10);"));
}

#[test]
fn test_library_include_is_deduplicated_by_type() {
    let mut first = servo_block("s1", "p1", "a1");
    first.next = Some("s2".into());
    let document = BlockDocument::new()
        .with_block(first)
        .with_block(servo_block("s2", "p2", "a2"))
        .with_block(number_block("p1", 3.0))
        .with_block(number_block("a1", 1.0))
        .with_block(number_block("p2", 5.0))
        .with_block(number_block("a2", 2.0))
        .with_root("s1");

    let program = generate_with(vec![servo_definition()], &document);
    assert_eq!(program.code.matches("#include <Servo.h>").count(), 1);
}

#[test]
fn test_conditional_region_in_template() {
    let definition: EmitterDefinition = serde_json::from_str(
        r#"{
            "blockType": "counter_step",
            "templates": {
                "code": "{{ '${MODE}' == 'UP' ? 'steps++;' : 'steps--;' }}"
            },
            "args": {
                "fields": ["MODE"]
            }
        }"#,
    )
    .unwrap();

    let mut up = Block::new("u", "counter_step");
    up.fields
        .insert("MODE".to_owned(), FieldValue::Text("UP".to_owned()));
    up.next = Some("d".into());
    let mut down = Block::new("d", "counter_step");
    down.fields
        .insert("MODE".to_owned(), FieldValue::Text("DOWN".to_owned()));

    let document = BlockDocument::new()
        .with_block(up)
        .with_block(down)
        .with_root("u");

    let program = generate_with(vec![definition], &document);
    assert!(program.code.contains("steps++;"));
    assert!(program.code.contains("steps--;"));
    assert!(program.diagnostics.is_empty());
}

#[test]
fn test_broken_region_degrades_without_aborting() {
    let definition: EmitterDefinition = serde_json::from_str(
        r#"{
            "blockType": "broken",
            "templates": {
                "code": "{{ ${N} + }}"
            },
            "args": {
                "fields": ["N"]
            }
        }"#,
    )
    .unwrap();

    let mut broken = Block::new("b", "broken");
    broken
        .fields
        .insert("N".to_owned(), FieldValue::Number(1.0));
    broken.next = Some("d".into());
    let mut tail = Block::new("d", "time_delay");
    tail.value_inputs.insert("MS".to_owned(), "m".into());

    let document = BlockDocument::new()
        .with_block(broken)
        .with_block(tail)
        .with_block(number_block("m", 5.0))
        .with_root("b");

    let program = generate_with(vec![definition], &document);
    // 失敗した領域は部分置換のまま残る
    assert!(program.code.contains("{{ 1 + }}"));
    // 後続の生成は継続する
    assert!(program.code.contains("delay(5);"));
    assert!(program
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Warning));
}

#[test]
fn test_missing_argument_degrades_to_placeholder() {
    // 定義がANGLEを要求するがブロックに入力が無い
    let document = BlockDocument::new()
        .with_block({
            let mut block = Block::new("s", "servo_write");
            block.value_inputs.insert("PIN".to_owned(), "p".into());
            block
        })
        .with_block(number_block("p", 9.0))
        .with_root("s");

    let program = generate_with(vec![servo_definition()], &document);
    assert!(program.code.contains("servo_9.write(?);"));
    assert!(program
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Warning && d.message.contains("ANGLE")));
}

#[test]
fn test_re_registration_wins() {
    // 同じ型を再登録すると後の定義が使われる（ホットリロード）
    let old: EmitterDefinition = serde_json::from_str(
        r#"{"blockType": "beep", "templates": {"code": "oldBeep();"}}"#,
    )
    .unwrap();
    let new: EmitterDefinition = serde_json::from_str(
        r#"{"blockType": "beep", "templates": {"code": "newBeep();"}}"#,
    )
    .unwrap();

    let document = BlockDocument::new()
        .with_block(Block::new("b", "beep"))
        .with_root("b");

    let program = generate_with(vec![old, new], &document);
    assert!(program.code.contains("newBeep();"));
    assert!(!program.code.contains("oldBeep();"));
}

#[test]
fn test_output_definition_is_embedded_as_expression() {
    let definition: EmitterDefinition = serde_json::from_str(
        r#"{
            "blockType": "light_sensor",
            "templates": {
                "code": "analogRead(${PIN})"
            },
            "args": {
                "values": ["PIN"]
            },
            "output": true
        }"#,
    )
    .unwrap();

    let mut delay = Block::new("d", "time_delay");
    delay.value_inputs.insert("MS".to_owned(), "sensor".into());
    let mut sensor = Block::new("sensor", "light_sensor");
    sensor.value_inputs.insert("PIN".to_owned(), "p".into());

    let document = BlockDocument::new()
        .with_block(delay)
        .with_block(sensor)
        .with_block(number_block("p", 0.0))
        .with_root("d");

    let program = generate_with(vec![definition], &document);
    assert!(program.code.contains("delay(analogRead(0));"));
}

#[test]
fn test_unknown_placeholder_survives_both_passes() {
    // 定義が宣言していない${...}はそのまま出力に残る
    let definition: EmitterDefinition = serde_json::from_str(
        r#"{"blockType": "raw", "templates": {"code": "use(${UNDECLARED});"}}"#,
    )
    .unwrap();

    let document = BlockDocument::new()
        .with_block(Block::new("r", "raw"))
        .with_root("r");

    let program = generate_with(vec![definition], &document);
    assert!(program.code.contains("use(${UNDECLARED});"));
}
