//! ステートメント連鎖描画のテスト

use super::*;
use tsumiki::generator::{Context, GeneratorSession};
use tsumiki::{Block, BlockDocument, FieldValue, GeneratorConfig};

fn delay_block(id: &str, ms_id: &str, next: Option<&str>) -> Block {
    let mut block = Block::new(id, "time_delay");
    block.value_inputs.insert("MS".to_owned(), ms_id.into());
    block.next = next.map(Into::into);
    block
}

#[test]
fn test_this_only_excludes_next() {
    // thisOnly=trueなら接続済みのnextのコードは決して含まれない
    let document = BlockDocument::new()
        .with_block(delay_block("a", "m1", Some("b")))
        .with_block(delay_block("b", "m2", None))
        .with_block(number_block("m1", 100.0))
        .with_block(number_block("m2", 200.0));

    let binding = registry();
    let mut session = GeneratorSession::new(GeneratorConfig::default());
    let mut ctx = Context::new(&document, &binding, &mut session);

    let isolated = ctx.statement_chain(&"a".into(), true);
    assert!(isolated.contains("delay(100);"));
    assert!(!isolated.contains("delay(200);"));

    let chained = ctx.statement_chain(&"a".into(), false);
    assert!(chained.contains("delay(100);"));
    assert!(chained.contains("delay(200);"));
}

#[test]
fn test_comment_is_prepended() {
    let mut block = delay_block("a", "m", None);
    block.comment = Some("wait for the sensor to settle".to_owned());
    let document = BlockDocument::new()
        .with_block(block)
        .with_block(number_block("m", 50.0))
        .with_root("a");

    let program = generate_program(&document);
    assert!(
        program
            .code
            .contains("// wait for the sensor to settle\n  delay(50);"),
        "got: {}",
        program.code
    );
}

#[test]
fn test_value_subtree_comments_are_collected() {
    // 値入力の部分木に付いたコメントは文の前へ集められる
    let mut number = number_block("m", 50.0);
    number.comment = Some("chosen by experiment".to_owned());
    let document = BlockDocument::new()
        .with_block(delay_block("a", "m", None))
        .with_block(number)
        .with_root("a");

    let program = generate_program(&document);
    assert!(
        program
            .code
            .contains("// chosen by experiment\n  delay(50);"),
        "got: {}",
        program.code
    );
}

#[test]
fn test_statement_nested_comments_are_not_collected() {
    // ステートメント側の子のコメントは親には現れない（子自身の位置に出る）
    let mut branch = Block::new("if", "controls_if");
    branch.value_inputs.insert("IF0".to_owned(), "c".into());
    branch.statement_inputs.insert("DO0".to_owned(), "d".into());

    let mut cond = Block::new("c", "logic_boolean");
    cond.fields
        .insert("BOOL".to_owned(), FieldValue::Text("TRUE".to_owned()));

    let mut body = delay_block("d", "m", None);
    body.comment = Some("body comment".to_owned());

    let document = BlockDocument::new()
        .with_block(branch)
        .with_block(cond)
        .with_block(body)
        .with_block(number_block("m", 10.0))
        .with_root("if");

    let program = generate_program(&document);
    // コメントはif文の前ではなく、本体内のdelayの直前に出る
    assert!(
        program.code.contains("// body comment\n    delay(10);"),
        "got: {}",
        program.code
    );
    assert!(!program.code.contains("// body comment\n  if"));
}

#[test]
fn test_long_comment_is_wrapped() {
    let mut block = delay_block("a", "m", None);
    block.comment = Some(
        "this is a very long comment that clearly exceeds the sixty column \
         limit and therefore has to be wrapped onto multiple lines"
            .to_owned(),
    );
    let document = BlockDocument::new()
        .with_block(block)
        .with_block(number_block("m", 1.0))
        .with_root("a");

    let program = generate_program(&document);
    let comment_lines: Vec<&str> = program
        .code
        .lines()
        .filter(|line| line.trim_start().starts_with("//"))
        .collect();
    assert!(comment_lines.len() >= 2, "got: {}", program.code);
}

#[test]
fn test_circular_chain_is_truncated() {
    // a -> b -> a の循環。生成は完走し、診断が記録される。
    let document = BlockDocument::new()
        .with_block(delay_block("a", "m1", Some("b")))
        .with_block(delay_block("b", "m2", Some("a")))
        .with_block(number_block("m1", 1.0))
        .with_block(number_block("m2", 2.0))
        .with_root("a");

    let program = generate_program(&document);
    // 各ブロックのコードは一度だけ現れる
    assert_eq!(program.code.matches("delay(1);").count(), 1);
    assert_eq!(program.code.matches("delay(2);").count(), 1);
    assert!(program
        .diagnostics
        .iter()
        .any(|d| d.message.contains("循環")));
}

#[test]
fn test_self_cycle_is_truncated() {
    let document = BlockDocument::new()
        .with_block(delay_block("a", "m", Some("a")))
        .with_block(number_block("m", 1.0))
        .with_root("a");

    let program = generate_program(&document);
    assert_eq!(program.code.matches("delay(1);").count(), 1);
    assert!(!program.diagnostics.is_empty());
}
