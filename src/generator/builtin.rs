//! 標準ブロックセット
//!
//! どのブロックエディタにも載る基礎ブロックのネイティブエミッタ群。
//! ライブラリ定義由来のテンプレートエミッタと同じレジストリに同じ形で
//! 登録される。

use crate::block::Block;
use crate::generator::names::NameKind;
use crate::generator::precedence::Order;
use crate::generator::registry::{Emitted, EmitterRegistry};
use crate::generator::sections::Section;
use crate::generator::{assembler, Context};

/// 標準ブロックをレジストリへ登録する
pub fn register_builtins(registry: &mut EmitterRegistry) {
    registry.register_fn("math_number", math_number);
    registry.register_fn("math_arithmetic", math_arithmetic);
    registry.register_fn("logic_compare", logic_compare);
    registry.register_fn("logic_operation", logic_operation);
    registry.register_fn("logic_negate", logic_negate);
    registry.register_fn("logic_boolean", logic_boolean);
    registry.register_fn("text", text);
    registry.register_fn("variables_get", variables_get);
    registry.register_fn("variables_set", variables_set);
    registry.register_fn("controls_if", controls_if);
    registry.register_fn("controls_repeat", controls_repeat);
    registry.register_fn("io_digitalwrite", io_digitalwrite);
    registry.register_fn("io_digitalread", io_digitalread);
    registry.register_fn("time_delay", time_delay);
    registry.register_fn("arduino_setup", arduino_setup);
    registry.register_fn("arduino_loop", arduino_loop);
}

fn math_number(block: &Block, _ctx: &mut Context<'_>) -> Emitted {
    let code = block.field_code("NUM");
    // 負のリテラルは単項マイナスとして振る舞う
    let order = if code.starts_with('-') {
        Order::UnaryNegation
    } else {
        Order::Atomic
    };
    Emitted::Expression(code, order)
}

fn math_arithmetic(block: &Block, ctx: &mut Context<'_>) -> Emitted {
    let (op, order) = match block.field_code("OP").as_str() {
        "MINUS" => ("-", Order::Subtraction),
        "MULTIPLY" => ("*", Order::Multiplication),
        "DIVIDE" => ("/", Order::Division),
        _ => ("+", Order::Addition),
    };
    let a = ctx.value_to_code_or(block, "A", order, "0");
    let b = ctx.value_to_code_or(block, "B", order, "0");
    Emitted::Expression(format!("{} {} {}", a, op, b), order)
}

fn logic_compare(block: &Block, ctx: &mut Context<'_>) -> Emitted {
    let (op, order) = match block.field_code("OP").as_str() {
        "NEQ" => ("!=", Order::Equality),
        "LT" => ("<", Order::Relational),
        "LTE" => ("<=", Order::Relational),
        "GT" => (">", Order::Relational),
        "GTE" => (">=", Order::Relational),
        _ => ("==", Order::Equality),
    };
    let a = ctx.value_to_code_or(block, "A", order, "0");
    let b = ctx.value_to_code_or(block, "B", order, "0");
    Emitted::Expression(format!("{} {} {}", a, op, b), order)
}

fn logic_operation(block: &Block, ctx: &mut Context<'_>) -> Emitted {
    let (op, order) = match block.field_code("OP").as_str() {
        "OR" => ("||", Order::LogicalOr),
        _ => ("&&", Order::LogicalAnd),
    };
    let a = ctx.value_to_code_or(block, "A", order, "false");
    let b = ctx.value_to_code_or(block, "B", order, "false");
    Emitted::Expression(format!("{} {} {}", a, op, b), order)
}

fn logic_negate(block: &Block, ctx: &mut Context<'_>) -> Emitted {
    let operand = ctx.value_to_code_or(block, "BOOL", Order::LogicalNot, "false");
    Emitted::Expression(format!("!{}", operand), Order::LogicalNot)
}

fn logic_boolean(block: &Block, _ctx: &mut Context<'_>) -> Emitted {
    let code = if block.field_code("BOOL") == "FALSE" {
        "false"
    } else {
        "true"
    };
    Emitted::expr(code, Order::Atomic)
}

fn text(block: &Block, _ctx: &mut Context<'_>) -> Emitted {
    let value = block.field_code("TEXT");
    Emitted::Expression(format!("\"{}\"", escape_string(&value)), Order::Atomic)
}

fn variables_get(block: &Block, ctx: &mut Context<'_>) -> Emitted {
    let name = ctx.variable_name(&block.field_code("VAR"));
    Emitted::Expression(name, Order::Atomic)
}

fn variables_set(block: &Block, ctx: &mut Context<'_>) -> Emitted {
    let name = ctx.variable_name(&block.field_code("VAR"));
    let value = ctx.value_to_code_or(block, "VALUE", Order::Assignment, "0");
    Emitted::Statement(format!("{} = {};", name, value))
}

fn controls_if(block: &Block, ctx: &mut Context<'_>) -> Emitted {
    let condition = ctx.value_to_code_or(block, "IF0", Order::None, "false");
    let then_branch = ctx.statement_to_code(block, "DO0");
    let mut code = format!("if ({}) {{\n{}\n}}", condition, assembler::indent(&then_branch));
    if block.statement_inputs.contains_key("ELSE") {
        let else_branch = ctx.statement_to_code(block, "ELSE");
        code.push_str(&format!(" else {{\n{}\n}}", assembler::indent(&else_branch)));
    }
    Emitted::Statement(code)
}

fn controls_repeat(block: &Block, ctx: &mut Context<'_>) -> Emitted {
    let times = ctx.value_to_code_or(block, "TIMES", Order::Relational, "10");
    // ネストに備えてブロックごとに固有のカウンタ名を確保する。
    // 本体の描画より先に確保するので、外側のループほど若い名前になる。
    let counter = ctx
        .session
        .names
        .distinct_name(NameKind::Developer, "count");
    let body = ctx.statement_to_code(block, "DO");
    Emitted::Statement(format!(
        "for (int {c} = 0; {c} < {times}; {c}++) {{\n{body}\n}}",
        c = counter,
        times = times,
        body = assembler::indent(&body),
    ))
}

fn io_digitalwrite(block: &Block, ctx: &mut Context<'_>) -> Emitted {
    let pin = ctx.value_to_code_or(block, "PIN", Order::None, "13");
    let state = match block.field_code("STATE").as_str() {
        "LOW" => "LOW",
        _ => "HIGH",
    };
    // 同じピンのpinModeは一度だけ登録される
    if let Some(diag) = ctx.session.sections.add(
        Section::Setup,
        format!("pinmode_{}", pin),
        format!("pinMode({}, OUTPUT);", pin),
        false,
    ) {
        ctx.session.diagnostics.push(diag.with_block(&block.id));
    }
    Emitted::Statement(format!("digitalWrite({}, {});", pin, state))
}

fn io_digitalread(block: &Block, ctx: &mut Context<'_>) -> Emitted {
    let pin = ctx.value_to_code_or(block, "PIN", Order::None, "13");
    if let Some(diag) = ctx.session.sections.add(
        Section::Setup,
        format!("pinmode_{}", pin),
        format!("pinMode({}, INPUT);", pin),
        false,
    ) {
        ctx.session.diagnostics.push(diag.with_block(&block.id));
    }
    Emitted::Expression(format!("digitalRead({})", pin), Order::FunctionCall)
}

fn time_delay(block: &Block, ctx: &mut Context<'_>) -> Emitted {
    let ms = ctx.value_to_code_or(block, "MS", Order::None, "1000");
    Emitted::Statement(format!("delay({});", ms))
}

fn arduino_setup(block: &Block, ctx: &mut Context<'_>) -> Emitted {
    let body = ctx.statement_to_code(block, "DO");
    if !body.trim().is_empty() {
        if let Some(diag) =
            ctx.session
                .sections
                .add(Section::Setup, block.id.as_str().to_owned(), body, false)
        {
            ctx.session.diagnostics.push(diag.with_block(&block.id));
        }
    }
    Emitted::Statement(String::new())
}

fn arduino_loop(block: &Block, ctx: &mut Context<'_>) -> Emitted {
    let body = ctx.statement_to_code(block, "DO");
    if !body.trim().is_empty() {
        if let Some(diag) =
            ctx.session
                .sections
                .add(Section::Loop, block.id.as_str().to_owned(), body, false)
        {
            ctx.session.diagnostics.push(diag.with_block(&block.id));
        }
    }
    Emitted::Statement(String::new())
}

/// 文字列リテラル用のエスケープ
fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}
