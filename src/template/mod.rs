//! テンプレート置換エンジン
//!
//! ライブラリ定義が持つパラメタ化されたコードテキストを、ブロックの
//! 実引数で具体的なコード片へ解決する。処理は2パスで行う:
//!
//! 1. リテラル置換: `${name}`を変数表の値で置き換える。置換済みの
//!    テキストは再走査しないため、値に`${...}`が含まれていても二重置換は
//!    起きない。
//! 2. 条件評価: `{{ ... }}`で区切られた領域を、隔離された小さな式評価器
//!    （リテラル・連結・真偽/三項論理のみ）で評価して置き換える。評価に
//!    失敗した領域は部分置換のまま残し、パス全体は中断しない。

pub mod lexer;
pub mod parser;

pub use parser::{evaluate, Value};

use crate::error::TemplateError;
use indexmap::IndexMap;

/// テンプレートを2パスで展開する
///
/// 戻り値は展開後のテキストと、評価に失敗した領域のエラー群。
pub fn expand(template: &str, vars: &IndexMap<String, String>) -> (String, Vec<TemplateError>) {
    let substituted = substitute(template, vars);
    evaluate_regions(&substituted)
}

/// パス1: `${name}`のリテラル置換
///
/// 変数表にないプレースホルダはそのまま残す。置換された値は再走査しない。
pub fn substitute(template: &str, vars: &IndexMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // '{'をスキップ

            // 対応する'}'までを収集（波括弧の入れ子を数える）
            let mut name = String::new();
            let mut brace_count = 1;
            let mut terminated = false;
            for inner in chars.by_ref() {
                match inner {
                    '{' => {
                        brace_count += 1;
                        name.push('{');
                    }
                    '}' => {
                        brace_count -= 1;
                        if brace_count == 0 {
                            terminated = true;
                            break;
                        }
                        name.push('}');
                    }
                    other => name.push(other),
                }
            }

            if !terminated {
                // 未終端のプレースホルダはそのまま出力して終わり
                out.push_str("${");
                out.push_str(&name);
                break;
            }

            match vars.get(&name) {
                Some(value) => out.push_str(value),
                None => {
                    out.push_str("${");
                    out.push_str(&name);
                    out.push('}');
                }
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// パス2: `{{ ... }}`領域の評価
pub fn evaluate_regions(text: &str) -> (String, Vec<TemplateError>) {
    let mut out = String::with_capacity(text.len());
    let mut errors = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let inner = &after[..end];
                match evaluate(&quote_placeholders(inner)) {
                    Ok(value) => out.push_str(&value.to_text()),
                    Err(error) => {
                        // 失敗した領域は部分置換のまま残す
                        out.push_str(&rest[start..start + 2 + end + 2]);
                        errors.push(error);
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                errors.push(TemplateError::EvaluationError {
                    message: "unterminated {{ region".to_owned(),
                });
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    (out, errors)
}

/// 領域内に残った`${x}`を文字列リテラルへ包む
///
/// パス1で消費されなかったプレースホルダを引用符で囲んでから評価する
/// ことで、評価器は未知のプレースホルダをただの文字列値として通し、
/// 結果のテキストに元の形のまま現れる。
fn quote_placeholders(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut chars = expr.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut name = String::new();
            let mut brace_count = 1;
            for inner in chars.by_ref() {
                match inner {
                    '{' => {
                        brace_count += 1;
                        name.push('{');
                    }
                    '}' => {
                        brace_count -= 1;
                        if brace_count == 0 {
                            break;
                        }
                        name.push('}');
                    }
                    other => name.push(other),
                }
            }
            let placeholder = format!("${{{}}}", name);
            out.push('"');
            for c in placeholder.chars() {
                match c {
                    '\\' => out.push_str("\\\\"),
                    '"' => out.push_str("\\\""),
                    _ => out.push(c),
                }
            }
            out.push('"');
        } else {
            out.push(ch);
        }
    }
    out
}
