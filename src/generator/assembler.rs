//! プログラム組み立て
//!
//! セクション辞書の内容を固定の並びでスケッチ全文へ連結する。
//! セクション辞書に対する純関数であり、セッションの他の状態には触れない。

use crate::generator::sections::{Section, Sections};

/// 本体行のインデント
const INDENT: &str = "  ";

/// セクション辞書からスケッチ全文を組み立てる
///
/// 上半分はマクロ・ライブラリ・変数・オブジェクト・関数の順。空でない
/// セクションの間には空行をちょうど1行置き、空のセクションは何も
/// 寄与しない。`setup()`と`loop()`は中身が空でも必ず出力される。
pub fn assemble(sections: &Sections) -> String {
    let mut parts: Vec<String> = Vec::new();

    for section in [
        Section::Macros,
        Section::Libraries,
        Section::Variables,
        Section::Objects,
        Section::Functions,
    ] {
        let fragments = sections.collect(section);
        if !fragments.is_empty() {
            parts.push(fragments.join("\n"));
        }
    }

    parts.push(procedure(
        "void setup()",
        &[Section::SetupBegin, Section::Setup, Section::SetupEnd],
        sections,
    ));
    parts.push(procedure(
        "void loop()",
        &[Section::LoopBegin, Section::Loop, Section::LoopEnd],
        sections,
    ));

    let mut code = parts.join("\n\n");
    code.push('\n');
    code
}

/// 固定ラッパー付きの手続きを組み立てる
fn procedure(header: &str, buckets: &[Section], sections: &Sections) -> String {
    let mut body_parts: Vec<String> = Vec::new();
    for bucket in buckets {
        let fragments = sections.collect(*bucket);
        if !fragments.is_empty() {
            body_parts.push(fragments.join("\n"));
        }
    }
    let body = body_parts.join("\n");
    if body.is_empty() {
        format!("{} {{\n}}", header)
    } else {
        format!("{} {{\n{}\n}}", header, indent(&body))
    }
}

/// 各行の先頭にインデントを付ける。空行はそのまま残す。
pub fn indent(code: &str) -> String {
    code.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", INDENT, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
