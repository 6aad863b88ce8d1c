//! 識別子レジストリ
//!
//! ユーザーが付けた変数名を、予約語や他の名前と衝突しない識別子へ
//! 安定的に写像する。同じセッション内では同じ入力が常に同じ識別子に
//! なるため、生成結果は決定的になる。

use std::collections::{HashMap, HashSet};

/// 名前の種別。種別ごとに別の名前空間を持つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    /// ユーザー変数
    Variable,
    /// 生成器が内部的に使う変数
    Developer,
    /// 関数名
    Procedure,
}

/// C/C++/Arduinoの予約語とコア識別子
///
/// 生成された識別子がこれらと一致してはならない。
const RESERVED_WORDS: &[&str] = &[
    // C/C++ keywords
    "auto", "bool", "break", "case", "catch", "char", "class", "const",
    "continue", "default", "delete", "do", "double", "else", "enum", "extern",
    "false", "float", "for", "friend", "goto", "if", "inline", "int", "long",
    "namespace", "new", "operator", "private", "protected", "public",
    "register", "return", "short", "signed", "sizeof", "static", "struct",
    "switch", "template", "this", "throw", "true", "try", "typedef", "union",
    "unsigned", "using", "virtual", "void", "volatile", "while",
    // Arduino core
    "setup", "loop", "HIGH", "LOW", "INPUT", "OUTPUT", "INPUT_PULLUP",
    "LED_BUILTIN", "abs", "analogRead", "analogWrite", "delay",
    "delayMicroseconds", "digitalRead", "digitalWrite", "map", "max", "min",
    "millis", "micros", "pinMode", "pow", "random", "randomSeed", "sqrt",
    "tone", "noTone", "pulseIn", "Serial", "String", "boolean", "byte",
    "word",
];

/// 衝突しない識別子を生成するレジストリ
#[derive(Debug)]
pub struct NameRegistry {
    reserved: HashSet<String>,
    /// (種別, 要求名) -> 確定した識別子
    assigned: HashMap<(NameKind, String), String>,
    /// すでに払い出した識別子
    used: HashSet<String>,
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NameRegistry {
    pub fn new() -> Self {
        Self {
            reserved: RESERVED_WORDS.iter().map(|s| (*s).to_owned()).collect(),
            assigned: HashMap::new(),
            used: HashSet::new(),
        }
    }

    /// 予約語を追加する（ライブラリが持ち込む識別子など）
    pub fn reserve(&mut self, word: impl Into<String>) {
        self.reserved.insert(word.into());
    }

    /// 要求された名前に対応する安全な識別子を返す
    ///
    /// 初回はサニタイズと衝突回避を行って確定し、以後は同じ識別子を返す。
    pub fn safe_name(&mut self, kind: NameKind, requested: &str) -> String {
        let key = (kind, requested.to_owned());
        if let Some(existing) = self.assigned.get(&key) {
            return existing.clone();
        }

        let base = sanitize(requested);
        let base = match kind {
            // 内部変数は接頭辞でユーザー変数と住み分ける
            NameKind::Developer => format!("_{}", base),
            _ => base,
        };

        let mut candidate = base.clone();
        let mut counter = 2;
        while self.reserved.contains(&candidate) || self.used.contains(&candidate) {
            candidate = format!("{}{}", base, counter);
            counter += 1;
        }

        self.used.insert(candidate.clone());
        self.assigned.insert(key, candidate.clone());
        candidate
    }

    /// 要求名がすでに識別子を割り当てられているか
    pub fn is_assigned(&self, kind: NameKind, requested: &str) -> bool {
        self.assigned.contains_key(&(kind, requested.to_owned()))
    }

    /// 呼び出しごとに新しい識別子を払い出す
    ///
    /// 同じ要求名でも毎回別の識別子になる。ネストしたループカウンタの
    /// ように、ブロックのインスタンスごとに固有の名前が必要な場合に使う。
    pub fn distinct_name(&mut self, kind: NameKind, requested: &str) -> String {
        let base = sanitize(requested);
        let base = match kind {
            NameKind::Developer => format!("_{}", base),
            _ => base,
        };

        let mut candidate = base.clone();
        let mut counter = 2;
        while self.reserved.contains(&candidate) || self.used.contains(&candidate) {
            candidate = format!("{}{}", base, counter);
            counter += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

/// 識別子として使えない文字を`_`に置き換える
///
/// 先頭が数字の場合は`_`を前置する。空文字列は`unnamed`になる。
fn sanitize(name: &str) -> String {
    if name.is_empty() {
        return "unnamed".to_owned();
    }
    let mut out = String::with_capacity(name.len());
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if i == 0 && ch.is_ascii_digit() {
                out.push('_');
            }
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    out
}
