//! Operator precedence table for expression composition.
//!
//! Every emitter returns the order of the outermost operator in the code it
//! produced. When that code is embedded somewhere that applies an operator
//! around it, the two orders decide whether parentheses are required.
//!
//! The numeric values carry fractional sub-levels (e.g. the unary variants
//! at 4.x, multiplicative at 5.x). Parenthesization compares the *floored*
//! values: sub-levels of one class never parenthesize against each other.
//! This flooring is part of the observed contract and must not be "fixed".

/// Precedence of the outermost operator of a code fragment.
///
/// Lower values bind tighter. `None` is the always-parenthesize tier: code
/// returned with `None` is wrapped at every embedding site, and an embedding
/// site that requires `None` never wraps anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Order {
    /// リテラル・識別子など、それ以上分割できないコード片
    Atomic,
    /// `foo.bar` / `foo[i]`
    Member,
    /// `foo()`
    FunctionCall,
    /// `expr++`
    Increment,
    /// `expr--`
    Decrement,
    /// `~expr`
    BitwiseNot,
    /// `+expr`
    UnaryPlus,
    /// `-expr`
    UnaryNegation,
    /// `!expr`
    LogicalNot,
    /// `*`
    Multiplication,
    /// `/`
    Division,
    /// `%`
    Modulus,
    /// `-`
    Subtraction,
    /// `+`
    Addition,
    /// `<<` `>>`
    BitwiseShift,
    /// `<` `<=` `>` `>=`
    Relational,
    /// `==` `!=`
    Equality,
    /// `&`
    BitwiseAnd,
    /// `^`
    BitwiseXor,
    /// `|`
    BitwiseOr,
    /// `&&`
    LogicalAnd,
    /// `||`
    LogicalOr,
    /// `cond ? a : b`
    Conditional,
    /// `=` `+=` ...
    Assignment,
    /// `,`
    Comma,
    /// 常に括弧で包む層
    None,
}

impl Order {
    /// テーブル上の数値。小数部はクラス内のサブレベルを表す。
    pub fn value(self) -> f64 {
        match self {
            Order::Atomic => 0.0,
            Order::Member => 1.2,
            Order::FunctionCall => 2.0,
            Order::Increment => 3.0,
            Order::Decrement => 3.0,
            Order::BitwiseNot => 4.1,
            Order::UnaryPlus => 4.2,
            Order::UnaryNegation => 4.3,
            Order::LogicalNot => 4.4,
            Order::Multiplication => 5.1,
            Order::Division => 5.2,
            Order::Modulus => 5.3,
            Order::Subtraction => 6.1,
            Order::Addition => 6.2,
            Order::BitwiseShift => 7.0,
            Order::Relational => 8.0,
            Order::Equality => 9.0,
            Order::BitwiseAnd => 10.0,
            Order::BitwiseXor => 11.0,
            Order::BitwiseOr => 12.0,
            Order::LogicalAnd => 13.0,
            Order::LogicalOr => 14.0,
            Order::Conditional => 15.0,
            Order::Assignment => 16.0,
            Order::Comma => 17.0,
            Order::None => 99.0,
        }
    }

    /// 括弧判定に使うクラス値（floor）
    pub fn class(self) -> i32 {
        self.value().floor() as i32
    }
}

/// `inner`のコードを、`outer`の優先順位を要求する位置へ埋め込むときに
/// 括弧が必要かどうかを判定する。
///
/// クラス値で比較し、子が要求より厳密に強く結合していない場合に包む。
/// 例外: 両者が同じクラスでそれがAtomic(0)またはNone(99)のときは包まない。
pub fn needs_parens(inner: Order, outer: Order) -> bool {
    let inner_class = inner.class();
    let outer_class = outer.class();
    if inner_class == outer_class {
        // Atomic同士・None同士は語順に依存しないので素通し
        inner_class != 0 && inner_class != 99
    } else {
        inner_class > outer_class
    }
}

/// 必要な場合のみ括弧で包む
pub fn wrap_if_needed(code: String, inner: Order, outer: Order) -> String {
    if needs_parens(inner, outer) {
        format!("({})", code)
    } else {
        code
    }
}
