//! 値入力の添字補正ヘルパー
//!
//! 配列アクセスやタイマー値のように、見た目上のインデックスと生成コード
//! 上のインデックスがずれる場面で使う。リテラル入力はコンパイル時に畳み、
//! 式入力には等価な実行時式を合成する。

use crate::block::{format_number, Block};
use crate::generator::precedence::{wrap_if_needed, Order};
use crate::generator::Context;

impl Context<'_> {
    /// 値入力のコードを`delta`と`negate`で補正して返す
    ///
    /// 1始まりモードでは、見た目のインデックスがすでに+1されているため
    /// まず`delta`を1減らす。結果は常に`sign*expr + delta`と等価になる
    /// （signはnegateなら-1）。リテラル入力なら畳み込んだリテラルを返し、
    /// 実行時の演算は生成しない。
    pub fn adjusted_value(
        &mut self,
        block: &Block,
        input: &str,
        delta: i64,
        negate: bool,
        order: Order,
    ) -> String {
        let mut delta = delta;
        if self.one_based_index() {
            delta -= 1;
        }
        let base = if self.one_based_index() { "1" } else { "0" };

        // これから適用する演算が要求する優先順位で子を解決する
        let resolve_order = if negate {
            Order::UnaryNegation
        } else if delta > 0 {
            Order::Addition
        } else if delta < 0 {
            Order::Subtraction
        } else {
            order
        };
        let resolved = self.value_to_code_or(block, input, resolve_order, base);

        if delta == 0 && !negate {
            return resolved;
        }

        // 裸の数値リテラルは静的に畳む
        if let Ok(value) = resolved.parse::<f64>() {
            let sign = if negate { -1.0 } else { 1.0 };
            return format_number(sign * value + delta as f64);
        }

        // 動的な式: 先に符号を反転し、その後で差分を加減する
        let mut code = resolved;
        let mut inner = Order::Atomic;
        if negate {
            code = format!("-{}", code);
            inner = Order::UnaryNegation;
        }
        if delta > 0 {
            code = format!("{} + {}", code, delta);
            inner = Order::Addition;
        } else if delta < 0 {
            code = format!("{} - {}", code, -delta);
            inner = Order::Subtraction;
        }
        wrap_if_needed(code, inner, order)
    }
}
