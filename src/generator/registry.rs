//! ブロック型ごとのエミッタレジストリ
//!
//! ブロック型の文字列から、そのブロックのコードを生成する実装への
//! 対応表。実装は実行時に登録される（標準ブロックは組み込み、
//! ライブラリブロックは定義ファイルから）。同じ型への再登録は
//! 後勝ちで、ライブラリのホットリロードを成立させる。

use crate::block::Block;
use crate::generator::precedence::Order;
use crate::generator::Context;
use crate::library::EmitterDefinition;
use std::collections::HashMap;
use std::sync::Arc;

/// エミッタが生成した一片のコード
///
/// 文を生成するブロックはコードのみ、式を生成するブロックはコードと
/// 最外演算子の優先順位を返す。
#[derive(Debug, Clone, PartialEq)]
pub enum Emitted {
    Statement(String),
    Expression(String, Order),
}

impl Emitted {
    /// 式コードのショートハンド
    pub fn expr(code: impl Into<String>, order: Order) -> Self {
        Emitted::Expression(code.into(), order)
    }

    /// 文コードのショートハンド
    pub fn stmt(code: impl Into<String>) -> Self {
        Emitted::Statement(code.into())
    }
}

/// 一つのブロック型のコード生成実装
///
/// 生成中の問題は戻り値ではなく`ctx`の診断へ記録する。エミッタは
/// 常にベストエフォートのコードを返し、パス全体を中断させない。
pub trait Emitter: Send + Sync {
    fn emit(&self, block: &Block, ctx: &mut Context<'_>) -> Emitted;
}

/// クロージャをそのままエミッタとして使えるようにする
impl<F> Emitter for F
where
    F: Fn(&Block, &mut Context<'_>) -> Emitted + Send + Sync,
{
    fn emit(&self, block: &Block, ctx: &mut Context<'_>) -> Emitted {
        self(block, ctx)
    }
}

/// ブロック型 -> エミッタの対応表
#[derive(Default)]
pub struct EmitterRegistry {
    emitters: HashMap<String, Arc<dyn Emitter>>,
    /// テンプレート由来のエミッタの元定義。変数参照の事前走査に使う。
    definitions: HashMap<String, EmitterDefinition>,
}

impl EmitterRegistry {
    /// 空のレジストリを作る
    pub fn new() -> Self {
        Self::default()
    }

    /// 標準ブロックセットを登録済みのレジストリを作る
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::generator::builtin::register_builtins(&mut registry);
        registry
    }

    /// エミッタを登録する。既存の登録は置き換えられる（後勝ち）。
    pub fn register(&mut self, block_type: impl Into<String>, emitter: Arc<dyn Emitter>) {
        let block_type = block_type.into();
        // ネイティブ実装での上書きは古いテンプレート定義も無効にする
        self.definitions.remove(&block_type);
        if self.emitters.insert(block_type.clone(), emitter).is_some() {
            log::debug!("emitter for '{}' re-registered", block_type);
        }
    }

    /// 関数・クロージャを直接登録するショートハンド
    pub fn register_fn<F>(&mut self, block_type: impl Into<String>, f: F)
    where
        F: Fn(&Block, &mut Context<'_>) -> Emitted + Send + Sync + 'static,
    {
        self.register(block_type, Arc::new(f));
    }

    /// ライブラリ定義からテンプレートエミッタを登録する
    pub fn register_definition(&mut self, definition: EmitterDefinition) {
        let block_type = definition.block_type.clone();
        self.register(
            block_type.clone(),
            Arc::new(crate::library::TemplateEmitter::new(definition.clone())),
        );
        self.definitions.insert(block_type, definition);
    }

    pub fn get(&self, block_type: &str) -> Option<Arc<dyn Emitter>> {
        self.emitters.get(block_type).cloned()
    }

    pub fn contains(&self, block_type: &str) -> bool {
        self.emitters.contains_key(block_type)
    }

    /// 型がライブラリ定義由来の場合、その定義を返す
    pub fn definition(&self, block_type: &str) -> Option<&EmitterDefinition> {
        self.definitions.get(block_type)
    }
}
