//! Block graph data model for Tsumiki.
//!
//! The visual editor owns the block graph; the generator only reads a
//! serialized snapshot of it per pass. These types mirror that snapshot:
//! a document is a list of root block ids plus an id -> block mapping.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a single block in the graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub String);

impl BlockId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// フィールドに格納されるスカラー値
///
/// エディタ側のフィールドは文字列・数値・真偽値のいずれか。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// コード片として埋め込む際の文字列表現
    ///
    /// 整数値は小数部なしで表示する。
    pub fn to_code(&self) -> String {
        match self {
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_code())
    }
}

/// 数値を整数なら小数部なしで文字列化する
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One node of the visual program graph (statement or expression).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub block_type: String,
    /// Field name -> scalar value
    #[serde(default)]
    pub fields: IndexMap<String, FieldValue>,
    /// Value input name -> child block id (the child must produce an expression)
    #[serde(default)]
    pub value_inputs: IndexMap<String, BlockId>,
    /// Statement input name -> child chain root id
    #[serde(default)]
    pub statement_inputs: IndexMap<String, BlockId>,
    /// Next statement in this chain
    #[serde(default)]
    pub next: Option<BlockId>,
    /// User-attached comment
    #[serde(default)]
    pub comment: Option<String>,
}

impl Block {
    /// テスト・ビルダー用の最小コンストラクタ
    pub fn new(id: impl Into<BlockId>, block_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            fields: IndexMap::new(),
            value_inputs: IndexMap::new(),
            statement_inputs: IndexMap::new(),
            next: None,
            comment: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// フィールドをコード片として取得（存在しなければ空文字列）
    pub fn field_code(&self, name: &str) -> String {
        self.fields.get(name).map(|v| v.to_code()).unwrap_or_default()
    }
}

/// グラフで宣言された変数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    /// 生成されるスケッチ上の型。未指定なら`int`。
    #[serde(default = "default_variable_type", rename = "type")]
    pub var_type: String,
}

fn default_variable_type() -> String {
    "int".to_owned()
}

/// A serialized block-graph snapshot: the generator's input.
///
/// `roots` preserves declaration/creation order, which is also the order
/// the generator renders top-level chains in (never spatial layout).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDocument {
    #[serde(default)]
    pub roots: Vec<BlockId>,
    #[serde(default)]
    pub blocks: IndexMap<BlockId, Block>,
    /// Declared variable set handed over from the editor's variable registry
    #[serde(default)]
    pub variables: Vec<VariableDecl>,
}

impl BlockDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// JSONスナップショットからドキュメントを読み込む
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// ブロックを追加し、テストを書きやすくするためselfを返す
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.insert(block.id.clone(), block);
        self
    }

    pub fn with_root(mut self, id: impl Into<BlockId>) -> Self {
        self.roots.push(id.into());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, var_type: impl Into<String>) -> Self {
        self.variables.push(VariableDecl {
            name: name.into(),
            var_type: var_type.into(),
        });
        self
    }
}
