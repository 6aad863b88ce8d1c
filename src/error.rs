//! 統一的なエラーハンドリングモジュール
//!
//! このモジュールは、Tsumiki全体で使用される統一的なエラー型と
//! 生成パス中に蓄積される診断情報を提供します。
//!
//! 生成パスはデータ形状の問題で中断しない。ブロックグラフ由来の問題は
//! すべて`Diagnostic`として収集され、コード生成は最後まで継続する。
//! `TsumikiError`はファイルI/OやJSONなど読み込み境界の失敗のみを表す。

use crate::block::BlockId;
use thiserror::Error;

/// Tsumikiの統一エラー型
#[derive(Error, Debug)]
pub enum TsumikiError {
    /// コード生成エラー
    #[error("コード生成エラー")]
    Generator(#[from] GeneratorError),

    /// テンプレート処理エラー
    #[error("テンプレート処理エラー")]
    Template(#[from] TemplateError),

    /// ドキュメント読み込みエラー
    #[error("ドキュメント読み込みエラー: {0}")]
    Document(#[from] serde_json::Error),

    /// ファイルI/Oエラー
    #[error("ファイル操作エラー: {0}")]
    Io(#[from] std::io::Error),

    /// その他のエラー
    #[error("{0}")]
    Other(String),
}

/// コード生成中に検出される問題の詳細
///
/// いずれも致命的ではない。診断として記録された上で生成は継続する。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("未登録のブロック型: '{block_type}'")]
    UnknownBlockType { block_type: String, block_id: BlockId },

    #[error("ステートメント連鎖に循環を検出: {block_id}")]
    CircularChainDetected { block_id: BlockId },

    #[error("セクション '{section}' のタグ '{tag}' は登録済みのため無視")]
    DuplicateRegistrationIgnored { section: &'static str, tag: String },

    #[error("接続先のブロックが存在しない: {block_id}")]
    MissingBlock { block_id: BlockId },

    #[error("値入力に文が接続されている: {input} (ブロック {block_id})")]
    StatementAsValue { input: String, block_id: BlockId },
}

/// テンプレート解決の問題の詳細
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("テンプレート式の評価に失敗: {message}")]
    EvaluationError { message: String },

    #[error("引数 '{name}' がブロックの入力/フィールドに存在しない")]
    InvalidArgumentGroup { name: String },

    #[error("予期しないトークン: {found}")]
    UnexpectedToken { found: String },

    #[error("予期しない式の終端")]
    UnexpectedEnd,
}

/// Result型のエイリアス
pub type TsumikiResult<T> = Result<T, TsumikiError>;

/// 診断の深刻度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// 生成パス中に記録される一件の診断
///
/// ソーステキストが存在しないため、位置情報はブロックidで表す。
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<BlockId>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            block_id: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            block_id: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            block_id: None,
        }
    }

    /// 診断をブロックに関連付ける
    pub fn with_block(mut self, id: &BlockId) -> Self {
        self.block_id = Some(id.clone());
        self
    }
}

/// 複数の診断を蓄積するためのコレクター
///
/// コレクター自身は何も出力しない。出力するかどうかは呼び出し側
/// （エディタやCLI）が決める。
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 診断を追加
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// エラー深刻度の診断があるかどうか
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// すべての診断を取得
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// 診断の数
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 蓄積した診断を取り出す
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
