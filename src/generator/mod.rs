//! コード生成パイプラインモジュール
//!
//! このモジュールは、ブロックグラフのスナップショットからスケッチ全文を
//! 生成するパイプライン全体を管理します。生成器の状態はすべて
//! `GeneratorSession`に集約され、パスごとに作られて捨てられます。
//! グローバル状態は持たないため、プレビューと本ビルドのような独立した
//! パスが互いを壊すことはありません。

pub mod adjust;
pub mod assembler;
pub mod builtin;
pub mod names;
pub mod precedence;
pub mod registry;
pub mod sections;

pub use precedence::{needs_parens, wrap_if_needed, Order};
pub use registry::{Emitted, Emitter, EmitterRegistry};
pub use sections::{Section, Sections};

use crate::block::{Block, BlockDocument, BlockId};
use crate::error::{Diagnostic, DiagnosticCollector, GeneratorError};
use names::{NameKind, NameRegistry};
use std::collections::{HashMap, HashSet};

/// コメント行の折り返し幅
const COMMENT_WRAP: usize = 60;

/// 生成パスの設定
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorConfig {
    /// 真ならユーザーに見えるインデックスは1始まり
    pub one_based_index: bool,
}

/// 一回の生成パスが占有する状態
///
/// パス開始時に作られ、パス終了時に破棄される。並行するパス間で
/// 共有してはならない。
#[derive(Debug)]
pub struct GeneratorSession {
    pub config: GeneratorConfig,
    pub sections: Sections,
    pub names: NameRegistry,
    /// 宣言名 -> スケッチ上の型
    pub variable_types: HashMap<String, String>,
    pub diagnostics: DiagnosticCollector,
    /// 連鎖描画中のブロックid（循環検出用）
    in_progress: HashSet<BlockId>,
}

impl GeneratorSession {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            sections: Sections::new(),
            names: NameRegistry::new(),
            variable_types: HashMap::new(),
            diagnostics: DiagnosticCollector::new(),
            in_progress: HashSet::new(),
        }
    }
}

/// 生成パスの出力
#[derive(Debug, Clone)]
pub struct GeneratedProgram {
    /// スケッチ全文
    pub code: String,
    /// パス中に記録された診断
    pub diagnostics: Vec<Diagnostic>,
}

/// エミッタに渡される生成コンテキスト
///
/// ドキュメント・レジストリ・セッションをまとめ、子ブロックの解決や
/// セクション登録の入り口になる。
pub struct Context<'a> {
    pub document: &'a BlockDocument,
    pub registry: &'a EmitterRegistry,
    pub session: &'a mut GeneratorSession,
}

impl<'a> Context<'a> {
    pub fn new(
        document: &'a BlockDocument,
        registry: &'a EmitterRegistry,
        session: &'a mut GeneratorSession,
    ) -> Self {
        Self {
            document,
            registry,
            session,
        }
    }

    /// 1始まりインデックスモードかどうか
    pub fn one_based_index(&self) -> bool {
        self.session.config.one_based_index
    }

    /// ユーザー変数の安全な識別子を得る
    pub fn variable_name(&mut self, requested: &str) -> String {
        self.session.names.safe_name(NameKind::Variable, requested)
    }

    /// 生成器内部変数の安全な識別子を得る
    pub fn developer_name(&mut self, requested: &str) -> String {
        self.session.names.safe_name(NameKind::Developer, requested)
    }

    /// ブロックのエミッタを解決してコードを得る
    ///
    /// 未登録の型・存在しないブロックは診断を記録してNoneを返す。
    /// 呼び出し側が文脈に応じたプレースホルダを埋める。
    fn emit_block(&mut self, id: &BlockId) -> Option<Emitted> {
        let block = match self.document.block(id) {
            Some(block) => block,
            None => {
                self.session.diagnostics.push(
                    Diagnostic::error(
                        GeneratorError::MissingBlock { block_id: id.clone() }.to_string(),
                    )
                    .with_block(id),
                );
                return None;
            }
        };
        let emitter = match self.registry.get(&block.block_type) {
            Some(emitter) => emitter,
            None => {
                self.session.diagnostics.push(
                    Diagnostic::error(
                        GeneratorError::UnknownBlockType {
                            block_type: block.block_type.clone(),
                            block_id: id.clone(),
                        }
                        .to_string(),
                    )
                    .with_block(id),
                );
                return None;
            }
        };
        Some(emitter.emit(block, self))
    }

    /// 値入力のコードを解決する
    ///
    /// 子の優先順位が埋め込み位置の要求より厳密に強くなければ括弧で包む。
    /// 未接続ならNone。
    pub fn value_to_code(&mut self, block: &Block, input: &str, order: Order) -> Option<String> {
        let child_id = block.value_inputs.get(input)?.clone();
        match self.emit_block(&child_id) {
            Some(Emitted::Expression(code, inner)) => {
                Some(wrap_if_needed(code, inner, order))
            }
            Some(Emitted::Statement(_)) => {
                // 値が必要な位置に文が接続されている
                self.session.diagnostics.push(
                    Diagnostic::warning(
                        GeneratorError::StatementAsValue {
                            input: input.to_owned(),
                            block_id: block.id.clone(),
                        }
                        .to_string(),
                    )
                    .with_block(&block.id),
                );
                Some(format!(
                    "0 /* statement block: {} */",
                    self.document
                        .block(&child_id)
                        .map(|b| b.block_type.clone())
                        .unwrap_or_default()
                ))
            }
            None => Some(value_placeholder(
                &self
                    .document
                    .block(&child_id)
                    .map(|b| b.block_type.clone())
                    .unwrap_or_default(),
            )),
        }
    }

    /// 値入力のコードを解決し、未接続ならデフォルト値を返す
    pub fn value_to_code_or(
        &mut self,
        block: &Block,
        input: &str,
        order: Order,
        default: &str,
    ) -> String {
        self.value_to_code(block, input, order)
            .unwrap_or_else(|| default.to_owned())
    }

    /// ステートメント入力に接続された連鎖のコードを返す
    pub fn statement_to_code(&mut self, block: &Block, input: &str) -> String {
        match block.statement_inputs.get(input) {
            Some(child_id) => self.statement_chain(&child_id.clone(), false),
            None => String::new(),
        }
    }

    /// ステートメント連鎖を描画する
    ///
    /// ブロック自身のコメントと、直下の値入力部分木のコメントを行コメント
    /// として前置する。`this_only`が偽なら後続ブロックも連結する。
    /// 描画中のidを再訪した場合は連鎖を打ち切り、循環診断を記録する。
    pub fn statement_chain(&mut self, id: &BlockId, this_only: bool) -> String {
        if !self.session.in_progress.insert(id.clone()) {
            self.session.diagnostics.push(
                Diagnostic::error(
                    GeneratorError::CircularChainDetected { block_id: id.clone() }.to_string(),
                )
                .with_block(id),
            );
            return String::new();
        }

        let code = self.render_statement(id, this_only);
        self.session.in_progress.remove(id);
        code
    }

    fn render_statement(&mut self, id: &BlockId, this_only: bool) -> String {
        let block = match self.document.block(id) {
            Some(block) => block,
            None => {
                self.session.diagnostics.push(
                    Diagnostic::error(
                        GeneratorError::MissingBlock { block_id: id.clone() }.to_string(),
                    )
                    .with_block(id),
                );
                return String::new();
            }
        };

        let mut code = String::new();

        // ブロック自身のコメント
        if let Some(comment) = &block.comment {
            code.push_str(&comment_lines(comment));
        }
        // 直下の値入力部分木のコメント（ステートメント側の子は含めない）
        for child_id in block.value_inputs.values() {
            for comment in self.collect_value_comments(child_id) {
                code.push_str(&comment_lines(&comment));
            }
        }

        let own = match self.emit_block(id) {
            Some(Emitted::Statement(s)) => s,
            // 裸の式には終端子を強制する
            Some(Emitted::Expression(e, _)) => format!("{};", e),
            None => format!("// unknown block: {}", block.block_type),
        };
        code.push_str(&own);

        if !this_only {
            if let Some(next) = block.next.clone() {
                let next_code = self.statement_chain(&next, false);
                if !next_code.is_empty() {
                    code.push('\n');
                    code.push_str(&next_code);
                }
            }
        }

        code
    }

    /// 値入力部分木からコメントを収集する
    fn collect_value_comments(&self, id: &BlockId) -> Vec<String> {
        let mut comments = Vec::new();
        let mut stack = vec![id.clone()];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(block) = self.document.block(&current) {
                if let Some(comment) = &block.comment {
                    comments.push(comment.clone());
                }
                // 深さ優先・宣言順を保つため逆順で積む
                for child in block.value_inputs.values().rev() {
                    stack.push(child.clone());
                }
            }
        }
        comments
    }
}

/// 値位置に埋めるエラーマーカー
fn value_placeholder(block_type: &str) -> String {
    format!("0 /* unknown block: {} */", block_type)
}

/// コメントを60桁で折り返し、`// `を前置した行群にする
fn comment_lines(text: &str) -> String {
    let mut out = String::new();
    for raw_line in text.lines() {
        let mut line = String::new();
        for word in raw_line.split_whitespace() {
            if !line.is_empty() && line.len() + 1 + word.len() > COMMENT_WRAP {
                out.push_str("// ");
                out.push_str(&line);
                out.push('\n');
                line.clear();
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        out.push_str("// ");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// ドキュメント中で実際に参照されている宣言変数の集合を求める
///
/// ライブラリ定義を持つ型は`variables`引数グループに挙げられた
/// フィールドのみを参照とみなす。ネイティブ実装の型は、宣言名と一致する
/// フィールド値を参照とみなす。
fn referenced_variables(document: &BlockDocument, registry: &EmitterRegistry) -> HashSet<String> {
    let declared: HashSet<&str> = document.variables.iter().map(|v| v.name.as_str()).collect();
    let mut referenced = HashSet::new();
    for block in document.blocks.values() {
        if let Some(definition) = registry.definition(&block.block_type) {
            for arg in &definition.args.variables {
                if let Some(value) = block.field(arg) {
                    let name = value.to_code();
                    if declared.contains(name.as_str()) {
                        referenced.insert(name);
                    }
                }
            }
        } else {
            for value in block.fields.values() {
                let name = value.to_code();
                if declared.contains(name.as_str()) {
                    referenced.insert(name);
                }
            }
        }
    }
    referenced
}

/// 一回の生成パスを実行する
///
/// 常にベストエフォートの全文と診断を返す。グラフ由来の問題で
/// 失敗することはない。
pub fn generate(
    document: &BlockDocument,
    registry: &EmitterRegistry,
    config: GeneratorConfig,
) -> GeneratedProgram {
    let mut session = GeneratorSession::new(config);
    // パスごとに一度だけ全バケットを初期化する
    session.sections.reset();

    log::debug!(
        "generation pass: {} roots, {} blocks",
        document.roots.len(),
        document.blocks.len()
    );

    // 参照されている宣言変数を宣言順で識別子レジストリへ先に登録する。
    // 未使用の宣言は識別子も消費しない。
    let referenced = referenced_variables(document, registry);
    let mut emitted_vars: Vec<(String, String)> = Vec::new();
    for decl in &document.variables {
        if referenced.contains(&decl.name) {
            let ident = session.names.safe_name(NameKind::Variable, &decl.name);
            session
                .variable_types
                .insert(decl.name.clone(), decl.var_type.clone());
            emitted_vars.push((decl.name.clone(), ident));
        }
    }

    // ルート連鎖を宣言順に描画する。コンテナに属さないコードはloop本体へ。
    let mut ctx = Context::new(document, registry, &mut session);
    for root in &document.roots {
        let code = ctx.statement_chain(root, false);
        let code = code.trim_end();
        if !code.is_empty() {
            if let Some(diag) =
                ctx.session
                    .sections
                    .add(Section::Loop, root.as_str().to_owned(), code, false)
            {
                ctx.session.diagnostics.push(diag.with_block(root));
            }
        }
    }

    // 参照された変数の宣言を変数セクションへ
    for (name, ident) in &emitted_vars {
        let var_type = session
            .variable_types
            .get(name)
            .cloned()
            .unwrap_or_else(|| "int".to_owned());
        if let Some(diag) = session.sections.add(
            Section::Variables,
            name.clone(),
            format!("{} {};", var_type, ident),
            false,
        ) {
            session.diagnostics.push(diag);
        }
    }

    let code = assembler::assemble(&session.sections);
    log::info!(
        "generated {} bytes, {} diagnostics",
        code.len(),
        session.diagnostics.len()
    );

    GeneratedProgram {
        code,
        diagnostics: session.diagnostics.into_diagnostics(),
    }
}
