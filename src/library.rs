//! ライブラリ定義とテンプレートエミッタ
//!
//! ブロックライブラリはブロック型ごとの`EmitterDefinition`をJSONで
//! 供給する。定義はスロット別のコードテンプレートと、テンプレートが
//! 参照する引数名のグループを宣言する。`TemplateEmitter`は定義を
//! 解釈して通常のエミッタとして振る舞う。

use crate::block::Block;
use crate::error::{Diagnostic, TemplateError, TsumikiResult};
use crate::generator::precedence::Order;
use crate::generator::registry::{Emitted, Emitter};
use crate::generator::sections::Section;
use crate::generator::Context;
use crate::template;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// スロット別のコードテンプレート
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlotTemplates {
    /// `#define`などマクロセクション行き
    #[serde(rename = "macro")]
    pub macro_template: Option<String>,
    /// `#include`行
    pub library: Option<String>,
    /// オブジェクト宣言。`${OBJECT}`が命名規約に従った識別子になる。
    pub object: Option<String>,
    /// 補助関数定義
    pub function: Option<String>,
    /// setup()へ入る初期化コード
    pub setup: Option<String>,
    /// ブロック自身のコード
    pub code: Option<String>,
}

/// テンプレートが参照する引数名のグループ
///
/// グループごとに解決方法が異なる。いずれも宣言順が保たれる。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArgGroups {
    /// ステートメント入力の連鎖コード
    pub statements: Vec<String>,
    /// 値入力のコード（アトミック優先順位で解決）
    pub values: Vec<String>,
    /// 変数参照フィールド（生成された識別子になる）
    pub variables: Vec<String>,
    /// リテラルフィールド値
    pub fields: Vec<String>,
}

/// ライブラリが供給するブロック型定義
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmitterDefinition {
    pub block_type: String,
    pub templates: SlotTemplates,
    pub args: ArgGroups,
    /// 真ならこのブロックは式を生成する（出力コネクタを持つ）
    pub output: bool,
}

/// 定義ファイル（定義の配列）を読み込む
pub fn load_definitions(path: impl AsRef<Path>) -> TsumikiResult<Vec<EmitterDefinition>> {
    let text = std::fs::read_to_string(path)?;
    let definitions: Vec<EmitterDefinition> = serde_json::from_str(&text)?;
    Ok(definitions)
}

/// 定義を解釈するエミッタ
pub struct TemplateEmitter {
    definition: EmitterDefinition,
}

impl TemplateEmitter {
    pub fn new(definition: EmitterDefinition) -> Self {
        Self { definition }
    }

    /// ブロックの実引数から変数表を組み立てる
    ///
    /// 定義が挙げた名前がブロックの入力/フィールドに存在しない場合は
    /// `"?"`に退化させ、診断を記録する。
    fn build_vars(&self, block: &Block, ctx: &mut Context<'_>) -> IndexMap<String, String> {
        let mut vars = IndexMap::new();
        let args = &self.definition.args;

        for name in &args.statements {
            let value = if block.statement_inputs.contains_key(name) {
                ctx.statement_to_code(block, name)
            } else {
                self.missing_arg(name, block, ctx)
            };
            vars.insert(name.clone(), value);
        }
        for name in &args.values {
            let value = match ctx.value_to_code(block, name, Order::Atomic) {
                Some(code) => code,
                None => self.missing_arg(name, block, ctx),
            };
            vars.insert(name.clone(), value);
        }
        for name in &args.variables {
            let value = match block.field(name) {
                Some(field) => {
                    let requested = field.to_code();
                    ctx.variable_name(&requested)
                }
                None => self.missing_arg(name, block, ctx),
            };
            vars.insert(name.clone(), value);
        }
        for name in &args.fields {
            let value = match block.field(name) {
                Some(field) => field.to_code(),
                None => self.missing_arg(name, block, ctx),
            };
            vars.insert(name.clone(), value);
        }
        vars
    }

    fn missing_arg(&self, name: &str, block: &Block, ctx: &mut Context<'_>) -> String {
        ctx.session.diagnostics.push(
            Diagnostic::warning(
                TemplateError::InvalidArgumentGroup {
                    name: name.to_owned(),
                }
                .to_string(),
            )
            .with_block(&block.id),
        );
        "?".to_owned()
    }

    /// オブジェクト命名規約に従ったセクションタグを求める
    ///
    /// タグは`小文字の型名 + "_" + 第一引数の値`。同じ物理資源を構成する
    /// ブロック同士が同じタグに収束し、宣言が一つにまとまる。
    fn object_tag(&self, object_template: &str, vars: &IndexMap<String, String>) -> String {
        let resolved = template::substitute(object_template, vars);
        let type_name: String = resolved
            .split_whitespace()
            .next()
            .unwrap_or("object")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        let type_name = type_name.to_lowercase();

        match self.primary_argument(vars) {
            Some(value) => format!("{}_{}", type_name, value),
            None => type_name,
        }
    }

    /// 第一引数の値（最初の空でないグループの先頭の名前）
    fn primary_argument(&self, vars: &IndexMap<String, String>) -> Option<String> {
        let args = &self.definition.args;
        let name = args
            .statements
            .first()
            .or_else(|| args.values.first())
            .or_else(|| args.variables.first())
            .or_else(|| args.fields.first())?;
        vars.get(name).cloned()
    }

    /// スロットを展開し、評価エラーを診断として記録する
    fn expand_slot(
        &self,
        template_text: &str,
        vars: &IndexMap<String, String>,
        block: &Block,
        ctx: &mut Context<'_>,
    ) -> String {
        let (text, errors) = template::expand(template_text, vars);
        for error in errors {
            ctx.session.diagnostics.push(
                Diagnostic::warning(
                    TemplateError::EvaluationError {
                        message: error.to_string(),
                    }
                    .to_string(),
                )
                .with_block(&block.id),
            );
        }
        text.trim().to_owned()
    }

    fn add_section(
        &self,
        section: Section,
        tag: &str,
        code: String,
        block: &Block,
        ctx: &mut Context<'_>,
    ) {
        if code.is_empty() {
            return;
        }
        if let Some(diag) = ctx.session.sections.add(section, tag.to_owned(), code, false) {
            ctx.session.diagnostics.push(diag.with_block(&block.id));
        }
    }
}

impl Emitter for TemplateEmitter {
    fn emit(&self, block: &Block, ctx: &mut Context<'_>) -> Emitted {
        let mut vars = self.build_vars(block, ctx);

        // オブジェクトを宣言する定義では、タグと同じ識別子をテンプレートへ
        // `${OBJECT}`として渡す。識別子は以後の名前生成と衝突しないよう
        // 予約する。
        let object_tag = self
            .definition
            .templates
            .object
            .as_ref()
            .map(|object_template| self.object_tag(object_template, &vars));
        if let Some(tag) = &object_tag {
            ctx.session.names.reserve(tag.clone());
            vars.insert("OBJECT".to_owned(), tag.clone());
        }

        let block_type = &self.definition.block_type;
        let templates = &self.definition.templates;

        if let Some(text) = &templates.macro_template {
            let code = self.expand_slot(text, &vars, block, ctx);
            self.add_section(Section::Macros, block_type, code, block, ctx);
        }
        if let Some(text) = &templates.library {
            let code = self.expand_slot(text, &vars, block, ctx);
            self.add_section(Section::Libraries, block_type, code, block, ctx);
        }
        if let Some(text) = &templates.object {
            let code = self.expand_slot(text, &vars, block, ctx);
            let tag = object_tag.as_deref().unwrap_or(block_type);
            self.add_section(Section::Objects, tag, code, block, ctx);
        }
        if let Some(text) = &templates.function {
            let code = self.expand_slot(text, &vars, block, ctx);
            self.add_section(Section::Functions, block_type, code, block, ctx);
        }
        if let Some(text) = &templates.setup {
            let code = self.expand_slot(text, &vars, block, ctx);
            // オブジェクトを持つ定義のsetupは物理オブジェクト単位で重複排除
            let tag = object_tag.as_deref().unwrap_or(block_type);
            self.add_section(Section::Setup, tag, code, block, ctx);
        }

        let code = match &templates.code {
            Some(text) => self.expand_slot(text, &vars, block, ctx),
            None => String::new(),
        };
        if self.definition.output {
            Emitted::Expression(code, Order::Atomic)
        } else {
            Emitted::Statement(code)
        }
    }
}
