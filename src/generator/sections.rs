//! セクション辞書
//!
//! 生成されるコード片を役割ごとに蓄積するバケット群。各バケットは
//! タグ→コードの順序付き辞書で、同じ資源を指すタグは一度しか登録されない。
//! 複数のブロックが同じ物理資源（例: ピン9のサーボ）を構成する場合、
//! タグの一致によって宣言が一つに収束する。

use crate::error::{Diagnostic, GeneratorError};
use indexmap::IndexMap;

/// 生成コードの登録先セクション
///
/// 並び順は最終出力の並び順と一致する。セクション名は閉じた列挙なので、
/// 不正なセクション名は型レベルで表現できない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// `#define` などのマクロ
    Macros,
    /// `#include` 行
    Libraries,
    /// グローバル変数宣言
    Variables,
    /// ライブラリオブジェクトの宣言（例: `Servo servo_9;`）
    Objects,
    /// 補助関数定義
    Functions,
    /// setup()本体の前置部
    SetupBegin,
    /// setup()本体
    Setup,
    /// setup()本体の後置部
    SetupEnd,
    /// loop()本体の前置部
    LoopBegin,
    /// loop()本体
    Loop,
    /// loop()本体の後置部
    LoopEnd,
}

impl Section {
    /// 全セクションを出力順で並べたもの
    pub const ALL: [Section; 11] = [
        Section::Macros,
        Section::Libraries,
        Section::Variables,
        Section::Objects,
        Section::Functions,
        Section::SetupBegin,
        Section::Setup,
        Section::SetupEnd,
        Section::LoopBegin,
        Section::Loop,
        Section::LoopEnd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Section::Macros => "macros",
            Section::Libraries => "libraries",
            Section::Variables => "variables",
            Section::Objects => "objects",
            Section::Functions => "functions",
            Section::SetupBegin => "setupBegin",
            Section::Setup => "setup",
            Section::SetupEnd => "setupEnd",
            Section::LoopBegin => "loopBegin",
            Section::Loop => "loop",
            Section::LoopEnd => "loopEnd",
        }
    }

    fn index(self) -> usize {
        Section::ALL.iter().position(|s| *s == self).expect("section in ALL")
    }
}

/// タグ付き・重複排除ありの蓄積バケット群
#[derive(Debug, Default)]
pub struct Sections {
    buckets: [IndexMap<String, String>; 11],
}

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    /// 全バケットを空にする。パス開始時に一度だけ呼ばれる。
    pub fn reset(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// コード片をセクションへ登録する
    ///
    /// タグが未登録なら末尾に追加。登録済みで`overwrite`が偽なら何もせず、
    /// 重複登録を知らせる診断を返す。`overwrite`が真なら位置を保ったまま
    /// 値だけ差し替える。
    pub fn add(
        &mut self,
        section: Section,
        tag: impl Into<String>,
        code: impl Into<String>,
        overwrite: bool,
    ) -> Option<Diagnostic> {
        let tag = tag.into();
        let bucket = &mut self.buckets[section.index()];
        if bucket.contains_key(&tag) && !overwrite {
            return Some(Diagnostic::info(
                GeneratorError::DuplicateRegistrationIgnored {
                    section: section.name(),
                    tag,
                }
                .to_string(),
            ));
        }
        // IndexMap::insertは既存キーの位置を保って値を置き換える
        bucket.insert(tag, code.into());
        None
    }

    /// セクションのコード片を挿入順で返す
    pub fn collect(&self, section: Section) -> Vec<&str> {
        self.buckets[section.index()]
            .values()
            .map(String::as_str)
            .collect()
    }

    pub fn is_empty(&self, section: Section) -> bool {
        self.buckets[section.index()].is_empty()
    }

    pub fn contains(&self, section: Section, tag: &str) -> bool {
        self.buckets[section.index()].contains_key(tag)
    }
}
