//! Section drafting prompts

use crate::types::SectionRequest;
use inkwarden_promise::build_promise_guard;
use inkwarden_sources::{format_sources_for_prompt, Whitelist};

/// Builds the drafting prompt for one section
pub struct PromptBuilder<'a> {
    request: &'a SectionRequest,
    sources: &'a Whitelist,
    min_chars: Option<usize>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(request: &'a SectionRequest, sources: &'a Whitelist) -> Self {
        Self {
            request,
            sources,
            min_chars: None,
        }
    }

    /// Ask for at least `min_chars` characters (the length retry)
    pub fn with_length_reminder(mut self, min_chars: usize) -> Self {
        self.min_chars = Some(min_chars);
        self
    }

    /// Build the complete drafting prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(WRITER_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str(&format!("## 段落標題\n{}\n\n", self.request.heading.trim()));
        if !self.request.keyword.trim().is_empty() {
            prompt.push_str(&format!("主要關鍵字：{}\n\n", self.request.keyword.trim()));
        }
        if !self.request.brief.trim().is_empty() {
            prompt.push_str(&format!("## 段落重點\n{}\n\n", self.request.brief.trim()));
        }

        prompt.push_str("## 參考文獻庫\n");
        prompt.push_str(&format_sources_for_prompt(self.sources));
        prompt.push_str("\n\n");
        prompt.push_str(CITATION_RULES);

        prompt.push_str(&build_promise_guard(self.request.promise.as_ref()));

        if let Some(min) = self.min_chars {
            prompt.push_str(&format!(
                "\n## 篇幅要求\n- 上一版內容太短。本段正文至少需要 {} 個字，請補充具體說明與實例。\n",
                min
            ));
        }

        prompt.push('\n');
        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }
}

const WRITER_INSTRUCTIONS: &str = "你是一位專業的內容撰稿人。請為以下段落撰寫內文，使用台灣繁體中文，語氣專業、權威且易讀。";

const CITATION_RULES: &str = r#"## 引用規則
- 引用參考文獻庫中的來源時，只在句尾標註 [1]、[2] 等編號。
- 參考文獻庫為空或沒有相關來源時，不要引用，也不要編造編號。
- 不要寫出任何網址，也不要輸出 <a> 連結。
- 沒有來源支撐的統計數字或百分比不要寫。
"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"## 輸出格式
- 直接輸出 HTML，不要使用 markdown 程式碼區塊，不要有其他說明。
- 不要重複段落標題，不要使用 <h1> 或 <h2>；子標題使用 <h3>。
- 內文使用 <p>、<ul>/<ol>、<strong>。"#;
