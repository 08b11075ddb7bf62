//! Prompt construction for batch summarization

use sift_domain::{ExtractedDocument, WorkBatch};
use sift_llm::CompletionRequest;

/// Marker appended to a document cut at the character cap
pub const TRUNCATION_MARKER: &str = "[... truncated]";

/// Builds one structured-output request covering every document in a batch
pub struct BatchPromptBuilder {
    max_document_chars: usize,
    max_tokens: u32,
}

impl BatchPromptBuilder {
    /// Create a new prompt builder
    pub fn new(max_document_chars: usize) -> Self {
        Self {
            max_document_chars,
            max_tokens: CompletionRequest::DEFAULT_MAX_TOKENS,
        }
    }

    /// Set the generation budget for the request
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Build the complete request for a batch
    pub fn build(&self, batch: &WorkBatch) -> CompletionRequest {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "Summarize each of the following {} files.\n",
            batch.len()
        ));
        prompt.push_str("Return one entry per file, keyed by the exact path shown in its header.\n\n");

        for document in &batch.documents {
            prompt.push_str(&self.render_document(document));
        }

        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        CompletionRequest::new(prompt)
            .with_system(SUMMARY_INSTRUCTIONS)
            .with_schema(RESPONSE_SCHEMA)
            .with_max_tokens(self.max_tokens)
    }

    fn render_document(&self, document: &ExtractedDocument) -> String {
        format!(
            "### File: {}\n---\n{}\n---\n\n",
            document.path,
            truncate(&document.content, self.max_document_chars)
        )
    }
}

/// Cut `content` to at most `max_chars` characters, appending the marker
pub fn truncate(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}\n{}", &content[..byte_idx], TRUNCATION_MARKER),
        None => content.to_string(),
    }
}

const SUMMARY_INSTRUCTIONS: &str = r####"You summarize recently modified documents for a daily digest.

For every file:
- "summary": two or three sentences on what the document is about
- "key_facts": concrete, checkable statements from the document
- "insights": interpretations, implications or open questions
- "statistics": notable numbers, keyed by what they measure
- "sources": the file path plus any external references the document cites

Provenance rules:
- Every key fact MUST end with a marker of the form [source: path:line]
- Every insight MUST end with a marker of the form [source: path]
- Use the exact file path from the "### File:" header
- Do not state anything the document does not support"####;

/// JSON schema the provider must follow
pub const RESPONSE_SCHEMA: &str = r#"{
  "type": "object",
  "description": "Maps each file path to its summary",
  "additionalProperties": {
    "type": "object",
    "required": ["summary", "key_facts", "insights"],
    "properties": {
      "summary": {"type": "string"},
      "key_facts": {"type": "array", "items": {"type": "string"}},
      "insights": {"type": "array", "items": {"type": "string"}},
      "statistics": {"type": "object", "additionalProperties": {"type": ["string", "number"]}},
      "sources": {"type": "array", "items": {"type": "string"}}
    }
  }
}"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (JSON object only, no additional text):
{
  "path/to/file.md": {
    "summary": "...",
    "key_facts": ["... [source: path/to/file.md:12]"],
    "insights": ["... [source: path/to/file.md]"],
    "statistics": {"metric": "value"},
    "sources": ["path/to/file.md"]
  }
}

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;
