//! In-memory knowledge engine for grounded answer synthesis.
//!
//! The engine loads pre-indexed text units from the knowledge-base
//! directory, embeds them once at construction time, and answers questions
//! by ranking units against the question embedding and synthesizing a
//! completion restricted to the selected passages.

use std::path::Path;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, CreateEmbeddingRequestArgs, EmbeddingInput,
    },
};
use anyhow::anyhow;
use tracing::{debug, info, instrument};

use crate::base::{config::Config, prompts, types::Res};

/// Rough token estimate; the budget math does not need tokenizer precision.
const APPROX_CHARS_PER_TOKEN: usize = 4;

/// Largest text unit carved out of a source document, in characters.
const MAX_UNIT_CHARS: usize = 2_000;

/// Embedding batch size for one-time index construction.
const EMBED_BATCH_SIZE: usize = 64;

/// Search parameters for context assembly and answer synthesis.
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Proportion of the context budget spent on raw text units.
    pub text_unit_proportion: f32,
    /// Proportion of the context budget reserved for community summaries.
    pub community_proportion: f32,
    /// Conversation turns retained when building context.
    pub conversation_history_max_turns: usize,
    /// Entity matches considered per question.
    pub top_k_mapped_entities: usize,
    /// Relationship matches considered per question.
    pub top_k_relationships: usize,
    /// Total context budget, in tokens.
    pub max_context_tokens: usize,
    /// Output budget for the synthesized answer, in tokens.
    pub max_answer_tokens: u32,
    /// Sampling temperature for answer synthesis.
    pub temperature: f32,
    /// Desired response shape, e.g. "single paragraph".
    pub response_type: &'static str,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            text_unit_proportion: 0.5,
            community_proportion: 0.1,
            conversation_history_max_turns: 5,
            top_k_mapped_entities: 10,
            top_k_relationships: 10,
            max_context_tokens: 12_000,
            max_answer_tokens: 2_000,
            temperature: 0.0,
            response_type: "single paragraph",
        }
    }
}

/// One retrievable passage from the knowledge base.
#[derive(Debug, Clone)]
pub struct TextUnit {
    pub source: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Answer plus the context it was synthesized from.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub response: String,
    pub context_text: String,
}

/// The knowledge engine: embedded text units plus fixed search parameters.
///
/// Construction is expensive (disk reads and one embedding call per batch of
/// units); the engine is read-only afterwards, so concurrent questions may
/// share it freely.
pub struct KnowledgeEngine {
    client: Client<OpenAIConfig>,
    config: Config,
    params: SearchParams,
    units: Vec<TextUnit>,
}

impl KnowledgeEngine {
    /// Load the knowledge base and build the in-memory embedding index.
    #[instrument(name = "KnowledgeEngine::load", skip_all)]
    pub async fn load(config: &Config) -> Res<Self> {
        let params = SearchParams::default();
        let dir = Path::new(&config.knowledge_base_dir);

        info!("Answering with grounded data at {} (knowledge engine).", dir.display());

        let documents = read_knowledge_base(dir)?;

        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());
        let client = Client::with_config(cfg);

        let mut engine = Self {
            client,
            config: config.clone(),
            params,
            units: Vec::new(),
        };

        engine.build_index(documents).await?;

        info!("Knowledge engine ready with {} text units.", engine.units.len());

        Ok(engine)
    }

    /// Embed every text unit, in batches.
    async fn build_index(&mut self, documents: Vec<(String, String)>) -> Res<()> {
        let mut units = Vec::new();

        for (source, text) in &documents {
            for chunk in split_into_units(text, MAX_UNIT_CHARS) {
                units.push((source.clone(), chunk));
            }
        }

        if units.is_empty() {
            return Err(anyhow!("knowledge base at `{}` contains no text units", self.config.knowledge_base_dir));
        }

        for batch in units.chunks(EMBED_BATCH_SIZE) {
            let inputs = batch.iter().map(|(_, text)| text.clone()).collect::<Vec<_>>();
            let embeddings = self.embed(inputs).await?;

            if embeddings.len() != batch.len() {
                return Err(anyhow!("embedding count mismatch: asked for {}, got {}", batch.len(), embeddings.len()));
            }

            for ((source, text), embedding) in batch.iter().cloned().zip(embeddings) {
                self.units.push(TextUnit { source, text, embedding });
            }
        }

        Ok(())
    }

    /// Embed a batch of texts with the configured embedding model.
    async fn embed(&self, inputs: Vec<String>) -> Res<Vec<Vec<f32>>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.config.openai_embedding_model)
            .input(EmbeddingInput::StringArray(inputs))
            .build()?;

        let response = self.client.embeddings().create(request).await?;

        Ok(response.data.into_iter().map(|e| e.embedding).collect())
    }

    /// Answer a question from the knowledge base.
    #[instrument(name = "KnowledgeEngine::search", skip_all)]
    pub async fn search(&self, question: &str) -> Res<SearchResult> {
        let question_embedding = self
            .embed(vec![question.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("embedding provider returned no vector for the question"))?;

        let context_text = self.assemble_context(&question_embedding);

        debug!("Assembled grounded context of {} chars.", context_text.len());

        let system = prompts::GROUNDED_SYNTHESIS_DIRECTIVE.replace("{response_type}", self.params.response_type);
        let user = format!("# Reference Passages\n\n{context_text}\n\n# Question\n\n{question}\n");

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.openai_chat_model)
            .temperature(self.params.temperature)
            .max_completion_tokens(self.params.max_answer_tokens)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default().content(system).build()?.into(),
                ChatCompletionRequestUserMessageArgs::default().content(user).build()?.into(),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| anyhow!("grounded synthesis returned an empty completion"))?;

        Ok(SearchResult { response: answer, context_text })
    }

    /// Rank units against the question and pack the best into the text-unit
    /// share of the context budget.
    fn assemble_context(&self, question_embedding: &[f32]) -> String {
        let budget_tokens = (self.params.max_context_tokens as f32 * self.params.text_unit_proportion) as usize;

        let mut ranked = self
            .units
            .iter()
            .map(|unit| (cosine_similarity(question_embedding, &unit.embedding), unit))
            .collect::<Vec<_>>();

        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

        let selected = select_within_budget(ranked.iter().map(|(_, unit)| *unit), budget_tokens, self.params.top_k_mapped_entities);

        selected
            .iter()
            .map(|unit| format!("[{}]\n{}", unit.source, unit.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Read every UTF-8 `.txt` document under the knowledge-base directory.
fn read_knowledge_base(dir: &Path) -> Res<Vec<(String, String)>> {
    if !dir.is_dir() {
        return Err(anyhow!("knowledge-base directory `{}` does not exist", dir.display()));
    }

    let mut documents = Vec::new();

    let mut entries = std::fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();

        if path.extension().is_some_and(|ext| ext == "txt") {
            let text = std::fs::read_to_string(&path)?;
            let source = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default();

            if !text.trim().is_empty() {
                documents.push((source, text));
            }
        }
    }

    if documents.is_empty() {
        return Err(anyhow!("knowledge-base directory `{}` contains no .txt documents", dir.display()));
    }

    Ok(documents)
}

/// Split a document into paragraph-aligned units no larger than `max_chars`.
fn split_into_units(text: &str, max_chars: usize) -> Vec<String> {
    let mut units = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        if !current.is_empty() && current.len() + paragraph.len() + 2 > max_chars {
            units.push(std::mem::take(&mut current));
        }

        // A single oversized paragraph is split on char boundaries.
        if paragraph.len() > max_chars {
            let mut rest = paragraph;
            while rest.len() > max_chars {
                let mut split_at = max_chars;
                while !rest.is_char_boundary(split_at) {
                    split_at -= 1;
                }
                let (head, tail) = rest.split_at(split_at);
                units.push(head.to_string());
                rest = tail;
            }
            current = rest.to_string();
            continue;
        }

        if current.is_empty() {
            current = paragraph.to_string();
        } else {
            current.push_str("\n\n");
            current.push_str(paragraph);
        }
    }

    if !current.is_empty() {
        units.push(current);
    }

    units
}

/// Take ranked units until either the token budget or the unit cap is hit.
fn select_within_budget<'a>(ranked: impl Iterator<Item = &'a TextUnit>, budget_tokens: usize, max_units: usize) -> Vec<&'a TextUnit> {
    let mut selected = Vec::new();
    let mut used_tokens = 0;

    for unit in ranked {
        let unit_tokens = unit.text.len().div_ceil(APPROX_CHARS_PER_TOKEN);

        if selected.len() >= max_units || (used_tokens + unit_tokens > budget_tokens && !selected.is_empty()) {
            break;
        }

        used_tokens += unit_tokens;
        selected.push(unit);
    }

    selected
}

/// Cosine similarity between two embedding vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot = a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 { 0.0 } else { dot / (norm_a * norm_b) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(text: &str) -> TextUnit {
        TextUnit {
            source: "doc".to_string(),
            text: text.to_string(),
            embedding: vec![],
        }
    }

    #[test]
    fn default_search_params_are_fixed() {
        let params = SearchParams::default();

        assert_eq!(params.text_unit_proportion, 0.5);
        assert_eq!(params.community_proportion, 0.1);
        assert_eq!(params.conversation_history_max_turns, 5);
        assert_eq!(params.top_k_mapped_entities, 10);
        assert_eq!(params.top_k_relationships, 10);
        assert_eq!(params.max_context_tokens, 12_000);
        assert_eq!(params.temperature, 0.0);
        assert_eq!(params.response_type, "single paragraph");
    }

    #[test]
    fn cosine_similarity_ranks_aligned_vectors_higher() {
        let question = [1.0, 0.0, 1.0];

        let aligned = cosine_similarity(&question, &[2.0, 0.0, 2.0]);
        let orthogonal = cosine_similarity(&question, &[0.0, 1.0, 0.0]);

        assert!((aligned - 1.0).abs() < 1e-6);
        assert_eq!(orthogonal, 0.0);
    }

    #[test]
    fn cosine_similarity_handles_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn split_keeps_small_paragraphs_together() {
        let units = split_into_units("first paragraph\n\nsecond paragraph", 100);

        assert_eq!(units.len(), 1);
        assert!(units[0].contains("first paragraph"));
        assert!(units[0].contains("second paragraph"));
    }

    #[test]
    fn split_breaks_on_the_size_cap() {
        let text = format!("{}\n\n{}", "a".repeat(60), "b".repeat(60));

        let units = split_into_units(&text, 100);

        assert_eq!(units.len(), 2);
    }

    #[test]
    fn split_carves_up_oversized_paragraphs() {
        let text = "x".repeat(250);

        let units = split_into_units(&text, 100);

        assert_eq!(units.len(), 3);
        assert!(units.iter().all(|u| u.len() <= 100));
    }

    #[test]
    fn selection_respects_the_token_budget() {
        let units = vec![unit(&"a".repeat(400)), unit(&"b".repeat(400)), unit(&"c".repeat(400))];

        // 400 chars is ~100 tokens per unit; a 150-token budget fits one.
        let selected = select_within_budget(units.iter(), 150, 10);

        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn selection_respects_the_unit_cap() {
        let units = (0..20).map(|_| unit("short")).collect::<Vec<_>>();

        let selected = select_within_budget(units.iter(), 10_000, 10);

        assert_eq!(selected.len(), 10);
    }

    #[test]
    fn selection_always_takes_at_least_one_unit_within_cap() {
        let units = vec![unit(&"a".repeat(4_000))];

        // The first unit is admitted even when it alone exceeds the budget.
        let selected = select_within_budget(units.iter(), 100, 10);

        assert_eq!(selected.len(), 1);
    }
}
