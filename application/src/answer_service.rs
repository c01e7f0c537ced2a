use domain::models::RankedResult;
use domain::ports::GenerationProvider;
use shared::utils::truncate_chars;

pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 8000;

pub const ANSWER_UNAVAILABLE: &str = "Could not generate an answer.";

pub struct AnswerService<G> {
    generator: G,
    max_context_chars: usize,
}

impl<G: GenerationProvider> AnswerService<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }

    pub fn with_max_context_chars(mut self, max_context_chars: usize) -> Self {
        self.max_context_chars = max_context_chars;
        self
    }

    pub fn build_prompt(&self, question: &str, results: &[RankedResult<'_>]) -> String {
        let context = results
            .iter()
            .map(|result| result.document.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let context = truncate_chars(&context, self.max_context_chars);
        let sources = results
            .iter()
            .map(|result| format!("- {}", result.document.name))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Answer the question below accurately and clearly, using only the context.\n\
             If the context does not contain the answer, say plainly that the information is not available.\n\n\
             Context:\n{context}\n\n\
             Question: {question}\n\n\
             After the answer, list the sources you used from the following documents:\n{sources}\n"
        )
    }

    pub async fn compose(&self, question: &str, results: &[RankedResult<'_>]) -> String {
        let prompt = self.build_prompt(question, results);
        match self.generator.generate(&prompt).await {
            Ok(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
            Ok(_) => {
                tracing::warn!("generation returned an empty answer");
                ANSWER_UNAVAILABLE.to_string()
            }
            Err(err) => {
                tracing::warn!(error = %err, "answer generation failed");
                ANSWER_UNAVAILABLE.to_string()
            }
        }
    }
}
