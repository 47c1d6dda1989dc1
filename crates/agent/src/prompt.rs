//! The RAG prompt shared by both domain agents.

/// Assemble the user prompt from the retrieved document, the rendered
/// conversation history (including the question being asked) and the question.
pub fn build_rag_prompt(source: &str, chunk: &str, history_text: &str, query: &str) -> String {
    format!(
        "\n### Retrieved Document Chunk (from {source}):\n{chunk}\n\n\
         ### Conversation History:\n{history_text}\n\n\
         ### User Question:\n{query}\n\n\
         ### Instructions:\n\
         - Use ONLY the retrieved chunk + history.\n\
         - Do NOT hallucinate.\n\
         - If a workflow is required, call workflow_executor.\n"
    )
}
