//! LLM prompts for example generation, grading and the QA strategies.
//!
//! Templates use `{placeholder}` markers filled by [`Prompts::fill`].

/// Collection of prompts used by the benchmark.
pub struct Prompts;

impl Prompts {
    /// Substitute `{name}` markers from `values` in one pass.
    ///
    /// Substituted text is never rescanned, so a query or document that
    /// itself contains `{question}` is kept verbatim. Unknown markers and
    /// stray braces are left as they are.
    pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            let hit = after.find('}').and_then(|close| {
                let name = &after[..close];
                values
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| (*value, close))
            });

            match hit {
                Some((value, close)) => {
                    out.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        out
    }

    /// Prompt to turn one corpus document into a quiz question and answer.
    pub fn generate_example() -> &'static str {
        r#"You are a teacher coming up with questions to ask on a quiz.
Given the following document, please generate a question and answer based on the document.

These questions should be detailed and be based explicitly on information in the document.

<Begin Document>
{document}
<End Document>

Respond in JSON format:
{
    "query": "<question here>",
    "answer": "<answer here>"
}

Respond with only the JSON, no other text."#
    }

    /// Prompt to grade a predicted answer against a reference answer.
    pub fn grade_answer() -> &'static str {
        r#"You are a teacher grading a quiz.
You are given a question, the student's answer, and the true answer, and are asked to score the student answer as either CORRECT or INCORRECT.

Example Format:
QUESTION: question here
STUDENT ANSWER: student's answer here
TRUE ANSWER: true answer here
GRADE: CORRECT or INCORRECT here

Grade the student answers based ONLY on their factual accuracy. Ignore differences in punctuation and phrasing between the student answer and true answer. It is OK if the student answer contains more information than the true answer, as long as it does not contain any conflicting statements. Begin!

QUESTION: {query}
STUDENT ANSWER: {predicted}
TRUE ANSWER: {reference}
GRADE:"#
    }

    /// Single-call prompt with every retrieved document in the context.
    pub fn stuff() -> &'static str {
        r#"Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.

{context}

Question: {question}
Helpful Answer:"#
    }

    /// Per-document extraction step of map_reduce.
    pub fn map_extract() -> &'static str {
        r#"Use the following portion of a long document to see if any of the text is relevant to answer the question.
Return any relevant text verbatim.
{context}
Question: {question}
Relevant text, if any:"#
    }

    /// Combine step of map_reduce.
    pub fn reduce_combine() -> &'static str {
        r#"Given the following extracted parts of a long document and a question, create a final answer.
If you don't know the answer, just say that you don't know. Don't try to make up an answer.

QUESTION: {question}
=========
{summaries}
=========
FINAL ANSWER:"#
    }

    /// First step of refine, answered from the first document only.
    pub fn refine_initial() -> &'static str {
        r#"Context information is below.
------------
{context}
------------
Given the context information and not prior knowledge, answer the question: {question}
"#
    }

    /// Subsequent refine steps.
    pub fn refine_step() -> &'static str {
        r#"The original question is as follows: {question}
We have provided an existing answer: {existing_answer}
We have the opportunity to refine the existing answer (only if needed) with some more context below.
------------
{context}
------------
Given the new context, refine the original answer to better answer the question. If the context isn't useful, return the original answer."#
    }

    /// Per-document answer with a self-reported score, for map_rerank.
    pub fn map_rerank() -> &'static str {
        r#"Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.

In addition to giving an answer, also return a score of how fully it answered the user's question. This should be in the following format:

Question: [question here]
Helpful Answer: [answer here]
Score: [score between 0 and 100]

How to determine the score:
- Higher is a better answer
- Better responds fully to the asked question, with sufficient level of detail
- If you do not know the answer based on the context, that should be a score of 0
- Don't be overconfident!

Begin!

Context:
---------
{context}
---------
Question: {question}
Helpful Answer:"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_carry_placeholders() {
        assert!(Prompts::generate_example().contains("{document}"));
        let grade = Prompts::grade_answer();
        assert!(grade.contains("{query}"));
        assert!(grade.contains("{predicted}"));
        assert!(grade.contains("{reference}"));
        for p in [
            Prompts::stuff(),
            Prompts::map_extract(),
            Prompts::refine_initial(),
            Prompts::refine_step(),
            Prompts::map_rerank(),
        ] {
            assert!(p.contains("{context}"));
            assert!(p.contains("{question}"));
        }
        assert!(Prompts::reduce_combine().contains("{summaries}"));
        assert!(Prompts::refine_step().contains("{existing_answer}"));
    }

    #[test]
    fn test_fill_does_not_rescan_substituted_text() {
        let filled = Prompts::fill(
            "Q: {query}\nA: {predicted}",
            &[("query", "What does {predicted} mean?"), ("predicted", "PRED")],
        );
        assert_eq!(filled, "Q: What does {predicted} mean?\nA: PRED");
    }

    #[test]
    fn test_fill_keeps_json_braces_and_unknown_markers() {
        let filled = Prompts::fill(
            Prompts::generate_example(),
            &[("document", "row with {question} inside")],
        );
        assert!(filled.contains("row with {question} inside"));
        assert!(filled.contains("\"query\": \"<question here>\""));
        assert!(filled.contains("{\n"));
        assert_eq!(Prompts::fill("{x} {", &[]), "{x} {");
    }
}
