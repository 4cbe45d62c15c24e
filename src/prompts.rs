//! Prompt construction for remote analysis providers.
//!
//! Every prompt pins the response to a JSON shape so the provider boundary
//! can parse with defaults. Transcripts are truncated to a character budget
//! on whole-line boundaries before they enter a prompt.

use crate::models::{SummaryLength, TemplateKind};

/// Character budget for transcript text embedded in prompts.
const PROMPT_TRANSCRIPT_BUDGET: usize = 6000;

/// Trim a transcript to the prompt budget, keeping whole lines.
pub fn combine_transcript(transcript: &str) -> String {
    // Budget is in characters so multibyte transcripts get the same
    // amount of context as ASCII ones.
    if transcript.chars().count() <= PROMPT_TRANSCRIPT_BUDGET {
        return transcript.to_string();
    }
    let mut buffer: Vec<&str> = Vec::new();
    let mut total = 0usize;
    for line in transcript.lines() {
        let line_chars = line.chars().count();
        if total + line_chars > PROMPT_TRANSCRIPT_BUDGET {
            break;
        }
        buffer.push(line);
        total += line_chars;
    }
    buffer.join("\n")
}

pub fn summary_prompt(transcript: &str, length: SummaryLength, language: &str) -> String {
    format!(
        "You are an expert video analyst generating structured insights strictly from transcript text.\n\
         Provide a {} summary in {} with concise bullet points and craft auto chapters.\n\
         Respond as JSON with keys short, medium, detailed, chapters (array of {{title,start,end,description}}).\n\
         Transcript:\n\"\"\"\n{}\n\"\"\"",
        length.as_str(),
        language,
        combine_transcript(transcript)
    )
}

pub fn mind_map_prompt(transcript: &str, language: &str) -> String {
    format!(
        "Analyse the transcript and build a hierarchical mind map in {}.\n\
         Return JSON {{ id, label, children: [{{ id, label, start, end, children }}] }} with timestamps in seconds.\n\
         Focus on actionable structure.\n\
         Transcript:\n\"\"\"\n{}\n\"\"\"",
        language,
        combine_transcript(transcript)
    )
}

pub fn keyword_prompt(transcript: &str, language: &str) -> String {
    format!(
        "Extract critical keywords from the transcript in {}. Provide JSON with keys topics \
         (array of {{term,weight,sentiment,tags}}), seoTags (array of strings), \
         overallTone ('positive'|'neutral'|'negative').\n\
         Transcript:\n\"\"\"\n{}\n\"\"\"",
        language,
        combine_transcript(transcript)
    )
}

pub fn qa_prompt(transcript: &str, language: &str, question: &str) -> String {
    format!(
        "Answer the question strictly using the transcript below in {}. \
         Provide JSON {{answer, citations:[{{text,start,end}}]}}.\n\
         Question: {}\n\
         Transcript:\n\"\"\"\n{}\n\"\"\"",
        language,
        question,
        combine_transcript(transcript)
    )
}

pub fn template_prompt(transcript: &str, language: &str, kind: TemplateKind) -> String {
    format!(
        "Generate a {} template in {} from the transcript.\n\
         Return JSON {{kind, summary, content}} where content is a structured object appropriate for {}.\n\
         Transcript:\n\"\"\"\n{}\n\"\"\"",
        kind.as_str(),
        language,
        kind.as_str(),
        combine_transcript(transcript)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_short_transcript_untouched() {
        let text = "line one\nline two";
        assert_eq!(combine_transcript(text), text);
    }

    #[test]
    fn test_combine_truncates_on_line_boundary() {
        let line = "x".repeat(1000);
        let transcript = vec![line.clone(); 10].join("\n");
        let combined = combine_transcript(&transcript);
        assert_eq!(combined.lines().count(), 6);
        for kept in combined.lines() {
            assert_eq!(kept.len(), 1000);
        }
    }

    #[test]
    fn test_combine_budget_counts_characters_not_bytes() {
        // Each line is 1000 characters (2000 bytes); six lines still fit
        // the 6000-character budget.
        let line = "é".repeat(1000);
        let transcript = vec![line.clone(); 10].join("\n");
        let combined = combine_transcript(&transcript);
        assert_eq!(combined.lines().count(), 6);
    }

    #[test]
    fn test_prompts_embed_inputs() {
        let prompt = qa_prompt("some transcript", "en", "what happened?");
        assert!(prompt.contains("what happened?"));
        assert!(prompt.contains("some transcript"));
        let prompt = summary_prompt("t", SummaryLength::Detailed, "fr");
        assert!(prompt.contains("detailed"));
        assert!(prompt.contains("fr"));
    }
}
