//! Prompt assembly for grounded generation
//!
//! Evidence is enumerated in rank order, each passage prefixed with its
//! 0-based rank index. The generator is sensitive to evidence order and
//! enumeration, so this layout is part of the generation contract.

/// Build the generation prompt from a metaprompt, enumerated evidence,
/// and the query. Tolerates an empty evidence set.
pub fn build_prompt(metaprompt: &str, query: &str, evidence: &[String]) -> String {
    let evidence_len: usize = evidence.iter().map(|e| e.len() + 8).sum();
    let mut prompt = String::with_capacity(metaprompt.len() + evidence_len + query.len() + 16);

    prompt.push_str(metaprompt);
    for (rank, passage) in evidence.iter().enumerate() {
        prompt.push_str(&format!("[{}] {}\n", rank, passage));
    }
    prompt.push_str(query);
    prompt.push_str("\nAnswer:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_enumerates_evidence_in_order() {
        let evidence = vec!["first passage".to_string(), "second passage".to_string()];
        let prompt = build_prompt("Use the passages.\n", "What is it?", &evidence);

        assert!(prompt.starts_with("Use the passages.\n"));
        assert!(prompt.contains("[0] first passage\n"));
        assert!(prompt.contains("[1] second passage\n"));
        assert!(prompt.ends_with("What is it?\nAnswer:"));

        let pos0 = prompt.find("[0]").unwrap();
        let pos1 = prompt.find("[1]").unwrap();
        assert!(pos0 < pos1);
    }

    #[test]
    fn test_prompt_with_empty_evidence() {
        let prompt = build_prompt("", "What is it?", &[]);
        assert_eq!(prompt, "What is it?\nAnswer:");
    }

    #[test]
    fn test_prompt_rank_indices_are_zero_based() {
        let evidence = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let prompt = build_prompt("", "q", &evidence);
        assert!(prompt.contains("[0] a"));
        assert!(prompt.contains("[2] c"));
        assert!(!prompt.contains("[3]"));
    }
}
