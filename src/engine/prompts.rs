use rand::Rng;

/// External content source for Socratic intervention prompts and revision
/// text. The builtin implementation is static; a real deployment can swap in
/// a generated-content client behind the same trait.
pub trait PromptSource: Send + Sync {
    fn socratic_prompt(&self, subject: &str, topic: Option<&str>) -> String;

    fn revision_text(&self, subject: &str, topic: &str) -> String;
}

pub struct BuiltinPromptSource;

impl BuiltinPromptSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BuiltinPromptSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptSource for BuiltinPromptSource {
    fn socratic_prompt(&self, subject: &str, topic: Option<&str>) -> String {
        let focus = topic.unwrap_or(subject);
        let prompts = [
            format!("What's the most interesting thing you've learned about {focus} so far?"),
            "Can you think of a real-world example of what you just watched?".to_string(),
            "What question would you ask if the teacher was here right now?".to_string(),
            format!("How does {focus} connect to something you already know?"),
            "If you had to explain this to a friend, what would you say?".to_string(),
        ];

        let idx = rand::rng().random_range(0..prompts.len());
        prompts[idx].clone()
    }

    fn revision_text(&self, subject: &str, topic: &str) -> String {
        match subject {
            "Math" => format!(
                "Review {topic}: practice problems step by step, understand the formulas, and work through examples."
            ),
            "Science" => format!(
                "Study {topic}: read the concepts, understand the processes, and relate them to real-world examples."
            ),
            "Social Studies" => format!(
                "Learn about {topic}: remember key facts and dates, and understand cause-and-effect relationships."
            ),
            "English" => format!(
                "Practice {topic}: read examples, understand the rules, and apply them in writing and speaking."
            ),
            _ => format!("Review the key concepts and practice problems related to {topic}."),
        }
    }
}
