use std::collections::HashMap;
use std::path::PathBuf;

use crate::store::profile::{Difficulty, Question};

/// Supplies ready-made questions keyed by subject, topic, and tier. The
/// engine only selects and scores; it never authors questions. May return
/// fewer questions than asked for.
pub trait QuestionBank: Send + Sync {
    fn topics(&self, subject: &str) -> Vec<String>;

    fn fetch_questions(
        &self,
        subject: &str,
        topic_order: &[String],
        difficulty: Difficulty,
        count: usize,
    ) -> Vec<Question>;
}

/// In-memory bank seeded with a builtin question set. A `questions.json`
/// file in the data directory replaces the builtin set when present.
pub struct BuiltinQuestionBank {
    questions: Vec<Question>,
}

impl BuiltinQuestionBank {
    pub fn new() -> Self {
        Self { questions: seed() }
    }

    pub fn with_override_file(path: PathBuf) -> Self {
        match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Vec<Question>>(&bytes) {
                Ok(questions) if !questions.is_empty() => {
                    tracing::info!(count = questions.len(), path = %path.display(), "loaded question bank override");
                    return Self { questions };
                }
                Ok(_) => {
                    tracing::warn!(path = %path.display(), "question bank override is empty, using builtin set");
                }
                Err(err) => {
                    tracing::warn!(error = %err, path = %path.display(), "unreadable question bank override, using builtin set");
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(error = %err, path = %path.display(), "cannot read question bank override, using builtin set");
            }
        }
        Self::new()
    }
}

impl Default for BuiltinQuestionBank {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionBank for BuiltinQuestionBank {
    fn topics(&self, subject: &str) -> Vec<String> {
        let mut topics = Vec::new();
        for q in self.questions.iter().filter(|q| q.subject == subject) {
            if !topics.contains(&q.topic) {
                topics.push(q.topic.clone());
            }
        }
        topics
    }

    /// Picks distinct questions round-robin across `topic_order`, so the
    /// preferred (weak) topics lead and topic coverage stays balanced, then
    /// tops up from anything else the subject/tier has.
    fn fetch_questions(
        &self,
        subject: &str,
        topic_order: &[String],
        difficulty: Difficulty,
        count: usize,
    ) -> Vec<Question> {
        let mut by_topic: HashMap<&str, Vec<&Question>> = HashMap::new();
        for q in self
            .questions
            .iter()
            .filter(|q| q.subject == subject && q.difficulty == difficulty)
        {
            by_topic.entry(q.topic.as_str()).or_default().push(q);
        }

        let mut order: Vec<&str> = topic_order
            .iter()
            .map(String::as_str)
            .filter(|t| by_topic.contains_key(t))
            .collect();
        for topic in by_topic.keys() {
            if !order.contains(topic) {
                order.push(*topic);
            }
        }

        let mut selected: Vec<Question> = Vec::with_capacity(count);
        let mut cursors: HashMap<&str, usize> = HashMap::new();

        'outer: loop {
            let mut advanced = false;
            for topic in &order {
                let pool = &by_topic[*topic];
                let cursor = cursors.entry(*topic).or_insert(0);
                if *cursor < pool.len() {
                    selected.push(pool[*cursor].clone());
                    *cursor += 1;
                    advanced = true;
                    if selected.len() == count {
                        break 'outer;
                    }
                }
            }
            if !advanced {
                break;
            }
        }

        selected
    }
}

fn q(
    id: &str,
    subject: &str,
    topic: &str,
    difficulty: Difficulty,
    prompt: &str,
    options: &[&str],
    correct: usize,
    explanation: &str,
) -> Question {
    Question {
        id: id.to_string(),
        subject: subject.to_string(),
        topic: topic.to_string(),
        difficulty,
        prompt: prompt.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_option: correct,
        explanation: explanation.to_string(),
    }
}

fn seed() -> Vec<Question> {
    use Difficulty::{Easy, Hard, Medium};

    vec![
        q("math_e_1", "Math", "Addition", Easy, "What is 15 + 27?", &["42", "41", "43", "40"], 0,
          "Add the ones place: 5 + 7 = 12, write 2 carry 1. Add tens: 1 + 2 + 1 = 4."),
        q("math_e_2", "Math", "Subtraction", Easy, "If a pizza has 8 slices and you eat 3, how many are left?", &["4", "5", "6", "7"], 1,
          "8 - 3 = 5 slices remaining."),
        q("math_e_3", "Math", "Geometry", Easy, "How many sides does a triangle have?", &["2", "3", "4", "5"], 1,
          "'Tri' means three, so a triangle has 3 sides."),
        q("math_e_4", "Math", "Addition", Easy, "What is 9 + 6?", &["14", "15", "16", "13"], 1,
          "9 + 6 = 15."),
        q("math_e_5", "Math", "Subtraction", Easy, "What is 20 - 7?", &["12", "14", "13", "11"], 2,
          "20 - 7 = 13."),
        q("math_e_6", "Math", "Geometry", Easy, "How many corners does a square have?", &["3", "4", "5", "6"], 1,
          "A square has 4 corners and 4 equal sides."),
        q("math_m_1", "Math", "Multiplication", Medium, "What is 7 × 6?", &["42", "36", "48", "35"], 0,
          "Think of 7 groups of 6, or 6 groups of 7."),
        q("math_m_2", "Math", "Fractions", Medium, "Which fraction is larger: 1/2 or 1/4?", &["1/2", "1/4", "They are equal", "Cannot determine"], 0,
          "Half of something is bigger than a quarter of the same thing."),
        q("math_m_3", "Math", "Division", Medium, "What is 144 ÷ 12?", &["12", "11", "13", "10"], 0,
          "Check it backwards: 12 × 12 = 144."),
        q("math_m_4", "Math", "Fractions", Medium, "Convert 0.75 to a fraction:", &["3/4", "7/10", "75/100", "3/5"], 0,
          "0.75 = 75/100 = 3/4 after dividing both by 25."),
        q("math_m_5", "Math", "Percentages", Medium, "What is 25% of 80?", &["20", "15", "25", "30"], 0,
          "25% is one quarter, and 80 ÷ 4 = 20."),
        q("math_h_1", "Math", "Algebra", Hard, "Solve: 2x + 5 = 13", &["x = 4", "x = 3", "x = 5", "x = 6"], 0,
          "2x = 13 - 5 = 8, so x = 4."),
        q("math_h_2", "Math", "Triangles", Hard, "In a right triangle, if one angle is 90° and another is 30°, what is the third angle?", &["60°", "70°", "50°", "45°"], 0,
          "Angles in a triangle sum to 180°: 180 - 90 - 30 = 60."),
        q("math_h_3", "Math", "Square Roots", Hard, "What is the square root of 144?", &["12", "11", "13", "14"], 0,
          "12 × 12 = 144."),
        q("sci_e_1", "Science", "Plant Life", Easy, "What do plants need to make food?", &["Sunlight only", "Water only", "Sunlight, water, and air", "Soil only"], 2,
          "Photosynthesis needs sunlight, water, and carbon dioxide from air."),
        q("sci_e_2", "Science", "Human Body", Easy, "What gas do we breathe in that our body needs?", &["Carbon dioxide", "Oxygen", "Nitrogen", "Helium"], 1,
          "Our cells need oxygen for respiration."),
        q("sci_e_3", "Science", "Chemistry", Easy, "What is the chemical symbol for water?", &["H2O", "CO2", "NaCl", "O2"], 0,
          "Two hydrogen atoms and one oxygen atom."),
        q("sci_e_4", "Science", "Plant Life", Easy, "Which part of the plant makes seeds?", &["Root", "Stem", "Flower", "Leaf"], 2,
          "Flowers are the reproductive part of a plant."),
        q("sci_m_1", "Science", "Solar System", Medium, "Which planet is closest to the Sun?", &["Venus", "Mercury", "Earth", "Mars"], 1,
          "Mercury is the innermost planet of our solar system."),
        q("sci_m_2", "Science", "Water Cycle", Medium, "What is the process by which water changes from liquid to gas?", &["Condensation", "Evaporation", "Precipitation", "Freezing"], 1,
          "Heat turns liquid water into vapour: evaporation."),
        q("sci_m_3", "Science", "Cell Biology", Medium, "What is the basic unit of life?", &["Tissue", "Cell", "Organ", "Organism"], 1,
          "All living things are made of cells."),
        q("sci_h_1", "Science", "Sound", Hard, "What happens to the speed of sound in warmer air?", &["It decreases", "It increases", "It stays the same", "It stops"], 1,
          "Molecules move faster in warm air, carrying sound quicker."),
        q("sci_h_2", "Science", "Forces and Motion", Hard, "What force keeps planets in orbit around the Sun?", &["Magnetic force", "Gravity", "Electric force", "Nuclear force"], 1,
          "Gravity holds the planets on their orbits."),
        q("soc_e_1", "Social Studies", "Freedom Struggle", Easy, "In which year did India gain independence?", &["1946", "1947", "1948", "1949"], 1,
          "India became independent on August 15, 1947."),
        q("soc_e_2", "Social Studies", "Indian States", Easy, "What is the capital of Karnataka?", &["Mumbai", "Chennai", "Bengaluru", "Hyderabad"], 2,
          "Bengaluru is the capital city of Karnataka."),
        q("soc_m_1", "Social Studies", "Indian History", Medium, "Who was the first President of India?", &["Mahatma Gandhi", "Dr. Rajendra Prasad", "Jawaharlal Nehru", "Dr. APJ Abdul Kalam"], 1,
          "Dr. Rajendra Prasad served from 1950 to 1962."),
        q("soc_m_2", "Social Studies", "Geography", Medium, "Which river is known as the 'Ganga of the South'?", &["Krishna", "Godavari", "Cauvery", "Narmada"], 1,
          "The Godavari carries that name for its importance."),
        q("eng_e_1", "English", "Grammar", Easy, "What is the plural of 'child'?", &["childs", "children", "childes", "child"], 1,
          "'Children' is an irregular plural form."),
        q("eng_e_2", "English", "Phonics", Easy, "Which word rhymes with 'cat'?", &["dog", "bat", "bird", "fish"], 1,
          "'Bat' ends with the same '-at' sound."),
        q("eng_m_1", "English", "Parts of Speech", Medium, "Which is a verb in this sentence: 'The dog runs fast'?", &["dog", "runs", "fast", "the"], 1,
          "'Runs' is the action the dog performs."),
        q("eng_m_2", "English", "Adverbs", Medium, "What type of word is 'quickly'?", &["noun", "verb", "adjective", "adverb"], 3,
          "It describes how an action is performed."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin_prefers_leading_topics() {
        let bank = BuiltinQuestionBank::new();
        let order = vec!["Subtraction".to_string(), "Addition".to_string()];
        let picked = bank.fetch_questions("Math", &order, Difficulty::Easy, 3);

        assert_eq!(picked.len(), 3);
        assert_eq!(picked[0].topic, "Subtraction");
        assert_eq!(picked[1].topic, "Addition");
        // distinct ids
        let mut ids: Vec<_> = picked.iter().map(|q| q.id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_shortfall_returns_what_exists() {
        let bank = BuiltinQuestionBank::new();
        let picked = bank.fetch_questions("Math", &[], Difficulty::Hard, 50);
        assert!(picked.len() < 50);
        assert!(!picked.is_empty());
        assert!(picked.iter().all(|q| q.difficulty == Difficulty::Hard));
    }

    #[test]
    fn test_unknown_subject_is_empty() {
        let bank = BuiltinQuestionBank::new();
        assert!(bank.fetch_questions("History", &[], Difficulty::Easy, 5).is_empty());
        assert!(bank.topics("History").is_empty());
    }
}
