//! Static question banks for the MCQ rounds.
//!
//! Each bank holds more questions than a round presents; the sampler draws
//! 5 distinct questions per round entry. Every question carries exactly one
//! correct option id.

/// One selectable option of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Option identifier ("a".."d")
    pub id: String,
    /// Option text shown to the candidate
    pub text: String,
}

/// An immutable multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Stable question identifier within its bank
    pub id: String,
    /// Question prompt
    pub prompt: String,
    /// Ordered list of options
    pub options: Vec<Choice>,
    /// Identifier of the single correct option
    pub correct_option_id: String,
}

impl Question {
    /// Check whether the given option id is the correct one.
    #[inline]
    pub fn is_correct(&self, option_id: &str) -> bool {
        self.correct_option_id == option_id
    }
}

fn q(id: &str, prompt: &str, options: [&str; 4], correct: &str) -> Question {
    let ids = ["a", "b", "c", "d"];
    Question {
        id: id.to_string(),
        prompt: prompt.to_string(),
        options: ids
            .iter()
            .zip(options.iter())
            .map(|(id, text)| Choice {
                id: (*id).to_string(),
                text: (*text).to_string(),
            })
            .collect(),
        correct_option_id: correct.to_string(),
    }
}

/// The aptitude round question bank (logical reasoning and arithmetic).
pub fn aptitude_bank() -> Vec<Question> {
    vec![
        q(
            "apt-1",
            "A train running at 60 km/hr crosses a pole in 9 seconds. What is the length of the train?",
            ["120 meters", "150 meters", "180 meters", "200 meters"],
            "b",
        ),
        q(
            "apt-2",
            "If the ratio of the ages of two persons is 4:7 and the sum of their ages is 44 years, what is the age of the younger person?",
            ["14 years", "16 years", "18 years", "20 years"],
            "b",
        ),
        q(
            "apt-3",
            "What is the next number in the series: 2, 6, 12, 20, 30, ?",
            ["40", "42", "44", "46"],
            "b",
        ),
        q(
            "apt-4",
            "A man bought an article for $800 and sold it for $1000. What is his profit percentage?",
            ["20%", "25%", "30%", "15%"],
            "b",
        ),
        q(
            "apt-5",
            "If A can complete a task in 12 days and B can complete it in 15 days, how many days will they take to complete it together?",
            ["6.67 days", "7 days", "8 days", "9 days"],
            "a",
        ),
        q(
            "apt-6",
            "A clock shows 3:15. What is the angle between the hour hand and the minute hand?",
            ["0 degrees", "7.5 degrees", "15 degrees", "30 degrees"],
            "b",
        ),
        q(
            "apt-7",
            "If 12 workers can build a wall in 8 days, how many days will 16 workers take to build the same wall?",
            ["5 days", "6 days", "7 days", "8 days"],
            "b",
        ),
        q(
            "apt-8",
            "What is the simple interest on $5000 at 8% per annum for 3 years?",
            ["$1000", "$1100", "$1200", "$1400"],
            "c",
        ),
    ]
}

/// The DSA round question bank (data structures and algorithms concepts).
pub fn dsa_bank() -> Vec<Question> {
    vec![
        q(
            "dsa-1",
            "What is the time complexity of searching an element in a balanced Binary Search Tree?",
            ["O(1)", "O(n)", "O(log n)", "O(n log n)"],
            "c",
        ),
        q(
            "dsa-2",
            "Which data structure uses LIFO (Last In First Out) principle?",
            ["Queue", "Stack", "Array", "Linked List"],
            "b",
        ),
        q(
            "dsa-3",
            "What is the worst-case time complexity of QuickSort?",
            ["O(n)", "O(n log n)", "O(n\u{b2})", "O(log n)"],
            "c",
        ),
        q(
            "dsa-4",
            "Which traversal of a Binary Search Tree gives elements in sorted order?",
            ["Preorder", "Postorder", "Inorder", "Level order"],
            "c",
        ),
        q(
            "dsa-5",
            "What is the space complexity of Merge Sort?",
            ["O(1)", "O(log n)", "O(n)", "O(n\u{b2})"],
            "c",
        ),
        q(
            "dsa-6",
            "Which data structure is used to implement breadth-first search of a graph?",
            ["Stack", "Queue", "Heap", "Hash table"],
            "b",
        ),
        q(
            "dsa-7",
            "What is the average-case time complexity of a lookup in a hash table?",
            ["O(1)", "O(log n)", "O(n)", "O(n log n)"],
            "a",
        ),
        q(
            "dsa-8",
            "What is the minimum number of edges in a connected graph with n vertices?",
            ["n", "n - 1", "n + 1", "n / 2"],
            "b",
        ),
    ]
}
