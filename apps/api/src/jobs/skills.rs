//! Keyword skill extraction for job descriptions that don't list skills.

/// Keywords recognised in free-text job descriptions.
pub const SKILL_KEYWORDS: &[&str] = &[
    "React", "Node.js", "Node", "JavaScript", "TypeScript", "Python", "Java", "C++", "SQL",
    "MongoDB", "AWS", "Azure", "Docker", "Kubernetes", "HTML", "CSS", "Tailwind", "Next.js",
    "Express", "Angular", "Vue", "PHP", "Ruby", "Go", "Swift", "Kotlin", "Flutter", "Redux",
    "GraphQL", "REST", "DevOps", "CI/CD",
];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Case-insensitive whole-word match. A boundary is only required on an edge
/// of `keyword` that is itself a word character, so "C++" matches "c++,".
fn contains_word(text: &str, keyword: &str) -> bool {
    let needs_left = keyword.chars().next().is_some_and(is_word_char);
    let needs_right = keyword.chars().next_back().is_some_and(is_word_char);

    text.match_indices(keyword).any(|(start, matched)| {
        let end = start + matched.len();
        let left_ok = !needs_left || !text[..start].chars().next_back().is_some_and(is_word_char);
        let right_ok = !needs_right || !text[end..].chars().next().is_some_and(is_word_char);
        left_ok && right_ok
    })
}

/// Returns the normalized (lower-cased) keywords found in `description`,
/// in keyword-list order.
pub fn extract_skills(description: &str) -> Vec<String> {
    let text = description.to_lowercase();
    SKILL_KEYWORDS
        .iter()
        .map(|keyword| keyword.to_lowercase())
        .filter(|keyword| contains_word(&text, keyword))
        .collect()
}
