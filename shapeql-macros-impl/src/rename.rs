/// Container-level `rename_all` rules.
///
/// Field names are matched case-insensitively, so only rules that change
/// word boundaries are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    /// camelCase
    CamelCase,
    /// PascalCase
    PascalCase,
    /// snake_case
    SnakeCase,
}

impl RenameRule {
    /// Parse a rename rule from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "camelCase" => Some(RenameRule::CamelCase),
            "PascalCase" => Some(RenameRule::PascalCase),
            "snake_case" => Some(RenameRule::SnakeCase),
            _ => None,
        }
    }

    /// Apply this rename rule to an identifier
    pub fn apply(&self, name: &str) -> String {
        let words = split_into_words(name);

        match self {
            RenameRule::CamelCase => {
                let mut result = String::new();
                for (i, word) in words.iter().enumerate() {
                    if i == 0 {
                        result.push_str(&word.to_lowercase());
                    } else {
                        result.push_str(&capitalize(word));
                    }
                }
                result
            }
            RenameRule::PascalCase => words.iter().map(|w| capitalize(w)).collect(),
            RenameRule::SnakeCase => words
                .iter()
                .map(|w| w.to_lowercase())
                .collect::<Vec<_>>()
                .join("_"),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            first.to_ascii_uppercase().to_string() + &chars.as_str().to_lowercase()
        }
        None => String::new(),
    }
}

/// Splits `snake_case` and `camelCase` identifiers into words.
fn split_into_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for c in name.chars() {
        if c == '_' || c == '-' {
            if !current.is_empty() {
                words.push(core::mem::take(&mut current));
            }
        } else if c.is_uppercase() && !current.is_empty() {
            words.push(core::mem::take(&mut current));
            current.push(c);
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
