/// Coarse player identity used when no authoritative id is available on both sides.
///
/// Built from a display name as (first initial, full last name), both lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameKey {
    pub first_initial: Option<char>,
    pub last_name: Option<String>,
}

impl NameKey {
    pub fn from_display_name(name: &str) -> Self {
        // Punctuation becomes a separator so "T.J." splits into "T J".
        let cleaned: String = name
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphabetic() || ch.is_whitespace() {
                    ch
                } else {
                    ' '
                }
            })
            .collect();
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();
        let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
            return Self::default();
        };
        Self {
            first_initial: first.chars().next().map(|c| c.to_ascii_lowercase()),
            last_name: Some(last.to_ascii_lowercase()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_initial.is_none() && self.last_name.is_none()
    }

    /// Last names equal, and initials agree whenever both are known.
    pub fn matches(&self, other: &NameKey) -> bool {
        let (Some(mine), Some(theirs)) = (self.last_name.as_ref(), other.last_name.as_ref()) else {
            return false;
        };
        if mine != theirs {
            return false;
        }
        match (self.first_initial, other.first_initial) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

/// Trimmed, non-empty player id or nothing.
pub fn normalize_player_id(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}
