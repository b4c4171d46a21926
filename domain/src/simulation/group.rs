use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Control,
    Treatment,
}

impl Group {
    /// Alternates by signup order: given how many participants enrolled
    /// before, every second newcomer lands in the treatment group.
    #[must_use]
    pub fn for_signup(existing_participants: u64) -> Self {
        if (existing_participants + 1) % 2 == 0 {
            Group::Treatment
        } else {
            Group::Control
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Group::Control => "control",
            Group::Treatment => "treatment",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "control" => Some(Group::Control),
            "treatment" => Some(Group::Treatment),
            _ => None,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signups_alternate_starting_with_control() {
        let groups: Vec<Group> = (0..4).map(Group::for_signup).collect();
        assert_eq!(
            groups,
            vec![Group::Control, Group::Treatment, Group::Control, Group::Treatment]
        );
    }

    #[test]
    fn parse_round_trips_names() {
        assert_eq!(Group::parse(Group::Treatment.as_str()), Some(Group::Treatment));
        assert_eq!(Group::parse("placebo"), None);
    }
}
