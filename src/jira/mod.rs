mod client;
mod models;

pub use client::*;
pub use models::*;

#[cfg(test)]
pub use client::MockJira;

/// Pick the transition leading to `target`, compared case-insensitively.
///
/// When several transitions lead to the same status the first one listed wins.
pub fn find_transition<'a>(transitions: &'a [Transition], target: &str) -> Option<&'a Transition> {
    let wanted = target.to_lowercase();
    transitions
        .iter()
        .find(|t| t.target_name().to_lowercase() == wanted)
}
