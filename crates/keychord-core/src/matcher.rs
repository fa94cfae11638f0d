//! Match state: the set of forest positions reachable from the keys typed so
//! far in the current chord.

use std::sync::Arc;

use crate::forest::{Binding, BindingForest, CommandId, KeyMap};

/// Outcome of feeding one key into the match state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The chord continues; more keys are needed.
    Pending,
    /// The chord completed on this key.
    Complete(CommandId),
}

/// A mapping reachable from the typed keys, with the keys that lead to it.
#[derive(Debug, Clone)]
struct Candidate {
    map: Arc<KeyMap>,
    path: Vec<char>,
}

impl Candidate {
    fn root(map: &Arc<KeyMap>) -> Self {
        Self {
            map: Arc::clone(map),
            path: Vec::new(),
        }
    }
}

/// Ordered list of candidate mappings.
///
/// The forest root is always the last candidate, so single-key bindings stay
/// reachable at any depth. Earlier candidates come from deeper matches and
/// shadow the root when both bind the same key.
#[derive(Debug, Clone)]
pub struct MatchState {
    root: Arc<KeyMap>,
    candidates: Vec<Candidate>,
}

impl MatchState {
    /// A fresh state positioned at the forest root.
    pub fn new(forest: &BindingForest) -> Self {
        let root = Arc::clone(forest.root());
        Self {
            candidates: vec![Candidate::root(&root)],
            root,
        }
    }

    /// Return to the root.
    pub fn reset(&mut self) {
        self.candidates.clear();
        self.candidates.push(Candidate::root(&self.root));
    }

    /// Whether `key` continues any candidate.
    pub fn is_prefix(&self, key: char) -> bool {
        self.candidates.iter().any(|c| c.map.contains(key))
    }

    /// Advance every candidate that binds `key`, dropping the rest, then
    /// re-append the root.
    ///
    /// The first command found in the advanced list wins. Candidates keep
    /// their order, so a deeper chord beats a root binding for the same key.
    ///
    /// Callers check [`is_prefix`](Self::is_prefix) first. A key that no
    /// candidate binds is not part of any chord and must not be fed here.
    pub fn advance(&mut self, key: char) -> Step {
        let mut next = Vec::with_capacity(self.candidates.len() + 1);
        for candidate in &self.candidates {
            match candidate.map.get(key) {
                Some(Binding::Command(command)) => return Step::Complete(command.clone()),
                Some(Binding::Mapping(map)) => {
                    let mut path = candidate.path.clone();
                    path.push(key);
                    next.push(Candidate {
                        map: Arc::clone(map),
                        path,
                    });
                }
                None => {}
            }
        }
        next.push(Candidate::root(&self.root));
        self.candidates = next;
        Step::Pending
    }

    /// True when only the root is a candidate.
    pub fn is_at_root(&self) -> bool {
        self.candidates.len() == 1
    }

    /// Number of candidate mappings, always at least one.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Keys leading to the deepest live candidate.
    pub fn keys(&self) -> &[char] {
        self.candidates
            .first()
            .map(|c| c.path.as_slice())
            .unwrap_or_default()
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Arc<KeyMap>> {
        self.candidates.iter().map(|c| &c.map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn overlapping() -> BindingForest {
        BindingForest::parse(
            r#"
            j = "cmd0"
            [a.b]
            c = "cmd1"
            j = "cmd2"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_new_state_is_root_only() {
        let forest = overlapping();
        let state = MatchState::new(&forest);
        assert_eq!(state.len(), 1);
        assert!(state.is_at_root());
        assert!(Arc::ptr_eq(state.candidates().next().unwrap(), forest.root()));
    }

    #[test]
    fn test_is_prefix_checks_every_candidate() {
        let mut state = MatchState::new(&overlapping());
        assert!(state.is_prefix('a'));
        assert!(state.is_prefix('j'));
        assert!(!state.is_prefix('b'));

        assert_eq!(state.advance('a'), Step::Pending);
        // 'b' comes from the `a` mapping, 'j' from the re-appended root.
        assert!(state.is_prefix('b'));
        assert!(state.is_prefix('j'));
        assert!(!state.is_prefix('c'));
    }

    #[test]
    fn test_advance_appends_root_last() {
        let forest = overlapping();
        let mut state = MatchState::new(&forest);
        state.advance('a');
        state.advance('b');
        assert_eq!(state.len(), 2);
        assert!(Arc::ptr_eq(state.candidates().last().unwrap(), forest.root()));
        assert_eq!(state.keys(), &['a', 'b']);
    }

    #[test]
    fn test_deeper_binding_shadows_root() {
        let mut state = MatchState::new(&overlapping());
        state.advance('a');
        state.advance('b');
        assert_eq!(state.advance('j'), Step::Complete(Arc::from("cmd2")));
    }

    #[test]
    fn test_root_binding_reachable_mid_chord() {
        let mut state = MatchState::new(&overlapping());
        state.advance('a');
        // 'j' is not bound under `a`, so the root binding completes.
        assert_eq!(state.advance('j'), Step::Complete(Arc::from("cmd0")));
    }

    #[test]
    fn test_keys_follow_deepest_live_branch() {
        let forest = BindingForest::parse(
            r#"
            [g]
            g = "top"
            [a]
            b = "ab"
            "#,
        )
        .unwrap();
        let mut state = MatchState::new(&forest);
        state.advance('g');
        assert_eq!(state.keys(), &['g']);

        // `a` is not bound under `g`, so the `g` branch is dropped and the
        // chord restarts from the root.
        assert_eq!(state.advance('a'), Step::Pending);
        assert_eq!(state.keys(), &['a']);
        assert_eq!(state.len(), 2);
        assert_eq!(state.advance('b'), Step::Complete(Arc::from("ab")));
    }

    #[test]
    fn test_keys_of_overlapping_branches_report_the_deeper_one() {
        let forest = BindingForest::parse(
            r#"
            [a]
            x = "ax"
            [a.a]
            y = "aay"
            "#,
        )
        .unwrap();
        let mut state = MatchState::new(&forest);
        state.advance('a');
        state.advance('a');
        // Candidates are `a a`, then `a` re-entered from the root, then root.
        assert_eq!(state.len(), 3);
        assert_eq!(state.keys(), &['a', 'a']);
        assert_eq!(state.advance('x'), Step::Complete(Arc::from("ax")));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut state = MatchState::new(&overlapping());
        state.advance('a');
        state.reset();
        let once = (state.len(), state.keys().to_vec());
        state.reset();
        assert_eq!((state.len(), state.keys().to_vec()), once);
        assert!(state.is_at_root());
    }

    #[test]
    fn test_empty_forest_never_matches() {
        let state = MatchState::new(&BindingForest::empty());
        assert!(!state.is_prefix('a'));
        assert_eq!(state.len(), 1);
    }
}
