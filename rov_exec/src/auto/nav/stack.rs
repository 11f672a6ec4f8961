//! # Navigation mode stack

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Stack of navigation modes, the top being the active mode.
///
/// The stack is never empty: popping the last mode leaves `Forward`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavStack(Vec<NavMode>);

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Navigation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NavMode {
    /// Driving along the navigable terrain.
    Forward,

    /// Braking to a halt, then turning in place until enough terrain is visible.
    Stop,

    /// Timed recovery turn after a stall.
    Stuck,
}

/// Actions a mode's step can request on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackAction {
    None,
    Push(NavMode),
    Pop,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavStack {
    pub fn new() -> Self {
        Self(vec![NavMode::Forward])
    }

    /// Build a stack from the given modes, bottom first. An empty list gives `[Forward]`.
    pub fn from_modes(modes: &[NavMode]) -> Self {
        if modes.is_empty() {
            Self::new()
        } else {
            Self(modes.to_vec())
        }
    }

    /// The active mode.
    pub fn top(&self) -> NavMode {
        self.0.last().copied().unwrap_or(NavMode::Forward)
    }

    pub fn push(&mut self, mode: NavMode) {
        self.0.push(mode)
    }

    /// Remove the active mode, returning it.
    pub fn pop(&mut self) -> NavMode {
        let popped = self.0.pop().unwrap_or(NavMode::Forward);
        if self.0.is_empty() {
            self.0.push(NavMode::Forward);
        }
        popped
    }

    /// Apply a step's action. Returns true if the stack changed.
    pub fn apply(&mut self, action: StackAction) -> bool {
        match action {
            StackAction::None => return false,
            StackAction::Push(m) => self.push(m),
            StackAction::Pop => {
                self.pop();
            }
        }
        true
    }

    /// Modes in the stack, bottom first.
    pub fn modes(&self) -> &[NavMode] {
        &self.0
    }
}

impl Default for NavStack {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for NavMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavMode::Forward => write!(f, "Forward"),
            NavMode::Stop => write!(f, "Stop"),
            NavMode::Stuck => write!(f, "Stuck"),
        }
    }
}

impl Display for NavStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.0.iter().map(|m| m.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_never_empty() {
        let mut stack = NavStack::new();
        assert_eq!(stack.pop(), NavMode::Forward);
        assert_eq!(stack.modes(), &[NavMode::Forward]);

        let mut stack = NavStack::from_modes(&[NavMode::Stop]);
        assert_eq!(stack.pop(), NavMode::Stop);
        assert_eq!(stack.modes(), &[NavMode::Forward]);

        assert_eq!(NavStack::from_modes(&[]).modes(), &[NavMode::Forward]);
    }

    #[test]
    fn test_push_pop_resumes() {
        let mut stack = NavStack::new();
        assert!(stack.apply(StackAction::Push(NavMode::Stop)));
        assert!(stack.apply(StackAction::Push(NavMode::Stuck)));
        assert_eq!(stack.top(), NavMode::Stuck);
        assert_eq!(stack.to_string(), "[Forward, Stop, Stuck]");

        assert!(stack.apply(StackAction::Pop));
        assert_eq!(stack.top(), NavMode::Stop);
        assert!(!stack.apply(StackAction::None));
        assert_eq!(stack.modes().len(), 2);
    }
}
