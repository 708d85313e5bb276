//! Operator, state, and error types for the merge engine.

use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    /// A directive key carried a tag outside the recognized operator set.
    #[error("unhandled merge operator `{0}`")]
    UnhandledOperator(char),
    /// A non-array value reached an array target under assignment.
    #[error("replacing array value with non-array value")]
    TypeReplacement,
    /// Strict checking is on and the merge would change the value's type
    /// class.
    #[error("implicit type change in {lhs} {operator} {rhs}")]
    ImplicitConversion {
        lhs: &'static str,
        operator: char,
        rhs: &'static str,
    },
}

// ── Operators ─────────────────────────────────────────────────────────────

/// The operator algebra. One tag character each; the set is closed, so
/// every recognized tag has defined behavior for both mapping and array
/// targets and an unrecognized tag fails at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=` — replace wholesale; mapping merges keep exactly the setter's keys.
    Assign,
    /// `+` — concatenate arrays; always write mapping keys.
    Concat,
    /// `-` — subtract array elements; delete mapping keys.
    Subtract,
    /// `!` — symmetric difference on arrays; first-write-wins on mapping keys.
    Difference,
    /// `&` — array intersection; guarded mapping update retaining only keys
    /// confirmed truthy on both sides.
    Intersect,
    /// `|` — array union; plain overriding writes on mappings. The default.
    Union,
    /// `^` — array xor; toggle semantics on mapping keys.
    Xor,
    /// `?` — pairwise filter keeping the incoming element where both sides
    /// are truthy; guarded mapping update.
    Filter,
    /// `*` — pairwise filter keeping the existing element where both sides
    /// are truthy; like `&` on mappings.
    Select,
}

impl Operator {
    pub fn from_tag(tag: char) -> Option<Operator> {
        match tag {
            '=' => Some(Operator::Assign),
            '+' => Some(Operator::Concat),
            '-' => Some(Operator::Subtract),
            '!' => Some(Operator::Difference),
            '&' => Some(Operator::Intersect),
            '|' => Some(Operator::Union),
            '^' => Some(Operator::Xor),
            '?' => Some(Operator::Filter),
            '*' => Some(Operator::Select),
            _ => None,
        }
    }

    pub fn tag(&self) -> char {
        match self {
            Operator::Assign => '=',
            Operator::Concat => '+',
            Operator::Subtract => '-',
            Operator::Difference => '!',
            Operator::Intersect => '&',
            Operator::Union => '|',
            Operator::Xor => '^',
            Operator::Filter => '?',
            Operator::Select => '*',
        }
    }
}

// ── State ─────────────────────────────────────────────────────────────────

/// Ambient context threaded through every recursive merge call. Copied, not
/// shared: a descent that switches operators builds a new state and the
/// caller's is never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeState {
    /// The currently active operator.
    pub operator: Operator,
    /// Fail with [`MergeError::ImplicitConversion`] when a merge would
    /// change a value's type class (null, arrays, and mappings share one
    /// class). Off by default.
    pub strict_types: bool,
}

impl Default for MergeState {
    fn default() -> Self {
        MergeState {
            operator: Operator::Union,
            strict_types: false,
        }
    }
}

impl MergeState {
    pub fn with_operator(self, operator: Operator) -> Self {
        MergeState { operator, ..self }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for tag in ['=', '+', '-', '!', '&', '|', '^', '?', '*'] {
            let op = Operator::from_tag(tag).unwrap();
            assert_eq!(op.tag(), tag);
        }
        assert_eq!(Operator::from_tag('q'), None);
    }

    #[test]
    fn default_state_is_union() {
        let state = MergeState::default();
        assert_eq!(state.operator, Operator::Union);
        assert!(!state.strict_types);
    }

    #[test]
    fn with_operator_keeps_flags() {
        let state = MergeState {
            operator: Operator::Union,
            strict_types: true,
        };
        let next = state.with_operator(Operator::Assign);
        assert_eq!(next.operator, Operator::Assign);
        assert!(next.strict_types);
    }
}
