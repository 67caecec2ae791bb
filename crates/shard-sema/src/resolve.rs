//! Overload resolution.
//!
//! One algorithm serves ordinary method calls, free calls on the enclosing
//! class, and every operator application (binary and unary): an overload
//! set plus the *static* types of the supplied arguments yields exactly one
//! declaration or a failure. Resolution never looks at runtime values and
//! is computed once per call-site node.
//!
//! ## Algorithm
//!
//! 1. Filter to applicable candidates: same arity, every argument
//!    assignable to the matching parameter.
//! 2. Zero applicable → no-applicable-overload failure.
//! 3. One applicable → select it.
//! 4. Several → an exact parameter-type match wins outright; otherwise the
//!    unique most-specific candidate wins, and a tie is an ambiguity
//!    failure. A is more specific than B when every A-parameter is
//!    assignable to the B-parameter and at least one position is strictly
//!    narrower.

use crate::ty::Type;

/// Anything with an ordered parameter-type tuple can be resolved against:
/// method signatures and operator signatures share this one algorithm.
pub trait Candidate {
    fn param_types(&self) -> &[Type];
}

/// Why resolution failed. The caller owns turning this into a diagnostic
/// with the call-site span, attempted name, and argument types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No candidate accepts the argument types (or the set was empty).
    NoApplicable,
    /// More than one applicable candidate and no unique most-specific one.
    /// Carries the indices of the applicable candidates for diagnostics.
    Ambiguous { applicable: Vec<usize> },
}

/// Select exactly one candidate from `candidates` for the given static
/// argument types, or fail.
///
/// Deterministic: the outcome depends only on the candidate set and the
/// argument types, never on iteration order or runtime state.
pub fn resolve_overload<'a, C: Candidate>(
    candidates: &'a [C],
    args: &[Type],
) -> Result<&'a C, ResolveError> {
    let applicable: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| is_applicable(c.param_types(), args))
        .map(|(i, _)| i)
        .collect();

    match applicable.as_slice() {
        [] => Err(ResolveError::NoApplicable),
        [only] => Ok(&candidates[*only]),
        _ => {
            // Exact-match priority: pairwise-identical parameter types win
            // over any other applicable candidate. The declaration table
            // rejects duplicate tuples, so at most one exact match exists.
            if let Some(&exact) = applicable
                .iter()
                .find(|&&i| candidates[i].param_types() == args)
            {
                return Ok(&candidates[exact]);
            }

            let best: Vec<usize> = applicable
                .iter()
                .copied()
                .filter(|&i| {
                    applicable.iter().all(|&j| {
                        j == i
                            || more_specific(
                                candidates[i].param_types(),
                                candidates[j].param_types(),
                            )
                    })
                })
                .collect();

            match best.as_slice() {
                [winner] => Ok(&candidates[*winner]),
                _ => Err(ResolveError::Ambiguous { applicable }),
            }
        }
    }
}

/// Arity matches and every argument is assignable to its parameter.
fn is_applicable(params: &[Type], args: &[Type]) -> bool {
    params.len() == args.len()
        && args
            .iter()
            .zip(params.iter())
            .all(|(arg, param)| arg.is_assignable_to(param))
}

/// `a` is more specific than `b`: every a-parameter assignable to the
/// b-parameter, strictly narrower in at least one position.
fn more_specific(a: &[Type], b: &[Type]) -> bool {
    let all_assignable = a
        .iter()
        .zip(b.iter())
        .all(|(pa, pb)| pa.is_assignable_to(pb));
    let strictly_somewhere = a
        .iter()
        .zip(b.iter())
        .any(|(pa, pb)| !pb.is_assignable_to(pa));
    all_assignable && strictly_somewhere
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A bare parameter tuple is enough to exercise the algorithm.
    #[derive(Debug, Clone, PartialEq)]
    struct Sig(Vec<Type>);

    impl Candidate for Sig {
        fn param_types(&self) -> &[Type] {
            &self.0
        }
    }

    fn class(name: &str) -> Type {
        Type::Class(name.to_string())
    }

    fn int_array() -> Type {
        Type::Array(Box::new(Type::Int))
    }

    #[test]
    fn empty_set_is_no_applicable() {
        let set: Vec<Sig> = vec![];
        assert_eq!(
            resolve_overload(&set, &[Type::Int]).unwrap_err(),
            ResolveError::NoApplicable
        );
    }

    #[test]
    fn single_exact_candidate() {
        let set = vec![Sig(vec![Type::Int])];
        let chosen = resolve_overload(&set, &[Type::Int]).unwrap();
        assert_eq!(chosen, &set[0]);
    }

    #[test]
    fn arity_mismatch_is_no_applicable() {
        let set = vec![Sig(vec![Type::Int, Type::Int])];
        assert_eq!(
            resolve_overload(&set, &[Type::Int]).unwrap_err(),
            ResolveError::NoApplicable
        );
    }

    #[test]
    fn wrong_type_is_no_applicable() {
        let set = vec![Sig(vec![Type::Int])];
        assert_eq!(
            resolve_overload(&set, &[Type::Bool]).unwrap_err(),
            ResolveError::NoApplicable
        );
    }

    #[test]
    fn dispatch_picks_matching_tuple() {
        // Method(int) / Method(int[]) / Method(M) — the overload sample.
        let set = vec![
            Sig(vec![Type::Int]),
            Sig(vec![int_array()]),
            Sig(vec![class("FunctionOverload.M")]),
        ];
        assert_eq!(resolve_overload(&set, &[Type::Int]).unwrap(), &set[0]);
        assert_eq!(resolve_overload(&set, &[int_array()]).unwrap(), &set[1]);
        assert_eq!(
            resolve_overload(&set, &[class("FunctionOverload.M")]).unwrap(),
            &set[2]
        );
    }

    #[test]
    fn exact_match_priority() {
        // With identity-only assignability an exact match is the unique
        // winner whenever it exists; make sure it beats a Null-compatible
        // alternative set too.
        let set = vec![Sig(vec![class("A.Foo")]), Sig(vec![class("A.Bar")])];
        assert_eq!(resolve_overload(&set, &[class("A.Foo")]).unwrap(), &set[0]);
        assert_eq!(resolve_overload(&set, &[class("A.Bar")]).unwrap(), &set[1]);
    }

    #[test]
    fn commuted_tuples_are_unrelated_overloads() {
        // operator+(Foo, int) without operator+(int, Foo): `x + 1` resolves,
        // `1 + x` must fail — no symmetry is inferred.
        let set = vec![Sig(vec![class("A.Foo"), Type::Int])];
        assert!(resolve_overload(&set, &[class("A.Foo"), Type::Int]).is_ok());
        assert_eq!(
            resolve_overload(&set, &[Type::Int, class("A.Foo")]).unwrap_err(),
            ResolveError::NoApplicable
        );
    }

    #[test]
    fn null_argument_matches_reference_parameter() {
        let set = vec![Sig(vec![class("A.Foo")])];
        assert!(resolve_overload(&set, &[Type::Null]).is_ok());
    }

    #[test]
    fn null_argument_against_two_reference_overloads_is_ambiguous() {
        // Neither Foo nor int[] is more specific for a null argument.
        let set = vec![Sig(vec![class("A.Foo")]), Sig(vec![int_array()])];
        let err = resolve_overload(&set, &[Type::Null]).unwrap_err();
        assert_eq!(
            err,
            ResolveError::Ambiguous {
                applicable: vec![0, 1]
            }
        );
    }

    #[test]
    fn null_prefers_exact_null_parameter_if_declared() {
        // A hypothetical Null-typed parameter is strictly more specific
        // than any reference type for a null argument.
        let set = vec![Sig(vec![class("A.Foo")]), Sig(vec![Type::Null])];
        assert_eq!(resolve_overload(&set, &[Type::Null]).unwrap(), &set[1]);
    }

    #[test]
    fn most_specific_wins_without_exact_match() {
        // (Null, Foo) vs (Null assignable to both) — first param Null in
        // candidate 1 is narrower than Foo in candidate 0.
        let set = vec![
            Sig(vec![class("A.Foo"), class("A.Foo")]),
            Sig(vec![Type::Null, class("A.Foo")]),
        ];
        let chosen = resolve_overload(&set, &[Type::Null, class("A.Foo")]).unwrap();
        assert_eq!(chosen, &set[1]);
    }

    #[test]
    fn resolution_is_deterministic() {
        let set = vec![
            Sig(vec![Type::Int]),
            Sig(vec![int_array()]),
            Sig(vec![class("A.Foo")]),
        ];
        let first = resolve_overload(&set, &[int_array()]).unwrap().clone();
        for _ in 0..100 {
            assert_eq!(resolve_overload(&set, &[int_array()]).unwrap(), &first);
        }
    }

    #[test]
    fn declaration_order_does_not_change_outcome() {
        let forward = vec![Sig(vec![Type::Int]), Sig(vec![int_array()])];
        let reversed = vec![Sig(vec![int_array()]), Sig(vec![Type::Int])];
        assert_eq!(
            resolve_overload(&forward, &[Type::Int]).unwrap(),
            resolve_overload(&reversed, &[Type::Int]).unwrap()
        );
    }
}
