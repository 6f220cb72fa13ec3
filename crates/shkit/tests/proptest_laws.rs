//! Property-based tests for the matcher, pattern removal, field splitting
//! and the variable store.

use proptest::prelude::*;

use shkit::pattern::{self, MatchFlags};
use shkit::{Expander, Frame, OsHost, ShellOptions, VarStore, WordToken};

/// Patterns over a small alphabet including metacharacters.
fn pattern_text() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[ab.*?!\[\]\\-]{0,8}").unwrap()
}

fn subject_text() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[ab./]{0,8}").unwrap()
}

fn value_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{0,12}").unwrap()
}

fn name_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_]{0,15}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// The matcher is a pure function of its inputs.
    #[test]
    fn match_is_deterministic(p in pattern_text(), s in subject_text()) {
        for flags in [
            MatchFlags::default(),
            MatchFlags::for_pathnames(),
            MatchFlags { casefold: true, ..MatchFlags::default() },
            MatchFlags { noescape: true, ..MatchFlags::default() },
        ] {
            let first = pattern::matches(&p, &s, flags);
            let second = pattern::matches(&p, &s, flags);
            prop_assert_eq!(first, second);
        }
    }

    /// Prefix removal returns a suffix of the value, and the largest
    /// removal leaves a suffix of what the smallest leaves.
    #[test]
    fn prefix_removal_laws(v in subject_text(), p in pattern_text()) {
        let smallest = pattern::remove_prefix(&v, &p, false);
        let largest = pattern::remove_prefix(&v, &p, true);
        prop_assert!(v.ends_with(&smallest));
        prop_assert!(smallest.ends_with(&largest));
    }

    /// Suffix removal mirrors the prefix laws with prefixes.
    #[test]
    fn suffix_removal_laws(v in subject_text(), p in pattern_text()) {
        let smallest = pattern::remove_suffix(&v, &p, false);
        let largest = pattern::remove_suffix(&v, &p, true);
        prop_assert!(v.starts_with(&smallest));
        prop_assert!(smallest.starts_with(&largest));
    }

    /// Splitting on whitespace IFS is idempotent: every produced field
    /// re-expands to exactly itself.
    #[test]
    fn field_splitting_idempotent(value in prop::string::string_regex("[a-z \t]{0,20}").unwrap()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let host = OsHost::new();
            let opts = ShellOptions::new();
            let frame = Frame::new();

            let mut vars = VarStore::new();
            vars.add("v", Some(&value), false, false).unwrap();
            let token = WordToken::new(shkit::expand::scan::scan_word("$v").unwrap());
            let fields = Expander::new(&host, &mut vars, &opts, &frame)
                .expand_word(&token)
                .await
                .unwrap();

            for field in fields {
                vars.set_value("v", &field).unwrap();
                let again = Expander::new(&host, &mut vars, &opts, &frame)
                    .expand_word(&token)
                    .await
                    .unwrap();
                assert_eq!(again, vec![field.clone()]);
            }
        });
    }

    /// Storing then evaluating a variable round-trips the number.
    #[test]
    fn arithmetic_store_roundtrip(n in (i64::MIN + 1)..=i64::MAX) {
        let mut vars = VarStore::new();
        shkit::arith::evaluate(&format!("x = {n}"), &mut vars).unwrap();
        prop_assert_eq!(shkit::arith::evaluate("x", &mut vars), Ok(n));
    }

    /// envp contains exactly the exported entries in NAME=VALUE form.
    #[test]
    fn envp_is_exactly_the_exported_set(
        entries in prop::collection::btree_map(name_text(), (value_text(), any::<bool>()), 0..12)
    ) {
        let mut vars = VarStore::new();
        for (name, (value, exported)) in &entries {
            vars.add(name, Some(value), *exported, false).unwrap();
        }
        let mut expected: Vec<String> = entries
            .iter()
            .filter(|(_, (_, exported))| *exported)
            .map(|(name, (value, _))| format!("{name}={value}"))
            .collect();
        expected.sort_unstable();
        let mut got: Vec<String> = vars.envp().to_vec();
        got.sort_unstable();
        prop_assert_eq!(got, expected);
    }

    /// Every mutation strictly increases the generation counter.
    #[test]
    fn generation_is_monotonic(names in prop::collection::vec(name_text(), 1..8)) {
        let mut vars = VarStore::new();
        let mut last = vars.generation();
        for name in &names {
            vars.add(name, Some("x"), false, false).unwrap();
            prop_assert!(vars.generation() > last);
            last = vars.generation();
        }
        for name in &names {
            if vars.get(name).is_some() {
                vars.remove(name).unwrap();
                prop_assert!(vars.generation() > last);
                last = vars.generation();
            }
        }
    }
}
