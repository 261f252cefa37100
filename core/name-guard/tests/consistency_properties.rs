//! Property tests for the name check and for reconciliation convergence.

use std::path::PathBuf;
use std::sync::Arc;

use name_guard::memory::{
    CountingRefresh, MemoryMarkers, MemoryProperties, MemoryRegistry, RecordingGate,
};
use name_guard::{
    folder_name, is_mismatch, GuardConfig, Host, MarkerBackend, NameGuard, ProjectId,
    ProjectRegistry, ValidateMode, PROBLEM_NAME_TAG,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    RenameFolder(usize, &'static str),
    RenameProject(usize, &'static str),
    SetIgnore(usize, bool),
    Validate,
}

fn name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["Foo", "Bar", "Baz", "foo"])
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize, name()).prop_map(|(i, n)| Op::RenameFolder(i, n)),
        (0..3usize, name()).prop_map(|(i, n)| Op::RenameProject(i, n)),
        (0..3usize, any::<bool>()).prop_map(|(i, b)| Op::SetIgnore(i, b)),
        Just(Op::Validate),
    ]
}

proptest! {
    #[test]
    fn mismatch_iff_strings_differ(declared in any::<String>(), folder in any::<String>()) {
        prop_assert_eq!(is_mismatch(&declared, &folder), declared != folder);
    }

    #[test]
    fn identical_names_never_mismatch(name in "\\PC*") {
        prop_assert!(!is_mismatch(&name, &name));
    }

    #[test]
    fn trailing_whitespace_is_a_mismatch(name in "\\PC*", pad in "[ \t]{1,3}") {
        let padded = format!("{}{}", name, pad);
        prop_assert!(is_mismatch(&name, &padded));
    }

    #[test]
    fn validate_all_converges(ops in prop::collection::vec(op(), 0..24), answer in any::<bool>()) {
        let registry = Arc::new(MemoryRegistry::new());
        let markers = Arc::new(MemoryMarkers::new());
        let gate = Arc::new(RecordingGate::new(answer));
        let host = Host {
            registry: registry.clone(),
            markers: markers.clone(),
            properties: Arc::new(MemoryProperties::new()),
            gate: gate.clone(),
            refresh: Arc::new(CountingRefresh::new()),
        };
        let guard = NameGuard::new(host, GuardConfig::default());

        let ids: Vec<ProjectId> = ["p0", "p1", "p2"]
            .iter()
            .map(|dir| registry.add_project(dir, PathBuf::from("/ws").join(dir)))
            .collect();

        for op in ops {
            match op {
                Op::RenameFolder(i, n) => registry.rename_folder(&ids[i], n),
                Op::RenameProject(i, n) => registry.rename_project(&ids[i], n),
                Op::SetIgnore(i, b) => {
                    guard.apply_ignore_setting(&ids[i], b).unwrap();
                }
                Op::Validate => {
                    guard.validate_all(ValidateMode::Interactive);
                }
            }
        }
        guard.validate_all(ValidateMode::Interactive);

        for id in &ids {
            let info = registry.project(id).unwrap();
            let expected = is_mismatch(&info.name, &folder_name(&info))
                && !guard.is_ignoring(id).unwrap();
            let tagged = markers
                .find_markers(id)
                .unwrap()
                .iter()
                .filter(|m| m.tag.as_deref() == Some(PROBLEM_NAME_TAG))
                .count();
            prop_assert!(tagged <= 1);
            prop_assert_eq!(tagged == 1, expected);
        }
        prop_assert!(gate.calls() <= ids.len() * 5);
    }
}
