//! # Configuration Tree Properties
//!
//! Property tests over random group paths and parameter values.

#[cfg(test)]
mod tests {
    use cf_01_config_tree::{paths, ConfigTree};
    use proptest::prelude::*;

    fn name_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z]{1,6}",
            ("[a-z]{1,4}", 0u32..200).prop_map(|(p, n)| format!("{p}:{n}")),
        ]
    }

    fn path_strategy() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(name_strategy(), 1..5)
    }

    fn value_strategy() -> impl Strategy<Value = String> {
        "[ -~]{1,20}"
    }

    proptest! {
        /// A created group exists and its canonical path is stable.
        #[test]
        fn created_groups_exist(path in path_strategy()) {
            let mut tree: ConfigTree<()> = ConfigTree::new();
            let path = path.join("/");
            tree.create_group(&path).unwrap();

            prop_assert!(tree.group_exists(&path));
            let canonical = tree.canonical_path(&path).unwrap();
            prop_assert_eq!(tree.canonical_path(&canonical).unwrap(), canonical.clone());
            prop_assert_eq!(paths::segments(&canonical).count(), paths::segments(&path).count());
        }

        /// The last value set is the one read back.
        #[test]
        fn set_then_read(path in path_strategy(), values in prop::collection::vec(value_strategy(), 1..4)) {
            let mut tree: ConfigTree<()> = ConfigTree::new();
            let group = path.join("/");
            tree.create_group(&group).unwrap();
            let param = paths::join(&group, "p");
            for value in &values {
                tree.set_value(&param, value).unwrap();
            }
            prop_assert_eq!(tree.value(&param).unwrap(), values.last().unwrap().clone());
            prop_assert_eq!(tree.parameters_list(&group).unwrap(), vec!["p".to_string()]);
        }

        /// Setting an empty value removes the parameter.
        #[test]
        fn empty_value_removes(path in path_strategy(), value in value_strategy()) {
            let mut tree: ConfigTree<()> = ConfigTree::new();
            let group = path.join("/");
            tree.create_group(&group).unwrap();
            let param = paths::join(&group, "p");
            tree.set_value(&param, &value).unwrap();
            prop_assert!(tree.parameter_exists(&param));

            tree.set_value(&param, "").unwrap();
            prop_assert!(!tree.parameter_exists(&param));
        }

        /// Parent-matching lookup finds the nearest definition.
        #[test]
        fn nearest_parent_value_wins(path in path_strategy(), outer in value_strategy(), inner in value_strategy()) {
            let mut tree: ConfigTree<()> = ConfigTree::new();
            let deep = path.join("/");
            tree.create_group(&deep).unwrap();
            let first = &path[0];
            tree.set_value(&paths::join(first, "speed"), &outer).unwrap();

            prop_assert_eq!(
                tree.value_also_match_parents(&paths::join(&deep, "speed")).unwrap(),
                outer
            );
            tree.set_value(&paths::join(&deep, "speed"), &inner).unwrap();
            prop_assert_eq!(
                tree.value_also_match_parents(&paths::join(&deep, "speed")).unwrap(),
                inner
            );
        }

        /// A copy has the same parameters; editing it leaves the source alone.
        #[test]
        fn copies_are_independent(path in path_strategy(), value in value_strategy()) {
            let mut tree: ConfigTree<()> = ConfigTree::new();
            let src = format!("src/{}", path.join("/"));
            tree.create_group(&src).unwrap();
            tree.set_value(&paths::join(&src, "v"), &value).unwrap();

            tree.copy_group("src", "dst").unwrap();
            let dst = format!("dst/{}", path.join("/"));
            prop_assert_eq!(tree.value(&paths::join(&dst, "v")).unwrap(), value.clone());

            tree.set_value(&paths::join(&dst, "v"), "changed").unwrap();
            prop_assert_eq!(tree.value(&paths::join(&src, "v")).unwrap(), value);
        }

        /// Numbered siblings are listed by numeric value.
        #[test]
        fn numbered_groups_sort_numerically(numbers in prop::collection::btree_set(0u32..1000, 1..12)) {
            let mut tree: ConfigTree<()> = ConfigTree::new();
            for n in numbers.iter().rev() {
                tree.create_group(&format!("arm:{n}")).unwrap();
            }
            let expected: Vec<String> = numbers.iter().map(|n| format!("arm:{n}")).collect();
            prop_assert_eq!(tree.groups_list("").unwrap(), expected);
        }

        /// Renaming keeps every parameter below the group.
        #[test]
        fn rename_keeps_contents(path in path_strategy(), value in value_strategy()) {
            let mut tree: ConfigTree<()> = ConfigTree::new();
            let inner = path.join("/");
            let old = paths::join("old", &inner);
            tree.create_group(&old).unwrap();
            tree.set_value(&paths::join(&old, "v"), &value).unwrap();

            tree.rename_group("old", "new").unwrap();
            prop_assert!(!tree.group_exists("old"));
            let moved = paths::join("new", &inner);
            prop_assert_eq!(tree.value(&paths::join(&moved, "v")).unwrap(), value);
        }
    }
}
