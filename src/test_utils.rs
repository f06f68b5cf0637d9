//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate arbitrary file content, sometimes larger than one hash chunk
    pub fn file_content() -> impl Strategy<Value = Vec<u8>> {
        prop_oneof![
            proptest::collection::vec(any::<u8>(), 0..1000),
            proptest::collection::vec(any::<u8>(), 65_000..70_000),
        ]
    }

    /// Generate a single valid file name
    pub fn file_name() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_][a-zA-Z0-9_.-]{0,20}"
            .prop_filter("Name must not be a dot entry", |s| s != "." && s != "..")
    }

    /// Generate a kernel cmdline fragment like `key=value flag`
    pub fn cmdline_fragment() -> impl Strategy<Value = String> {
        ("[a-z][a-z.]{0,10}", "[a-zA-Z0-9_]{1,10}", "[a-z]{0,8}")
            .prop_map(|(key, value, flag)| format!("{key}={value} {flag}").trim_end().to_string())
    }

    /// Generate an mksquashfs option list
    pub fn squashfs_options() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec(
            prop_oneof![
                Just("-noappend".to_string()),
                Just("-no-xattrs".to_string()),
                Just("-b".to_string()),
                Just("1024k".to_string()),
                Just("-comp".to_string()),
                Just("xz".to_string()),
                "[a-z0-9-]{1,10}",
            ],
            0..10,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

        #[test]
        fn test_file_name_generator(name in file_name()) {
            prop_assert!(!name.is_empty());
            prop_assert!(!name.contains('/'));
        }

        #[test]
        fn test_cmdline_fragment_generator(fragment in cmdline_fragment()) {
            prop_assert!(fragment.contains('='));
            prop_assert!(!fragment.ends_with(' '));
        }
    }
}
