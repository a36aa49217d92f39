use std::cmp::Ordering;

use proptest::prelude::*;

use vendor_sync::models::version::Version;
use vendor_sync::utils::error::UpdateError;

fn version_strategy() -> impl Strategy<Value = Version> {
    (
        0u64..50,
        0u64..50,
        0u64..50,
        proptest::option::of("[a-z0-9][a-z0-9.]{0,7}"),
    )
        .prop_map(|(major, minor, patch, tag)| match tag {
            Some(tag) => Version::with_tag(major, minor, patch, tag),
            None => Version::new(major, minor, patch),
        })
}

proptest! {
    #[test]
    fn display_then_parse_is_identity(version in version_strategy()) {
        let parsed = Version::parse(&version.to_string()).unwrap();
        prop_assert_eq!(parsed, version);
    }

    #[test]
    fn ordering_is_antisymmetric(a in version_strategy(), b in version_strategy()) {
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        if a.cmp(&b) == Ordering::Equal {
            prop_assert_eq!(&a, &b);
        }
    }

    #[test]
    fn ordering_is_transitive(
        a in version_strategy(),
        b in version_strategy(),
        c in version_strategy(),
    ) {
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
    }

    #[test]
    fn ordering_is_reflexive(a in version_strategy()) {
        prop_assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn numeric_triple_dominates_tag(a in version_strategy(), b in version_strategy()) {
        let triple = |v: &Version| (v.major, v.minor, v.patch);
        if triple(&a) != triple(&b) {
            prop_assert_eq!(a.cmp(&b), triple(&a).cmp(&triple(&b)));
        }
    }
}

#[test]
fn test_release_tags_must_be_strict() {
    for tag in ["v1.2", "1.2.3", "v1.2.3-beta", "v1.2.3.4", "", "v1.2.x"] {
        let err = Version::parse_release_tag(tag).unwrap_err();
        assert!(
            matches!(err, UpdateError::MalformedVersion { .. }),
            "{tag:?} should be rejected"
        );
    }
    assert_eq!(Version::parse_release_tag("v10.0.2").unwrap(), Version::new(10, 0, 2));
}

#[test]
fn test_tag_compares_lexicographically() {
    // an untagged version sorts before any tagged one with the same triple
    assert!(Version::new(1, 0, 0) < Version::with_tag(1, 0, 0, "alpha"));
    assert!(Version::with_tag(1, 0, 0, "alpha") < Version::with_tag(1, 0, 0, "beta"));
    assert!(Version::with_tag(1, 0, 0, "rc10") < Version::with_tag(1, 0, 0, "rc2"));
}

#[test]
fn test_parse_lenient_forms() {
    assert_eq!(Version::parse("7").unwrap(), Version::new(7, 0, 0));
    assert_eq!(Version::parse("v7.1").unwrap(), Version::new(7, 1, 0));
    assert_eq!(Version::parse("7.1.2-rc1").unwrap(), Version::with_tag(7, 1, 2, "rc1"));
    assert!(Version::parse("v").is_err());
    assert_eq!(Version::parse("v1.2.3-").unwrap(), Version::new(1, 2, 3));
    assert!(!Version::parse("v1.2.3-").unwrap().is_tagged());
    assert!(Version::parse("1.2.3.4").is_err());
}
