use super::strategies::arb_json;
use fieldrules::primitives::resolve_path;
use proptest::prelude::*;
use serde_json::Value;

/// Extract all valid dot-paths from a JSON value (objects and arrays, up to max_depth).
fn extract_paths(value: &Value, prefix: &str, paths: &mut Vec<String>, max_depth: u32) {
    if max_depth == 0 {
        return;
    }
    let join = |seg: &str| {
        if prefix.is_empty() {
            seg.to_string()
        } else {
            format!("{}.{}", prefix, seg)
        }
    };
    match value {
        Value::Object(obj) => {
            for (key, child) in obj {
                let path = join(key);
                paths.push(path.clone());
                extract_paths(child, &path, paths, max_depth - 1);
            }
        }
        Value::Array(arr) => {
            for (i, child) in arr.iter().enumerate() {
                let path = join(&i.to_string());
                paths.push(path.clone());
                extract_paths(child, &path, paths, max_depth - 1);
            }
        }
        _ => {}
    }
}

/// Walk a path by hand, one segment at a time.
fn walk<'a>(value: &'a Value, path: &str) -> &'a Value {
    path.split('.').fold(value, |current, seg| match current {
        Value::Array(arr) => &arr[seg.parse::<usize>().unwrap()],
        other => &other[seg],
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn empty_path_returns_root(value in arb_json(3)) {
        prop_assert_eq!(resolve_path(&value, ""), Some(&value));
    }

    // Every extracted path resolves to the value found by walking it
    #[test]
    fn extracted_paths_resolve(value in arb_json(3)) {
        let mut paths = Vec::new();
        extract_paths(&value, "", &mut paths, 4);
        for path in &paths {
            let resolved = resolve_path(&value, path);
            prop_assert_eq!(resolved, Some(walk(&value, path)), "path {}", path);
        }
    }

    // A segment below a scalar never resolves
    #[test]
    fn paths_through_scalars_are_none(value in arb_json(3)) {
        let mut paths = Vec::new();
        extract_paths(&value, "", &mut paths, 4);
        for path in &paths {
            let target = walk(&value, path);
            if !target.is_object() && !target.is_array() {
                let deeper = format!("{}.x", path);
                prop_assert_eq!(resolve_path(&value, &deeper), None);
            }
        }
    }

    // Arbitrary path strings never panic
    #[test]
    fn arbitrary_paths_do_not_panic(value in arb_json(3), path in "[a-d0-9.]{0,12}") {
        let _ = resolve_path(&value, &path);
    }
}
