use sourcelog_core::{
    AppError, IgnoreMatcher, TreeOptions, create_filtered_tree, load_ignore_patterns, to_posix,
};
use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn default_matcher(root: &Path) -> IgnoreMatcher {
    let patterns = load_ignore_patterns(root, None, None).unwrap();
    IgnoreMatcher::new(patterns.iter()).unwrap()
}

fn structure_only() -> TreeOptions {
    TreeOptions {
        include_content: false,
        ..TreeOptions::default()
    }
}

#[test]
fn single_child_chain_uses_last_connectors() {
    let project = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(project.path(), "sub/file.txt", "hello");

    let target = out.path().join("tree.txt");
    let matcher = default_matcher(project.path());
    let count = create_filtered_tree(project.path(), &target, &matcher, &structure_only()).unwrap();

    let text = fs::read_to_string(&target).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(count, 2);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], to_posix(&project.path().canonicalize().unwrap()));
    assert_eq!(lines[1], "└── sub");
    assert_eq!(lines[2], "    └── file.txt");
}

#[test]
fn last_sibling_is_chosen_among_survivors() {
    let project = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(project.path(), "app/views.py", "");
    write(project.path(), "zz_cache.pyc", "");
    fs::create_dir_all(project.path().join("node_modules/pkg")).unwrap();

    let target = out.path().join("tree.txt");
    let matcher = default_matcher(project.path());
    create_filtered_tree(project.path(), &target, &matcher, &structure_only()).unwrap();

    let text = fs::read_to_string(&target).unwrap();
    let body: Vec<&str> = text.lines().skip(1).collect();
    assert_eq!(body, vec!["└── app", "    └── views.py"]);
}

#[test]
fn file_heads_are_inlined_under_their_entry() {
    let project = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(project.path(), "a.py", "first\nsecond\nthird\n");
    write(project.path(), "b.py", "x");

    let target = out.path().join("tree.txt");
    let matcher = default_matcher(project.path());
    let options = TreeOptions {
        include_content: true,
        max_bytes: 12,
    };
    create_filtered_tree(project.path(), &target, &matcher, &options).unwrap();

    let text = fs::read_to_string(&target).unwrap();
    let body: Vec<&str> = text.lines().skip(1).collect();
    assert_eq!(
        body,
        vec!["├── a.py", "│   first", "│   second", "└── b.py", "│   x"]
    );
}

#[test]
fn negative_budget_writes_nothing() {
    let project = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(project.path(), "a.py", "x");

    let target = out.path().join("tree.txt");
    let matcher = default_matcher(project.path());
    let options = TreeOptions {
        include_content: true,
        max_bytes: -5,
    };
    let err = create_filtered_tree(project.path(), &target, &matcher, &options).unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(!target.exists());
}

#[test]
fn missing_root_is_reported() {
    let out = tempfile::tempdir().unwrap();
    let missing = out.path().join("nope");
    let matcher = IgnoreMatcher::new(Vec::<String>::new()).unwrap();
    let err = create_filtered_tree(&missing, &out.path().join("t.txt"), &matcher, &TreeOptions::default())
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
}

#[cfg(unix)]
#[test]
fn symlinked_entries_are_left_out() {
    let project = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(outside.path(), "secret.txt", "secret");
    write(project.path(), "real.txt", "real");
    std::os::unix::fs::symlink(outside.path().join("secret.txt"), project.path().join("link.txt"))
        .unwrap();
    std::os::unix::fs::symlink(outside.path(), project.path().join("outside")).unwrap();

    let target = out.path().join("tree.txt");
    let matcher = default_matcher(project.path());
    create_filtered_tree(project.path(), &target, &matcher, &TreeOptions::default()).unwrap();

    let text = fs::read_to_string(&target).unwrap();
    let body: Vec<&str> = text.lines().skip(1).collect();
    assert_eq!(body, vec!["└── real.txt", "│   real"]);
}
