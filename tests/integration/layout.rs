use std::path::Path;

const REQUIRED_PATHS: &[&str] = &[
    "src/main.rs",
    "src/lib.rs",
    "src/cli/mod.rs",
    "src/server/config/mod.rs",
    "src/server/runtime/http.rs",
    "src/tools/envelope.rs",
    "src/tools/docs/mod.rs",
    "src/tools/marinade/mod.rs",
    "tests/fixtures/stdio.env",
];

#[test]
fn crate_layout_is_intact() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let missing: Vec<&str> = REQUIRED_PATHS
        .iter()
        .copied()
        .filter(|relative| !root.join(relative).exists())
        .collect();

    assert!(missing.is_empty(), "missing paths: {missing:?}");
}
