//! End-to-end tests: styles on disk, configuration, and the full
//! scope/dispatch/localize pipeline.

use prosaic::{Config, Linter, Registry, Severity};
use std::fs;
use std::path::PathBuf;

/// Write a style directory and return a config pointing at it.
fn setup(rules: &[(&str, &str)]) -> (tempfile::TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    let style = dir.path().join("House");
    fs::create_dir_all(&style).unwrap();
    for (name, source) in rules {
        fs::write(style.join(format!("{}.yml", name)), source).unwrap();
    }

    let mut config = Config::default();
    config.styles_path = Some(dir.path().to_path_buf());
    config.based_on_styles = vec!["House".to_string()];
    (dir, config)
}

fn linter(rules: &[(&str, &str)]) -> (tempfile::TempDir, Linter) {
    let (dir, config) = setup(rules);
    let registry = Registry::new(&config);
    (dir, Linter::new(config, registry))
}

#[test]
fn repetition_scenario() {
    let (_dir, linter) = linter(&[(
        "Repetition",
        "extends: repetition\nmessage: \"'%s' is repeated!\"\ntokens:\n  - '[^\\s]+'\n",
    )]);

    let file = linter.lint_string("This is is a test.", ".txt");
    assert_eq!(file.alerts.len(), 1);

    let alert = &file.alerts[0];
    assert_eq!(alert.check, "House.Repetition");
    assert_eq!(alert.line, 1);
    assert_eq!(alert.match_text, "is is");
    assert_eq!(alert.severity, Severity::Warning);
}

#[test]
fn conditional_scenario() {
    let rule = (
        "Abbr",
        "extends: conditional\nmessage: \"'%s' has no definition.\"\nfirst: '\\b([A-Z]{3,5})\\b'\nsecond: '(?:\\b[A-Z][a-z]+ )+\\(([A-Z]{3,5})\\)'\n",
    );

    let (_dir, linter) = linter(&[rule]);
    let file = linter.lint_string("The World Health Organization (WHO) and WHO agree.", ".txt");
    assert!(file.alerts.is_empty());

    let file = linter.lint_string("WHO says hello.", ".txt");
    assert_eq!(file.alerts.len(), 1);
    assert_eq!(file.alerts[0].span, [1, 4]);
}

#[test]
fn skipped_code_scenario() {
    let (dir, mut config) = setup(&[(
        "Foo",
        "extends: existence\nmessage: \"found '%s'\"\ntokens: [foo]\n",
    )]);
    config.skipped_scopes = vec!["code".to_string(), "pre".to_string()];
    let registry = Registry::new(&config);
    let linter = Linter::new(config, registry);

    let file = linter.lint_string("# Hello World\n\nuse `foo`\n", ".md");
    assert!(file.alerts.is_empty());
    drop(dir);
}

#[test]
fn substitution_scenario() {
    let (_dir, linter) = linter(&[(
        "Compound",
        "extends: substitution\nmessage: \"Use '%s' instead of '%s'.\"\nswap:\n  smart phone: smartphone\n",
    )]);

    let file = linter.lint_string("my smart phone", ".txt");
    assert_eq!(file.alerts.len(), 1);

    let alert = &file.alerts[0];
    assert_eq!(alert.span, [4, 15]);
    assert_eq!(alert.message, "Use 'smartphone' instead of 'smart phone'.");
}

#[test]
fn sentence_capitalization_scenario() {
    let (_dir, linter) = linter(&[(
        "Sentence",
        "extends: capitalization\nmessage: \"'%s' should be sentence-cased.\"\nmatch: $sentence\n",
    )]);

    let file = linter.lint_string("hello world", ".txt");
    assert_eq!(file.alerts.len(), 1);
    assert_eq!(file.alerts[0].match_text, "hello world");
    assert_eq!(file.alerts[0].span, [1, 12]);
}

#[test]
fn readability_scenario() {
    let (_dir, linter) = linter(&[(
        "Grade",
        "extends: readability\nmessage: \"Grade %s is too high.\"\ngrade: 8\nmetrics:\n  - Flesch-Kincaid\n",
    )]);

    let file = linter.lint_string("The cat sat.", ".txt");
    assert!(file.alerts.is_empty());

    let dense = "Organizational stakeholders continuously reevaluate \
                 multidimensional considerations regarding infrastructural \
                 sustainability initiatives throughout heterogeneous \
                 operational environments necessitating comprehensive \
                 documentation obligations.";
    let file = linter.lint_string(dense, ".txt");
    assert_eq!(file.alerts.len(), 1);
}

#[test]
fn vocabulary_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let vocab = dir.path().join("Vocab").join("Docs");
    fs::create_dir_all(&vocab).unwrap();
    fs::write(vocab.join("accept.txt"), "GitHub\n").unwrap();
    fs::write(vocab.join("reject.txt"), "stuff\n").unwrap();

    let mut config = Config::default();
    config.styles_path = Some(dir.path().to_path_buf());
    config.vocab = Some("Docs".to_string());
    let registry = Registry::new(&config);
    let linter = Linter::new(config, registry);

    let file = linter.lint_string("we put github stuff here", ".txt");
    let checks: Vec<&str> = file.alerts.iter().map(|a| a.check.as_str()).collect();
    assert!(checks.contains(&"Prosaic.Terms"));
    assert!(checks.contains(&"Prosaic.Avoid"));

    let terms = file
        .alerts
        .iter()
        .find(|a| a.check == "Prosaic.Terms")
        .unwrap();
    assert_eq!(terms.message, "Use 'GitHub' instead of 'github'.");
    assert_eq!(terms.severity, Severity::Error);
}

#[test]
fn syntax_section_disables_rule() {
    let (dir, mut config) = setup(&[(
        "Foo",
        "extends: existence\nmessage: \"%s\"\ntokens: [foo]\n",
    )]);
    config.syntax.insert(
        "*.md".to_string(),
        prosaic::config::SyntaxSection {
            checks: [("House.Foo".to_string(), false)].into_iter().collect(),
            ..Default::default()
        },
    );
    let registry = Registry::new(&config);
    let linter = Linter::new(config, registry);

    // Disabled for Markdown, still active for plain text.
    assert!(linter.lint_string("foo\n", ".md").alerts.is_empty());
    assert_eq!(linter.lint_string("foo\n", ".txt").alerts.len(), 1);
    drop(dir);
}

#[test]
fn syntax_section_overrides_level() {
    let (dir, mut config) = setup(&[(
        "Foo",
        "extends: existence\nmessage: \"%s\"\ntokens: [foo]\n",
    )]);
    config.syntax.insert(
        "*.md".to_string(),
        prosaic::config::SyntaxSection {
            levels: [("House.Foo".to_string(), Severity::Error)]
                .into_iter()
                .collect(),
            ..Default::default()
        },
    );
    let registry = Registry::new(&config);
    let linter = Linter::new(config, registry);

    assert_eq!(
        linter.lint_string("foo\n", ".md").alerts[0].severity,
        Severity::Error
    );
    assert_eq!(
        linter.lint_string("foo\n", ".txt").alerts[0].severity,
        Severity::Warning
    );
    drop(dir);
}

#[test]
fn broken_manifest_does_not_abort() {
    let (dir, config) = setup(&[
        ("Good", "extends: existence\nmessage: \"%s\"\ntokens: [foo]\n"),
        ("Bad", "extends: existence\nmessage: \"%s\"\ntokens: ['(unclosed']\n"),
    ]);
    let registry = Registry::new(&config);
    assert_eq!(registry.errors.len(), 1);

    let linter = Linter::new(config, registry);
    let file = linter.lint_string("foo\n", ".txt");
    assert_eq!(file.alerts.len(), 1);
    drop(dir);
}

#[test]
fn block_and_token_ignores() {
    let (dir, mut config) = setup(&[(
        "Foo",
        "extends: existence\nmessage: \"%s\"\ntokens: [foo]\n",
    )]);
    config.block_ignores = vec![r"(?s)<<<.*?>>>".to_string()];
    config.token_ignores = vec![r"\{\{.*?\}\}".to_string()];
    let registry = Registry::new(&config);
    let linter = Linter::new(config, registry);

    let file = linter.lint_string("<<<\nfoo\n>>>\n\nreal {{foo}} text\n", ".txt");
    assert!(file.alerts.is_empty());
    drop(dir);
}

#[test]
fn lint_directory_with_glob() {
    let (style_dir, config) = setup(&[(
        "Foo",
        "extends: existence\nmessage: \"%s\"\ntokens: [foo]\n",
    )]);
    let registry = Registry::new(&config);
    let mut linter = Linter::new(config, registry);
    linter.glob = Some(glob::Pattern::new("*.md").unwrap());
    linter.sorted = true;

    let docs = tempfile::tempdir().unwrap();
    fs::write(docs.path().join("a.md"), "foo\n").unwrap();
    fs::write(docs.path().join("b.txt"), "foo\n").unwrap();

    let files = linter
        .lint(&[docs.path().to_string_lossy().to_string()])
        .unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path.extension().unwrap(), "md");
    drop(style_dir);
}

#[test]
fn unreadable_file_skipped() {
    let (_dir, linter) = linter(&[(
        "Foo",
        "extends: existence\nmessage: \"%s\"\ntokens: [foo]\n",
    )]);
    let files = linter
        .lint(&["definitely/not/a/real/path.txt".to_string()])
        .unwrap();
    assert!(files.is_empty());
}

#[test]
fn json_output_shape() {
    use prosaic::{JsonFormatter, OutputFormatter};

    let (_dir, linter) = linter(&[(
        "Foo",
        "extends: existence\nmessage: \"found '%s'\"\nlink: 'https://example.com'\ntokens: [foo]\n",
    )]);
    let file = linter.lint_string("a foo here", ".txt");
    let output = JsonFormatter::new().format(&[file]);

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let alerts = parsed.get("stdin.txt").unwrap().as_array().unwrap();
    assert_eq!(alerts.len(), 1);

    let alert = &alerts[0];
    assert_eq!(alert["Check"], "House.Foo");
    assert_eq!(alert["Line"], 1);
    assert_eq!(alert["Match"], "foo");
    assert_eq!(alert["Message"], "found 'foo'");
    assert_eq!(alert["Severity"], "warning");
    assert_eq!(alert["Link"], "https://example.com");
    assert_eq!(alert["Span"][0], 3);
    assert_eq!(alert["Span"][1], 6);
    assert!(alert["Action"].get("Name").is_some());
}

#[test]
fn code_comments_are_linted() {
    let (style_dir, config) = setup(&[(
        "Foo",
        "extends: existence\nmessage: \"%s\"\ntokens: [foo]\n",
    )]);
    let registry = Registry::new(&config);
    let linter = Linter::new(config, registry);

    let docs = tempfile::tempdir().unwrap();
    let path = docs.path().join("demo.py");
    fs::write(&path, "x = 1  # foo lives here\ny = \"foo\"\n").unwrap();

    let files = linter.lint(&[path.to_string_lossy().to_string()]).unwrap();
    assert_eq!(files.len(), 1);
    // One alert from the comment, one from the string literal.
    assert_eq!(files[0].alerts.len(), 2);
    drop(style_dir);
}

#[test]
fn stdin_extension_routes_format() {
    let (_dir, linter) = linter(&[(
        "Foo",
        "extends: existence\nmessage: \"%s\"\ntokens: [foo]\n",
    )]);

    // As Markdown, the inline code span is ignored by default.
    assert!(linter.lint_string("use `foo`\n", ".md").alerts.is_empty());
    // As plain text, the backticks are just characters.
    assert_eq!(linter.lint_string("use `foo`\n", ".txt").alerts.len(), 1);
}

#[test]
fn sorted_output_is_lexicographic() {
    let (style_dir, config) = setup(&[(
        "Foo",
        "extends: existence\nmessage: \"%s\"\ntokens: [foo]\n",
    )]);
    let registry = Registry::new(&config);
    let mut linter = Linter::new(config, registry);
    linter.sorted = true;

    let docs = tempfile::tempdir().unwrap();
    for name in ["c.txt", "a.txt", "b.txt"] {
        fs::write(docs.path().join(name), "foo\n").unwrap();
    }
    let files = linter
        .lint(&[docs.path().to_string_lossy().to_string()])
        .unwrap();

    let names: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    drop(style_dir);
}
