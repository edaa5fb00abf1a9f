use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

use marktree::parse_markdown;

lazy_static! {
    static ref EXAMPLE_DELIMITER_RE: Regex =
        Regex::new(r"^````+\s+example\s*$").expect("regex");
}

static FIXTURE_FILE: &str = "tests/fixtures/outline.txt";

fn normalize_visible_tabs(input: &str) -> String {
    input.replace('→', "\t")
}

/// One Markdown input with the outline it must parse to.
#[derive(Debug, Clone)]
struct Fixture {
    section: String,
    index: usize,
    markdown: String,
    expected: String,
}

#[allow(clippy::while_let_on_iterator)]
fn load_fixtures(path: &Path) -> anyhow::Result<Vec<Fixture>> {
    let source = fs::read_to_string(path)?;
    let mut section = String::from("Unknown");
    let mut fixtures = Vec::new();
    let mut lines = source.lines();

    while let Some(line) = lines.next() {
        if let Some(title) = line.strip_prefix("## ") {
            section = title.trim().to_string();
            continue;
        }
        if !EXAMPLE_DELIMITER_RE.is_match(line) {
            continue;
        }

        let mut markdown = Vec::new();
        for input_line in lines.by_ref() {
            if input_line == "." {
                break;
            }
            markdown.push(input_line);
        }

        let mut expected = String::new();
        for outline_line in lines.by_ref() {
            if outline_line.starts_with("````") {
                break;
            }
            expected.push_str(outline_line);
            expected.push('\n');
        }

        fixtures.push(Fixture {
            section: section.clone(),
            index: fixtures.len() + 1,
            markdown: normalize_visible_tabs(&markdown.join("\n")),
            expected,
        });
    }

    anyhow::ensure!(!fixtures.is_empty(), "no fixtures in {}", path.display());
    Ok(fixtures)
}

fn should_run(fixture: &Fixture) -> bool {
    match env::var("MARKTREE_FIXTURE")
        .ok()
        .and_then(|index| index.parse::<usize>().ok())
    {
        Some(index) => fixture.index == index,
        None => true,
    }
}

#[test]
fn test_outline_fixtures() -> anyhow::Result<()> {
    let path = PathBuf::from(FIXTURE_FILE);
    let fixtures = load_fixtures(&path)?;

    for fixture in fixtures.iter().filter(|fixture| should_run(fixture)) {
        let doc = parse_markdown(&fixture.markdown);
        let actual = doc.outline(doc.root());
        assert_eq!(
            actual, fixture.expected,
            "outline mismatch for fixture {} ({})\nMarkdown:\n{}",
            fixture.index, fixture.section, fixture.markdown
        );
    }
    Ok(())
}

#[test]
fn test_fixture_sections_are_populated() -> anyhow::Result<()> {
    let fixtures = load_fixtures(Path::new(FIXTURE_FILE))?;
    for section in ["Blocks", "Lists", "Inlines"] {
        assert!(
            fixtures.iter().any(|fixture| fixture.section == section),
            "no fixtures under {section}"
        );
    }
    Ok(())
}
