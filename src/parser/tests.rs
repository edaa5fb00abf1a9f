use super::*;
use crate::ast::{NodeData, NodeId, NodeKind};
use crate::lexer::{TokenKind, tokenize};

fn parse_str(input: &str) -> Document {
    parse(&tokenize(input), &ParseOptions::default())
}

fn parse_with(input: &str, options: ParseOptions) -> Document {
    parse(&tokenize(input), &options)
}

fn outline(input: &str) -> String {
    let doc = parse_str(input);
    doc.outline(doc.root())
}

fn assert_links_consistent(doc: &Document) {
    for id in doc.ids() {
        for &child in doc.children(id) {
            assert_eq!(doc.parent(child), Some(id), "child {child} of {id}");
        }
    }
    for id in doc.descendants(doc.root()) {
        let parent = doc.parent(id).expect("attached node has a parent");
        assert!(doc.children(parent).contains(&id));
    }
}

#[test]
fn parses_heading_and_paragraph() {
    assert_eq!(
        outline("# Heading\n\nSome text here."),
        "document\n  heading level=1\n    text \"Heading\"\n  paragraph\n    text \"Some text here.\"\n"
    );
}

#[test]
fn parses_multiple_headings() {
    let doc = parse_str("# Level 1\n## Level 2\n### Level 3");
    let blocks = doc.children(doc.root());
    assert_eq!(blocks.len(), 3);

    for (i, expected_level) in [1u8, 2, 3].iter().enumerate() {
        match doc.data(blocks[i]) {
            NodeData::Heading { level } => assert_eq!(level, expected_level),
            other => panic!("expected heading at index {}, got {:?}", i, other),
        }
    }
}

#[test]
fn overlong_heading_mark_spills_into_text() {
    assert_eq!(
        outline("####### seven"),
        "document\n  heading level=6\n    text \"# seven\"\n"
    );
}

#[test]
fn empty_input_gives_empty_document() {
    let doc = parse_str("");
    assert_eq!(doc.kind(doc.root()), NodeKind::Document);
    assert!(doc.children(doc.root()).is_empty());
    assert_eq!(doc.len(), 1);
}

#[test]
fn lone_bold_marker_is_text() {
    assert_eq!(outline("**"), "document\n  paragraph\n    text \"**\"\n");
}

#[test]
fn failed_opener_is_its_own_text_node() {
    assert_eq!(
        outline("*a"),
        "document\n  paragraph\n    text \"*\"\n    text \"a\"\n"
    );
    assert_eq!(
        outline("x *y"),
        "document\n  paragraph\n    text \"x \"\n    text \"*\"\n    text \"y\"\n"
    );

    let doc = parse_str("a `b");
    let paragraph = doc.children(doc.root())[0];
    let marker = doc.children(paragraph)[1];
    let range = doc.range(marker).expect("parsed nodes carry a range");
    assert_eq!((range.start.offset, range.end.offset), (2, 3));
}

#[test]
fn parses_inline_spans() {
    assert_eq!(
        outline("a **b** *c* `d`"),
        "document\n  paragraph\n    text \"a \"\n    bold\n      text \"b\"\n    text \" \"\n    italic\n      text \"c\"\n    text \" \"\n    code \"d\"\n"
    );
}

#[test]
fn bold_nests_inside_italic() {
    assert_eq!(
        outline("*a **b** c*"),
        "document\n  paragraph\n    italic\n      text \"a \"\n      bold\n        text \"b\"\n      text \" c\"\n"
    );
}

#[test]
fn code_span_content_is_raw() {
    assert_eq!(
        outline("``a`b``"),
        "document\n  paragraph\n    code \"a`b\"\n"
    );
    assert_eq!(
        outline("`**x**`"),
        "document\n  paragraph\n    code \"**x**\"\n"
    );
}

#[test]
fn unterminated_span_stops_at_newline() {
    assert_eq!(
        outline("**a\nb**"),
        "document
  paragraph
    text \"**\"
    text \"a\"
  paragraph
    text \"b\"
    text \"**\"
"
    );
}

#[test]
fn mid_line_block_markers_end_the_paragraph() {
    assert_eq!(
        outline("a ## b"),
        "document\n  paragraph\n    text \"a \"\n  heading level=2\n    text \"b\"\n"
    );
    assert_eq!(
        outline("a > b"),
        "document\n  paragraph\n    text \"a \"\n  quote\n    paragraph\n      text \"b\"\n"
    );
    assert_eq!(
        outline("a --- b"),
        "document\n  paragraph\n    text \"a \"\n  horizontal_rule\n  paragraph\n    text \"b\"\n"
    );
    assert_eq!(
        outline("a ```\nb\n```"),
        "document\n  paragraph\n    text \"a \"\n  code_block code=\"b\"\n"
    );
}

#[test]
fn block_marker_ends_open_span() {
    assert_eq!(
        outline("*a # b*"),
        "document
  paragraph
    text \"*\"
    text \"a \"
  heading level=1
    text \"b\"
    text \"*\"
"
    );
}

#[test]
fn code_span_keeps_block_markers() {
    assert_eq!(
        outline("`#include` > x"),
        "document
  paragraph
    code \"#include\"
    text \" \"
  quote
    paragraph
      text \"x\"
"
    );
}

#[test]
fn heading_text_keeps_block_markers() {
    assert_eq!(
        outline("# a > b"),
        "document\n  heading level=1\n    text \"a > b\"\n"
    );
}

#[test]
fn parses_code_blocks() {
    assert_eq!(
        outline("```rust\nfn main() {}\n```"),
        "document\n  code_block language=\"rust\" code=\"fn main() {}\"\n"
    );
}

#[test]
fn unclosed_code_block_runs_to_end() {
    assert_eq!(
        outline("```\nline one\nline two"),
        "document\n  code_block code=\"line one\\nline two\"\n"
    );
}

#[test]
fn quote_marker_does_not_close_top_level_fence() {
    assert_eq!(
        outline("```\n> ```"),
        "document\n  code_block code=\"> ```\"\n"
    );
    assert_eq!(
        outline("```\n> ```\n```\nafter"),
        "document\n  code_block code=\"> ```\"\n  paragraph\n    text \"after\"\n"
    );
}

#[test]
fn parses_ordered_list_with_nested_list() {
    assert_eq!(
        outline("1. a\n2. b\n   - c"),
        "document
  list ordered=true start=1 marker=\".\"
    list_item
      paragraph
        text \"a\"
    list_item
      paragraph
        text \"b\"
      list ordered=false marker=\"-\"
        list_item
          paragraph
            text \"c\"
"
    );
}

#[test]
fn list_start_comes_from_first_item() {
    let doc = parse_str("3. c\n4. d");
    let list = doc.children(doc.root())[0];
    assert_eq!(
        doc.data(list),
        &NodeData::List {
            ordered: true,
            start: Some(3),
            marker: ".".to_string(),
        }
    );
    assert_eq!(doc.children(list).len(), 2);
}

#[test]
fn task_items_are_tri_state() {
    let doc = parse_str("- [x] done\n- [ ] todo\n- plain");
    let list = doc.children(doc.root())[0];
    let states: Vec<Option<bool>> = doc
        .children(list)
        .iter()
        .map(|&item| match doc.data(item) {
            NodeData::ListItem { checked } => *checked,
            other => panic!("expected list item, got {:?}", other),
        })
        .collect();
    assert_eq!(states, vec![Some(true), Some(false), None]);

    let first_item = doc.children(list)[0];
    assert_eq!(doc.text_content(first_item), "done");
}

#[test]
fn indent_width_follows_spaces_per_level() {
    let input = "- a\n  - b";
    let nested = parse_str(input);
    let list = nested.children(nested.root())[0];
    assert_eq!(nested.children(list).len(), 1);

    let options = ParseOptions::builder().with_spaces_per_level(4).build();
    let flat = parse_with(input, options);
    let list = flat.children(flat.root())[0];
    assert_eq!(flat.children(list).len(), 2);
}

#[test]
fn tab_counts_as_one_level() {
    let doc = parse_str("- a\n\t- b");
    let list = doc.children(doc.root())[0];
    let item = doc.children(list)[0];
    let kinds: Vec<NodeKind> = doc.children(item).iter().map(|&id| doc.kind(id)).collect();
    assert_eq!(kinds, vec![NodeKind::Paragraph, NodeKind::List]);
}

#[test]
fn shallower_item_ends_nested_list() {
    assert_eq!(
        outline("- a\n  - b\n- c"),
        "document
  list ordered=false marker=\"-\"
    list_item
      paragraph
        text \"a\"
      list ordered=false marker=\"-\"
        list_item
          paragraph
            text \"b\"
    list_item
      paragraph
        text \"c\"
"
    );
}

#[test]
fn list_ends_at_non_item_line() {
    let doc = parse_str("- a\nafter");
    let kinds: Vec<NodeKind> = doc
        .children(doc.root())
        .iter()
        .map(|&id| doc.kind(id))
        .collect();
    assert_eq!(kinds, vec![NodeKind::List, NodeKind::Paragraph]);
}

#[test]
fn parses_nested_quotes() {
    assert_eq!(
        outline("> a\n> > b"),
        "document\n  quote\n    paragraph\n      text \"a\"\n    quote\n      paragraph\n        text \"b\"\n"
    );
}

#[test]
fn quote_contains_blocks() {
    assert_eq!(
        outline("> # Title\n> - item"),
        "document
  quote
    heading level=1
      text \"Title\"
    list ordered=false marker=\"-\"
      list_item
        paragraph
          text \"item\"
"
    );
}

#[test]
fn code_block_inside_quote_drops_markers() {
    assert_eq!(
        outline("> ```\n> x\n> ```"),
        "document\n  quote\n    code_block code=\"x\"\n"
    );
}

#[test]
fn horizontal_rule_between_paragraphs() {
    assert_eq!(
        outline("a\n\n---  \nb"),
        "document\n  paragraph\n    text \"a\"\n  horizontal_rule\n  paragraph\n    text \"b\"\n"
    );
}

#[test]
fn parses_link() {
    assert_eq!(
        outline("[text](https://x)"),
        "document\n  paragraph\n    link url=\"https://x\"\n      text \"text\"\n"
    );
}

#[test]
fn incomplete_link_is_text() {
    assert_eq!(
        outline("[text]("),
        "document\n  paragraph\n    text \"[\"\n    text \"text](\"\n"
    );
    assert_eq!(
        outline("[text] (x)"),
        "document\n  paragraph\n    text \"[\"\n    text \"text] (x)\"\n"
    );
}

#[test]
fn link_title_and_inline_content() {
    assert_eq!(
        outline("[**b**](u \"T\")"),
        "document\n  paragraph\n    link url=\"u\" title=\"T\"\n      bold\n        text \"b\"\n"
    );
}

#[test]
fn link_text_cannot_hold_links() {
    assert_eq!(
        outline("[a [b](u)](v)"),
        "document\n  paragraph\n    link url=\"u\"\n      text \"a [b\"\n    text \"](v)\"\n"
    );
}

#[test]
fn parses_image() {
    assert_eq!(
        outline("![alt text](img.png \"Title\")"),
        "document\n  paragraph\n    image url=\"img.png\" alt=\"alt text\" title=\"Title\"\n"
    );
}

#[test]
fn failed_image_keeps_bang_as_text() {
    assert_eq!(
        outline("![a]("),
        "document\n  paragraph\n    text \"!\"\n    text \"[\"\n    text \"a](\"\n"
    );
    assert_eq!(
        outline("![a] [b](u)"),
        "document
  paragraph
    text \"!\"
    text \"[\"
    text \"a] \"
    link url=\"u\"
      text \"b\"
"
    );
}

#[test]
fn soft_breaks_join_paragraph_lines() {
    let options = ParseOptions::builder().with_soft_breaks(true).build();
    let doc = parse_with("a\nb\n\nc\n# h", options);
    assert_eq!(
        doc.outline(doc.root()),
        "document
  paragraph
    text \"a\"
    newline
    text \"b\"
  paragraph
    text \"c\"
  heading level=1
    text \"h\"
"
    );

    let plain = parse_str("a\nb");
    assert_eq!(plain.children(plain.root()).len(), 2);
}

#[test]
fn nesting_limit_degrades_to_text() {
    let options = ParseOptions::builder().with_max_nesting_depth(1).build();
    let doc = parse_with("> > x", options);
    assert_eq!(
        doc.outline(doc.root()),
        "document\n  quote\n    paragraph\n      text \">\"\n      text \" x\"\n"
    );

    let options = ParseOptions::builder().with_max_nesting_depth(0).build();
    let doc = parse_with("**a** [b](c)", options);
    assert_eq!(
        doc.outline(doc.root()),
        "document
  paragraph
    text \"**\"
    text \"a\"
    text \"**\"
    text \" \"
    text \"[\"
    text \"b](c)\"
"
    );
}

#[test]
fn ranges_cover_consumed_tokens() {
    let doc = parse_str("# Title\ntext");
    let heading = doc.children(doc.root())[0];
    let range = doc.range(heading).expect("parsed nodes carry a range");
    assert_eq!((range.start.offset, range.end.offset), (0, 7));

    let title = doc.children(heading)[0];
    let range = doc.range(title).expect("parsed nodes carry a range");
    assert_eq!((range.start.offset, range.end.offset), (2, 7));

    let paragraph = doc.children(doc.root())[1];
    assert_eq!(doc.position(paragraph).line, 2);
}

#[test]
fn parent_links_are_consistent() {
    let doc = parse_str(
        "# T\n> q **b** [l](u)\n> - [x] t\n1. a\n   - b\n     - c\n\n```\ncode\n```\n---\n![i](p)",
    );
    assert_links_consistent(&doc);
}

#[test]
fn missing_eof_is_synthesized() {
    let mut tokens = tokenize("a *b*");
    let eof = tokens.pop().expect("tokenize always ends with eof");
    assert_eq!(eof.kind, TokenKind::Eof);

    let doc = try_parse(&tokens, &ParseOptions::default()).expect("parsing is total");
    assert_eq!(doc.outline(doc.root()), outline("a *b*"));
    assert!(try_parse(&[], &ParseOptions::default()).is_ok());
}

#[test]
fn pathological_markers_terminate() {
    let input = "**a *b [c ".repeat(25);
    let doc = parse_str(&input);
    assert_links_consistent(&doc);
    let root = doc.root();
    assert_eq!(doc.children(root).len(), 1);

    // Markers of spans that did close are not text, so only the letters are
    // guaranteed to survive.
    let text = doc.text_content(root);
    for letter in ['a', 'b', 'c'] {
        assert_eq!(text.matches(letter).count(), 25);
    }
}

#[test]
fn backtracking_leaves_no_dangling_nodes() {
    let doc = parse_str("[**a** *b*](");
    let attached: Vec<NodeId> = doc.descendants(doc.root());
    assert_eq!(attached.len() + 1, doc.len());
}
