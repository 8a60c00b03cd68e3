use std::error::Error;

use helpmark_core::{
    AnchorId, CompileError, DocPart, Document, HeadingLevel, compile, compile_str, parse,
};

fn text(text: &str) -> DocPart {
    DocPart::text(text)
}

fn bold(text: &str) -> DocPart {
    DocPart::StyledText {
        text: text.to_string(),
        bold: true,
        italic: false,
    }
}

fn italic(text: &str) -> DocPart {
    DocPart::StyledText {
        text: text.to_string(),
        bold: false,
        italic: true,
    }
}

fn bold_italic(text: &str) -> DocPart {
    DocPart::StyledText {
        text: text.to_string(),
        bold: true,
        italic: true,
    }
}

fn heading(level: HeadingLevel, text: &str) -> DocPart {
    DocPart::Heading {
        level,
        text: text.to_string(),
    }
}

fn image(name: &str) -> DocPart {
    DocPart::Image {
        name: name.to_string(),
    }
}

fn check(source: &str, title: Option<&str>, want: &[DocPart]) -> Result<(), Box<dyn Error>> {
    let document: Document = compile_str(source)?;
    assert_eq!(document.title.as_deref(), title, "title of {:?}", source);
    assert_eq!(document.parts, want, "parts of {:?}", source);
    Ok(())
}

fn compile_error(source: &str) -> CompileError {
    match compile_str(source) {
        Ok(document) => panic!("expected an error for {:?}, got {:?}", source, document),
        Err(err) => err,
    }
}

#[test]
fn document_title() -> Result<(), Box<dyn Error>> {
    check(
        "=====\nTitle\n=====",
        Some("Title"),
        &[heading(HeadingLevel::Title, "Title")],
    )
}

#[test]
fn title_followed_by_caption() -> Result<(), Box<dyn Error>> {
    check(
        "===\nTitle\n===\nCaption\n=======",
        Some("Title"),
        &[
            heading(HeadingLevel::Title, "Title"),
            heading(HeadingLevel::Caption, "Caption"),
        ],
    )
}

#[test]
fn second_title_is_an_error() {
    let err = compile_error("===\nTitle\n===\n===\n2nd\n===");
    assert_eq!(
        err,
        CompileError::DuplicateTitle {
            first_line: 2,
            second_line: 5,
        }
    );
    assert_eq!(
        err.to_string(),
        "title defined in line 2 is redefined in line 5, there can only be one title"
    );
}

#[test]
fn titles_are_never_styled() -> Result<(), Box<dyn Error>> {
    let title = "*no bold* /nor italic/ [nor references]";
    check(
        &format!("===\n{}\n===", title),
        Some(title),
        &[heading(HeadingLevel::Title, title)],
    )
}

#[test]
fn plain_lines_keep_their_breaks() -> Result<(), Box<dyn Error>> {
    check("This is plain text.", None, &[text("This is plain text.")])?;
    check("Line one\nLine two", None, &[text("Line one\nLine two")])
}

#[test]
fn trailing_newline_ends_with_a_break() -> Result<(), Box<dyn Error>> {
    check("Line one\n", None, &[text("Line one\n")])
}

#[test]
fn windows_and_classic_mac_breaks_are_normalized() -> Result<(), Box<dyn Error>> {
    check("Line one\r\nLine two", None, &[text("Line one\nLine two")])?;
    check("Line one\rLine two", None, &[text("Line one\nLine two")])
}

#[test]
fn empty_input_is_an_empty_document() -> Result<(), Box<dyn Error>> {
    check("", None, &[])
}

#[test]
fn invalid_utf8_is_replaced() -> Result<(), Box<dyn Error>> {
    let document = compile(b"caf\xe9 au lait")?;
    assert_eq!(document.parts, vec![text("caf\u{fffd} au lait")]);
    Ok(())
}

#[test]
fn variables_can_only_be_defined_once() {
    let err = compile_error("[\\var=text]\n[\\var=text]");
    assert_eq!(
        err,
        CompileError::VariableRedefined {
            name: "var".to_string(),
            first_line: 1,
            second_line: 2,
        }
    );
    assert_eq!(
        err.to_string(),
        "variable 'var' defined in line 1 is redefined in line 2, each variable can only be defined once"
    );
}

#[test]
fn variables_work_before_and_after_their_definition() -> Result<(), Box<dyn Error>> {
    check(
        "[\\v=X]\nbefore [v] after",
        None,
        &[text("before X after")],
    )?;
    check(
        "before [v] after\n[\\v=X]",
        None,
        &[text("before X after")],
    )
}

#[test]
fn variables_hold_verbatim_text() -> Result<(), Box<dyn Error>> {
    check("[\\var=*not bold*]\n[var]", None, &[text("*not bold*")])
}

#[test]
fn invalid_variable_names_stay_in_the_text() {
    let err = compile_error("[\\a-b=1]");
    match err {
        CompileError::UnresolvedReference { target, line, .. } => {
            assert_eq!(target, "\\a-b=1");
            assert_eq!(line, 1);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn bold_and_italic() -> Result<(), Box<dyn Error>> {
    check("*bold*", None, &[bold("bold")])?;
    check("/italic/", None, &[italic("italic")])?;
    check(
        "/File/->/Exit/",
        None,
        &[italic("File"), text("->"), italic("Exit")],
    )?;
    check(
        "*bold* nothing /italic/",
        None,
        &[bold("bold"), text(" nothing "), italic("italic")],
    )?;
    check(
        "ends in *bold*.",
        None,
        &[text("ends in "), bold("bold"), text(".")],
    )
}

#[test]
fn combined_emphasis() -> Result<(), Box<dyn Error>> {
    check("*/both/*", None, &[bold_italic("both")])?;
    check("/*both*/", None, &[bold_italic("both")])?;
    check("*/*", None, &[bold("/")])
}

#[test]
fn unmatched_delimiters_are_literal() -> Result<(), Box<dyn Error>> {
    check("not* bold*", None, &[text("not* bold*")])?;
    check("a * b * c", None, &[text("a * b * c")])?;
    check("tab*\tx*", None, &[text("tab*\tx*")])
}

#[test]
fn styles_do_not_overlap_or_nest() -> Result<(), Box<dyn Error>> {
    check(
        "*bold /both* italic/",
        None,
        &[bold("bold /both"), text(" italic/")],
    )?;
    check(
        "*bold /NOT italic!/ bold again*",
        None,
        &[bold("bold /NOT italic!/ bold again")],
    )
}

#[test]
fn styled_text_substitutes_variables() -> Result<(), Box<dyn Error>> {
    check(
        "[\\var=some text]\n*here is [var]*",
        None,
        &[bold("here is some text")],
    )?;
    check(
        "[\\var=some text]\n*here is [var] and again [var]*",
        None,
        &[bold("here is some text and again some text")],
    )
}

#[test]
fn headings_substitute_variables() -> Result<(), Box<dyn Error>> {
    check(
        "===\n[title]\n===\n[\\title=abc]",
        Some("abc"),
        &[heading(HeadingLevel::Title, "abc")],
    )
}

#[test]
fn escaped_special_characters() -> Result<(), Box<dyn Error>> {
    for ch in ["*", "/", "=", "-", "."] {
        check(&format!("[{}]", ch), None, &[text(ch)])?;
    }
    check("[[]", None, &[text("[")])?;
    check("a [[]b] c", None, &[text("a [b] c")])
}

#[test]
fn image_references_need_an_image_extension() -> Result<(), Box<dyn Error>> {
    for name in [
        "image.png",
        "image.JPG",
        "image.jPeg",
        "image.BMP",
        "image.gif",
        ".png",
        "pic.PNG",
    ] {
        check(&format!("[{}]", name), None, &[image(name)])?;
    }
    match compile_error("[no-image.txt]") {
        CompileError::UnresolvedReference { target, line, .. } => {
            assert_eq!(target, "no-image.txt");
            assert_eq!(line, 1);
        }
        other => panic!("unexpected error {:?}", other),
    }
    Ok(())
}

#[test]
fn caption_levels() -> Result<(), Box<dyn Error>> {
    check(
        "\nChapter\n=======\nSubchapter\n----------\nSubsubchapter\n.............",
        None,
        &[
            text("\n"),
            heading(HeadingLevel::Caption, "Chapter"),
            heading(HeadingLevel::SubCaption, "Subchapter"),
            heading(HeadingLevel::SubSubCaption, "Subsubchapter"),
        ],
    )
}

#[test]
fn consecutive_captions_are_not_a_title() -> Result<(), Box<dyn Error>> {
    check(
        "\nCaption 1\n=========\nCaption 2\n=========\nCaption 3\n=========",
        None,
        &[
            text("\n"),
            heading(HeadingLevel::Caption, "Caption 1"),
            heading(HeadingLevel::Caption, "Caption 2"),
            heading(HeadingLevel::Caption, "Caption 3"),
        ],
    )
}

#[test]
fn blank_lines_never_become_headings() -> Result<(), Box<dyn Error>> {
    check("a\n   \n-----", None, &[text("a\n   \n")])
}

#[test]
fn short_rules_are_text() -> Result<(), Box<dyn Error>> {
    check("Caption\n==", None, &[text("Caption\n==")])
}

#[test]
fn single_caption() -> Result<(), Box<dyn Error>> {
    check(
        "chap 1\n=====",
        None,
        &[heading(HeadingLevel::Caption, "chap 1")],
    )
}

#[test]
fn references_to_captions_are_resolved() -> Result<(), Box<dyn Error>> {
    check(
        "chap 1\n=====\n[chap 1]",
        None,
        &[
            DocPart::LinkTarget(AnchorId(1)),
            heading(HeadingLevel::Caption, "chap 1"),
            DocPart::Link {
                target: AnchorId(1),
                text: "chap 1".to_string(),
            },
        ],
    )
}

#[test]
fn references_can_have_their_own_text() -> Result<(), Box<dyn Error>> {
    check(
        "chap 1\n------\n[this is a link[chap 1]]",
        None,
        &[
            DocPart::LinkTarget(AnchorId(1)),
            heading(HeadingLevel::SubCaption, "chap 1"),
            DocPart::Link {
                target: AnchorId(1),
                text: "this is a link".to_string(),
            },
        ],
    )
}

#[test]
fn empty_inner_target_behaves_like_a_single_reference() -> Result<(), Box<dyn Error>> {
    check("[\\v=value]\n[v[]]", None, &[text("value")])
}

#[test]
fn malformed_references_are_literal() -> Result<(), Box<dyn Error>> {
    check("[] and [ x] and [open", None, &[text("[] and [ x] and [open")])
}

#[test]
fn unknown_reference_names_token_line_and_column() {
    let err = compile_error("first\nsecond [who] line");
    assert_eq!(
        err,
        CompileError::UnresolvedReference {
            target: "who".to_string(),
            line: 2,
            column: 8,
        }
    );
    assert_eq!(
        err.to_string(),
        "unknown link target 'who' in line 2, column 8"
    );
}

#[test]
fn web_references_gain_http_when_needed() -> Result<(), Box<dyn Error>> {
    let cases = [
        ("[www.google.com]", "http://www.google.com", "www.google.com"),
        (
            "[http://www.google.com]",
            "http://www.google.com",
            "http://www.google.com",
        ),
        (
            "[https://www.google.com]",
            "https://www.google.com",
            "https://www.google.com",
        ),
        ("[some link[www.google.com]]", "http://www.google.com", "some link"),
    ];
    for (source, url, display) in cases {
        check(
            source,
            None,
            &[DocPart::ExternalLink {
                url: url.to_string(),
                text: display.to_string(),
            }],
        )?;
    }
    Ok(())
}

#[test]
fn mail_references_gain_mailto() -> Result<(), Box<dyn Error>> {
    let cases = [
        ("[blah@mail.com]", "blah@mail.com"),
        ("[mailto:blah@mail.com]", "blah@mail.com"),
        ("[My Mail[blah@mail.com]]", "My Mail"),
        ("[Jo <jo@mail.com>]", "jo@mail.com"),
    ];
    for (source, display) in cases {
        let document = compile_str(source)?;
        match document.parts.as_slice() {
            [DocPart::ExternalLink { url, text }] => {
                assert!(url.starts_with("mailto:"), "url of {:?}", source);
                assert!(url.ends_with("@mail.com"), "url of {:?}", source);
                assert_eq!(text, display, "display text of {:?}", source);
            }
            other => panic!("unexpected parts for {:?}: {:?}", source, other),
        }
    }
    Ok(())
}

#[test]
fn parse_leaves_references_pending() -> Result<(), Box<dyn Error>> {
    let document = parse("see [Missing] now")?;
    assert!(document.has_pending_references());
    match &document.parts[1] {
        DocPart::PendingReference(pending) => {
            assert_eq!(pending.target, "Missing");
            assert_eq!(pending.display_text(), "Missing");
            assert_eq!(pending.line, 1);
            assert_eq!(pending.column, 5);
        }
        other => panic!("expected a pending reference, got {:?}", other),
    }
    Ok(())
}

#[test]
fn columns_count_characters_not_bytes() {
    match compile_error("Größe [x]") {
        CompileError::UnresolvedReference { column, .. } => assert_eq!(column, 7),
        other => panic!("unexpected error {:?}", other),
    }
}
