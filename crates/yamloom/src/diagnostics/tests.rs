use rowan::TextRange;

use super::*;

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

#[test]
fn severity_display() {
    insta::assert_snapshot!(format!("{}", Severity::Error), @"error");
    insta::assert_snapshot!(format!("{}", Severity::Warning), @"warning");
}

#[test]
fn report_with_default_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::TabIndentation, range(0, 1))
        .emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_errors());
    insta::assert_snapshot!(diagnostics.to_string(), @"error at 0..1: tabs are not allowed as indentation");
}

#[test]
fn report_with_custom_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::DuplicateKey, range(3, 4))
        .message("a")
        .emit();

    insta::assert_snapshot!(diagnostics.to_string(), @"error at 3..4: map keys must be unique; `a` is repeated");
}

#[test]
fn warnings_are_not_errors() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::KeyTooLong, range(0, 2000))
        .emit();

    assert!(!diagnostics.has_errors());
    assert!(diagnostics.has_warnings());
    assert_eq!(diagnostics.error_count(), 0);
    assert_eq!(diagnostics.warning_count(), 1);
}

#[test]
fn builder_with_related() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedFlowSeq, range(0, 5))
        .message("primary")
        .related_to("opened here", range(6, 10))
        .emit();

    let result = diagnostics.printer().source("hello world!").render();
    insta::assert_snapshot!(result, @r"
    error: missing closing `]`; primary
      |
    1 | hello world!
      | ^^^^^ ---- opened here
    ");
    insta::assert_snapshot!(diagnostics.to_string(), @"error at 0..5: missing closing `]`; primary (related: opened here at 6..10)");
}

#[test]
fn printer_with_path() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UndefinedAlias, range(3, 5))
        .message("x")
        .emit();

    let result = diagnostics
        .printer()
        .source("a: *x")
        .path("config.yaml")
        .render();
    insta::assert_snapshot!(result, @r"
    error: `*x` does not refer to a preceding anchor
     --> config.yaml:1:4
      |
    1 | a: *x
      |    ^^
    ");
}

#[test]
fn printer_zero_width_span() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::MissingSeparator, TextRange::empty(0.into()))
        .message("expected `,`")
        .emit();

    let result = diagnostics.printer().source("hello").render();
    insta::assert_snapshot!(result, @r"
    error: missing separator: expected `,`
      |
    1 | hello
      | ^
    ");
}

#[test]
fn printer_warning_level() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::KeyTooLong, range(0, 3))
        .message("abc")
        .emit();

    let result = diagnostics.printer().source("abc: 1").render();
    insta::assert_snapshot!(result, @r"
    warning: implicit key `abc` exceeds the key length limit
      |
    1 | abc: 1
      | ^^^
    ");
}

#[test]
fn printer_multiple_diagnostics() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(0, 5))
        .emit();
    diagnostics
        .report(DiagnosticKind::InvalidEscape, range(6, 8))
        .emit();

    let result = diagnostics.printer().source("hello \\q").render();
    insta::assert_snapshot!(result, @r"
    error: unexpected token
      |
    1 | hello \q
      | ^^^^^

    error: invalid escape sequence
      |
    1 | hello \q
      |       ^^
    ");
}

#[test]
fn printer_colored() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(0, 5))
        .message("test")
        .emit();

    let result = diagnostics.printer().source("hello").colored(true).render();
    assert!(result.contains("test"));
    assert!(result.contains('\x1b'));
}

#[test]
fn printer_without_source_is_plain() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(0, 1))
        .emit();
    diagnostics
        .report(DiagnosticKind::KeyTooLong, range(2, 3))
        .emit();

    insta::assert_snapshot!(diagnostics.printer().render(), @r"
    error at 0..1: unexpected token
    warning at 2..3: implicit key is too long
    ");
}

#[test]
fn printer_empty_diagnostics() {
    let diagnostics = Diagnostics::new();
    assert!(diagnostics.printer().source("source").render().is_empty());
}

#[test]
fn diagnostic_kind_suppression_order() {
    assert!(DiagnosticKind::UnclosedFlowMap.suppresses(&DiagnosticKind::MissingSeparator));
    assert!(DiagnosticKind::UnexpectedToken.suppresses(&DiagnosticKind::DuplicateKey));
    assert!(!DiagnosticKind::UnclosedFlowMap.suppresses(&DiagnosticKind::UnclosedFlowMap));
    assert!(!DiagnosticKind::KeyTooLong.suppresses(&DiagnosticKind::UnclosedFlowSeq));
}

#[test]
fn diagnostic_kind_message_rendering() {
    assert_eq!(
        DiagnosticKind::UnterminatedString.message(None),
        "missing closing quote"
    );
    assert_eq!(
        DiagnosticKind::UnterminatedString.message(Some("runs to the end")),
        "missing closing quote; runs to the end"
    );
    assert_eq!(
        DiagnosticKind::UnexpectedFlowMapToken.message(Some("`,`")),
        "flow map contains an unexpected token: `,`"
    );
}

#[test]
fn filtered_keeps_disjoint_spans() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedFlowMap, range(0, 5))
        .emit();
    diagnostics
        .report(DiagnosticKind::DuplicateKey, range(10, 15))
        .emit();

    assert_eq!(diagnostics.filtered().len(), 2);
}

#[test]
fn filtered_structural_error_hides_contained() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedFlowSeq, range(0, 20))
        .emit();
    diagnostics
        .report(DiagnosticKind::MissingSeparator, range(5, 6))
        .emit();

    let filtered = diagnostics.filtered();
    assert_eq!(filtered.kinds(), vec![DiagnosticKind::UnclosedFlowSeq]);
}

#[test]
fn filtered_containment_needs_structural_error() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(0, 20))
        .emit();
    diagnostics
        .report(DiagnosticKind::DuplicateKey, range(5, 6))
        .emit();

    assert_eq!(diagnostics.filtered().len(), 2);
}

#[test]
fn filtered_same_start_keeps_higher_priority() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UndefinedAlias, range(4, 6))
        .emit();
    diagnostics
        .report(DiagnosticKind::InvalidEscape, range(4, 8))
        .emit();

    let filtered = diagnostics.filtered();
    assert_eq!(filtered.kinds(), vec![DiagnosticKind::InvalidEscape]);
}

#[test]
fn split_off_within_partitions_by_start() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(2, 3))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(12, 13))
        .emit();

    let inside = diagnostics.split_off_within(range(0, 10));
    assert_eq!(inside.len(), 1);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics.iter().next().map(|d| d.range()),
        Some(range(12, 13))
    );
}

#[test]
fn sort_is_stable_by_position() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::DuplicateKey, range(8, 9))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(1, 2))
        .emit();
    diagnostics
        .report(DiagnosticKind::InvalidEscape, range(1, 3))
        .emit();
    diagnostics.sort();

    assert_eq!(
        diagnostics.kinds(),
        vec![
            DiagnosticKind::UnexpectedToken,
            DiagnosticKind::InvalidEscape,
            DiagnosticKind::DuplicateKey,
        ]
    );
}

#[test]
fn serializes_as_json() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::KeyTooLong, range(0, 4))
        .emit();

    let json = serde_json::to_string(&diagnostics).unwrap();
    insta::assert_snapshot!(json, @r#"[{"kind":"key_too_long","severity":"warning","message":"implicit key is too long","range":{"start":0,"end":4}}]"#);
}

#[test]
fn printer_drops_trailing_line_break_from_span() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnterminatedString, range(3, 9))
        .emit();

    let result = diagnostics.printer().source("a: 'open\n").render();
    insta::assert_snapshot!(result, @r"
    error: missing closing quote
      |
    1 | a: 'open
      |    ^^^^^
    ");
}

#[test]
fn printer_can_hide_cascades() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedFlowMap, range(0, 10))
        .emit();
    diagnostics
        .report(DiagnosticKind::MissingSeparator, range(4, 5))
        .emit();

    let all = diagnostics.printer().render();
    let filtered = diagnostics.printer().cascades(false).render();
    assert_eq!(all.lines().count(), 2);
    insta::assert_snapshot!(filtered, @"error at 0..10: missing closing `}`");
}

#[test]
fn printer_plain_lines_carry_the_path() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::DuplicateKey, range(5, 6))
        .message("a")
        .emit();

    insta::assert_snapshot!(diagnostics.printer().path("a.yaml").render(), @"a.yaml: error at 5..6: map keys must be unique; `a` is repeated");
}
