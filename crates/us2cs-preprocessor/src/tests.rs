use crate::scanner::{DirectiveKind, DirectiveScanner};
use crate::{collect_symbols, PreprocessorSymbolReference, SymbolCollector};
use pretty_assertions::assert_eq;
use us2cs_core::ast::SourceFile;

fn conditional_source(condition: &str) -> String {
    format!(
        "function F() {{ \n#if {}\nreturn 10;\n#elif FOO\nreturn 1;\n#endif\n#endif\n }}",
        condition
    )
}

#[test]
fn if_and_elif_are_recorded_with_lines() {
    let symbols = collect_symbols("p.src", &conditional_source("FOO||BAR"));
    assert_eq!(
        symbols,
        vec![
            PreprocessorSymbolReference::new("p.src", 2, "FOO||BAR"),
            PreprocessorSymbolReference::new("p.src", 4, "FOO"),
        ]
    );
}

#[test]
fn expression_text_is_kept_verbatim() {
    for condition in ["BAR", "!BAR", "FOO || BAR", "FOO || !BAR"] {
        let symbols = collect_symbols("preprocessor.js", &conditional_source(condition));
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].expression_text, condition);
        assert_eq!(symbols[0].line_number, 2);
        assert_eq!(symbols[1].expression_text, "FOO");
        assert_eq!(symbols[1].line_number, 4);
    }
}

#[test]
fn structural_directives_are_not_references() {
    let text = "#pragma strict\n#if A\n#else\n#endif\n";
    let kinds: Vec<DirectiveKind> = DirectiveScanner::new(text).map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DirectiveKind::Pragma,
            DirectiveKind::If,
            DirectiveKind::Else,
            DirectiveKind::Endif
        ]
    );
    assert_eq!(collect_symbols("a.js", text).len(), 1);
}

#[test]
fn repeated_expressions_are_not_deduplicated() {
    let text = "#if FOO\n#elif FOO\n#endif\n#if FOO\n#endif";
    let lines: Vec<u32> = collect_symbols("a.js", text)
        .into_iter()
        .map(|symbol| symbol.line_number)
        .collect();
    assert_eq!(lines, vec![1, 2, 4]);
}

#[test]
fn directives_inside_block_comments_are_skipped() {
    let text = "var s = \"/*\";\n/* start\n#if HIDDEN\n*/\n  #if SHOWN // trailing\n#endif";
    assert_eq!(
        collect_symbols("a.js", text),
        vec![PreprocessorSymbolReference::new("a.js", 5, "SHOWN")]
    );
}

#[test]
fn collector_keeps_file_order() {
    let mut collector = SymbolCollector::new();
    assert_eq!(collector.scan_file(&SourceFile::new("b.js", "#if B\n#endif")), 1);
    assert_eq!(collector.scan_file(&SourceFile::new("a.js", "x;\n#if A\n#endif")), 1);
    assert_eq!(collector.scan("c.js", "no directives"), 0);
    assert_eq!(
        collector.into_references(),
        vec![
            PreprocessorSymbolReference::new("b.js", 1, "B"),
            PreprocessorSymbolReference::new("a.js", 2, "A"),
        ]
    );
}
