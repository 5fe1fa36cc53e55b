#[macro_use]
mod common;

lox_test!(string_literals_print_without_quotes, r#"print "hello world";"#, lines = ["hello world"]);

lox_test!(string_equality_compares_by_content, r#"print "a" == "a"; print "a" == "b";"#, lines = ["true", "false"]);

lox_test!(
    an_unterminated_string_is_a_compile_error,
    "\"unterminated",
    compile_error = "Unterminated string."
);

lox_test!(
    strings_span_multiple_source_lines,
    "print \"line one\nline two\";",
    lines = ["line one\nline two"]
);
