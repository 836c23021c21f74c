//! End-to-end tests for strawk
//!
//! These run complete programs through the lexer/parser/interpreter
//! pipeline and check the output.

use strawk::{Interpreter, Lexer, Parser};

/// Run a strawk program over the given input stream and return stdout
fn run_strawk(program: &str, input: &str) -> Result<String, String> {
    let mut parser = Parser::new(Lexer::new(program));
    let ast = parser.parse_program();
    if !parser.errors().is_empty() {
        return Err(parser.errors().join("\n"));
    }

    let mut interpreter = Interpreter::new(&ast, input);
    let mut output = Vec::new();
    interpreter.run(&mut output).map_err(|e| e.to_string())?;
    String::from_utf8(output).map_err(|e| e.to_string())
}

// ============================================================================
// Basic output
// ============================================================================

#[test]
fn test_begin_hello() {
    let output = run_strawk(r#"BEGIN { print "hi" }"#, "").unwrap();
    assert_eq!(output, "hi\n");
}

#[test]
fn test_print_number_formats() {
    assert_eq!(run_strawk("BEGIN { print 42 }", "").unwrap(), "42\n");
    assert_eq!(run_strawk("BEGIN { print 2.5 }", "").unwrap(), "2.5\n");
    assert_eq!(
        run_strawk("BEGIN { print 3.14159 }", "").unwrap(),
        "3.1416\n"
    );
}

#[test]
fn test_print_joins_with_single_space() {
    assert_eq!(
        run_strawk(r#"BEGIN { print "a", "b", "c" }"#, "").unwrap(),
        "a b c\n"
    );
}

#[test]
fn test_arithmetic_and_concatenation() {
    let output = run_strawk("BEGIN { x = 2; y = 3; print x + y, x . y }", "").unwrap();
    assert_eq!(output, "5 23\n");
}

#[test]
fn test_implicit_concatenation() {
    assert_eq!(
        run_strawk(r#"BEGIN { print "a" "b" "c" }"#, "").unwrap(),
        "abc\n"
    );
}

// ============================================================================
// Stream matching
// ============================================================================

#[test]
fn test_stream_match_consumes_matches() {
    let output = run_strawk("/foo/ { print $0 }", "xxfoozfoo").unwrap();
    assert_eq!(output, "foo\nfoo\n");
}

#[test]
fn test_record_is_empty_at_end() {
    let output = run_strawk(
        "/foo/ { seen += 1 }\nEND { print seen, \"[\" $0 \"]\" }",
        "xxfoozfoo",
    )
    .unwrap();
    assert_eq!(output, "2 []\n");
}

#[test]
fn test_capture_groups_reach_the_block() {
    let output = run_strawk("/([0-9]+)/ { print $1 }", "aa12bb34").unwrap();
    assert_eq!(output, "12\n34\n");
}

#[test]
fn test_longest_prefix_wins() {
    // The match must extend across the whole digit run, not stop at the
    // first digit that satisfies the pattern
    let output = run_strawk("/([0-9]+)/ { print $1 }", "x123456y").unwrap();
    assert_eq!(output, "123456\n");
}

#[test]
fn test_multiple_capture_groups() {
    let output = run_strawk("/(a+)(b+)/ { print $2, $1 }", "zaabbbz").unwrap();
    assert_eq!(output, "bbb aa\n");
}

#[test]
fn test_stale_captures_do_not_leak() {
    // The second block fires on a match with no groups; $1 from the
    // earlier rule must not leak in
    let output = run_strawk(
        "/([0-9]+)x/ { print \"digits\", $1 }\n/q/ { print \"q[\" $1 \"]\" }",
        "12x q",
    )
    .unwrap();
    assert_eq!(output, "digits 12\nq[]\n");
}

#[test]
fn test_non_consuming_match() {
    // An explicit ~ never touches the cursor: the record keeps growing
    // and keeps matching at every later position
    let output = run_strawk("$0 ~ /a/ { hits += 1 }\nEND { print hits }", "abc").unwrap();
    assert_eq!(output, "3\n");
}

#[test]
fn test_not_match_operator() {
    let output = run_strawk(
        "BEGIN { misses = 0 }\n$0 !~ /a/ { misses += 1 }\nEND { print misses }",
        "abc",
    )
    .unwrap();
    assert_eq!(output, "0\n");
}

// ============================================================================
// Boundary behaviors
// ============================================================================

#[test]
fn test_empty_input_runs_begin_and_end_only() {
    let output = run_strawk(
        "BEGIN { print \"b\" }\n{ print \"rule\" }\nEND { print \"e\" }",
        "",
    )
    .unwrap();
    assert_eq!(output, "b\ne\n");
}

#[test]
fn test_empty_program_does_nothing() {
    assert_eq!(run_strawk("", "some input").unwrap(), "");
}

#[test]
fn test_one_byte_input_runs_rules_once() {
    let output = run_strawk("{ a[1]=10; a[2]=20; for (k in a) s += a[k]; print s }", "x").unwrap();
    assert_eq!(output, "30\n");
}

#[test]
fn test_hash_inside_regex_is_not_a_comment() {
    let output = run_strawk("/a#b/ { print $0 }", "xa#bz").unwrap();
    assert_eq!(output, "a#b\n");
}

#[test]
fn test_division_vs_regex() {
    // a/b/c in infix context is division twice
    let output = run_strawk("BEGIN { a = 10; b = 5; c = 2; print a / b / c }", "").unwrap();
    assert_eq!(output, "1\n");
}

// ============================================================================
// Expressions and control flow
// ============================================================================

#[test]
fn test_ternary() {
    let output = run_strawk(r#"BEGIN { x = 5; print x > 3 ? "big" : "small" }"#, "").unwrap();
    assert_eq!(output, "big\n");
}

#[test]
fn test_boolean_encoding_is_observable() {
    assert_eq!(run_strawk("BEGIN { print 1 == 1 }", "").unwrap(), "1\n");
    assert_eq!(run_strawk("BEGIN { print 1 == 2 }", "").unwrap(), "0\n");
    assert_eq!(run_strawk("BEGIN { print !0 }", "").unwrap(), "1\n");
}

#[test]
fn test_comparison_rules() {
    // Both numbers: numeric comparison
    assert_eq!(run_strawk("BEGIN { print 10 > 2 }", "").unwrap(), "1\n");
    // Any string side: string comparison, so "10" < "2"
    assert_eq!(
        run_strawk(r#"BEGIN { print "10" < "2" }"#, "").unwrap(),
        "1\n"
    );
}

#[test]
fn test_equality_compares_string_forms() {
    assert_eq!(run_strawk(r#"BEGIN { print "5" == 5 }"#, "").unwrap(), "1\n");
}

#[test]
fn test_numeric_coercion_of_strings() {
    assert_eq!(
        run_strawk(r#"BEGIN { print "4" + 1, "abc" + 1 }"#, "").unwrap(),
        "5 1\n"
    );
}

#[test]
fn test_compound_assignments() {
    let output = run_strawk(
        "BEGIN { x = 10; x += 5; x -= 3; x *= 2; x /= 4; x %= 4; x ^= 2; print x }",
        "",
    )
    .unwrap();
    // ((10+5-3)*2/4) % 4 = 2, then 2^2 = 4
    assert_eq!(output, "4\n");
}

#[test]
fn test_increment_decrement() {
    assert_eq!(
        run_strawk("BEGIN { x = 1; print ++x; print x }", "").unwrap(),
        "2\n2\n"
    );
    // Postfix yields the old value
    assert_eq!(
        run_strawk("BEGIN { x = 1; print x++; print x }", "").unwrap(),
        "1\n2\n"
    );
}

#[test]
fn test_parallel_assignment() {
    assert_eq!(
        run_strawk("BEGIN { x, y = 1, 2; print x, y }", "").unwrap(),
        "1 2\n"
    );
}

#[test]
fn test_while_and_break_continue() {
    let output = run_strawk(
        "BEGIN { i = 0; while 1 { i += 1; if i == 2 { continue } if i > 4 { break } print i } }",
        "",
    )
    .unwrap();
    assert_eq!(output, "1\n3\n4\n");
}

#[test]
fn test_do_while() {
    let output = run_strawk("BEGIN { i = 0; do { print i; i += 1 } while i < 2 }", "").unwrap();
    assert_eq!(output, "0\n1\n");
}

#[test]
fn test_c_style_for() {
    let output = run_strawk("BEGIN { for (i = 0; i < 3; i++) { s += i } print s }", "").unwrap();
    assert_eq!(output, "3\n");
}

#[test]
fn test_if_else_chain() {
    let program = "BEGIN { x = 2; if x == 1 { print \"one\" } else if x == 2 { print \"two\" } else { print \"many\" } }";
    assert_eq!(run_strawk(program, "").unwrap(), "two\n");
}

// ============================================================================
// Arrays
// ============================================================================

#[test]
fn test_auto_vivification() {
    let output = run_strawk(r#"BEGIN { a["k"] = 7; print a["k"] }"#, "").unwrap();
    assert_eq!(output, "7\n");
}

#[test]
fn test_comma_joined_keys() {
    let output = run_strawk("BEGIN { a[1, 2] = 5; print a[1, 2] }", "").unwrap();
    assert_eq!(output, "5\n");
}

#[test]
fn test_membership() {
    let output = run_strawk(
        r#"BEGIN { a["k"] = 1; print "k" in a, "z" in a }"#,
        "",
    )
    .unwrap();
    assert_eq!(output, "1 0\n");
}

#[test]
fn test_membership_with_key_list() {
    let output = run_strawk("BEGIN { a[1, 2] = 5; print (1, 2) in a }", "").unwrap();
    assert_eq!(output, "1\n");
}

#[test]
fn test_delete() {
    let output = run_strawk(
        "BEGIN { a[1] = 1; a[2] = 2; delete a[1]; print length(a) }",
        "",
    )
    .unwrap();
    assert_eq!(output, "1\n");
}

#[test]
fn test_indexing_scalar_is_fatal() {
    let err = run_strawk("BEGIN { x = 1; print x[1] }", "").unwrap_err();
    assert!(err.contains("scalar"));
}

#[test]
fn test_array_in_scalar_context_is_fatal() {
    let err = run_strawk("BEGIN { a[1] = 1; print a + 1 }", "").unwrap_err();
    assert!(err.contains("array in scalar context"));
}

#[test]
fn test_missing_names_read_as_empty() {
    assert_eq!(
        run_strawk(r#"BEGIN { print "[" nothing "]" }"#, "").unwrap(),
        "[]\n"
    );
}

// ============================================================================
// Rules and next
// ============================================================================

#[test]
fn test_rules_evaluate_in_source_order() {
    let output = run_strawk(
        "$0 ~ /a/ { print \"first\" }\n$0 ~ /a/ { print \"second\" }",
        "a",
    )
    .unwrap();
    assert_eq!(output, "first\nsecond\n");
}

#[test]
fn test_next_skips_remaining_rules() {
    let output = run_strawk(
        "$0 ~ /a/ { print \"first\"; next }\n$0 ~ /a/ { print \"second\" }",
        "a",
    )
    .unwrap();
    assert_eq!(output, "first\n");
}

// ============================================================================
// User-defined functions
// ============================================================================

#[test]
fn test_function_call_and_return() {
    let program = "function add(a, b) { return a + b }\nBEGIN { print add(2, 3) }";
    assert_eq!(run_strawk(program, "").unwrap(), "5\n");
}

#[test]
fn test_recursive_function() {
    let program =
        "function fact(n) { if n <= 1 { return 1 } return n * fact(n - 1) }\nBEGIN { print fact(5) }";
    assert_eq!(run_strawk(program, "").unwrap(), "120\n");
}

#[test]
fn test_parameters_do_not_clobber_globals() {
    let program = "function f(x) { x = 99; return x }\nBEGIN { x = 1; f(x); print x }";
    assert_eq!(run_strawk(program, "").unwrap(), "1\n");
}

#[test]
fn test_missing_arguments_bind_empty() {
    let program = "function f(a, b) { return \"[\" b \"]\" }\nBEGIN { print f(1) }";
    assert_eq!(run_strawk(program, "").unwrap(), "[]\n");
}

// ============================================================================
// Built-in functions
// ============================================================================

#[test]
fn test_stdlib_scenario() {
    let output = run_strawk(
        r#"BEGIN { print substr("abcdef", 1, 3), index("abc", "b"), length("xyz") }"#,
        "",
    )
    .unwrap();
    assert_eq!(output, "bcd 1 3\n");
}

#[test]
fn test_split_and_iterate() {
    let output = run_strawk(
        r#"BEGIN { parts = split("a:b:c", ":"); print parts[1], parts[2], parts[3] }"#,
        "",
    )
    .unwrap();
    assert_eq!(output, "a b c\n");
}

#[test]
fn test_gsub_is_idempotent_when_replacement_has_no_match() {
    let once = run_strawk(r#"BEGIN { print gsub(/o+/, "0", "foo boo") }"#, "").unwrap();
    let twice = run_strawk(
        r#"BEGIN { print gsub(/o+/, "0", gsub(/o+/, "0", "foo boo")) }"#,
        "",
    )
    .unwrap();
    assert_eq!(once, "f0 b0\n");
    assert_eq!(once, twice);
}

#[test]
fn test_case_round_trip_is_lowercase_and_length_preserving() {
    let output = run_strawk(
        r#"BEGIN { s = "MiXeD"; t = tolower(toupper(s)); print t, length(t) == length(s) }"#,
        "",
    )
    .unwrap();
    assert_eq!(output, "mixed 1\n");
}

#[test]
fn test_match_returns_zero_based_start() {
    assert_eq!(
        run_strawk(r#"BEGIN { print match("xxab", /ab/) }"#, "").unwrap(),
        "2\n"
    );
}

// ============================================================================
// Error reporting
// ============================================================================

#[test]
fn test_parse_errors_carry_line_numbers() {
    let err = run_strawk("x = 1\n] nonsense", "").unwrap_err();
    assert!(err.contains("Parse Error on line 2"), "got: {}", err);
}

#[test]
fn test_parse_error_recovery_reports_all_errors() {
    let err = run_strawk("] one\n] two", "").unwrap_err();
    let count = err.matches("Parse Error").count();
    assert_eq!(count, 2, "got: {}", err);
}
