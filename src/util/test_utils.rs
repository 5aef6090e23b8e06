use crate::{codegen, lexer, parser, util::fmt::tree};

/// Each variant contains the input.
#[derive(Copy, Clone)]
pub enum Test {
    ParserProgram(&'static str),
    CodegenProgram(&'static str),
}

pub enum Assertion {
    TreeOk(&'static str),
    IrOk(&'static str),
    ExpectedErrors(&'static [&'static str]),
}

/// Module name given to every program compiled by the tests.
pub const TEST_MODULE: &str = "test.py";

/// Runs the stages named by `test`, returning the printed output of the last
/// one (empty if an earlier stage failed) along with the formatted errors.
#[track_caller]
pub fn run_pipeline(test: Test) -> (String, Vec<String>) {
    let (Test::ParserProgram(input) | Test::CodegenProgram(input)) = test;
    let tokens = match lexer::lex(input) {
        Ok(tokens) => tokens,
        Err(error) => return (String::new(), vec![format!("{error:#}")]),
    };
    let module = match parser::parse(&tokens) {
        Ok(module) => module,
        Err(error) => return (String::new(), vec![format!("{error:#}")]),
    };

    match test {
        Test::ParserProgram(_) => (tree::print_module_string(&module), vec![]),
        Test::CodegenProgram(_) => match codegen::generate(&module, TEST_MODULE) {
            Ok(ir) => (ir.to_string(), vec![]),
            Err(error) => (String::new(), vec![format!("{error:#}")]),
        },
    }
}

#[track_caller]
pub fn run_assertion(
    assertion: Assertion,
    formatted_actual_output: &str,
    formatted_actual_errors: &[String],
) {
    match assertion {
        Assertion::TreeOk(expected) | Assertion::IrOk(expected) => {
            let expected_errors: &[&str] = &[];
            ::pretty_assertions::assert_eq!(formatted_actual_errors, expected_errors);
            ::pretty_assertions::assert_eq!(formatted_actual_output.trim(), expected.trim());
        }
        Assertion::ExpectedErrors(expected_errors) => {
            ::pretty_assertions::assert_eq!(formatted_actual_errors, expected_errors);
        }
    }
}

macro_rules! tree_tests {
    (
        use $test_kind:ident;

        $(
            fn $test_name:ident() {
                let $source_kind:ident = $source:expr;
                $($assertions_tt:tt)*
            }
        )*
    ) => {
        $(
            #[test]
            fn $test_name() {
                let test: crate::util::test_utils::Test =
                    tree_tests!(@@get_test($test_kind, $source_kind), $source);
                let (formatted_actual_output, formatted_actual_errors) =
                    crate::util::test_utils::run_pipeline(test);
                let ctx = (&formatted_actual_output, &formatted_actual_errors);
                tree_tests!(@@expand_assertions, ctx, [$($assertions_tt)*]);
            }
        )*
    };

    (@@expand_assertions, $ctx:expr, []) => {};
    (@@expand_assertions, $ctx:expr, [
        let $assertion:ident = $assertion_expected:expr;
        $($rest_assertions_tt:tt)*
    ]) => {
        crate::util::test_utils::run_assertion(
            tree_tests!(@@assertion, $assertion, $assertion_expected),
            $ctx.0,
            $ctx.1,
        );
        tree_tests!(@@expand_assertions, $ctx, [$($rest_assertions_tt)*]);
    };

    (@@assertion, tree_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, ir_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::IrOk(::indoc::indoc! { $expected })
    };
    (@@assertion, expected_errors, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedErrors($expected)
    };

    (@@get_test(parser, program), $source:expr) => {
        crate::util::test_utils::Test::ParserProgram($source)
    };
    (@@get_test(codegen, program), $source:expr) => {
        crate::util::test_utils::Test::CodegenProgram($source)
    };
}
pub(crate) use tree_tests;
