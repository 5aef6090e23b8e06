use pretty_assertions::assert_eq;

use crate::{
    compile,
    ir::{Instruction, IntPredicate},
    util::test_utils::{tree_tests, TEST_MODULE},
};

const FACTORIAL: &str = "\
def factorial(n):
\tif n <= 1:
\t\treturn 1
\telse:
\t\treturn n * factorial(n - 1)
for i in range(5):
\tprint(factorial(i + 1))
";

fn compile_ok(src: &str) -> crate::ir::Module {
    match compile(src, TEST_MODULE) {
        Ok(module) => module,
        Err(error) => panic!("{error:#}"),
    }
}

#[test]
fn test_main_comes_first_and_blocks_are_terminated() {
    let module = compile_ok(FACTORIAL);
    let names: Vec<_> = module.functions.iter().map(|f| &*f.name).collect();
    assert_eq!(names, ["main", "factorial"]);

    for function in &module.functions {
        assert_eq!(&*function.blocks[0].label, "entry");
        for block in &function.blocks {
            assert!(
                block.terminator().is_some(),
                "{}:{} has no terminator",
                function.name,
                block.label
            );
        }
    }

    let factorial = module.function("factorial").unwrap();
    let recursive = factorial.callees().filter(|&c| c == "factorial").count();
    assert_eq!(recursive, 1);
    let merge = factorial.block("merge").unwrap();
    assert!(matches!(merge.terminator(), Some(Instruction::Ret { .. })));
    let main = module.function("main").unwrap();
    let callees: Vec<_> = main.callees().collect();
    assert_eq!(callees, ["factorial", "print_i32"]);
}

#[test]
fn test_output_is_deterministic() {
    let first = compile_ok(FACTORIAL).to_string();
    let second = compile_ok(FACTORIAL).to_string();
    assert_eq!(first, second);
}

#[test]
fn test_len_is_a_constant() {
    let module = compile_ok("x = [1, 2, 3]\nprint(len(x))\nprint(len(\"four\"))\n");
    let main = module.function("main").unwrap();
    let printed: Vec<_> = main
        .instructions()
        .filter_map(|i| match i {
            Instruction::Call { callee, args, .. } if &**callee == "print_i32" => {
                Some(args[0].to_string())
            }
            _ => None,
        })
        .collect();
    assert_eq!(printed, ["3", "4"]);
    // The list is only touched by its initialisation.
    let loads = main
        .instructions()
        .filter(|i| matches!(i, Instruction::Load { .. }))
        .count();
    assert_eq!(loads, 0);
    assert!(module.globals.is_empty());
}

#[test]
fn test_comparison_signedness() {
    let predicates = |src: &str| -> Vec<IntPredicate> {
        compile_ok(src)
            .function("main")
            .unwrap()
            .instructions()
            .filter_map(|i| match i {
                Instruction::Icmp { predicate, .. } => Some(*predicate),
                _ => None,
            })
            .collect()
    };

    assert_eq!(
        predicates("s = \"ab\"\nb = s[0] > s[1]\nc = s[0] <= s[1]\n"),
        [IntPredicate::Ugt, IntPredicate::Ule]
    );
    assert_eq!(
        predicates("l = [1, 2]\nb = l[0] > l[1]\nc = l[0] < 0\n"),
        [IntPredicate::Sgt, IntPredicate::Slt]
    );
}

#[test]
fn test_nested_definitions_are_hoisted() {
    let module = compile_ok("def outer(a):\n\tdef inner(b):\n\t\treturn b * 2\n\treturn inner(a)\n");
    let names: Vec<_> = module.functions.iter().map(|f| &*f.name).collect();
    assert_eq!(names, ["main", "inner", "outer"]);
}

#[test]
fn test_unreachable_statements_are_dropped() {
    let module = compile_ok("def f():\n\treturn 1\n\tprint(2)\n");
    let f = module.function("f").unwrap();
    assert_eq!(f.blocks.len(), 1);
    assert_eq!(f.callees().count(), 0);
    assert_eq!(f.blocks[0].instructions.len(), 1);
}

#[test]
fn test_list_assignment_shares_the_array() {
    let module = compile_ok("a = [1, 2]\nb = [3, 4]\na = b\nb[0] = 9\nprint(a[0])\n");
    let main = module.function("main").unwrap();
    let stores: Vec<_> = main
        .instructions()
        .filter(|i| matches!(i, Instruction::Store { .. }))
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        stores,
        [
            "store i32 1, i32* %elem",
            "store i32 2, i32* %elem.1",
            "store [2 x i32]* %list, [2 x i32]** %a",
            "store i32 3, i32* %elem.2",
            "store i32 4, i32* %elem.3",
            "store [2 x i32]* %list.1, [2 x i32]** %b",
            "store [2 x i32]* %b.1, [2 x i32]** %a",
            "store i32 9, i32* %elem.4",
        ]
    );
    // `a[0]` is read through whatever `a` points to now.
    let last_gep = main
        .instructions()
        .filter(|i| matches!(i, Instruction::Gep { .. }))
        .last()
        .unwrap();
    assert_eq!(
        last_gep.to_string(),
        "%elem.5 = getelementptr inbounds [2 x i32], [2 x i32]* %a.1, i32 0, i32 0"
    );
}

#[test]
fn test_function_locals_shadow_module_variables() {
    let module = compile_ok("x = 1\ndef f():\n\tx = \"s\"\n\tprint(x)\n\treturn 0\nprint(x)\n");
    let first = |name: &str| module.function(name).unwrap().blocks[0].instructions[0].to_string();
    assert_eq!(first("main"), "%x = alloca i32");
    assert_eq!(first("f"), "%x = alloca i8*");
}

tree_tests!(
    use codegen;

    fn test_strings() {
        let program = "s = \"hi\"\nprint(s)\n";
        let ir_ok = r#"
            ; ModuleID = 'test.py'
            source_filename = "test.py"

            @str_0 = private unnamed_addr constant [3 x i8] c"hi\00"

            declare void @print_i32(i32)
            declare void @print_str(i8*)

            define i32 @main() {
            entry:
              %s = alloca i8*
              %decay = getelementptr inbounds [3 x i8], [3 x i8]* @str_0, i32 0, i32 0
              store i8* %decay, i8** %s
              %s.1 = load i8*, i8** %s
              call void @print_str(i8* %s.1)
              ret i32 0
            }
        "#;
    }

    fn test_factorial() {
        let program = FACTORIAL;
        let ir_ok = r#"
            ; ModuleID = 'test.py'
            source_filename = "test.py"

            declare void @print_i32(i32)
            declare void @print_str(i8*)

            define i32 @main() {
            entry:
              %i = alloca i32
              store i32 0, i32* %i
              br label %for.test

            for.test:
              %i.1 = load i32, i32* %i
              %cmp = icmp slt i32 %i.1, 5
              br i1 %cmp, label %for.body, label %for.end

            for.body:
              %i.2 = load i32, i32* %i
              %add = add i32 %i.2, 1
              %call = call i32 @factorial(i32 %add)
              call void @print_i32(i32 %call)
              %i.3 = load i32, i32* %i
              %next = add i32 %i.3, 1
              store i32 %next, i32* %i
              br label %for.test

            for.end:
              ret i32 0
            }

            define i32 @factorial(i32 %n) {
            entry:
              %cmp = icmp sle i32 %n, 1
              br i1 %cmp, label %then, label %else

            then:
              ret i32 1

            else:
              %sub = sub i32 %n, 1
              %call = call i32 @factorial(i32 %sub)
              %mul = mul i32 %n, %call
              ret i32 %mul

            merge:
              ret i32 0
            }
        "#;
    }

    fn test_array_store_out_of_bounds_compiles() {
        let program = "a = [1, 2, 3]\na[5] = 1\n";
        let ir_ok = r#"
            ; ModuleID = 'test.py'
            source_filename = "test.py"

            declare void @print_i32(i32)
            declare void @print_str(i8*)

            define i32 @main() {
            entry:
              %a = alloca [3 x i32]*
              %list = alloca [3 x i32]
              %elem = getelementptr inbounds [3 x i32], [3 x i32]* %list, i32 0, i32 0
              store i32 1, i32* %elem
              %elem.1 = getelementptr inbounds [3 x i32], [3 x i32]* %list, i32 0, i32 1
              store i32 2, i32* %elem.1
              %elem.2 = getelementptr inbounds [3 x i32], [3 x i32]* %list, i32 0, i32 2
              store i32 3, i32* %elem.2
              store [3 x i32]* %list, [3 x i32]** %a
              %a.1 = load [3 x i32]*, [3 x i32]** %a
              %elem.3 = getelementptr inbounds [3 x i32], [3 x i32]* %a.1, i32 0, i32 5
              store i32 1, i32* %elem.3
              ret i32 0
            }
        "#;
    }

    fn test_while_loop() {
        let program = "i = 0\nwhile i < 3:\n\ti = i + 1\n";
        let ir_ok = r#"
            ; ModuleID = 'test.py'
            source_filename = "test.py"

            declare void @print_i32(i32)
            declare void @print_str(i8*)

            define i32 @main() {
            entry:
              %i = alloca i32
              store i32 0, i32* %i
              br label %while.test

            while.test:
              %i.1 = load i32, i32* %i
              %cmp = icmp slt i32 %i.1, 3
              br i1 %cmp, label %while.body, label %while.end

            while.body:
              %i.2 = load i32, i32* %i
              %add = add i32 %i.2, 1
              store i32 %add, i32* %i
              br label %while.test

            while.end:
              ret i32 0
            }
        "#;
    }

    fn test_if_with_boolean_operator() {
        let program = "a = 1\nb = 2\nif a < b and b:\n\tprint(a)\nprint(b)\n";
        let ir_ok = r#"
            ; ModuleID = 'test.py'
            source_filename = "test.py"

            declare void @print_i32(i32)
            declare void @print_str(i8*)

            define i32 @main() {
            entry:
              %a = alloca i32
              %b = alloca i32
              store i32 1, i32* %a
              store i32 2, i32* %b
              %a.1 = load i32, i32* %a
              %b.1 = load i32, i32* %b
              %cmp = icmp slt i32 %a.1, %b.1
              %b.2 = load i32, i32* %b
              %tobool = icmp ne i32 %b.2, 0
              %and = and i1 %cmp, %tobool
              br i1 %and, label %then, label %else

            then:
              %a.2 = load i32, i32* %a
              call void @print_i32(i32 %a.2)
              br label %merge

            else:
              br label %merge

            merge:
              %b.3 = load i32, i32* %b
              call void @print_i32(i32 %b.3)
              ret i32 0
            }
        "#;
    }

    fn test_assigned_parameter_is_spilled() {
        let program = "\
def count(s: str, n: int):
\tn = n + 1
\treturn s[n]
print(count(\"hey\", 0))
";
        let ir_ok = r#"
            ; ModuleID = 'test.py'
            source_filename = "test.py"

            @str_0 = private unnamed_addr constant [4 x i8] c"hey\00"

            declare void @print_i32(i32)
            declare void @print_str(i8*)

            define i32 @main() {
            entry:
              %decay = getelementptr inbounds [4 x i8], [4 x i8]* @str_0, i32 0, i32 0
              %call = call i32 @count(i8* %decay, i32 0)
              call void @print_i32(i32 %call)
              ret i32 0
            }

            define i32 @count(i8* %s, i32 %n) {
            entry:
              %n.addr = alloca i32
              store i32 %n, i32* %n.addr
              %n.1 = load i32, i32* %n.addr
              %add = add i32 %n.1, 1
              store i32 %add, i32* %n.addr
              %n.2 = load i32, i32* %n.addr
              %elem = getelementptr inbounds i8, i8* %s, i32 %n.2
              %item = load i8, i8* %elem
              %ext = zext i8 %item to i32
              ret i32 %ext
            }
        "#;
    }

    fn test_list_argument_decays() {
        let program = "def first(l: list):\n\treturn l[0]\na = [7, 8]\nprint(first(a))\n";
        let ir_ok = r#"
            ; ModuleID = 'test.py'
            source_filename = "test.py"

            declare void @print_i32(i32)
            declare void @print_str(i8*)

            define i32 @main() {
            entry:
              %a = alloca [2 x i32]*
              %list = alloca [2 x i32]
              %elem = getelementptr inbounds [2 x i32], [2 x i32]* %list, i32 0, i32 0
              store i32 7, i32* %elem
              %elem.1 = getelementptr inbounds [2 x i32], [2 x i32]* %list, i32 0, i32 1
              store i32 8, i32* %elem.1
              store [2 x i32]* %list, [2 x i32]** %a
              %a.1 = load [2 x i32]*, [2 x i32]** %a
              %decay = getelementptr inbounds [2 x i32], [2 x i32]* %a.1, i32 0, i32 0
              %call = call i32 @first(i32* %decay)
              call void @print_i32(i32 %call)
              ret i32 0
            }

            define i32 @first(i32* %l) {
            entry:
              %elem = getelementptr inbounds i32, i32* %l, i32 0
              %item = load i32, i32* %elem
              ret i32 %item
            }
        "#;
    }

    fn test_character_store_truncates() {
        let program = "s = \"ab\"\ns[0] = 65\n";
        let ir_ok = r#"
            ; ModuleID = 'test.py'
            source_filename = "test.py"

            @str_0 = private unnamed_addr constant [3 x i8] c"ab\00"

            declare void @print_i32(i32)
            declare void @print_str(i8*)

            define i32 @main() {
            entry:
              %s = alloca i8*
              %decay = getelementptr inbounds [3 x i8], [3 x i8]* @str_0, i32 0, i32 0
              store i8* %decay, i8** %s
              %s.1 = load i8*, i8** %s
              %elem = getelementptr inbounds i8, i8* %s.1, i32 0
              %trunc = trunc i32 65 to i8
              store i8 %trunc, i8* %elem
              ret i32 0
            }
        "#;
    }

    fn test_mixed_width_comparison() {
        let program = "s = \"ab\"\nb = s[0] == 97\n";
        let ir_ok = r#"
            ; ModuleID = 'test.py'
            source_filename = "test.py"

            @str_0 = private unnamed_addr constant [3 x i8] c"ab\00"

            declare void @print_i32(i32)
            declare void @print_str(i8*)

            define i32 @main() {
            entry:
              %s = alloca i8*
              %b = alloca i1
              %decay = getelementptr inbounds [3 x i8], [3 x i8]* @str_0, i32 0, i32 0
              store i8* %decay, i8** %s
              %s.1 = load i8*, i8** %s
              %elem = getelementptr inbounds i8, i8* %s.1, i32 0
              %item = load i8, i8* %elem
              %ext = zext i8 %item to i32
              %cmp = icmp eq i32 %ext, 97
              store i1 %cmp, i1* %b
              ret i32 0
            }
        "#;
    }

    fn test_list_rebinding_leaves_the_old_array() {
        let program = "l = [1, 2]\nm = l\nm = [3, 4]\nprint(l[0])\n";
        let ir_ok = r#"
            ; ModuleID = 'test.py'
            source_filename = "test.py"

            declare void @print_i32(i32)
            declare void @print_str(i8*)

            define i32 @main() {
            entry:
              %l = alloca [2 x i32]*
              %m = alloca [2 x i32]*
              %list = alloca [2 x i32]
              %elem = getelementptr inbounds [2 x i32], [2 x i32]* %list, i32 0, i32 0
              store i32 1, i32* %elem
              %elem.1 = getelementptr inbounds [2 x i32], [2 x i32]* %list, i32 0, i32 1
              store i32 2, i32* %elem.1
              store [2 x i32]* %list, [2 x i32]** %l
              %l.1 = load [2 x i32]*, [2 x i32]** %l
              store [2 x i32]* %l.1, [2 x i32]** %m
              %list.1 = alloca [2 x i32]
              %elem.2 = getelementptr inbounds [2 x i32], [2 x i32]* %list.1, i32 0, i32 0
              store i32 3, i32* %elem.2
              %elem.3 = getelementptr inbounds [2 x i32], [2 x i32]* %list.1, i32 0, i32 1
              store i32 4, i32* %elem.3
              store [2 x i32]* %list.1, [2 x i32]** %m
              %l.2 = load [2 x i32]*, [2 x i32]** %l
              %elem.4 = getelementptr inbounds [2 x i32], [2 x i32]* %l.2, i32 0, i32 0
              %item = load i32, i32* %elem.4
              call void @print_i32(i32 %item)
              ret i32 0
            }
        "#;
    }

    fn test_division_remainder_and_negation() {
        let program = "a = 7\nb = a // 2\nc = a % 3\nd = -a\n";
        let ir_ok = r#"
            ; ModuleID = 'test.py'
            source_filename = "test.py"

            declare void @print_i32(i32)
            declare void @print_str(i8*)

            define i32 @main() {
            entry:
              %a = alloca i32
              %b = alloca i32
              %c = alloca i32
              %d = alloca i32
              store i32 7, i32* %a
              %a.1 = load i32, i32* %a
              %div = sdiv i32 %a.1, 2
              store i32 %div, i32* %b
              %a.2 = load i32, i32* %a
              %rem = urem i32 %a.2, 3
              store i32 %rem, i32* %c
              %a.3 = load i32, i32* %a
              %neg = sub i32 0, %a.3
              store i32 %neg, i32* %d
              ret i32 0
            }
        "#;
    }

    fn test_or_folds_every_operand() {
        let program = "x = 1\ny = 2\nb = x or y or x < y\n";
        let ir_ok = r#"
            ; ModuleID = 'test.py'
            source_filename = "test.py"

            declare void @print_i32(i32)
            declare void @print_str(i8*)

            define i32 @main() {
            entry:
              %x = alloca i32
              %y = alloca i32
              %b = alloca i1
              store i32 1, i32* %x
              store i32 2, i32* %y
              %x.1 = load i32, i32* %x
              %tobool = icmp ne i32 %x.1, 0
              %y.1 = load i32, i32* %y
              %tobool.1 = icmp ne i32 %y.1, 0
              %or = or i1 %tobool, %tobool.1
              %x.2 = load i32, i32* %x
              %y.2 = load i32, i32* %y
              %cmp = icmp slt i32 %x.2, %y.2
              %or.1 = or i1 %or, %cmp
              store i1 %or.1, i1* %b
              ret i32 0
            }
        "#;
    }

    fn test_range_bounds_and_for_else() {
        let program = "\
for i in range(2, 5):
\tprint(i)
for j in range(0, 10, 3):
\tprint(j)
else:
\tprint(j)
";
        let ir_ok = r#"
            ; ModuleID = 'test.py'
            source_filename = "test.py"

            declare void @print_i32(i32)
            declare void @print_str(i8*)

            define i32 @main() {
            entry:
              %i = alloca i32
              %j = alloca i32
              store i32 2, i32* %i
              br label %for.test

            for.test:
              %i.1 = load i32, i32* %i
              %cmp = icmp slt i32 %i.1, 5
              br i1 %cmp, label %for.body, label %for.end

            for.body:
              %i.2 = load i32, i32* %i
              call void @print_i32(i32 %i.2)
              %i.3 = load i32, i32* %i
              %next = add i32 %i.3, 1
              store i32 %next, i32* %i
              br label %for.test

            for.end:
              store i32 0, i32* %j
              br label %for.test.1

            for.test.1:
              %j.1 = load i32, i32* %j
              %cmp.1 = icmp slt i32 %j.1, 10
              br i1 %cmp.1, label %for.body.1, label %for.end.1

            for.body.1:
              %j.2 = load i32, i32* %j
              call void @print_i32(i32 %j.2)
              %j.3 = load i32, i32* %j
              %next.1 = add i32 %j.3, 3
              store i32 %next.1, i32* %j
              br label %for.test.1

            for.end.1:
              %j.4 = load i32, i32* %j
              call void @print_i32(i32 %j.4)
              ret i32 0
            }
        "#;
    }

    fn test_while_else_is_unsupported() {
        let program = "i = 0\nwhile i < 1:\n\ti = i + 1\nelse:\n\ti = 5\n";
        let expected_errors = &["2:1: unsupported: `else` on a `while` loop"];
    }

    fn test_not_is_unsupported() {
        let program = "b = not True\n";
        let expected_errors = &["1:5: unsupported: `not`"];
    }

    fn test_iterating_a_list_is_unsupported() {
        let program = "l = [1]\nfor x in l:\n\tprint(x)\n";
        let expected_errors = &["2:10: unsupported: iteration over anything but `range`"];
    }

    fn test_range_arity() {
        let program = "for i in range(1, 2, 3, 4):\n\tprint(i)\n";
        let expected_errors = &["1:10: `range` expects 1 to 3 arguments, got 4"];
    }

    fn test_bool_comparison() {
        let program = "b = True\nc = b == True\n";
        let expected_errors = &["2:5: can't compare values of type i1"];
    }

    fn test_unknown_length() {
        let program = "def f(a: list):\n\treturn len(a)\n";
        let expected_errors = &["2:13: length of `a` is not known at compile time"];
    }

    fn test_redefinition_with_other_signature() {
        let program = "\
x = 1
if x:
\tdef f():
\t\treturn 1
else:
\tdef f(a):
\t\treturn a
";
        let expected_errors =
            &["6:6: function `f` is already defined with a different signature"];
    }

    fn test_redefinition_with_same_signature() {
        let program = "\
x = 1
if x:
\tdef f():
\t\treturn 1
else:
\tdef f():
\t\treturn 2
";
        let expected_errors = &["6:6: function `f` is already defined"];
    }

    fn test_argument_count() {
        let program = "def f(a):\n\treturn a\nx = f(1, 2)\n";
        let expected_errors = &["3:5: wrong number of arguments to `f`: expected 1, got 2"];
    }

    fn test_print_argument_count() {
        let program = "print(1, 2)\n";
        let expected_errors = &["1:1: wrong number of arguments to `print`: expected 1, got 2"];
    }

    fn test_print_list() {
        let program = "l = [1]\nprint(l)\n";
        let expected_errors = &["2:7: can't print a value of type [1 x i32]*"];
    }

    fn test_array_length_mismatch() {
        let program = "a = [1, 2]\na = [1, 2, 3]\n";
        let expected_errors = &["2:5: type mismatch: expected [2 x i32]*, found [3 x i32]*"];
    }

    fn test_functions_do_not_see_module_variables() {
        let program = "x = 1\ndef f():\n\treturn x\n";
        let expected_errors = &["3:9: undefined variable `x`"];
    }
);
