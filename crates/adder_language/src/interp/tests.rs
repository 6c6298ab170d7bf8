//! Interpreter tests: run source through a [`Context`] with buffered output.

use super::*;
use crate::compiler::{CompileMode, compile};

const TEST_RECURSION_LIMIT: usize = 30;

fn context() -> Context {
    Context::new(ContextOptions {
        recursion_limit: TEST_RECURSION_LIMIT,
        output: Output::buffer(),
    })
}

/// Runs a whole program, returning its output or the rendered traceback.
fn run(source: &str) -> Result<String, String> {
    let context = context();
    let mut module = context.module_init("__main__");
    let code = compile(source, "<test>", CompileMode::Exec, false).map_err(|e| e.to_string())?;
    match context.run_code(&code, &mut module.globals) {
        Ok(_) => Ok(context.output().take()),
        Err(err) => Err(err.traceback()),
    }
}

fn output(source: &str) -> String {
    run(source).unwrap_or_else(|tb| panic!("program raised:\n{tb}"))
}

fn raised(source: &str) -> String {
    match run(source) {
        Ok(out) => panic!("program completed with output {out:?}"),
        Err(tb) => tb.lines().last().unwrap_or_default().to_string(),
    }
}

/// Runs prompt turns against one module, returning each turn's output.
fn turns(lines: &[&str]) -> Vec<String> {
    let context = context();
    let mut module = context.module_init("__main__");
    lines
        .iter()
        .map(|line| {
            let code = compile(line, "<stdin>", CompileMode::Single, true).expect("compiles");
            if let Err(err) = context.run_code(&code, &mut module.globals) {
                context.output().write(&err.traceback()).expect("buffer");
            }
            context.output().take()
        })
        .collect()
}

// =============================================================================
// Interactive echo
// =============================================================================

#[test]
fn echoes_expression_values() {
    assert_eq!(turns(&["1 + 1", "'a' * 3", "None", "x = 5", "x"]), [
        "2\n", "'aaa'\n", "", "", "5\n"
    ]);
}

#[test]
fn echo_returns_last_value() {
    let context = context();
    let mut module = context.module_init("__main__");
    let code = compile("[1, 2]", "<stdin>", CompileMode::Single, true).expect("compiles");
    let value = context.run_code(&code, &mut module.globals).expect("runs");
    assert_eq!(value.repr(), "[1, 2]");
}

#[test]
fn function_bodies_do_not_echo() {
    let out = turns(&["def f():\n    1 + 1\n    return 3\n", "f()"]);
    assert_eq!(out, ["", "3\n"]);
}

#[test]
fn module_name_is_main() {
    assert_eq!(turns(&["__name__"]), ["'__main__'\n"]);
}

#[test]
fn globals_persist_between_turns() {
    let out = turns(&["total = 0", "for i in range(4):\n    total += i\n", "total"]);
    assert_eq!(out[2], "6\n");
}

// =============================================================================
// Tracebacks
// =============================================================================

#[test]
fn traceback_names_each_frame() {
    let tb = run("def f(x):\n    return 1 / x\n\nf(0)\n").expect_err("raises");
    assert_eq!(
        tb,
        "Traceback (most recent call last):\n  File \"<test>\", line 4, in <module>\n  File \"<test>\", line 2, in f\nZeroDivisionError: division by zero"
    );
}

#[test]
fn name_error_message() {
    assert_eq!(raised("spam"), "NameError: name 'spam' is not defined");
}

#[test]
fn unbound_local() {
    let source = "x = 1\ndef f():\n    print(x)\n    x = 2\nf()\n";
    assert_eq!(
        raised(source),
        "UnboundLocalError: local variable 'x' referenced before assignment"
    );
}

#[test]
fn recursion_limit_raises() {
    let tb = run("def f(n):\n    return f(n + 1)\nf(0)\n").expect_err("raises");
    assert!(tb.ends_with("RecursionError: maximum recursion depth exceeded"));
    assert!(tb.contains("[Previous line repeated"));
}

#[test]
fn recursion_within_limit_completes() {
    let source = "def fact(n):\n    return 1 if n <= 1 else n * fact(n - 1)\nprint(fact(20))\n";
    assert_eq!(output(source), "2432902008176640000\n");
}

#[test]
fn integer_overflow_is_an_error() {
    assert_eq!(
        raised("2 ** 63"),
        "OverflowError: integer result too large to represent"
    );
}

// =============================================================================
// Control flow
// =============================================================================

#[test]
fn loops_with_else() {
    let source = "\
for i in range(3):
    if i == 5:
        break
else:
    print('no break')
n = 0
while n < 10:
    n += 1
    if n == 3:
        break
else:
    print('unreachable')
print(n)
";
    assert_eq!(output(source), "no break\n3\n");
}

#[test]
fn continue_skips() {
    let source = "for i in range(6):\n    if i % 2:\n        continue\n    print(i, end=' ')\n";
    assert_eq!(output(source), "0 2 4 ");
}

#[test]
fn try_except_else_finally() {
    let source = "\
def attempt(x):
    try:
        r = 10 // x
    except ZeroDivisionError as e:
        print('caught', e)
        return -1
    else:
        print('ok')
        return r
    finally:
        print('finally')
print(attempt(2))
print(attempt(0))
";
    assert_eq!(output(source), "ok\nfinally\n5\ncaught integer division or modulo by zero\nfinally\n-1\n");
}

#[test]
fn handler_matching_uses_hierarchy() {
    let source = "\
try:
    {}['missing']
except (ValueError, LookupError) as e:
    print(type(e), repr(e))
";
    assert_eq!(output(source), "<class 'KeyError'> KeyError('missing')\n");
}

#[test]
fn exception_name_is_cleared_after_handler() {
    let source = "try:\n    1/0\nexcept Exception as e:\n    pass\nprint(e)\n";
    assert_eq!(raised(source), "NameError: name 'e' is not defined");
}

#[test]
fn bare_raise_reraises() {
    let source = "try:\n    raise ValueError('bad')\nexcept ValueError:\n    raise\n";
    assert_eq!(raised(source), "ValueError: bad");
}

#[test]
fn assert_statement() {
    assert_eq!(raised("assert 1 == 2, 'nope'"), "AssertionError: nope");
    assert_eq!(output("assert True\n"), "");
}

#[test]
fn import_is_unavailable() {
    assert_eq!(raised("import os"), "ImportError: No module named 'os'");
}

// =============================================================================
// Functions and scopes
// =============================================================================

#[test]
fn closures_capture_enclosing_frames() {
    let source = "\
def counter(start):
    def step(by=1):
        return start + by
    return step
c = counter(10)
print(c(), c(5), c(by=-1))
";
    assert_eq!(output(source), "11 15 9\n");
}

#[test]
fn global_statement_rebinds_module_name() {
    let source = "count = 0\ndef bump():\n    global count\n    count += 1\nbump()\nbump()\nprint(count)\n";
    assert_eq!(output(source), "2\n");
}

#[test]
fn argument_binding_errors() {
    let define = "def f(a, b, c=3):\n    return a + b + c\n";
    assert_eq!(output(&format!("{define}print(f(1, 2), f(1, b=1, c=1))\n")), "6 3\n");
    assert_eq!(
        raised(&format!("{define}f(1)\n")),
        "TypeError: f() missing 1 required positional argument: 'b'"
    );
    assert_eq!(
        raised(&format!("{define}f(1, 2, 3, 4)\n")),
        "TypeError: f() takes from 2 to 3 positional arguments but 4 were given"
    );
    assert_eq!(
        raised(&format!("{define}f(1, 2, d=4)\n")),
        "TypeError: f() got an unexpected keyword argument 'd'"
    );
}

#[test]
fn lambdas_and_sorting() {
    let source = "words = ['pear', 'fig', 'apple']\nprint(sorted(words, key=lambda w: len(w)))\nprint(sorted(words, reverse=True))\n";
    assert_eq!(output(source), "['fig', 'pear', 'apple']\n['pear', 'fig', 'apple']\n");
}

#[test]
fn exec_runs_in_module_scope() {
    assert_eq!(output("exec('y = 4')\nprint(y * 2)\n"), "8\n");
    assert_eq!(
        raised("exec('(1 +')"),
        "SyntaxError: unexpected EOF while parsing (<string>, line 1)"
    );
}

// =============================================================================
// Builtins and methods
// =============================================================================

#[test]
fn containers_and_methods() {
    let source = "\
xs = [3, 1, 2]
xs.append(4)
xs.sort()
print(xs, xs.pop(), xs.index(2), len(xs))
d = {'a': 1}
d['b'] = 2
print(d, d.get('z', 0), list(d.items()))
print(', '.join(['x', 'y']), 'a-b-c'.split('-'), '  pad '.strip())
print('{} + {} = {total}'.format(1, 2, total=3))
";
    assert_eq!(
        output(source),
        "[1, 2, 3] 4 1 3\n{'a': 1, 'b': 2} 0 [('a', 1), ('b', 2)]\nx, y ['a', 'b', 'c'] pad\n1 + 2 = 3\n"
    );
}

#[test]
fn slicing_and_unpacking() {
    let source = "s = 'abcdef'\nprint(s[1:4], s[::-1], s[-2:])\na, (b, c) = 1, [2, 3]\nprint(a + b + c)\n";
    assert_eq!(output(source), "bcd fedcba ef\n6\n");
    assert_eq!(
        raised("a, b = [1, 2, 3]"),
        "ValueError: too many values to unpack (expected 2)"
    );
}

#[test]
fn conversions_and_numeric_builtins() {
    let source = "print(int('ff', 16), float('1.5'), str(10), bool([]), abs(-3), round(2.5), divmod(7, 2))\n";
    assert_eq!(output(source), "255 1.5 10 False 3 2 (3, 1)\n");
    assert_eq!(
        raised("int('x')"),
        "ValueError: invalid literal for int() with base 10: 'x'"
    );
}

#[test]
fn iteration_builtins_return_lists() {
    let source = "print(list(enumerate('ab')), zip([1, 2], 'xy'), map(str, [1, 2]), min([4, 2, 8]), max(3, 9))\n";
    assert_eq!(
        output(source),
        "[(0, 'a'), (1, 'b')] [(1, 'x'), (2, 'y')] ['1', '2'] 2 9\n"
    );
}

#[test]
fn attribute_errors() {
    assert_eq!(
        raised("(1).foo"),
        "AttributeError: 'int' object has no attribute 'foo'"
    );
}

#[test]
fn dir_lists_visible_names() {
    let out = turns(&["alpha = 1", "dir()"]);
    assert_eq!(out[1], "['__name__', 'alpha']\n");
}

#[test]
fn recursive_containers_print() {
    assert_eq!(output("xs = [1]\nxs.append(xs)\nprint(xs)\n"), "[1, [...]]\n");
}
