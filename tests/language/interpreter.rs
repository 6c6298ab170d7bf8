//! Integration tests for the interpreter
//!
//! Programs run against one module, the way a prompt session does.

use adder_language::{
    CompileMode, Context, ContextOptions, ExceptionType, Module, Output, compile,
};

struct Program {
    context: Context,
    module: Module,
}

impl Program {
    fn new() -> Self {
        let context = Context::new(ContextOptions {
            recursion_limit: 40,
            output: Output::buffer(),
        });
        let module = context.module_init("__main__");
        Self { context, module }
    }

    /// Runs one prompt turn and returns what it printed.
    fn turn(&mut self, line: &str) -> String {
        let code = compile(&format!("{line}\n"), "<stdin>", CompileMode::Single, true)
            .unwrap_or_else(|e| panic!("{line:?} does not compile: {e}"));
        if let Err(err) = self.context.run_code(&code, &mut self.module.globals) {
            return err.traceback();
        }
        self.context.output().take()
    }
}

// =============================================================================
// Echo and Persistence
// =============================================================================

#[test]
fn echo_uses_repr() {
    let mut program = Program::new();
    assert_eq!(program.turn("'hi'"), "'hi'\n");
    assert_eq!(program.turn("print('hi')"), "hi\n");
    assert_eq!(program.turn("[1, 'a', None, True, 2.5]"), "[1, 'a', None, True, 2.5]\n");
    assert_eq!(program.turn("{'k': (1,)}"), "{'k': (1,)}\n");
}

#[test]
fn definitions_persist() {
    let mut program = Program::new();
    program.turn("def square(n):\n    return n * n\n");
    program.turn("values = list(map(square, range(5)))");
    assert_eq!(program.turn("values"), "[0, 1, 4, 9, 16]\n");
    assert_eq!(program.turn("sum(values)"), "30\n");
}

#[test]
fn sequences_repeat() {
    let mut program = Program::new();
    assert_eq!(program.turn("[1] * 3"), "[1, 1, 1]\n");
    assert_eq!(program.turn("(1, 2) * 2"), "(1, 2, 1, 2)\n");
    assert_eq!(program.turn("2 * ['a']"), "['a', 'a']\n");
    assert_eq!(program.turn("[1, 2] * 0"), "[]\n");
}

#[test]
fn partial_mutation_survives_errors() {
    let mut program = Program::new();
    program.turn("log = []");
    let out = program.turn("for i in range(5):\n    log.append(i)\n    if i == 2:\n        1 / 0\n");
    assert!(out.ends_with("ZeroDivisionError: division by zero"), "{out}");
    assert_eq!(program.turn("log"), "[0, 1, 2]\n");
}

// =============================================================================
// Exceptions
// =============================================================================

#[test]
fn traceback_has_frames() {
    let mut program = Program::new();
    program.turn("def inner():\n    return {}['missing']\n");
    program.turn("def outer():\n    return inner()\n");
    assert_eq!(
        program.turn("outer()"),
        "Traceback (most recent call last):\n  \
         File \"<stdin>\", line 1, in <module>\n  \
         File \"<stdin>\", line 2, in outer\n  \
         File \"<stdin>\", line 2, in inner\n\
         KeyError: 'missing'"
    );
}

#[test]
fn runaway_recursion() {
    let mut program = Program::new();
    program.turn("def down(n):\n    return down(n + 1)\n");
    let out = program.turn("down(0)");
    assert!(out.contains("[Previous line repeated"), "{out}");
    assert!(out.ends_with("RecursionError: maximum recursion depth exceeded"), "{out}");
}

#[test]
fn handled_exceptions_do_not_escape() {
    let mut program = Program::new();
    let out = program.turn(
        "try:\n    int('x')\nexcept ValueError as e:\n    print('bad:', e)\nfinally:\n    print('done')\n",
    );
    assert_eq!(out, "bad: invalid literal for int() with base 10: 'x'\ndone\n");
}

#[test]
fn exception_hierarchy_is_visible() {
    assert!(ExceptionType::ZeroDivisionError.is_subclass_of(ExceptionType::Exception));
    let mut program = Program::new();
    let out = program.turn("try:\n    {}['x']\nexcept LookupError:\n    print('caught')\n");
    assert_eq!(out, "caught\n");
}
